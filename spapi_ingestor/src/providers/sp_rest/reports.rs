//! Report document decoding.
//!
//! Finished reports are delivered as pre-signed URLs pointing at a tab
//! separated text file, usually gzip compressed. Decoding is kept free of
//! any HTTP so it can be unit tested on raw bytes.

use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;
use indexmap::IndexMap;

use crate::errors::IngestorError;

/// Base path of the reports API.
pub const REPORTS_PATH: &str = "/reports/2021-06-30";

/// Delay between consecutive status polls.
pub const REPORT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Give up waiting for a report after this many polls.
pub const REPORT_POLL_MAX_ATTEMPTS: u32 = 40;

/// Refuse to inflate documents beyond this size. Listing and ledger
/// reports are a few megabytes at most.
const MAX_DOCUMENT_BYTES: u64 = 256 * 1024 * 1024;

/// Decompresses (when flagged) and UTF-8 decodes a report document.
pub fn decode_document(bytes: &[u8], gzip: bool) -> Result<String, IngestorError> {
    let raw = if gzip {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes)
            .take(MAX_DOCUMENT_BYTES + 1)
            .read_to_end(&mut decoded)?;
        if decoded.len() as u64 > MAX_DOCUMENT_BYTES {
            return Err(IngestorError::Decode(
                "report document exceeds the decompression limit".to_string(),
            ));
        }
        decoded
    } else {
        if bytes.len() as u64 > MAX_DOCUMENT_BYTES {
            return Err(IngestorError::Decode(
                "report document exceeds the size limit".to_string(),
            ));
        }
        bytes.to_vec()
    };
    String::from_utf8(raw)
        .map_err(|_| IngestorError::Decode("report document is not valid UTF-8".to_string()))
}

/// Parses tab separated report text into rows keyed by the header line.
///
/// Ragged rows are tolerated; cells without a header column are dropped
/// and missing trailing cells simply do not appear in the row map.
pub fn parse_tsv(text: &str) -> Result<Vec<IndexMap<String, String>>, IngestorError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestorError::Decode(format!("report header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestorError::Decode(format!("report row: {e}")))?;
        let row: IndexMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn decode_plain_document() {
        let text = decode_document(b"sku\tasin\nAB-1\tB000TEST01\n", false).unwrap();
        assert!(text.starts_with("sku\tasin"));
    }

    #[test]
    fn decode_gzip_document() {
        let compressed = gzip("sku\tasin\nAB-1\tB000TEST01\n");
        let text = decode_document(&compressed, true).unwrap();
        assert_eq!(text, "sku\tasin\nAB-1\tB000TEST01\n");
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let err = decode_document(&[0xff, 0xfe, 0x00], false).unwrap_err();
        assert!(matches!(err, IngestorError::Decode(_)));
    }

    #[test]
    fn parse_rows_keyed_by_header() {
        let rows = parse_tsv("sku\tasin\tprice\nAB-1\tB000TEST01\t19.99\nAB-2\tB000TEST02\t5.00\n")
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["sku"], "AB-1");
        assert_eq!(rows[1]["price"], "5.00");
    }

    #[test]
    fn parse_tolerates_short_rows() {
        let rows = parse_tsv("sku\tasin\tprice\nAB-1\tB000TEST01\n").unwrap();
        assert_eq!(rows[0].get("asin").map(String::as_str), Some("B000TEST01"));
        assert_eq!(rows[0].get("price"), None);
    }

    #[test]
    fn parse_preserves_header_order() {
        let rows = parse_tsv("b\ta\tc\n2\t1\t3\n").unwrap();
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
