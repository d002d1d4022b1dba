//! Catalog item attributes used for product enrichment.

use serde::Deserialize;

/// A catalog item with the summary and attribute data the product importer
/// consumes: title, package weight, package dimensions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogItem {
    /// Per-marketplace summaries; the first entry's title is used.
    #[serde(default)]
    pub summaries: Vec<CatalogSummary>,
    /// Structured attributes keyed by attribute name.
    #[serde(default)]
    pub attributes: CatalogAttributes,
}

/// Summary block of a catalog item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    /// Item display title.
    pub item_name: Option<String>,
}

/// Attribute blocks relevant to weight and volume enrichment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogAttributes {
    /// Item weight measurements (`value` + `unit`).
    #[serde(default)]
    pub item_weight: Vec<Measure>,
    /// Package dimensions (length, width, height measures).
    #[serde(default)]
    pub item_package_dimensions: Vec<PackageDimensions>,
}

/// One measurement with its unit.
#[derive(Debug, Clone, Deserialize)]
pub struct Measure {
    /// Numeric value in `unit`.
    pub value: f64,
    /// Unit name (e.g. `pounds`, `inches`).
    pub unit: String,
}

/// Package dimensions along three axes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDimensions {
    /// Package length.
    pub length: Option<Measure>,
    /// Package width.
    pub width: Option<Measure>,
    /// Package height.
    pub height: Option<Measure>,
}

impl CatalogItem {
    /// Title from the first summary block, when present.
    pub fn item_name(&self) -> Option<&str> {
        self.summaries
            .first()
            .and_then(|s| s.item_name.as_deref())
            .filter(|n| !n.is_empty())
    }

    /// First reported item weight.
    pub fn weight(&self) -> Option<&Measure> {
        self.attributes.item_weight.first()
    }

    /// First reported package dimension triple.
    pub fn package_dimensions(&self) -> Option<&PackageDimensions> {
        self.attributes.item_package_dimensions.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_weight_and_dimensions() {
        let raw = r#"{
            "summaries": [{"itemName": "Widget"}],
            "attributes": {
                "item_weight": [{"value": 1.2, "unit": "pounds"}],
                "item_package_dimensions": [{
                    "length": {"value": 10.0, "unit": "inches"},
                    "width": {"value": 4.0, "unit": "inches"},
                    "height": {"value": 2.0, "unit": "inches"}
                }]
            }
        }"#;
        let item: CatalogItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.item_name(), Some("Widget"));
        assert_eq!(item.weight().unwrap().unit, "pounds");
        let dims = item.package_dimensions().unwrap();
        assert_eq!(dims.length.as_ref().unwrap().value, 10.0);
    }

    #[test]
    fn empty_payload_yields_defaults() {
        let item: CatalogItem = serde_json::from_str("{}").unwrap();
        assert_eq!(item.item_name(), None);
        assert!(item.weight().is_none());
        assert!(item.package_dimensions().is_none());
    }
}
