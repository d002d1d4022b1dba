//! Product catalog sync: merchant listings and catalog enrichment.
//!
//! The merchant listings report drives product creation: every listed
//! ASIN gets a product row and a per-account MSKU mapping. Existing
//! products are never renamed; only the price follows the listing, and
//! only when the account opts in.
//!
//! Enrichment fills physical attributes (weight, package volume) from the
//! catalog API for products that are still missing them. Operator-set
//! values are never overwritten.

use std::fmt;

use diesel::prelude::*;
use diesel::{SqliteConnection, insert_into};
use spapi_ingestor::models::catalog::{CatalogItem, Measure, PackageDimensions};
use spapi_ingestor::models::listings::ListingRow;
use spapi_ingestor::providers::SellerApi;
use tracing::{debug, warn};

use crate::accounts::Account;
use crate::models::NewProduct;
use crate::schema::{product_asin_mskus, products};
use crate::sync::resolve;

/// Volumes smaller than this round to zero downstream; clamp.
const MIN_VOLUME_M3: f64 = 0.01;

/// What one listing row did to the products table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOutcome {
    /// A product row was created for a new ASIN.
    Created,
    /// An existing product's price moved to the listed price.
    Updated,
    /// The product already matched the listing.
    Unchanged,
}

/// Counters produced by one product sync run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProductSyncStats {
    /// Products created from new listings.
    pub created: usize,
    /// Products whose price was updated.
    pub updated: usize,
    /// Listings that changed nothing.
    pub unchanged: usize,
    /// Products that gained weight or volume from the catalog.
    pub enriched: usize,
    /// Catalog lookups that failed; retried on the next run.
    pub enrich_failed: usize,
}

impl fmt::Display for ProductSyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} enriched ({} lookups failed)",
            self.created, self.updated, self.unchanged, self.enriched, self.enrich_failed
        )
    }
}

/// Lands one merchant listing row.
///
/// Unknown ASINs become products named after the listing title; known
/// ASINs keep their name and optionally follow the listed price. Either
/// way the account's MSKU is recorded.
pub fn apply_listing_row(
    conn: &mut SqliteConnection,
    account: &str,
    row: &ListingRow,
    import_price: bool,
) -> anyhow::Result<ListingOutcome> {
    if let Some(id) = resolve::find_by_asin(conn, &row.asin)? {
        resolve::ensure_msku(conn, id, account, &row.seller_sku)?;
        if import_price {
            if let Some(price) = row.price {
                let changed = diesel::update(
                    products::table
                        .find(id)
                        .filter(products::price.ne(price)),
                )
                .set(products::price.eq(price))
                .execute(conn)?;
                if changed > 0 {
                    return Ok(ListingOutcome::Updated);
                }
            }
        }
        return Ok(ListingOutcome::Unchanged);
    }

    let name = row
        .item_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&row.asin);
    let new_row = NewProduct {
        asin: Some(&row.asin),
        name,
        default_code: Some(&row.seller_sku),
        needs_review: false,
    };
    let id = insert_into(products::table)
        .values(&new_row)
        .returning(products::id)
        .get_result::<i32>(conn)?;
    if import_price {
        if let Some(price) = row.price {
            diesel::update(products::table.find(id))
                .set(products::price.eq(price))
                .execute(conn)?;
        }
    }
    resolve::ensure_msku(conn, id, account, &row.seller_sku)?;
    debug!(product_id = id, asin = %row.asin, "created product from listing");
    Ok(ListingOutcome::Created)
}

/// Converts a catalog weight to kilograms.
pub fn weight_to_kg(measure: &Measure) -> Option<f64> {
    let v = measure.value;
    match measure.unit.trim().to_ascii_lowercase().as_str() {
        "pounds" | "pound" | "lb" | "lbs" => Some(v * 0.453592),
        "ounces" | "ounce" | "oz" => Some(v * 0.0283495),
        "grams" | "gram" | "g" => Some(v / 1000.0),
        "kilograms" | "kilogram" | "kg" => Some(v),
        _ => None,
    }
}

fn length_to_m(measure: &Measure) -> Option<f64> {
    let v = measure.value;
    match measure.unit.trim().to_ascii_lowercase().as_str() {
        "inches" | "inch" | "in" => Some(v * 0.0254),
        "centimeters" | "centimeter" | "cm" => Some(v / 100.0),
        "millimeters" | "millimeter" | "mm" => Some(v / 1000.0),
        "meters" | "meter" | "m" => Some(v),
        _ => None,
    }
}

/// Converts catalog package dimensions to cubic meters.
///
/// Returns None when any dimension or unit is missing or unknown.
pub fn dimensions_to_m3(dims: &PackageDimensions) -> Option<f64> {
    let l = length_to_m(dims.length.as_ref()?)?;
    let w = length_to_m(dims.width.as_ref()?)?;
    let h = length_to_m(dims.height.as_ref()?)?;
    Some((l * w * h).max(MIN_VOLUME_M3))
}

/// Writes catalog weight and volume onto a product, filling only fields
/// that are still empty. Returns whether anything changed.
pub fn apply_catalog_details(
    conn: &mut SqliteConnection,
    product_id: i32,
    item: &CatalogItem,
) -> anyhow::Result<bool> {
    let (current_weight, current_volume) = products::table
        .find(product_id)
        .select((products::weight_kg, products::volume_m3))
        .first::<(Option<f64>, Option<f64>)>(conn)?;

    let mut changed = false;
    if current_weight.is_none() {
        if let Some(kg) = item.weight().and_then(weight_to_kg) {
            diesel::update(products::table.find(product_id))
                .set(products::weight_kg.eq(kg))
                .execute(conn)?;
            changed = true;
        }
    }
    if current_volume.is_none() {
        if let Some(m3) = item.package_dimensions().and_then(dimensions_to_m3) {
            diesel::update(products::table.find(product_id))
                .set(products::volume_m3.eq(m3))
                .execute(conn)?;
            changed = true;
        }
    }
    Ok(changed)
}

/// Imports the account's merchant listings, then enriches products that
/// still lack physical attributes.
pub async fn sync_products(
    conn: &mut SqliteConnection,
    api: &dyn SellerApi,
    account: &Account,
) -> anyhow::Result<ProductSyncStats> {
    let rows = api.open_listings().await?;
    let mut stats = ProductSyncStats::default();

    for row in &rows {
        match apply_listing_row(conn, &account.code, row, account.import_product_price)? {
            ListingOutcome::Created => stats.created += 1,
            ListingOutcome::Updated => stats.updated += 1,
            ListingOutcome::Unchanged => stats.unchanged += 1,
        }
    }

    let candidates = products::table
        .inner_join(product_asin_mskus::table)
        .filter(product_asin_mskus::account.eq(&account.code))
        .filter(products::asin.is_not_null())
        .filter(products::weight_kg.is_null().or(products::volume_m3.is_null()))
        .select((products::id, products::asin))
        .distinct()
        .load::<(i32, Option<String>)>(conn)?;

    for (product_id, asin) in candidates {
        let Some(asin) = asin else { continue };
        match api.catalog_item(&asin).await {
            Ok(item) => {
                if apply_catalog_details(conn, product_id, &item)? {
                    stats.enriched += 1;
                }
            }
            Err(e) => {
                warn!(product_id, asin, error = %e, "catalog lookup failed");
                stats.enrich_failed += 1;
            }
        }
    }

    debug!(account = %account.code, %stats, "product sync finished");
    Ok(stats)
}
