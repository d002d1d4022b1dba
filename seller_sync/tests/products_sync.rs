mod common;
use common::{count, seed_product, setup_db};

use diesel::prelude::*;
use seller_sync::schema::products;
use seller_sync::sync::products::{ListingOutcome, apply_catalog_details, apply_listing_row};
use spapi_ingestor::models::catalog::{CatalogAttributes, CatalogItem, Measure, PackageDimensions};
use spapi_ingestor::models::listings::ListingRow;

fn listing(asin: &str, sku: &str, name: &str, price: Option<f64>) -> ListingRow {
    ListingRow {
        asin: asin.into(),
        seller_sku: sku.into(),
        item_name: Some(name.into()),
        price,
        fulfillment_channel: Some("AMAZON_NA".into()),
    }
}

#[test]
fn same_listing_twice_keeps_counts_stable() {
    let (_db, mut conn) = setup_db();
    let row = listing("B00PRD0001", "WID-1", "Widget, 2 pack", Some(19.99));

    let first = apply_listing_row(&mut conn, "test", &row, true).expect("first");
    let second = apply_listing_row(&mut conn, "test", &row, true).expect("second");

    assert_eq!(first, ListingOutcome::Created);
    assert_eq!(second, ListingOutcome::Unchanged);
    assert_eq!(count(&mut conn, "products"), 1);
    assert_eq!(count(&mut conn, "product_asin_mskus"), 1);

    let (name, price, needs_review): (String, f64, bool) = products::table
        .filter(products::asin.eq("B00PRD0001"))
        .select((products::name, products::price, products::needs_review))
        .first(&mut conn)
        .expect("product");
    assert_eq!(name, "Widget, 2 pack");
    assert_eq!(price, 19.99);
    assert!(!needs_review);
}

#[test]
fn price_follows_the_listing_only_when_opted_in() {
    let (_db, mut conn) = setup_db();
    let row = listing("B00PRD0002", "WID-2", "Widget", Some(10.00));
    apply_listing_row(&mut conn, "test", &row, true).expect("create");

    let repriced = listing("B00PRD0002", "WID-2", "Widget", Some(12.50));
    let ignored = apply_listing_row(&mut conn, "test", &repriced, false).expect("no price import");
    assert_eq!(ignored, ListingOutcome::Unchanged);
    let price: f64 = products::table
        .filter(products::asin.eq("B00PRD0002"))
        .select(products::price)
        .first(&mut conn)
        .unwrap();
    assert_eq!(price, 10.00);

    let followed = apply_listing_row(&mut conn, "test", &repriced, true).expect("price import");
    assert_eq!(followed, ListingOutcome::Updated);
    let price: f64 = products::table
        .filter(products::asin.eq("B00PRD0002"))
        .select(products::price)
        .first(&mut conn)
        .unwrap();
    assert_eq!(price, 12.50);
}

#[test]
fn second_account_attaches_its_own_msku() {
    let (_db, mut conn) = setup_db();
    let row = listing("B00PRD0003", "WID-3", "Widget", None);
    apply_listing_row(&mut conn, "alpha", &row, false).expect("alpha");

    let other_sku = listing("B00PRD0003", "WID-3-EU", "Widget", None);
    let outcome = apply_listing_row(&mut conn, "beta", &other_sku, false).expect("beta");

    assert_eq!(outcome, ListingOutcome::Unchanged);
    assert_eq!(count(&mut conn, "products"), 1);
    assert_eq!(count(&mut conn, "product_asin_mskus"), 2);
}

fn measured(value: f64, unit: &str) -> Measure {
    Measure {
        value,
        unit: unit.into(),
    }
}

#[test]
fn enrichment_fills_only_missing_fields() {
    let (_db, mut conn) = setup_db();
    let product = seed_product(&mut conn, "B00PRD0004", "Widget");
    diesel::update(products::table.find(product))
        .set(products::weight_kg.eq(2.5))
        .execute(&mut conn)
        .expect("preset weight");

    let item = CatalogItem {
        summaries: vec![],
        attributes: CatalogAttributes {
            item_weight: vec![measured(1.0, "pounds")],
            item_package_dimensions: vec![PackageDimensions {
                length: Some(measured(100.0, "cm")),
                width: Some(measured(50.0, "cm")),
                height: Some(measured(40.0, "cm")),
            }],
        },
    };

    let changed = apply_catalog_details(&mut conn, product, &item).expect("enrich");
    assert!(changed);

    let (weight, volume): (Option<f64>, Option<f64>) = products::table
        .find(product)
        .select((products::weight_kg, products::volume_m3))
        .first(&mut conn)
        .unwrap();
    // Operator-set weight stays; the missing volume fills in (1m x 0.5m x 0.4m).
    assert_eq!(weight, Some(2.5));
    assert_eq!(volume, Some(0.2));

    // Nothing left to fill.
    let again = apply_catalog_details(&mut conn, product, &item).expect("again");
    assert!(!again);
}

#[test]
fn enrichment_without_catalog_data_changes_nothing() {
    let (_db, mut conn) = setup_db();
    let product = seed_product(&mut conn, "B00PRD0005", "Widget");

    let changed =
        apply_catalog_details(&mut conn, product, &CatalogItem::default()).expect("enrich");
    assert!(!changed);
}
