mod common;
use common::{account_with, attach_fnsku, attach_msku, count, seed_product, setup_db};

use diesel::prelude::*;
use seller_sync::policy::{AccountPolicy, AllowAll};
use seller_sync::registry::Registry;
use seller_sync::schema::products;
use seller_sync::sync::{awd_inventory, fba_inventory};
use spapi_ingestor::models::inventory::{
    AwdInventoryItem, InventoryDetails, InventorySummary, ReservedQuantity,
};

fn summary(sku: &str, fnsku: Option<&str>, asin: Option<&str>, d: InventoryDetails) -> InventorySummary {
    InventorySummary {
        asin: asin.map(Into::into),
        fnsku: fnsku.map(Into::into),
        seller_sku: sku.into(),
        inventory_details: Some(d),
    }
}

fn details(fulfillable: f64, inbound_shipped: f64, reserved: f64) -> InventoryDetails {
    InventoryDetails {
        fulfillable_quantity: fulfillable,
        inbound_shipped_quantity: inbound_shipped,
        reserved_quantity: Some(ReservedQuantity {
            total_reserved_quantity: reserved,
        }),
        ..Default::default()
    }
}

#[test]
fn mskus_of_one_product_sum_per_bucket() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let product = seed_product(&mut conn, "B00INV0001", "Widget");
    attach_msku(&mut conn, product, "test", "WID-US");
    attach_msku(&mut conn, product, "test", "WID-US-2PK");

    let rows = vec![
        summary("WID-US", None, None, details(12.0, 3.0, 2.0)),
        summary("WID-US-2PK", None, None, details(5.0, 0.0, 1.0)),
    ];
    let (targets, stats) =
        fba_inventory::build_targets(&mut conn, "test", &registry.fba, &AllowAll, &rows)
            .expect("targets");

    assert_eq!(stats.skipped_unknown, 0);
    assert_eq!(targets[&(product, registry.fba.stock)], 17.0);
    assert_eq!(targets[&(product, registry.fba.inbound)], 3.0);
    assert_eq!(targets[&(product, registry.fba.reserved)], 3.0);
    assert_eq!(targets[&(product, registry.fba.researching)], 0.0);
    assert_eq!(targets[&(product, registry.fba.unfulfillable)], 0.0);
}

#[test]
fn fnsku_and_asin_fallbacks_backfill_the_keys() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let by_fnsku = seed_product(&mut conn, "B00INV0002", "Widget Two");
    attach_fnsku(&mut conn, by_fnsku, "test", "X002FNSKU");
    let by_asin = seed_product(&mut conn, "B00INV0003", "Widget Three");

    let rows = vec![
        summary("WID-2", Some("X002FNSKU"), None, details(4.0, 0.0, 0.0)),
        summary(
            "WID-3",
            Some("X003FNSKU"),
            Some("B00INV0003"),
            details(6.0, 0.0, 0.0),
        ),
    ];
    let (targets, stats) =
        fba_inventory::build_targets(&mut conn, "test", &registry.fba, &AllowAll, &rows)
            .expect("targets");

    assert_eq!(stats.skipped_unknown, 0);
    assert_eq!(targets[&(by_fnsku, registry.fba.stock)], 4.0);
    assert_eq!(targets[&(by_asin, registry.fba.stock)], 6.0);
    // Both rows left their MSKU behind; the ASIN row its FNSKU as well.
    assert_eq!(count(&mut conn, "product_asin_mskus"), 2);
    assert_eq!(count(&mut conn, "product_asin_fnskus"), 2);
}

#[test]
fn unknown_sku_rows_are_counted_and_skipped() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");

    let rows = vec![summary("GHOST", None, None, details(9.0, 0.0, 0.0))];
    let (targets, stats) =
        fba_inventory::build_targets(&mut conn, "test", &registry.fba, &AllowAll, &rows)
            .expect("targets");

    assert!(targets.is_empty());
    assert_eq!(stats.skipped_unknown, 1);
}

#[test]
fn costless_products_are_skipped_under_the_cost_policy() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let costless = seed_product(&mut conn, "B00INV0004", "Widget Four");
    attach_msku(&mut conn, costless, "test", "WID-4");
    let costed = seed_product(&mut conn, "B00INV0005", "Widget Five");
    attach_msku(&mut conn, costed, "test", "WID-5");
    diesel::update(products::table.find(costed))
        .set(products::cost.eq(7.25))
        .execute(&mut conn)
        .expect("set cost");

    let account = account_with("skip_inventory_when_no_product_cost = true");
    let policy = AccountPolicy::for_account(&account);
    let rows = vec![
        summary("WID-4", None, None, details(10.0, 0.0, 0.0)),
        summary("WID-4", None, None, details(2.0, 0.0, 0.0)),
        summary("WID-5", None, None, details(8.0, 0.0, 0.0)),
    ];
    let (targets, stats) =
        fba_inventory::build_targets(&mut conn, "test", &registry.fba, &policy, &rows)
            .expect("targets");

    // The verdict is cached: two rows for the costless product, one skip.
    assert_eq!(stats.skipped_policy, 1);
    assert!(!targets.contains_key(&(costless, registry.fba.stock)));
    assert_eq!(targets[&(costed, registry.fba.stock)], 8.0);
}

#[test]
fn awd_rows_target_inbound_and_stock_only() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let product = seed_product(&mut conn, "B00INV0006", "Widget Six");
    attach_msku(&mut conn, product, "test", "WID-6");

    let rows = vec![
        AwdInventoryItem {
            sku: "WID-6".into(),
            total_inbound_quantity: 24.0,
            total_onhand_quantity: 100.0,
        },
        AwdInventoryItem {
            sku: "GHOST".into(),
            total_inbound_quantity: 1.0,
            total_onhand_quantity: 1.0,
        },
    ];
    let (targets, stats) =
        awd_inventory::build_targets(&mut conn, "test", &registry.awd, &AllowAll, &rows)
            .expect("targets");

    assert_eq!(stats.skipped_unknown, 1);
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[&(product, registry.awd.inbound)], 24.0);
    assert_eq!(targets[&(product, registry.awd.stock)], 100.0);
}
