mod common;
use common::{count, fk_check_empty, setup_db};

use diesel::prelude::*;
use seller_sync::registry::Registry;
use seller_sync::schema::stock_locations;

#[test]
fn init_creates_the_fixed_layout() {
    let (_db, mut conn) = setup_db();

    let registry = Registry::init(&mut conn).expect("init");

    assert_eq!(count(&mut conn, "warehouses"), 2);
    assert_eq!(count(&mut conn, "stock_locations"), 12);

    let kinds: Vec<(String, String)> = stock_locations::table
        .select((stock_locations::code, stock_locations::kind))
        .order(stock_locations::code.asc())
        .load(&mut conn)
        .expect("locations");
    let kind_of = |code: &str| {
        kinds
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, k)| k.as_str())
            .expect("location exists")
    };
    assert_eq!(kind_of("FBA/STOCK"), "internal");
    assert_eq!(kind_of("TRANSIT/FBA"), "transit");
    assert_eq!(kind_of("ADJ/AWD"), "adjustment");
    assert_eq!(kind_of("CUSTOMERS"), "customer");

    // Distinct handles, nothing aliased.
    let mut ids = vec![
        registry.fba.inbound,
        registry.fba.stock,
        registry.fba.reserved,
        registry.fba.researching,
        registry.fba.unfulfillable,
        registry.fba.transit,
        registry.fba.adjustment,
        registry.awd.inbound,
        registry.awd.stock,
        registry.awd.transit,
        registry.awd.adjustment,
        registry.customers,
    ];
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 12);

    fk_check_empty(&mut conn);
}

#[test]
fn init_is_idempotent() {
    let (_db, mut conn) = setup_db();

    let first = Registry::init(&mut conn).expect("first init");
    let second = Registry::init(&mut conn).expect("second init");

    assert_eq!(count(&mut conn, "warehouses"), 2);
    assert_eq!(count(&mut conn, "stock_locations"), 12);
    assert_eq!(first.fba.stock, second.fba.stock);
    assert_eq!(first.fba.adjustment, second.fba.adjustment);
    assert_eq!(first.awd.inbound, second.awd.inbound);
    assert_eq!(first.customers, second.customers);
}
