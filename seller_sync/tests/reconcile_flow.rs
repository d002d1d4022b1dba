mod common;
use common::{count, fk_check_empty, level, seed_product, set_level, setup_db};

use seller_sync::reconcile::Reconciler;
use seller_sync::registry::Registry;
use seller_sync::stock::{MoveLine, SqliteStockService, StockMovementService, TransferState, execute_transfer};

#[test]
fn surplus_is_brought_in_from_adjustment() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let product = seed_product(&mut conn, "B00AAA0001", "Widget");
    set_level(&mut conn, product, registry.fba.stock, 30.0);

    let service = SqliteStockService;
    let engine = Reconciler::new(&service, registry.fba.adjustment);
    let moved = engine
        .reconcile_and_apply(&mut conn, product, registry.fba.stock, 50.0, "ADJ/T/1")
        .expect("reconcile");

    assert!(moved);
    assert_eq!(level(&mut conn, product, registry.fba.stock), 50.0);
    // Flow conservation: the adjustment location absorbs exactly -delta.
    assert_eq!(level(&mut conn, product, registry.fba.adjustment), -20.0);
    assert_eq!(count(&mut conn, "transfers"), 1);
    fk_check_empty(&mut conn);
}

#[test]
fn matching_level_makes_no_movement() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let product = seed_product(&mut conn, "B00AAA0002", "Widget");
    set_level(&mut conn, product, registry.fba.stock, 10.0);

    let service = SqliteStockService;
    let engine = Reconciler::new(&service, registry.fba.adjustment);
    let moved = engine
        .reconcile_and_apply(&mut conn, product, registry.fba.stock, 10.0, "ADJ/T/2")
        .expect("reconcile");

    assert!(!moved);
    assert_eq!(count(&mut conn, "transfers"), 0);
}

#[test]
fn deficit_flows_back_to_adjustment() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let product = seed_product(&mut conn, "B00AAA0003", "Widget");
    set_level(&mut conn, product, registry.fba.stock, 5.0);

    let service = SqliteStockService;
    let engine = Reconciler::new(&service, registry.fba.adjustment);
    let moved = engine
        .reconcile_and_apply(&mut conn, product, registry.fba.stock, 0.0, "ADJ/T/3")
        .expect("reconcile");

    assert!(moved);
    assert_eq!(level(&mut conn, product, registry.fba.stock), 0.0);
    assert_eq!(level(&mut conn, product, registry.fba.adjustment), 5.0);
}

#[test]
fn second_reconcile_with_same_target_is_a_noop() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let product = seed_product(&mut conn, "B00AAA0004", "Widget");

    let service = SqliteStockService;
    let engine = Reconciler::new(&service, registry.fba.adjustment);
    let first = engine
        .reconcile_and_apply(&mut conn, product, registry.fba.stock, 42.0, "ADJ/T/4")
        .expect("first");
    let second = engine
        .reconcile_and_apply(&mut conn, product, registry.fba.stock, 42.0, "ADJ/T/4b")
        .expect("second");

    assert!(first);
    assert!(!second);
    assert_eq!(level(&mut conn, product, registry.fba.stock), 42.0);
    assert_eq!(count(&mut conn, "transfers"), 1);
}

#[test]
fn negative_target_is_rejected() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let product = seed_product(&mut conn, "B00AAA0005", "Widget");

    let service = SqliteStockService;
    let engine = Reconciler::new(&service, registry.fba.adjustment);
    let err = engine
        .reconcile(&mut conn, product, registry.fba.stock, -1.0)
        .unwrap_err();
    assert!(err.to_string().contains("negative"));
}

#[test]
fn transfer_lifecycle_runs_to_done_and_applies_levels() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let product = seed_product(&mut conn, "B00AAA0006", "Widget");
    set_level(&mut conn, product, registry.fba.inbound, 7.0);

    let service = SqliteStockService;
    let lines = [MoveLine {
        product_id: product,
        source_location_id: registry.fba.inbound,
        dest_location_id: registry.fba.stock,
        quantity: 7.0,
    }];
    let handle = execute_transfer(&service, &mut conn, "T/LIFECYCLE", &lines).expect("transfer");

    assert_eq!(handle.state, TransferState::Done);
    assert_eq!(level(&mut conn, product, registry.fba.inbound), 0.0);
    assert_eq!(level(&mut conn, product, registry.fba.stock), 7.0);

    let found = service
        .find_transfer(&mut conn, "T/LIFECYCLE")
        .expect("find")
        .expect("exists");
    assert_eq!(found.id, handle.id);
    assert_eq!(found.state, TransferState::Done);

    let stored = service.transfer_lines(&mut conn, handle.id).expect("lines");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].reversed().source_location_id, registry.fba.stock);
}

#[test]
fn empty_or_nonpositive_lines_are_rejected() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let product = seed_product(&mut conn, "B00AAA0007", "Widget");

    let service = SqliteStockService;
    assert!(service.create_transfer(&mut conn, "T/EMPTY", &[]).is_err());

    let zero = [MoveLine {
        product_id: product,
        source_location_id: registry.fba.inbound,
        dest_location_id: registry.fba.stock,
        quantity: 0.0,
    }];
    assert!(service.create_transfer(&mut conn, "T/ZERO", &zero).is_err());
}
