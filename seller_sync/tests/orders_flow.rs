mod common;
use common::{account_with, attach_msku, count, fk_check_empty, level, seed_product, set_level, setup_db};

use diesel::prelude::*;
use seller_sync::registry::Registry;
use seller_sync::schema::{invoices, partners, sale_orders, taxes};
use seller_sync::stock::{SqliteStockService, StockMovementService};
use seller_sync::sync::orders::{OrderOutcome, import_order};
use spapi_ingestor::models::orders::{Money, Order, OrderAddress, OrderItem};

fn usd(amount: &str) -> Option<Money> {
    Some(Money {
        currency_code: Some("USD".into()),
        amount: Some(amount.into()),
    })
}

fn order(id: &str) -> Order {
    Order {
        amazon_order_id: id.into(),
        order_status: "Shipped".into(),
        fulfillment_channel: Some("AFN".into()),
        purchase_date: Some("2025-06-11T18:02:11Z".into()),
        latest_ship_date: Some("2025-06-13T06:59:59Z".into()),
        shipping_address: Some(OrderAddress {
            city: "SEATTLE".into(),
            state_or_region: "WA".into(),
            postal_code: "98109".into(),
            country_code: "US".into(),
        }),
    }
}

fn order_item(asin: &str, sku: &str, qty: i64, price: &str, tax: &str) -> OrderItem {
    OrderItem {
        asin: asin.into(),
        seller_sku: Some(sku.into()),
        quantity_ordered: qty,
        item_price: usd(price),
        item_tax: usd(tax),
        promotional_discount: None,
        promotional_discount_tax: None,
        shipping_price: None,
        shipping_tax: None,
        shipping_discount: None,
        shipping_discount_tax: None,
    }
}

fn full_import_account() -> seller_sync::accounts::Account {
    account_with(
        "import_fba_orders = true\n\
         import_fba_order_tax = true\n\
         import_fba_order_shipping = true\n\
         invoice_fba_orders = true",
    )
}

#[test]
fn shipped_fba_order_books_sale_and_stock_move() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let service = SqliteStockService;
    let account = full_import_account();
    let product = seed_product(&mut conn, "B00ORD0001", "Widget");
    attach_msku(&mut conn, product, "test", "WID-O1");
    set_level(&mut conn, product, registry.fba.stock, 10.0);

    let mut item = order_item("B00ORD0001", "WID-O1", 2, "40.00", "3.20");
    item.shipping_price = usd("5.00");
    item.shipping_tax = usd("0.40");
    item.shipping_discount = usd("1.00");
    item.shipping_discount_tax = usd("0.08");
    let ord = order("111-2223334-5556667");

    let outcome =
        import_order(&mut conn, &service, &registry, &account, &ord, &[item]).expect("import");
    assert_eq!(outcome, OrderOutcome::Imported);

    let (state, order_date, commitment): (String, String, Option<String>) = sale_orders::table
        .filter(sale_orders::reference.eq("SO/111-2223334-5556667"))
        .select((
            sale_orders::state,
            sale_orders::order_date,
            sale_orders::commitment_date,
        ))
        .first(&mut conn)
        .expect("sale order");
    assert_eq!(state, "done");
    assert_eq!(order_date, "2025-06-11T18:02:11Z");
    assert_eq!(commitment.as_deref(), Some("2025-06-12T18:02:11Z"));

    // Item line plus shipping line.
    assert_eq!(count(&mut conn, "sale_order_lines"), 2);

    // 40.00 + 3.20 tax + 4.00 net shipping + 0.32 shipping tax.
    let (inv_state, total): (String, f64) = invoices::table
        .select((invoices::state, invoices::total))
        .first(&mut conn)
        .expect("invoice");
    assert_eq!(inv_state, "posted");
    assert!((total - 47.52).abs() < 1e-9);

    // Item tax and shipping tax both derive to the same 8% profile.
    let tax_names: Vec<String> = taxes::table.select(taxes::name).load(&mut conn).unwrap();
    assert_eq!(tax_names, vec!["8%".to_string()]);

    // Sold units leave FBA stock for the customers location.
    assert_eq!(level(&mut conn, product, registry.fba.stock), 8.0);
    assert_eq!(level(&mut conn, product, registry.customers), 2.0);
    assert!(
        service
            .find_transfer(&mut conn, "SO/111-2223334-5556667")
            .expect("find")
            .is_some()
    );

    let (partner_name, city): (String, Option<String>) = partners::table
        .select((partners::name, partners::city))
        .first(&mut conn)
        .expect("partner");
    assert_eq!(partner_name, "Amazon customer 111-2223334-5556667");
    assert_eq!(city.as_deref(), Some("SEATTLE"));

    fk_check_empty(&mut conn);
}

#[test]
fn same_order_id_imports_once() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let service = SqliteStockService;
    let account = full_import_account();
    let product = seed_product(&mut conn, "B00ORD0002", "Widget");
    attach_msku(&mut conn, product, "test", "WID-O2");
    set_level(&mut conn, product, registry.fba.stock, 5.0);

    let ord = order("222-0000000-0000001");
    let items = [order_item("B00ORD0002", "WID-O2", 1, "10.00", "0.80")];

    let first = import_order(&mut conn, &service, &registry, &account, &ord, &items).expect("first");
    let second =
        import_order(&mut conn, &service, &registry, &account, &ord, &items).expect("second");

    assert_eq!(first, OrderOutcome::Imported);
    assert_eq!(second, OrderOutcome::AlreadyImported);
    assert_eq!(count(&mut conn, "sale_orders"), 1);
    assert_eq!(count(&mut conn, "transfers"), 1);
    assert_eq!(level(&mut conn, product, registry.fba.stock), 4.0);
}

#[test]
fn consolidated_account_books_against_one_partner() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let service = SqliteStockService;
    let account = account_with(
        "import_fba_orders = true\nconsolidated_fba_order_customer = true",
    );
    let product = seed_product(&mut conn, "B00ORD0003", "Widget");
    attach_msku(&mut conn, product, "test", "WID-O3");
    set_level(&mut conn, product, registry.fba.stock, 5.0);

    for id in ["333-0000000-0000001", "333-0000000-0000002"] {
        let items = [order_item("B00ORD0003", "WID-O3", 1, "10.00", "0.80")];
        import_order(&mut conn, &service, &registry, &account, &order(id), &items)
            .expect("import");
    }

    assert_eq!(count(&mut conn, "sale_orders"), 2);
    assert_eq!(count(&mut conn, "partners"), 1);
    let name: String = partners::table
        .select(partners::name)
        .first(&mut conn)
        .unwrap();
    assert_eq!(name, "Amazon_FBA");
    // Tax import is off for this account.
    assert_eq!(count(&mut conn, "taxes"), 0);
    assert_eq!(count(&mut conn, "invoices"), 0);
}

#[test]
fn non_fba_and_unshipped_orders_are_skipped() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let service = SqliteStockService;
    let account = full_import_account();

    let mut pending = order("444-0000000-0000001");
    pending.order_status = "Pending".into();
    let mut merchant = order("444-0000000-0000002");
    merchant.fulfillment_channel = Some("MFN".into());

    let items = [order_item("B00ORD0004", "WID-O4", 1, "10.00", "0.00")];
    for ord in [&pending, &merchant] {
        let outcome =
            import_order(&mut conn, &service, &registry, &account, ord, &items).expect("import");
        assert!(matches!(outcome, OrderOutcome::Skipped(_)));
    }
    assert_eq!(count(&mut conn, "sale_orders"), 0);
    assert_eq!(count(&mut conn, "transfers"), 0);
}

#[test]
fn zero_quantity_orders_are_skipped_before_any_write() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let service = SqliteStockService;
    let account = full_import_account();

    let items = [order_item("B00ORD0005", "WID-O5", 0, "0.00", "0.00")];
    let outcome = import_order(
        &mut conn,
        &service,
        &registry,
        &account,
        &order("555-0000000-0000001"),
        &items,
    )
    .expect("import");

    assert_eq!(outcome, OrderOutcome::Skipped("no shippable lines".into()));
    assert_eq!(count(&mut conn, "sale_orders"), 0);
    assert_eq!(count(&mut conn, "partners"), 0);
}

#[test]
fn distinct_tax_percents_get_distinct_profiles() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let service = SqliteStockService;
    let account = full_import_account();
    let product = seed_product(&mut conn, "B00ORD0006", "Widget");
    attach_msku(&mut conn, product, "test", "WID-O6");

    // 8% twice, 8.25% once.
    let batches = [
        ("666-0000000-0000001", "10.00", "0.80"),
        ("666-0000000-0000002", "20.00", "1.60"),
        ("666-0000000-0000003", "20.00", "1.65"),
    ];
    for (id, price, tax) in batches {
        let items = [order_item("B00ORD0006", "WID-O6", 1, price, tax)];
        import_order(&mut conn, &service, &registry, &account, &order(id), &items)
            .expect("import");
    }

    let mut names: Vec<String> = taxes::table.select(taxes::name).load(&mut conn).unwrap();
    names.sort();
    assert_eq!(names, vec!["8%".to_string(), "8.25%".to_string()]);
}

#[test]
fn unknown_asin_fails_the_order_and_rolls_it_back() {
    let (_db, mut conn) = setup_db();
    let registry = Registry::init(&mut conn).expect("registry");
    let service = SqliteStockService;
    let account = full_import_account();
    let known = seed_product(&mut conn, "B00ORD0009", "Widget Nine");
    attach_msku(&mut conn, known, "test", "WID-9");
    set_level(&mut conn, known, registry.fba.stock, 10.0);

    let items = [
        order_item("B00ORD0009", "WID-9", 1, "20.00", "1.60"),
        order_item("B00GHOST01", "GHOST-1", 1, "15.00", "0.00"),
    ];
    let err = import_order(
        &mut conn,
        &service,
        &registry,
        &account,
        &order("777-0000000-0000001"),
        &items,
    )
    .expect_err("unknown product must fail the order");

    assert!(err.to_string().contains("B00GHOST01"));
    // Nothing partial survives the rollback, not even the known line.
    assert_eq!(count(&mut conn, "sale_orders"), 0);
    assert_eq!(count(&mut conn, "sale_order_lines"), 0);
    assert_eq!(count(&mut conn, "transfers"), 0);
    assert_eq!(level(&mut conn, known, registry.fba.stock), 10.0);
}
