#![allow(dead_code)]

use std::path::PathBuf;

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Text};
use seller_sync::accounts::{self, Account};
use seller_sync::db::{connection, migrate};
use seller_sync::schema::{product_asin_fnskus, product_asin_mskus, products, stock_levels};
use seller_sync::stock::{SqliteStockService, StockMovementService};
use tempfile::TempDir;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}

#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}

#[derive(QueryableByName)]
struct RowCount {
    #[diesel(sql_type = Integer)]
    cnt: i32,
}

#[derive(QueryableByName)]
struct FkViolation {
    #[diesel(sql_type = Text, column_name = "table")]
    table_name: String,
}

pub struct TestDb {
    _dir: TempDir, // keep alive for the life of the test
    pub path: String,
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run(&path).expect("migrations");
    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal");

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

pub fn count(conn: &mut SqliteConnection, table: &str) -> i32 {
    let row: RowCount = sql_query(format!("SELECT COUNT(*) AS cnt FROM {table};"))
        .get_result(conn)
        .expect("count");
    row.cnt
}

pub fn fk_check_empty(conn: &mut SqliteConnection) {
    let rows: Vec<FkViolation> = sql_query("PRAGMA foreign_key_check;")
        .load(conn)
        .expect("fk check");
    assert!(
        rows.is_empty(),
        "foreign key violations in {:?}",
        rows.iter().map(|r| r.table_name.clone()).collect::<Vec<_>>()
    );
}

pub fn seed_product(conn: &mut SqliteConnection, asin: &str, name: &str) -> i32 {
    diesel::insert_into(products::table)
        .values((products::asin.eq(asin), products::name.eq(name)))
        .returning(products::id)
        .get_result(conn)
        .expect("seed product")
}

pub fn attach_msku(conn: &mut SqliteConnection, product_id: i32, account: &str, msku: &str) {
    diesel::insert_into(product_asin_mskus::table)
        .values((
            product_asin_mskus::product_id.eq(product_id),
            product_asin_mskus::account.eq(account),
            product_asin_mskus::msku.eq(msku),
        ))
        .execute(conn)
        .expect("attach msku");
}

pub fn attach_fnsku(conn: &mut SqliteConnection, product_id: i32, account: &str, fnsku: &str) {
    diesel::insert_into(product_asin_fnskus::table)
        .values((
            product_asin_fnskus::product_id.eq(product_id),
            product_asin_fnskus::account.eq(account),
            product_asin_fnskus::fnsku.eq(fnsku),
        ))
        .execute(conn)
        .expect("attach fnsku");
}

pub fn set_level(conn: &mut SqliteConnection, product_id: i32, location_id: i32, quantity: f64) {
    diesel::insert_into(stock_levels::table)
        .values((
            stock_levels::product_id.eq(product_id),
            stock_levels::location_id.eq(location_id),
            stock_levels::quantity.eq(quantity),
        ))
        .on_conflict((stock_levels::product_id, stock_levels::location_id))
        .do_update()
        .set(stock_levels::quantity.eq(quantity))
        .execute(conn)
        .expect("set level");
}

pub fn level(conn: &mut SqliteConnection, product_id: i32, location_id: i32) -> f64 {
    SqliteStockService
        .on_hand(conn, product_id, location_id)
        .expect("on hand")
}

/// Builds one runtime account named `test` with the given extra TOML lines.
pub fn account_with(toggles: &str) -> Account {
    let toml = format!(
        r#"
[accounts.test]
marketplace = "us"
client_id = "amzn1.application-oa2-client.0"
client_secret = "secret"
refresh_token = "token"
{toggles}
"#
    );
    let file = accounts::load_accounts_str(&toml).expect("accounts toml");
    let mut runtime = accounts::runtime_accounts(&file).expect("runtime accounts");
    runtime.remove(0)
}
