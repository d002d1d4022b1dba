//! Product identity resolution.
//!
//! Feeds identify products three different ways: by ASIN (catalog-wide),
//! by MSKU (per account), and by FNSKU (per account). These helpers look a
//! product up by any of those keys, keep the per-account key tables
//! current, and create review-flagged placeholder products for goods that
//! show up in a feed before anyone created them locally.

use diesel::prelude::*;
use diesel::{SqliteConnection, insert_into};
use tracing::info;

use crate::models::{NewProduct, NewProductFnsku, NewProductMsku};
use crate::schema::{product_asin_fnskus, product_asin_mskus, products};

/// Finds a product by catalog ASIN.
pub fn find_by_asin(conn: &mut SqliteConnection, asin: &str) -> anyhow::Result<Option<i32>> {
    let id = products::table
        .filter(products::asin.eq(asin))
        .select(products::id)
        .first::<i32>(conn)
        .optional()?;
    Ok(id)
}

/// Finds a product by per-account merchant SKU.
pub fn find_by_msku(
    conn: &mut SqliteConnection,
    account: &str,
    msku: &str,
) -> anyhow::Result<Option<i32>> {
    let id = product_asin_mskus::table
        .filter(product_asin_mskus::account.eq(account))
        .filter(product_asin_mskus::msku.eq(msku))
        .select(product_asin_mskus::product_id)
        .first::<i32>(conn)
        .optional()?;
    Ok(id)
}

/// Finds a product by per-account fulfillment-network SKU.
pub fn find_by_fnsku(
    conn: &mut SqliteConnection,
    account: &str,
    fnsku: &str,
) -> anyhow::Result<Option<i32>> {
    let id = product_asin_fnskus::table
        .filter(product_asin_fnskus::account.eq(account))
        .filter(product_asin_fnskus::fnsku.eq(fnsku))
        .select(product_asin_fnskus::product_id)
        .first::<i32>(conn)
        .optional()?;
    Ok(id)
}

/// Records an account's MSKU for a product. Existing pairs are left alone.
pub fn ensure_msku(
    conn: &mut SqliteConnection,
    product_id: i32,
    account: &str,
    msku: &str,
) -> anyhow::Result<()> {
    let row = NewProductMsku {
        product_id,
        account,
        msku,
    };
    insert_into(product_asin_mskus::table)
        .values(&row)
        .on_conflict((
            product_asin_mskus::product_id,
            product_asin_mskus::account,
            product_asin_mskus::msku,
        ))
        .do_nothing()
        .execute(conn)?;
    Ok(())
}

/// Records an account's FNSKU for a product. Existing pairs are left alone.
pub fn ensure_fnsku(
    conn: &mut SqliteConnection,
    product_id: i32,
    account: &str,
    fnsku: &str,
) -> anyhow::Result<()> {
    let row = NewProductFnsku {
        product_id,
        account,
        fnsku,
    };
    insert_into(product_asin_fnskus::table)
        .values(&row)
        .on_conflict((
            product_asin_fnskus::product_id,
            product_asin_fnskus::account,
            product_asin_fnskus::fnsku,
        ))
        .do_nothing()
        .execute(conn)?;
    Ok(())
}

/// Creates a review-flagged placeholder product for an identifier seen in
/// a feed before the product exists locally. Returns the new row id.
pub fn create_placeholder(
    conn: &mut SqliteConnection,
    asin: Option<&str>,
    name: &str,
    default_code: Option<&str>,
) -> anyhow::Result<i32> {
    let row = NewProduct {
        asin,
        name,
        default_code,
        needs_review: true,
    };
    let id = insert_into(products::table)
        .values(&row)
        .returning(products::id)
        .get_result::<i32>(conn)?;
    info!(product_id = id, name, "created placeholder product for review");
    Ok(id)
}
