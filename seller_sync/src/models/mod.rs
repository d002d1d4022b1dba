//! Row and insert types for the warehouse tables.
//!
//! Each struct maps one table declared in [`crate::schema`] (and created by
//! the embedded migrations) onto Diesel's Queryable/Insertable APIs:
//! - [`inventory`]: products, identifier mappings, warehouses, locations,
//!   stock levels
//! - [`movements`]: transfers and their moves, ledger entries, address
//!   mappings
//! - [`sales`]: partners, taxes, sale orders and lines, invoices, listing
//!   fees
//!
//! See migrations for constraints and triggers (e.g., `updated_at` triggers
//! on `products` and `transfers`, UNIQUE natural keys on `ledger_entries`
//! and `address_mappings`).

pub mod inventory;
pub mod movements;
pub mod sales;

pub use inventory::{
    NewProduct, NewProductFnsku, NewProductMsku, NewStockLevel, NewStockLocation, NewWarehouse,
    Product, ProductFnsku, ProductMsku, StockLevel, StockLocation, Warehouse,
};
pub use movements::{
    AddressMapping, LedgerEntry, NewAddressMapping, NewLedgerEntry, NewTransfer, NewTransferMove,
    Transfer, TransferMove,
};
pub use sales::{
    Invoice, ListingFee, NewInvoice, NewListingFee, NewPartner, NewSaleOrder, NewSaleOrderLine,
    NewTax, Partner, SaleOrder, SaleOrderLine, Tax,
};
