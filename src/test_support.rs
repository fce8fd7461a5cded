// Shared fixtures for the in-memory store tests

use crate::db::{
    insert_freight, insert_price_catalog, insert_purchases, insert_sales, setup_source_schema,
    BrandKey, FreightRecord, PriceCatalogEntry, PurchaseLine, SalesLine,
};
use rusqlite::Connection;

pub fn purchase(vendor: i64, name: &str, brand: &str, price: f64, qty: i64, dollars: f64) -> PurchaseLine {
    PurchaseLine {
        vendor_number: vendor,
        vendor_name: name.to_string(),
        brand: BrandKey::from(brand),
        purchase_price: price,
        quantity: qty,
        dollars,
    }
}

pub fn catalog(brand: &str, volume: &str, description: &str, price: f64) -> PriceCatalogEntry {
    PriceCatalogEntry {
        brand: BrandKey::from(brand),
        volume: volume.to_string(),
        description: description.to_string(),
        price,
    }
}

pub fn sale(vendor: i64, brand: &str, dollars: f64, price: f64, qty: i64, excise: f64) -> SalesLine {
    SalesLine {
        vendor_number: vendor,
        brand: BrandKey::from(brand),
        sales_dollars: dollars,
        sales_price: price,
        sales_quantity: qty,
        excise_tax: excise,
    }
}

pub fn freight(vendor: i64, amount: f64) -> FreightRecord {
    FreightRecord {
        vendor_number: vendor,
        freight: amount,
    }
}

/// Empty in-memory store with the source schema in place
pub fn empty_store() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    setup_source_schema(&conn).unwrap();
    conn
}

/// The single-row Acme scenario: purchases 50.0, sales 60.0, freight 3.0
pub fn acme_store() -> Connection {
    let conn = empty_store();
    insert_purchases(&conn, &[purchase(1, "Acme", "BrandA", 10.0, 5, 50.0)]).unwrap();
    insert_price_catalog(&conn, &[catalog("BrandA", "1.0", "desc", 12.0)]).unwrap();
    insert_sales(&conn, &[sale(1, "BrandA", 60.0, 12.0, 5, 2.0)]).unwrap();
    insert_freight(&conn, &[freight(1, 3.0)]).unwrap();
    conn
}

/// A mixed store:
/// - vendor 1 / BrandA: two purchase lines plus a zero-price line, sold, freighted twice
/// - vendor 1 / BrandB: purchased only
/// - vendor 2 / BrandC: purchased, but BrandC is missing from the catalog
/// - vendor 2 / BrandD: purchased and sold, padded vendor name and description
/// - vendor 3 / BrandA: sold only, never purchased
pub fn mixed_store() -> Connection {
    let conn = empty_store();
    insert_purchases(
        &conn,
        &[
            purchase(1, "Acme", "BrandA", 10.0, 5, 50.0),
            purchase(1, "Acme", "BrandA", 10.0, 3, 30.0),
            purchase(1, "Acme", "BrandA", 0.0, 100, 0.0),
            purchase(1, "Acme", "BrandB", 4.0, 10, 40.0),
            purchase(2, "Bolt", "BrandC", 7.0, 2, 14.0),
            purchase(2, "  Bolt Spirits ", "BrandD", 20.0, 10, 200.0),
        ],
    )
    .unwrap();
    insert_price_catalog(
        &conn,
        &[
            catalog("BrandA", "750", "Alpha Gin", 12.0),
            catalog("BrandB", "1000", "Beta Rum", 6.0),
            catalog("BrandD", " 375 ", "  Delta Vodka  ", 25.0),
        ],
    )
    .unwrap();
    insert_sales(
        &conn,
        &[
            sale(1, "BrandA", 60.0, 12.0, 5, 2.0),
            sale(1, "BrandA", 36.0, 12.0, 3, 1.0),
            sale(2, "BrandD", 250.0, 25.0, 10, 4.0),
            sale(2, "BrandC", 99.0, 9.0, 11, 1.0),
            sale(3, "BrandA", 500.0, 12.0, 40, 9.0),
        ],
    )
    .unwrap();
    insert_freight(&conn, &[freight(1, 3.0), freight(1, 2.0), freight(2, 8.5), freight(3, 1.0)])
        .unwrap();
    conn
}
