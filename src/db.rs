// 🗄️ Inventory Store - connection + source schema
// Four source relations feed the vendor summary: purchases, purchase_prices,
// sales and vendor_invoice. Column names are PascalCase; SQLite matches them
// case-insensitively.

use anyhow::{bail, Context, Result};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ============================================================================
// BRAND KEY
// ============================================================================

/// Brand identifier as stored in the inventory extracts.
/// Real extracts carry integer brand codes, hand-made ones often use names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrandKey {
    Int(i64),
    Text(String),
}

impl BrandKey {
    /// Key used when the null-fill replaces a missing brand
    pub fn zero() -> Self {
        BrandKey::Int(0)
    }
}

impl fmt::Display for BrandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrandKey::Int(code) => write!(f, "{}", code),
            BrandKey::Text(name) => write!(f, "{}", name),
        }
    }
}

impl From<i64> for BrandKey {
    fn from(code: i64) -> Self {
        BrandKey::Int(code)
    }
}

impl From<&str> for BrandKey {
    fn from(name: &str) -> Self {
        BrandKey::Text(name.to_string())
    }
}

impl FromSql for BrandKey {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(code) => Ok(BrandKey::Int(code)),
            ValueRef::Real(code) if code.fract() == 0.0 => Ok(BrandKey::Int(code as i64)),
            ValueRef::Real(code) => Ok(BrandKey::Text(code.to_string())),
            ValueRef::Text(_) => Ok(BrandKey::Text(value.as_str()?.to_string())),
            ValueRef::Null | ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

impl ToSql for BrandKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            BrandKey::Int(code) => Ok(ToSqlOutput::from(*code)),
            BrandKey::Text(name) => Ok(ToSqlOutput::from(name.as_str())),
        }
    }
}

// ============================================================================
// SOURCE ROWS
// ============================================================================

/// One purchase line item (cost side)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub vendor_number: i64,
    pub vendor_name: String,
    pub brand: BrandKey,
    pub purchase_price: f64,
    pub quantity: i64,
    pub dollars: f64,
}

/// Catalog entry, one logical row per brand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceCatalogEntry {
    pub brand: BrandKey,
    pub volume: String,
    pub description: String,
    pub price: f64,
}

/// One sales line item (revenue side)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesLine {
    pub vendor_number: i64,
    pub brand: BrandKey,
    pub sales_dollars: f64,
    pub sales_price: f64,
    pub sales_quantity: i64,
    pub excise_tax: f64,
}

/// Freight cost from a vendor invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreightRecord {
    pub vendor_number: i64,
    pub freight: f64,
}

// ============================================================================
// CONNECTION + SCHEMA
// ============================================================================

/// Open the inventory store at `path` with WAL journaling
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    Ok(conn)
}

pub fn setup_source_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS purchases (
            VendorNumber INTEGER,
            VendorName TEXT,
            Brand,
            PurchasePrice REAL,
            Quantity INTEGER,
            Dollars REAL
        )",
        [],
    )?;

    // Volume stays untyped: extracts sometimes carry it as text
    conn.execute(
        "CREATE TABLE IF NOT EXISTS purchase_prices (
            Brand,
            Volume,
            Description TEXT,
            Price REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sales (
            VendorNumber INTEGER,
            Brand,
            SalesDollars REAL,
            SalesPrice REAL,
            SalesQuantity INTEGER,
            ExciseTax REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS vendor_invoice (
            VendorNumber INTEGER,
            Freight REAL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes on the join keys
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_purchases_vendor_brand ON purchases(VendorNumber, Brand)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_purchase_prices_brand ON purchase_prices(Brand)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sales_vendor_brand ON sales(VendorNumber, Brand)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_vendor_invoice_vendor ON vendor_invoice(VendorNumber)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// INSERT HELPERS
// ============================================================================

pub fn insert_purchases(conn: &Connection, lines: &[PurchaseLine]) -> Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO purchases (VendorNumber, VendorName, Brand, PurchasePrice, Quantity, Dollars)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for line in lines {
        stmt.execute(params![
            line.vendor_number,
            line.vendor_name,
            line.brand,
            line.purchase_price,
            line.quantity,
            line.dollars,
        ])?;
    }

    Ok(lines.len())
}

pub fn insert_price_catalog(conn: &Connection, entries: &[PriceCatalogEntry]) -> Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO purchase_prices (Brand, Volume, Description, Price) VALUES (?1, ?2, ?3, ?4)",
    )?;

    for entry in entries {
        stmt.execute(params![entry.brand, entry.volume, entry.description, entry.price])?;
    }

    Ok(entries.len())
}

pub fn insert_sales(conn: &Connection, lines: &[SalesLine]) -> Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO sales (VendorNumber, Brand, SalesDollars, SalesPrice, SalesQuantity, ExciseTax)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for line in lines {
        stmt.execute(params![
            line.vendor_number,
            line.brand,
            line.sales_dollars,
            line.sales_price,
            line.sales_quantity,
            line.excise_tax,
        ])?;
    }

    Ok(lines.len())
}

pub fn insert_freight(conn: &Connection, records: &[FreightRecord]) -> Result<usize> {
    let mut stmt =
        conn.prepare("INSERT INTO vendor_invoice (VendorNumber, Freight) VALUES (?1, ?2)")?;

    for record in records {
        stmt.execute(params![record.vendor_number, record.freight])?;
    }

    Ok(records.len())
}

/// Row count of a table; `table` must be a plain identifier
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    if !is_valid_identifier(table) {
        bail!("Invalid table name: {:?}", table);
    }

    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .with_context(|| format!("Failed to count rows in {}", table))?;

    Ok(count)
}

/// Check that `name` is a plain SQL identifier that can be spliced into DDL
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
