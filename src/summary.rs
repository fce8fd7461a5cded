// 📊 Summary Builder - one row per (vendor, brand) from the purchase side
// Purchases are joined to the catalog (inner), then to sales and freight (left).

use crate::db::BrandKey;
use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

/// Aggregation over purchases, purchase_prices, sales and vendor_invoice.
///
/// Purchase-side columns that are not aggregated (PurchasePrice, Volume,
/// Description, ActualPrice) are bare columns of the GROUP BY; SQLite picks
/// them from an arbitrary row of the group.
///
/// Freight is joined on the sales-side vendor number, so a vendor/brand with
/// no sales also comes back without freight.
pub const VENDOR_SUMMARY_QUERY: &str = "
    WITH
    FreightSummary AS (
        SELECT
            VendorNumber,
            SUM(Freight) AS FreightCost
        FROM vendor_invoice
        GROUP BY VendorNumber
    ),
    PurchaseSummary AS (
        SELECT
            p.VendorNumber,
            p.VendorName,
            p.Brand,
            p.PurchasePrice,
            pp.Volume,
            pp.Description,
            pp.Price AS ActualPrice,
            SUM(p.Quantity) AS TotalPurchaseQuantity,
            SUM(p.Dollars) AS TotalPurchaseDollars
        FROM purchases p
        JOIN purchase_prices pp ON pp.Brand = p.Brand
        WHERE p.PurchasePrice > 0
        GROUP BY p.VendorNumber, p.VendorName, p.Brand
    ),
    SalesSummary AS (
        SELECT
            VendorNumber,
            Brand,
            SUM(SalesDollars) AS TotalSalesDollars,
            SUM(SalesPrice) AS TotalSalesPrice,
            SUM(SalesQuantity) AS TotalSalesQuantity,
            SUM(ExciseTax) AS TotalExciseTax
        FROM sales
        GROUP BY VendorNumber, Brand
    )
    SELECT
        ps.VendorNumber,
        ps.VendorName,
        ps.Brand,
        ps.Description,
        ps.PurchasePrice,
        ps.ActualPrice,
        ps.Volume,
        ps.TotalPurchaseQuantity,
        ps.TotalPurchaseDollars,
        ss.TotalSalesDollars,
        ss.TotalSalesPrice,
        ss.TotalSalesQuantity,
        ss.TotalExciseTax,
        fs.FreightCost
    FROM PurchaseSummary ps
    LEFT JOIN SalesSummary ss ON ps.VendorNumber = ss.VendorNumber AND ps.Brand = ss.Brand
    LEFT JOIN FreightSummary fs ON ss.VendorNumber = fs.VendorNumber
    ORDER BY ps.TotalPurchaseDollars DESC, ps.VendorNumber, ps.Brand";

/// Builder output before cleaning. Every column may be NULL here;
/// `volume` keeps whatever the catalog stored so the Cleaner can coerce it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVendorSummary {
    pub vendor_number: Option<i64>,
    pub vendor_name: Option<String>,
    pub brand: Option<BrandKey>,
    pub description: Option<String>,
    pub purchase_price: Option<f64>,
    pub actual_price: Option<f64>,
    pub volume: Value,
    pub total_purchase_quantity: Option<f64>,
    pub total_purchase_dollars: Option<f64>,
    pub total_sales_dollars: Option<f64>,
    pub total_sales_price: Option<f64>,
    pub total_sales_quantity: Option<f64>,
    pub total_excise_tax: Option<f64>,
    pub freight_cost: Option<f64>,
}

impl RawVendorSummary {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawVendorSummary {
            vendor_number: row.get(0)?,
            vendor_name: text_column(row, 1)?,
            brand: row.get(2)?,
            description: text_column(row, 3)?,
            purchase_price: row.get(4)?,
            actual_price: row.get(5)?,
            volume: row.get(6)?,
            total_purchase_quantity: row.get(7)?,
            total_purchase_dollars: row.get(8)?,
            total_sales_dollars: row.get(9)?,
            total_sales_price: row.get(10)?,
            total_sales_quantity: row.get(11)?,
            total_excise_tax: row.get(12)?,
            freight_cost: row.get(13)?,
        })
    }
}

/// Text columns may hold numbers when an extract was ingested with inferred types
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => None,
        Value::Integer(n) => Some(n.to_string()),
        Value::Real(n) => Some(n.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    })
}

/// Run the aggregation and return one row per purchased (vendor, brand),
/// ordered by total purchase dollars, largest first.
pub fn create_vendor_summary(conn: &Connection) -> Result<Vec<RawVendorSummary>> {
    let mut stmt = conn
        .prepare(VENDOR_SUMMARY_QUERY)
        .context("Failed to build vendor summary")?;

    let rows = stmt
        .query_map([], RawVendorSummary::from_row)
        .context("Failed to build vendor summary")?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read vendor summary rows")?;

    Ok(rows)
}
