// 💾 Writer - persist the enriched summary table

use crate::cleaning::VendorSalesSummary;
use crate::db::is_valid_identifier;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DESTINATION: &str = "vendor_sales_summary";

/// How an existing destination table is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Drop and recreate the table
    #[default]
    Replace,
    /// Create if missing, then add rows
    Append,
}

/// Output columns, in order
pub const SUMMARY_COLUMNS: [&str; 18] = [
    "VendorNumber",
    "VendorName",
    "Brand",
    "Description",
    "PurchasePrice",
    "ActualPrice",
    "Volume",
    "TotalPurchaseQuantity",
    "TotalPurchaseDollars",
    "TotalSalesDollars",
    "TotalSalesPrice",
    "TotalSalesQuantity",
    "TotalExciseTax",
    "FreightCost",
    "GrossProfit",
    "ProfitMargin",
    "StockTurnover",
    "SalesToPurchaseRatio",
];

pub(crate) fn ensure_identifier(table: &str) -> Result<()> {
    if !is_valid_identifier(table) {
        bail!("Invalid table name: {:?}", table);
    }
    Ok(())
}

fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            VendorNumber INTEGER,
            VendorName TEXT,
            Brand,
            Description TEXT,
            PurchasePrice REAL,
            ActualPrice REAL,
            Volume REAL,
            TotalPurchaseQuantity REAL,
            TotalPurchaseDollars REAL,
            TotalSalesDollars REAL,
            TotalSalesPrice REAL,
            TotalSalesQuantity REAL,
            TotalExciseTax REAL,
            FreightCost REAL,
            GrossProfit REAL,
            ProfitMargin REAL,
            StockTurnover REAL,
            SalesToPurchaseRatio REAL
        )",
        table
    )
}

/// Write `rows` into `table`. Returns the number of rows inserted.
///
/// All statements run in one transaction; on error the store decides what
/// is left behind.
pub fn write_summary(
    conn: &mut Connection,
    rows: &[VendorSalesSummary],
    table: &str,
    mode: WriteMode,
) -> Result<usize> {
    ensure_identifier(table)?;

    let tx = conn.transaction()?;

    if mode == WriteMode::Replace {
        tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])
            .with_context(|| format!("Failed to drop {}", table))?;
    }
    tx.execute(&create_table_sql(table), [])
        .with_context(|| format!("Failed to create {}", table))?;

    {
        let placeholders = (1..=SUMMARY_COLUMNS.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            SUMMARY_COLUMNS.join(", "),
            placeholders
        ))?;

        for row in rows {
            stmt.execute(params![
                row.vendor_number,
                row.vendor_name,
                row.brand,
                row.description,
                row.purchase_price,
                row.actual_price,
                row.volume,
                row.total_purchase_quantity,
                row.total_purchase_dollars,
                row.total_sales_dollars,
                row.total_sales_price,
                row.total_sales_quantity,
                row.total_excise_tax,
                row.freight_cost,
                row.gross_profit,
                row.profit_margin,
                row.stock_turnover,
                row.sales_to_purchase_ratio,
            ])
            .with_context(|| format!("Failed to insert into {}", table))?;
        }
    }

    tx.commit().with_context(|| format!("Failed to commit {}", table))?;

    Ok(rows.len())
}

/// Read a written summary back, largest purchase dollars first
pub fn load_summary(
    conn: &Connection,
    table: &str,
    limit: Option<usize>,
) -> Result<Vec<VendorSalesSummary>> {
    ensure_identifier(table)?;

    let limit = limit.map(|n| n as i64).unwrap_or(-1);
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM {} ORDER BY TotalPurchaseDollars DESC, VendorNumber, Brand LIMIT ?1",
            SUMMARY_COLUMNS.join(", "),
            table
        ))
        .with_context(|| format!("Failed to read {}", table))?;

    let rows = stmt
        .query_map([limit], |row| {
            Ok(VendorSalesSummary {
                vendor_number: row.get(0)?,
                vendor_name: row.get(1)?,
                brand: row.get(2)?,
                description: row.get(3)?,
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
                gross_profit: row.get(14)?,
                profit_margin: row.get(15)?,
                stock_turnover: row.get(16)?,
                sales_to_purchase_ratio: row.get(17)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::clean_data;
    use crate::db::count_rows;
    use crate::summary::create_vendor_summary;
    use crate::test_support::*;

    fn cleaned(conn: &Connection) -> Vec<VendorSalesSummary> {
        clean_data(create_vendor_summary(conn).unwrap()).unwrap()
    }

    #[test]
    fn test_replace_round_trip() {
        let mut conn = mixed_store();
        let rows = cleaned(&conn);

        let written = write_summary(&mut conn, &rows, DEFAULT_DESTINATION, WriteMode::Replace).unwrap();
        assert_eq!(written, 3);

        let loaded = load_summary(&conn, DEFAULT_DESTINATION, None).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_replace_discards_previous_rows() {
        let mut conn = mixed_store();
        let rows = cleaned(&conn);

        write_summary(&mut conn, &rows, DEFAULT_DESTINATION, WriteMode::Replace).unwrap();
        write_summary(&mut conn, &rows, DEFAULT_DESTINATION, WriteMode::Replace).unwrap();

        assert_eq!(count_rows(&conn, DEFAULT_DESTINATION).unwrap(), 3);
    }

    #[test]
    fn test_append_keeps_previous_rows() {
        let mut conn = mixed_store();
        let rows = cleaned(&conn);

        write_summary(&mut conn, &rows, "summary_log", WriteMode::Append).unwrap();
        write_summary(&mut conn, &rows, "summary_log", WriteMode::Append).unwrap();

        assert_eq!(count_rows(&conn, "summary_log").unwrap(), 6);
    }

    #[test]
    fn test_undefined_ratios_stored_as_null() {
        let mut conn = mixed_store();
        let rows = cleaned(&conn);
        write_summary(&mut conn, &rows, DEFAULT_DESTINATION, WriteMode::Replace).unwrap();

        let nulls: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM vendor_sales_summary WHERE ProfitMargin IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn test_load_with_limit() {
        let mut conn = mixed_store();
        let rows = cleaned(&conn);
        write_summary(&mut conn, &rows, DEFAULT_DESTINATION, WriteMode::Replace).unwrap();

        let top = load_summary(&conn, DEFAULT_DESTINATION, Some(1)).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].total_purchase_dollars, 200.0);
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let mut conn = mixed_store();
        let rows = cleaned(&conn);

        let err = write_summary(&mut conn, &rows, "x; DROP TABLE sales", WriteMode::Replace).unwrap_err();
        assert!(err.to_string().contains("Invalid table name"));
        assert_eq!(count_rows(&conn, "sales").unwrap(), 5);
    }
}
