// 🧹 Cleaner/Enricher - type coercion, null fill, trimming, derived ratios
//
// Null fill is blanket: every missing value becomes zero, text columns
// included ("0"). Derived columns are computed from the cleaned row.

use crate::db::BrandKey;
use crate::summary::RawVendorSummary;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CleanError {
    #[error("row {row}: cannot convert {column} value {value:?} to a number")]
    TypeConversion {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// A cleaned, enriched vendor/brand summary row (the persisted shape).
///
/// Ratio columns are `None` when the division has no finite result
/// (zero denominator); they are written as SQL NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSalesSummary {
    pub vendor_number: i64,
    pub vendor_name: String,
    pub brand: BrandKey,
    pub description: String,
    pub purchase_price: f64,
    pub actual_price: f64,
    pub volume: f64,
    pub total_purchase_quantity: f64,
    pub total_purchase_dollars: f64,
    pub total_sales_dollars: f64,
    pub total_sales_price: f64,
    pub total_sales_quantity: f64,
    pub total_excise_tax: f64,
    pub freight_cost: f64,
    pub gross_profit: f64,
    pub profit_margin: Option<f64>,
    pub stock_turnover: Option<f64>,
    pub sales_to_purchase_ratio: Option<f64>,
}

impl VendorSalesSummary {
    /// Recompute the four derived columns from this row's own values
    fn enrich(&mut self) {
        self.gross_profit = self.total_sales_dollars - self.total_purchase_dollars;
        self.profit_margin = finite_ratio(self.gross_profit, self.total_sales_dollars).map(|m| m * 100.0);
        // Expected <= 1; above 1 means older stock was sold off
        self.stock_turnover = finite_ratio(self.total_sales_quantity, self.total_purchase_quantity);
        self.sales_to_purchase_ratio = finite_ratio(self.total_sales_dollars, self.total_purchase_dollars);
    }
}

/// Feed a cleaned row back through the Cleaner
impl From<&VendorSalesSummary> for RawVendorSummary {
    fn from(row: &VendorSalesSummary) -> Self {
        RawVendorSummary {
            vendor_number: Some(row.vendor_number),
            vendor_name: Some(row.vendor_name.clone()),
            brand: Some(row.brand.clone()),
            description: Some(row.description.clone()),
            purchase_price: Some(row.purchase_price),
            actual_price: Some(row.actual_price),
            volume: Value::Real(row.volume),
            total_purchase_quantity: Some(row.total_purchase_quantity),
            total_purchase_dollars: Some(row.total_purchase_dollars),
            total_sales_dollars: Some(row.total_sales_dollars),
            total_sales_price: Some(row.total_sales_price),
            total_sales_quantity: Some(row.total_sales_quantity),
            total_excise_tax: Some(row.total_excise_tax),
            freight_cost: Some(row.freight_cost),
        }
    }
}

/// `numerator / denominator`, or `None` for inf/NaN results
pub fn finite_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}

/// Coerce a raw catalog volume to a float; NULL and NaN count as missing
fn coerce_volume(row: usize, value: &Value) -> Result<Option<f64>, CleanError> {
    let volume = match value {
        Value::Null => Ok(None),
        Value::Integer(n) => Ok(Some(*n as f64)),
        Value::Real(n) => Ok(Some(*n)),
        Value::Text(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            CleanError::TypeConversion {
                row,
                column: "Volume",
                value: s.clone(),
            }
        }),
        Value::Blob(bytes) => Err(CleanError::TypeConversion {
            row,
            column: "Volume",
            value: format!("<blob {} bytes>", bytes.len()),
        }),
    }?;

    Ok(volume.filter(|v| !v.is_nan()))
}

fn fill_text(value: Option<String>) -> String {
    value.unwrap_or_else(|| "0".to_string())
}

/// Clean the Builder output and append the derived columns.
///
/// Fails on the first non-numeric volume; nothing is returned in that case.
pub fn clean_data(rows: Vec<RawVendorSummary>) -> Result<Vec<VendorSalesSummary>, CleanError> {
    let mut cleaned = Vec::with_capacity(rows.len());

    for (idx, raw) in rows.into_iter().enumerate() {
        let volume = coerce_volume(idx, &raw.volume)?;

        let mut row = VendorSalesSummary {
            vendor_number: raw.vendor_number.unwrap_or(0),
            vendor_name: fill_text(raw.vendor_name).trim().to_string(),
            brand: raw.brand.unwrap_or_else(BrandKey::zero),
            description: fill_text(raw.description).trim().to_string(),
            purchase_price: raw.purchase_price.unwrap_or(0.0),
            actual_price: raw.actual_price.unwrap_or(0.0),
            volume: volume.unwrap_or(0.0),
            total_purchase_quantity: raw.total_purchase_quantity.unwrap_or(0.0),
            total_purchase_dollars: raw.total_purchase_dollars.unwrap_or(0.0),
            total_sales_dollars: raw.total_sales_dollars.unwrap_or(0.0),
            total_sales_price: raw.total_sales_price.unwrap_or(0.0),
            total_sales_quantity: raw.total_sales_quantity.unwrap_or(0.0),
            total_excise_tax: raw.total_excise_tax.unwrap_or(0.0),
            freight_cost: raw.freight_cost.unwrap_or(0.0),
            gross_profit: 0.0,
            profit_margin: None,
            stock_turnover: None,
            sales_to_purchase_ratio: None,
        };
        row.enrich();

        cleaned.push(row);
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::create_vendor_summary;
    use crate::test_support::*;
    use crate::writer::{load_summary, write_summary, WriteMode};

    const EPS: f64 = 1e-9;

    fn raw_row() -> RawVendorSummary {
        RawVendorSummary {
            vendor_number: Some(1),
            vendor_name: Some("Acme".to_string()),
            brand: Some(BrandKey::from("BrandA")),
            description: Some("desc".to_string()),
            purchase_price: Some(10.0),
            actual_price: Some(12.0),
            volume: Value::Text("1.0".to_string()),
            total_purchase_quantity: Some(5.0),
            total_purchase_dollars: Some(50.0),
            total_sales_dollars: Some(60.0),
            total_sales_price: Some(12.0),
            total_sales_quantity: Some(5.0),
            total_excise_tax: Some(2.0),
            freight_cost: Some(3.0),
        }
    }

    #[test]
    fn test_acme_scenario_end_to_end() {
        let conn = acme_store();
        let rows = clean_data(create_vendor_summary(&conn).unwrap()).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.vendor_number, 1);
        assert_eq!(row.brand, BrandKey::from("BrandA"));
        assert_eq!(row.volume, 1.0);
        assert_eq!(row.total_purchase_dollars, 50.0);
        assert_eq!(row.total_sales_dollars, 60.0);
        assert_eq!(row.freight_cost, 3.0);
        assert!((row.gross_profit - 10.0).abs() < EPS);
        assert!((row.profit_margin.unwrap() - 16.666_666_666_666_668).abs() < 1e-6);
        assert!((row.stock_turnover.unwrap() - 1.0).abs() < EPS);
        assert!((row.sales_to_purchase_ratio.unwrap() - 1.2).abs() < EPS);
    }

    #[test]
    fn test_purchase_only_pair_is_zero_filled() {
        let conn = mixed_store();
        let rows = clean_data(create_vendor_summary(&conn).unwrap()).unwrap();
        let row = rows
            .iter()
            .find(|r| r.brand == BrandKey::from("BrandB"))
            .unwrap();

        assert_eq!(row.total_sales_dollars, 0.0);
        assert_eq!(row.total_sales_quantity, 0.0);
        assert_eq!(row.total_excise_tax, 0.0);
        assert_eq!(row.freight_cost, 0.0);
        assert_eq!(row.gross_profit, -40.0);
        // -40 / 0 has no finite value
        assert_eq!(row.profit_margin, None);
        assert_eq!(row.stock_turnover, Some(0.0));
        assert_eq!(row.sales_to_purchase_ratio, Some(0.0));
    }

    #[test]
    fn test_zero_denominators_become_none_for_every_ratio() {
        let mut raw = raw_row();
        raw.total_purchase_quantity = Some(0.0);
        raw.total_purchase_dollars = None;
        raw.total_sales_dollars = Some(0.0);
        raw.total_sales_quantity = Some(0.0);

        let row = &clean_data(vec![raw]).unwrap()[0];
        assert_eq!(row.gross_profit, 0.0);
        assert_eq!(row.profit_margin, None);
        assert_eq!(row.stock_turnover, None);
        assert_eq!(row.sales_to_purchase_ratio, None);
    }

    #[test]
    fn test_text_columns_trimmed() {
        let conn = mixed_store();
        let rows = clean_data(create_vendor_summary(&conn).unwrap()).unwrap();
        let row = rows
            .iter()
            .find(|r| r.brand == BrandKey::from("BrandD"))
            .unwrap();

        assert_eq!(row.vendor_name, "Bolt Spirits");
        assert_eq!(row.description, "Delta Vodka");
        assert_eq!(row.volume, 375.0);
    }

    #[test]
    fn test_blanket_fill_reaches_text_and_key_columns() {
        let raw = RawVendorSummary {
            vendor_number: None,
            vendor_name: None,
            brand: None,
            description: None,
            purchase_price: None,
            actual_price: None,
            volume: Value::Null,
            total_purchase_quantity: None,
            total_purchase_dollars: None,
            total_sales_dollars: None,
            total_sales_price: None,
            total_sales_quantity: None,
            total_excise_tax: None,
            freight_cost: None,
        };

        let row = &clean_data(vec![raw]).unwrap()[0];
        assert_eq!(row.vendor_number, 0);
        assert_eq!(row.vendor_name, "0");
        assert_eq!(row.brand, BrandKey::Int(0));
        assert_eq!(row.description, "0");
        assert_eq!(row.volume, 0.0);
        assert_eq!(row.freight_cost, 0.0);
    }

    #[test]
    fn test_non_numeric_volume_fails() {
        let mut good = raw_row();
        good.volume = Value::Integer(750);
        let mut bad = raw_row();
        bad.volume = Value::Text("1.75L".to_string());

        let err = clean_data(vec![good, bad]).unwrap_err();
        assert_eq!(
            err,
            CleanError::TypeConversion {
                row: 1,
                column: "Volume",
                value: "1.75L".to_string(),
            }
        );
        assert!(err.to_string().contains("Volume"));
    }

    #[test]
    fn test_nan_volume_is_zero_filled_and_persists() {
        let mut conn = acme_store();
        conn.execute("UPDATE purchase_prices SET Volume = 'NaN'", []).unwrap();

        let once = clean_data(create_vendor_summary(&conn).unwrap()).unwrap();
        assert_eq!(once[0].volume, 0.0);

        let twice = clean_data(once.iter().map(RawVendorSummary::from).collect()).unwrap();
        assert_eq!(once, twice);

        write_summary(&mut conn, &once, "vendor_sales_summary", WriteMode::Replace).unwrap();
        let loaded = load_summary(&conn, "vendor_sales_summary", None).unwrap();
        assert_eq!(loaded, once);
    }

    #[test]
    fn test_cleaning_twice_is_a_no_op() {
        let conn = mixed_store();
        let once = clean_data(create_vendor_summary(&conn).unwrap()).unwrap();
        let twice = clean_data(once.iter().map(RawVendorSummary::from).collect()).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_gross_profit_consistent_for_every_row() {
        let conn = mixed_store();
        let rows = clean_data(create_vendor_summary(&conn).unwrap()).unwrap();

        for row in &rows {
            let expected = row.total_sales_dollars - row.total_purchase_dollars;
            assert!((row.gross_profit - expected).abs() < EPS);
        }
    }

    #[test]
    fn test_finite_ratio() {
        assert_eq!(finite_ratio(6.0, 3.0), Some(2.0));
        assert_eq!(finite_ratio(1.0, 0.0), None);
        assert_eq!(finite_ratio(-1.0, 0.0), None);
        assert_eq!(finite_ratio(0.0, 0.0), None);
    }
}
