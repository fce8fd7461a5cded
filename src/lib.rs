// Vendor Summary - Core Library
// Builds the per-vendor, per-brand sales/purchasing summary from the inventory store

pub mod db;
pub mod summary;   // Builder: one aggregation query
pub mod cleaning;  // Enricher: null fill, trimming, derived ratios
pub mod writer;    // Writer: replace-or-append the summary table
pub mod ingest;    // CSV extracts → source tables
pub mod job;
pub mod config;
pub mod logging;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use db::{
    BrandKey, PurchaseLine, PriceCatalogEntry, SalesLine, FreightRecord,
    open_database, setup_source_schema, count_rows,
    insert_purchases, insert_price_catalog, insert_sales, insert_freight,
};
pub use summary::{RawVendorSummary, create_vendor_summary};
pub use cleaning::{CleanError, VendorSalesSummary, clean_data};
pub use writer::{WriteMode, write_summary, load_summary, DEFAULT_DESTINATION};
pub use ingest::{IngestedTable, ingest_csv, ingest_dir};
pub use job::{JobOptions, RunReport, run_job};
pub use config::AppConfig;
pub use logging::{LogConfig, LogFormat, build_dispatch};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
