//! Spendscope core - transaction filtering, category drill-down and chart aggregation

pub mod catalog;
pub mod error;
pub mod filters;
pub mod models;
pub mod reports;
pub mod selection;
pub mod session;
pub mod source;
pub mod time;
pub mod types;

pub use catalog::{CatalogEntry, CatalogMatch, CategoryCatalog, KnownCategory, UNCATEGORIZED_KEY};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use filters::{filter_by_category, filter_by_date, filter_by_type, filter_by_type_name};
pub use models::{Transaction, TransactionCategory, TransactionDraft, TransactionSubcategory};
pub use reports::{aggregate, Aggregation, ChartBucket, ChartClick, ChartOptions, ChartSeries, LegendEntry};
pub use selection::{DrillDown, FilterAction, FilterSelection, FilterStore};
pub use session::{AnalysisSession, AnalysisSettings, AnalysisView, FetchTicket, LoadState};
pub use source::{DemoTransactionSource, LocalTransactionSource, TransactionSource};
pub use time::{coerce_year, MonthNames, Period};
pub use types::{ChartLevel, TransactionType};
