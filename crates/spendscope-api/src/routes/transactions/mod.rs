//! Transaction routes - Filtered list, manual entry, reload
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: Transaction list rendering

pub mod api;
pub mod page;

pub use api::{api_add_transaction, api_reload_transactions, api_transactions};
pub use page::render_transaction_list;
