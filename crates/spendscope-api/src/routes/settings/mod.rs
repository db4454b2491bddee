//! Settings routes - Configuration and category catalog display

pub mod api;
pub mod page;

pub use api::{api_categories, api_settings};
pub use page::page_settings;
