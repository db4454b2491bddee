//! Analysis routes - Filters, drill-down and chart data
//!
//! Structure:
//! - api.rs: JSON endpoints, one per filter action
//! - page.rs: Full page and HTMX panel rendering

pub mod api;
pub mod page;

pub use api::{
    api_analysis,
    api_back,
    api_chart_click,
    api_clear,
    api_select_category,
    api_select_subcategory,
    api_set_period,
    api_set_type,
};

pub use page::{htmx_analysis_panel, page_analysis};
