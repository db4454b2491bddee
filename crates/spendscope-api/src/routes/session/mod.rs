//! Session routes - Demo mode, error banner, session teardown

pub mod api;

pub use api::{api_demo_mode, api_dismiss_error, api_end_session, api_set_demo_mode};
