//! Settings page rendering - Full page endpoints

use axum::extract::State;
use spendscope_utils::escape_html;

use crate::AppState;

pub async fn page_settings(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let config = &state.config;

    let mut categories = String::new();
    for entry in state.catalog.entries() {
        let subcategories: Vec<String> = entry
            .subcategories
            .iter()
            .map(|s| escape_html(s.display_name()))
            .collect();
        categories.push_str(&format!(
            r#"<div class='flex items-center gap-3 py-2 border-b'>
                <span class='inline-block w-4 h-4 rounded-full' style='background-color: {}'></span>
                <span class='font-medium w-40'>{}</span>
                <span class='text-sm text-gray-500'>{}</span>
            </div>"#,
            escape_html(&entry.color),
            escape_html(entry.display_name()),
            subcategories.join(", ")
        ));
    }

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Settings</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Server</h3>
            <div class='grid grid-cols-2 gap-4 mb-4'>
                <div><p class='text-sm text-gray-500'>Host</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Port</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Identity header</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Demo mode by default</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Analysis</h3>
            <div class='grid grid-cols-2 gap-4 mb-4'>
                <div><p class='text-sm text-gray-500'>Transactions file</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Default type</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Legend entries</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Currency</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Categories</h3>
            {}
        </div>"#,
        escape_html(&config.server.host),
        config.server.port,
        escape_html(&config.server.identity_header),
        if config.session.demo_mode { "Yes" } else { "No" },
        escape_html(&config.transactions_path().display().to_string()),
        config.analysis.default_type,
        config.charts.legend_limit,
        escape_html(&config.currency.default_currency),
        categories
    );

    axum::response::Html(crate::page_response(&headers, "Settings", "/settings", &inner_content))
}
