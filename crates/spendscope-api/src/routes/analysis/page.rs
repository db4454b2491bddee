//! Analysis page rendering - Full page and HTMX panel

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use spendscope_core::{AnalysisView, ChartLevel, CoreError, LoadState, TransactionType};
use spendscope_utils::escape_html;

use crate::routes::money;
use crate::routes::transactions::page::render_transaction_list;
use crate::{current_view, ApiError, AppState, Identity};

/// Analysis page with filters, chart and transaction list
pub async fn page_analysis(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let identity = Identity::from_headers(&headers, &state.config);
    let panel = panel_or_notice(&state, current_view(&state, &identity).await);

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Spending analysis</h2></div>
        <div id='analysis-panel' hx-get='/analysis/panel' hx-trigger='analysis-changed from:body'>{}</div>
        <script>
        function analysisAction(url, body) {{
            fetch(url, {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify(body || {{}})
            }}).finally(() => htmx.trigger(document.body, 'analysis-changed'));
        }}
        function chartClick(el) {{
            const payload = JSON.parse(el.dataset.payload);
            analysisAction('/api/analysis/chart-click', {{
                category_id: payload.category_id,
                subcategory_id: payload.subcategory_id || null
            }});
        }}
        function applyPeriod() {{
            analysisAction('/api/analysis/period', {{
                month: document.getElementById('month-select').value,
                year: document.getElementById('year-input').value
            }});
        }}
        </script>"#,
        panel
    );

    Html(crate::page_response(&headers, "Analysis", "/analysis", &inner_content))
}

/// HTMX: analysis panel - Partial page update
pub async fn htmx_analysis_panel(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let identity = Identity::from_headers(&headers, &state.config);
    Html(panel_or_notice(&state, current_view(&state, &identity).await))
}

fn panel_or_notice(state: &AppState, view: Result<AnalysisView, ApiError>) -> String {
    match view {
        Ok(view) => render_panel(state, &view),
        Err(ApiError::Core(CoreError::MissingIdentity)) => r#"<div class='bg-white rounded-xl shadow-sm p-6 text-center'>
            <p class='text-gray-600 mb-4'>You are not signed in.</p>
            <button onclick="analysisAction('/api/demo-mode', {enabled: true})" class='px-4 py-2 bg-indigo-600 text-white rounded-lg'>Explore demo data</button>
        </div>"#
            .to_string(),
        Err(e) => format!(
            "<div class='bg-red-50 border border-red-200 text-red-700 rounded-lg p-4'>{}</div>",
            escape_html(&e.to_string())
        ),
    }
}

/// Render the whole analysis panel for a view
pub fn render_panel(state: &AppState, view: &AnalysisView) -> String {
    let mut html = String::new();

    if let Some(error) = &view.error {
        html.push_str(&format!(
            r#"<div class='flex items-center justify-between mb-4 p-3 bg-red-50 border border-red-200 rounded-lg text-red-700'>
                <span>{}</span>
                <button onclick="analysisAction('/api/error/dismiss')" class='text-sm underline'>Dismiss</button>
            </div>"#,
            escape_html(error)
        ));
    }
    if view.load_state == LoadState::Loading {
        html.push_str("<p class='text-sm text-gray-500 mb-2'>Loading transactions…</p>");
    }
    if view.demo_mode {
        html.push_str("<p class='inline-block mb-4 px-2 py-1 text-xs bg-yellow-100 text-yellow-800 rounded'>Demo data</p>");
    }

    html.push_str(&render_controls(state, view));

    html.push_str(&format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <div class='flex items-baseline justify-between mb-4'>
                <div><h3 class='text-lg font-semibold'>{}</h3><p class='text-sm text-gray-500'>{}</p></div>
                <p class='text-2xl font-bold'>{}</p>
            </div>
            {}
        </div>"#,
        escape_html(&view.title),
        escape_html(&view.period_label),
        money(&state.config.currency, view.total),
        render_chart(state, view)
    ));

    html.push_str(&render_transaction_list(
        &view.transactions,
        &state.catalog,
        &state.config.currency,
    ));
    html
}

fn render_controls(state: &AppState, view: &AnalysisView) -> String {
    let type_button = |t: TransactionType| {
        let active = if view.selection.transaction_type == t {
            "bg-indigo-600 text-white"
        } else {
            "bg-white text-gray-700 hover:bg-gray-50"
        };
        format!(
            r#"<button onclick="analysisAction('/api/analysis/type', {{transaction_type: '{}'}})" class='px-3 py-1.5 text-sm border rounded-lg {}'>{}</button>"#,
            t,
            active,
            t.label()
        )
    };

    let selected_month = view.selection.period.month.as_deref().unwrap_or_default();
    let mut months = String::from("<option value=''>All months</option>");
    for name in state.settings.month_names.all() {
        let selected = if name.eq_ignore_ascii_case(selected_month.trim()) { "selected" } else { "" };
        months.push_str(&format!(
            "<option value='{0}' {1}>{0}</option>",
            escape_html(name),
            selected
        ));
    }
    let year = view.selection.period.year.map(|y| y.to_string()).unwrap_or_default();

    let back = if view.chart_level == ChartLevel::Subcategory {
        r#"<button onclick="analysisAction('/api/analysis/back')" class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50'>← Back</button>
           <button onclick="analysisAction('/api/analysis/clear')" class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50'>All categories</button>"#
    } else {
        ""
    };

    format!(
        r#"<div class='flex flex-wrap items-center gap-3 mb-4 p-3 bg-white rounded-lg border shadow-sm'>
            {}{}
            <span class='text-gray-300'>|</span>
            <select id='month-select' class='px-2 py-1.5 text-sm border rounded-lg bg-white'>{}</select>
            <input id='year-input' type='number' value='{}' placeholder='Year' class='w-24 px-2 py-1.5 text-sm border rounded-lg'>
            <button onclick='applyPeriod()' class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50'>Apply</button>
            <div class='flex-1'></div>
            {}
        </div>"#,
        type_button(TransactionType::Expenses),
        type_button(TransactionType::Income),
        months,
        year,
        back
    )
}

fn render_chart(state: &AppState, view: &AnalysisView) -> String {
    let aggregation = &view.aggregation;
    if !aggregation.has_data() {
        return "<p class='text-center text-gray-500 py-8'>No transactions for this selection</p>".to_string();
    }

    let mut html = String::from("<div class='space-y-2'>");
    for (bucket, series) in aggregation.buckets.iter().zip(aggregation.series()) {
        let share = if aggregation.total.is_zero() {
            0.0
        } else {
            (bucket.total_abs_amount / aggregation.total * Decimal::from(100))
                .to_f64()
                .unwrap_or_default()
        };
        let payload = serde_json::to_string(&series.payload).unwrap_or_default();
        let ring = if bucket.emphasized { "ring-2 ring-offset-1 ring-gray-800 shadow" } else { "" };
        html.push_str(&format!(
            r#"<div class='flex items-center gap-3 p-2 rounded-lg cursor-pointer hover:bg-gray-50 {}' data-payload='{}' onclick='chartClick(this)'>
                <span class='w-32 truncate text-sm'>{}</span>
                <div class='flex-1 bg-gray-100 rounded h-4'><div class='h-4 rounded' style='width: {:.1}%; background-color: {}'></div></div>
                <span class='w-28 text-right text-sm font-medium'>{}</span>
            </div>"#,
            ring,
            escape_html(&payload),
            escape_html(&bucket.label),
            share,
            escape_html(&bucket.color),
            money(&state.config.currency, bucket.total_abs_amount)
        ));
    }
    html.push_str("</div>");

    if state.config.charts.show_legend && !aggregation.legend.is_empty() {
        html.push_str("<div class='flex flex-wrap gap-3 mt-4 pt-4 border-t'>");
        for entry in &aggregation.legend {
            html.push_str(&format!(
                r#"<span class='flex items-center gap-1 text-xs text-gray-600'><span class='inline-block w-3 h-3 rounded-full' style='background-color: {}'></span>{}</span>"#,
                escape_html(&entry.color),
                escape_html(&entry.label)
            ));
        }
        html.push_str("</div>");
    }
    html
}
