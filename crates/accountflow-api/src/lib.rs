//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::billing_plans: Billing plan list and CRUD
//! - routes::accounts: Chart-of-accounts tree, account forms
//! - routes::presets: History presets
//! - routes::titles: Titles (receivables/payables) and their detail page
//! - routes::entries: Entries recorded against a title
//! - routes::companies: Company registry
//! - routes::reports: DRE report
//! - routes::settings: Configuration display

pub mod error;
pub mod form;
pub mod routes;

use accountflow_config::Config;
use accountflow_core::AccountFlow;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use error::{ApiError, HtmxError};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<AccountFlow>,
    pub config: Config,
}

impl AppState {
    pub fn new(flow: AccountFlow) -> Self {
        let config = flow.config().clone();
        Self {
            flow: Arc::new(flow),
            config,
        }
    }

    /// Amount formatted with the configured currency
    pub fn money(&self, value: Decimal) -> String {
        let currency = &self.config.currency;
        format!(
            "{} {}",
            currency.symbol,
            accountflow_utils::format_amount(
                value,
                currency.decimal_places,
                &currency.thousands_separator,
                &currency.decimal_separator,
            )
        )
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::accounts::{
        api_account, api_account_create, api_account_delete, api_account_update, api_plan_accounts,
        api_plan_parent_options, api_plan_tree, htmx_account_delete, htmx_account_edit_form,
        htmx_account_rows, htmx_account_store, htmx_account_update, page_billing_plan_accounts,
    };
    use routes::billing_plans::{
        api_billing_plan, api_billing_plan_create, api_billing_plan_delete, api_billing_plan_update,
        api_billing_plans, htmx_billing_plan_delete, htmx_billing_plan_store, htmx_billing_plans_list,
        page_billing_plans,
    };
    use routes::companies::{
        api_companies, api_company, api_company_create, api_company_delete, api_company_update,
        htmx_companies_list, htmx_company_delete, htmx_company_store, page_companies,
    };
    use routes::entries::{
        api_entry, api_entry_create, api_entry_delete, api_entry_update, api_title_entries,
        htmx_entry_delete, htmx_entry_store,
    };
    use routes::presets::{
        api_preset, api_preset_create, api_preset_delete, api_preset_update, api_presets,
        htmx_preset_account_fields, htmx_preset_delete, htmx_preset_store, page_presets,
    };
    use routes::reports::{api_dre, htmx_dre_results, page_dre};
    use routes::settings::{api_settings, page_settings};
    use routes::titles::{
        api_title, api_title_balance, api_title_create, api_title_delete, api_title_update,
        api_titles, htmx_title_delete, htmx_title_store, htmx_titles_list, page_title_detail,
        page_titles,
    };

    let cors = cors_layer(&state.config);

    let router = Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/summary", get(api_summary))
        .route("/api/billing-plans", get(api_billing_plans).post(api_billing_plan_create))
        .route(
            "/api/billing-plans/:id",
            get(api_billing_plan).put(api_billing_plan_update).delete(api_billing_plan_delete),
        )
        .route("/api/billing-plans/:id/accounts", get(api_plan_accounts))
        .route("/api/billing-plans/:id/tree", get(api_plan_tree))
        .route("/api/billing-plans/:id/parent-options", get(api_plan_parent_options))
        .route("/api/billing-accounts", post(api_account_create))
        .route(
            "/api/billing-accounts/:id",
            get(api_account).put(api_account_update).delete(api_account_delete),
        )
        .route("/api/history-presets", get(api_presets).post(api_preset_create))
        .route(
            "/api/history-presets/:id",
            get(api_preset).put(api_preset_update).delete(api_preset_delete),
        )
        .route("/api/titles", get(api_titles).post(api_title_create))
        .route(
            "/api/titles/:id",
            get(api_title).put(api_title_update).delete(api_title_delete),
        )
        .route("/api/titles/:id/entries", get(api_title_entries))
        .route("/api/titles/:id/balance", get(api_title_balance))
        .route("/api/entries", post(api_entry_create))
        .route(
            "/api/entries/:id",
            get(api_entry).put(api_entry_update).delete(api_entry_delete),
        )
        .route("/api/companies", get(api_companies).post(api_company_create))
        .route(
            "/api/companies/:id",
            get(api_company).put(api_company_update).delete(api_company_delete),
        )
        .route("/api/reports/dre", get(api_dre))
        .route("/api/settings", get(api_settings))
        // HTMX page routes
        .route("/", get(index_page))
        .route("/dashboard", get(page_dashboard))
        .route("/billing-plans", get(page_billing_plans).post(htmx_billing_plan_store))
        .route("/billing-plans/list", get(htmx_billing_plans_list))
        .route(
            "/billing-plans/:id",
            get(page_billing_plan_accounts).delete(htmx_billing_plan_delete),
        )
        .route("/billing-plans/:id/rows", get(htmx_account_rows))
        .route("/billing-plans/:id/accounts", post(htmx_account_store))
        .route("/billing-accounts/:id/edit", get(htmx_account_edit_form))
        .route(
            "/billing-accounts/:id",
            axum::routing::put(htmx_account_update).delete(htmx_account_delete),
        )
        .route("/history-presets", get(page_presets).post(htmx_preset_store))
        .route("/history-presets/accounts", get(htmx_preset_account_fields))
        .route("/history-presets/:id", axum::routing::delete(htmx_preset_delete))
        .route("/titles", get(page_titles).post(htmx_title_store))
        .route("/titles/list", get(htmx_titles_list))
        .route("/titles/:id", get(page_title_detail).delete(htmx_title_delete))
        .route("/titles/:id/entries", post(htmx_entry_store))
        .route("/entries/:id", axum::routing::delete(htmx_entry_delete))
        .route("/companies", get(page_companies).post(htmx_company_store))
        .route("/companies/list", get(htmx_companies_list))
        .route("/companies/:id", axum::routing::delete(htmx_company_delete))
        .route("/reports/dre", get(page_dre))
        .route("/reports/dre/results", get(htmx_dre_results))
        .route("/settings", get(page_settings))
        .with_state(state);

    match cors {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

fn cors_layer(config: &Config) -> Option<CorsLayer> {
    if config.server.cors_origins.is_empty() {
        return None;
    }
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!(target: "accountflow::api", "Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Dashboard counters (JSON API)
async fn api_summary(
    state: axum::extract::State<AppState>,
) -> Result<axum::Json<accountflow_core::DashboardSummary>, ApiError> {
    Ok(axum::Json(state.flow.summary().await?))
}

// ==================== Template Functions ====================

/// Escape user content for HTML
pub fn esc(content: &str) -> String {
    accountflow_utils::escape_html(content)
}

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - AccountFlow</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
    <div id="toast"></div>
</body>
</html>"#,
        esc(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "Painel", "dashboard"),
        ("/billing-plans", "Planos de contas", "billing-plans"),
        ("/history-presets", "Históricos padrão", "history-presets"),
        ("/titles", "Títulos", "titles"),
        ("/companies", "Empresas", "companies"),
        ("/reports/dre", "DRE", "reports"),
        ("/settings", "Configurações", "settings"),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>AccountFlow</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, id) in &links {
        let is_active = if *path == "/" {
            current_path == "/" || current_path == "/dashboard"
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        let icon = match *id {
            "dashboard" => "📊",
            "billing-plans" => "🗂️",
            "history-presets" => "🧾",
            "titles" => "📋",
            "companies" => "🏢",
            "reports" => "📈",
            "settings" => "⚙️",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

pub(crate) fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Full page for normal requests, just the content area for HTMX navigation
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            inner_content)
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Toast notification. Lives in the `#toast` slot of the layout.
pub fn toast(message: &str, is_error: bool) -> String {
    let class = if is_error {
        "bg-red-50 border-red-200 text-red-700"
    } else {
        "bg-green-50 border-green-200 text-green-700"
    };
    format!(
        r#"<div id='toast' class='fixed bottom-4 right-4 px-4 py-3 border rounded-lg shadow {}' hx-on:click='this.remove()'>{}</div>"#,
        class,
        esc(message)
    )
}

/// Fragment followed by an out-of-band success toast
pub fn with_toast(fragment: &str, message: &str) -> String {
    let toast = toast(message, false).replacen("<div id='toast'", "<div id='toast' hx-swap-oob='true'", 1);
    format!("{}{}", fragment, toast)
}

/// Dashboard page
async fn index_page(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<axum::response::Html<String>, ApiError> {
    let summary = state.flow.summary().await?;
    let titles = state.flow.titles().await?;

    let recent: Vec<String> = titles
        .iter()
        .rev()
        .take(5)
        .map(|t| {
            format!(
                "<div class='flex justify-between py-2 border-b'><a href='/titles/{}' class='text-indigo-600 hover:underline'>{}</a><span class='font-medium {}'>{}</span></div>",
                esc(&t.id),
                esc(&t.description),
                if t.kind == accountflow_store::FlowKind::Expense { "text-red-600" } else { "text-green-600" },
                state.money(t.amount)
            )
        })
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Painel</h2></div>
        <div class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4 mb-6'>
            <div class='bg-indigo-50 p-4 rounded-lg border border-indigo-200'><p class='text-sm text-indigo-600'>Planos de contas</p><p class='text-2xl font-bold text-indigo-700'>{}</p></div>
            <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Contas</p><p class='text-2xl font-bold text-blue-700'>{}</p></div>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Títulos ativos</p><p class='text-2xl font-bold text-green-700'>{} / {}</p></div>
            <div class='bg-yellow-50 p-4 rounded-lg border border-yellow-200'><p class='text-sm text-yellow-600'>Empresas</p><p class='text-2xl font-bold text-yellow-700'>{}</p></div>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Últimos títulos</h3>
                <div class='space-y-1'>{}</div>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Cadastros</h3>
                <div class='grid grid-cols-2 gap-4'>
                    <div class='text-center p-4 bg-gray-50 rounded-lg'><p class='text-sm text-gray-600'>Lançamentos</p><p class='text-xl font-bold'>{}</p></div>
                    <div class='text-center p-4 bg-gray-50 rounded-lg'><p class='text-sm text-gray-600'>Históricos padrão</p><p class='text-xl font-bold'>{}</p></div>
                </div>
            </div>
        </div>"#,
        summary.billing_plans,
        summary.billing_accounts,
        summary.active_titles,
        summary.titles,
        summary.companies,
        if recent.is_empty() { "<p class='text-gray-500'>Nenhum título cadastrado</p>".to_string() } else { recent.join("") },
        summary.entries,
        summary.presets,
    );

    Ok(axum::response::Html(page_response(&headers, "Painel", "/", &inner_content)))
}

/// Dashboard page (alias for index)
async fn page_dashboard(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<axum::response::Html<String>, ApiError> {
    index_page(state, headers).await
}

/// Start the HTTP server
///
/// Creates the router, binds to the configured address and serves until the
/// process is stopped.
pub async fn start_server(config: Config, flow: AccountFlow) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        flow: Arc::new(flow),
        config,
    };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting AccountFlow server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /billing-plans (Charts of accounts)");
    log::info!("  - /titles (Titles and entries)");
    log::info!("  - /reports/dre (DRE report)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use accountflow_store::{seed, MemoryStore};
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use tower::ServiceExt;

    pub fn demo_state() -> AppState {
        let store = Arc::new(MemoryStore::with_data(seed::demo_data()));
        AppState::new(AccountFlow::new(store, Config::default()))
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, String) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_text(response).await)
    }

    pub async fn get(state: &AppState, uri: &str) -> (StatusCode, String) {
        send(state, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn htmx(state: &AppState, method: &str, uri: &str, form: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("hx-request", "true")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        send(state, request).await
    }

    pub async fn json(state: &AppState, method: &str, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, text) = send(state, request).await;
        let value = if text.is_empty() { serde_json::Value::Null } else { serde_json::from_str(&text).unwrap() };
        (status, value)
    }

    /// First plan of the demo data
    pub async fn demo_plan(state: &AppState) -> accountflow_store::BillingPlan {
        state.flow.billing_plans().await.unwrap().remove(0)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{demo_state, get, htmx};
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let state = demo_state();
        let (status, body) = get(&state, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_summary_counts_demo_data() {
        let state = demo_state();
        let (status, body) = get(&state, "/api/summary").await;
        assert_eq!(status, StatusCode::OK);
        let summary: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary["billing_plans"], 1);
        assert_eq!(summary["billing_accounts"], 14);
    }

    #[tokio::test]
    async fn test_dashboard_full_page_and_partial() {
        let state = demo_state();
        let (status, full) = get(&state, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(full.starts_with("<!DOCTYPE html>"));
        assert!(full.contains("Planos de contas"));

        let (_, partial) = htmx(&state, "GET", "/dashboard", "").await;
        assert!(!partial.contains("<!DOCTYPE html>"));
        assert!(partial.contains("Painel"));
    }

    #[test]
    fn test_with_toast_is_out_of_band() {
        let html = with_toast("<ul></ul>", "Salvo <ok>");
        assert!(html.starts_with("<ul></ul>"));
        assert!(html.contains("hx-swap-oob='true'"));
        assert!(html.contains("Salvo &lt;ok&gt;"));
        assert!(!toast("x", true).contains("hx-swap-oob"));
    }

    #[test]
    fn test_money_uses_currency_config() {
        let state = demo_state();
        let text = state.money(Decimal::new(123450, 2));
        assert!(text.ends_with("1.234,50"), "{}", text);
    }
}
