//! Account tree page rendering - Full page and fragments

use crate::{esc, page_response, ApiError, AppState};
use accountflow_core::hierarchy::{self, render_rows_with, ExpandedSet, RenderOptions};
use accountflow_core::{AccountNode, ParentOption};
use accountflow_store::{AccountType, BillingAccount};
use axum::extract::{Path, Query, State};
use axum::response::Html;
use std::collections::HashMap;

/// View state of the tree table, rebuilt from the query string on every request
#[derive(Debug, Clone, Default)]
pub struct TreeView {
    pub plan_id: String,
    pub open: ExpandedSet,
    pub search: String,
}

impl TreeView {
    /// Read `open`, `expand` (`all` | `none`) and `search` from the query
    pub fn from_params(plan_id: &str, params: &HashMap<String, String>, forest: &[AccountNode]) -> Self {
        let mut open: ExpandedSet = params
            .get("open")
            .map(|s| s.parse().unwrap_or_default())
            .unwrap_or_default();
        match params.get("expand").map(|s| s.as_str()) {
            Some("all") => open.expand_all(forest),
            Some("none") => open.collapse_all(),
            _ => {}
        }
        Self {
            plan_id: plan_id.to_string(),
            open,
            search: params.get("search").map(|s| s.trim().to_string()).unwrap_or_default(),
        }
    }

    /// Rows URL for a given expanded set
    fn rows_url(&self, open: &ExpandedSet) -> String {
        let mut url = format!(
            "/billing-plans/{}/rows?open={}",
            esc(&self.plan_id),
            urlencoding::encode(&open.to_query())
        );
        if !self.search.is_empty() {
            url.push_str(&format!("&search={}", urlencoding::encode(&self.search)));
        }
        url
    }

    fn page_url(&self, open: &ExpandedSet) -> String {
        format!(
            "/billing-plans/{}?open={}",
            esc(&self.plan_id),
            urlencoding::encode(&open.to_query())
        )
    }

    pub fn open_query(&self) -> String {
        urlencoding::encode(&self.open.to_query()).into_owned()
    }
}

fn type_badge(account_type: AccountType) -> String {
    let class = match account_type {
        AccountType::Synthetic => "bg-indigo-50 text-indigo-700",
        AccountType::Analytic => "bg-gray-100 text-gray-700",
    };
    format!("<span class='px-2 py-0.5 rounded text-xs {}'>{}</span>", class, account_type.label())
}

/// The tree table. Searching shows every match with its ancestors expanded.
pub fn render_account_tree(state: &AppState, view: &TreeView, forest: &[AccountNode]) -> String {
    let options = RenderOptions {
        indent_unit: state.config.hierarchy.indent_unit,
    };
    let (visible, open) = if view.search.is_empty() {
        (forest.to_vec(), view.open.clone())
    } else {
        let filtered = hierarchy::filter_tree(forest, &view.search);
        let mut open = view.open.clone();
        open.expand_all(&filtered);
        (filtered, open)
    };
    let rows = render_rows_with(&visible, 0, &open, &options);

    let body: Vec<String> = rows
        .iter()
        .map(|row| {
            let toggle = if row.has_children {
                let next = view.open.toggled(&row.id);
                format!(
                    r#"<button class='w-5 text-gray-500 hover:text-indigo-600' hx-get='{}' hx-target='#account-tree' hx-swap='outerHTML' hx-push-url='{}'>{}</button>"#,
                    view.rows_url(&next),
                    view.page_url(&next),
                    if row.expanded { "▾" } else { "▸" }
                )
            } else {
                "<span class='inline-block w-5'></span>".to_string()
            };
            format!(
                r#"<tr class='border-b hover:bg-gray-50' data-depth='{depth}'>
                    <td class='px-4 py-2' style='padding-left: {indent}px'>{toggle}<span class='font-mono text-gray-600 mr-2'>{code}</span><span class='{weight}'>{name}</span></td>
                    <td class='px-4 py-2'>{badge}</td>
                    <td class='px-4 py-2 text-center'>{degree}</td>
                    <td class='px-4 py-2 text-right space-x-2'>
                        <button class='text-indigo-600 text-sm hover:underline' hx-get='/billing-accounts/{id}/edit?open={open}' hx-target='#account-form' hx-swap='outerHTML'>Editar</button>
                        <button class='text-red-600 text-sm hover:underline' hx-delete='/billing-accounts/{id}?open={open}' hx-target='#account-tree' hx-swap='outerHTML'
                            hx-confirm='Remover a conta {code} - {name}?'>Remover</button>
                    </td>
                </tr>"#,
                depth = row.depth,
                indent = row.indent + 16,
                toggle = toggle,
                code = esc(&row.code),
                weight = if row.account_type == AccountType::Synthetic { "font-semibold" } else { "" },
                name = esc(&row.name),
                badge = type_badge(row.account_type),
                degree = row.degree,
                id = esc(&row.id),
                open = view.open_query(),
            )
        })
        .collect();

    let empty = if rows.is_empty() {
        if view.search.is_empty() {
            "<tr><td colspan='4' class='px-4 py-6 text-center text-gray-500'>Nenhuma conta cadastrada</td></tr>"
        } else {
            "<tr><td colspan='4' class='px-4 py-6 text-center text-gray-500'>Nenhuma conta encontrada</td></tr>"
        }
    } else {
        ""
    };

    let mut all = ExpandedSet::new();
    all.expand_all(forest);

    format!(
        r#"<div id='account-tree'>
            <div class='flex items-center gap-2 mb-4'>
                <button class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50' hx-get='{expand_url}' hx-target='#account-tree' hx-swap='outerHTML' hx-push-url='{expand_page}'>Expandir tudo</button>
                <button class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50' hx-get='{collapse_url}' hx-target='#account-tree' hx-swap='outerHTML' hx-push-url='{collapse_page}'>Recolher tudo</button>
                <input type='hidden' id='open-state' name='open' value='{open_value}'>
            </div>
            <table class='w-full text-sm'>
                <thead><tr class='text-left text-gray-500 border-b'><th class='px-4 py-2'>Conta</th><th class='px-4 py-2'>Tipo</th><th class='px-4 py-2 text-center'>Grau</th><th></th></tr></thead>
                <tbody>{rows}{empty}</tbody>
            </table>
        </div>"#,
        expand_url = view.rows_url(&all),
        expand_page = view.page_url(&all),
        collapse_url = view.rows_url(&ExpandedSet::new()),
        collapse_page = view.page_url(&ExpandedSet::new()),
        open_value = esc(&view.open.to_query()),
        rows = body.join(""),
        empty = empty,
    )
}

/// Create form, or edit form when `editing` is set. `oob` marks it for an
/// out-of-band swap next to a refreshed tree.
pub fn render_account_form(
    plan_id: &str,
    options: &[ParentOption],
    editing: Option<&BillingAccount>,
    open: &ExpandedSet,
    oob: bool,
) -> String {
    let selected_parent = editing.and_then(|a| a.parent_id.as_deref());
    let mut select = String::from("<option value=''>Nenhuma (conta raiz)</option>");
    for option in options {
        select.push_str(&format!(
            "<option value='{}'{}>{}</option>",
            esc(&option.id),
            if selected_parent == Some(option.id.as_str()) { " selected" } else { "" },
            esc(&option.label)
        ));
    }

    let current_type = editing.map(|a| a.account_type).unwrap_or_default();
    let type_options: String = [AccountType::Analytic, AccountType::Synthetic]
        .iter()
        .map(|t| {
            format!(
                "<option value='{}'{}>{}</option>",
                t,
                if *t == current_type { " selected" } else { "" },
                t.label()
            )
        })
        .collect();

    let (title, action, name, cancel) = match editing {
        Some(account) => (
            format!("Editar conta {}", esc(&account.code)),
            format!("hx-put='/billing-accounts/{}'", esc(&account.id)),
            esc(&account.name),
            format!(
                "<button type='button' class='px-4 py-2 border rounded-lg hover:bg-gray-50' hx-get='/billing-plans/{}/rows?open={}&form=new' hx-target='#account-tree' hx-swap='outerHTML'>Cancelar</button>",
                esc(plan_id),
                urlencoding::encode(&open.to_query())
            ),
        ),
        None => (
            "Nova conta".to_string(),
            format!("hx-post='/billing-plans/{}/accounts'", esc(plan_id)),
            String::new(),
            String::new(),
        ),
    };

    format!(
        r#"<div id='account-form' class='bg-white rounded-xl shadow-sm p-6 mb-6'{oob}>
            <h3 class='text-lg font-semibold mb-4'>{title}</h3>
            <form {action} hx-target='#account-tree' hx-swap='outerHTML' class='grid grid-cols-1 md:grid-cols-4 gap-4'>
                <input type='hidden' name='open' value='{open}'>
                <input name='name' value='{name}' placeholder='Nome' required class='px-3 py-2 border rounded-lg'>
                <select name='parent_id' class='px-3 py-2 border rounded-lg bg-white'>{select}</select>
                <select name='account_type' class='px-3 py-2 border rounded-lg bg-white'>{types}</select>
                <div class='flex gap-2'><button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Salvar</button>{cancel}</div>
            </form>
        </div>"#,
        oob = if oob { " hx-swap-oob='true'" } else { "" },
        title = title,
        action = action,
        open = esc(&open.to_query()),
        name = name,
        select = select,
        types = type_options,
        cancel = cancel,
    )
}

pub async fn page_billing_plan_accounts(
    state: State<AppState>,
    headers: axum::http::HeaderMap,
    path: Path<String>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let plan = state.flow.billing_plan(&path.0).await?;
    let forest = state.flow.account_tree(&plan.id).await?;
    let options = state.flow.parent_options(&plan.id, None).await?;
    let view = TreeView::from_params(&plan.id, &params, &forest);

    let inner_content = format!(
        r#"<div class='mb-6'>
            <a href='/billing-plans' class='text-sm text-indigo-600 hover:underline'>← Planos de contas</a>
            <h2 class='text-2xl font-bold'>{name}</h2>
            <p class='text-gray-500'>{description}</p>
        </div>
        {form}
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <input type='search' name='search' value='{search}' placeholder='Buscar por nome ou código...' class='w-full mb-4 px-3 py-2 border rounded-lg'
                hx-get='/billing-plans/{id}/rows' hx-trigger='keyup changed delay:300ms, search' hx-target='#account-tree' hx-swap='outerHTML' hx-include='#open-state'>
            {tree}
        </div>"#,
        name = esc(&plan.name),
        description = esc(&plan.description),
        form = render_account_form(&plan.id, &options, None, &view.open, false),
        search = esc(&view.search),
        id = esc(&plan.id),
        tree = render_account_tree(&state, &view, &forest),
    );

    Ok(Html(page_response(&headers, &plan.name, "/billing-plans", &inner_content)))
}

/// HTMX: the tree table for the requested view state. `form=new` also
/// resets the account form.
pub async fn htmx_account_rows(
    state: State<AppState>,
    path: Path<String>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let forest = state.flow.account_tree(&path.0).await?;
    let view = TreeView::from_params(&path.0, &params, &forest);
    let mut html = render_account_tree(&state, &view, &forest);
    if params.get("form").map(|f| f == "new").unwrap_or(false) {
        let options = hierarchy::parent_options_with(
            &forest,
            0,
            &state.config.hierarchy.option_marker,
            state.config.hierarchy.max_degree,
            None,
        );
        html.push_str(&render_account_form(&path.0, &options, None, &view.open, true));
    }
    Ok(Html(html))
}

/// HTMX: edit form of an account. Its own subtree is not offered as parent.
pub async fn htmx_account_edit_form(
    state: State<AppState>,
    path: Path<String>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let account = state.flow.billing_account(&path.0).await?;
    let options = state
        .flow
        .parent_options(&account.billing_plan, Some(&account.id))
        .await?;
    let open: ExpandedSet = params
        .get("open")
        .map(|s| s.parse().unwrap_or_default())
        .unwrap_or_default();
    Ok(Html(render_account_form(
        &account.billing_plan,
        &options,
        Some(&account),
        &open,
        false,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    async fn account_id(state: &AppState, code: &str) -> String {
        let plan = demo_plan(state).await;
        state
            .flow
            .billing_accounts(&plan.id)
            .await
            .unwrap()
            .into_iter()
            .find(|a| a.code == code)
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_tree_page_shows_roots_collapsed() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let (_, html) = get(&state, &format!("/billing-plans/{}", plan.id)).await;
        assert!(html.contains("RECEITAS"));
        assert!(html.contains("DESPESAS"));
        assert!(html.contains("data-depth='0'"));
        assert!(!html.contains("data-depth='1'"));
        assert!(html.contains("Nenhuma (conta raiz)"));
    }

    #[tokio::test]
    async fn test_rows_follow_open_query() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let receitas = account_id(&state, "1").await;
        let operacionais = account_id(&state, "1.1").await;

        let uri = format!("/billing-plans/{}/rows?open={},{}", plan.id, receitas, operacionais);
        let (_, html) = htmx(&state, "GET", &uri, "").await;
        assert!(html.contains("RECEITAS OPERACIONAIS"));
        assert!(html.contains("SERVIÇOS"));
        assert!(!html.contains("CUSTOS VARIÁVEIS"));
        // depth 2 rows are indented by two units plus the cell padding
        assert!(html.contains("padding-left: 64px"));
    }

    #[tokio::test]
    async fn test_expand_all_and_search() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let (_, html) = htmx(&state, "GET", &format!("/billing-plans/{}/rows?expand=all", plan.id), "").await;
        assert!(html.contains("CUSTOS VARIÁVEIS"));
        assert!(html.contains("JUROS"));

        let (_, html) = htmx(&state, "GET", &format!("/billing-plans/{}/rows?search=juros", plan.id), "").await;
        assert!(html.contains("JUROS"));
        assert!(html.contains("RECEITAS FINANCEIRAS"));
        assert!(!html.contains("DESPESAS"));

        let (_, html) = htmx(&state, "GET", &format!("/billing-plans/{}/rows?search=nada", plan.id), "").await;
        assert!(html.contains("Nenhuma conta encontrada"));
    }

    #[tokio::test]
    async fn test_edit_form_excludes_own_subtree() {
        let state = demo_state();
        let id = account_id(&state, "1.1").await;
        let (status, html) = htmx(&state, "GET", &format!("/billing-accounts/{}/edit", id), "").await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(html.contains("Editar conta 1.1"));
        assert!(!html.contains("1.1.1 - SERVIÇOS"));
        assert!(html.contains("-- 1.2 - RECEITAS FINANCEIRAS"));
    }

    #[test]
    fn test_tree_view_parses_params() {
        let mut params = HashMap::new();
        params.insert("open".to_string(), "a, b,,".to_string());
        params.insert("search".to_string(), " x ".to_string());
        let view = TreeView::from_params("plan", &params, &[]);
        assert_eq!(view.open.len(), 2);
        assert_eq!(view.search, "x");

        params.insert("expand".to_string(), "none".to_string());
        assert!(TreeView::from_params("plan", &params, &[]).open.is_empty());
    }
}
