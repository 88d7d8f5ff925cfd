//! History preset page rendering

use crate::{esc, page_response, ApiError, AppState};
use accountflow_core::hierarchy::{render_rows, ExpandedSet};
use accountflow_store::{BillingAccount, BillingPlan, HistoryPreset};
use axum::extract::{Query, State};
use axum::response::Html;
use std::collections::HashMap;

const ACCOUNT_FIELDS: [(&str, &str); 4] = [
    ("payable_account", "Conta a pagar"),
    ("receivable_account", "Conta a receber"),
    ("revenue_account", "Conta de receita"),
    ("expense_account", "Conta de despesa"),
];

fn account_label(accounts: &[BillingAccount], id: Option<&String>) -> String {
    match id {
        None => "-".to_string(),
        Some(id) => accounts
            .iter()
            .find(|a| &a.id == id)
            .map(|a| format!("{} - {}", esc(&a.code), esc(&a.name)))
            .unwrap_or_else(|| "?".to_string()),
    }
}

pub fn render_presets_list(presets: &[HistoryPreset], plans: &[BillingPlan], accounts: &[BillingAccount]) -> String {
    if presets.is_empty() {
        return "<div id='presets-list' class='p-6 text-center text-gray-500'>Nenhum histórico padrão cadastrado</div>".to_string();
    }
    let rows: Vec<String> = presets
        .iter()
        .map(|preset| {
            let plan = plans
                .iter()
                .find(|p| p.id == preset.billing_plan)
                .map(|p| esc(&p.name))
                .unwrap_or_default();
            format!(
                r#"<tr class='border-b hover:bg-gray-50'>
                    <td class='px-4 py-2 font-medium'>{name}<p class='text-xs text-gray-500'>{description}</p></td>
                    <td class='px-4 py-2'>{plan}</td>
                    <td class='px-4 py-2'>{payable}</td>
                    <td class='px-4 py-2'>{receivable}</td>
                    <td class='px-4 py-2'>{revenue}</td>
                    <td class='px-4 py-2'>{expense}</td>
                    <td class='px-4 py-2'>{active}</td>
                    <td class='px-4 py-2 text-right'>
                        <button class='text-red-600 text-sm hover:underline' hx-delete='/history-presets/{id}' hx-target='#presets-list' hx-swap='outerHTML' hx-confirm='Remover o histórico {name}?'>Remover</button>
                    </td>
                </tr>"#,
                name = esc(&preset.name),
                description = esc(&preset.description),
                plan = plan,
                payable = account_label(accounts, preset.payable_account.as_ref()),
                receivable = account_label(accounts, preset.receivable_account.as_ref()),
                revenue = account_label(accounts, preset.revenue_account.as_ref()),
                expense = account_label(accounts, preset.expense_account.as_ref()),
                active = if preset.active { "Ativo" } else { "Inativo" },
                id = esc(&preset.id),
            )
        })
        .collect();
    format!(
        r#"<div id='presets-list'><table class='w-full text-sm'>
            <thead><tr class='text-left text-gray-500 border-b'><th class='px-4 py-2'>Nome</th><th class='px-4 py-2'>Plano</th><th class='px-4 py-2'>A pagar</th><th class='px-4 py-2'>A receber</th><th class='px-4 py-2'>Receita</th><th class='px-4 py-2'>Despesa</th><th class='px-4 py-2'>Situação</th><th></th></tr></thead>
            <tbody>{}</tbody>
        </table></div>"#,
        rows.join("")
    )
}

/// Preset list with plan and account names resolved
pub async fn presets_list(state: &AppState) -> Result<String, ApiError> {
    let presets = state.flow.presets().await?;
    let plans = state.flow.billing_plans().await?;
    let mut accounts = Vec::new();
    for plan in &plans {
        accounts.extend(state.flow.billing_accounts(&plan.id).await?);
    }
    Ok(render_presets_list(&presets, &plans, &accounts))
}

/// The four account selectors for one plan, in chart order
async fn account_fields(state: &AppState, plan_id: Option<&str>) -> Result<String, ApiError> {
    let mut options = String::from("<option value=''>-</option>");
    if let Some(plan_id) = plan_id {
        let forest = state.flow.account_tree(plan_id).await?;
        let mut open = ExpandedSet::new();
        open.expand_all(&forest);
        for row in render_rows(&forest, 0, &open) {
            options.push_str(&format!(
                "<option value='{}'>{}{} - {}</option>",
                esc(&row.id),
                "&nbsp;&nbsp;".repeat(row.depth),
                esc(&row.code),
                esc(&row.name)
            ));
        }
    }
    let selects: Vec<String> = ACCOUNT_FIELDS
        .iter()
        .map(|(field, label)| {
            format!(
                "<label class='text-sm text-gray-600'>{}<select name='{}' class='w-full px-3 py-2 border rounded-lg bg-white'>{}</select></label>",
                label, field, options
            )
        })
        .collect();
    Ok(format!(
        "<div id='preset-accounts' class='grid grid-cols-1 md:grid-cols-4 gap-4 md:col-span-3'>{}</div>",
        selects.join("")
    ))
}

/// HTMX: account selectors of the plan chosen in the form
pub async fn htmx_preset_account_fields(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let plan = params.get("billing_plan").map(|s| s.as_str()).filter(|s| !s.is_empty());
    Ok(Html(account_fields(&state, plan).await?))
}

pub async fn page_presets(
    state: State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Html<String>, ApiError> {
    let plans = state.flow.billing_plans().await?;
    let plan_options: String = plans
        .iter()
        .map(|p| format!("<option value='{}'>{}</option>", esc(&p.id), esc(&p.name)))
        .collect();
    let fields = account_fields(&state, plans.first().map(|p| p.id.as_str())).await?;

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Históricos padrão</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Novo histórico</h3>
            <form hx-post='/history-presets' hx-target='#presets-list' hx-swap='outerHTML' class='grid grid-cols-1 md:grid-cols-3 gap-4'>
                <input name='name' placeholder='Nome' required class='px-3 py-2 border rounded-lg'>
                <input name='description' placeholder='Descrição' class='px-3 py-2 border rounded-lg'>
                <select name='billing_plan' class='px-3 py-2 border rounded-lg bg-white' hx-get='/history-presets/accounts' hx-trigger='change' hx-target='#preset-accounts' hx-swap='outerHTML'>{plans}</select>
                {fields}
                <label class='flex items-center gap-2 text-sm'><input type='checkbox' name='active' checked> Ativo</label>
                <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Salvar</button>
            </form>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>{list}</div>"#,
        plans = plan_options,
        fields = fields,
        list = presets_list(&state).await?,
    );

    Ok(Html(page_response(&headers, "Históricos padrão", "/history-presets", &inner_content)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;

    #[tokio::test]
    async fn test_page_lists_demo_preset() {
        let state = demo_state();
        let (_, html) = get(&state, "/history-presets").await;
        assert!(html.contains("PADRÃO"));
        assert!(html.contains("2.3 - PAGAMENTOS"));
        assert!(html.contains("name='expense_account'"));
    }

    #[tokio::test]
    async fn test_account_fields_follow_plan() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let (_, html) = htmx(&state, "GET", &format!("/history-presets/accounts?billing_plan={}", plan.id), "").await;
        assert!(html.contains("&nbsp;&nbsp;&nbsp;&nbsp;1.1.1 - SERVIÇOS"));
        let (_, html) = htmx(&state, "GET", "/history-presets/accounts", "").await;
        assert!(!html.contains("SERVIÇOS"));
    }
}
