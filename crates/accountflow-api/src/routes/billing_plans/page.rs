//! Billing plan page rendering

use crate::{esc, page_response, ApiError, AppState};
use accountflow_store::BillingPlan;
use axum::extract::{Query, State};
use axum::response::Html;
use std::collections::HashMap;

/// Table body of the plan list, target of the HTMX mutations
pub fn render_plans_list(plans: &[BillingPlan]) -> String {
    if plans.is_empty() {
        return "<div id='plans-list' class='p-6 text-center text-gray-500'>Nenhum plano de contas cadastrado</div>".to_string();
    }
    let rows: Vec<String> = plans
        .iter()
        .map(|plan| {
            format!(
                r#"<tr class='border-b hover:bg-gray-50'>
                    <td class='px-4 py-2'><a href='/billing-plans/{id}' class='text-indigo-600 hover:underline font-medium'>{name}</a></td>
                    <td class='px-4 py-2 text-gray-600'>{description}</td>
                    <td class='px-4 py-2 text-right'>
                        <button class='text-red-600 text-sm hover:underline' hx-delete='/billing-plans/{id}' hx-target='#plans-list' hx-swap='outerHTML'
                            hx-confirm='Remover o plano {name} e todas as suas contas?'>Remover</button>
                    </td>
                </tr>"#,
                id = esc(&plan.id),
                name = esc(&plan.name),
                description = esc(&plan.description),
            )
        })
        .collect();
    format!(
        r#"<div id='plans-list'><table class='w-full text-sm'>
            <thead><tr class='text-left text-gray-500 border-b'><th class='px-4 py-2'>Nome</th><th class='px-4 py-2'>Descrição</th><th></th></tr></thead>
            <tbody>{}</tbody>
        </table></div>"#,
        rows.join("")
    )
}

/// HTMX: plan list filtered by `search`
pub async fn htmx_billing_plans_list(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let plans = state.flow.billing_plans().await?;
    let query = params.get("search").map(|s| s.as_str()).unwrap_or("");
    let plans = accountflow_core::search(plans, query, |p| vec![p.name.as_str(), p.description.as_str()]);
    Ok(Html(render_plans_list(&plans)))
}

pub async fn page_billing_plans(
    state: State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Html<String>, ApiError> {
    let plans = state.flow.billing_plans().await?;

    let inner_content = format!(
        r#"<div class='mb-6 flex items-center justify-between'><h2 class='text-2xl font-bold'>Planos de contas</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Novo plano</h3>
            <form hx-post='/billing-plans' hx-target='#plans-list' hx-swap='outerHTML' hx-on::after-request='if(event.detail.successful) this.reset()' class='grid grid-cols-1 md:grid-cols-3 gap-4'>
                <input name='name' placeholder='Nome' required class='px-3 py-2 border rounded-lg'>
                <input name='description' placeholder='Descrição' class='px-3 py-2 border rounded-lg'>
                <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Salvar</button>
            </form>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <input type='search' name='search' placeholder='Buscar...' class='w-full mb-4 px-3 py-2 border rounded-lg'
                hx-get='/billing-plans/list' hx-trigger='keyup changed delay:300ms, search' hx-target='#plans-list' hx-swap='outerHTML'>
            {}
        </div>"#,
        render_plans_list(&plans)
    );

    Ok(Html(page_response(&headers, "Planos de contas", "/billing-plans", &inner_content)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;

    #[tokio::test]
    async fn test_page_lists_plans() {
        let state = demo_state();
        let (_, html) = get(&state, "/billing-plans").await;
        assert!(html.contains("PLANO DEMO"));
        assert!(html.contains("hx-post='/billing-plans'"));
    }

    #[tokio::test]
    async fn test_list_fragment_filters() {
        let state = demo_state();
        let (_, html) = htmx(&state, "GET", "/billing-plans/list?search=outro", "").await;
        assert!(html.contains("Nenhum plano"));
        let (_, html) = htmx(&state, "GET", "/billing-plans/list?search=demo", "").await;
        assert!(html.contains("PLANO DEMO"));
    }
}
