//! Title page rendering - List and detail pages

use crate::{esc, page_response, ApiError, AppState};
use accountflow_store::{Company, FlowKind, RecurrencePeriod, Title};
use axum::extract::{Path, Query, State};
use axum::response::Html;
use std::collections::HashMap;

/// Filters of the title list
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    pub query: String,
    pub kind: Option<FlowKind>,
    pub company: Option<String>,
}

impl TitleFilter {
    /// Read `q` (or `search`), `kind` and `company`
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ApiError> {
        let kind = match params.get("kind").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(kind) => Some(kind.parse::<FlowKind>().map_err(ApiError::bad_request)?),
            None => None,
        };
        Ok(Self {
            query: params
                .get("q")
                .or_else(|| params.get("search"))
                .cloned()
                .unwrap_or_default(),
            kind,
            company: params.get("company").filter(|c| !c.is_empty()).cloned(),
        })
    }

    pub fn apply(&self, titles: Vec<Title>) -> Vec<Title> {
        let titles: Vec<Title> = titles
            .into_iter()
            .filter(|t| self.kind.map_or(true, |k| t.kind == k))
            .filter(|t| self.company.as_ref().map_or(true, |c| &t.company == c))
            .collect();
        accountflow_core::search(titles, &self.query, |t| vec![t.description.as_str()])
    }
}

pub fn render_titles_list(state: &AppState, titles: &[Title], companies: &[Company]) -> String {
    if titles.is_empty() {
        return "<div id='titles-list' class='p-6 text-center text-gray-500'>Nenhum título encontrado</div>".to_string();
    }
    let per_page = state.config.pagination.records_per_page.max(1);
    let rows: Vec<String> = titles
        .iter()
        .take(per_page)
        .map(|title| {
            let company = companies
                .iter()
                .find(|c| c.id == title.company)
                .map(|c| esc(&c.fantasy_name))
                .unwrap_or_default();
            format!(
                r#"<tr class='border-b hover:bg-gray-50'>
                    <td class='px-4 py-2'><a href='/titles/{id}' class='text-indigo-600 hover:underline font-medium'>{description}</a></td>
                    <td class='px-4 py-2'>{company}</td>
                    <td class='px-4 py-2'><span class='{kind_class}'>{kind}</span></td>
                    <td class='px-4 py-2 text-right font-mono'>{amount}</td>
                    <td class='px-4 py-2'>{expiration}</td>
                    <td class='px-4 py-2'>{active}</td>
                    <td class='px-4 py-2 text-right'>
                        <button class='text-red-600 text-sm hover:underline' hx-delete='/titles/{id}' hx-target='#titles-list' hx-swap='outerHTML'
                            hx-confirm='Remover o título e todos os seus lançamentos?'>Remover</button>
                    </td>
                </tr>"#,
                id = esc(&title.id),
                description = esc(&title.description),
                company = company,
                kind_class = if title.kind == FlowKind::Income { "text-green-600" } else { "text-red-600" },
                kind = title.kind.label(),
                amount = state.money(title.amount),
                expiration = title.expiration_date.format("%d/%m/%Y"),
                active = if title.active { "Ativo" } else { "Inativo" },
            )
        })
        .collect();
    let footer = if titles.len() > per_page {
        format!(
            "<p class='px-4 py-2 text-sm text-gray-500'>Mostrando {} de {} títulos. Refine a busca para ver os demais.</p>",
            per_page,
            titles.len()
        )
    } else {
        String::new()
    };
    format!(
        r#"<div id='titles-list'><table class='w-full text-sm'>
            <thead><tr class='text-left text-gray-500 border-b'><th class='px-4 py-2'>Descrição</th><th class='px-4 py-2'>Empresa</th><th class='px-4 py-2'>Tipo</th><th class='px-4 py-2 text-right'>Valor</th><th class='px-4 py-2'>Vencimento</th><th class='px-4 py-2'>Situação</th><th></th></tr></thead>
            <tbody>{}</tbody>
        </table>{}</div>"#,
        rows.join(""),
        footer
    )
}

pub(crate) async fn titles_list(state: &AppState, filter: &TitleFilter) -> Result<String, ApiError> {
    let titles = filter.apply(state.flow.titles().await?);
    let companies = state.flow.companies().await?;
    Ok(render_titles_list(state, &titles, &companies))
}

pub async fn htmx_titles_list(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let filter = TitleFilter::from_params(&params)?;
    Ok(Html(titles_list(&state, &filter).await?))
}

fn options<T>(items: &[T], value: impl Fn(&T) -> String, label: impl Fn(&T) -> String) -> String {
    items
        .iter()
        .map(|item| format!("<option value='{}'>{}</option>", esc(&value(item)), esc(&label(item))))
        .collect()
}

pub async fn page_titles(
    state: State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Html<String>, ApiError> {
    let companies = state.flow.companies().await?;
    let presets = state.flow.presets().await?;
    let periods = [
        RecurrencePeriod::Daily,
        RecurrencePeriod::Weekly,
        RecurrencePeriod::Monthly,
        RecurrencePeriod::Yearly,
    ];

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Títulos</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Novo título</h3>
            <form hx-post='/titles' hx-target='#titles-list' hx-swap='outerHTML' class='grid grid-cols-1 md:grid-cols-4 gap-4'>
                <input name='description' placeholder='Descrição' required class='px-3 py-2 border rounded-lg md:col-span-2'>
                <select name='kind' class='px-3 py-2 border rounded-lg bg-white'><option value='income'>Receita</option><option value='expense'>Despesa</option></select>
                <input name='amount' type='number' step='0.01' min='0' placeholder='Valor' required class='px-3 py-2 border rounded-lg'>
                <label class='text-sm text-gray-600'>Vencimento<input name='expiration_date' type='date' required class='w-full px-3 py-2 border rounded-lg'></label>
                <label class='text-sm text-gray-600'>Empresa<select name='company' class='w-full px-3 py-2 border rounded-lg bg-white'>{companies}</select></label>
                <label class='text-sm text-gray-600'>Histórico padrão<select name='preset' class='w-full px-3 py-2 border rounded-lg bg-white'><option value=''>-</option>{presets}</select></label>
                <label class='text-sm text-gray-600'>Juros ao mês (%)<input name='fees_percentage_monthly' type='number' step='0.01' min='0' class='w-full px-3 py-2 border rounded-lg'></label>
                <label class='text-sm text-gray-600'>Parcelas<input name='installments' type='number' min='1' class='w-full px-3 py-2 border rounded-lg'></label>
                <label class='flex items-center gap-2 text-sm'><input type='checkbox' name='recurrence'> Recorrente</label>
                <label class='text-sm text-gray-600'>Período<select name='recurrence_period' class='w-full px-3 py-2 border rounded-lg bg-white'><option value=''>-</option>{periods}</select></label>
                <label class='flex items-center gap-2 text-sm'><input type='checkbox' name='active' checked> Ativo</label>
                <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Salvar</button>
            </form>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <form class='flex gap-2 mb-4' hx-get='/titles/list' hx-trigger='keyup changed delay:300ms from:input, change' hx-target='#titles-list' hx-swap='outerHTML'>
                <input type='search' name='q' placeholder='Buscar...' class='flex-1 px-3 py-2 border rounded-lg'>
                <select name='kind' class='px-3 py-2 border rounded-lg bg-white'><option value=''>Todos</option><option value='income'>Receitas</option><option value='expense'>Despesas</option></select>
            </form>
            {list}
        </div>"#,
        companies = options(&companies, |c| c.id.clone(), |c| c.fantasy_name.clone()),
        presets = options(&presets, |p| p.id.clone(), |p| p.name.clone()),
        periods = options(&periods, |p| p.to_string(), |p| p.to_string()),
        list = titles_list(&state, &TitleFilter::default()).await?,
    );

    Ok(Html(page_response(&headers, "Títulos", "/titles", &inner_content)))
}

/// Title detail with the entries section
pub async fn page_title_detail(
    state: State<AppState>,
    headers: axum::http::HeaderMap,
    path: Path<String>,
) -> Result<Html<String>, ApiError> {
    let title = state.flow.title(&path.0).await?;
    let company = state.flow.company(&title.company).await?;
    let preset = match &title.preset {
        Some(id) => state.flow.preset(id).await.ok(),
        None => None,
    };
    let recurrence = match (title.recurrence, title.recurrence_period) {
        (true, Some(period)) => period.to_string(),
        _ => "-".to_string(),
    };

    let inner_content = format!(
        r#"<div class='mb-6'>
            <a href='/titles' class='text-sm text-indigo-600 hover:underline'>← Títulos</a>
            <h2 class='text-2xl font-bold'>{description}</h2>
            <p class='{kind_class}'>{kind}</p>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6 grid grid-cols-2 md:grid-cols-4 gap-4'>
            <div><p class='text-sm text-gray-500'>Empresa</p><p class='font-medium'>{company}</p></div>
            <div><p class='text-sm text-gray-500'>Vencimento</p><p class='font-medium'>{expiration}</p></div>
            <div><p class='text-sm text-gray-500'>Histórico padrão</p><p class='font-medium'>{preset}</p></div>
            <div><p class='text-sm text-gray-500'>Recorrência</p><p class='font-medium'>{recurrence}</p></div>
            <div><p class='text-sm text-gray-500'>Juros ao mês</p><p class='font-medium'>{fees}</p></div>
            <div><p class='text-sm text-gray-500'>Parcelas</p><p class='font-medium'>{installments}</p></div>
            <div><p class='text-sm text-gray-500'>Situação</p><p class='font-medium'>{active}</p></div>
        </div>
        {entries}"#,
        description = esc(&title.description),
        kind_class = if title.kind == FlowKind::Income { "text-green-600" } else { "text-red-600" },
        kind = title.kind.label(),
        company = esc(&company.fantasy_name),
        expiration = title.expiration_date.format("%d/%m/%Y"),
        preset = preset.map(|p| esc(&p.name)).unwrap_or_else(|| "-".to_string()),
        recurrence = recurrence,
        fees = title.fees_percentage_monthly.map(|f| format!("{}%", f)).unwrap_or_else(|| "-".to_string()),
        installments = title.installments.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string()),
        active = if title.active { "Ativo" } else { "Inativo" },
        entries = crate::routes::entries::entries_section(&state, &title).await?,
    );

    Ok(Html(page_response(&headers, &title.description, "/titles", &inner_content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[tokio::test]
    async fn test_titles_page_and_filter() {
        let state = demo_state();
        let (_, html) = get(&state, "/titles").await;
        assert!(html.contains("Consultoria janeiro"));
        assert!(html.contains(">DEMO<"));
        assert!(html.contains("hx-post='/titles'"));

        let (_, html) = htmx(&state, "GET", "/titles/list?kind=expense", "").await;
        assert_eq!(html.matches("text-red-600'>Despesa").count(), 3);
        assert!(!html.contains(">Receita<"));
    }

    #[tokio::test]
    async fn test_title_detail_shows_balance_and_entries() {
        let state = demo_state();
        let title = state.flow.titles().await.unwrap().remove(0);
        let (status, html) = get(&state, &format!("/titles/{}", title.id)).await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(html.contains(&esc(&title.description)));
        assert!(html.contains("id='entries-section'"));
        assert!(html.contains("Em aberto"));
    }

    #[tokio::test]
    async fn test_unknown_title_is_not_found() {
        let state = demo_state();
        let (status, _) = get(&state, "/titles/missing").await;
        assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_is_capped_by_page_size() {
        let mut config = accountflow_config::Config::default();
        config.pagination.records_per_page = 2;
        let store = std::sync::Arc::new(accountflow_store::MemoryStore::with_data(accountflow_store::seed::demo_data()));
        let state = AppState::new(accountflow_core::AccountFlow::new(store, config));
        let (_, html) = htmx(&state, "GET", "/titles/list", "").await;
        assert_eq!(html.matches("hx-delete='/titles/").count(), 2);
        assert!(html.contains("Mostrando 2 de 7"));
    }

    #[test]
    fn test_filter_from_params() {
        let mut params = HashMap::new();
        params.insert("kind".to_string(), "income".to_string());
        params.insert("search".to_string(), "venda".to_string());
        let filter = TitleFilter::from_params(&params).unwrap();
        assert_eq!(filter.kind, Some(FlowKind::Income));
        assert_eq!(filter.query, "venda");
        params.insert("kind".to_string(), "x".to_string());
        assert!(TitleFilter::from_params(&params).is_err());
    }
}
