//! Company page rendering

use super::api::company_fields;
use crate::{esc, page_response, ApiError, AppState};
use accountflow_store::{Company, CompanyKind};
use axum::extract::{Query, State};
use axum::response::Html;
use std::collections::HashMap;

fn kind_label(kind: CompanyKind) -> &'static str {
    match kind {
        CompanyKind::Client => "Cliente",
        CompanyKind::Supplier => "Fornecedor",
        CompanyKind::Both => "Cliente e fornecedor",
    }
}

pub fn render_companies_list(companies: &[Company]) -> String {
    if companies.is_empty() {
        return "<div id='companies-list' class='p-6 text-center text-gray-500'>Nenhuma empresa cadastrada</div>".to_string();
    }
    let rows: Vec<String> = companies
        .iter()
        .map(|company| {
            format!(
                r#"<tr class='border-b hover:bg-gray-50'>
                    <td class='px-4 py-2 font-medium'>{fantasy}<p class='text-xs text-gray-500'>{social}</p></td>
                    <td class='px-4 py-2 font-mono'>{cnpj}</td>
                    <td class='px-4 py-2'>{kind}</td>
                    <td class='px-4 py-2'>{address}</td>
                    <td class='px-4 py-2'>{email}<p class='text-xs text-gray-500'>{phone}</p></td>
                    <td class='px-4 py-2 text-right space-x-2'>
                        <a class='text-indigo-600 text-sm hover:underline' href='/reports/dre?company={id}'>DRE</a>
                        <button class='text-red-600 text-sm hover:underline' hx-delete='/companies/{id}' hx-target='#companies-list' hx-swap='outerHTML'
                            hx-confirm='Remover a empresa {fantasy} com todos os seus títulos?'>Remover</button>
                    </td>
                </tr>"#,
                fantasy = esc(&company.fantasy_name),
                social = esc(&company.social_reason),
                cnpj = esc(&company.cnpj),
                kind = kind_label(company.kind),
                address = esc(&company.address.to_string()),
                email = esc(&company.email),
                phone = esc(&company.phone),
                id = esc(&company.id),
            )
        })
        .collect();
    format!(
        r#"<div id='companies-list'><table class='w-full text-sm'>
            <thead><tr class='text-left text-gray-500 border-b'><th class='px-4 py-2'>Empresa</th><th class='px-4 py-2'>CNPJ</th><th class='px-4 py-2'>Tipo</th><th class='px-4 py-2'>Endereço</th><th class='px-4 py-2'>Contato</th><th></th></tr></thead>
            <tbody>{}</tbody>
        </table></div>"#,
        rows.join("")
    )
}

pub async fn htmx_companies_list(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let companies = state.flow.companies().await?;
    let query = params.get("search").map(|s| s.as_str()).unwrap_or("");
    let companies = accountflow_core::search(companies, query, company_fields);
    Ok(Html(render_companies_list(&companies)))
}

pub async fn page_companies(
    state: State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Html<String>, ApiError> {
    let companies = state.flow.companies().await?;
    let kinds: String = [CompanyKind::Client, CompanyKind::Supplier, CompanyKind::Both]
        .iter()
        .map(|k| format!("<option value='{}'>{}</option>", k, kind_label(*k)))
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Empresas</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Nova empresa</h3>
            <form hx-post='/companies' hx-target='#companies-list' hx-swap='outerHTML' class='grid grid-cols-1 md:grid-cols-4 gap-4'>
                <input name='cnpj' placeholder='CNPJ' required class='px-3 py-2 border rounded-lg'>
                <input name='fantasy_name' placeholder='Nome fantasia' required class='px-3 py-2 border rounded-lg'>
                <input name='social_reason' placeholder='Razão social' required class='px-3 py-2 border rounded-lg'>
                <label class='text-sm text-gray-600'>Abertura<input name='opening_date' type='date' required class='w-full px-3 py-2 border rounded-lg'></label>
                <select name='kind' class='px-3 py-2 border rounded-lg bg-white'>{kinds}</select>
                <input name='cnae' placeholder='CNAE' class='px-3 py-2 border rounded-lg'>
                <input name='email' type='email' placeholder='E-mail' class='px-3 py-2 border rounded-lg'>
                <input name='phone' placeholder='Telefone' class='px-3 py-2 border rounded-lg'>
                <input name='zip_code' placeholder='CEP' required class='px-3 py-2 border rounded-lg'>
                <input name='street' placeholder='Logradouro' required class='px-3 py-2 border rounded-lg'>
                <input name='number' placeholder='Número' class='px-3 py-2 border rounded-lg'>
                <input name='complement' placeholder='Complemento' class='px-3 py-2 border rounded-lg'>
                <input name='neighborhood' placeholder='Bairro' class='px-3 py-2 border rounded-lg'>
                <input name='city' placeholder='Cidade' required class='px-3 py-2 border rounded-lg'>
                <input name='state' placeholder='UF' maxlength='2' required class='px-3 py-2 border rounded-lg'>
                <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Salvar</button>
            </form>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <input type='search' name='search' placeholder='Buscar por nome, CNPJ ou cidade...' class='w-full mb-4 px-3 py-2 border rounded-lg'
                hx-get='/companies/list' hx-trigger='keyup changed delay:300ms, search' hx-target='#companies-list' hx-swap='outerHTML'>
            {list}
        </div>"#,
        kinds = kinds,
        list = render_companies_list(&companies),
    );

    Ok(Html(page_response(&headers, "Empresas", "/companies", &inner_content)))
}
