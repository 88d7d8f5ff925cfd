//! Company API endpoints - JSON API and HTMX mutations

use super::page::render_companies_list;
use crate::form::FormData;
use crate::{with_toast, ApiError, AppState, HtmxError};
use accountflow_core::CompanyPayload;
use accountflow_store::{Address, Company};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use std::collections::HashMap;

/// Fields matched by the company search
pub(crate) fn company_fields(c: &Company) -> Vec<&str> {
    vec![
        c.fantasy_name.as_str(),
        c.social_reason.as_str(),
        c.cnpj.as_str(),
        c.address.city.as_str(),
    ]
}

pub async fn api_companies(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<Vec<Company>>, ApiError> {
    let companies = state.flow.companies().await?;
    let query = params.get("q").map(|s| s.as_str()).unwrap_or("");
    Ok(Json(accountflow_core::search(companies, query, company_fields)))
}

pub async fn api_company(state: State<AppState>, path: Path<String>) -> Result<Json<Company>, ApiError> {
    Ok(Json(state.flow.company(&path.0).await?))
}

pub async fn api_company_create(
    state: State<AppState>,
    Json(payload): Json<CompanyPayload>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    let company = state.flow.create_company(payload).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn api_company_update(
    state: State<AppState>,
    path: Path<String>,
    Json(payload): Json<CompanyPayload>,
) -> Result<Json<Company>, ApiError> {
    Ok(Json(state.flow.update_company(&path.0, payload).await?))
}

/// Delete a company with its titles and their entries
pub async fn api_company_delete(state: State<AppState>, path: Path<String>) -> Result<StatusCode, ApiError> {
    state.flow.delete_company(&path.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn company_payload(form: &FormData) -> Result<CompanyPayload, ApiError> {
    Ok(CompanyPayload {
        cnpj: form.get("cnpj").to_string(),
        fantasy_name: form.get("fantasy_name").to_string(),
        social_reason: form.get("social_reason").to_string(),
        opening_date: form.parse_required("opening_date", "opening date")?,
        address: Address {
            zip_code: form.get("zip_code").to_string(),
            street: form.get("street").to_string(),
            number: form.get("number").to_string(),
            complement: form.opt("complement"),
            neighborhood: form.get("neighborhood").to_string(),
            city: form.get("city").to_string(),
            state: form.get("state").to_string(),
        },
        kind: form.parse_opt("kind", "company type")?.unwrap_or_default(),
        cnae: form.opt("cnae"),
        email: form.opt("email"),
        phone: form.opt("phone"),
    })
}

async fn refreshed(state: &AppState, message: &str) -> Result<Html<String>, HtmxError> {
    let companies = state.flow.companies().await?;
    Ok(Html(with_toast(&render_companies_list(&companies), message)))
}

pub async fn htmx_company_store(state: State<AppState>, body: String) -> Result<Html<String>, HtmxError> {
    let form = FormData::parse(&body);
    let company = state.flow.create_company(company_payload(&form)?).await?;
    refreshed(&state, &format!("Empresa {} cadastrada", company.fantasy_name)).await
}

pub async fn htmx_company_delete(state: State<AppState>, path: Path<String>) -> Result<Html<String>, HtmxError> {
    state.flow.delete_company(&path.0).await?;
    refreshed(&state, "Empresa removida").await
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn company_json(cnpj: &str) -> serde_json::Value {
        json!({
            "cnpj": cnpj,
            "fantasy_name": "Acme",
            "social_reason": "Acme Comércio LTDA",
            "opening_date": "2019-05-02",
            "kind": "Supplier",
            "address": {
                "zip_code": "85883000",
                "street": "Av. Brasil",
                "number": "1",
                "neighborhood": "Centro",
                "city": "Cascavel",
                "state": "pr"
            }
        })
    }

    #[tokio::test]
    async fn test_json_create_and_search() {
        let state = demo_state();
        let (status, company) = json(&state, "POST", "/api/companies", company_json("11.222.333/0001-81")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(company["address"]["state"], "PR");

        let (_, list) = json(&state, "GET", "/api/companies?q=cascavel", json!(null)).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_json_create_rejects_bad_cnpj() {
        let state = demo_state();
        let (status, error) = json(&state, "POST", "/api/companies", company_json("123")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["message"], "Validation error: Invalid CNPJ: 123");
    }

    #[tokio::test]
    async fn test_htmx_store_and_delete_cascade() {
        let state = demo_state();
        let form = "cnpj=11222333000181&fantasy_name=Acme&social_reason=Acme+LTDA&opening_date=2019-05-02&kind=client\
                    &zip_code=85883-000&street=Rua+A&number=1&neighborhood=Centro&city=Ibema&state=PR&email=";
        let (status, html) = htmx(&state, "POST", "/companies", form).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Empresa Acme cadastrada"));

        let demo = state.flow.companies().await.unwrap().remove(0);
        let (_, html) = htmx(&state, "DELETE", &format!("/companies/{}", demo.id), "").await;
        assert!(html.contains("Empresa removida"));
        assert!(state.flow.titles().await.unwrap().is_empty());
    }
}
