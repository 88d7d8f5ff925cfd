//! Title API endpoints - JSON API and HTMX mutations

use super::page::{titles_list, TitleFilter};
use crate::form::FormData;
use crate::{with_toast, ApiError, AppState, HtmxError};
use accountflow_core::{TitleBalance, TitlePayload};
use accountflow_store::Title;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use std::collections::HashMap;

/// List titles filtered by `q`, `kind` and `company` (JSON API)
pub async fn api_titles(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<Vec<Title>>, ApiError> {
    let filter = TitleFilter::from_params(&params)?;
    let titles = state.flow.titles().await?;
    Ok(Json(filter.apply(titles)))
}

pub async fn api_title(state: State<AppState>, path: Path<String>) -> Result<Json<Title>, ApiError> {
    Ok(Json(state.flow.title(&path.0).await?))
}

pub async fn api_title_create(
    state: State<AppState>,
    Json(payload): Json<TitlePayload>,
) -> Result<(StatusCode, Json<Title>), ApiError> {
    let title = state.flow.create_title(payload).await?;
    Ok((StatusCode::CREATED, Json(title)))
}

pub async fn api_title_update(
    state: State<AppState>,
    path: Path<String>,
    Json(payload): Json<TitlePayload>,
) -> Result<Json<Title>, ApiError> {
    Ok(Json(state.flow.update_title(&path.0, payload).await?))
}

pub async fn api_title_delete(state: State<AppState>, path: Path<String>) -> Result<StatusCode, ApiError> {
    state.flow.delete_title(&path.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn api_title_balance(state: State<AppState>, path: Path<String>) -> Result<Json<TitleBalance>, ApiError> {
    Ok(Json(state.flow.title_balance(&path.0).await?))
}

pub(crate) fn title_payload(form: &FormData) -> Result<TitlePayload, ApiError> {
    Ok(TitlePayload {
        description: form.get("description").to_string(),
        kind: form.parse_required("kind", "type")?,
        amount: form.parse_required("amount", "amount")?,
        expiration_date: form.parse_required("expiration_date", "expiration date")?,
        company: form.get("company").to_string(),
        fees_percentage_monthly: form.parse_opt("fees_percentage_monthly", "monthly fees")?,
        installments: form.parse_opt("installments", "installments")?,
        active: Some(form.checked("active")),
        recurrence: form.checked("recurrence"),
        recurrence_period: form.parse_opt("recurrence_period", "recurrence period")?,
        preset: form.opt("preset"),
    })
}

pub async fn htmx_title_store(state: State<AppState>, body: String) -> Result<Html<String>, HtmxError> {
    let form = FormData::parse(&body);
    let title = state.flow.create_title(title_payload(&form)?).await?;
    let list = titles_list(&state, &TitleFilter::default()).await?;
    Ok(Html(with_toast(&list, &format!("Título {} criado", title.description))))
}

/// HTMX: delete a title and its entries
pub async fn htmx_title_delete(state: State<AppState>, path: Path<String>) -> Result<Html<String>, HtmxError> {
    state.flow.delete_title(&path.0).await?;
    let list = titles_list(&state, &TitleFilter::default()).await?;
    Ok(Html(with_toast(&list, "Título removido")))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::AppState;
    use axum::http::StatusCode;
    use serde_json::json;

    async fn company_id(state: &AppState) -> String {
        state.flow.companies().await.unwrap().remove(0).id
    }

    #[tokio::test]
    async fn test_json_create_and_balance() {
        let state = demo_state();
        let company = company_id(&state).await;
        let (status, title) = json(
            &state,
            "POST",
            "/api/titles",
            json!({
                "description": "Consultoria",
                "kind": "income",
                "amount": "1000.00",
                "expiration_date": "2024-03-10",
                "company": company
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = title["id"].as_str().unwrap().to_string();

        let (status, balance) = json(&state, "GET", &format!("/api/titles/{}/balance", id), json!(null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(balance["open"], "1000.00");
        assert_eq!(balance["entries"], 0);
    }

    #[tokio::test]
    async fn test_json_create_rejects_unknown_company() {
        let state = demo_state();
        let (status, error) = json(
            &state,
            "POST",
            "/api/titles",
            json!({
                "description": "Consultoria",
                "kind": "expense",
                "amount": "10",
                "expiration_date": "2024-03-10",
                "company": "missing"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_json_list_filters_by_kind() {
        let state = demo_state();
        let (_, list) = json(&state, "GET", "/api/titles?kind=expense", json!(null)).await;
        assert_eq!(list.as_array().unwrap().len(), 3);
        let (status, _) = json(&state, "GET", "/api/titles?kind=other", json!(null)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_htmx_store_parses_form() {
        let state = demo_state();
        let company = company_id(&state).await;
        let form = format!(
            "description=Aluguel+sala&kind=expense&amount=1500.00&expiration_date=2024-04-05&company={}&recurrence=on&recurrence_period=monthly&active=on&preset=",
            company
        );
        let (status, html) = htmx(&state, "POST", "/titles", &form).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Título Aluguel sala criado"));
        let title = state.flow.titles().await.unwrap().into_iter().find(|t| t.description == "Aluguel sala").unwrap();
        assert!(title.recurrence);
        assert_eq!(title.preset, None);

        let (_, html) = htmx(&state, "POST", "/titles", "description=X&kind=expense&amount=abc").await;
        assert!(html.contains("Invalid amount: abc"));
    }

    #[tokio::test]
    async fn test_htmx_delete_cascades_entries() {
        let state = demo_state();
        let title = state.flow.titles().await.unwrap().remove(0);
        let before = state.flow.summary().await.unwrap().entries;
        let (_, html) = htmx(&state, "DELETE", &format!("/titles/{}", title.id), "").await;
        assert!(html.contains("Título removido"));
        assert_eq!(state.flow.summary().await.unwrap().entries, before - 1);
    }
}
