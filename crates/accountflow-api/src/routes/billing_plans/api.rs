//! Billing plan API endpoints - JSON API and HTMX mutations

use crate::form::FormData;
use crate::{with_toast, ApiError, AppState, HtmxError};
use accountflow_core::BillingPlanPayload;
use accountflow_store::BillingPlan;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use std::collections::HashMap;

/// List plans, optionally filtered by `q` (JSON API)
pub async fn api_billing_plans(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<Vec<BillingPlan>>, ApiError> {
    let plans = state.flow.billing_plans().await?;
    let query = params.get("q").map(|s| s.as_str()).unwrap_or("");
    Ok(Json(accountflow_core::search(plans, query, |p| {
        vec![p.name.as_str(), p.description.as_str()]
    })))
}

pub async fn api_billing_plan(state: State<AppState>, path: Path<String>) -> Result<Json<BillingPlan>, ApiError> {
    Ok(Json(state.flow.billing_plan(&path.0).await?))
}

pub async fn api_billing_plan_create(
    state: State<AppState>,
    Json(payload): Json<BillingPlanPayload>,
) -> Result<(StatusCode, Json<BillingPlan>), ApiError> {
    let plan = state.flow.create_billing_plan(payload).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn api_billing_plan_update(
    state: State<AppState>,
    path: Path<String>,
    Json(payload): Json<BillingPlanPayload>,
) -> Result<Json<BillingPlan>, ApiError> {
    Ok(Json(state.flow.update_billing_plan(&path.0, payload).await?))
}

pub async fn api_billing_plan_delete(state: State<AppState>, path: Path<String>) -> Result<StatusCode, ApiError> {
    state.flow.delete_billing_plan(&path.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn plan_payload(form: &FormData) -> BillingPlanPayload {
    BillingPlanPayload {
        name: form.get("name").to_string(),
        description: form.opt("description"),
    }
}

/// HTMX: create a plan from the form, answer with the refreshed list
pub async fn htmx_billing_plan_store(state: State<AppState>, body: String) -> Result<Html<String>, HtmxError> {
    let form = FormData::parse(&body);
    let plan = state.flow.create_billing_plan(plan_payload(&form)).await?;
    let plans = state.flow.billing_plans().await?;
    Ok(Html(with_toast(
        &super::page::render_plans_list(&plans),
        &format!("Plano {} criado", plan.name),
    )))
}

/// HTMX: delete a plan with its accounts and presets
pub async fn htmx_billing_plan_delete(state: State<AppState>, path: Path<String>) -> Result<Html<String>, HtmxError> {
    state.flow.delete_billing_plan(&path.0).await?;
    let plans = state.flow.billing_plans().await?;
    Ok(Html(with_toast(&super::page::render_plans_list(&plans), "Plano removido")))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_plan_json_crud() {
        let state = demo_state();
        let (status, created) = json(&state, "POST", "/api/billing-plans", json!({ "name": " plano novo ", "description": "Teste" })).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "PLANO NOVO");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = json(&state, "PUT", &format!("/api/billing-plans/{}", id), json!({ "name": "Plano B" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "PLANO B");

        let (status, list) = get(&state, "/api/billing-plans?q=plano%20b").await;
        assert_eq!(status, StatusCode::OK);
        let list: serde_json::Value = serde_json::from_str(&list).unwrap();
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = json(&state, "DELETE", &format!("/api/billing-plans/{}", id), json!(null)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, error) = json(&state, "GET", &format!("/api/billing-plans/{}", id), json!(null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_plan_validation_error() {
        let state = demo_state();
        let (status, error) = json(&state, "POST", "/api/billing-plans", json!({ "name": "  " })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_htmx_store_returns_list_and_toast() {
        let state = demo_state();
        let (status, html) = htmx(&state, "POST", "/billing-plans", "name=Plano+Filial&description=").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("PLANO FILIAL"));
        assert!(html.contains("PLANO DEMO"));
        assert!(html.contains("hx-swap-oob"));
    }

    #[tokio::test]
    async fn test_htmx_store_rejects_blank_name_into_toast() {
        let state = demo_state();
        let (status, html) = htmx(&state, "POST", "/billing-plans", "name=").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("id='toast'"));
        assert!(html.contains("Name is required"));
        assert_eq!(state.flow.billing_plans().await.unwrap().len(), 1);
    }
}
