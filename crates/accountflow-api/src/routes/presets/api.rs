//! History preset API endpoints - JSON API and HTMX mutations

use crate::form::FormData;
use crate::{with_toast, ApiError, AppState, HtmxError};
use accountflow_core::HistoryPresetPayload;
use accountflow_store::HistoryPreset;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use std::collections::HashMap;

/// List presets, `billing_plan` and `q` filter the result (JSON API)
pub async fn api_presets(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<Vec<HistoryPreset>>, ApiError> {
    let mut presets = state.flow.presets().await?;
    if let Some(plan) = params.get("billing_plan").filter(|p| !p.is_empty()) {
        presets.retain(|p| &p.billing_plan == plan);
    }
    let query = params.get("q").map(|s| s.as_str()).unwrap_or("");
    Ok(Json(accountflow_core::search(presets, query, |p| {
        vec![p.name.as_str(), p.description.as_str()]
    })))
}

pub async fn api_preset(state: State<AppState>, path: Path<String>) -> Result<Json<HistoryPreset>, ApiError> {
    Ok(Json(state.flow.preset(&path.0).await?))
}

pub async fn api_preset_create(
    state: State<AppState>,
    Json(payload): Json<HistoryPresetPayload>,
) -> Result<(StatusCode, Json<HistoryPreset>), ApiError> {
    let preset = state.flow.create_preset(payload).await?;
    Ok((StatusCode::CREATED, Json(preset)))
}

pub async fn api_preset_update(
    state: State<AppState>,
    path: Path<String>,
    Json(payload): Json<HistoryPresetPayload>,
) -> Result<Json<HistoryPreset>, ApiError> {
    Ok(Json(state.flow.update_preset(&path.0, payload).await?))
}

pub async fn api_preset_delete(state: State<AppState>, path: Path<String>) -> Result<StatusCode, ApiError> {
    state.flow.delete_preset(&path.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn preset_payload(form: &FormData) -> HistoryPresetPayload {
    HistoryPresetPayload {
        name: form.get("name").to_string(),
        billing_plan: form.get("billing_plan").to_string(),
        description: form.opt("description"),
        payable_account: form.opt("payable_account"),
        receivable_account: form.opt("receivable_account"),
        revenue_account: form.opt("revenue_account"),
        expense_account: form.opt("expense_account"),
        active: Some(form.checked("active")),
    }
}

async fn refreshed(state: &AppState, message: &str) -> Result<Html<String>, HtmxError> {
    let list = super::page::presets_list(state).await?;
    Ok(Html(with_toast(&list, message)))
}

pub async fn htmx_preset_store(state: State<AppState>, body: String) -> Result<Html<String>, HtmxError> {
    let form = FormData::parse(&body);
    let preset = state.flow.create_preset(preset_payload(&form)).await?;
    refreshed(&state, &format!("Histórico {} criado", preset.name)).await
}

pub async fn htmx_preset_delete(state: State<AppState>, path: Path<String>) -> Result<Html<String>, HtmxError> {
    state.flow.delete_preset(&path.0).await?;
    refreshed(&state, "Histórico removido").await
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_json_create_rejects_foreign_account() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let (status, error) = json(
            &state,
            "POST",
            "/api/history-presets",
            json!({ "name": "Outro", "billing_plan": plan.id, "revenue_account": "missing" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_json_list_by_plan() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let (_, list) = json(&state, "GET", &format!("/api/history-presets?billing_plan={}", plan.id), json!(null)).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        let (_, list) = json(&state, "GET", "/api/history-presets?billing_plan=other", json!(null)).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_htmx_store_and_delete() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let account = state.flow.billing_accounts(&plan.id).await.unwrap().remove(2);
        let form = format!(
            "name=Vendas&billing_plan={}&revenue_account={}&payable_account=&active=on",
            plan.id, account.id
        );
        let (status, html) = htmx(&state, "POST", "/history-presets", &form).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("VENDAS"));
        assert!(html.contains("1.1.1 - SERVIÇOS"));

        let created = state.flow.presets().await.unwrap().into_iter().find(|p| p.name == "VENDAS").unwrap();
        assert!(created.active);
        assert_eq!(created.payable_account, None);
        let (_, html) = htmx(&state, "DELETE", &format!("/history-presets/{}", created.id), "").await;
        assert!(html.contains("Histórico removido"));
        assert_eq!(state.flow.presets().await.unwrap().len(), 1);
    }
}
