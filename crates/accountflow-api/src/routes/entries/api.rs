//! Entry API endpoints - JSON API and HTMX mutations

use super::page::entries_section;
use crate::form::FormData;
use crate::{with_toast, ApiError, AppState, HtmxError};
use accountflow_core::EntryPayload;
use accountflow_store::Entry;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;

/// Entries of a title, newest payment first (JSON API)
pub async fn api_title_entries(state: State<AppState>, path: Path<String>) -> Result<Json<Vec<Entry>>, ApiError> {
    Ok(Json(state.flow.entries_by_title(&path.0).await?))
}

pub async fn api_entry(state: State<AppState>, path: Path<String>) -> Result<Json<Entry>, ApiError> {
    Ok(Json(state.flow.entry(&path.0).await?))
}

pub async fn api_entry_create(
    state: State<AppState>,
    Json(payload): Json<EntryPayload>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    let entry = state.flow.create_entry(payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn api_entry_update(
    state: State<AppState>,
    path: Path<String>,
    Json(payload): Json<EntryPayload>,
) -> Result<Json<Entry>, ApiError> {
    Ok(Json(state.flow.update_entry(&path.0, payload).await?))
}

pub async fn api_entry_delete(state: State<AppState>, path: Path<String>) -> Result<StatusCode, ApiError> {
    state.flow.delete_entry(&path.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn entry_payload(form: &FormData, title_id: &str) -> Result<EntryPayload, ApiError> {
    Ok(EntryPayload {
        title: title_id.to_string(),
        amount: form.parse_required("amount", "amount")?,
        kind: form.parse_opt("kind", "type")?,
        description: form.opt("description"),
        paid_at: form.parse_opt("paid_at", "payment date")?,
        payment_method: form.parse_opt("payment_method", "payment method")?,
        billing_account: form.opt("billing_account"),
    })
}

/// HTMX: record an entry from the title page
pub async fn htmx_entry_store(
    state: State<AppState>,
    path: Path<String>,
    body: String,
) -> Result<Html<String>, HtmxError> {
    let form = FormData::parse(&body);
    let entry = state.flow.create_entry(entry_payload(&form, &path.0)?).await?;
    let title = state.flow.title(&entry.title).await?;
    let section = entries_section(&state, &title).await?;
    Ok(Html(with_toast(
        &section,
        &format!("Lançamento de {} registrado", state.money(entry.amount)),
    )))
}

pub async fn htmx_entry_delete(state: State<AppState>, path: Path<String>) -> Result<Html<String>, HtmxError> {
    let entry = state.flow.entry(&path.0).await?;
    state.flow.delete_entry(&entry.id).await?;
    let title = state.flow.title(&entry.title).await?;
    let section = entries_section(&state, &title).await?;
    Ok(Html(with_toast(&section, "Lançamento removido")))
}
