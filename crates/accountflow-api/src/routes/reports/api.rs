//! DRE JSON endpoint and query parameter parsing

use crate::{ApiError, AppState};
use accountflow_core::{DetailFilter, DreGrouping, DreQuery, DreReport};
use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use std::collections::HashMap;

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn date_param(params: &HashMap<String, String>, key: &str) -> Result<NaiveDate, ApiError> {
    let value = param(params, key).ok_or_else(|| ApiError::bad_request(format!("{} is required", key)))?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("Invalid {} date: {}", key, value)))
}

/// Read `company`, `start`, `end` (`YYYY-MM-DD`) and the optional `group`
pub fn dre_query(params: &HashMap<String, String>) -> Result<DreQuery, ApiError> {
    let group = match param(params, "group") {
        Some(group) => Some(group.parse::<DreGrouping>().map_err(ApiError::bad_request)?),
        None => None,
    };
    Ok(DreQuery {
        company: param(params, "company").unwrap_or_default().to_string(),
        start: date_param(params, "start")?,
        end: date_param(params, "end")?,
        group,
    })
}

/// Detail filters of the results fragment; blank means "all"
pub fn detail_filter(params: &HashMap<String, String>) -> Result<DetailFilter, ApiError> {
    let kind = match param(params, "detail_kind") {
        Some(kind) => Some(kind.parse().map_err(ApiError::bad_request)?),
        None => None,
    };
    let method = match param(params, "detail_method") {
        Some(method) => Some(method.parse().map_err(ApiError::bad_request)?),
        None => None,
    };
    Ok(DetailFilter {
        kind,
        method,
        top_level: param(params, "detail_top").map(str::to_string),
    })
}

pub async fn api_dre(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<DreReport>, ApiError> {
    let query = dre_query(&params)?;
    Ok(Json(state.flow.dre_report(&query).await?))
}
