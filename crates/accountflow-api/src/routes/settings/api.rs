//! Settings API endpoints - JSON API

use crate::AppState;
use accountflow_config::Config;
use axum::Json;

pub async fn api_settings(state: axum::extract::State<AppState>) -> Json<Config> {
    Json(state.config.clone())
}
