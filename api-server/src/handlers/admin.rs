//! Layout & reload handlers

use axum::{extract::State, Json};
use exoplanet_core::logic::features::LayoutInfo;
use serde::Serialize;

use crate::{AppResult, AppState};

/// Feature layout the served model expects
pub async fn layout() -> Json<LayoutInfo> {
    Json(LayoutInfo::current())
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub row_count: usize,
    pub model_path: String,
}

/// Rebuild the explainer from the configured artifacts and swap it in.
/// On failure the current explainer keeps serving.
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<ReloadResponse>> {
    let engine = state.config.engine.clone();
    let explainer = tokio::task::spawn_blocking(move || engine.build()).await??;

    let row_count = explainer.row_count();
    let model_path = explainer.classifier().metadata().model_path.clone();
    state.handle.replace(explainer);

    tracing::info!("Explainer reloaded from {} ({} rows)", model_path, row_count);

    Ok(Json(ReloadResponse {
        status: "success",
        row_count,
        model_path,
    }))
}
