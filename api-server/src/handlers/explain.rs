//! Explanation handler

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    /// Zero-based dataset row; kept raw so a bad value maps to our own 400 body
    pub index: Option<String>,
}

impl ExplainQuery {
    pub fn index(&self) -> AppResult<i64> {
        match self.index.as_deref().map(str::trim) {
            None | Some("") => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::ValidationError(format!("index must be an integer, got '{}'", raw))),
        }
    }
}

/// Explain one dataset sample as pretty-printed JSON
pub async fn explain_sample(
    State(state): State<AppState>,
    Query(query): Query<ExplainQuery>,
) -> AppResult<impl IntoResponse> {
    let index = query.index()?;
    let explainer = state.handle.current();

    let json = tokio::task::spawn_blocking(move || explainer.explain_sample_json(index)).await??;

    tracing::debug!("Explained sample {}", index);
    Ok(([(header::CONTENT_TYPE, "application/json")], json))
}
