//! # Question Handler
//!
//! The `/ask` endpoint: one question in, one `{sql_query, response}` out.

use super::{AppError, AppState};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Deserialize, Debug)]
pub struct AskRequest {
    pub question: String,
}

/// `sql_query` is always present in the body, as `null` off the data path.
#[derive(Serialize, Deserialize, Debug)]
pub struct AskResponse {
    pub sql_query: Option<String>,
    pub response: String,
}

pub async fn ask_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    info!("Received question: '{}'", payload.question);

    let outcome = app_state.executor.route(&payload.question).await?;

    Ok(Json(AskResponse {
        sql_query: outcome.sql_query,
        response: outcome.response,
    }))
}
