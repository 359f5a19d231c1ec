// src/handlers/jobs.rs

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

use crate::{common::error::AppError, config::AppState, services::reminder::ReminderSummary};

// POST /api/jobs/process-reminders
//
// Disparado por um cron externo. Com CRON_SECRET configurado, o header
// x-cron-key tem de bater; sem a variável o endpoint fica aberto.
#[utoipa::path(
    post,
    path = "/api/jobs/process-reminders",
    tag = "Jobs",
    responses(
        (status = 200, description = "Resumo do lote de lembretes", body = ReminderSummary),
        (status = 401, description = "Chave de cron inválida")
    )
)]
pub async fn process_reminders(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(expected) = &app_state.cron_secret {
        let provided = headers.get("x-cron-key").and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            return Err(AppError::InvalidAuthToken);
        }
    }

    let results = app_state.reminders.process().await;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Lembretes processados",
            "results": results,
        })),
    ))
}
