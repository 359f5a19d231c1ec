// src/handlers/supplier.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::TypedHeader;
use axum_extra::headers::UserAgent;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{client_ip::ClientIp, i18n::Locale},
    models::assistance::SupplierAssistanceView,
    services::gateway::RequestMeta,
    services::transition::ActionData,
};

fn request_meta(ip: ClientIp, user_agent: Option<TypedHeader<UserAgent>>, locale: &Locale) -> RequestMeta {
    RequestMeta {
        client_ip: ip.0,
        user_agent: user_agent.map(|TypedHeader(ua)| ua.as_str().to_owned()),
        lang: locale.lang().to_string(),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SupplierRouteQuery {
    /// accept | schedule | validate | view | portal
    pub action: String,
    pub token: Option<String>,
}

// GET /api/public/supplier-route
//
// Caminho de leitura do portal: resolve o ticket pelo token e devolve o
// eco não sensível. Idempotente — nunca muda o estado.
#[utoipa::path(
    get,
    path = "/api/public/supplier-route",
    tag = "Portal do Fornecedor",
    params(SupplierRouteQuery),
    responses(
        (status = 200, description = "Dados da assistência", body = SupplierAssistanceView),
        (status = 400, description = "Token ou ação malformados"),
        (status = 404, description = "Token inválido ou assistência não encontrada"),
        (status = 429, description = "Limite de pedidos excedido")
    )
)]
pub async fn supplier_route(
    State(app_state): State<AppState>,
    locale: Locale,
    ip: ClientIp,
    user_agent: Option<TypedHeader<UserAgent>>,
    Query(query): Query<SupplierRouteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let meta = request_meta(ip, user_agent, &locale);

    let view = app_state
        .supplier_actions
        .fetch(&query.action, query.token.as_deref(), &meta)
        .await?;

    Ok((StatusCode::OK, Json(json!({ "success": true, "data": view }))))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSupplierActionPayload {
    /// accept | reject | schedule | reschedule | complete
    #[schema(example = "accept")]
    pub action: String,
    pub token: Option<String>,
    pub data: Option<ActionData>,
}

// POST /api/public/submit-supplier-action
//
// Caminho de escrita: o pipeline completo do gateway (rate limit →
// validação → autorização → transição → persistência atómica → auditoria).
#[utoipa::path(
    post,
    path = "/api/public/submit-supplier-action",
    tag = "Portal do Fornecedor",
    request_body = SubmitSupplierActionPayload,
    responses(
        (status = 200, description = "Ação aplicada"),
        (status = 400, description = "Entrada malformada ou transição inválida"),
        (status = 404, description = "Token inválido ou assistência não encontrada"),
        (status = 429, description = "Limite de pedidos excedido")
    )
)]
pub async fn submit_supplier_action(
    State(app_state): State<AppState>,
    locale: Locale,
    ip: ClientIp,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(payload): Json<SubmitSupplierActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let meta = request_meta(ip, user_agent, &locale);

    let outcome = app_state
        .supplier_actions
        .submit(&payload.action, payload.token.as_deref(), payload.data, &meta)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": outcome.message })),
    ))
}
