//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas do portal: o fornecedor chega por link de e-mail ou QR
    // code, de qualquer origem, sem sessão — o token é a credencial.
    let public_routes = Router::new()
        .route("/supplier-route", get(handlers::supplier::supplier_route))
        .route(
            "/submit-supplier-action",
            post(handlers::supplier::submit_supplier_action),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let job_routes = Router::new().route(
        "/process-reminders",
        post(handlers::jobs::process_reminders),
    );

    let assistance_routes = Router::new()
        .route(
            "/",
            post(handlers::assistances::create_assistance)
                .get(handlers::assistances::list_assistances),
        )
        .route("/{id}", get(handlers::assistances::get_assistance))
        .route("/{id}/status", patch(handlers::assistances::change_status))
        .route(
            "/{id}/resend",
            post(handlers::assistances::resend_acceptance_request),
        )
        .route(
            "/{id}/service-order.pdf",
            get(handlers::assistances::service_order_pdf),
        )
        .route(
            "/{id}/communications",
            post(handlers::communications::create_communication)
                .get(handlers::communications::list_communications),
        )
        .route(
            "/{id}/photos",
            post(handlers::communications::upload_photo)
                .get(handlers::communications::list_photos),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let building_routes = Router::new()
        .route(
            "/",
            post(handlers::buildings::create_building).get(handlers::buildings::list_buildings),
        )
        .route(
            "/{id}",
            patch(handlers::buildings::update_building)
                .delete(handlers::buildings::deactivate_building),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let supplier_routes = Router::new()
        .route(
            "/",
            post(handlers::suppliers::create_supplier).get(handlers::suppliers::list_suppliers),
        )
        .route(
            "/{id}",
            patch(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::deactivate_supplier),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let audit_routes = Router::new()
        .route("/", get(handlers::audit::list_audit_events))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/public", public_routes)
        .nest("/api/jobs", job_routes)
        .nest("/api/assistances", assistance_routes)
        .nest("/api/buildings", building_routes)
        .nest("/api/suppliers", supplier_routes)
        .nest("/api/audit-events", audit_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor. O connect info alimenta o extrator de IP usado
    // pelo rate limiting e pela auditoria.
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Erro no servidor Axum");
}
