mod config;
mod state;
mod database;
mod models;
mod dto;
mod services;
mod repositories;
mod controllers;
mod routes;
mod middleware;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use database::DatabaseConnection;
use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::default();

    // Configurar logging
    let log_level = if config.is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("🚙 Vehicle Rental Operations - Ciclo de vida de viajes");
    info!("======================================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    let pool = db_connection.pool().clone();

    // CORS: permisivo en desarrollo, orígenes explícitos en producción
    let cors = if config.is_production() {
        cors_middleware_with_origins(config.cors_origins.clone())
    } else {
        cors_middleware()
    };

    // Crear router de la API
    let app_state = AppState::new(pool, config.clone());
    let app = Router::new()
        .route("/test", get(test_endpoint))
        .nest("/api/trip", routes::trip_routes::create_trip_router())
        .layer(cors)
        .with_state(app_state);

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /test - Endpoint de prueba");
    info!("🚗 Endpoints - Trip lifecycle:");
    info!("   POST   /api/trip - Crear viaje (Pending)");
    info!("   GET    /api/trip/:id - Obtener viaje");
    info!("   POST   /api/trip/:id/start - Iniciar viaje (Ongoing)");
    info!("   POST   /api/trip/:id/end - Terminar viaje (Ended)");
    info!("   POST   /api/trip/:id/meter - Corregir odómetro/fechas");
    info!("   POST   /api/trip/:id/payments - Registrar pago");
    info!("   DELETE /api/trip/payments/:payment_id - Eliminar pago");
    info!("   POST   /api/trip/:id/damage - Registrar daño");
    info!("   POST   /api/trip/:id/costs - Agregar costo adicional");
    info!("   DELETE /api/trip/costs/:cost_id - Eliminar costo adicional");
    info!("   POST   /api/trip/:id/complete - Completar viaje");
    info!("   POST   /api/trip/:id/cancel - Cancelar viaje");

    // Iniciar servidor
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Endpoint de prueba simple
async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": "¡API de operaciones de alquiler funcionando correctamente!",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
