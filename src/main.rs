use axum::{routing::get, Router};
use killer::config::Config;
use killer::room::{start_room_sweeper, SweeperConfig};
use killer::shared::AppState;
use killer::websockets::websocket_handler;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "killer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Killer dice game server");

    let config = Config::from_env();
    let bind_addr = config.bind_addr.clone();
    let app_state = Arc::new(AppState::new(config));

    // Background task that closes rooms nobody has touched in a while
    tokio::spawn(start_room_sweeper(
        Arc::clone(&app_state),
        SweeperConfig::default(),
    ));

    // build our application: one WebSocket endpoint carries everything
    let app = Router::new()
        .route("/", get(|| async { "Killer dice server" }))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await.unwrap();
}
