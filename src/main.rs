mod app;
mod config;
mod db;
mod error;
mod meals;
mod products;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "comedor=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init()?;

    // Run migrations if present
    if let Err(e) = app_state.db.migrate().await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    let config = app_state.config.clone();
    let meals = app::build_meals_app(app_state.clone());
    let products = app::build_products_app(app_state);

    tokio::try_join!(
        app::serve("meals", &config.host, config.meals_port, meals),
        app::serve("productos", &config.host, config.products_port, products),
    )?;

    Ok(())
}
