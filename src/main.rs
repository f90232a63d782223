use anyhow::Result;
use hvac_digital_twin::{api, config, controller, telemetry};
use config::Config;
use telemetry::init_tracing;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;

    if !cfg.leads.is_configured() {
        warn!("HVAC__LEADS__BASE_URL / HVAC__LEADS__API_KEY not set - leads will not be saved");
    }

    let app_state = controller::AppState::new(cfg.clone())?;
    let app = api::router(app_state.clone());

    let addr = cfg.server.socket_addr()?;
    info!(
        %addr,
        rooms = cfg.simulation.rooms.len(),
        tick_ms = cfg.simulation.tick_millis,
        "starting HVAC digital twin"
    );

    let cancel = CancellationToken::new();
    let ticker = controller::spawn_controller_tasks(&app_state, cancel.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    cancel.cancel();
    if let Err(e) = ticker.await {
        warn!(error = %e, "twin loop task failed");
    }

    warn!("shutdown complete");
    Ok(())
}
