use anyhow::Result;
use chrono::Local;
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::RoiModel;
use crate::leads::{self, LeadService};
use crate::simulation::{RevealSchedule, TelemetrySimulator, TwinSnapshot};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub twin: Arc<TwinController>,
    pub leads: LeadService,
    pub roi: RoiModel,
    pub reveal: RevealSchedule,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self> {
        let store = leads::store_from_config(&cfg.leads);
        Ok(Self::with_store(cfg, store))
    }

    /// Same as [`AppState::new`] with an explicit lead store.
    pub fn with_store(cfg: Config, store: Arc<dyn leads::LeadStore>) -> Self {
        let twin = Arc::new(TwinController::new(TelemetrySimulator::new(&cfg.simulation)));
        let roi = cfg.roi.model();
        let reveal = cfg.roi.reveal();
        Self {
            leads: LeadService::new(store, roi, reveal),
            twin,
            roi,
            reveal,
            cfg,
        }
    }
}

/// Spawns the periodic tick. The returned handle finishes once `cancel` fires.
pub fn spawn_controller_tasks(state: &AppState, cancel: CancellationToken) -> JoinHandle<()> {
    let twin = state.twin.clone();
    let period = state.cfg.simulation.tick_period();
    tokio::spawn(async move {
        twin.run(period, cancel).await;
    })
}

/// Owns the simulator and publishes one immutable snapshot per tick.
pub struct TwinController {
    simulator: Mutex<TelemetrySimulator>,
    snapshots: watch::Sender<Arc<TwinSnapshot>>,
}

impl TwinController {
    pub fn new(simulator: TelemetrySimulator) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(simulator.snapshot()));
        Self {
            simulator: Mutex::new(simulator),
            snapshots,
        }
    }

    pub async fn run(&self, period: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
        // skip the immediate first tick so the seeded state is shown for a full period
        interval.tick().await;
        info!(period_ms = period.as_millis() as u64, "twin loop started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let snapshot = self.step();
                    debug!(
                        tick = snapshot.tick,
                        total_power_w = snapshot.total_power_w,
                        "twin tick"
                    );
                }
            }
        }
        info!("twin loop stopped");
    }

    /// Runs one tick and publishes the result.
    pub fn step(&self) -> Arc<TwinSnapshot> {
        let snapshot = Arc::new(self.simulator.lock().tick(Local::now()));
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    /// Runs `steps` ticks back to back, publishing only the last snapshot.
    pub fn advance(&self, steps: u32) -> Arc<TwinSnapshot> {
        let snapshot = {
            let mut sim = self.simulator.lock();
            for _ in 1..steps {
                sim.tick(Local::now());
            }
            Arc::new(sim.tick(Local::now()))
        };
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    pub fn latest(&self) -> Arc<TwinSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<TwinSnapshot>> {
        self.snapshots.subscribe()
    }
}
