//! # Simulation Module
//!
//! The rule-based cores behind the dashboard.
//!
//! ## Components
//!
//! - **Twin**: room telemetry evolving under the eco/air-renewal control policy,
//!   plus the rolling energy comparison history
//! - **Reveal**: count-up frames for the projected annual savings
//!
//! ## Usage
//!
//! ```rust
//! use hvac_digital_twin::config::SimulationConfig;
//! use hvac_digital_twin::simulation::TelemetrySimulator;
//!
//! let mut sim = TelemetrySimulator::new(&SimulationConfig::default());
//! let snapshot = sim.tick(chrono::Local::now());
//! assert_eq!(snapshot.energy_history.len(), 8);
//! ```

pub mod reveal;
pub mod twin;

pub use reveal::{play, RevealFrame, RevealSchedule};
pub use twin::{step_room, ControlPolicy, TelemetrySimulator, TwinSnapshot};
