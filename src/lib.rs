pub mod api;
pub mod config;
pub mod controller;
pub mod domain;
pub mod leads;
pub mod simulation;
pub mod telemetry;
