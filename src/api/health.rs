use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::controller::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
    checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    simulator: ComponentHealth,
    lead_store: ComponentHealth,
}

/// Health status of a component
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_tick_age_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ComponentHealth {
    fn healthy(last_tick_age_ms: Option<u64>) -> Self {
        Self {
            status: "healthy".to_string(),
            last_tick_age_ms,
            error: None,
        }
    }

    fn degraded(error: String) -> Self {
        Self {
            status: "degraded".to_string(),
            last_tick_age_ms: None,
            error: Some(error),
        }
    }

    fn unhealthy(last_tick_age_ms: Option<u64>, error: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            last_tick_age_ms,
            error: Some(error),
        }
    }

    fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Healthy while the last published tick is younger than three periods.
fn check_simulator(
    tick: u64,
    generated_at: DateTime<Utc>,
    period: Duration,
    now: DateTime<Utc>,
) -> ComponentHealth {
    let age_ms = (now - generated_at).num_milliseconds().max(0) as u64;
    if tick == 0 {
        return ComponentHealth::healthy(None);
    }
    let limit_ms = period.as_millis() as u64 * 3;
    if age_ms > limit_ms {
        ComponentHealth::unhealthy(
            Some(age_ms),
            format!("no tick for {age_ms} ms (limit {limit_ms} ms)"),
        )
    } else {
        ComponentHealth::healthy(Some(age_ms))
    }
}

fn check_lead_store(enabled: bool) -> ComponentHealth {
    if enabled {
        ComponentHealth::healthy(None)
    } else {
        ComponentHealth::degraded("lead persistence disabled".to_string())
    }
}

/// GET /health - Health check endpoint
///
/// A disabled lead store only degrades the service; results are still served
/// without it.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.twin.latest();
    let simulator = check_simulator(
        snapshot.tick,
        snapshot.generated_at,
        state.cfg.simulation.tick_period(),
        Utc::now(),
    );
    let lead_store = check_lead_store(state.leads.store_enabled());

    let healthy = !simulator.is_unhealthy();
    let status = if !healthy {
        "unhealthy"
    } else if lead_store.status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
        checks: HealthChecks {
            simulator,
            lead_store,
        },
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    tracing::debug!(status, "health check completed");

    (status_code, Json(response))
}

/// GET /health/ready - Readiness probe
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.twin.latest().rooms.is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// GET /health/live - Liveness probe
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_simulator_is_healthy() {
        let now = Utc::now();
        let h = check_simulator(
            0,
            now - chrono::Duration::hours(1),
            Duration::from_secs(3),
            now,
        );
        assert_eq!(h.status, "healthy");
    }

    #[test]
    fn test_recent_tick_is_healthy() {
        let now = Utc::now();
        let h = check_simulator(
            4,
            now - chrono::Duration::seconds(2),
            Duration::from_secs(3),
            now,
        );
        assert_eq!(h.status, "healthy");
        assert_eq!(h.last_tick_age_ms, Some(2000));
    }

    #[test]
    fn test_stalled_simulator_is_unhealthy() {
        let now = Utc::now();
        let h = check_simulator(
            4,
            now - chrono::Duration::seconds(30),
            Duration::from_secs(3),
            now,
        );
        assert!(h.is_unhealthy());
        assert!(h.error.unwrap().contains("no tick"));
    }

    #[test]
    fn test_disabled_lead_store_degrades() {
        let h = check_lead_store(false);
        assert_eq!(h.status, "degraded");
        assert!(!h.is_unhealthy());
        assert_eq!(check_lead_store(true).status, "healthy");
    }
}
