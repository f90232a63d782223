use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::store::{Lead, LeadStore};
use crate::domain::{BillBreakdown, CostComparison, RoiModel};
use crate::simulation::{RevealFrame, RevealSchedule};

/// Email capture submitted before the savings results are shown.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeadRequest {
    #[validate(contains(pattern = "@", message = "please enter a valid email"))]
    pub email: String,
    #[validate(range(min = 0.0))]
    pub current_bill: f64,
    /// Defaults to the server-side projection when omitted
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub annual_savings: Option<f64>,
}

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("invalid lead: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOutcome {
    pub lead_id: Uuid,
    pub persisted: bool,
    pub notice: Notice,
    pub breakdown: BillBreakdown,
    pub comparison: CostComparison,
    pub reveal: Vec<RevealFrame>,
}

/// Best-effort lead capture: validation is strict, persistence is not.
#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn LeadStore>,
    model: RoiModel,
    reveal: RevealSchedule,
}

impl LeadService {
    pub fn new(store: Arc<dyn LeadStore>, model: RoiModel, reveal: RevealSchedule) -> Self {
        Self {
            store,
            model,
            reveal,
        }
    }

    /// False when leads can never be persisted, e.g. no database is configured.
    pub fn store_enabled(&self) -> bool {
        self.store.is_enabled()
    }

    /// Rejects malformed input before touching the store. A failed insert is
    /// logged and downgraded to a warning; results are returned either way.
    pub async fn capture(&self, req: LeadRequest) -> Result<CaptureOutcome, LeadError> {
        req.validate()?;

        let breakdown = self.model.project(req.current_bill);
        let lead = Lead {
            id: Uuid::new_v4(),
            email: req.email.trim().to_string(),
            current_bill: req.current_bill,
            savings_estimation: req.annual_savings.unwrap_or(breakdown.annual_savings),
        };

        let (persisted, notice) = match self.store.insert(&lead).await {
            Ok(()) => {
                info!(lead_id = %lead.id, current_bill = lead.current_bill, "lead saved");
                (
                    true,
                    Notice {
                        level: NoticeLevel::Success,
                        message: "Your personalised analysis is on its way. Check your results below."
                            .to_string(),
                    },
                )
            }
            Err(e) => {
                warn!(lead_id = %lead.id, error = %e, "lead not saved, showing results anyway");
                (
                    false,
                    Notice {
                        level: NoticeLevel::Warning,
                        message: "We could not save your details, but here are your results."
                            .to_string(),
                    },
                )
            }
        };

        Ok(CaptureOutcome {
            lead_id: lead.id,
            persisted,
            notice,
            breakdown,
            comparison: breakdown.comparison(req.current_bill),
            reveal: self.reveal.frames(breakdown.annual_savings),
        })
    }
}
