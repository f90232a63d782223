//! Lead capture for the savings calculator.
//!
//! The email is checked locally; the insert into the hosted table is
//! best-effort and never blocks the results.

pub mod service;
pub mod store;

use std::sync::Arc;
use tracing::warn;

use crate::config::LeadsConfig;

pub use service::{CaptureOutcome, LeadError, LeadRequest, LeadService, Notice, NoticeLevel};
pub use store::{DisabledLeadStore, Lead, LeadStore, LeadStoreError, RestLeadStore};

/// REST store when credentials are present and usable, otherwise the
/// disabled store.
pub fn store_from_config(cfg: &LeadsConfig) -> Arc<dyn LeadStore> {
    match RestLeadStore::new(cfg) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "lead persistence disabled");
            Arc::new(DisabledLeadStore)
        }
    }
}
