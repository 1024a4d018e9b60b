use crate::services::charge_service::ChargeOutcome;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct TrackedCharge {
    pub payment_intent_id: String,
    pub amount_minor: i64,
    pub description: String,
    pub patient_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub state: ChargeState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChargeState {
    /// The background poll task is still watching the intent
    Polling,
    Resolved(ChargeOutcome),
    /// The poll task aborted, e.g. a status read failed mid-loop. The intent
    /// keeps resolving on Stripe's side; status lookup remains the recovery path.
    Failed(String),
}

impl ChargeState {
    pub fn describe(&self) -> String {
        match self {
            ChargeState::Polling => "polling".to_string(),
            ChargeState::Resolved(outcome) => outcome.label().to_string(),
            ChargeState::Failed(message) => format!("poll_failed: {}", message),
        }
    }
}

/// In-memory record of charges this process has dispatched. Lost on restart;
/// Stripe stays the source of truth and lookup/refund keep working.
#[derive(Clone)]
pub struct ChargeTracker {
    charges: Arc<RwLock<HashMap<String, TrackedCharge>>>,
}

impl ChargeTracker {
    pub fn new() -> Self {
        Self {
            charges: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn track(
        &self,
        payment_intent_id: String,
        amount_minor: i64,
        description: String,
        patient_name: Option<String>,
    ) {
        let mut charges = self.charges.write().await;
        charges.insert(
            payment_intent_id.clone(),
            TrackedCharge {
                payment_intent_id,
                amount_minor,
                description,
                patient_name,
                created_at: Utc::now(),
                state: ChargeState::Polling,
            },
        );
    }

    pub async fn record_outcome(&self, payment_intent_id: &str, outcome: ChargeOutcome) {
        let mut charges = self.charges.write().await;
        if let Some(charge) = charges.get_mut(payment_intent_id) {
            charge.state = ChargeState::Resolved(outcome);
        }
    }

    pub async fn record_failure(&self, payment_intent_id: &str, message: String) {
        let mut charges = self.charges.write().await;
        if let Some(charge) = charges.get_mut(payment_intent_id) {
            charge.state = ChargeState::Failed(message);
        }
    }

    pub async fn get(&self, payment_intent_id: &str) -> Option<TrackedCharge> {
        let charges = self.charges.read().await;
        charges.get(payment_intent_id).cloned()
    }
}

impl Default for ChargeTracker {
    fn default() -> Self {
        Self::new()
    }
}
