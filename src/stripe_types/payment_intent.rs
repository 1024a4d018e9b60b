use crate::stripe_types::enums::*;
use crate::stripe_types::{Charge, Expandable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub object: String,
    pub amount: i64,
    pub amount_received: Option<i64>,
    pub currency: String,
    pub description: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
    pub status: PaymentIntentStatus,
    pub created: i64,
    pub receipt_email: Option<String>,
    pub latest_charge: Option<Expandable<Charge>>,
}

impl PaymentIntent {
    /// Patient name carried in the intent metadata, if the charge had one
    pub fn patient_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("patient_name"))
            .map(|s| s.as_str())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
}

impl PaymentIntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentIntentStatus::RequiresPaymentMethod => PAYMENT_INTENT_STATUS_REQUIRES_PAYMENT_METHOD,
            PaymentIntentStatus::RequiresConfirmation => PAYMENT_INTENT_STATUS_REQUIRES_CONFIRMATION,
            PaymentIntentStatus::RequiresAction => PAYMENT_INTENT_STATUS_REQUIRES_ACTION,
            PaymentIntentStatus::Processing => PAYMENT_INTENT_STATUS_PROCESSING,
            PaymentIntentStatus::RequiresCapture => PAYMENT_INTENT_STATUS_REQUIRES_CAPTURE,
            PaymentIntentStatus::Canceled => PAYMENT_INTENT_STATUS_CANCELED,
            PaymentIntentStatus::Succeeded => PAYMENT_INTENT_STATUS_SUCCEEDED,
        }
    }
}

impl fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
