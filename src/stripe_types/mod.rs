//! Custom Stripe types module

pub mod charge;
pub mod enums;
pub mod expandable;
pub mod payment_intent;
pub mod reader;
pub mod refund;

// Re-export all types for convenience
pub use charge::Charge;
pub use enums::*;
pub use expandable::Expandable;
pub use payment_intent::{PaymentIntent, PaymentIntentStatus};
pub use reader::{Reader, ReaderAction};
pub use refund::{Refund, RefundList};

use serde::{Deserialize, Serialize};

/// Error envelope returned by the Stripe API on non-2xx responses
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}
