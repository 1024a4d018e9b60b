pub mod stripe_client;

pub use stripe_client::*;

use crate::error::AppResult;
use crate::stripe_types::{PaymentIntent, Reader, Refund, RefundList};
use async_trait::async_trait;

/// Parameters for creating a card-present payment authorization
#[derive(Debug, Clone, Default)]
pub struct CreatePaymentIntentParams {
    pub amount_minor: i64,
    pub description: String,
    pub receipt_email: Option<String>,
    pub patient_name: Option<String>,
}

/// Seam between the charge flow and the payment processor. The live
/// implementation is [`StripeClient`]; tests drive the flow with a scripted
/// double instead of a network.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_payment_intent(&self, params: CreatePaymentIntentParams) -> AppResult<PaymentIntent>;
    async fn retrieve_payment_intent(&self, payment_intent_id: &str) -> AppResult<PaymentIntent>;
    async fn process_payment_intent(&self, reader_id: &str, payment_intent_id: &str) -> AppResult<Reader>;
    async fn create_refund(&self, charge_id: &str) -> AppResult<Refund>;
    async fn list_refunds(&self, charge_id: &str) -> AppResult<RefundList>;
}
