use crate::clients::{CreatePaymentIntentParams, PaymentProcessor};
use crate::config::settings::ChargePollConfig;
use crate::error::{AppError, AppResult};
use crate::services::charge_tracker::ChargeTracker;
use crate::stripe_types::{PaymentIntent, PaymentIntentStatus};
use crate::utils::currency::{format_usd, parse_minor_units};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CHARGE_DESCRIPTION: &str = "Point of sale charge";

/// Operator-facing charge request
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Decimal dollar amount, e.g. "250.00"
    pub amount: String,
    pub patient_name: Option<String>,
    pub receipt_email: Option<String>,
    pub description: Option<String>,
}

/// Result of submitting a charge: the intent id plus the status Stripe
/// reported at creation. The outcome arrives later via the tracker.
#[derive(Debug, Clone)]
pub struct StartedCharge {
    pub payment_intent_id: String,
    pub status: PaymentIntentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChargeOutcome {
    Succeeded {
        payment_intent_id: String,
        amount_minor: i64,
        description: Option<String>,
        patient_name: Option<String>,
    },
    /// Authorized but not yet captured; no refund offered since funds have
    /// not been collected
    AuthorizedPendingCapture { payment_intent_id: String },
    Canceled { payment_intent_id: String },
    /// The poll budget ran out, or the intent entered a status the flow does
    /// not classify. Reports the last observed status without asserting
    /// success or failure.
    TimedOut {
        payment_intent_id: String,
        last_status: PaymentIntentStatus,
    },
}

impl ChargeOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ChargeOutcome::Succeeded { .. } => "succeeded",
            ChargeOutcome::AuthorizedPendingCapture { .. } => "authorized_pending_capture",
            ChargeOutcome::Canceled { .. } => "canceled",
            ChargeOutcome::TimedOut { .. } => "timed_out",
        }
    }
}

/// Snapshot served by the status lookup: live Stripe state merged with the
/// local poll record, if this process dispatched the charge.
#[derive(Debug, Clone)]
pub struct ChargeSnapshot {
    pub payment_intent_id: String,
    pub status: PaymentIntentStatus,
    pub amount_minor: i64,
    pub amount_display: String,
    pub description: Option<String>,
    pub patient_name: Option<String>,
    pub refundable: bool,
    pub tracked_state: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RefundReceipt {
    pub refund_id: String,
    pub charge_id: String,
    pub already_refunded: bool,
}

/// Orchestrates the card-present charge flow: create the payment intent,
/// dispatch it to the configured terminal reader, then poll the intent until
/// it settles or the poll budget runs out. All payment state lives on
/// Stripe's side; this service only observes it.
#[derive(Clone)]
pub struct ChargeService {
    processor: Arc<dyn PaymentProcessor>,
    tracker: ChargeTracker,
    terminal_reader_id: Option<String>,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl ChargeService {
    pub fn new(
        processor: Arc<dyn PaymentProcessor>,
        terminal_reader_id: Option<String>,
        poll_config: &ChargePollConfig,
    ) -> Self {
        Self {
            processor,
            tracker: ChargeTracker::new(),
            terminal_reader_id,
            poll_interval: Duration::from_millis(poll_config.poll_interval_ms),
            max_poll_attempts: poll_config.max_poll_attempts,
        }
    }

    pub fn tracker(&self) -> &ChargeTracker {
        &self.tracker
    }

    /// Validate the request, create the payment intent, and dispatch it to
    /// the terminal reader. The amount is checked before any remote call;
    /// create/dispatch failures abort the flow and are never retried.
    async fn create_and_dispatch(&self, request: &ChargeRequest) -> AppResult<PaymentIntent> {
        let amount_minor = parse_minor_units(&request.amount)?;

        let reader_id = self.terminal_reader_id.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "No terminal reader configured; set STRIPE_TERMINAL_READER".to_string(),
            )
        })?;

        let description = request
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHARGE_DESCRIPTION.to_string());

        let intent = self
            .processor
            .create_payment_intent(CreatePaymentIntentParams {
                amount_minor,
                description: description.clone(),
                receipt_email: request.receipt_email.clone(),
                patient_name: request.patient_name.clone(),
            })
            .await?;

        self.processor
            .process_payment_intent(reader_id, &intent.id)
            .await?;
        info!(
            "Charge {} for {} dispatched to reader {}",
            intent.id,
            format_usd(amount_minor),
            reader_id
        );

        self.tracker
            .track(
                intent.id.clone(),
                amount_minor,
                description,
                request.patient_name.clone(),
            )
            .await;

        Ok(intent)
    }

    /// Accept a charge without blocking the caller: dispatch it, then watch
    /// it from a background task. The caller polls the status lookup with
    /// the returned intent id.
    pub async fn start_charge(&self, request: ChargeRequest) -> AppResult<StartedCharge> {
        let intent = self.create_and_dispatch(&request).await?;
        let started = StartedCharge {
            payment_intent_id: intent.id.clone(),
            status: intent.status,
        };

        let service = self.clone();
        let payment_intent_id = intent.id;
        tokio::spawn(async move {
            match service.poll_until_settled(&payment_intent_id).await {
                Ok(outcome) => {
                    info!("Charge {} settled: {}", payment_intent_id, outcome.label());
                    service.tracker.record_outcome(&payment_intent_id, outcome).await;
                }
                Err(e) => {
                    error!("Polling charge {} failed: {}", payment_intent_id, e);
                    service
                        .tracker
                        .record_failure(&payment_intent_id, e.to_string())
                        .await;
                }
            }
        });

        Ok(started)
    }

    /// Dispatch a charge and block until it settles or the poll budget runs
    /// out. The decoupled [`start_charge`](Self::start_charge) path is built
    /// on the same loop.
    pub async fn submit_charge(&self, request: ChargeRequest) -> AppResult<ChargeOutcome> {
        let intent = self.create_and_dispatch(&request).await?;
        let outcome = self.poll_until_settled(&intent.id).await?;
        self.tracker.record_outcome(&intent.id, outcome.clone()).await;
        Ok(outcome)
    }

    /// Re-fetch the intent at a fixed interval until it reaches a state the
    /// flow classifies as settled. Strictly sequential, no backoff, no
    /// jitter; the only retry in the system is this status re-read.
    pub async fn poll_until_settled(&self, payment_intent_id: &str) -> AppResult<ChargeOutcome> {
        for attempt in 0..self.max_poll_attempts {
            let intent = self.processor.retrieve_payment_intent(payment_intent_id).await?;
            debug!(
                "Poll {}/{} for {}: {}",
                attempt + 1,
                self.max_poll_attempts,
                payment_intent_id,
                intent.status
            );

            match intent.status {
                PaymentIntentStatus::Succeeded => {
                    return Ok(ChargeOutcome::Succeeded {
                        payment_intent_id: intent.id.clone(),
                        amount_minor: intent.amount,
                        description: intent.description.clone(),
                        patient_name: intent.patient_name().map(|s| s.to_string()),
                    });
                }
                PaymentIntentStatus::RequiresCapture => {
                    return Ok(ChargeOutcome::AuthorizedPendingCapture {
                        payment_intent_id: intent.id,
                    });
                }
                PaymentIntentStatus::Canceled => {
                    return Ok(ChargeOutcome::Canceled {
                        payment_intent_id: intent.id,
                    });
                }
                PaymentIntentStatus::RequiresPaymentMethod
                | PaymentIntentStatus::RequiresAction
                | PaymentIntentStatus::Processing => {
                    tokio::time::sleep(self.poll_interval).await;
                }
                other => {
                    warn!(
                        "Charge {} entered unclassified status {}; stopping poll",
                        payment_intent_id, other
                    );
                    break;
                }
            }
        }

        // Budget exhausted or unclassifiable status: one final fetch, report
        // the current status without asserting success or failure.
        let intent = self.processor.retrieve_payment_intent(payment_intent_id).await?;
        Ok(ChargeOutcome::TimedOut {
            payment_intent_id: intent.id,
            last_status: intent.status,
        })
    }

    /// Fetch the current state of a charge. Idempotent, no side effects.
    pub async fn lookup(&self, payment_intent_id: &str) -> AppResult<ChargeSnapshot> {
        let intent = self.processor.retrieve_payment_intent(payment_intent_id).await?;
        let tracked = self.tracker.get(payment_intent_id).await;

        Ok(ChargeSnapshot {
            payment_intent_id: intent.id.clone(),
            status: intent.status,
            amount_minor: intent.amount,
            amount_display: format_usd(intent.amount),
            description: intent.description.clone(),
            patient_name: intent.patient_name().map(|s| s.to_string()),
            refundable: intent.status == PaymentIntentStatus::Succeeded,
            tracked_state: tracked.map(|t| t.state.describe()),
        })
    }

    /// Refund a succeeded charge. An existing refund on the underlying
    /// charge is reported instead of issuing a duplicate.
    pub async fn refund(&self, payment_intent_id: &str) -> AppResult<RefundReceipt> {
        let intent = self.processor.retrieve_payment_intent(payment_intent_id).await?;

        if intent.status != PaymentIntentStatus::Succeeded {
            return Err(AppError::Precondition(format!(
                "Charge {} has status {}; only succeeded charges can be refunded",
                payment_intent_id, intent.status
            )));
        }

        let charge_id = intent
            .latest_charge
            .as_ref()
            .map(|charge| charge.id().to_string())
            .ok_or_else(|| {
                AppError::Precondition(format!(
                    "Charge {} has no captured charge to refund",
                    payment_intent_id
                ))
            })?;

        let existing = self.processor.list_refunds(&charge_id).await?;
        if let Some(refund) = existing.data.first() {
            warn!(
                "Charge {} already refunded by {}; not issuing another",
                charge_id, refund.id
            );
            return Ok(RefundReceipt {
                refund_id: refund.id.clone(),
                charge_id,
                already_refunded: true,
            });
        }

        let refund = self.processor.create_refund(&charge_id).await?;
        info!("Refunded charge {} with {}", charge_id, refund.id);
        Ok(RefundReceipt {
            refund_id: refund.id,
            charge_id,
            already_refunded: false,
        })
    }
}
