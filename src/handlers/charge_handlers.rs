use crate::error::AppError;
use crate::services::charge_service::{ChargeRequest, ChargeService};
use actix_web::{get, post, web, HttpResponse};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitChargeRequest {
    /// Decimal dollar amount, e.g. "250.00"
    pub amount: String,
    pub patient_name: Option<String>,
    pub receipt_email: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitChargeResponse {
    pub payment_intent_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeStatusResponse {
    pub payment_intent_id: String,
    pub status: String,
    pub amount_minor: i64,
    pub amount_display: String,
    pub description: Option<String>,
    pub patient_name: Option<String>,
    pub refundable: bool,
    /// Local poll task state, when this process dispatched the charge
    pub tracked_state: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    pub refund_id: String,
    pub charge_id: String,
    pub already_refunded: bool,
}

/// Accept a charge and dispatch it to the terminal reader. Returns 202 with
/// the payment intent id; the outcome is observed via the status endpoint
/// while a background task polls Stripe.
#[post("")]
pub async fn submit_charge(
    charge_service: web::Data<ChargeService>,
    request: web::Json<SubmitChargeRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    info!("Submitting charge for amount {}", request.amount);

    let started = charge_service
        .start_charge(ChargeRequest {
            amount: request.amount,
            patient_name: request.patient_name,
            receipt_email: request.receipt_email,
            description: request.description,
        })
        .await?;

    Ok(HttpResponse::Accepted().json(SubmitChargeResponse {
        payment_intent_id: started.payment_intent_id,
        status: started.status.to_string(),
    }))
}

/// Current snapshot of a charge; safe to repeat
#[get("/{payment_intent_id}")]
pub async fn get_charge_status(
    charge_service: web::Data<ChargeService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payment_intent_id = path.into_inner();
    debug!("Status lookup for {}", payment_intent_id);

    let snapshot = charge_service.lookup(&payment_intent_id).await?;

    Ok(HttpResponse::Ok().json(ChargeStatusResponse {
        payment_intent_id: snapshot.payment_intent_id,
        status: snapshot.status.to_string(),
        amount_minor: snapshot.amount_minor,
        amount_display: snapshot.amount_display,
        description: snapshot.description,
        patient_name: snapshot.patient_name,
        refundable: snapshot.refundable,
        tracked_state: snapshot.tracked_state,
    }))
}

/// Refund a succeeded charge
#[post("/{payment_intent_id}/refund")]
pub async fn refund_charge(
    charge_service: web::Data<ChargeService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payment_intent_id = path.into_inner();
    info!("Refund requested for {}", payment_intent_id);

    let receipt = charge_service.refund(&payment_intent_id).await?;

    Ok(HttpResponse::Ok().json(RefundResponse {
        refund_id: receipt.refund_id,
        charge_id: receipt.charge_id,
        already_refunded: receipt.already_refunded,
    }))
}
