use actix_web::{test, web, App};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use terminal_relay::clients::{CreatePaymentIntentParams, PaymentProcessor};
use terminal_relay::config::settings::ChargePollConfig;
use terminal_relay::error::{AppError, AppResult};
use terminal_relay::routes::configure_routes;
use terminal_relay::services::charge_service::ChargeService;
use terminal_relay::stripe_types::{
    Charge, Expandable, PaymentIntent, PaymentIntentStatus, Reader, Refund, RefundList,
};

/// Processor double for the HTTP surface: first retrieve sees `processing`,
/// every later one sees `succeeded`.
struct FakeProcessor {
    fetches: AtomicUsize,
}

impl FakeProcessor {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            fetches: AtomicUsize::new(0),
        })
    }

    fn intent(&self, status: PaymentIntentStatus) -> PaymentIntent {
        PaymentIntent {
            id: "pi_api".to_string(),
            object: "payment_intent".to_string(),
            amount: 25000,
            amount_received: None,
            currency: "usd".to_string(),
            description: Some("Office visit".to_string()),
            metadata: None,
            status,
            created: 1735689600,
            receipt_email: None,
            latest_charge: (status == PaymentIntentStatus::Succeeded)
                .then(|| Expandable::<Charge>::Id("ch_api".to_string())),
        }
    }
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn create_payment_intent(&self, params: CreatePaymentIntentParams) -> AppResult<PaymentIntent> {
        assert_eq!(params.amount_minor, 25000);
        Ok(self.intent(PaymentIntentStatus::RequiresPaymentMethod))
    }

    async fn retrieve_payment_intent(&self, payment_intent_id: &str) -> AppResult<PaymentIntent> {
        if payment_intent_id != "pi_api" {
            return Err(AppError::NotFound(format!(
                "No such payment_intent: '{}'",
                payment_intent_id
            )));
        }
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        let status = if n == 0 {
            PaymentIntentStatus::Processing
        } else {
            PaymentIntentStatus::Succeeded
        };
        Ok(self.intent(status))
    }

    async fn process_payment_intent(&self, reader_id: &str, payment_intent_id: &str) -> AppResult<Reader> {
        Ok(Reader {
            id: reader_id.to_string(),
            object: "terminal.reader".to_string(),
            device_type: None,
            label: None,
            status: Some("online".to_string()),
            action: None,
        })
    }

    async fn create_refund(&self, charge_id: &str) -> AppResult<Refund> {
        Ok(Refund {
            id: "re_api".to_string(),
            object: "refund".to_string(),
            charge: Some(charge_id.to_string()),
            amount: 25000,
            status: Some("succeeded".to_string()),
        })
    }

    async fn list_refunds(&self, _charge_id: &str) -> AppResult<RefundList> {
        Ok(RefundList {
            object: "list".to_string(),
            data: Vec::new(),
            has_more: false,
        })
    }
}

fn charge_service(processor: Arc<FakeProcessor>) -> ChargeService {
    ChargeService::new(
        processor,
        Some("tmr_api".to_string()),
        &ChargePollConfig {
            poll_interval_ms: 1,
            max_poll_attempts: 10,
        },
    )
}

#[actix_web::test]
async fn charge_flow_over_http() {
    let service = charge_service(FakeProcessor::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .service(web::scope("/api").configure(configure_routes)),
    )
    .await;

    // Submit: accepted immediately with the intent id
    let req = test::TestRequest::post()
        .uri("/api/charges")
        .set_json(json!({"amount": "250.00", "patientName": "Ada"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 202);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["paymentIntentId"], "pi_api");

    // Status lookup reflects Stripe's view
    let req = test::TestRequest::get().uri("/api/charges/pi_api").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["paymentIntentId"], "pi_api");
    assert_eq!(body["amountDisplay"], "$250.00");

    // Refund once the charge has succeeded
    let req = test::TestRequest::post()
        .uri("/api/charges/pi_api/refund")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["refundId"], "re_api");
    assert_eq!(body["alreadyRefunded"], false);
}

#[actix_web::test]
async fn invalid_amount_is_rejected_with_400() {
    let service = charge_service(FakeProcessor::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .service(web::scope("/api").configure(configure_routes)),
    )
    .await;

    for amount in ["0", "-10", "abc"] {
        let req = test::TestRequest::post()
            .uri("/api/charges")
            .set_json(json!({ "amount": amount }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "amount {:?}", amount);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error_type"], "validation_error");
    }
}

#[actix_web::test]
async fn unknown_charge_returns_404() {
    let service = charge_service(FakeProcessor::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .service(web::scope("/api").configure(configure_routes)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/charges/pi_unknown")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn refund_of_unsettled_charge_returns_409() {
    // First retrieve reports `processing`, so the refund precondition fails
    let service = charge_service(FakeProcessor::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .service(web::scope("/api").configure(configure_routes)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/charges/pi_api/refund")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_type"], "precondition_failed");
}
