// Stripe API client for the card-present charge flow.
// Write calls are form-encoded, reads are JSON, per the Stripe API convention.
use crate::clients::{CreatePaymentIntentParams, PaymentProcessor};
use crate::error::{AppError, AppResult};
use crate::stripe_types::{
    ApiErrorResponse, PaymentIntent, Reader, Refund, RefundList, CAPTURE_METHOD_AUTOMATIC,
    CURRENCY_USD, ERROR_CODE_RESOURCE_MISSING, PAYMENT_METHOD_TYPE_CARD_PRESENT,
};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

// Base URL for the Stripe API
const STRIPE_BASE_URL: &str = "https://api.stripe.com/v1";

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: Client::new(),
            secret_key,
            base_url: STRIPE_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host. Used by tests to target a mock
    /// server instead of api.stripe.com.
    pub fn with_base_url(secret_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            secret_key,
            base_url,
        }
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;
        Self::parse_response(path, response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .query(query)
            .send()
            .await?;
        Self::parse_response(path, response).await
    }

    async fn parse_response<T: DeserializeOwned>(path: &str, response: Response) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            let parsed = response.json::<T>().await.map_err(|e| {
                AppError::External(format!("Failed to parse Stripe response from {}: {}", path, e))
            })?;
            return Ok(parsed);
        }

        let body = response.text().await.unwrap_or_default();
        let api_error = serde_json::from_str::<ApiErrorResponse>(&body).ok();
        let (code, message) = match &api_error {
            Some(e) => (
                e.error.code.as_deref().unwrap_or(""),
                e.error.message.clone().unwrap_or_else(|| body.clone()),
            ),
            None => ("", body.clone()),
        };

        warn!("Stripe API {} returned {}: {}", path, status, message);

        if status == StatusCode::NOT_FOUND || code == ERROR_CODE_RESOURCE_MISSING {
            return Err(AppError::NotFound(format!("Stripe resource at {}: {}", path, message)));
        }
        Err(AppError::External(format!("Stripe API error ({}): {}", status, message)))
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_payment_intent(
        &self,
        params: CreatePaymentIntentParams,
    ) -> AppResult<PaymentIntent> {
        let mut form = vec![
            ("amount".to_string(), params.amount_minor.to_string()),
            ("currency".to_string(), CURRENCY_USD.to_string()),
            (
                "payment_method_types[]".to_string(),
                PAYMENT_METHOD_TYPE_CARD_PRESENT.to_string(),
            ),
            ("capture_method".to_string(), CAPTURE_METHOD_AUTOMATIC.to_string()),
            ("description".to_string(), params.description),
        ];
        if let Some(email) = params.receipt_email {
            form.push(("receipt_email".to_string(), email));
        }
        if let Some(name) = params.patient_name {
            form.push(("metadata[patient_name]".to_string(), name));
        }

        let intent: PaymentIntent = self.post_form("/payment_intents", &form).await?;
        info!("Created PaymentIntent: {} for {} minor units", intent.id, intent.amount);
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, payment_intent_id: &str) -> AppResult<PaymentIntent> {
        let path = format!("/payment_intents/{}", payment_intent_id);
        let intent: PaymentIntent = self.get(&path, &[("expand[]", "latest_charge")]).await?;
        debug!("Retrieved PaymentIntent {} with status {}", intent.id, intent.status);
        Ok(intent)
    }

    async fn process_payment_intent(
        &self,
        reader_id: &str,
        payment_intent_id: &str,
    ) -> AppResult<Reader> {
        let path = format!("/terminal/readers/{}/process_payment_intent", reader_id);
        let form = vec![("payment_intent".to_string(), payment_intent_id.to_string())];
        let reader: Reader = self.post_form(&path, &form).await?;
        info!("Dispatched PaymentIntent {} to reader {}", payment_intent_id, reader.id);
        Ok(reader)
    }

    async fn create_refund(&self, charge_id: &str) -> AppResult<Refund> {
        let form = vec![("charge".to_string(), charge_id.to_string())];
        let refund: Refund = self.post_form("/refunds", &form).await?;
        info!("Created refund {} for charge {}", refund.id, charge_id);
        Ok(refund)
    }

    async fn list_refunds(&self, charge_id: &str) -> AppResult<RefundList> {
        self.get("/refunds", &[("charge", charge_id)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use crate::stripe_types::PaymentIntentStatus;

    fn client_for(server: &Server) -> StripeClient {
        StripeClient::with_base_url("sk_test_123".to_string(), server.url())
    }

    fn intent_json(id: &str, status: &str, amount: i64) -> String {
        format!(
            r#"{{
                "id": "{id}",
                "object": "payment_intent",
                "amount": {amount},
                "amount_received": null,
                "currency": "usd",
                "description": "Point of sale charge",
                "metadata": {{"patient_name": "Ada"}},
                "status": "{status}",
                "created": 1735689600,
                "receipt_email": null,
                "latest_charge": null
            }}"#
        )
    }

    #[tokio::test]
    async fn create_sends_card_present_form_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/payment_intents")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("amount".into(), "25000".into()),
                Matcher::UrlEncoded("currency".into(), "usd".into()),
                Matcher::UrlEncoded("payment_method_types[]".into(), "card_present".into()),
                Matcher::UrlEncoded("capture_method".into(), "automatic".into()),
                Matcher::UrlEncoded("metadata[patient_name]".into(), "Ada".into()),
            ]))
            .with_status(200)
            .with_body(intent_json("pi_123", "requires_payment_method", 25000))
            .create_async()
            .await;

        let params = CreatePaymentIntentParams {
            amount_minor: 25000,
            description: "Point of sale charge".to_string(),
            receipt_email: None,
            patient_name: Some("Ada".to_string()),
        };
        let intent = client_for(&server).create_payment_intent(params).await.unwrap();

        mock.assert_async().await;
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.status, PaymentIntentStatus::RequiresPaymentMethod);
        assert_eq!(intent.amount, 25000);
    }

    #[tokio::test]
    async fn retrieve_expands_latest_charge() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/payment_intents/pi_123")
            .match_query(Matcher::UrlEncoded("expand[]".into(), "latest_charge".into()))
            .with_status(200)
            .with_body(intent_json("pi_123", "succeeded", 25000))
            .create_async()
            .await;

        let intent = client_for(&server).retrieve_payment_intent("pi_123").await.unwrap();

        mock.assert_async().await;
        assert_eq!(intent.status, PaymentIntentStatus::Succeeded);
        assert_eq!(intent.patient_name(), Some("Ada"));
    }

    #[tokio::test]
    async fn resource_missing_maps_to_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/payment_intents/pi_missing")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(
                r#"{"error": {"type": "invalid_request_error", "code": "resource_missing", "message": "No such payment_intent: 'pi_missing'"}}"#,
            )
            .create_async()
            .await;

        let err = client_for(&server)
            .retrieve_payment_intent("pi_missing")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn server_errors_map_to_external() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/refunds")
            .with_status(500)
            .with_body(r#"{"error": {"type": "api_error", "message": "Something went wrong"}}"#)
            .create_async()
            .await;

        let err = client_for(&server).create_refund("ch_123").await.unwrap_err();

        assert!(matches!(err, AppError::External(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn dispatch_posts_to_reader_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/terminal/readers/tmr_1/process_payment_intent")
            .match_body(Matcher::UrlEncoded("payment_intent".into(), "pi_123".into()))
            .with_status(200)
            .with_body(
                r#"{"id": "tmr_1", "object": "terminal.reader", "device_type": "bbpos_wisepos_e", "label": "Front desk", "status": "online", "action": {"type": "process_payment_intent", "status": "in_progress"}}"#,
            )
            .create_async()
            .await;

        let reader = client_for(&server)
            .process_payment_intent("tmr_1", "pi_123")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reader.id, "tmr_1");
    }

    #[tokio::test]
    async fn list_refunds_filters_by_charge() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/refunds")
            .match_query(Matcher::UrlEncoded("charge".into(), "ch_123".into()))
            .with_status(200)
            .with_body(
                r#"{"object": "list", "data": [{"id": "re_1", "object": "refund", "charge": "ch_123", "amount": 25000, "status": "succeeded"}], "has_more": false}"#,
            )
            .create_async()
            .await;

        let refunds = client_for(&server).list_refunds("ch_123").await.unwrap();

        assert_eq!(refunds.data.len(), 1);
        assert_eq!(refunds.data[0].id, "re_1");
    }
}
