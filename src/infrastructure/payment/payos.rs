//! PayOS payment gateway client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::application::ports::{
    GatewayError, PaymentGateway, PaymentLink, PaymentLinkInfo, PaymentLinkRequest, WebhookData,
};
use crate::infrastructure::crypto::signature;

#[derive(Debug, Clone)]
pub struct PayOsConfig {
    pub base_url: String,
    pub client_id: String,
    pub api_key: String,
    pub checksum_key: String,
    pub timeout: Duration,
}

impl PayOsConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.api_key.is_empty() && !self.checksum_key.is_empty()
    }
}

/// Envelope of every PayOS response
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: String,
    desc: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedLink {
    checkout_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkInfo {
    order_code: i64,
    amount: i64,
    status: String,
}

pub struct PayOsClient {
    client: Client,
    config: PayOsConfig,
}

impl PayOsClient {
    pub fn new(config: PayOsConfig) -> Result<Self, GatewayError> {
        if !config.is_configured() {
            return Err(GatewayError::NotConfigured);
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Signature over the five fields PayOS signs on link creation.
    fn link_signature(&self, req: &PaymentLinkRequest) -> String {
        let payload = format!(
            "amount={}&cancelUrl={}&description={}&orderCode={}&returnUrl={}",
            req.amount, req.cancel_url, req.description, req.order_code, req.return_url
        );
        signature::sign(&payload, &self.config.checksum_key)
    }

    async fn read<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if status.is_server_error() {
            return Err(GatewayError::Transport(format!("HTTP {}", status)));
        }
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        match envelope.data {
            Some(data) if envelope.code == "00" => Ok(data),
            _ => Err(GatewayError::Rejected {
                code: envelope.code,
                message: envelope.desc,
            }),
        }
    }
}

fn transport(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

#[async_trait]
impl PaymentGateway for PayOsClient {
    async fn create_payment_link(
        &self,
        request: PaymentLinkRequest,
    ) -> Result<PaymentLink, GatewayError> {
        debug!(order_code = request.order_code, amount = request.amount, "Creating payment link");

        let body = json!({
            "orderCode": request.order_code,
            "amount": request.amount,
            "description": request.description,
            "returnUrl": request.return_url,
            "cancelUrl": request.cancel_url,
            "signature": self.link_signature(&request),
        });

        let response = self
            .client
            .post(self.url("/v2/payment-requests"))
            .header("x-client-id", &self.config.client_id)
            .header("x-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let created: CreatedLink = Self::read(response).await?;
        Ok(PaymentLink {
            checkout_url: created.checkout_url,
        })
    }

    async fn get_payment_link_information(
        &self,
        order_code: i64,
    ) -> Result<PaymentLinkInfo, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/v2/payment-requests/{}", order_code)))
            .header("x-client-id", &self.config.client_id)
            .header("x-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(transport)?;

        let info: LinkInfo = Self::read(response).await?;
        Ok(PaymentLinkInfo {
            order_code: info.order_code,
            amount: info.amount,
            status: info.status,
        })
    }

    fn verify_webhook(&self, payload: &Value) -> Result<WebhookData, GatewayError> {
        verify_webhook_body(payload, &self.config.checksum_key)
    }
}

/// Check `signature` against `data` and extract the fields we use.
pub fn verify_webhook_body(
    payload: &Value,
    checksum_key: &str,
) -> Result<WebhookData, GatewayError> {
    let data = payload
        .get("data")
        .and_then(Value::as_object)
        .ok_or(GatewayError::InvalidSignature)?;
    let sig = payload
        .get("signature")
        .and_then(Value::as_str)
        .ok_or(GatewayError::InvalidSignature)?;

    if !signature::verify(&signature::canonical_query(data), sig, checksum_key) {
        warn!("Webhook signature mismatch");
        return Err(GatewayError::InvalidSignature);
    }

    let order_code = data
        .get("orderCode")
        .and_then(Value::as_i64)
        .ok_or(GatewayError::InvalidSignature)?;

    Ok(WebhookData {
        order_code,
        amount: data.get("amount").and_then(Value::as_i64).unwrap_or(0),
        code: data
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        description: data
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}
