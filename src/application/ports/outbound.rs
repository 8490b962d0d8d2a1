//! Outbound ports: services this application calls out to

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Payment gateway is not configured")]
    NotConfigured,

    #[error("Payment gateway request failed: {0}")]
    Transport(String),

    /// The gateway answered with a non-success code
    #[error("Payment gateway rejected request: {code} {message}")]
    Rejected { code: String, message: String },

    #[error("Invalid webhook signature")]
    InvalidSignature,
}

impl GatewayError {
    /// Worth retrying: network and 5xx problems, nothing the gateway refused.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLinkRequest {
    pub order_code: i64,
    pub amount: i64,
    pub description: String,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLink {
    pub checkout_url: String,
}

/// Payment state as the gateway reports it (`PENDING`, `PAID`, `CANCELLED`, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLinkInfo {
    pub order_code: i64,
    pub amount: i64,
    pub status: String,
}

/// Verified content of a webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookData {
    pub order_code: i64,
    pub amount: i64,
    /// Gateway result code, `"00"` is success
    pub code: String,
    pub description: String,
}

impl WebhookData {
    pub fn is_success(&self) -> bool {
        self.code == "00"
    }
}

/// Port for the payment gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_link(
        &self,
        request: PaymentLinkRequest,
    ) -> Result<PaymentLink, GatewayError>;

    async fn get_payment_link_information(
        &self,
        order_code: i64,
    ) -> Result<PaymentLinkInfo, GatewayError>;

    /// Check the signature of a raw webhook body and return its data.
    fn verify_webhook(&self, payload: &serde_json::Value) -> Result<WebhookData, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_are_transient() {
        assert!(GatewayError::Transport("timeout".into()).is_transient());
        assert!(!GatewayError::InvalidSignature.is_transient());
        assert!(!GatewayError::Rejected {
            code: "20".into(),
            message: "bad".into()
        }
        .is_transient());
    }
}
