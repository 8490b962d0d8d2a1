//! Payment gateway adapters

pub mod payos;

use async_trait::async_trait;

use crate::application::ports::{
    GatewayError, PaymentGateway, PaymentLink, PaymentLinkInfo, PaymentLinkRequest, WebhookData,
};

pub use payos::{PayOsClient, PayOsConfig};

/// Stand-in used when no gateway credentials are configured. Bookings still
/// work; payment links are simply not issued.
pub struct UnconfiguredGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredGateway {
    async fn create_payment_link(
        &self,
        _: PaymentLinkRequest,
    ) -> Result<PaymentLink, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn get_payment_link_information(&self, _: i64) -> Result<PaymentLinkInfo, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    fn verify_webhook(&self, _: &serde_json::Value) -> Result<WebhookData, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}
