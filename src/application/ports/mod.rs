//! Application ports (hexagonal architecture boundaries)

pub mod outbound;

pub use outbound::{
    GatewayError, PaymentGateway, PaymentLink, PaymentLinkInfo, PaymentLinkRequest, WebhookData,
};
