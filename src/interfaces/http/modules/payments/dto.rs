//! Payment DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::PaymentTransaction;

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    pub user_id: i32,
    pub order_code: i64,
    /// VND
    pub amount: i64,
    /// BOOKING or MEMBERSHIP
    pub kind: String,
    pub status: String,
    pub checkout_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentTransaction> for TransactionResponse {
    fn from(t: PaymentTransaction) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            order_code: t.order_code,
            amount: t.amount,
            kind: t.kind.to_string(),
            status: t.status.to_string(),
            checkout_url: t.checkout_url,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentLinkResponse {
    pub transaction_id: i32,
    pub checkout_url: String,
}

/// Answer to the gateway. It only checks that the callback was accepted.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}
