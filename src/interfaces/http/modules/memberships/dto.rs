//! Membership DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::membership::MembershipPurchase;
use crate::domain::{MembershipPlan, UserMembership};
use crate::interfaces::http::modules::payments::TransactionResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct PlanResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub duration_days: i32,
    pub swap_limit: i32,
    pub is_active: bool,
}

impl From<MembershipPlan> for PlanResponse {
    fn from(p: MembershipPlan) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            duration_days: p.duration_days,
            swap_limit: p.swap_limit,
            is_active: p.is_active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MembershipResponse {
    pub id: i32,
    pub user_id: i32,
    pub plan_id: i32,
    pub transaction_id: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub expired_date: Option<DateTime<Utc>>,
    pub remaining_swaps: i32,
    pub status: String,
}

impl From<UserMembership> for MembershipResponse {
    fn from(m: UserMembership) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            plan_id: m.plan_id,
            transaction_id: m.transaction_id,
            start_date: m.start_date,
            expired_date: m.expired_date,
            remaining_swaps: m.remaining_swaps,
            status: m.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub membership: MembershipResponse,
    pub transaction: TransactionResponse,
    /// Missing when the gateway could not issue a link; renew it later
    pub checkout_url: Option<String>,
}

impl From<MembershipPurchase> for PurchaseResponse {
    fn from(p: MembershipPurchase) -> Self {
        Self {
            membership: p.membership.into(),
            transaction: p.transaction.into(),
            checkout_url: p.checkout_url,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(length(max = 1000, message = "description is too long"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,
    #[validate(range(min = 1, max = 3650, message = "duration_days must be 1-3650"))]
    pub duration_days: i32,
    #[validate(range(min = 1, message = "swap_limit must be positive"))]
    pub swap_limit: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PurchaseRequest {
    #[validate(range(min = 1, message = "plan_id is required"))]
    pub plan_id: i32,
}
