use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument, warn};

use crate::application::payment::PaymentService;
use crate::application::workflow::finish;
use crate::domain::{
    DomainError, DomainResult, MembershipPlan, MembershipStatus, PaymentTransaction,
    TransactionKind, UserMembership,
};
use crate::infrastructure::database::repositories::membership_repository::NewPlan;
use crate::infrastructure::database::Repositories;

/// A started purchase, waiting for payment
#[derive(Debug, Clone)]
pub struct MembershipPurchase {
    pub membership: UserMembership,
    pub transaction: PaymentTransaction,
    pub checkout_url: Option<String>,
}

pub struct MembershipService {
    db: DatabaseConnection,
    payments: Arc<PaymentService>,
}

impl MembershipService {
    pub fn new(db: DatabaseConnection, payments: Arc<PaymentService>) -> Self {
        Self { db, payments }
    }

    pub async fn list_plans(&self) -> DomainResult<Vec<MembershipPlan>> {
        Repositories::new(&self.db).memberships().list_active_plans().await
    }

    pub async fn create_plan(&self, plan: NewPlan) -> DomainResult<MembershipPlan> {
        if plan.price < 0 || plan.duration_days <= 0 || plan.swap_limit <= 0 {
            return Err(DomainError::bad_request(
                "Plan price must be non-negative, duration and swap limit positive",
            ));
        }
        let plan = Repositories::new(&self.db).memberships().insert_plan(plan).await?;
        info!(plan_id = plan.id, name = %plan.name, "Membership plan created");
        Ok(plan)
    }

    /// Existing memberships keep running; the plan just cannot be bought.
    pub async fn deactivate_plan(&self, plan_id: i32) -> DomainResult<()> {
        Repositories::new(&self.db)
            .memberships()
            .deactivate_plan(plan_id)
            .await?;
        info!(plan_id, "Membership plan deactivated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn purchase(&self, user_id: i32, plan_id: i32) -> DomainResult<MembershipPurchase> {
        let result = self.start_purchase(user_id, plan_id, Utc::now()).await;
        let mut purchase = finish("membership_purchase", result)?;
        info!(
            user_id,
            plan_id,
            membership_id = purchase.membership.id,
            "Membership purchase started"
        );
        purchase.checkout_url = self
            .payments
            .request_link(purchase.transaction.id, &format!("EVSWAP MB {}", purchase.membership.id))
            .await;
        Ok(purchase)
    }

    async fn start_purchase(
        &self,
        user_id: i32,
        plan_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<MembershipPurchase> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let plan = repos.memberships().get_plan(plan_id).await?;
        if !plan.is_active {
            return Err(DomainError::bad_request(format!(
                "Membership plan {} is no longer offered",
                plan.id
            )));
        }
        if repos.memberships().lock_usable(user_id, now).await?.is_some() {
            return Err(DomainError::bad_request("User already has an active membership"));
        }

        let transaction = repos
            .payments()
            .insert_pending(user_id, plan.price, TransactionKind::Membership)
            .await?;
        let membership = repos
            .memberships()
            .insert_pending(user_id, plan.id, transaction.id)
            .await?;

        txn.commit().await?;
        Ok(MembershipPurchase {
            membership,
            transaction,
            checkout_url: None,
        })
    }

    pub async fn list_user_memberships(&self, user_id: i32) -> DomainResult<Vec<UserMembership>> {
        Repositories::new(&self.db)
            .memberships()
            .list_by_user(user_id)
            .await
    }

    /// Mark active memberships past their expiry date as expired. Safe to
    /// run repeatedly.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let overdue = Repositories::new(&self.db).memberships().overdue(now).await?;
        let mut expired = 0;
        for candidate in overdue {
            match self.expire(candidate.id, now).await {
                Ok(true) => expired += 1,
                Ok(false) | Err(DomainError::Conflict(_)) => {}
                Err(e) => {
                    warn!(membership_id = candidate.id, error = %e, "Failed to expire membership")
                }
            }
        }
        if expired > 0 {
            info!(count = expired, "Expired memberships");
        }
        Ok(expired)
    }

    async fn expire(&self, membership_id: i32, now: DateTime<Utc>) -> DomainResult<bool> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);
        let Some(read) = repos.memberships().lock(membership_id).await? else {
            return Ok(false);
        };
        if !read.is_overdue(now) {
            return Ok(false);
        }
        let mut membership = read.clone();
        membership.status = MembershipStatus::Expired;
        repos.memberships().save(&membership, &read).await?;
        txn.commit().await?;
        Ok(true)
    }
}
