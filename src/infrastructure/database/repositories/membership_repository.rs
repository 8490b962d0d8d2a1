//! Membership plans and user memberships

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use super::expect_one;
use crate::domain::{
    DomainError, DomainResult, MembershipPlan, MembershipStatus, UserMembership,
};
use crate::infrastructure::database::entities::{membership_plan, user_membership};

pub struct MembershipRepository<'a, C> {
    conn: &'a C,
}

#[derive(Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub duration_days: i32,
    pub swap_limit: i32,
}

// ── Conversion helpers ──────────────────────────────────────────

fn plan_to_domain(m: membership_plan::Model) -> MembershipPlan {
    MembershipPlan {
        id: m.id,
        name: m.name,
        description: m.description,
        price: m.price,
        duration_days: m.duration_days,
        swap_limit: m.swap_limit,
        is_active: m.status == "ACTIVE",
        created_at: m.created_at,
    }
}

fn model_to_domain(m: user_membership::Model) -> DomainResult<UserMembership> {
    Ok(UserMembership {
        id: m.id,
        user_id: m.user_id,
        plan_id: m.plan_id,
        transaction_id: m.transaction_id,
        start_date: m.start_date,
        expired_date: m.expired_date,
        remaining_swaps: m.remaining_swaps,
        status: m.status.parse()?,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

impl<'a, C: ConnectionTrait> MembershipRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    // ── Plans ───────────────────────────────────────────────────

    pub async fn list_active_plans(&self) -> DomainResult<Vec<MembershipPlan>> {
        Ok(membership_plan::Entity::find()
            .filter(membership_plan::Column::Status.eq("ACTIVE"))
            .order_by_asc(membership_plan::Column::Price)
            .all(self.conn)
            .await?
            .into_iter()
            .map(plan_to_domain)
            .collect())
    }

    pub async fn get_plan(&self, id: i32) -> DomainResult<MembershipPlan> {
        membership_plan::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(plan_to_domain)
            .ok_or_else(|| DomainError::not_found("MembershipPlan", id))
    }

    pub async fn insert_plan(&self, new: NewPlan) -> DomainResult<MembershipPlan> {
        let model = membership_plan::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            description: Set(new.description),
            price: Set(new.price),
            duration_days: Set(new.duration_days),
            swap_limit: Set(new.swap_limit),
            status: Set("ACTIVE".to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        Ok(plan_to_domain(model))
    }

    pub async fn deactivate_plan(&self, id: i32) -> DomainResult<()> {
        let res = membership_plan::Entity::update_many()
            .set(membership_plan::ActiveModel {
                status: Set("INACTIVE".to_string()),
                ..Default::default()
            })
            .filter(membership_plan::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found("MembershipPlan", id));
        }
        Ok(())
    }

    // ── User memberships ────────────────────────────────────────

    /// Pending membership for a plan purchase.
    pub async fn insert_pending(
        &self,
        user_id: i32,
        plan_id: i32,
        transaction_id: i32,
    ) -> DomainResult<UserMembership> {
        let now = Utc::now();
        let model = user_membership::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            plan_id: Set(plan_id),
            transaction_id: Set(Some(transaction_id)),
            start_date: Set(None),
            expired_date: Set(None),
            remaining_swaps: Set(0),
            status: Set(MembershipStatus::Pending.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }

    pub async fn find(&self, id: i32) -> DomainResult<Option<UserMembership>> {
        user_membership::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn lock(&self, id: i32) -> DomainResult<Option<UserMembership>> {
        user_membership::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    /// Read for update the user's active, unexpired membership. The one
    /// expiring first wins when there are several.
    pub async fn lock_usable(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<UserMembership>> {
        user_membership::Entity::find()
            .filter(user_membership::Column::UserId.eq(user_id))
            .filter(user_membership::Column::Status.eq(MembershipStatus::Active.as_str()))
            .filter(user_membership::Column::ExpiredDate.gt(now))
            .order_by_asc(user_membership::Column::ExpiredDate)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn find_by_transaction(
        &self,
        transaction_id: i32,
    ) -> DomainResult<Option<UserMembership>> {
        user_membership::Entity::find()
            .filter(user_membership::Column::TransactionId.eq(transaction_id))
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn list_by_user(&self, user_id: i32) -> DomainResult<Vec<UserMembership>> {
        user_membership::Entity::find()
            .filter(user_membership::Column::UserId.eq(user_id))
            .order_by_desc(user_membership::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    pub async fn overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<UserMembership>> {
        user_membership::Entity::find()
            .filter(user_membership::Column::Status.eq(MembershipStatus::Active.as_str()))
            .filter(user_membership::Column::ExpiredDate.lt(now))
            .all(self.conn)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    /// Persist counters, dates and status. Guarded by the status and
    /// remaining swaps that were read, so two bookings can never spend the
    /// same swap.
    pub async fn save(&self, m: &UserMembership, read: &UserMembership) -> DomainResult<()> {
        debug!(
            membership_id = m.id,
            remaining_swaps = m.remaining_swaps,
            status = %m.status,
            "Saving membership"
        );

        let res = user_membership::Entity::update_many()
            .set(user_membership::ActiveModel {
                start_date: Set(m.start_date),
                expired_date: Set(m.expired_date),
                remaining_swaps: Set(m.remaining_swaps),
                status: Set(m.status.as_str().to_string()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(user_membership::Column::Id.eq(m.id))
            .filter(user_membership::Column::Status.eq(read.status.as_str()))
            .filter(user_membership::Column::RemainingSwaps.eq(read.remaining_swaps))
            .exec(self.conn)
            .await?;
        expect_one(res.rows_affected, "UserMembership", m.id)
    }
}
