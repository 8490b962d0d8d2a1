//! Payment transactions

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QuerySelect, Set,
};

use super::expect_one;
use crate::domain::payment::new_order_code;
use crate::domain::{
    DomainError, DomainResult, PaymentTransaction, TransactionKind, TransactionStatus,
};
use crate::infrastructure::database::entities::transaction;

pub struct PaymentRepository<'a, C> {
    conn: &'a C,
}

fn model_to_domain(m: transaction::Model) -> DomainResult<PaymentTransaction> {
    Ok(PaymentTransaction {
        id: m.id,
        user_id: m.user_id,
        order_code: m.order_code,
        amount: m.amount,
        kind: m.kind.parse()?,
        status: m.status.parse()?,
        checkout_url: m.checkout_url,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

impl<'a, C: ConnectionTrait> PaymentRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// New `PENDING` transaction with a fresh order code.
    pub async fn insert_pending(
        &self,
        user_id: i32,
        amount: i64,
        kind: TransactionKind,
    ) -> DomainResult<PaymentTransaction> {
        let now = Utc::now();
        let model = transaction::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            order_code: Set(new_order_code(now)),
            amount: Set(amount),
            kind: Set(kind.as_str().to_string()),
            status: Set(TransactionStatus::Pending.as_str().to_string()),
            checkout_url: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }

    pub async fn find(&self, id: i32) -> DomainResult<Option<PaymentTransaction>> {
        transaction::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn get(&self, id: i32) -> DomainResult<PaymentTransaction> {
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Transaction", id))
    }

    /// Read for update by gateway order code.
    pub async fn lock_by_order_code(&self, order_code: i64) -> DomainResult<PaymentTransaction> {
        transaction::Entity::find()
            .filter(transaction::Column::OrderCode.eq(order_code))
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Transaction",
                field: "order_code",
                value: order_code.to_string(),
            })
    }

    pub async fn save_status(
        &self,
        tx: &PaymentTransaction,
        expected: TransactionStatus,
    ) -> DomainResult<()> {
        let res = transaction::Entity::update_many()
            .set(transaction::ActiveModel {
                status: Set(tx.status.as_str().to_string()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(transaction::Column::Id.eq(tx.id))
            .filter(transaction::Column::Status.eq(expected.as_str()))
            .exec(self.conn)
            .await?;
        expect_one(res.rows_affected, "Transaction", tx.id)
    }

    pub async fn set_checkout_url(&self, id: i32, url: &str) -> DomainResult<()> {
        transaction::Entity::update_many()
            .set(transaction::ActiveModel {
                checkout_url: Set(Some(url.to_string())),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(transaction::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    /// Sum of paid transactions updated in `[from, to)`.
    pub async fn paid_revenue(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> DomainResult<i64> {
        let amounts: Vec<i64> = transaction::Entity::find()
            .select_only()
            .column(transaction::Column::Amount)
            .filter(transaction::Column::Status.eq(TransactionStatus::Paid.as_str()))
            .filter(transaction::Column::UpdatedAt.gte(from))
            .filter(transaction::Column::UpdatedAt.lt(to))
            .into_tuple()
            .all(self.conn)
            .await?;
        Ok(amounts.into_iter().sum())
    }
}
