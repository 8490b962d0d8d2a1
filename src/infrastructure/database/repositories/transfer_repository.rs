//! Transfer requests and their details

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::expect_one;
use crate::domain::{DomainError, DomainResult, TransferDetail, TransferRequest, TransferStatus};
use crate::infrastructure::database::entities::{transfer_request, transfer_request_detail};

pub struct TransferRepository<'a, C> {
    conn: &'a C,
}

#[derive(Debug, Clone)]
pub struct NewTransferRequest {
    pub from_station_id: i32,
    pub to_station_id: i32,
    pub created_by: i32,
    pub note: Option<String>,
}

fn request_to_domain(m: transfer_request::Model) -> DomainResult<TransferRequest> {
    Ok(TransferRequest {
        id: m.id,
        from_station_id: m.from_station_id,
        to_station_id: m.to_station_id,
        created_by: m.created_by,
        note: m.note,
        status: m.status.parse()?,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn detail_to_domain(m: transfer_request_detail::Model) -> DomainResult<TransferDetail> {
    Ok(TransferDetail {
        id: m.id,
        request_id: m.request_id,
        battery_id: m.battery_id,
        status: m.status.parse()?,
    })
}

impl<'a, C: ConnectionTrait> TransferRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, new: NewTransferRequest) -> DomainResult<TransferRequest> {
        let now = Utc::now();
        let model = transfer_request::ActiveModel {
            id: NotSet,
            from_station_id: Set(new.from_station_id),
            to_station_id: Set(new.to_station_id),
            created_by: Set(new.created_by),
            note: Set(new.note),
            status: Set(TransferStatus::Pending.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;
        request_to_domain(model)
    }

    pub async fn insert_detail(
        &self,
        request_id: i32,
        battery_id: i32,
    ) -> DomainResult<TransferDetail> {
        let model = transfer_request_detail::ActiveModel {
            id: NotSet,
            request_id: Set(request_id),
            battery_id: Set(battery_id),
            status: Set(TransferStatus::Pending.as_str().to_string()),
        }
        .insert(self.conn)
        .await?;
        detail_to_domain(model)
    }

    pub async fn get(&self, id: i32) -> DomainResult<TransferRequest> {
        transfer_request::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(request_to_domain)
            .transpose()?
            .ok_or_else(|| DomainError::not_found("TransferRequest", id))
    }

    pub async fn lock(&self, id: i32) -> DomainResult<TransferRequest> {
        transfer_request::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(request_to_domain)
            .transpose()?
            .ok_or_else(|| DomainError::not_found("TransferRequest", id))
    }

    pub async fn details(&self, request_id: i32) -> DomainResult<Vec<TransferDetail>> {
        transfer_request_detail::Entity::find()
            .filter(transfer_request_detail::Column::RequestId.eq(request_id))
            .order_by_asc(transfer_request_detail::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(detail_to_domain)
            .collect()
    }

    /// Read for update the detail of `battery_id` currently in `status`.
    pub async fn lock_detail_for_battery(
        &self,
        battery_id: i32,
        status: TransferStatus,
    ) -> DomainResult<Option<TransferDetail>> {
        transfer_request_detail::Entity::find()
            .filter(transfer_request_detail::Column::BatteryId.eq(battery_id))
            .filter(transfer_request_detail::Column::Status.eq(status.as_str()))
            .order_by_asc(transfer_request_detail::Column::Id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(detail_to_domain)
            .transpose()
    }

    /// Whether the battery is part of a pending or transferring request.
    pub async fn has_open_detail(&self, battery_id: i32) -> DomainResult<bool> {
        let found = transfer_request_detail::Entity::find()
            .filter(transfer_request_detail::Column::BatteryId.eq(battery_id))
            .filter(transfer_request_detail::Column::Status.is_in([
                TransferStatus::Pending.as_str(),
                TransferStatus::Transferring.as_str(),
            ]))
            .one(self.conn)
            .await?;
        Ok(found.is_some())
    }

    pub async fn list(&self, status: Option<TransferStatus>) -> DomainResult<Vec<TransferRequest>> {
        let mut query =
            transfer_request::Entity::find().order_by_desc(transfer_request::Column::Id);
        if let Some(status) = status {
            query = query.filter(transfer_request::Column::Status.eq(status.as_str()));
        }
        query
            .all(self.conn)
            .await?
            .into_iter()
            .map(request_to_domain)
            .collect()
    }

    pub async fn save(&self, r: &TransferRequest, expected: TransferStatus) -> DomainResult<()> {
        let res = transfer_request::Entity::update_many()
            .set(transfer_request::ActiveModel {
                status: Set(r.status.as_str().to_string()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(transfer_request::Column::Id.eq(r.id))
            .filter(transfer_request::Column::Status.eq(expected.as_str()))
            .exec(self.conn)
            .await?;
        expect_one(res.rows_affected, "TransferRequest", r.id)
    }

    pub async fn save_detail(
        &self,
        d: &TransferDetail,
        expected: TransferStatus,
    ) -> DomainResult<()> {
        let res = transfer_request_detail::Entity::update_many()
            .set(transfer_request_detail::ActiveModel {
                status: Set(d.status.as_str().to_string()),
                ..Default::default()
            })
            .filter(transfer_request_detail::Column::Id.eq(d.id))
            .filter(transfer_request_detail::Column::Status.eq(expected.as_str()))
            .exec(self.conn)
            .await?;
        expect_one(res.rows_affected, "TransferRequestDetail", d.id)
    }
}
