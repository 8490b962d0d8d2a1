//! Bookings and their details

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use super::{expect_one, Page};
use crate::domain::{
    Booking, BookingDetail, BookingDetailStatus, BookingStatus, DomainError, DomainResult,
};
use crate::infrastructure::database::entities::{booking, booking_detail};

pub struct BookingRepository<'a, C> {
    conn: &'a C,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i32,
    pub vehicle_id: i32,
    pub station_id: i32,
    pub user_membership_id: Option<i32>,
    pub expected_pickup_time: DateTime<Utc>,
    pub distance_km: f64,
    pub travel_minutes: i64,
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    Ok(Booking {
        id: m.id,
        user_id: m.user_id,
        vehicle_id: m.vehicle_id,
        station_id: m.station_id,
        user_membership_id: m.user_membership_id,
        transaction_id: m.transaction_id,
        expected_pickup_time: m.expected_pickup_time,
        distance_km: m.distance_km,
        travel_minutes: m.travel_minutes,
        status: m.status.parse()?,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn detail_to_domain(m: booking_detail::Model) -> DomainResult<BookingDetail> {
    Ok(BookingDetail {
        id: m.id,
        booking_id: m.booking_id,
        battery_id: m.battery_id,
        price: m.price,
        status: m.status.parse()?,
    })
}

fn all_to_domain(models: Vec<booking::Model>) -> DomainResult<Vec<Booking>> {
    models.into_iter().map(model_to_domain).collect()
}

impl<'a, C: ConnectionTrait> BookingRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// New bookings start `PENDING`.
    pub async fn insert(&self, new: NewBooking) -> DomainResult<Booking> {
        let now = Utc::now();
        let model = booking::ActiveModel {
            id: NotSet,
            user_id: Set(new.user_id),
            vehicle_id: Set(new.vehicle_id),
            station_id: Set(new.station_id),
            user_membership_id: Set(new.user_membership_id),
            transaction_id: Set(None),
            expected_pickup_time: Set(new.expected_pickup_time),
            distance_km: Set(new.distance_km),
            travel_minutes: Set(new.travel_minutes),
            status: Set(BookingStatus::Pending.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }

    pub async fn find(&self, id: i32) -> DomainResult<Option<Booking>> {
        booking::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn get(&self, id: i32) -> DomainResult<Booking> {
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", id))
    }

    /// Read for update, `NotFound` when absent.
    pub async fn lock(&self, id: i32) -> DomainResult<Booking> {
        booking::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()?
            .ok_or_else(|| DomainError::not_found("Booking", id))
    }

    pub async fn find_by_transaction(&self, transaction_id: i32) -> DomainResult<Option<Booking>> {
        booking::Entity::find()
            .filter(booking::Column::TransactionId.eq(transaction_id))
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    /// Persist status and transaction link, guarded by the status that was
    /// read.
    pub async fn save(&self, b: &Booking, expected: BookingStatus) -> DomainResult<()> {
        debug!(booking_id = b.id, from = %expected, to = %b.status, "Saving booking");

        let res = booking::Entity::update_many()
            .set(booking::ActiveModel {
                transaction_id: Set(b.transaction_id),
                status: Set(b.status.as_str().to_string()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(booking::Column::Id.eq(b.id))
            .filter(booking::Column::Status.eq(expected.as_str()))
            .exec(self.conn)
            .await?;
        expect_one(res.rows_affected, "Booking", b.id)
    }

    pub async fn insert_detail(
        &self,
        booking_id: i32,
        battery_id: i32,
        price: i64,
    ) -> DomainResult<BookingDetail> {
        let model = booking_detail::ActiveModel {
            id: NotSet,
            booking_id: Set(booking_id),
            battery_id: Set(battery_id),
            price: Set(price),
            status: Set(BookingDetailStatus::Pending.as_str().to_string()),
        }
        .insert(self.conn)
        .await?;
        detail_to_domain(model)
    }

    pub async fn details(&self, booking_id: i32) -> DomainResult<Vec<BookingDetail>> {
        booking_detail::Entity::find()
            .filter(booking_detail::Column::BookingId.eq(booking_id))
            .order_by_asc(booking_detail::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(detail_to_domain)
            .collect()
    }

    pub async fn save_detail(
        &self,
        d: &BookingDetail,
        expected: BookingDetailStatus,
    ) -> DomainResult<()> {
        let res = booking_detail::Entity::update_many()
            .set(booking_detail::ActiveModel {
                status: Set(d.status.as_str().to_string()),
                ..Default::default()
            })
            .filter(booking_detail::Column::Id.eq(d.id))
            .filter(booking_detail::Column::Status.eq(expected.as_str()))
            .exec(self.conn)
            .await?;
        expect_one(res.rows_affected, "BookingDetail", d.id)
    }

    /// A driver's bookings, newest first.
    pub async fn list_by_user(
        &self,
        user_id: i32,
        page: Page,
    ) -> DomainResult<(Vec<Booking>, u64)> {
        let paginator = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::Id)
            .paginate(self.conn, page.limit);
        let total = paginator.num_items().await?;
        let items = all_to_domain(paginator.fetch_page(page.page - 1).await?)?;
        Ok((items, total))
    }

    pub async fn list_by_station(
        &self,
        station_id: i32,
        status: Option<BookingStatus>,
        page: Page,
    ) -> DomainResult<(Vec<Booking>, u64)> {
        let mut query = booking::Entity::find().filter(booking::Column::StationId.eq(station_id));
        if let Some(status) = status {
            query = query.filter(booking::Column::Status.eq(status.as_str()));
        }
        let paginator = query
            .order_by_asc(booking::Column::ExpectedPickupTime)
            .paginate(self.conn, page.limit);
        let total = paginator.num_items().await?;
        let items = all_to_domain(paginator.fetch_page(page.page - 1).await?)?;
        Ok((items, total))
    }

    /// Not yet started bookings whose pickup time is before `cutoff`.
    pub async fn overdue_open(&self, cutoff: DateTime<Utc>) -> DomainResult<Vec<Booking>> {
        all_to_domain(
            booking::Entity::find()
                .filter(booking::Column::Status.is_in([
                    BookingStatus::Pending.as_str(),
                    BookingStatus::Reserved.as_str(),
                ]))
                .filter(booking::Column::ExpectedPickupTime.lt(cutoff))
                .all(self.conn)
                .await?,
        )
    }

    pub async fn completed_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>> {
        all_to_domain(
            booking::Entity::find()
                .filter(booking::Column::Status.eq(BookingStatus::Completed.as_str()))
                .filter(booking::Column::UpdatedAt.gte(from))
                .filter(booking::Column::UpdatedAt.lt(to))
                .all(self.conn)
                .await?,
        )
    }
}
