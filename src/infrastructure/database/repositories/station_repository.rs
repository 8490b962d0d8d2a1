//! Stations and cabinets

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::Page;
use crate::domain::{Cabinet, DomainError, DomainResult, Station, StationStatus};
use crate::infrastructure::database::entities::{cabinet, station};

pub struct StationRepository<'a, C> {
    conn: &'a C,
}

#[derive(Debug, Clone)]
pub struct NewStation {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCabinet {
    pub station_id: i32,
    pub battery_type_id: i32,
    pub name: String,
}

// ── Conversion helpers ──────────────────────────────────────────

fn station_to_domain(m: station::Model) -> DomainResult<Station> {
    Ok(Station {
        id: m.id,
        name: m.name,
        address: m.address,
        latitude: m.latitude,
        longitude: m.longitude,
        open_time: m.open_time,
        close_time: m.close_time,
        status: m.status.parse()?,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn cabinet_to_domain(m: cabinet::Model) -> DomainResult<Cabinet> {
    Ok(Cabinet {
        id: m.id,
        station_id: m.station_id,
        battery_type_id: m.battery_type_id,
        name: m.name,
        status: m.status.parse()?,
        created_at: m.created_at,
    })
}

impl<'a, C: ConnectionTrait> StationRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: i32) -> DomainResult<Option<Station>> {
        station::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(station_to_domain)
            .transpose()
    }

    pub async fn get(&self, id: i32) -> DomainResult<Station> {
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", id))
    }

    /// Paginated, newest last. Returns the page and the total count.
    pub async fn list(&self, page: Page) -> DomainResult<(Vec<Station>, u64)> {
        let paginator = station::Entity::find()
            .order_by_asc(station::Column::Id)
            .paginate(self.conn, page.limit);
        let total = paginator.num_items().await?;
        let stations = paginator
            .fetch_page(page.page - 1)
            .await?
            .into_iter()
            .map(station_to_domain)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok((stations, total))
    }

    pub async fn list_active(&self) -> DomainResult<Vec<Station>> {
        station::Entity::find()
            .filter(station::Column::Status.eq(StationStatus::Active.as_str()))
            .all(self.conn)
            .await?
            .into_iter()
            .map(station_to_domain)
            .collect()
    }

    pub async fn insert(&self, new: NewStation) -> DomainResult<Station> {
        let now = Utc::now();
        let model = station::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            address: Set(new.address),
            latitude: Set(new.latitude),
            longitude: Set(new.longitude),
            open_time: Set(new.open_time),
            close_time: Set(new.close_time),
            status: Set(StationStatus::Active.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;
        station_to_domain(model)
    }

    pub async fn update(&self, s: &Station) -> DomainResult<Station> {
        let model = station::ActiveModel {
            id: Set(s.id),
            name: Set(s.name.clone()),
            address: Set(s.address.clone()),
            latitude: Set(s.latitude),
            longitude: Set(s.longitude),
            open_time: Set(s.open_time.clone()),
            close_time: Set(s.close_time.clone()),
            status: Set(s.status.as_str().to_string()),
            created_at: NotSet,
            updated_at: Set(Utc::now()),
        }
        .update(self.conn)
        .await?;
        station_to_domain(model)
    }

    pub async fn find_cabinet(&self, id: i32) -> DomainResult<Option<Cabinet>> {
        cabinet::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(cabinet_to_domain)
            .transpose()
    }

    pub async fn get_cabinet(&self, id: i32) -> DomainResult<Cabinet> {
        self.find_cabinet(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Cabinet", id))
    }

    pub async fn insert_cabinet(&self, new: NewCabinet) -> DomainResult<Cabinet> {
        let model = cabinet::ActiveModel {
            id: NotSet,
            station_id: Set(new.station_id),
            battery_type_id: Set(new.battery_type_id),
            name: Set(new.name),
            status: Set(StationStatus::Active.as_str().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        cabinet_to_domain(model)
    }

    pub async fn list_cabinets(&self, station_id: i32) -> DomainResult<Vec<Cabinet>> {
        cabinet::Entity::find()
            .filter(cabinet::Column::StationId.eq(station_id))
            .order_by_asc(cabinet::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(cabinet_to_domain)
            .collect()
    }
}
