//! Transfer requests and their take/put steps
//!
//! Unlike a booking, a transfer moves batteries with no vehicle involved.
//! Take empties the source slot and flags the battery `in_transfer`; put
//! seats it at the destination and completes its request detail.

use std::collections::HashSet;

use metrics::counter;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};

use crate::application::events::SharedEventBus;
use crate::application::workflow::finish;
use crate::domain::events::{BatteryEvent, Event, SlotEvent};
use crate::domain::transfer::request_status;
use crate::domain::{
    DomainError, DomainResult, SlotStatus, TransferDetail, TransferRequest, TransferStatus,
};
use crate::infrastructure::database::repositories::history_repository::{
    SlotAction, SlotMovement,
};
use crate::infrastructure::database::repositories::transfer_repository::NewTransferRequest;
use crate::infrastructure::database::Repositories;

#[derive(Debug, Clone)]
pub struct TransferOrder {
    pub from_station_id: i32,
    pub to_station_id: i32,
    pub battery_ids: Vec<i32>,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TransferView {
    pub request: TransferRequest,
    pub details: Vec<TransferDetail>,
}

/// Result of one take or put
#[derive(Debug, Clone)]
pub struct TransferMove {
    pub slot_id: i32,
    pub battery_id: i32,
    pub slot_status: SlotStatus,
    /// Request the move belonged to, if any
    pub request: Option<TransferRequest>,
    pub message: String,
}

pub struct TransferService {
    db: DatabaseConnection,
    events: SharedEventBus,
}

impl TransferService {
    pub fn new(db: DatabaseConnection, events: SharedEventBus) -> Self {
        Self { db, events }
    }

    #[instrument(skip(self, order), fields(from = order.from_station_id, to = order.to_station_id))]
    pub async fn create_request(
        &self,
        order: TransferOrder,
        staff_id: i32,
    ) -> DomainResult<TransferView> {
        let view = finish("transfer_create", self.create(order, staff_id).await)?;
        counter!("transfers_total", "kind" => "create").increment(1);
        info!(
            request_id = view.request.id,
            batteries = view.details.len(),
            "Transfer request created"
        );
        Ok(view)
    }

    async fn create(&self, order: TransferOrder, staff_id: i32) -> DomainResult<TransferView> {
        if order.from_station_id == order.to_station_id {
            return Err(DomainError::bad_request(
                "Source and destination station must differ",
            ));
        }
        if order.battery_ids.is_empty() {
            return Err(DomainError::bad_request("At least one battery must be transferred"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = order.battery_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(DomainError::bad_request(format!(
                "Battery {} is listed more than once",
                dup
            )));
        }

        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        repos.stations().get(order.from_station_id).await?;
        repos.stations().get(order.to_station_id).await?;

        for &battery_id in &order.battery_ids {
            repos.batteries().get(battery_id).await?;
            let slot = repos.slots().lock_by_battery(battery_id).await?.ok_or_else(|| {
                DomainError::bad_request(format!("Battery {} is not in a slot", battery_id))
            })?;
            let cabinet = repos.stations().get_cabinet(slot.cabinet_id).await?;
            if cabinet.station_id != order.from_station_id {
                return Err(DomainError::bad_request(format!(
                    "Battery {} is not at station {}",
                    battery_id, order.from_station_id
                )));
            }
            if repos.transfers().has_open_detail(battery_id).await? {
                return Err(DomainError::bad_request(format!(
                    "Battery {} is already part of an open transfer request",
                    battery_id
                )));
            }
        }

        let request = repos
            .transfers()
            .insert(NewTransferRequest {
                from_station_id: order.from_station_id,
                to_station_id: order.to_station_id,
                created_by: staff_id,
                note: order.note,
            })
            .await?;
        let mut details = Vec::with_capacity(order.battery_ids.len());
        for &battery_id in &order.battery_ids {
            details.push(repos.transfers().insert_detail(request.id, battery_id).await?);
        }

        txn.commit().await?;
        Ok(TransferView { request, details })
    }

    /// Take a battery out of `slot_id` for relocation.
    #[instrument(skip(self))]
    pub async fn take_battery(&self, slot_id: i32) -> DomainResult<TransferMove> {
        let moved = finish("transfer_take", self.take(slot_id).await)?;
        counter!("transfers_total", "kind" => "take").increment(1);
        info!(slot_id, battery_id = moved.battery_id, "Battery taken for transfer");
        Ok(moved)
    }

    async fn take(&self, slot_id: i32) -> DomainResult<TransferMove> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let mut slot = repos.slots().lock(slot_id).await?;
        let battery_id = slot.battery_id.ok_or_else(|| {
            DomainError::bad_request(format!("Slot {} holds no battery", slot.id))
        })?;
        let mut battery = repos
            .batteries()
            .lock(battery_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Battery", battery_id))?;
        if !battery.can_leave_for_transfer() {
            return Err(DomainError::bad_request(format!(
                "Battery {} cannot be transferred (status: {})",
                battery.id, battery.status
            )));
        }

        let mut request = None;
        if let Some(mut detail) = repos
            .transfers()
            .lock_detail_for_battery(battery.id, TransferStatus::Pending)
            .await?
        {
            detail.status = TransferStatus::Transferring;
            repos
                .transfers()
                .save_detail(&detail, TransferStatus::Pending)
                .await?;
            request = Some(advance_request(&repos, detail.request_id).await?);
        }

        repos
            .histories()
            .record_slot(
                slot.id,
                battery.id,
                SlotAction::Out,
                SlotMovement {
                    transfer_request_id: request.as_ref().map(|r: &TransferRequest| r.id),
                    ..Default::default()
                },
            )
            .await?;
        let slot_previous = slot.status;
        slot.take_battery()?;
        repos.slots().save(&slot, slot_previous).await?;

        battery.in_transfer = true;
        repos.batteries().save(&battery, battery.status).await?;

        txn.commit().await?;
        Ok(TransferMove {
            slot_id: slot.id,
            battery_id: battery.id,
            slot_status: slot.status,
            request,
            message: format!("Battery {} taken from slot {} for transfer", battery.id, slot.id),
        })
    }

    /// Seat a transferred battery into empty `slot_id`.
    #[instrument(skip(self))]
    pub async fn put_battery(&self, slot_id: i32, battery_id: i32) -> DomainResult<TransferMove> {
        let (moved, events) = finish("transfer_put", self.put(slot_id, battery_id).await)?;
        counter!("transfers_total", "kind" => "put").increment(1);
        info!(
            slot_id,
            battery_id,
            slot_status = %moved.slot_status,
            "Transferred battery placed"
        );
        self.events.publish_all(events);
        Ok(moved)
    }

    async fn put(&self, slot_id: i32, battery_id: i32) -> DomainResult<(TransferMove, Vec<Event>)> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let mut slot = repos.slots().lock(slot_id).await?;
        if slot.status != SlotStatus::Empty || slot.battery_id.is_some() {
            return Err(DomainError::bad_request(format!(
                "Slot {} is not empty (status: {})",
                slot.id, slot.status
            )));
        }
        let mut battery = repos
            .batteries()
            .lock(battery_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Battery", battery_id))?;
        if !battery.can_enter_from_transfer() {
            return Err(DomainError::bad_request(format!(
                "Battery {} cannot be placed (status: {})",
                battery.id, battery.status
            )));
        }
        if let Some(current) = repos.slots().lock_by_battery(battery.id).await? {
            return Err(DomainError::bad_request(format!(
                "Battery {} is still in slot {}",
                battery.id, current.id
            )));
        }
        let cabinet = repos.stations().get_cabinet(slot.cabinet_id).await?;
        if !cabinet.accepts(battery.battery_type_id) {
            return Err(DomainError::bad_request(format!(
                "Cabinet {} does not accept battery type {}",
                cabinet.id, battery.battery_type_id
            )));
        }

        let mut request = None;
        if let Some(mut detail) = repos
            .transfers()
            .lock_detail_for_battery(battery.id, TransferStatus::Transferring)
            .await?
        {
            let current = repos.transfers().lock(detail.request_id).await?;
            current.check_destination(cabinet.station_id)?;
            detail.status = TransferStatus::Completed;
            repos
                .transfers()
                .save_detail(&detail, TransferStatus::Transferring)
                .await?;
            request = Some(advance_request(&repos, detail.request_id).await?);
        }

        repos
            .histories()
            .record_slot(
                slot.id,
                battery.id,
                SlotAction::In,
                SlotMovement {
                    transfer_request_id: request.as_ref().map(|r: &TransferRequest| r.id),
                    ..Default::default()
                },
            )
            .await?;
        slot.put_battery(battery.id, battery.status)?;
        repos.slots().save(&slot, SlotStatus::Empty).await?;

        battery.in_transfer = false;
        repos.batteries().save(&battery, battery.status).await?;

        txn.commit().await?;

        let mut events = Vec::new();
        if slot.status == SlotStatus::Available {
            events.push(Event::BatteryAvailable(BatteryEvent {
                battery_id: battery.id,
                station_id: cabinet.station_id,
                booking_id: None,
            }));
            events.push(Event::SlotAvailable(SlotEvent {
                slot_id: slot.id,
                station_id: cabinet.station_id,
                battery_id: Some(battery.id),
            }));
        }

        let moved = TransferMove {
            slot_id: slot.id,
            battery_id: battery.id,
            slot_status: slot.status,
            request,
            message: format!("Battery {} placed into slot {}", battery.id, slot.id),
        };
        Ok((moved, events))
    }

    /// Cancel a request nothing has been taken for yet.
    pub async fn cancel_request(&self, request_id: i32) -> DomainResult<TransferView> {
        let view = finish("transfer_cancel", self.cancel(request_id).await)?;
        info!(request_id, "Transfer request cancelled");
        Ok(view)
    }

    async fn cancel(&self, request_id: i32) -> DomainResult<TransferView> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let mut request = repos.transfers().lock(request_id).await?;
        request.cancel()?;
        repos.transfers().save(&request, TransferStatus::Pending).await?;

        let mut details = repos.transfers().details(request.id).await?;
        for detail in details.iter_mut() {
            if detail.status == TransferStatus::Pending {
                detail.status = TransferStatus::Cancelled;
                repos
                    .transfers()
                    .save_detail(detail, TransferStatus::Pending)
                    .await?;
            }
        }

        txn.commit().await?;
        Ok(TransferView { request, details })
    }

    pub async fn get_request(&self, request_id: i32) -> DomainResult<TransferView> {
        let repos = Repositories::new(&self.db);
        let request = repos.transfers().get(request_id).await?;
        let details = repos.transfers().details(request.id).await?;
        Ok(TransferView { request, details })
    }

    pub async fn list_requests(
        &self,
        status: Option<TransferStatus>,
    ) -> DomainResult<Vec<TransferRequest>> {
        Repositories::new(&self.db).transfers().list(status).await
    }
}

/// Recompute a request's status from its details and persist a change.
async fn advance_request<C: sea_orm::ConnectionTrait>(
    repos: &Repositories<'_, C>,
    request_id: i32,
) -> DomainResult<TransferRequest> {
    let mut request = repos.transfers().lock(request_id).await?;
    let details = repos.transfers().details(request.id).await?;
    let next = request_status(&details);
    if next != request.status {
        let previous = request.status;
        request.status = next;
        repos.transfers().save(&request, previous).await?;
    }
    Ok(request)
}
