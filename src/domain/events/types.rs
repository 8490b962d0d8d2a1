//! Notification events
//!
//! Defines all event types that can be broadcasted to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    BatteryReserved(BatteryEvent),
    BatteryAvailable(BatteryEvent),
    SlotReserved(SlotEvent),
    SlotAvailable(SlotEvent),
    PaymentConfirmed(PaymentConfirmedEvent),
    PaymentFailed(PaymentFailedEvent),
    BookingStatusChanged(BookingStatusChangedEvent),
}

/// Named subscription channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Battery,
    Slot,
    Payment,
    Booking,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Battery => "battery",
            Channel::Slot => "slot",
            Channel::Payment => "payment",
            Channel::Booking => "booking",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "battery" => Some(Channel::Battery),
            "slot" => Some(Channel::Slot),
            "payment" => Some(Channel::Payment),
            "booking" => Some(Channel::Booking),
            _ => None,
        }
    }
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::BatteryReserved(_) => "battery_reserved",
            Event::BatteryAvailable(_) => "battery_available",
            Event::SlotReserved(_) => "slot_reserved",
            Event::SlotAvailable(_) => "slot_available",
            Event::PaymentConfirmed(_) => "payment_confirmed",
            Event::PaymentFailed(_) => "payment_failed",
            Event::BookingStatusChanged(_) => "booking_status_changed",
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Event::BatteryReserved(_) | Event::BatteryAvailable(_) => Channel::Battery,
            Event::SlotReserved(_) | Event::SlotAvailable(_) => Channel::Slot,
            Event::PaymentConfirmed(_) | Event::PaymentFailed(_) => Channel::Payment,
            Event::BookingStatusChanged(_) => Channel::Booking,
        }
    }

    /// Station the event concerns, if any
    pub fn station_id(&self) -> Option<i32> {
        match self {
            Event::BatteryReserved(e) | Event::BatteryAvailable(e) => Some(e.station_id),
            Event::SlotReserved(e) | Event::SlotAvailable(e) => Some(e.station_id),
            Event::BookingStatusChanged(e) => Some(e.station_id),
            Event::PaymentConfirmed(_) | Event::PaymentFailed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryEvent {
    pub battery_id: i32,
    pub station_id: i32,
    pub booking_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotEvent {
    pub slot_id: i32,
    pub station_id: i32,
    pub battery_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmedEvent {
    pub transaction_id: i32,
    pub booking_id: Option<i32>,
    pub user_membership_id: Option<i32>,
    pub status: String,
    pub total_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailedEvent {
    pub transaction_id: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusChangedEvent {
    pub booking_id: i32,
    pub station_id: i32,
    pub status: String,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_tagged_json() {
        let msg = EventMessage::new(Event::BatteryReserved(BatteryEvent {
            battery_id: 7,
            station_id: 2,
            booking_id: Some(42),
        }));
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "battery_reserved");
        assert_eq!(json["data"]["batteryId"], 7);
        assert_eq!(json["data"]["stationId"], 2);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn channels() {
        let e = Event::PaymentFailed(PaymentFailedEvent {
            transaction_id: 1,
            reason: "CANCELLED".into(),
        });
        assert_eq!(e.channel(), Channel::Payment);
        assert_eq!(e.station_id(), None);
        assert_eq!(Channel::parse(" Slot "), Some(Channel::Slot));
        assert_eq!(Channel::parse("charger"), None);
    }
}
