//! Notification stream for station screens and driver apps
//!
//! `GET /api/v1/notifications/ws?channels=battery,slot&station_id=3`
//! streams every bus event matching the filter as a JSON text frame.

use std::collections::HashSet;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::select;
use tracing::{debug, info, warn};
use utoipa::IntoParams;

use crate::application::events::EventMessage;
use crate::domain::events::Channel;
use crate::domain::DomainError;
use crate::interfaces::http::common::ApiError;
use crate::interfaces::http::state::ApiState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NotificationQuery {
    /// Comma-separated: battery, slot, payment, booking. All when omitted.
    pub channels: Option<String>,
    /// Only events about this station
    pub station_id: Option<i32>,
}

/// Parsed subscription filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    /// Empty means every channel
    pub channels: HashSet<Channel>,
    pub station_id: Option<i32>,
}

impl EventFilter {
    pub fn from_query(query: &NotificationQuery) -> Result<Self, DomainError> {
        let mut channels = HashSet::new();
        if let Some(list) = &query.channels {
            for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let channel = Channel::parse(name).ok_or_else(|| {
                    DomainError::bad_request(format!("Unknown channel: {}", name))
                })?;
                channels.insert(channel);
            }
        }
        Ok(Self {
            channels,
            station_id: query.station_id,
        })
    }

    /// With a station filter, events that name no station are dropped.
    pub fn matches(&self, message: &EventMessage) -> bool {
        if !self.channels.is_empty() && !self.channels.contains(&message.event.channel()) {
            return false;
        }
        match self.station_id {
            Some(wanted) => message.event.station_id() == Some(wanted),
            None => true,
        }
    }

    fn channel_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.channels.iter().map(Channel::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/ws",
    tag = "Notifications",
    params(NotificationQuery),
    responses(
        (status = 101, description = "Switching to WebSocket"),
        (status = 400, description = "Unknown channel")
    )
)]
pub async fn ws_notifications_handler(
    ws: WebSocketUpgrade,
    State(state): State<ApiState>,
    Query(query): Query<NotificationQuery>,
) -> Response {
    let filter = match EventFilter::from_query(&query) {
        Ok(filter) => filter,
        Err(e) => return ApiError(e).into_response(),
    };
    info!(
        channels = ?filter.channel_names(),
        station_id = ?filter.station_id,
        "Notification client connecting"
    );
    ws.on_upgrade(move |socket| handle_notification_socket(socket, state, filter))
}

async fn handle_notification_socket(socket: WebSocket, state: ApiState, filter: EventFilter) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriber = state.services.events.subscribe();

    let welcome = serde_json::json!({
        "type": "connected",
        "message": "Connected to notification stream",
        "filter": {
            "channels": filter.channel_names(),
            "station_id": filter.station_id,
        }
    });
    if let Err(e) = sender.send(Message::Text(welcome.to_string().into())).await {
        warn!(error = %e, "Failed to send welcome message");
        return;
    }

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(error = %e, "Notification socket error");
                        break;
                    }
                    // Clients do not talk back.
                    Some(Ok(_)) => {}
                }
            }

            event = subscriber.recv() => {
                let Some(message) = event else {
                    warn!("Event bus closed");
                    break;
                };
                if !filter.matches(&message) {
                    continue;
                }
                match serde_json::to_string(&message) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(
                        error = %e,
                        event = message.event.event_type(),
                        "Failed to serialize event"
                    ),
                }
            }
        }
    }

    info!("Notification client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::{BatteryEvent, Event, PaymentFailedEvent};

    fn battery_event(station_id: i32) -> EventMessage {
        EventMessage::new(Event::BatteryReserved(BatteryEvent {
            battery_id: 7,
            station_id,
            booking_id: Some(42),
        }))
    }

    fn payment_event() -> EventMessage {
        EventMessage::new(Event::PaymentFailed(PaymentFailedEvent {
            transaction_id: 1,
            reason: "CANCELLED".into(),
        }))
    }

    fn filter(channels: Option<&str>, station_id: Option<i32>) -> EventFilter {
        EventFilter::from_query(&NotificationQuery {
            channels: channels.map(String::from),
            station_id,
        })
        .unwrap()
    }

    #[test]
    fn empty_filter_passes_everything() {
        let f = filter(None, None);
        assert!(f.matches(&battery_event(1)));
        assert!(f.matches(&payment_event()));
    }

    #[test]
    fn channels_narrow_the_stream() {
        let f = filter(Some("payment, booking"), None);
        assert!(!f.matches(&battery_event(1)));
        assert!(f.matches(&payment_event()));
    }

    #[test]
    fn station_filter_drops_stationless_events() {
        let f = filter(None, Some(3));
        assert!(f.matches(&battery_event(3)));
        assert!(!f.matches(&battery_event(4)));
        assert!(!f.matches(&payment_event()));
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let query = NotificationQuery {
            channels: Some("battery,weather".into()),
            station_id: None,
        };
        assert!(EventFilter::from_query(&query).is_err());
    }
}
