//! QR login sessions
//!
//! A logged-out screen shows a QR code for a fresh session id. A device
//! where the user is already signed in approves the session, which attaches
//! a new token; the screen polls and receives that token exactly once.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone)]
pub struct QrLoginConfig {
    pub ttl: Duration,
    pub max_sessions: usize,
}

impl Default for QrLoginConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(120),
            max_sessions: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrSessionStatus {
    Pending,
    Approved,
    Expired,
}

impl QrSessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Expired => "EXPIRED",
        }
    }
}

/// What a poll returns. `token` is set only on the poll that consumes
/// an approved session.
#[derive(Debug, Clone)]
pub struct QrPoll {
    pub status: QrSessionStatus,
    pub token: Option<String>,
    pub user_id: Option<i32>,
}

#[derive(Debug)]
struct QrSession {
    expires_at: Instant,
    approval: Option<(i32, String)>,
}

/// Bounded, TTL-evicted cache of QR login sessions
pub struct QrLoginSessions {
    sessions: DashMap<Uuid, QrSession>,
    config: QrLoginConfig,
}

impl QrLoginSessions {
    pub fn new(config: QrLoginConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    pub fn shared(config: QrLoginConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Open a pending session. When the cache is full, expired sessions
    /// are evicted first; if it is still full the request is refused.
    pub fn create(&self) -> DomainResult<Uuid> {
        if self.sessions.len() >= self.config.max_sessions {
            self.evict_expired();
            if self.sessions.len() >= self.config.max_sessions {
                return Err(DomainError::Conflict(
                    "Too many pending QR login sessions".to_string(),
                ));
            }
        }

        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            QrSession {
                expires_at: Instant::now() + self.config.ttl,
                approval: None,
            },
        );
        debug!(session_id = %id, "QR login session created");
        Ok(id)
    }

    /// Attach `token` issued for `user_id` to a pending session.
    pub fn approve(&self, id: Uuid, user_id: i32, token: String) -> DomainResult<()> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("QrLoginSession", id))?;
        if session.expires_at <= Instant::now() {
            return Err(DomainError::bad_request("QR login session has expired"));
        }
        if session.approval.is_some() {
            return Err(DomainError::bad_request("QR login session is already approved"));
        }
        session.approval = Some((user_id, token));
        info!(session_id = %id, user_id, "QR login approved");
        Ok(())
    }

    /// Check a session. An approved session is removed as its token is
    /// handed out; an expired one is removed and reported as such.
    pub fn poll(&self, id: Uuid) -> DomainResult<QrPoll> {
        let now = Instant::now();
        let expired = self
            .sessions
            .remove_if(&id, |_, s| s.expires_at <= now)
            .is_some();
        if expired {
            return Ok(QrPoll {
                status: QrSessionStatus::Expired,
                token: None,
                user_id: None,
            });
        }

        if let Some((_, session)) = self.sessions.remove_if(&id, |_, s| s.approval.is_some()) {
            let (user_id, token) = session.approval.unzip();
            return Ok(QrPoll {
                status: QrSessionStatus::Approved,
                token,
                user_id,
            });
        }

        if self.sessions.contains_key(&id) {
            Ok(QrPoll {
                status: QrSessionStatus::Pending,
                token: None,
                user_id: None,
            })
        } else {
            Err(DomainError::not_found("QrLoginSession", id))
        }
    }

    /// Drop expired sessions, returning how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at > now);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!(evicted, "Evicted expired QR login sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions(max: usize) -> QrLoginSessions {
        QrLoginSessions::new(QrLoginConfig {
            ttl: Duration::from_secs(60),
            max_sessions: max,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn approved_token_is_handed_out_once() {
        let qr = sessions(4);
        let id = qr.create().unwrap();
        assert_eq!(qr.poll(id).unwrap().status, QrSessionStatus::Pending);

        qr.approve(id, 7, "jwt".to_string()).unwrap();
        let poll = qr.poll(id).unwrap();
        assert_eq!(poll.status, QrSessionStatus::Approved);
        assert_eq!(poll.token.as_deref(), Some("jwt"));
        assert_eq!(poll.user_id, Some(7));

        assert!(matches!(qr.poll(id), Err(DomainError::NotFound { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_sessions_cannot_be_approved() {
        let qr = sessions(4);
        let id = qr.create().unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(qr.approve(id, 7, "jwt".to_string()).is_err());
        assert_eq!(qr.poll(id).unwrap().status, QrSessionStatus::Expired);
        assert!(qr.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_evicts_expired_before_refusing() {
        let qr = sessions(2);
        qr.create().unwrap();
        qr.create().unwrap();
        assert!(matches!(qr.create(), Err(DomainError::Conflict(_))));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(qr.create().is_ok());
        assert_eq!(qr.len(), 1);
    }
}
