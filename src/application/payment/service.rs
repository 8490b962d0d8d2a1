//! Payment settlement
//!
//! Gateway outcomes arrive by webhook or by an explicit status sync; both end
//! in `settle`, which is a no-op for transactions that are no longer pending.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument, warn};

use crate::application::actor::Actor;
use crate::application::booking::close_booking;
use crate::application::events::SharedEventBus;
use crate::application::ports::{GatewayError, PaymentGateway, PaymentLinkRequest};
use crate::application::workflow::finish;
use crate::domain::events::{Event, PaymentConfirmedEvent, PaymentFailedEvent};
use crate::domain::payment::PaymentOutcome;
use crate::domain::{
    BookingDetailStatus, BookingStatus, DomainError, DomainResult, MembershipStatus,
    PaymentTransaction, TransactionKind, TransactionStatus,
};
use crate::infrastructure::database::Repositories;
use crate::shared::{retry_with_backoff, RetryConfig};

/// Where the gateway sends the payer back to
#[derive(Debug, Clone, Default)]
pub struct CheckoutUrls {
    pub return_url: String,
    pub cancel_url: String,
}

pub struct PaymentService {
    db: DatabaseConnection,
    events: SharedEventBus,
    gateway: Arc<dyn PaymentGateway>,
    urls: CheckoutUrls,
    retry: RetryConfig,
}

fn gateway_error(e: GatewayError) -> DomainError {
    match e {
        GatewayError::InvalidSignature => DomainError::bad_request("Invalid webhook signature"),
        GatewayError::NotConfigured => {
            DomainError::bad_request("Payment gateway is not configured")
        }
        GatewayError::Rejected { code, message } => DomainError::bad_request(format!(
            "Payment gateway rejected request ({}): {}",
            code, message
        )),
        GatewayError::Transport(msg) => DomainError::Internal(format!("Payment gateway: {}", msg)),
    }
}

impl PaymentService {
    pub fn new(
        db: DatabaseConnection,
        events: SharedEventBus,
        gateway: Arc<dyn PaymentGateway>,
        urls: CheckoutUrls,
    ) -> Self {
        Self {
            db,
            events,
            gateway,
            urls,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Ask the gateway for a checkout link and remember it on the
    /// transaction. Failures are logged; the caller's operation stands.
    pub async fn request_link(&self, transaction_id: i32, description: &str) -> Option<String> {
        match self.create_link(transaction_id, description).await {
            Ok(url) => Some(url),
            Err(DomainError::BadRequest(reason)) => {
                debug!(transaction_id, reason = %reason, "No payment link issued");
                None
            }
            Err(e) => {
                warn!(transaction_id, error = %e, "Failed to get payment link");
                None
            }
        }
    }

    async fn create_link(&self, transaction_id: i32, description: &str) -> DomainResult<String> {
        let repos = Repositories::new(&self.db);
        let transaction = repos.payments().get(transaction_id).await?;
        if !transaction.is_pending() {
            return Err(DomainError::bad_request(format!(
                "Transaction {} is already {}",
                transaction.id, transaction.status
            )));
        }

        let request = PaymentLinkRequest {
            order_code: transaction.order_code,
            amount: transaction.amount,
            // The gateway limits descriptions to 25 characters.
            description: description.chars().take(25).collect(),
            return_url: self.urls.return_url.clone(),
            cancel_url: self.urls.cancel_url.clone(),
        };

        let link = retry_with_backoff(
            self.retry.clone(),
            || self.gateway.create_payment_link(request.clone()),
            GatewayError::is_transient,
            "create_payment_link",
        )
        .await
        .map_err(gateway_error)?;

        repos
            .payments()
            .set_checkout_url(transaction.id, &link.checkout_url)
            .await?;
        Ok(link.checkout_url)
    }

    /// Re-issue the checkout link of a pending transaction.
    pub async fn renew_link(&self, transaction_id: i32, actor: Actor) -> DomainResult<String> {
        let transaction = Repositories::new(&self.db)
            .payments()
            .get(transaction_id)
            .await?;
        actor.require_owner_or_staff(transaction.user_id)?;
        let description = format!("EVSWAP {}", transaction.order_code % 1_000_000);
        finish("payment_link", self.create_link(transaction_id, &description).await)
    }

    pub async fn get_transaction(
        &self,
        transaction_id: i32,
        actor: Actor,
    ) -> DomainResult<PaymentTransaction> {
        let transaction = Repositories::new(&self.db)
            .payments()
            .get(transaction_id)
            .await?;
        actor.require_owner_or_staff(transaction.user_id)?;
        Ok(transaction)
    }

    /// Verified gateway callback.
    #[instrument(skip(self, payload))]
    pub async fn handle_webhook(
        &self,
        payload: &serde_json::Value,
    ) -> DomainResult<PaymentTransaction> {
        let data = self.gateway.verify_webhook(payload).map_err(gateway_error);
        let data = finish("payment_webhook", data)?;
        let outcome = if data.is_success() {
            PaymentOutcome::Paid
        } else {
            PaymentOutcome::Failed
        };
        info!(order_code = data.order_code, ?outcome, "Payment webhook received");
        let result = self
            .apply(
                data.order_code,
                outcome,
                &data.description,
                Some(data.amount),
                Utc::now(),
            )
            .await;
        let (transaction, events) = finish("payment_settle", result)?;
        self.events.publish_all(events);
        Ok(transaction)
    }

    /// Ask the gateway for the current state of `order_code` and apply it.
    #[instrument(skip(self))]
    pub async fn sync_status(&self, order_code: i64) -> DomainResult<PaymentTransaction> {
        let info = self
            .gateway
            .get_payment_link_information(order_code)
            .await
            .map_err(gateway_error);
        let info = finish("payment_sync", info)?;
        let outcome = PaymentOutcome::from_gateway(&info.status);
        self.settle(order_code, outcome, &info.status, Utc::now()).await
    }

    /// Apply a gateway outcome to the transaction and what it pays for.
    pub async fn settle(
        &self,
        order_code: i64,
        outcome: PaymentOutcome,
        reason: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<PaymentTransaction> {
        let result = self.apply(order_code, outcome, reason, None, now).await;
        let (transaction, events) = finish("payment_settle", result)?;
        self.events.publish_all(events);
        Ok(transaction)
    }

    /// `paid_amount` is what the gateway reports; a payment that does not
    /// cover the transaction exactly is refused and the transaction stays
    /// pending.
    async fn apply(
        &self,
        order_code: i64,
        outcome: PaymentOutcome,
        reason: &str,
        paid_amount: Option<i64>,
        now: DateTime<Utc>,
    ) -> DomainResult<(PaymentTransaction, Vec<Event>)> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let mut transaction = repos.payments().lock_by_order_code(order_code).await?;
        let settled = match outcome.settled_status() {
            Some(status) if transaction.is_pending() => status,
            _ => {
                debug!(order_code, status = %transaction.status, "Nothing to settle");
                return Ok((transaction, Vec::new()));
            }
        };
        if settled == TransactionStatus::Paid {
            if let Some(amount) = paid_amount.filter(|a| *a != transaction.amount) {
                warn!(
                    order_code,
                    paid = amount,
                    expected = transaction.amount,
                    "Paid amount does not match the transaction"
                );
                return Err(DomainError::bad_request(format!(
                    "Paid amount {} does not match transaction amount {}",
                    amount, transaction.amount
                )));
            }
        }
        transaction.status = settled;
        repos
            .payments()
            .save_status(&transaction, TransactionStatus::Pending)
            .await?;

        let mut events = Vec::new();
        let mut booking_id = None;
        let mut user_membership_id = None;

        match transaction.kind {
            TransactionKind::Booking => {
                let booking = repos.bookings().find_by_transaction(transaction.id).await?;
                if let Some(mut booking) = booking {
                    booking_id = Some(booking.id);
                    if settled == TransactionStatus::Paid {
                        if booking.status == BookingStatus::Pending {
                            booking.confirm_payment()?;
                            repos.bookings().save(&booking, BookingStatus::Pending).await?;
                            for mut detail in repos.bookings().details(booking.id).await? {
                                if detail.status == BookingDetailStatus::Pending {
                                    detail.status = BookingDetailStatus::Reserved;
                                    repos
                                        .bookings()
                                        .save_detail(&detail, BookingDetailStatus::Pending)
                                        .await?;
                                }
                            }
                        } else {
                            warn!(
                                booking_id = booking.id,
                                status = %booking.status,
                                "Payment received for a booking that is no longer pending"
                            );
                        }
                    } else if booking.status.is_open() {
                        let released =
                            close_booking(&repos, &mut booking, BookingStatus::Cancelled).await?;
                        events.extend(released);
                    }
                }
            }
            TransactionKind::Membership => {
                let membership = repos.memberships().find_by_transaction(transaction.id).await?;
                if let Some(read) = membership {
                    user_membership_id = Some(read.id);
                    if read.status == MembershipStatus::Pending {
                        let mut membership = read.clone();
                        if settled == TransactionStatus::Paid {
                            let plan = repos.memberships().get_plan(membership.plan_id).await?;
                            membership.activate(&plan, now)?;
                        } else {
                            membership.status = MembershipStatus::Cancelled;
                        }
                        repos.memberships().save(&membership, &read).await?;
                    }
                }
            }
        }

        txn.commit().await?;

        if settled == TransactionStatus::Paid {
            info!(
                transaction_id = transaction.id,
                ?booking_id,
                ?user_membership_id,
                "Payment confirmed"
            );
            events.push(Event::PaymentConfirmed(PaymentConfirmedEvent {
                transaction_id: transaction.id,
                booking_id,
                user_membership_id,
                status: transaction.status.to_string(),
                total_price: transaction.amount,
            }));
        } else {
            info!(transaction_id = transaction.id, status = %settled, "Payment not completed");
            events.push(Event::PaymentFailed(PaymentFailedEvent {
                transaction_id: transaction.id,
                reason: if reason.is_empty() {
                    settled.to_string()
                } else {
                    reason.to_string()
                },
            }));
        }

        Ok((transaction, events))
    }
}
