//! Order submission service.
//!
//! Every order ends up somewhere: either the endpoint acknowledges it, or it is
//! logged in full and appended to the local backup. The customer sees a
//! confirmation in both cases.

use std::{fmt, sync::Arc, time::Duration};

use bakehouse::orders::{DeferralReason, Order, SubmissionOutcome};
use jiff::tz::TimeZone;
use tracing::{error, info, warn};

use crate::{
    backup::{FileStorage, OrderBackupStore},
    config::{backup::BackupConfig, submission::SubmissionConfig},
    submission::{
        endpoint::{DispatchError, FormEndpointClient, OrderDispatcher},
        payload::OrderSubmission,
    },
};

/// Bounded retry for transient endpoint failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per order, including the first
    pub max_attempts: u32,

    /// Delay before the first retry; doubles for each retry after that
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16);

        self.initial_backoff.saturating_mul(1 << doublings)
    }
}

/// Hands orders to the endpoint, falling back to the local backup.
pub struct OrderSubmissionService {
    dispatcher: Option<Arc<dyn OrderDispatcher>>,
    backups: OrderBackupStore,
    retry: RetryPolicy,
    time_zone: TimeZone,
}

impl fmt::Debug for OrderSubmissionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderSubmissionService")
            .field("endpoint_configured", &self.dispatcher.is_some())
            .field("backups", &self.backups)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl OrderSubmissionService {
    /// Service delivering through `dispatcher`; `None` backs every order up locally.
    pub fn new(
        dispatcher: Option<Arc<dyn OrderDispatcher>>,
        backups: OrderBackupStore,
        retry: RetryPolicy,
        time_zone: TimeZone,
    ) -> Self {
        Self {
            dispatcher,
            backups,
            retry,
            time_zone,
        }
    }

    /// Build the service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(
        submission: &SubmissionConfig,
        backup: &BackupConfig,
    ) -> Result<Self, DispatchError> {
        let dispatcher = match submission.endpoint() {
            Some(url) => {
                let client = FormEndpointClient::new(
                    url,
                    submission.order_endpoint_kind,
                    submission.order_notify_cc.clone(),
                    submission.timeout(),
                )?;

                Some(Arc::new(client) as Arc<dyn OrderDispatcher>)
            }
            None => {
                warn!("ORDER_ENDPOINT_URL is not set, orders will only be backed up locally");

                None
            }
        };

        let backups = OrderBackupStore::new(
            Arc::new(FileStorage::new(&backup.backup_dir)),
            backup.backup_max_entries,
        );

        Ok(Self::new(
            dispatcher,
            backups,
            submission.retry_policy(),
            submission.time_zone(),
        ))
    }

    /// Local backup used for fallback
    pub fn backups(&self) -> &OrderBackupStore {
        &self.backups
    }

    /// Submit `order`. Never fails; undelivered orders are deferred.
    pub async fn submit(&self, order: &Order) -> SubmissionOutcome {
        let submission = OrderSubmission::from_order(order, &self.time_zone);

        let reason = match &self.dispatcher {
            None => DeferralReason::EndpointNotConfigured,
            Some(dispatcher) => match self.dispatch_with_retry(dispatcher.as_ref(), &submission).await
            {
                Ok(()) => {
                    info!(
                        reference_number = %submission.reference_number,
                        "order delivered to endpoint"
                    );

                    return SubmissionOutcome::Delivered;
                }
                Err(error) => DeferralReason::DeliveryFailed(error.to_string()),
            },
        };

        self.fall_back(&submission, &reason);

        SubmissionOutcome::Deferred(reason)
    }

    async fn dispatch_with_retry(
        &self,
        dispatcher: &dyn OrderDispatcher,
        submission: &OrderSubmission,
    ) -> Result<(), DispatchError> {
        let mut attempt = 1;

        loop {
            match dispatcher.dispatch(submission).await {
                Ok(()) => return Ok(()),
                Err(error) if error.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);

                    warn!(
                        reference_number = %submission.reference_number,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "order submission failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(
                        reference_number = %submission.reference_number,
                        attempt,
                        %error,
                        "order submission failed"
                    );

                    return Err(error);
                }
            }
        }
    }

    fn fall_back(&self, submission: &OrderSubmission, reason: &DeferralReason) {
        warn!(
            %reason,
            reference_number = %submission.reference_number,
            customer_name = %submission.customer_name,
            customer_phone = %submission.customer_phone,
            customer_address = submission.customer_address.as_deref(),
            customer_notes = submission.customer_notes.as_deref(),
            delivery_option = %submission.delivery_option,
            order_items = %submission.order_items,
            subtotal = %submission.subtotal,
            delivery_fee = %submission.delivery_fee,
            total_amount = %submission.total_amount,
            order_date = %submission.order_date,
            order_time = %submission.order_time,
            summary = %submission.summary_message(),
            "new order requires manual processing"
        );

        match self.backups.append(submission) {
            Ok(()) => info!(
                reference_number = %submission.reference_number,
                "order saved to local backup"
            ),
            Err(error) => error!(
                reference_number = %submission.reference_number,
                %error,
                "failed to save order to local backup"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicU32, Ordering},
        time::Instant,
    };

    use axum::{Router, http::StatusCode, routing::post};
    use bakehouse::delivery::DeliveryOption;
    use testresult::TestResult;
    use tokio::net::TcpListener;

    use super::*;
    use crate::{
        backup::{MemoryStorage, MockKeyValueStorage, StorageError},
        config::submission::EndpointKind,
        submission::{endpoint::MockOrderDispatcher, payload::tests::sample_order},
    };

    async fn serve_hanging_endpoint(hits: Arc<AtomicU32>) -> TestResult<String> {
        let router = Router::new().route(
            "/orders",
            post(move || {
                let hits = Arc::clone(&hits);

                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(30)).await;

                    StatusCode::OK
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            _ = axum::serve(listener, router).await;
        });

        Ok(format!("http://{addr}/orders"))
    }

    fn client_service(
        url: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> TestResult<OrderSubmissionService> {
        let client = FormEndpointClient::new(url, EndpointKind::Formspree, None, timeout)?;

        Ok(OrderSubmissionService::new(
            Some(Arc::new(client) as Arc<dyn OrderDispatcher>),
            memory_backups(),
            retry,
            TimeZone::UTC,
        ))
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
        }
    }

    fn memory_backups() -> OrderBackupStore {
        OrderBackupStore::new(Arc::new(MemoryStorage::new()), 0)
    }

    fn service(dispatcher: Option<MockOrderDispatcher>, backups: OrderBackupStore) -> OrderSubmissionService {
        OrderSubmissionService::new(
            dispatcher.map(|mock| Arc::new(mock) as Arc<dyn OrderDispatcher>),
            backups,
            fast_retry(),
            TimeZone::UTC,
        )
    }

    #[test]
    fn backoff_doubles_per_retry() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff(3), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn delivered_orders_are_not_backed_up() -> TestResult {
        let mut dispatcher = MockOrderDispatcher::new();

        dispatcher
            .expect_dispatch()
            .once()
            .withf(|submission| submission.reference_number == "AWA-QRS-2024")
            .returning(|_| Ok(()));

        let service = service(Some(dispatcher), memory_backups());
        let outcome = service.submit(&sample_order(DeliveryOption::Pickup)?).await;

        assert_eq!(outcome, SubmissionOutcome::Delivered);
        assert!(service.backups().list()?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn missing_endpoint_backs_up_exactly_once() -> TestResult {
        let service = service(None, memory_backups());
        let order = sample_order(DeliveryOption::Delivery)?;

        let outcome = service.submit(&order).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Deferred(DeferralReason::EndpointNotConfigured)
        );
        assert!(outcome.is_success());

        let records = service.backups().list()?;
        let matching: Vec<_> = records
            .iter()
            .filter(|record| record.submission.reference_number == order.reference_number().as_str())
            .collect();

        assert_eq!(matching.len(), 1);
        assert!(matching.iter().all(|record| record.timestamp >= order.submitted_at()));
        assert_eq!(
            matching
                .first()
                .and_then(|record| record.submission.customer_address.clone()),
            Some("12 Digbeth High St".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() -> TestResult {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&calls);
        let mut dispatcher = MockOrderDispatcher::new();

        dispatcher.expect_dispatch().times(2).returning(move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DispatchError::Status {
                    status: 503,
                    body: String::new(),
                })
            } else {
                Ok(())
            }
        });

        let service = service(Some(dispatcher), memory_backups());
        let outcome = service.submit(&sample_order(DeliveryOption::Pickup)?).await;

        assert_eq!(outcome, SubmissionOutcome::Delivered);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(service.backups().list()?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn retries_stop_at_max_attempts_then_fall_back() -> TestResult {
        let mut dispatcher = MockOrderDispatcher::new();

        dispatcher.expect_dispatch().times(3).returning(|_| {
            Err(DispatchError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        });

        let service = service(Some(dispatcher), memory_backups());
        let outcome = service.submit(&sample_order(DeliveryOption::Pickup)?).await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Deferred(DeferralReason::DeliveryFailed(_))
        ));
        assert_eq!(service.backups().list()?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn rejections_are_not_retried() -> TestResult {
        let mut dispatcher = MockOrderDispatcher::new();

        dispatcher
            .expect_dispatch()
            .once()
            .returning(|_| Err(DispatchError::Rejected("form disabled".to_string())));

        let service = service(Some(dispatcher), memory_backups());
        let outcome = service.submit(&sample_order(DeliveryOption::Pickup)?).await;

        assert!(
            matches!(&outcome, SubmissionOutcome::Deferred(DeferralReason::DeliveryFailed(reason)) if reason.contains("form disabled"))
        );
        assert_eq!(service.backups().list()?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn hung_endpoint_times_out_into_backup() -> TestResult {
        let hits = Arc::new(AtomicU32::new(0));
        let url = serve_hanging_endpoint(Arc::clone(&hits)).await?;
        let service = client_service(
            &url,
            Duration::from_millis(200),
            RetryPolicy {
                max_attempts: 2,
                initial_backoff: Duration::from_millis(1),
            },
        )?;

        let started = Instant::now();
        let outcome = service.submit(&sample_order(DeliveryOption::Pickup)?).await;
        let elapsed = started.elapsed();

        assert!(matches!(
            outcome,
            SubmissionOutcome::Deferred(DeferralReason::DeliveryFailed(_))
        ));
        assert_eq!(service.backups().list()?.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");

        Ok(())
    }

    #[tokio::test]
    async fn malformed_endpoint_url_falls_back_without_retrying() -> TestResult {
        let service = client_service(
            "not a url",
            Duration::from_secs(1),
            RetryPolicy {
                max_attempts: 3,
                initial_backoff: Duration::from_secs(2),
            },
        )?;

        let started = Instant::now();
        let outcome = service.submit(&sample_order(DeliveryOption::Pickup)?).await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Deferred(DeferralReason::DeliveryFailed(_))
        ));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(service.backups().list()?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn backup_failure_still_reports_success() -> TestResult {
        let mut storage = MockKeyValueStorage::new();

        storage.expect_get().returning(|_| Ok(None));
        storage.expect_set().once().returning(|key, _| {
            Err(StorageError::InvalidKey(key.to_string()))
        });

        let backups = OrderBackupStore::new(Arc::new(storage), 0);
        let service = service(None, backups);
        let outcome = service.submit(&sample_order(DeliveryOption::Pickup)?).await;

        assert!(outcome.is_success());
        assert!(!outcome.is_delivered());

        Ok(())
    }
}
