#[cfg(test)]
mod tests {
    use crate::constants::MIN_REMINDER_LEAD_SECONDS;
    use crate::errors::{DeliveryError, Error, Result};
    use crate::reminders::{
        ReminderDeliveryTrait, ReminderPreferences, ReminderRequest, ReminderScheduler,
    };
    use crate::subscriptions::{Category, Frequency, ReminderSettings, Subscription};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Permission,
        Schedule(DateTime<Utc>),
        Cancel(String),
        CancelAll,
    }

    // --- Mock delivery layer ---
    #[derive(Default)]
    struct MockDelivery {
        calls: Mutex<Vec<Call>>,
        requests: Mutex<Vec<ReminderRequest>>,
        denied: bool,
        /// Permission checks granted before the layer starts refusing
        granted_checks: Option<usize>,
        permission_error: bool,
        fail_schedule_at: HashSet<DateTime<Utc>>,
        fail_all_cancels: bool,
        fail_cancel_all: bool,
    }

    impl MockDelivery {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn requests(&self) -> Vec<ReminderRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReminderDeliveryTrait for MockDelivery {
        async fn has_permission(&self) -> Result<bool> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call::Permission);
            if self.permission_error {
                return Err(
                    DeliveryError::ScheduleFailed("permission query timed out".to_string()).into(),
                );
            }
            let checks = calls.iter().filter(|c| **c == Call::Permission).count();
            Ok(!self.denied && self.granted_checks.map_or(true, |n| checks <= n))
        }

        async fn schedule(&self, request: ReminderRequest) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Schedule(request.fire_at));
            if self.fail_schedule_at.contains(&request.fire_at) {
                return Err(DeliveryError::ScheduleFailed("quota exceeded".to_string()).into());
            }
            let id = format!("n-{}", request.fire_at.format("%Y%m%d%H%M"));
            self.requests.lock().unwrap().push(request);
            Ok(id)
        }

        async fn cancel(&self, reminder_id: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Cancel(reminder_id.to_string()));
            if self.fail_all_cancels {
                return Err(DeliveryError::CancelFailed {
                    handle: reminder_id.to_string(),
                    reason: "unknown handle".to_string(),
                }
                .into());
            }
            Ok(())
        }

        async fn cancel_all(&self) -> Result<()> {
            self.calls.lock().unwrap().push(Call::CancelAll);
            if self.fail_cancel_all {
                return Err(DeliveryError::CancelAllFailed("store locked".to_string()).into());
            }
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 15, 12, 0, 0).unwrap()
    }

    fn create_test_subscription(id: &str, start: NaiveDate, frequency: Frequency) -> Subscription {
        Subscription {
            id: id.to_string(),
            name: format!("Service {}", id),
            start_date: start,
            frequency,
            custom_interval_days: None,
            price: dec!(12.5),
            color: "#4CAF50".to_string(),
            payment_method: None,
            description: None,
            category: Category::Music,
            account: None,
            reminder_settings: ReminderSettings {
                enabled: true,
                days_before_payment: 2,
                notification_time: "10:30".to_string(),
            },
            scheduled_reminder_ids: None,
            next_payment_date: start,
            created_at: start.and_hms_opt(0, 0, 0).unwrap(),
            updated_at: start.and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    fn scheduler(delivery: &Arc<MockDelivery>) -> ReminderScheduler {
        ReminderScheduler::new(delivery.clone())
    }

    #[tokio::test]
    async fn test_schedule_upcoming_returns_chronological_handles() {
        let delivery = Arc::new(MockDelivery::default());
        let sub = create_test_subscription("a", date(2024, 1, 31), Frequency::Monthly);

        let outcome = scheduler(&delivery)
            .schedule_upcoming(&sub, &ReminderPreferences::default(), now())
            .await
            .unwrap();

        assert_eq!(outcome.reminder_ids.len(), 12);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.reminder_ids[0], "n-202402271030");
        assert_eq!(outcome.reminder_ids[1], "n-202403291030");

        let requests = delivery.requests();
        assert!(requests.windows(2).all(|w| w[0].fire_at < w[1].fire_at));
        assert!(requests.iter().all(|r| r.correlation_id == "a"));
        assert_eq!(requests[0].title, "Upcoming payment: Service a");
        assert_eq!(requests[0].body, "2 days left to pay Service a (12,50€).");
        assert_eq!(delivery.calls()[0], Call::Permission);
    }

    #[tokio::test]
    async fn test_disabled_reminders_schedule_nothing() {
        let delivery = Arc::new(MockDelivery::default());
        let mut sub = create_test_subscription("a", date(2024, 1, 31), Frequency::Monthly);
        sub.reminder_settings.enabled = false;

        let outcome = scheduler(&delivery)
            .schedule_upcoming(&sub, &ReminderPreferences::default(), now())
            .await
            .unwrap();
        assert!(outcome.reminder_ids.is_empty());

        sub.reminder_settings.enabled = true;
        let preferences = ReminderPreferences {
            reminders_enabled: false,
            ..ReminderPreferences::default()
        };
        let outcome = scheduler(&delivery)
            .schedule_upcoming(&sub, &preferences, now())
            .await
            .unwrap();
        assert!(outcome.reminder_ids.is_empty());

        let preferences = ReminderPreferences {
            notifications_enabled: false,
            ..ReminderPreferences::default()
        };
        let outcome = scheduler(&delivery)
            .schedule_upcoming(&sub, &preferences, now())
            .await
            .unwrap();
        assert!(outcome.reminder_ids.is_empty());

        assert!(delivery.calls().is_empty());
    }

    #[tokio::test]
    async fn test_permission_denied_propagates() {
        let delivery = Arc::new(MockDelivery {
            denied: true,
            ..MockDelivery::default()
        });
        let sub = create_test_subscription("a", date(2024, 1, 31), Frequency::Monthly);

        let result = scheduler(&delivery)
            .schedule_upcoming(&sub, &ReminderPreferences::default(), now())
            .await;
        assert!(matches!(result, Err(Error::PermissionDenied)));
        assert_eq!(delivery.calls(), vec![Call::Permission]);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_abort_batch() {
        let failing = Utc.with_ymd_and_hms(2024, 3, 29, 10, 30, 0).unwrap();
        let delivery = Arc::new(MockDelivery {
            fail_schedule_at: HashSet::from([failing]),
            ..MockDelivery::default()
        });
        let sub = create_test_subscription("a", date(2024, 1, 31), Frequency::Monthly);

        let outcome = scheduler(&delivery)
            .schedule_upcoming(&sub, &ReminderPreferences::default(), now())
            .await
            .unwrap();

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.reminder_ids.len(), 11);
        assert!(!outcome.reminder_ids.contains(&"n-202403291030".to_string()));
    }

    #[tokio::test]
    async fn test_never_schedules_within_lead_time() {
        let delivery = Arc::new(MockDelivery::default());
        let sub = create_test_subscription("d", date(2024, 2, 1), Frequency::Daily);
        // Tomorrow's payment was reminded yesterday; the one after fires at
        // 10:30 today, thirty seconds from now
        let now = Utc.with_ymd_and_hms(2024, 2, 15, 10, 29, 30).unwrap();

        let outcome = scheduler(&delivery)
            .schedule_upcoming(&sub, &ReminderPreferences::default(), now)
            .await
            .unwrap();

        let limit = now + Duration::seconds(MIN_REMINDER_LEAD_SECONDS);
        assert!(delivery.requests().iter().all(|r| r.fire_at > limit));
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.reminder_ids.len(), 10);
    }

    #[tokio::test]
    async fn test_invalid_recurrence_fails_schedule() {
        let delivery = Arc::new(MockDelivery::default());
        let sub = create_test_subscription("c", date(2024, 1, 1), Frequency::Custom);

        let result = scheduler(&delivery)
            .schedule_upcoming(&sub, &ReminderPreferences::default(), now())
            .await;
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
        assert!(delivery.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reschedule_cancels_everything_before_scheduling() {
        let delivery = Arc::new(MockDelivery {
            fail_all_cancels: true,
            ..MockDelivery::default()
        });
        let mut previous = create_test_subscription("a", date(2024, 1, 31), Frequency::Monthly);
        previous.scheduled_reminder_ids =
            Some(vec!["old-1".to_string(), "old-2".to_string(), "old-3".to_string()]);
        let mut updated = previous.clone();
        updated.frequency = Frequency::Weekly;
        updated.scheduled_reminder_ids = None;

        let outcome = scheduler(&delivery)
            .reschedule_for_edit(&previous, &updated, &ReminderPreferences::default(), now())
            .await
            .unwrap();
        assert_eq!(outcome.reminder_ids.len(), 12);

        let calls = delivery.calls();
        assert_eq!(
            &calls[..3],
            &[
                Call::Cancel("old-1".to_string()),
                Call::Cancel("old-2".to_string()),
                Call::Cancel("old-3".to_string()),
            ]
        );
        assert!(calls[3..]
            .iter()
            .all(|c| matches!(c, Call::Permission | Call::Schedule(_))));
    }

    #[tokio::test]
    async fn test_cancel_all_is_best_effort() {
        let delivery = Arc::new(MockDelivery {
            fail_all_cancels: true,
            ..MockDelivery::default()
        });
        let mut sub = create_test_subscription("a", date(2024, 1, 31), Frequency::Monthly);
        sub.scheduled_reminder_ids = Some(vec!["x".to_string(), "y".to_string()]);

        let summary = scheduler(&delivery).cancel_all(&sub).await;
        assert_eq!(summary.cancelled, 0);
        assert_eq!(summary.failed, 2);

        sub.scheduled_reminder_ids = None;
        let summary = scheduler(&delivery).cancel_all(&sub).await;
        assert_eq!(summary.cancelled + summary.failed, 0);
    }

    #[tokio::test]
    async fn test_rebuild_all_is_sequential_and_tolerant() {
        let delivery = Arc::new(MockDelivery {
            fail_cancel_all: true,
            ..MockDelivery::default()
        });
        let first = create_test_subscription("a", date(2024, 1, 31), Frequency::Monthly);
        let broken = create_test_subscription("b", date(2024, 1, 1), Frequency::Custom);
        let third = create_test_subscription("c", date(2024, 2, 12), Frequency::Weekly);

        let outcome = scheduler(&delivery)
            .with_horizon(3)
            .rebuild_all(
                &[first, broken, third],
                &ReminderPreferences::default(),
                now(),
            )
            .await;

        assert!(!outcome.permission_denied);
        assert_eq!(outcome.total_scheduled(), 6);
        let rebuilt = outcome.rebuilt;
        assert_eq!(rebuilt.len(), 3);
        assert_eq!(rebuilt[0].subscription_id, "a");
        assert_eq!(rebuilt[0].reminders.reminder_ids.len(), 3);
        assert!(rebuilt[1].reminders.reminder_ids.is_empty());
        assert_eq!(rebuilt[2].reminders.reminder_ids.len(), 3);

        let calls = delivery.calls();
        assert_eq!(calls[0], Call::CancelAll);
        // All of "a" is submitted before anything of "c"
        let requests = delivery.requests();
        let correlation: Vec<&str> = requests.iter().map(|r| r.correlation_id.as_str()).collect();
        assert_eq!(correlation, vec!["a", "a", "a", "c", "c", "c"]);
    }

    #[tokio::test]
    async fn test_permission_query_failure_is_a_delivery_error() {
        let delivery = Arc::new(MockDelivery {
            permission_error: true,
            ..MockDelivery::default()
        });
        let sub = create_test_subscription("a", date(2024, 1, 31), Frequency::Monthly);

        let result = scheduler(&delivery)
            .schedule_upcoming(&sub, &ReminderPreferences::default(), now())
            .await;
        assert!(matches!(
            result,
            Err(Error::Delivery(DeliveryError::ScheduleFailed(_)))
        ));
        assert!(delivery.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rebuild_all_keeps_earlier_lists_when_permission_is_revoked() {
        let delivery = Arc::new(MockDelivery {
            granted_checks: Some(1),
            ..MockDelivery::default()
        });
        let subscriptions = [
            create_test_subscription("a", date(2024, 1, 31), Frequency::Monthly),
            create_test_subscription("b", date(2024, 1, 20), Frequency::Monthly),
            create_test_subscription("c", date(2024, 2, 12), Frequency::Weekly),
        ];

        let outcome = scheduler(&delivery)
            .with_horizon(3)
            .rebuild_all(&subscriptions, &ReminderPreferences::default(), now())
            .await;

        assert!(outcome.permission_denied);
        let ids: Vec<&str> = outcome
            .rebuilt
            .iter()
            .map(|r| r.subscription_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(outcome.rebuilt[0].reminders.reminder_ids.len(), 3);
        assert!(outcome.rebuilt[1].reminders.reminder_ids.is_empty());
        assert!(outcome.rebuilt[2].reminders.reminder_ids.is_empty());

        // "c" is never asked about once "b" was refused
        let permission_checks = delivery
            .calls()
            .iter()
            .filter(|c| **c == Call::Permission)
            .count();
        assert_eq!(permission_checks, 2);
        assert!(delivery.requests().iter().all(|r| r.correlation_id == "a"));
    }
}
