use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use subtrack_core::errors::{DeliveryError, Error, Result};
use subtrack_core::reminders::{ReminderDeliveryTrait, ReminderRequest};
use uuid::Uuid;

/// Delivery layer that only records and logs reminders.
///
/// Stands in for a platform notification service when running headless.
#[derive(Default)]
pub struct LogDelivery {
    pending: Mutex<BTreeMap<String, ReminderRequest>>,
}

impl LogDelivery {
    pub fn pending(&self) -> Result<Vec<ReminderRequest>> {
        let pending = self.pending.lock().map_err(lock_error)?;
        let mut requests: Vec<ReminderRequest> = pending.values().cloned().collect();
        requests.sort_by_key(|r| r.fire_at);
        Ok(requests)
    }
}

fn lock_error<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::Unexpected("reminder store lock poisoned".to_string())
}

#[async_trait]
impl ReminderDeliveryTrait for LogDelivery {
    async fn has_permission(&self) -> Result<bool> {
        Ok(true)
    }

    async fn schedule(&self, request: ReminderRequest) -> Result<String> {
        let reminder_id = Uuid::now_v7().to_string();
        tracing::debug!(
            reminder_id = %reminder_id,
            subscription_id = %request.correlation_id,
            fire_at = %request.fire_at,
            "{}",
            request.body
        );
        self.pending
            .lock()
            .map_err(lock_error)?
            .insert(reminder_id.clone(), request);
        Ok(reminder_id)
    }

    async fn cancel(&self, reminder_id: &str) -> Result<()> {
        match self.pending.lock().map_err(lock_error)?.remove(reminder_id) {
            Some(_) => Ok(()),
            None => Err(DeliveryError::CancelFailed {
                handle: reminder_id.to_string(),
                reason: "no pending reminder with this id".to_string(),
            }
            .into()),
        }
    }

    async fn cancel_all(&self) -> Result<()> {
        let mut pending = self.pending.lock().map_err(lock_error)?;
        tracing::debug!("Dropping {} pending reminders", pending.len());
        pending.clear();
        Ok(())
    }
}
