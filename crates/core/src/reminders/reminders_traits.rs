use async_trait::async_trait;

use super::ReminderRequest;
use crate::errors::Result;

/// Platform notification layer that actually delivers reminders.
///
/// Every call may fail independently; the scheduler treats a failed
/// `schedule`/`cancel` as non-fatal for the batch it belongs to.
#[async_trait]
pub trait ReminderDeliveryTrait: Send + Sync {
    /// Whether reminders may currently be shown.
    async fn has_permission(&self) -> Result<bool>;

    /// Schedules one reminder and returns its opaque handle.
    async fn schedule(&self, request: ReminderRequest) -> Result<String>;

    /// Cancels a reminder previously returned by `schedule`.
    async fn cancel(&self, reminder_id: &str) -> Result<()>;

    /// Cancels every reminder this application has scheduled.
    async fn cancel_all(&self) -> Result<()>;
}
