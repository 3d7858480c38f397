//! Reminders module - planning and scheduling of payment reminders.

mod reminders_model;
mod reminders_planner;
mod reminders_scheduler;
mod reminders_traits;

#[cfg(test)]
mod reminders_scheduler_tests;

pub use reminders_model::{
    CancellationSummary, PlannedReminder, RebuildOutcome, RebuiltReminders, ReminderPreferences,
    ReminderRequest, ScheduledReminders, SkipReason,
};
pub use reminders_planner::{plan_reminders, reminder_content};
pub use reminders_scheduler::ReminderScheduler;
pub use reminders_traits::ReminderDeliveryTrait;
