//! Subscriptions module - domain models, lifecycle service, and traits.

mod subscriptions_model;
mod subscriptions_service;
mod subscriptions_traits;


pub use subscriptions_model::{
    Category, Frequency, NewSubscription, ReminderSettings, Subscription, SubscriptionUpdate,
};
pub use subscriptions_service::SubscriptionService;
pub use subscriptions_traits::{SubscriptionRepositoryTrait, SubscriptionServiceTrait};
