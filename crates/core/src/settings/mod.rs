pub mod settings_model;
pub mod settings_traits;
pub mod settings_service;
pub use settings_model::*;
pub use settings_traits::SettingsRepositoryTrait;
pub use settings_service::{SettingsService, SettingsServiceTrait};
