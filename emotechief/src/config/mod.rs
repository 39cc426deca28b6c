//! Process configuration: loading from the environment and validation.

pub mod app_config;
pub mod validation;

pub use app_config::AppConfig;
pub use validation::{FeatureStatus, check_feature_status};
