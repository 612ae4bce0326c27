pub mod analytics;
pub mod app_error;
pub mod notifications;
pub mod pagination;
pub mod post;
pub mod tags;
pub mod token;
pub mod validation;
