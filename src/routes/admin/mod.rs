pub mod analytics;
pub mod posts;
pub mod users;
