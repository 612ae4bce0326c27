pub mod auth;
pub mod comment;
pub mod notification;
pub mod post;
pub mod tag;
pub mod user;
