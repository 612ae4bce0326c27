pub mod admin;
pub mod comments;
pub mod delete_post;
pub mod get_post;
pub mod get_posts;
pub mod like_post;
pub mod login_route;
pub mod logout_route;
pub mod notifications;
pub mod profile_route;
pub mod publish_post;
pub mod save_post;
pub mod signup_route;
pub mod update_post;
pub mod upload_route;
pub mod user_settings;
