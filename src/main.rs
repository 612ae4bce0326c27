mod config;
mod extractors;
mod middleware;
mod routes;
mod storage;
mod structs;
mod utils;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::http::Method;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use config::Config;
use middleware::logger_middleware::logger_middleware;
use routes::admin::analytics::analytics_route;
use routes::admin::posts::{admin_list_posts_route, admin_post_action_route};
use routes::admin::users::{admin_list_users_route, admin_user_action_route};
use routes::comments::{create_comment_route, delete_comment_route, get_comments_route};
use routes::delete_post::delete_post_route;
use routes::get_post::get_post_route;
use routes::get_posts::get_posts_route;
use routes::like_post::like_post_route;
use routes::login_route::login_route;
use routes::logout_route::logout_route;
use routes::notifications::{get_notifications_route, mark_all_read_route, mark_read_route};
use routes::profile_route::profile_route;
use routes::publish_post::publish_post_route;
use routes::save_post::{get_saved_state_route, toggle_save_route};
use routes::signup_route::signup_route;
use routes::update_post::update_post_route;
use routes::upload_route::upload_route;
use routes::user_settings::user_settings_route;
use storage::{LocalStorage, ObjectStorage};

pub struct AppState {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to the database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let storage = LocalStorage::new(config.upload_dir.clone(), config.public_base_url.clone());
    let uploads_dir = storage.root().clone();

    let app_state = Arc::new(AppState {
        pool,
        storage: Arc::new(storage),
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(
            config
                .front_url
                .parse::<HeaderValue>()
                .expect("FRONT_URL must be a valid origin"),
        )
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let router = Router::new()
        .route("/posts", get(get_posts_route).post(publish_post_route))
        .route(
            "/posts/:id",
            get(get_post_route)
                .put(update_post_route)
                .delete(delete_post_route),
        )
        .route("/posts/:id/like", post(like_post_route))
        .route(
            "/posts/:id/save",
            get(get_saved_state_route).post(toggle_save_route),
        )
        .route(
            "/posts/:id/comments",
            get(get_comments_route).post(create_comment_route),
        )
        .route("/posts/:id/comments/:comment_id", delete(delete_comment_route))
        .route("/notifications", get(get_notifications_route))
        .route("/notifications/read-all", post(mark_all_read_route))
        .route("/notifications/:id/read", post(mark_read_route))
        .route("/auth/signup", post(signup_route))
        .route("/auth/login", post(login_route))
        .route("/auth/logout", post(logout_route))
        .route("/users/:id", get(profile_route))
        .route("/user/settings", put(user_settings_route))
        .route("/upload", post(upload_route))
        .route("/admin/users", get(admin_list_users_route))
        .route("/admin/users/:id/:action", post(admin_user_action_route))
        .route("/admin/posts", get(admin_list_posts_route))
        .route("/admin/posts/:id/:action", post(admin_post_action_route))
        .route("/admin/analytics", get(analytics_route))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(6 * 1024 * 1024))
        .layer(cors)
        .layer(axum_middleware::from_fn(logger_middleware))
        .with_state(app_state);

    info!("Listening on {}", config.bind_addr);

    axum::Server::bind(&config.bind_addr)
        .serve(router.into_make_service())
        .await
        .expect("Server error");
}
