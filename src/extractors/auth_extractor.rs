use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use hyper::StatusCode;
use tracing::warn;

use crate::structs::user::Role;
use crate::utils::{app_error::AppError, token::SESSION_COOKIE};
use crate::AppState;

/// The typed session identity : everything a handler may rely on about the
/// caller is resolved here, once, at the authentication boundary.
#[derive(Debug, sqlx::FromRow)]
pub struct InnerAuthUser {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub role: Role,
    pub is_banned: bool,
}

pub struct AuthUser(pub Option<Arc<InnerAuthUser>>);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let cookies = CookieJar::from_request_parts(parts, state).await.unwrap();

        let token = match cookies.get(SESSION_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => return Ok(AuthUser(None)),
        };

        match sqlx::query_as::<_, InnerAuthUser>(
            "SELECT u.id, u.name, u.image, u.role, u.is_banned FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = $1 AND s.expires_at > now()",
        )
        .bind(&token)
        .fetch_optional(&app_state.pool)
        .await
        {
            Ok(Some(user)) => {
                if user.is_banned {
                    Err(AppError::forbidden("Your account is banned."))
                } else {
                    Ok(AuthUser(Some(Arc::new(user))))
                }
            }
            Ok(None) => Ok(AuthUser(None)),
            Err(e) => {
                warn!("Error getting auth user from database : {e}");
                Err(AppError::internal_server_error())
            }
        }
    }
}

/// Session identity restricted to admins. Non-admin callers are rejected
/// with 401 before the handler runs.
pub struct AdminUser(pub Arc<InnerAuthUser>);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(auth_user) = AuthUser::from_request_parts(parts, state).await?;

        match auth_user {
            Some(user) if user.role == Role::Admin => Ok(AdminUser(user)),
            _ => Err(AppError::new(
                StatusCode::UNAUTHORIZED,
                Some("Admin access required."),
            )),
        }
    }
}
