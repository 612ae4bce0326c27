use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::warn;

use crate::extractors::auth_extractor::AuthUser;
use crate::structs::auth::UpdateSettings;
use crate::structs::user::PublicUser;
use crate::utils::app_error::AppError;
use crate::utils::validation::check_email_address;
use crate::AppState;

pub async fn user_settings_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Json(settings): Json<UpdateSettings>,
) -> Result<Json<PublicUser>, AppError> {
    let Some(auth_user) = auth_user else {
        return Err(AppError::unauthorized());
    };

    let name = settings.name.trim();
    let email = settings.email.trim().to_lowercase();

    if name.is_empty() {
        return Err(AppError::bad_request("The name cannot be empty."));
    }
    check_email_address(&email)?;

    let taken: Option<i64> =
        sqlx::query_scalar("SELECT id FROM users WHERE lower(email) = $1 AND id <> $2")
            .bind(&email)
            .bind(auth_user.id)
            .fetch_optional(&app_state.pool)
            .await
            .map_err(|e| {
                warn!("Error checking email `{email}` : {e}");
                AppError::internal_server_error()
            })?;
    if taken.is_some() {
        return Err(AppError::bad_request(
            "This email is already used by another account.",
        ));
    }

    let user = sqlx::query_as::<_, PublicUser>(
        "UPDATE users SET name = $1, email = $2, image = $3 WHERE id = $4 \
         RETURNING id, email, name, image, role, is_banned, created_at",
    )
    .bind(name)
    .bind(&email)
    .bind(&settings.image)
    .bind(auth_user.id)
    .fetch_one(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error updating settings of user {} : {e}", auth_user.id);
        AppError::internal_server_error()
    })?;

    Ok(Json(user))
}
