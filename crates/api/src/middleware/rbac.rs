//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use questboard_core::error::CoreError;
use questboard_core::roles::ROLE_GUILD_LEADER;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `guild_leader` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn leaders_only(RequireGuildLeader(user): RequireGuildLeader) -> AppResult<Json<()>> {
///     // user is guaranteed to be a guild leader here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireGuildLeader(pub AuthUser);

impl FromRequestParts<AppState> for RequireGuildLeader {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_GUILD_LEADER {
            return Err(AppError::Core(CoreError::Forbidden(
                "Guild leader role required".into(),
            )));
        }
        Ok(RequireGuildLeader(user))
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`] but named explicitly for use in
/// route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
