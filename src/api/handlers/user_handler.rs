//! Profile handler.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::UserDetails;
use crate::errors::AppResult;

/// Create protected user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/details", get(get_details))
}

/// The caller's profile and accounts
#[utoipa::path(
    get,
    path = "/user/details",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user with accounts", body = UserDetails),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn get_details(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserDetails>> {
    let details = state.user_service.get_details(current_user.id).await?;
    Ok(Json(details))
}
