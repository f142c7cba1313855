use crate::api::users::{followed_author_response, FollowedAuthorResponse};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::{follows, users};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    responses(
        (status = 200, description = "Authors the caller follows", body = [FollowedAuthorResponse]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let author_ids: Vec<Uuid> = match follows::table
        .filter(follows::user_id.eq(user.id))
        .select(follows::author_id)
        .load(&mut conn)
    {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!("Failed to fetch follows: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch subscriptions".to_string(),
                }),
            )
                .into_response();
        }
    };

    let authors: Vec<User> = match users::table
        .filter(users::id.eq_any(&author_ids))
        .order(users::username.asc())
        .select(User::as_select())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch authors: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch subscriptions".to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut response = Vec::with_capacity(authors.len());
    for author in &authors {
        match followed_author_response(&mut conn, author) {
            Ok(r) => response.push(r),
            Err(e) => {
                tracing::error!("Failed to build follow response: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to fetch subscriptions".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    (StatusCode::OK, Json(response)).into_response()
}
