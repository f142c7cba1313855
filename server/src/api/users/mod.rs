pub mod get;
pub mod list;
pub mod me;
pub mod subscribe;
pub mod subscriptions;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::api::recipes::RecipeSummary;
use crate::models::{Recipe, User};
use crate::schema::{follows, recipes};

/// Returns the router for /api/users endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_users))
        .route("/me", get(me::me))
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route("/{id}", get(get::get_user))
        .route(
            "/{id}/subscribe",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the requesting user follows this user. Always false for
    /// anonymous callers.
    pub is_subscribed: bool,
}

/// A followed author together with their recipes, as returned by the
/// subscribe and subscriptions endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FollowedAuthorResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

pub fn is_subscribed(
    conn: &mut PgConnection,
    viewer: Option<Uuid>,
    author_id: Uuid,
) -> QueryResult<bool> {
    let Some(viewer) = viewer else {
        return Ok(false);
    };

    let count: i64 = follows::table
        .filter(follows::user_id.eq(viewer))
        .filter(follows::author_id.eq(author_id))
        .count()
        .get_result(conn)?;

    Ok(count > 0)
}

pub fn user_response(
    conn: &mut PgConnection,
    user: &User,
    viewer: Option<Uuid>,
) -> QueryResult<UserResponse> {
    Ok(UserResponse {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed: is_subscribed(conn, viewer, user.id)?,
    })
}

/// Build the subscription view of an author: profile, recipes, recipe count.
/// The caller is by definition subscribed.
pub fn followed_author_response(
    conn: &mut PgConnection,
    author: &User,
) -> QueryResult<FollowedAuthorResponse> {
    let author_recipes: Vec<Recipe> = recipes::table
        .filter(recipes::author_id.eq(author.id))
        .order(recipes::created_at.desc())
        .select(Recipe::as_select())
        .load(conn)?;

    let recipes_count = author_recipes.len() as i64;
    let summaries: Vec<RecipeSummary> = author_recipes
        .into_iter()
        .map(RecipeSummary::from)
        .collect();

    Ok(FollowedAuthorResponse {
        user: UserResponse {
            id: author.id,
            email: author.email.clone(),
            username: author.username.clone(),
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            is_subscribed: true,
        },
        recipes: summaries,
        recipes_count,
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_users,
        get::get_user,
        me::me,
        subscribe::subscribe,
        subscribe::unsubscribe,
        subscriptions::list_subscriptions,
    ),
    components(schemas(UserResponse, FollowedAuthorResponse))
)]
pub struct ApiDoc;
