use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{ingredients, recipe_ingredients, recipes, shopping_cart};
use crate::shopping::{self, CartLine, SHOPPING_LIST_FILENAME};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    responses(
        (status = 200, description = "Aggregated shopping list as a text attachment", body = String),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    // Every line-item of every recipe in the caller's cart. The explicit
    // ordering keeps the rendered list stable across requests.
    let rows: Vec<(String, String, i32)> = match recipe_ingredients::table
        .inner_join(ingredients::table)
        .inner_join(recipes::table.inner_join(shopping_cart::table))
        .filter(shopping_cart::user_id.eq(user.id))
        .order((recipes::created_at.desc(), ingredients::name.asc()))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch cart line-items: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to build shopping list".to_string(),
                }),
            )
                .into_response();
        }
    };

    let lines: Vec<CartLine> = rows
        .into_iter()
        .map(|(name, measurement_unit, amount)| CartLine {
            name,
            measurement_unit,
            amount,
        })
        .collect();

    let content = shopping::render(&shopping::aggregate(&lines));

    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "text/plain; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", SHOPPING_LIST_FILENAME),
            ),
        ],
        content,
    )
        .into_response()
}
