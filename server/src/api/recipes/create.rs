use crate::api::recipes::{
    responses::{recipe_response, RecipeResponse},
    validate_line_items, write_line_items, write_tags, RecipeIngredientPayload, RecipeWriteError,
};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::media;
use crate::models::{NewRecipe, Recipe};
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub description: String,
    /// Minutes, must be >= 1
    pub cooking_time: i32,
    /// Base64 data URI (`data:image/png;base64,...`)
    pub image: Option<String>,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<RecipeIngredientPayload>,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    if request.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Name cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    if request.cooking_time < 1 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Cooking time must be at least 1".to_string(),
            }),
        )
            .into_response();
    }

    if let Err(message) = validate_line_items(&request.ingredients) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: message }),
        )
            .into_response();
    }

    let image = match request.image.as_deref() {
        Some(payload) => match media::store_image(&media::media_root(), payload) {
            Ok(file_name) => Some(file_name),
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: e.to_string(),
                    }),
                )
                    .into_response()
            }
        },
        None => None,
    };

    let mut conn = get_conn!(pool);

    // Recipe row, tag associations, and line-items land atomically
    let result: Result<Recipe, RecipeWriteError> = conn.transaction(|conn| {
        let new_recipe = NewRecipe {
            author_id: user.id,
            name: &request.name,
            description: &request.description,
            image: image.as_deref(),
            cooking_time: request.cooking_time,
        };

        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(&new_recipe)
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        write_tags(conn, recipe.id, &request.tags)?;
        write_line_items(conn, recipe.id, &request.ingredients)?;

        Ok(recipe)
    });

    let recipe = match result {
        Ok(recipe) => recipe,
        Err(e) => {
            // The recipe row rolled back, so the stored file has no owner
            if let Some(file_name) = &image {
                media::remove_image(&media::media_root(), file_name);
            }
            return match e {
                e @ (RecipeWriteError::UnknownIngredient(_) | RecipeWriteError::UnknownTag(_)) => {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse {
                            error: e.to_string(),
                        }),
                    )
                        .into_response()
                }
                RecipeWriteError::Db(e) => {
                    tracing::error!("Failed to create recipe: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse {
                            error: "Failed to create recipe".to_string(),
                        }),
                    )
                        .into_response()
                }
            };
        }
    };

    match recipe_response(&mut conn, &recipe, Some(user.id)) {
        Ok(r) => (StatusCode::CREATED, Json(r)).into_response(),
        Err(e) => {
            tracing::error!("Failed to build recipe response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
