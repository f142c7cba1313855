use crate::api::recipes::{
    responses::{recipe_response, RecipeResponse},
    validate_line_items, write_line_items, write_tags, RecipeIngredientPayload, RecipeWriteError,
};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::media;
use crate::models::Recipe;
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Update replaces the full tag set and the full line-item set; scalar
/// fields are written as submitted. Omitting `image` keeps the stored one.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub name: String,
    pub description: String,
    pub cooking_time: i32,
    /// Base64 data URI; omit to keep the current image
    pub image: Option<String>,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<RecipeIngredientPayload>,
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecipeRequest>,
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

    let mut conn = get_conn!(pool);

    let recipe: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    // Object-level permission: author or admin
    if recipe.author_id != user.id && !user.is_admin {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only the author can modify this recipe".to_string(),
            }),
        )
            .into_response();
    }

    let new_image = match request.image.as_deref() {
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
    let image = new_image.clone().or_else(|| recipe.image.clone());

    // Wholesale replacement of tags and line-items plus the scalar update,
    // all or nothing
    let result: Result<Recipe, RecipeWriteError> = conn.transaction(|conn| {
        let updated: Recipe = diesel::update(recipes::table.find(recipe.id))
            .set((
                recipes::name.eq(&request.name),
                recipes::description.eq(&request.description),
                recipes::cooking_time.eq(request.cooking_time),
                recipes::image.eq(image.as_deref()),
            ))
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe.id)))
            .execute(conn)?;
        write_tags(conn, recipe.id, &request.tags)?;

        diesel::delete(
            recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe.id)),
        )
        .execute(conn)?;
        write_line_items(conn, recipe.id, &request.ingredients)?;

        Ok(updated)
    });

    let updated = match result {
        Ok(updated) => {
            // A replacement image supersedes the stored file
            if new_image.is_some() {
                if let Some(old) = &recipe.image {
                    media::remove_image(&media::media_root(), old);
                }
            }
            updated
        }
        Err(e) => {
            // Rolled back, so the freshly stored file has no owner
            if let Some(file_name) = &new_image {
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
                    tracing::error!("Failed to update recipe: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse {
                            error: "Failed to update recipe".to_string(),
                        }),
                    )
                        .into_response()
                }
            };
        }
    };

    match recipe_response(&mut conn, &updated, Some(user.id)) {
        Ok(r) => (StatusCode::OK, Json(r)).into_response(),
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
