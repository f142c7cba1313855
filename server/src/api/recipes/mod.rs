pub mod create;
pub mod delete;
pub mod download_shopping_cart;
pub mod favorite;
pub mod get;
pub mod list;
pub mod responses;
pub mod shopping_cart;
pub mod update;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::media;
use crate::models::{NewRecipeIngredient, NewRecipeTag, Recipe};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags};

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/download_shopping_cart",
            get(download_shopping_cart::download_shopping_cart),
        )
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/favorite",
            axum::routing::post(favorite::add_favorite).delete(favorite::remove_favorite),
        )
        .route(
            "/{id}/shopping_cart",
            axum::routing::post(shopping_cart::add_to_cart)
                .delete(shopping_cart::remove_from_cart),
        )
}

/// Short recipe representation used by favorite/cart responses and
/// subscription listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image.as_deref().map(media::image_url),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// One submitted ingredient line: which ingredient, how much of it.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct RecipeIngredientPayload {
    pub id: Uuid,
    pub amount: i32,
}

/// Payload-level validation shared by create and update: positive amounts,
/// no ingredient referenced twice.
pub(crate) fn validate_line_items(items: &[RecipeIngredientPayload]) -> Result<(), String> {
    let mut seen: Vec<Uuid> = Vec::with_capacity(items.len());

    for item in items {
        if item.amount < 1 {
            return Err(format!(
                "Amount for ingredient {} must be at least 1",
                item.id
            ));
        }
        if seen.contains(&item.id) {
            return Err(format!("Duplicate ingredient {} in recipe", item.id));
        }
        seen.push(item.id);
    }

    Ok(())
}

/// Failure modes of the transactional tag/line-item replacement.
#[derive(Debug, Error)]
pub(crate) enum RecipeWriteError {
    #[error("Ingredient {0} does not exist")]
    UnknownIngredient(Uuid),

    #[error("Tag {0} does not exist")]
    UnknownTag(Uuid),

    #[error(transparent)]
    Db(#[from] diesel::result::Error),
}

/// Bulk-insert one line-item row per submitted ingredient. Every referenced
/// ingredient must exist; the first missing id aborts the transaction.
pub(crate) fn write_line_items(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    items: &[RecipeIngredientPayload],
) -> Result<(), RecipeWriteError> {
    let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();

    let existing: Vec<Uuid> = ingredients::table
        .filter(ingredients::id.eq_any(&ids))
        .select(ingredients::id)
        .load(conn)?;

    if let Some(missing) = ids.iter().find(|id| !existing.contains(id)) {
        return Err(RecipeWriteError::UnknownIngredient(*missing));
    }

    let rows: Vec<NewRecipeIngredient> = items
        .iter()
        .map(|item| NewRecipeIngredient {
            recipe_id,
            ingredient_id: item.id,
            amount: item.amount,
        })
        .collect();

    diesel::insert_into(recipe_ingredients::table)
        .values(&rows)
        .execute(conn)?;

    Ok(())
}

/// Associate the recipe with every submitted tag.
pub(crate) fn write_tags(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), RecipeWriteError> {
    let existing: Vec<Uuid> = tags::table
        .filter(tags::id.eq_any(tag_ids))
        .select(tags::id)
        .load(conn)?;

    if let Some(missing) = tag_ids.iter().find(|id| !existing.contains(id)) {
        return Err(RecipeWriteError::UnknownTag(*missing));
    }

    let rows: Vec<NewRecipeTag> = tag_ids
        .iter()
        .map(|tag_id| NewRecipeTag {
            recipe_id,
            tag_id: *tag_id,
        })
        .collect();

    diesel::insert_into(recipe_tags::table)
        .values(&rows)
        .execute(conn)?;

    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        favorite::add_favorite,
        favorite::remove_favorite,
        shopping_cart::add_to_cart,
        shopping_cart::remove_from_cart,
        download_shopping_cart::download_shopping_cart,
    ),
    components(schemas(
        RecipeSummary,
        RecipeIngredientPayload,
        responses::RecipeResponse,
        responses::LineItemResponse,
        create::CreateRecipeRequest,
        update::UpdateRecipeRequest,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: Uuid, amount: i32) -> RecipeIngredientPayload {
        RecipeIngredientPayload { id, amount }
    }

    #[test]
    fn accepts_distinct_positive_line_items() {
        let items = vec![item(Uuid::new_v4(), 500), item(Uuid::new_v4(), 1)];
        assert!(validate_line_items(&items).is_ok());
    }

    #[test]
    fn accepts_empty_line_item_list() {
        assert!(validate_line_items(&[]).is_ok());
    }

    #[test]
    fn rejects_duplicate_ingredient() {
        let id = Uuid::new_v4();
        let items = vec![item(id, 100), item(Uuid::new_v4(), 50), item(id, 200)];

        let err = validate_line_items(&items).unwrap_err();
        assert!(err.contains("Duplicate ingredient"));
        assert!(err.contains(&id.to_string()));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let id = Uuid::new_v4();
        let err = validate_line_items(&[item(id, 0)]).unwrap_err();
        assert!(err.contains("at least 1"));
        assert!(err.contains(&id.to_string()));
    }
}
