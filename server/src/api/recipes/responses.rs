use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::tags::TagResponse;
use crate::api::users::{user_response, UserResponse};
use crate::media;
use crate::models::{Recipe, Tag, User};
use crate::schema::{favorites, ingredients, recipe_ingredients, recipe_tags, shopping_cart, tags, users};

/// One ingredient line of a recipe as shown to clients. The id is the
/// ingredient id, not the join row id.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LineItemResponse {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<LineItemResponse>,
    /// False for anonymous callers
    pub is_favorited: bool,
    /// False for anonymous callers
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub description: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
}

/// Assemble the full client view of a recipe: tags, author (with
/// `is_subscribed` relative to the viewer), line-items, and the viewer's
/// favorite/cart membership.
pub fn recipe_response(
    conn: &mut PgConnection,
    recipe: &Recipe,
    viewer: Option<Uuid>,
) -> QueryResult<RecipeResponse> {
    let recipe_tags_list: Vec<Tag> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq(recipe.id))
        .order(tags::name.asc())
        .select(Tag::as_select())
        .load(conn)?;

    let line_items: Vec<(Uuid, String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(recipe.id))
        .order(ingredients::name.asc())
        .select((
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;

    let author: User = users::table
        .find(recipe.author_id)
        .select(User::as_select())
        .first(conn)?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer) => {
            let favorited: i64 = favorites::table
                .filter(favorites::user_id.eq(viewer))
                .filter(favorites::recipe_id.eq(recipe.id))
                .count()
                .get_result(conn)?;
            let in_cart: i64 = shopping_cart::table
                .filter(shopping_cart::user_id.eq(viewer))
                .filter(shopping_cart::recipe_id.eq(recipe.id))
                .count()
                .get_result(conn)?;
            (favorited > 0, in_cart > 0)
        }
        None => (false, false),
    };

    Ok(RecipeResponse {
        id: recipe.id,
        tags: recipe_tags_list.into_iter().map(TagResponse::from).collect(),
        author: user_response(conn, &author, viewer)?,
        ingredients: line_items
            .into_iter()
            .map(|(id, name, measurement_unit, amount)| LineItemResponse {
                id,
                name,
                measurement_unit,
                amount,
            })
            .collect(),
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name.clone(),
        image: recipe.image.as_deref().map(media::image_url),
        description: recipe.description.clone(),
        cooking_time: recipe.cooking_time,
        created_at: recipe.created_at,
    })
}
