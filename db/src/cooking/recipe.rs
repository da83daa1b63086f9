use std::collections::HashMap;

use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{DietaryRestriction, FilterMode, MealType};
use crate::{contains_pattern, parse_all, to_text};

pub const DEFAULT_STORE_SECTION: &str = "general";
pub const DEFAULT_SERVINGS: i32 = 4;

fn default_store_section() -> String {
    DEFAULT_STORE_SECTION.to_string()
}

fn default_servings() -> i32 {
    DEFAULT_SERVINGS
}

/// One ingredient line of a recipe. `quantity` is free text such as `"2"` or `"a pinch"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: String,
    pub unit: String,
    #[serde(default = "default_store_section")]
    pub store_section: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub recipe_id: Uuid,
    pub name: String,
    pub description: String,
    pub dietary_restrictions_compliant: Vec<DietaryRestriction>,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<String>,
    pub prep_time_minutes: i32,
    pub cook_time_minutes: i32,
    pub servings: i32,
    pub meal_types: Vec<MealType>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dietary_restrictions_compliant: Vec<DietaryRestriction>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub prep_time_minutes: i32,
    #[serde(default)]
    pub cook_time_minutes: i32,
    #[serde(default = "default_servings")]
    pub servings: i32,
    #[serde(default)]
    pub meal_types: Vec<MealType>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub dietary_restrictions: Vec<DietaryRestriction>,
    pub filter_mode: FilterMode,
    pub meal_type: Option<MealType>,
    pub search: Option<String>,
}

#[derive(sqlx::FromRow)]
struct RecipeRow {
    recipe_id: Uuid,
    name: String,
    description: String,
    dietary_restrictions_compliant: Vec<String>,
    instructions: Vec<String>,
    prep_time_minutes: i32,
    cook_time_minutes: i32,
    servings: i32,
    meal_types: Vec<String>,
    tags: Vec<String>,
    is_favorite: bool,
    created_at: DateTime<Utc>,
}

impl RecipeRow {
    fn into_recipe(self, ingredients: Vec<RecipeIngredient>) -> Result<Recipe> {
        Ok(Recipe {
            recipe_id: self.recipe_id,
            name: self.name,
            description: self.description,
            dietary_restrictions_compliant: parse_all(self.dietary_restrictions_compliant)?,
            ingredients,
            instructions: self.instructions,
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            servings: self.servings,
            meal_types: parse_all(self.meal_types)?,
            tags: self.tags,
            is_favorite: self.is_favorite,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RecipeIngredientRow {
    recipe_id: Uuid,
    name: String,
    quantity: String,
    unit: String,
    store_section: String,
}

const RECIPE_COLUMNS: &str = "
    recipe_id,
    name,
    description,
    dietary_restrictions_compliant,
    instructions,
    prep_time_minutes,
    cook_time_minutes,
    servings,
    meal_types,
    tags,
    is_favorite,
    created_at
";

impl Recipe {
    pub async fn create(pool: &PgPool, input: &RecipeInput) -> Result<Self> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "
            INSERT INTO recipes (
                name, description, dietary_restrictions_compliant, instructions,
                prep_time_minutes, cook_time_minutes, servings, meal_types, tags, is_favorite
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {RECIPE_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(to_text(&input.dietary_restrictions_compliant))
        .bind(&input.instructions)
        .bind(input.prep_time_minutes)
        .bind(input.cook_time_minutes)
        .bind(input.servings)
        .bind(to_text(&input.meal_types))
        .bind(&input.tags)
        .bind(input.is_favorite)
        .fetch_one(&mut *tx)
        .await?;

        insert_ingredients(&mut tx, row.recipe_id, &input.ingredients).await?;
        tx.commit().await?;

        row.into_recipe(input.ingredients.clone())
    }

    pub async fn get_by_id(pool: &PgPool, recipe_id: Uuid) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "
            SELECT {RECIPE_COLUMNS}
            FROM recipes
            WHERE recipe_id = $1
            "
        ))
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut ingredients = RecipeIngredient::get_by_recipes(pool, &[recipe_id]).await?;
        let ingredients = ingredients.remove(&recipe_id).unwrap_or_default();

        row.into_recipe(ingredients).map(Some)
    }

    /// Recipes whose ids appear in `recipe_ids`. Unknown ids are simply absent from the result.
    pub async fn get_by_ids(pool: &PgPool, recipe_ids: &[Uuid]) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "
            SELECT {RECIPE_COLUMNS}
            FROM recipes
            WHERE recipe_id = ANY($1)
            ORDER BY created_at, recipe_id
            "
        ))
        .bind(recipe_ids)
        .fetch_all(pool)
        .await?;

        Self::attach_ingredients(pool, rows).await
    }

    pub async fn list(pool: &PgPool, filter: &RecipeFilter) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "
            SELECT {RECIPE_COLUMNS}
            FROM recipes
            WHERE (
                    cardinality($1::text[]) = 0
                    OR ($2 = 'strict' AND dietary_restrictions_compliant @> $1::text[])
                    OR ($2 = 'flexible' AND dietary_restrictions_compliant && $1::text[])
                )
                AND ($3::text IS NULL OR $3 = ANY(meal_types))
                AND (
                    $4::text IS NULL
                    OR name ILIKE $4
                    OR description ILIKE $4
                    OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $4)
                )
            ORDER BY created_at, recipe_id
            "
        ))
        .bind(to_text(&filter.dietary_restrictions))
        .bind(filter.filter_mode.to_string())
        .bind(filter.meal_type)
        .bind(
            filter
                .search
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(contains_pattern),
        )
        .fetch_all(pool)
        .await?;

        Self::attach_ingredients(pool, rows).await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        Self::list(pool, &RecipeFilter::default()).await
    }

    /// Replaces the recipe and its full ingredient list. Returns `None` when it does not exist.
    pub async fn update(pool: &PgPool, recipe_id: Uuid, input: &RecipeInput) -> Result<Option<Self>> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "
            UPDATE recipes
            SET name = $2,
                description = $3,
                dietary_restrictions_compliant = $4,
                instructions = $5,
                prep_time_minutes = $6,
                cook_time_minutes = $7,
                servings = $8,
                meal_types = $9,
                tags = $10,
                is_favorite = $11
            WHERE recipe_id = $1
            RETURNING {RECIPE_COLUMNS}
            "
        ))
        .bind(recipe_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(to_text(&input.dietary_restrictions_compliant))
        .bind(&input.instructions)
        .bind(input.prep_time_minutes)
        .bind(input.cook_time_minutes)
        .bind(input.servings)
        .bind(to_text(&input.meal_types))
        .bind(&input.tags)
        .bind(input.is_favorite)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
        insert_ingredients(&mut tx, recipe_id, &input.ingredients).await?;
        tx.commit().await?;

        row.into_recipe(input.ingredients.clone()).map(Some)
    }

    pub async fn delete(pool: &PgPool, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all(pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM recipes").execute(pool).await?;

        Ok(result.rows_affected())
    }

    async fn attach_ingredients(pool: &PgPool, rows: Vec<RecipeRow>) -> Result<Vec<Self>> {
        let ids = rows.iter().map(|r| r.recipe_id).collect::<Vec<_>>();
        let mut ingredients = RecipeIngredient::get_by_recipes(pool, &ids).await?;

        rows.into_iter()
            .map(|row| {
                let lines = ingredients.remove(&row.recipe_id).unwrap_or_default();
                row.into_recipe(lines)
            })
            .collect()
    }
}

impl RecipeIngredient {
    /// Ingredient lines for each recipe, in their stored order.
    pub async fn get_by_recipes(
        pool: &PgPool,
        recipe_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Self>>> {
        let rows = sqlx::query_as::<_, RecipeIngredientRow>(
            "
            SELECT recipe_id, name, quantity, unit, store_section
            FROM recipe_ingredients
            WHERE recipe_id = ANY($1)
            ORDER BY recipe_id, position
            ",
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await?;

        let mut by_recipe: HashMap<Uuid, Vec<Self>> = HashMap::new();
        for row in rows {
            by_recipe.entry(row.recipe_id).or_default().push(Self {
                name: row.name,
                quantity: row.quantity,
                unit: row.unit,
                store_section: row.store_section,
            });
        }

        Ok(by_recipe)
    }
}

async fn insert_ingredients(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    ingredients: &[RecipeIngredient],
) -> Result<()> {
    for (position, ingredient) in (0_i32..).zip(ingredients) {
        sqlx::query(
            "
            INSERT INTO recipe_ingredients (recipe_id, position, name, quantity, unit, store_section)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(recipe_id)
        .bind(position)
        .bind(&ingredient.name)
        .bind(&ingredient.quantity)
        .bind(&ingredient.unit)
        .bind(&ingredient.store_section)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str, quantity: &str, unit: &str, section: &str) -> RecipeIngredient {
        RecipeIngredient {
            name: name.to_string(),
            quantity: quantity.to_string(),
            unit: unit.to_string(),
            store_section: section.to_string(),
        }
    }

    fn input(name: &str, restrictions: Vec<DietaryRestriction>, tags: Vec<&str>) -> RecipeInput {
        RecipeInput {
            name: name.to_string(),
            description: String::new(),
            dietary_restrictions_compliant: restrictions,
            ingredients: vec![
                ingredient("Flour", "2", "cup", "pantry"),
                ingredient("Salt", "a pinch", "tsp", "pantry"),
            ],
            instructions: vec!["Mix".to_string()],
            prep_time_minutes: 5,
            cook_time_minutes: 10,
            servings: 4,
            meal_types: vec![MealType::Dinner],
            tags: tags.into_iter().map(ToString::to_string).collect(),
            is_favorite: false,
        }
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("oil"), "%oil%");
    }

    #[test]
    fn test_recipe_input_defaults() {
        let input: RecipeInput = serde_json::from_str(
            r#"{"name": "Toast", "ingredients": [{"name": "Bread", "quantity": "2", "unit": "slice"}]}"#,
        )
        .unwrap();

        assert_eq!(input.servings, DEFAULT_SERVINGS);
        assert_eq!(input.ingredients[0].store_section, DEFAULT_STORE_SECTION);
        assert!(input.meal_types.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn test_recipe_round_trip_keeps_ingredient_order(pool: PgPool) {
        let created = Recipe::create(&pool, &input("Bread", vec![], vec![]))
            .await
            .unwrap();

        let fetched = Recipe::get_by_id(&pool, created.recipe_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched.ingredients, created.ingredients);
        assert_eq!(fetched.ingredients[0].name, "Flour");
        assert_eq!(fetched.meal_types, vec![MealType::Dinner]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn test_list_filters_by_restriction_mode_and_search(pool: PgPool) {
        Recipe::create(
            &pool,
            &input(
                "Salmon",
                vec![DietaryRestriction::GlutenFree, DietaryRestriction::DairyFree],
                vec!["omega-3"],
            ),
        )
        .await
        .unwrap();
        Recipe::create(
            &pool,
            &input("Pancakes", vec![DietaryRestriction::DairyFree], vec!["brunch"]),
        )
        .await
        .unwrap();

        let strict = Recipe::list(
            &pool,
            &RecipeFilter {
                dietary_restrictions: vec![
                    DietaryRestriction::GlutenFree,
                    DietaryRestriction::DairyFree,
                ],
                filter_mode: FilterMode::Strict,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].name, "Salmon");

        let flexible = Recipe::list(
            &pool,
            &RecipeFilter {
                dietary_restrictions: vec![
                    DietaryRestriction::GlutenFree,
                    DietaryRestriction::DairyFree,
                ],
                filter_mode: FilterMode::Flexible,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(flexible.len(), 2);

        let by_tag = Recipe::list(
            &pool,
            &RecipeFilter {
                search: Some("BRUNCH".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].name, "Pancakes");
    }
}
