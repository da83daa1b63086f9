use chrono::{DateTime, NaiveDate, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

/// One aggregated line on a weekly shopping list.
///
/// `total_quantity` is either a formatted number or a `See recipes: ...` note
/// when a contributing quantity could not be read as a number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroceryListItem {
    pub ingredient_name: String,
    pub total_quantity: String,
    pub unit: String,
    pub store_section: String,
    pub from_recipes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroceryList {
    pub grocery_list_id: Uuid,
    pub week_start_date: NaiveDate,
    pub items: Vec<GroceryListItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct GroceryListRow {
    grocery_list_id: Uuid,
    week_start_date: NaiveDate,
    items: Json<Vec<GroceryListItem>>,
    created_at: DateTime<Utc>,
}

impl From<GroceryListRow> for GroceryList {
    fn from(row: GroceryListRow) -> Self {
        Self {
            grocery_list_id: row.grocery_list_id,
            week_start_date: row.week_start_date,
            items: row.items.0,
            created_at: row.created_at,
        }
    }
}

impl GroceryList {
    /// Stores the list for a week, replacing whatever was generated before.
    pub async fn upsert(
        pool: &PgPool,
        week_start_date: NaiveDate,
        items: &[GroceryListItem],
    ) -> Result<Self> {
        let row = sqlx::query_as::<_, GroceryListRow>(
            "
            INSERT INTO grocery_lists (week_start_date, items)
            VALUES ($1, $2)
            ON CONFLICT (week_start_date)
            DO UPDATE SET items = EXCLUDED.items, created_at = NOW()
            RETURNING grocery_list_id, week_start_date, items, created_at
            ",
        )
        .bind(week_start_date)
        .bind(Json(items))
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }

    pub async fn get_by_week(pool: &PgPool, week_start_date: NaiveDate) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, GroceryListRow>(
            "
            SELECT grocery_list_id, week_start_date, items, created_at
            FROM grocery_lists
            WHERE week_start_date = $1
            ",
        )
        .bind(week_start_date)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flour() -> GroceryListItem {
        GroceryListItem {
            ingredient_name: "Flour".to_string(),
            total_quantity: "1.0".to_string(),
            unit: "cup".to_string(),
            store_section: "pantry".to_string(),
            from_recipes: vec!["Pancakes".to_string()],
        }
    }

    #[test]
    fn test_grocery_item_serializes_with_plain_field_names() {
        let value = serde_json::to_value(flour()).unwrap();

        assert_eq!(value["ingredient_name"], "Flour");
        assert_eq!(value["total_quantity"], "1.0");
        assert_eq!(value["from_recipes"][0], "Pancakes");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn test_upsert_replaces_existing_week(pool: PgPool) {
        let week = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();

        let first = GroceryList::upsert(&pool, week, &[flour()]).await.unwrap();
        let second = GroceryList::upsert(&pool, week, &[]).await.unwrap();

        assert_eq!(first.grocery_list_id, second.grocery_list_id);
        assert!(second.items.is_empty());

        let stored = GroceryList::get_by_week(&pool, week).await.unwrap().unwrap();
        assert!(stored.items.is_empty());
    }
}
