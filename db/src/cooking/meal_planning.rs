use chrono::{DateTime, NaiveDate, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Type};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "snake_case")]
pub enum MealType {
    #[serde(rename = "breakfast")]
    Breakfast,
    #[serde(rename = "lunch")]
    Lunch,
    #[serde(rename = "dinner")]
    Dinner,
    #[serde(rename = "snack")]
    Snack,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealType::Breakfast => write!(f, "breakfast"),
            MealType::Lunch => write!(f, "lunch"),
            MealType::Dinner => write!(f, "dinner"),
            MealType::Snack => write!(f, "snack"),
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(format!("Unknown meal type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "snake_case")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayOfWeek::Sunday => write!(f, "sunday"),
            DayOfWeek::Monday => write!(f, "monday"),
            DayOfWeek::Tuesday => write!(f, "tuesday"),
            DayOfWeek::Wednesday => write!(f, "wednesday"),
            DayOfWeek::Thursday => write!(f, "thursday"),
            DayOfWeek::Friday => write!(f, "friday"),
            DayOfWeek::Saturday => write!(f, "saturday"),
        }
    }
}

/// One planned meal: a recipe for a family member in a (week, day, meal type) slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct MealPlanEntry {
    pub meal_plan_entry_id: Uuid,
    pub week_start_date: NaiveDate,
    pub family_member_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub meal_type: MealType,
    pub recipe_id: Uuid,
    pub servings: i32,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

fn default_entry_servings() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanEntryInput {
    pub week_start_date: NaiveDate,
    pub family_member_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub meal_type: MealType,
    pub recipe_id: Uuid,
    #[serde(default = "default_entry_servings")]
    pub servings: i32,
    #[serde(default)]
    pub notes: String,
}

const ENTRY_COLUMNS: &str = "
    meal_plan_entry_id,
    week_start_date,
    family_member_id,
    day_of_week,
    meal_type,
    recipe_id,
    servings,
    notes,
    created_at
";

impl MealPlanEntry {
    pub async fn create(pool: &PgPool, input: &MealPlanEntryInput) -> Result<Self> {
        let entry = sqlx::query_as::<_, MealPlanEntry>(&format!(
            "
            INSERT INTO meal_plan_entries (
                week_start_date, family_member_id, day_of_week, meal_type,
                recipe_id, servings, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ENTRY_COLUMNS}
            "
        ))
        .bind(input.week_start_date)
        .bind(input.family_member_id)
        .bind(input.day_of_week)
        .bind(input.meal_type)
        .bind(input.recipe_id)
        .bind(input.servings)
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        Ok(entry)
    }

    /// Entries filtered by week and/or family member; `None` means no constraint.
    pub async fn list(
        pool: &PgPool,
        week_start_date: Option<NaiveDate>,
        family_member_id: Option<Uuid>,
    ) -> Result<Vec<Self>> {
        let entries = sqlx::query_as::<_, MealPlanEntry>(&format!(
            "
            SELECT {ENTRY_COLUMNS}
            FROM meal_plan_entries
            WHERE ($1::date IS NULL OR week_start_date = $1)
                AND ($2::uuid IS NULL OR family_member_id = $2)
            ORDER BY week_start_date, created_at
            "
        ))
        .bind(week_start_date)
        .bind(family_member_id)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    pub async fn get_by_week(pool: &PgPool, week_start_date: NaiveDate) -> Result<Vec<Self>> {
        Self::list(pool, Some(week_start_date), None).await
    }

    pub async fn delete(pool: &PgPool, meal_plan_entry_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meal_plan_entries WHERE meal_plan_entry_id = $1")
            .bind(meal_plan_entry_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
