use chrono::{DateTime, NaiveDate, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_LOCATION: &str = "pantry";
pub const DEFAULT_UNIT: &str = "each";

/// Items expiring within this many days (or already expired) count as expiring soon.
pub const EXPIRING_SOON_DAYS: i32 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct InventoryItem {
    pub inventory_item_id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    pub barcode: Option<String>,
    pub brand: Option<String>,
    pub location: String,
    pub expiration_date: Option<NaiveDate>,
    pub purchase_date: Option<NaiveDate>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_quantity() -> f64 {
    1.0
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemInput {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl InventoryItemInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: default_quantity(),
            unit: default_unit(),
            category: default_category(),
            barcode: None,
            brand: None,
            location: default_location(),
            expiration_date: None,
            purchase_date: None,
            notes: String::new(),
        }
    }
}

/// Partial update: only the fields that are present are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub barcode: Option<String>,
    pub brand: Option<String>,
    pub location: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFilter {
    pub category: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub expiring_soon: bool,
}

const INVENTORY_COLUMNS: &str = "
    inventory_item_id,
    name,
    quantity,
    unit,
    category,
    barcode,
    brand,
    location,
    expiration_date,
    purchase_date,
    notes,
    created_at,
    updated_at
";

impl InventoryItem {
    pub async fn create(pool: &PgPool, input: &InventoryItemInput) -> Result<Self> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "
            INSERT INTO inventory_items (
                name, quantity, unit, category, barcode, brand, location,
                expiration_date, purchase_date, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {INVENTORY_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(input.quantity)
        .bind(&input.unit)
        .bind(&input.category)
        .bind(&input.barcode)
        .bind(&input.brand)
        .bind(&input.location)
        .bind(input.expiration_date)
        .bind(input.purchase_date)
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        Ok(item)
    }

    pub async fn list(pool: &PgPool, filter: &InventoryFilter) -> Result<Vec<Self>> {
        let search = filter.search.as_deref().map(crate::contains_pattern);

        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "
            SELECT {INVENTORY_COLUMNS}
            FROM inventory_items
            WHERE ($1::text IS NULL OR category = $1)
                AND ($2::text IS NULL OR location = $2)
                AND ($3::text IS NULL
                    OR name ILIKE $3
                    OR COALESCE(brand, '') ILIKE $3
                    OR notes ILIKE $3)
                AND (NOT $4::bool
                    OR (expiration_date IS NOT NULL
                        AND expiration_date <= CURRENT_DATE + $5::int))
            ORDER BY name
            "
        ))
        .bind(&filter.category)
        .bind(&filter.location)
        .bind(search)
        .bind(filter.expiring_soon)
        .bind(EXPIRING_SOON_DAYS)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Items that are actually on hand, i.e. with a positive quantity.
    pub async fn list_in_stock(pool: &PgPool) -> Result<Vec<Self>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "
            SELECT {INVENTORY_COLUMNS}
            FROM inventory_items
            WHERE quantity > 0
            ORDER BY name
            "
        ))
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    pub async fn get_by_id(pool: &PgPool, inventory_item_id: Uuid) -> Result<Option<Self>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "
            SELECT {INVENTORY_COLUMNS}
            FROM inventory_items
            WHERE inventory_item_id = $1
            "
        ))
        .bind(inventory_item_id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    pub async fn find_by_barcode(pool: &PgPool, barcode: &str) -> Result<Option<Self>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "
            SELECT {INVENTORY_COLUMNS}
            FROM inventory_items
            WHERE barcode = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "
        ))
        .bind(barcode)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    pub async fn update(
        pool: &PgPool,
        inventory_item_id: Uuid,
        update: &InventoryItemUpdate,
    ) -> Result<Option<Self>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "
            UPDATE inventory_items
            SET name = COALESCE($2, name),
                quantity = COALESCE($3, quantity),
                unit = COALESCE($4, unit),
                category = COALESCE($5, category),
                barcode = COALESCE($6, barcode),
                brand = COALESCE($7, brand),
                location = COALESCE($8, location),
                expiration_date = COALESCE($9, expiration_date),
                purchase_date = COALESCE($10, purchase_date),
                notes = COALESCE($11, notes),
                updated_at = NOW()
            WHERE inventory_item_id = $1
            RETURNING {INVENTORY_COLUMNS}
            "
        ))
        .bind(inventory_item_id)
        .bind(&update.name)
        .bind(update.quantity)
        .bind(&update.unit)
        .bind(&update.category)
        .bind(&update.barcode)
        .bind(&update.brand)
        .bind(&update.location)
        .bind(update.expiration_date)
        .bind(update.purchase_date)
        .bind(&update.notes)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    pub async fn delete(pool: &PgPool, inventory_item_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE inventory_item_id = $1")
            .bind(inventory_item_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
