use std::{collections::HashMap, time::Duration};

use color_eyre::eyre::Context;
use db::cooking::{inventory::DEFAULT_CATEGORY, inventory::DEFAULT_UNIT, InventoryItem};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

const OPEN_FOOD_FACTS_BASE: &str = "https://world.openfoodfacts.org";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Substring of an Open Food Facts category tag, and the pantry category it maps to.
const CATEGORY_MAPPING: &[(&str, &str)] = &[
    ("en:dairy", "dairy"),
    ("en:meat", "meat"),
    ("en:fish", "fish"),
    ("en:fruits", "produce"),
    ("en:vegetables", "produce"),
    ("en:cereals", "pantry"),
    ("en:beverages", "general"),
    ("en:snacks", "general"),
    ("en:frozen", "frozen"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BarcodeError {
    #[error("Invalid barcode format")]
    InvalidFormat,
}

/// Accepts 8 to 14 ASCII digits, the range covering EAN-8 through GTIN-14.
pub fn validate_barcode(raw: &str) -> Result<&str, BarcodeError> {
    let is_digits = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());

    if is_digits && (8..=14).contains(&raw.len()) {
        Ok(raw)
    } else {
        Err(BarcodeError::InvalidFormat)
    }
}

#[derive(Debug, Clone)]
pub struct OpenFoodFactsConfig {
    pub base_url: String,
}

impl Default for OpenFoodFactsConfig {
    fn default() -> Self {
        Self {
            base_url: OPEN_FOOD_FACTS_BASE.to_string(),
        }
    }
}

impl OpenFoodFactsConfig {
    pub fn from_env() -> Self {
        std::env::var("OPEN_FOOD_FACTS_URL")
            .map(|base_url| Self { base_url })
            .unwrap_or_default()
    }

    fn product_url(&self, barcode: &str) -> String {
        format!(
            "{}/api/v0/product/{barcode}.json",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProductSource {
    #[serde(rename = "Inventory")]
    Inventory,
    #[serde(rename = "Open Food Facts")]
    OpenFoodFacts,
    #[serde(rename = "Manual Entry")]
    ManualEntry,
}

/// Per 100 g, as reported by Open Food Facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NutritionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductInfo {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub unit: String,
    pub barcode: String,
    pub source: ProductSource,
    pub nutrition_info: NutritionInfo,
}

impl ProductInfo {
    pub fn from_inventory(item: &InventoryItem, barcode: &str) -> Self {
        Self {
            name: item.name.clone(),
            brand: item.brand.clone().unwrap_or_default(),
            category: item.category.clone(),
            unit: item.unit.clone(),
            barcode: barcode.to_string(),
            source: ProductSource::Inventory,
            nutrition_info: NutritionInfo::default(),
        }
    }

    /// Placeholder the user fills in by hand.
    pub fn manual_entry(barcode: &str) -> Self {
        Self {
            name: format!("Product {barcode}"),
            brand: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            unit: DEFAULT_UNIT.to_string(),
            barcode: barcode.to_string(),
            source: ProductSource::ManualEntry,
            nutrition_info: NutritionInfo::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenFoodFactsResponse {
    #[serde(default)]
    status: i64,
    product: Option<OpenFoodFactsProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenFoodFactsProduct {
    product_name: Option<String>,
    brands: Option<String>,
    #[serde(default)]
    categories_tags: Vec<String>,
    #[serde(default)]
    nutriments: HashMap<String, serde_json::Value>,
}

impl OpenFoodFactsProduct {
    fn into_product_info(self, barcode: &str) -> ProductInfo {
        let nutrient = |key: &str| self.nutriments.get(key).and_then(nutrient_value);
        let nutrition_info = NutritionInfo {
            calories: nutrient("energy-kcal_100g"),
            protein: nutrient("proteins_100g"),
            carbs: nutrient("carbohydrates_100g"),
            fat: nutrient("fat_100g"),
        };

        ProductInfo {
            name: self
                .product_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Unknown Product".to_string()),
            brand: self.brands.unwrap_or_default(),
            category: map_category(&self.categories_tags).to_string(),
            unit: guess_unit(&self.categories_tags).to_string(),
            barcode: barcode.to_string(),
            source: ProductSource::OpenFoodFacts,
            nutrition_info,
        }
    }
}

fn nutrient_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The first tag that maps to something more specific than `general` wins.
fn map_category(tags: &[String]) -> &'static str {
    for tag in tags {
        let tag = tag.to_lowercase();
        let mapped = CATEGORY_MAPPING
            .iter()
            .find(|(key, _)| tag.contains(key))
            .map_or(DEFAULT_CATEGORY, |&(_, category)| category);

        if mapped != DEFAULT_CATEGORY {
            return mapped;
        }
    }

    DEFAULT_CATEGORY
}

fn guess_unit(tags: &[String]) -> &'static str {
    let has = |needle: &str| tags.iter().any(|tag| tag.to_lowercase().contains(needle));

    if has("beverage") {
        "bottle"
    } else if has("frozen") {
        "package"
    } else {
        DEFAULT_UNIT
    }
}

/// Looks the barcode up on Open Food Facts. `Ok(None)` means the product is unknown there.
#[instrument(skip(client, config), err)]
pub async fn fetch_open_food_facts(
    client: &reqwest::Client,
    config: &OpenFoodFactsConfig,
    barcode: &str,
) -> color_eyre::Result<Option<ProductInfo>> {
    let response = client
        .get(config.product_url(barcode))
        .timeout(LOOKUP_TIMEOUT)
        .send()
        .await
        .wrap_err("Failed to reach Open Food Facts")?;

    if !response.status().is_success() {
        tracing::info!(status = %response.status(), "Open Food Facts did not return a product");
        return Ok(None);
    }

    let body = response
        .json::<OpenFoodFactsResponse>()
        .await
        .wrap_err("Failed to parse Open Food Facts response")?;

    Ok(match body {
        OpenFoodFactsResponse {
            status: 1,
            product: Some(product),
        } => Some(product.into_product_info(barcode)),
        _ => None,
    })
}
