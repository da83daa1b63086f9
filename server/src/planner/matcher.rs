use db::cooking::{InventoryItem, Recipe, RecipeIngredient};
use serde::Serialize;

/// Loose, case-insensitive name comparison between a recipe ingredient and a pantry item.
///
/// Matches when either name contains the other, or when any whitespace-separated word of
/// `target` appears inside `inventory_name`. Blank names never match anything.
pub fn names_match(target: &str, inventory_name: &str) -> bool {
    let target = target.trim().to_lowercase();
    let inventory_name = inventory_name.trim().to_lowercase();

    if target.is_empty() || inventory_name.is_empty() {
        return false;
    }

    target.contains(&inventory_name)
        || inventory_name.contains(&target)
        || target
            .split_whitespace()
            .any(|word| inventory_name.contains(word))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Availability {
    pub available: bool,
    pub total_quantity: f64,
    pub matched_items: Vec<InventoryItem>,
}

/// Sums every on-hand item whose name matches `target`.
pub fn check_availability(target: &str, items: &[InventoryItem]) -> Availability {
    let matched_items: Vec<InventoryItem> = items
        .iter()
        .filter(|item| names_match(target, &item.name))
        .cloned()
        .collect();

    Availability {
        available: !matched_items.is_empty(),
        total_quantity: matched_items.iter().map(|item| item.quantity).sum(),
        matched_items,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecipeCompletion {
    pub completion_percentage: f64,
    pub available_ingredients_count: usize,
    pub total_ingredients_count: usize,
    pub missing_ingredients: Vec<RecipeIngredient>,
}

/// How much of a recipe can be made from what is on hand. An empty recipe is 0% complete.
pub fn recipe_completion(
    ingredients: &[RecipeIngredient],
    items: &[InventoryItem],
) -> RecipeCompletion {
    let (available, missing): (Vec<&RecipeIngredient>, Vec<&RecipeIngredient>) = ingredients
        .iter()
        .partition(|ingredient| {
            items
                .iter()
                .any(|item| names_match(&ingredient.name, &item.name))
        });

    #[allow(clippy::cast_precision_loss)]
    let completion_percentage = if ingredients.is_empty() {
        0.0
    } else {
        available.len() as f64 / ingredients.len() as f64 * 100.0
    };

    RecipeCompletion {
        completion_percentage,
        available_ingredients_count: available.len(),
        total_ingredients_count: ingredients.len(),
        missing_ingredients: missing.into_iter().cloned().collect(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    #[serde(flatten)]
    pub completion: RecipeCompletion,
}

/// Scores every recipe against the pantry, best first. Ties keep their input order.
pub fn rank_by_completion(recipes: Vec<Recipe>, items: &[InventoryItem]) -> Vec<RankedRecipe> {
    let mut ranked: Vec<RankedRecipe> = recipes
        .into_iter()
        .map(|recipe| {
            let completion = recipe_completion(&recipe.ingredients, items);
            RankedRecipe { recipe, completion }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.completion
            .completion_percentage
            .total_cmp(&a.completion.completion_percentage)
    });

    ranked
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use db::cooking::MealType;
    use uuid::Uuid;

    use super::*;

    fn item(name: &str, quantity: f64) -> InventoryItem {
        InventoryItem {
            inventory_item_id: Uuid::new_v4(),
            name: name.to_string(),
            quantity,
            unit: "each".to_string(),
            category: "general".to_string(),
            barcode: None,
            brand: None,
            location: "pantry".to_string(),
            expiration_date: None,
            purchase_date: None,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ingredient(name: &str) -> RecipeIngredient {
        RecipeIngredient {
            name: name.to_string(),
            quantity: "1".to_string(),
            unit: "each".to_string(),
            store_section: "general".to_string(),
        }
    }

    fn recipe(name: &str, ingredients: &[&str]) -> Recipe {
        Recipe {
            recipe_id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            dietary_restrictions_compliant: vec![],
            ingredients: ingredients.iter().map(|n| ingredient(n)).collect(),
            instructions: vec![],
            prep_time_minutes: 0,
            cook_time_minutes: 0,
            servings: 4,
            meal_types: vec![MealType::Dinner],
            tags: vec![],
            is_favorite: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_names_match_is_symmetric_for_containment() {
        assert!(names_match("Olive Oil", "olive oil"));
        assert!(names_match("oil", "Extra Virgin Olive Oil"));
        assert!(names_match("Extra Virgin Olive Oil", "oil"));
    }

    #[test]
    fn test_names_match_on_any_word() {
        assert!(names_match("chicken breast", "Chicken Thighs"));
        assert!(!names_match("beef stock", "Chicken Thighs"));
    }

    #[test]
    fn test_blank_names_never_match() {
        assert!(!names_match("", "Rice"));
        assert!(!names_match("Rice", "   "));
        assert!(!names_match("  ", ""));
    }

    #[test]
    fn test_check_availability_sums_matches() {
        let items = vec![item("Whole Milk", 1.0), item("Oat Milk", 0.5), item("Eggs", 12.0)];

        let availability = check_availability("milk", &items);

        assert!(availability.available);
        assert!((availability.total_quantity - 1.5).abs() < f64::EPSILON);
        assert_eq!(availability.matched_items.len(), 2);
    }

    #[test]
    fn test_check_availability_without_matches() {
        let availability = check_availability("saffron", &[item("Rice", 2.0)]);

        assert!(!availability.available);
        assert!(availability.total_quantity.abs() < f64::EPSILON);
        assert!(availability.matched_items.is_empty());
    }

    #[test]
    fn test_recipe_completion_counts_missing() {
        let ingredients = vec![ingredient("Rice"), ingredient("Salmon"), ingredient("Dill")];

        let completion = recipe_completion(&ingredients, &[item("Brown Rice", 1.0)]);

        assert_eq!(completion.available_ingredients_count, 1);
        assert_eq!(completion.total_ingredients_count, 3);
        assert!((completion.completion_percentage - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            completion
                .missing_ingredients
                .iter()
                .map(|i| i.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Salmon", "Dill"]
        );
    }

    #[test]
    fn test_empty_recipe_is_zero_percent() {
        let completion = recipe_completion(&[], &[item("Rice", 1.0)]);

        assert!(completion.completion_percentage.abs() < f64::EPSILON);
        assert_eq!(completion.total_ingredients_count, 0);
        assert!(completion.missing_ingredients.is_empty());
    }

    #[test]
    fn test_rank_by_completion_is_stable_descending() {
        let items = vec![item("Rice", 1.0), item("Eggs", 6.0)];
        let recipes = vec![
            recipe("Plain Salmon", &["Salmon"]),
            recipe("Fried Rice", &["Rice", "Eggs"]),
            recipe("Rice Bowl", &["Rice", "Tofu"]),
            recipe("Egg Bowl", &["Eggs", "Tofu"]),
        ];

        let names: Vec<String> = rank_by_completion(recipes, &items)
            .into_iter()
            .map(|r| r.recipe.name)
            .collect();

        assert_eq!(
            names,
            vec!["Fried Rice", "Rice Bowl", "Egg Bowl", "Plain Salmon"]
        );
    }
}
