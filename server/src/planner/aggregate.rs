use std::collections::HashMap;

use db::cooking::{
    recipe::{DEFAULT_SERVINGS, DEFAULT_STORE_SECTION},
    GroceryListItem, MealPlanEntry, Recipe, RecipeIngredient,
};
use uuid::Uuid;

const SEE_RECIPES_PREFIX: &str = "See recipes: ";

#[derive(Debug)]
enum Total {
    Numeric(f64),
    /// A contributing quantity was not a number; numeric accumulation is over for this key.
    SeeRecipes(String),
}

#[derive(Debug)]
struct Line {
    ingredient_name: String,
    unit: String,
    store_section: String,
    total: Total,
    from_recipes: Vec<String>,
}

impl Line {
    fn new(ingredient: &RecipeIngredient) -> Self {
        let store_section = if ingredient.store_section.trim().is_empty() {
            DEFAULT_STORE_SECTION.to_string()
        } else {
            ingredient.store_section.clone()
        };

        Self {
            ingredient_name: ingredient.name.clone(),
            unit: ingredient.unit.clone(),
            store_section,
            total: Total::Numeric(0.0),
            from_recipes: Vec::new(),
        }
    }

    fn add(&mut self, recipe_name: &str, quantity: &str, scale: f64) {
        if !self.from_recipes.iter().any(|r| r == recipe_name) {
            self.from_recipes.push(recipe_name.to_string());
        }

        match (parse_quantity(quantity), &mut self.total) {
            (Some(amount), Total::Numeric(total)) => *total += amount * scale,
            (Some(_), Total::SeeRecipes(_)) => {}
            (None, total) => {
                *total = Total::SeeRecipes(format!(
                    "{SEE_RECIPES_PREFIX}{}",
                    self.from_recipes.join(", ")
                ));
            }
        }
    }

    fn into_item(self) -> GroceryListItem {
        let total_quantity = match self.total {
            Total::Numeric(total) => format_quantity(total),
            Total::SeeRecipes(text) => text,
        };

        GroceryListItem {
            ingredient_name: self.ingredient_name,
            total_quantity,
            unit: self.unit,
            store_section: self.store_section,
            from_recipes: self.from_recipes,
        }
    }
}

/// Accumulates per `(ingredient name, unit)`, keeping keys in first-seen order.
#[derive(Debug, Default)]
struct GroceryAggregator {
    lines: Vec<Line>,
    index: HashMap<(String, String), usize>,
}

impl GroceryAggregator {
    fn add_recipe(&mut self, recipe: &Recipe, scale: f64) {
        for ingredient in &recipe.ingredients {
            let key = (ingredient.name.clone(), ingredient.unit.clone());
            let position = match self.index.get(&key) {
                Some(&position) => position,
                None => {
                    self.lines.push(Line::new(ingredient));
                    self.index.insert(key, self.lines.len() - 1);
                    self.lines.len() - 1
                }
            };

            self.lines[position].add(&recipe.name, &ingredient.quantity, scale);
        }
    }

    fn finish(self) -> Vec<GroceryListItem> {
        let mut items: Vec<GroceryListItem> = self.lines.into_iter().map(Line::into_item).collect();
        items.sort_by(|a, b| a.store_section.cmp(&b.store_section));
        items
    }
}

/// Builds the shopping list for a week of planned meals.
///
/// Each entry scales its recipe by `entry.servings / recipe.servings`. Entries pointing at a
/// recipe that is not in `recipes` are skipped. Quantities for the same ingredient name and unit
/// are summed; if any of them is not a number the line becomes a `See recipes: ...` note instead.
/// The result is stably sorted by store section.
pub fn aggregate_grocery_items(
    entries: &[MealPlanEntry],
    recipes: &HashMap<Uuid, Recipe>,
) -> Vec<GroceryListItem> {
    let mut aggregator = GroceryAggregator::default();

    for entry in entries {
        let Some(recipe) = recipes.get(&entry.recipe_id) else {
            tracing::debug!(
                recipe_id = %entry.recipe_id,
                meal_plan_entry_id = %entry.meal_plan_entry_id,
                "Skipping meal plan entry for a recipe that no longer exists"
            );
            continue;
        };

        aggregator.add_recipe(recipe, scale_for(entry.servings, recipe.servings));
    }

    aggregator.finish()
}

fn scale_for(planned_servings: i32, base_servings: i32) -> f64 {
    let base = if base_servings > 0 {
        base_servings
    } else {
        DEFAULT_SERVINGS
    };

    f64::from(planned_servings) / f64::from(base)
}

fn parse_quantity(quantity: &str) -> Option<f64> {
    quantity
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// Whole numbers keep one decimal place (`3.0`); everything else uses the shortest exact form.
#[allow(clippy::float_cmp)]
pub fn format_quantity(total: f64) -> String {
    if total.is_finite() && total.fract() == 0.0 {
        format!("{total:.1}")
    } else {
        format!("{total}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use db::cooking::{DayOfWeek, MealType};

    use super::*;

    fn ingredient(name: &str, quantity: &str, unit: &str, section: &str) -> RecipeIngredient {
        RecipeIngredient {
            name: name.to_string(),
            quantity: quantity.to_string(),
            unit: unit.to_string(),
            store_section: section.to_string(),
        }
    }

    fn recipe(name: &str, servings: i32, ingredients: Vec<RecipeIngredient>) -> Recipe {
        Recipe {
            recipe_id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            dietary_restrictions_compliant: vec![],
            ingredients,
            instructions: vec![],
            prep_time_minutes: 0,
            cook_time_minutes: 0,
            servings,
            meal_types: vec![MealType::Dinner],
            tags: vec![],
            is_favorite: false,
            created_at: Utc::now(),
        }
    }

    fn entry(recipe_id: Uuid, servings: i32) -> MealPlanEntry {
        MealPlanEntry {
            meal_plan_entry_id: Uuid::new_v4(),
            week_start_date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            family_member_id: Uuid::new_v4(),
            day_of_week: DayOfWeek::Monday,
            meal_type: MealType::Dinner,
            recipe_id,
            servings,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    fn lookup(recipes: &[&Recipe]) -> HashMap<Uuid, Recipe> {
        recipes
            .iter()
            .map(|r| (r.recipe_id, (*r).clone()))
            .collect()
    }

    #[test]
    fn test_scales_by_planned_servings() {
        let pancakes = recipe("Pancakes", 4, vec![ingredient("Flour", "2", "cup", "pantry")]);

        let items = aggregate_grocery_items(
            &[entry(pancakes.recipe_id, 2)],
            &lookup(&[&pancakes]),
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].ingredient_name, "Flour");
        assert_eq!(items[0].total_quantity, "1.0");
        assert_eq!(items[0].unit, "cup");
        assert_eq!(items[0].store_section, "pantry");
        assert_eq!(items[0].from_recipes, vec!["Pancakes".to_string()]);
    }

    #[test]
    fn test_sums_across_recipes_with_the_same_unit() {
        let pancakes = recipe("Pancakes", 4, vec![ingredient("Flour", "2", "cup", "pantry")]);
        let bread = recipe("Bread", 2, vec![ingredient("Flour", "3", "cup", "pantry")]);

        let items = aggregate_grocery_items(
            &[entry(pancakes.recipe_id, 4), entry(bread.recipe_id, 2)],
            &lookup(&[&pancakes, &bread]),
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_quantity, "5.0");
        assert_eq!(
            items[0].from_recipes,
            vec!["Pancakes".to_string(), "Bread".to_string()]
        );
    }

    #[test]
    fn test_same_name_with_different_units_stays_separate() {
        let soup = recipe(
            "Soup",
            4,
            vec![
                ingredient("Carrots", "2", "cup", "produce"),
                ingredient("Carrots", "3", "piece", "produce"),
            ],
        );

        let items = aggregate_grocery_items(&[entry(soup.recipe_id, 4)], &lookup(&[&soup]));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].unit, "cup");
        assert_eq!(items[0].total_quantity, "2.0");
        assert_eq!(items[1].unit, "piece");
        assert_eq!(items[1].total_quantity, "3.0");
    }

    #[test]
    fn test_non_numeric_quantity_degrades_to_note() {
        let stew = recipe("Stew", 4, vec![ingredient("Salt", "1 pinch", "", "pantry")]);

        let items = aggregate_grocery_items(
            &[entry(stew.recipe_id, 4), entry(stew.recipe_id, 2)],
            &lookup(&[&stew]),
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_quantity, "See recipes: Stew");
        assert_eq!(items[0].from_recipes, vec!["Stew".to_string()]);
    }

    #[test]
    fn test_degraded_line_ignores_later_numbers_but_records_recipes() {
        let stew = recipe("Stew", 4, vec![ingredient("Salt", "a pinch", "tsp", "pantry")]);
        let roast = recipe("Roast", 4, vec![ingredient("Salt", "1", "tsp", "pantry")]);
        let chili = recipe("Chili", 4, vec![ingredient("Salt", "to taste", "tsp", "pantry")]);

        let items = aggregate_grocery_items(
            &[
                entry(stew.recipe_id, 4),
                entry(roast.recipe_id, 4),
                entry(chili.recipe_id, 4),
            ],
            &lookup(&[&stew, &roast, &chili]),
        );

        assert_eq!(items[0].total_quantity, "See recipes: Stew, Roast, Chili");
        assert_eq!(
            items[0].from_recipes,
            vec!["Stew".to_string(), "Roast".to_string(), "Chili".to_string()]
        );
    }

    #[test]
    fn test_numbers_before_a_failure_are_dropped_from_the_total() {
        let roast = recipe("Roast", 4, vec![ingredient("Salt", "1", "tsp", "pantry")]);
        let stew = recipe("Stew", 4, vec![ingredient("Salt", "a pinch", "tsp", "pantry")]);
        let eggs = recipe("Eggs", 4, vec![ingredient("Salt", "2", "tsp", "pantry")]);

        let items = aggregate_grocery_items(
            &[
                entry(roast.recipe_id, 4),
                entry(stew.recipe_id, 4),
                entry(eggs.recipe_id, 4),
            ],
            &lookup(&[&roast, &stew, &eggs]),
        );

        assert_eq!(items[0].total_quantity, "See recipes: Roast, Stew");
        assert_eq!(items[0].from_recipes.len(), 3);
    }

    #[test]
    fn test_missing_recipes_are_skipped() {
        let pancakes = recipe("Pancakes", 4, vec![ingredient("Flour", "2", "cup", "pantry")]);

        let items = aggregate_grocery_items(
            &[entry(Uuid::new_v4(), 2), entry(pancakes.recipe_id, 4)],
            &lookup(&[&pancakes]),
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_quantity, "2.0");
    }

    #[test]
    fn test_no_entries_means_no_items() {
        assert!(aggregate_grocery_items(&[], &HashMap::new()).is_empty());
    }

    #[test]
    fn test_sorted_by_section_keeping_first_seen_order_within_a_section() {
        let dinner = recipe(
            "Dinner",
            4,
            vec![
                ingredient("Salmon", "1", "lb", "seafood"),
                ingredient("Lemon", "1", "piece", "produce"),
                ingredient("Rice", "2", "cup", "pantry"),
                ingredient("Dill", "1", "bunch", "produce"),
                ingredient("Oil", "1", "tbsp", "pantry"),
            ],
        );

        let items = aggregate_grocery_items(&[entry(dinner.recipe_id, 4)], &lookup(&[&dinner]));
        let names: Vec<&str> = items.iter().map(|i| i.ingredient_name.as_str()).collect();

        assert_eq!(names, vec!["Rice", "Oil", "Lemon", "Dill", "Salmon"]);
    }

    #[test]
    fn test_section_comes_from_first_contribution_and_defaults_to_general() {
        let first = recipe("First", 4, vec![ingredient("Butter", "1", "tbsp", "")]);
        let second = recipe("Second", 4, vec![ingredient("Butter", "1", "tbsp", "dairy")]);

        let items = aggregate_grocery_items(
            &[entry(first.recipe_id, 4), entry(second.recipe_id, 4)],
            &lookup(&[&first, &second]),
        );

        assert_eq!(items[0].store_section, "general");
        assert_eq!(items[0].total_quantity, "2.0");
    }

    #[test]
    fn test_unset_base_servings_falls_back_to_four() {
        let odd = recipe("Odd", 0, vec![ingredient("Beans", "4", "can", "pantry")]);

        let items = aggregate_grocery_items(&[entry(odd.recipe_id, 2)], &lookup(&[&odd]));

        assert_eq!(items[0].total_quantity, "2.0");
    }

    #[test]
    fn test_quantity_whitespace_is_ignored() {
        let toast = recipe("Toast", 1, vec![ingredient("Bread", " 2 ", "slice", "bakery")]);

        let items = aggregate_grocery_items(&[entry(toast.recipe_id, 1)], &lookup(&[&toast]));

        assert_eq!(items[0].total_quantity, "2.0");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(1.0), "1.0");
        assert_eq!(format_quantity(3.0), "3.0");
        assert_eq!(format_quantity(0.5), "0.5");
        assert_eq!(format_quantity(4.0 / 3.0), "1.3333333333333333");
    }
}
