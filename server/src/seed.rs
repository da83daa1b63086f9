use color_eyre::eyre::Context;
use db::{
    cooking::{DietaryRestriction, MealType, Recipe, RecipeIngredient, RecipeInput},
    PgPool,
};
use tracing::instrument;

fn line(name: &str, quantity: &str, unit: &str, store_section: &str) -> RecipeIngredient {
    RecipeIngredient {
        name: name.to_string(),
        quantity: quantity.to_string(),
        unit: unit.to_string(),
        store_section: store_section.to_string(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

pub fn sample_recipes() -> Vec<RecipeInput> {
    use DietaryRestriction::{DairyFree, GlutenFree, NoAddedSugar, Pescatarian};

    vec![
        RecipeInput {
            name: "Grilled Salmon with Roasted Vegetables".to_string(),
            description: "Omega-3 rich salmon with colorful roasted vegetables".to_string(),
            dietary_restrictions_compliant: vec![GlutenFree, DairyFree, NoAddedSugar, Pescatarian],
            ingredients: vec![
                line("Salmon fillet", "4", "pieces", "fish"),
                line("Broccoli", "2", "cups", "produce"),
                line("Bell peppers", "2", "pieces", "produce"),
                line("Sweet potato", "2", "medium", "produce"),
                line("Olive oil", "3", "tbsp", "pantry"),
                line("Lemon", "1", "piece", "produce"),
                line("Garlic", "3", "cloves", "produce"),
            ],
            instructions: strings(&[
                "Preheat oven to 425°F",
                "Cut vegetables into bite-sized pieces",
                "Toss vegetables with olive oil, salt, and pepper",
                "Roast vegetables for 20 minutes",
                "Season salmon with lemon, garlic, salt, and pepper",
                "Grill salmon for 4-5 minutes per side",
                "Serve salmon over roasted vegetables",
            ]),
            prep_time_minutes: 15,
            cook_time_minutes: 25,
            servings: 4,
            meal_types: vec![MealType::Dinner],
            tags: strings(&["brain-balance", "omega-3", "anti-inflammatory"]),
            is_favorite: false,
        },
        RecipeInput {
            name: "Grass-Fed Beef Stir Fry".to_string(),
            description: "Quick and nutritious stir fry with grass-fed beef".to_string(),
            dietary_restrictions_compliant: vec![GlutenFree, DairyFree, NoAddedSugar],
            ingredients: vec![
                line("Grass-fed beef strips", "1", "lb", "meat"),
                line("Zucchini", "2", "medium", "produce"),
                line("Bell pepper", "1", "piece", "produce"),
                line("Coconut oil", "2", "tbsp", "pantry"),
                line("Coconut aminos", "3", "tbsp", "pantry"),
                line("Ginger", "1", "tbsp", "produce"),
                line("Garlic", "2", "cloves", "produce"),
            ],
            instructions: strings(&[
                "Heat coconut oil in a large skillet",
                "Cook beef strips until browned",
                "Add vegetables and stir fry for 5 minutes",
                "Add garlic and ginger, cook 1 minute",
                "Add coconut aminos and toss to combine",
                "Serve immediately",
            ]),
            prep_time_minutes: 10,
            cook_time_minutes: 15,
            servings: 4,
            meal_types: vec![MealType::Dinner],
            tags: strings(&["carnivore-friendly", "quick", "high-protein"]),
            is_favorite: false,
        },
        RecipeInput {
            name: "Brain Balance Smoothie Bowl".to_string(),
            description: "Nutrient-dense smoothie bowl perfect for breakfast".to_string(),
            dietary_restrictions_compliant: vec![GlutenFree, DairyFree, NoAddedSugar],
            ingredients: vec![
                line("Frozen berries", "1", "cup", "frozen"),
                line("Banana", "1", "piece", "produce"),
                line("Coconut milk", "0.5", "cup", "pantry"),
                line("Chia seeds", "2", "tbsp", "pantry"),
                line("Unsweetened coconut flakes", "2", "tbsp", "pantry"),
                line("Pumpkin seeds", "1", "tbsp", "pantry"),
            ],
            instructions: strings(&[
                "Blend frozen berries, banana, and coconut milk until thick",
                "Pour into bowl",
                "Top with chia seeds, coconut flakes, and pumpkin seeds",
                "Serve immediately",
            ]),
            prep_time_minutes: 5,
            cook_time_minutes: 0,
            servings: 1,
            meal_types: vec![MealType::Breakfast],
            tags: strings(&["brain-balance", "antioxidants", "quick"]),
            is_favorite: false,
        },
    ]
}

/// Deletes every recipe and stores the samples in their place.
#[instrument(skip(pool), err)]
pub async fn reseed_recipes(pool: &PgPool) -> color_eyre::Result<Vec<Recipe>> {
    let removed = Recipe::delete_all(pool)
        .await
        .wrap_err("Failed to clear recipes")?;
    tracing::info!(removed, "Cleared existing recipes");

    let mut created = Vec::new();
    for input in sample_recipes() {
        created.push(Recipe::create(pool, &input).await?);
    }

    tracing::info!(count = created.len(), "Seeded sample recipes");

    Ok(created)
}
