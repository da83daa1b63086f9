use std::fmt::Write as _;

use db::{
    cooking::{DietaryRestriction, FilterMode, GroceryList, InventoryItem, MealType},
    family_members::FamilyMember,
};
use openai::{
    chat::{complete_chat, ChatMessage},
    OpenAiConfig,
};
use serde::{Deserialize, Serialize};

pub const AI_FALLBACK: &str = "Unable to generate AI recommendations at this time.";

const SYSTEM_PROMPT: &str = "You are a helpful nutritionist and meal planning assistant \
specializing in dietary restrictions including Brain Balance diet, pescatarian, carnivore, and \
various food allergies. Provide practical, family-friendly meal suggestions and grocery \
optimization advice.";

/// Asks the model and returns its reply, or [`AI_FALLBACK`] when it is unconfigured or fails.
pub async fn ask(client: &reqwest::Client, config: Option<&OpenAiConfig>, prompt: String) -> String {
    let Some(config) = config else {
        tracing::info!("OpenAI not configured, returning fallback text");
        return AI_FALLBACK.to_string();
    };

    let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];

    match complete_chat(client, config, messages, Some(0.7)).await {
        Ok(reply) => reply.content,
        Err(e) => {
            tracing::error!(error = ?e, "AI recommendation request failed");
            AI_FALLBACK.to_string()
        }
    }
}

fn join_or_none<T: ToString>(values: &[T]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn family_recommendation_prompt(
    members: &[FamilyMember],
    meal_type: MealType,
    filter_mode: FilterMode,
) -> String {
    let mut member_info = String::new();
    for member in members {
        let _ = writeln!(
            member_info,
            "- {}: Dietary restrictions: {}, Allergies: {}, Favorites: {}",
            member.name,
            join_or_none(&member.dietary_restrictions),
            join_or_none(&member.allergies),
            join_or_none(&member.favorite_ingredients),
        );
    }

    format!(
        "Please recommend {meal_type} recipes for a family with these members:\n\
         {member_info}\n\
         Filter mode: {filter_mode}\n\n\
         Please provide 3-5 specific recipe suggestions that work for this family, considering \
         their dietary restrictions and preferences. Include recipe names, brief descriptions, \
         and why they work for this family."
    )
}

pub fn grocery_optimization_prompt(list: &GroceryList) -> String {
    let mut items_text = String::new();
    for item in &list.items {
        let _ = writeln!(
            items_text,
            "- {}: {} {} (from: {})",
            item.ingredient_name,
            item.total_quantity,
            item.unit,
            item.from_recipes.join(", "),
        );
    }

    format!(
        "Here's a grocery list for the week:\n\
         {items_text}\n\
         Please provide optimization suggestions including:\n\
         1. Ingredient substitutions to save money or improve nutrition\n\
         2. Bulk buying recommendations\n\
         3. Seasonal alternatives\n\
         4. Store organization tips\n\
         5. Items that could be prepared at home instead of bought pre-made\n\n\
         Keep suggestions practical for a busy family."
    )
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealSuggestionRequest {
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    pub max_time_minutes: Option<i32>,
    pub meal_type: Option<MealType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealSuggestion {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub estimated_time_minutes: Option<i32>,
}

pub fn meal_suggestion_prompt(request: &MealSuggestionRequest, on_hand: &[InventoryItem]) -> String {
    let pantry = on_hand
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>();

    let meal_type = request
        .meal_type
        .map_or_else(|| "any meal".to_string(), |m| m.to_string());
    let max_time = request
        .max_time_minutes
        .map_or_else(|| "no limit".to_string(), |m| format!("{m} minutes"));

    format!(
        "Suggest 3 {meal_type} ideas.\n\
         Dietary restrictions: {}\n\
         Maximum total time: {max_time}\n\
         Ingredients on hand: {}\n\n\
         Prefer ingredients that are on hand. Respond with only a JSON array of objects with the \
         keys \"name\", \"description\", \"ingredients\" (array of strings) and \
         \"estimated_time_minutes\" (number).",
        join_or_none(&request.dietary_restrictions),
        join_or_none(&pantry),
    )
}

/// Reads the JSON array out of a model reply. Anything unparseable becomes one free-text suggestion.
pub fn parse_meal_suggestions(reply: &str) -> Vec<MealSuggestion> {
    let parsed = match (reply.find('['), reply.rfind(']')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<Vec<MealSuggestion>>(&reply[start..=end]).ok()
        }
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        vec![MealSuggestion {
            name: "AI Suggestion".to_string(),
            description: reply.trim().to_string(),
            ingredients: vec![],
            estimated_time_minutes: None,
        }]
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use db::cooking::GroceryListItem;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_parse_meal_suggestions_from_fenced_json() {
        let reply = "Here you go:\n```json\n[{\"name\": \"Salmon Bowl\", \"description\": \"Quick\", \
                     \"ingredients\": [\"salmon\", \"rice\"], \"estimated_time_minutes\": 20}]\n```";

        let suggestions = parse_meal_suggestions(reply);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "Salmon Bowl");
        assert_eq!(suggestions[0].ingredients, vec!["salmon", "rice"]);
        assert_eq!(suggestions[0].estimated_time_minutes, Some(20));
    }

    #[test]
    fn test_parse_meal_suggestions_falls_back_to_text() {
        let suggestions = parse_meal_suggestions(AI_FALLBACK);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].description, AI_FALLBACK);
    }

    #[tokio::test]
    async fn test_ask_without_config_returns_fallback() {
        let reply = ask(&reqwest::Client::new(), None, "anything".to_string()).await;

        assert_eq!(reply, AI_FALLBACK);
    }

    #[test]
    fn test_family_prompt_lists_members() {
        let member = FamilyMember {
            family_member_id: Uuid::new_v4(),
            name: "Avery".to_string(),
            dietary_restrictions: vec![DietaryRestriction::GlutenFree],
            favorite_ingredients: vec!["salmon".to_string()],
            allergies: vec![],
            dislikes: vec![],
            notes: String::new(),
            created_at: Utc::now(),
        };

        let prompt = family_recommendation_prompt(&[member], MealType::Dinner, FilterMode::Strict);

        assert!(prompt.contains("recommend dinner recipes"));
        assert!(prompt.contains(
            "- Avery: Dietary restrictions: gluten_free, Allergies: none, Favorites: salmon"
        ));
        assert!(prompt.contains("Filter mode: strict"));
    }

    #[test]
    fn test_grocery_prompt_lists_items() {
        let list = GroceryList {
            grocery_list_id: Uuid::new_v4(),
            week_start_date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            items: vec![GroceryListItem {
                ingredient_name: "Flour".to_string(),
                total_quantity: "1.0".to_string(),
                unit: "cup".to_string(),
                store_section: "pantry".to_string(),
                from_recipes: vec!["Pancakes".to_string(), "Bread".to_string()],
            }],
            created_at: Utc::now(),
        };

        assert!(grocery_optimization_prompt(&list).contains("- Flour: 1.0 cup (from: Pancakes, Bread)"));
    }
}
