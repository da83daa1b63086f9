pub mod dietary;
pub mod grocery;
pub mod inventory;
pub mod meal_planning;
pub mod recipe;

pub use dietary::{DietaryRestriction, FilterMode};
pub use grocery::{GroceryList, GroceryListItem};
pub use inventory::{InventoryFilter, InventoryItem, InventoryItemInput, InventoryItemUpdate};
pub use meal_planning::{DayOfWeek, MealPlanEntry, MealPlanEntryInput, MealType};
pub use recipe::{Recipe, RecipeFilter, RecipeIngredient, RecipeInput};
