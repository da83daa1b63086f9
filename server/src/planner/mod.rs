//! Pure grocery and pantry logic. Nothing in here touches the database or the network;
//! handlers load the rows and hand them over.

pub mod aggregate;
pub mod matcher;

pub use aggregate::aggregate_grocery_items;
pub use matcher::{
    check_availability, rank_by_completion, recipe_completion, Availability, RankedRecipe,
};
