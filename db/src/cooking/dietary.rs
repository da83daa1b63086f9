use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DietaryRestriction {
    #[serde(rename = "gluten_free")]
    GlutenFree,
    #[serde(rename = "dairy_free")]
    DairyFree,
    #[serde(rename = "no_added_sugar")]
    NoAddedSugar,
    #[serde(rename = "pescatarian")]
    Pescatarian,
    #[serde(rename = "carnivore")]
    Carnivore,
    #[serde(rename = "vegetarian")]
    Vegetarian,
    #[serde(rename = "vegan")]
    Vegan,
    #[serde(rename = "nut_free")]
    NutFree,
    #[serde(rename = "soy_free")]
    SoyFree,
    #[serde(rename = "egg_free")]
    EggFree,
}

impl fmt::Display for DietaryRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DietaryRestriction::GlutenFree => write!(f, "gluten_free"),
            DietaryRestriction::DairyFree => write!(f, "dairy_free"),
            DietaryRestriction::NoAddedSugar => write!(f, "no_added_sugar"),
            DietaryRestriction::Pescatarian => write!(f, "pescatarian"),
            DietaryRestriction::Carnivore => write!(f, "carnivore"),
            DietaryRestriction::Vegetarian => write!(f, "vegetarian"),
            DietaryRestriction::Vegan => write!(f, "vegan"),
            DietaryRestriction::NutFree => write!(f, "nut_free"),
            DietaryRestriction::SoyFree => write!(f, "soy_free"),
            DietaryRestriction::EggFree => write!(f, "egg_free"),
        }
    }
}

impl std::str::FromStr for DietaryRestriction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gluten_free" => Ok(DietaryRestriction::GlutenFree),
            "dairy_free" => Ok(DietaryRestriction::DairyFree),
            "no_added_sugar" => Ok(DietaryRestriction::NoAddedSugar),
            "pescatarian" => Ok(DietaryRestriction::Pescatarian),
            "carnivore" => Ok(DietaryRestriction::Carnivore),
            "vegetarian" => Ok(DietaryRestriction::Vegetarian),
            "vegan" => Ok(DietaryRestriction::Vegan),
            "nut_free" => Ok(DietaryRestriction::NutFree),
            "soy_free" => Ok(DietaryRestriction::SoyFree),
            "egg_free" => Ok(DietaryRestriction::EggFree),
            _ => Err(format!("Unknown dietary restriction: {s}")),
        }
    }
}

/// How a list of requested restrictions is applied when filtering recipes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// The recipe must comply with every requested restriction.
    Strict,
    /// The recipe must comply with at least one requested restriction.
    #[default]
    Flexible,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::Strict => write!(f, "strict"),
            FilterMode::Flexible => write!(f, "flexible"),
        }
    }
}
