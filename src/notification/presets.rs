//! Named notifications used across the meal app.
//!
//! Each preset is a fixed title/icon/message template over one of the
//! category constructors.

use serde::Deserialize;

use super::registry::NotificationRegistry;
use super::types::{Category, NotificationId, NotificationOptions};

impl NotificationRegistry {
    pub fn meal_logged(&self, meal_name: &str) -> NotificationId {
        self.success_with(
            format!("{} has been added to your food diary.", meal_name),
            NotificationOptions::new().title("Meal Logged").icon("🍽️"),
        )
    }

    pub fn food_safety_alert(&self, food: &str, reason: &str) -> NotificationId {
        self.error_with(
            format!("{}: {}", food, reason),
            NotificationOptions::new().title("Food Safety Alert").icon("⚠️"),
        )
    }

    pub fn recommendations_ready(&self, count: usize) -> NotificationId {
        let message = if count == 1 {
            "1 new meal recommendation is ready for you.".to_string()
        } else {
            format!("{} new meal recommendations are ready for you.", count)
        };
        self.info_with(
            message,
            NotificationOptions::new().title("Recommendations Ready").icon("✨"),
        )
    }

    pub fn allergen_warning(&self, food: &str, allergen: &str) -> NotificationId {
        self.warning_with(
            format!("{} contains {}, which is listed in your allergies.", food, allergen),
            NotificationOptions::new().title("Allergen Warning").icon("🥜"),
        )
    }

    pub fn goal_reached(&self, goal: &str) -> NotificationId {
        self.success_with(
            format!("You reached your {} goal today.", goal),
            NotificationOptions::new().title("Goal Reached").icon("🎯"),
        )
    }

    pub fn profile_saved(&self) -> NotificationId {
        self.success_with(
            "Your nutrition profile has been updated.",
            NotificationOptions::new().title("Profile Saved").icon("👤"),
        )
    }

    pub fn sync_failed(&self, detail: &str) -> NotificationId {
        self.error_with(
            format!("We could not sync your data: {}", detail),
            NotificationOptions::new().title("Sync Failed").icon("🔌"),
        )
    }
}

/// A preset selected by name, e.g. `{"preset": "meal_logged", "meal": "Oatmeal"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "preset", rename_all = "snake_case")]
pub enum Preset {
    MealLogged { meal: String },
    FoodSafetyAlert { food: String, reason: String },
    RecommendationsReady { count: usize },
    AllergenWarning { food: String, allergen: String },
    GoalReached { goal: String },
    ProfileSaved,
    SyncFailed { detail: String },
}

impl Preset {
    /// Category the preset is raised with; presets always use its default lifetime.
    pub fn category(&self) -> Category {
        match self {
            Preset::MealLogged { .. } | Preset::GoalReached { .. } | Preset::ProfileSaved => {
                Category::Success
            }
            Preset::FoodSafetyAlert { .. } | Preset::SyncFailed { .. } => Category::Error,
            Preset::RecommendationsReady { .. } => Category::Info,
            Preset::AllergenWarning { .. } => Category::Warning,
        }
    }

    pub fn apply(&self, registry: &NotificationRegistry) -> NotificationId {
        match self {
            Preset::MealLogged { meal } => registry.meal_logged(meal),
            Preset::FoodSafetyAlert { food, reason } => registry.food_safety_alert(food, reason),
            Preset::RecommendationsReady { count } => registry.recommendations_ready(*count),
            Preset::AllergenWarning { food, allergen } => registry.allergen_warning(food, allergen),
            Preset::GoalReached { goal } => registry.goal_reached(goal),
            Preset::ProfileSaved => registry.profile_saved(),
            Preset::SyncFailed { detail } => registry.sync_failed(detail),
        }
    }
}
