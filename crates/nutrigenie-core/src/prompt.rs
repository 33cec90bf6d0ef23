use nutrigenie_common::{Error, Result};

/// Section titles the recommendation prompt asks the model to emit,
/// in order. The post-processor slices responses on these.
pub const RECOMMENDATION_SECTIONS: [&str; 3] = ["Foods to Eat", "Foods to Avoid", "Tips"];

pub const DIETARY_PREFERENCES: [&str; 11] = [
    "No Preference",
    "Vegetarian",
    "Vegan",
    "Non-vegetarian",
    "Keto",
    "Gluten-Free",
    "Low-Carb",
    "High-Protein",
    "Mediterranean",
    "Low-Fat",
    "Dairy-Free",
];

pub const HEALTH_GOALS: [&str; 14] = [
    "No Specific Goal",
    "Weight Loss",
    "Muscle Gain",
    "Managing Diabetes",
    "Boosting Immunity",
    "Heart Health",
    "Improving Gut Health",
    "Blood Pressure",
    "Better Skin and Hair",
    "Improving Mental Health",
    "Pregnancy Diet",
    "Healthy Aging",
    "Managing Thyroid",
    "Improving Stamina",
];

fn require_non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

/// Instruction for dietary recommendations for a health concern.
///
/// Asks the model to tag each section as `[[Title]]` on its own line so the
/// post-processor can split structurally instead of scraping free text.
pub fn recommendation(condition: &str) -> Result<String> {
    let condition = require_non_empty(condition, "health problem")?;

    Ok(format!(
        "You are a certified nutritionist. A user has the following health problem: {condition}.\n\
         Provide detailed recommendations, including:\n\
         1. Foods to eat.\n\
         2. Foods to avoid.\n\
         3. Lifestyle and exercise tips.\n\
         Start each of the three parts with its title alone on a line, written exactly as\n\
         [[Foods to Eat]], [[Foods to Avoid]] and [[Tips]]."
    ))
}

/// Fixed instruction for meal-photo analysis. The image travels alongside
/// this text in the same generation request.
pub fn meal_analysis() -> String {
    "You are an expert nutritionist. Analyze the image to identify the food items \
     and calculate the total calories. Provide the result in the following format:\n\
     Calories\n\
     1. Item 1 - no. of calories\n\
     2. Item 2 - no. of calories\n\
     ----\n\
     Protein\n\
     1. Item 1 - no. of protein\n\
     ----\n\
     Carbs\n\
     1. Item 1 - no. of carbs\n\
     ----\n\
     Fats\n\
     1. Item 1 - no. of fats\n\
     ----\n\
     1. Total Calories: XX\n\
     2. Total Protein: XX\n\
     3. Total Carbs: XX\n\
     4. Total Fats: XX"
        .to_string()
}

/// Instruction for recipe suggestions from preference, goal, and pantry contents.
pub fn recipes(dietary_preference: &str, health_goal: &str, ingredients: &str) -> Result<String> {
    let ingredients = require_non_empty(ingredients, "ingredients")?;
    let dietary_preference = if dietary_preference.trim().is_empty() {
        DIETARY_PREFERENCES[0]
    } else {
        dietary_preference.trim()
    };
    let health_goal = if health_goal.trim().is_empty() {
        HEALTH_GOALS[0]
    } else {
        health_goal.trim()
    };

    Ok(format!(
        "You are a master chef and nutritionist. Based on the following inputs:\n\
         - Dietary Preference: {dietary_preference}\n\
         - Health Goal: {health_goal}\n\
         - Ingredients: {ingredients}\n\
         Suggest 6 healthy and delicious recipes. For each recipe, include:\n\
         1. Recipe name\n\
         2. Brief description\n\
         3. Ingredients list\n\
         4. Step-by-step cooking instructions\n\
         5. Nutritional information (calories, protein, carbs, fats)"
    ))
}

/// Instruction for a shopping list covering planned recipes minus what
/// is already on hand.
pub fn shopping_list(planned_recipes: &str, available_ingredients: &str) -> Result<String> {
    let planned = require_non_empty(planned_recipes, "planned recipes")?;
    let available = require_non_empty(available_ingredients, "available ingredients")?;

    Ok(format!(
        "You are a kitchen assistant. Based on the following inputs:\n\
         - Planned Recipes: {planned}\n\
         - Ingredients at Home: {available}\n\
         Create a smart shopping list by identifying the missing ingredients needed to \
         make the planned recipes. Categorize the ingredients into sections \
         (e.g., Vegetables, Spices, Dairy, etc.) for easy shopping."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_interpolates_condition() {
        let prompt = recommendation("diabetes").expect("valid condition");
        assert!(prompt.contains("health problem: diabetes"));
        assert!(prompt.contains("[[Foods to Eat]]"));
        assert!(prompt.contains("[[Tips]]"));
    }

    #[test]
    fn recommendation_rejects_empty_condition() {
        assert!(recommendation("").is_err());
        assert!(recommendation("   ").is_err());
    }

    #[test]
    fn require_non_empty_returns_trimmed_borrow_of_input() {
        let owned = String::from("  anemia  ");
        let trimmed = require_non_empty(&owned, "health problem").expect("non-empty input");
        assert_eq!(trimmed, "anemia");
        assert!(require_non_empty("  ", "health problem").is_err());
    }

    #[test]
    fn recommendation_trims_condition() {
        let prompt = recommendation("  obesity  ").expect("valid condition");
        assert!(prompt.contains("health problem: obesity."));
    }

    #[test]
    fn meal_analysis_lists_macro_sections() {
        let prompt = meal_analysis();
        for heading in ["Calories", "Protein", "Carbs", "Fats", "Total Calories"] {
            assert!(prompt.contains(heading), "missing heading {heading}");
        }
    }

    #[test]
    fn recipes_requires_ingredients() {
        assert!(recipes("Vegan", "Weight Loss", "").is_err());

        let prompt = recipes("Vegan", "Weight Loss", "tofu, rice").expect("valid inputs");
        assert!(prompt.contains("Dietary Preference: Vegan"));
        assert!(prompt.contains("Health Goal: Weight Loss"));
        assert!(prompt.contains("Ingredients: tofu, rice"));
    }

    #[test]
    fn recipes_defaults_blank_preference_and_goal() {
        let prompt = recipes("", "", "eggs").expect("valid inputs");
        assert!(prompt.contains("Dietary Preference: No Preference"));
        assert!(prompt.contains("Health Goal: No Specific Goal"));
    }

    #[test]
    fn shopping_list_requires_both_fields() {
        assert!(shopping_list("", "rice").is_err());
        assert!(shopping_list("Chicken Curry", "").is_err());

        let prompt =
            shopping_list("Chicken Curry, Greek Salad", "rice, garlic").expect("valid inputs");
        assert!(prompt.contains("Planned Recipes: Chicken Curry, Greek Salad"));
        assert!(prompt.contains("Ingredients at Home: rice, garlic"));
    }
}
