//! Validation gate applied to every recipe before persistence.

use crate::models::RecipeDraft;

pub const NAME_REQUIRED: &str = "Recipe name is required";
pub const INGREDIENTS_REQUIRED: &str = "Recipe must have ingredients information";
pub const INSTRUCTIONS_REQUIRED: &str = "Recipe must have instructions information";

/// Check the persistence invariants of a recipe.
///
/// Every violation is reported; an empty list means the record is accepted.
pub fn validate_recipe(recipe: &RecipeDraft) -> Vec<String> {
    let mut errors = Vec::new();

    if recipe.name.trim().is_empty() {
        errors.push(NAME_REQUIRED.to_string());
    }
    if recipe.ingredients.is_empty() {
        errors.push(INGREDIENTS_REQUIRED.to_string());
    }
    if recipe.instructions.is_empty() {
        errors.push(INSTRUCTIONS_REQUIRED.to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RecipeDraft {
        RecipeDraft {
            name: "Dal Tadka".to_string(),
            ingredients: vec!["1 cup toor dal".to_string()],
            instructions: vec!["Boil the dal".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_recipe_passes() {
        assert!(validate_recipe(&valid()).is_empty());
    }

    #[test]
    fn test_missing_instructions_reports_only_instructions() {
        let recipe = RecipeDraft {
            instructions: vec![],
            ..valid()
        };
        let errors = validate_recipe(&recipe);
        assert_eq!(errors, vec![INSTRUCTIONS_REQUIRED.to_string()]);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let recipe = RecipeDraft {
            name: "   ".to_string(),
            ..valid()
        };
        assert_eq!(validate_recipe(&recipe), vec![NAME_REQUIRED.to_string()]);
    }

    #[test]
    fn test_all_violations_are_collected() {
        let errors = validate_recipe(&RecipeDraft::default());
        assert_eq!(
            errors,
            vec![
                NAME_REQUIRED.to_string(),
                INGREDIENTS_REQUIRED.to_string(),
                INSTRUCTIONS_REQUIRED.to_string(),
            ]
        );
    }
}
