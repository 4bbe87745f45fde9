//! Input validation applied before anything reaches the store.

use crate::error::ValidationError;
use crate::task::TaskInput;

/// Longest accepted title, in characters.
pub const TITLE_MAX_CHARS: usize = 100;
/// Longest accepted description, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Check a task input against the rules in order and report the first failure.
pub fn validate(input: &TaskInput) -> Result<(), ValidationError> {
    if input.title.trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if input.title.chars().count() > TITLE_MAX_CHARS {
        return Err(ValidationError::TitleTooLong);
    }
    if input.description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_title() {
        assert_eq!(validate(&TaskInput::new("Buy milk")), Ok(()));
    }

    #[test]
    fn rejects_empty_and_whitespace_titles() {
        assert_eq!(validate(&TaskInput::new("")), Err(ValidationError::TitleRequired));
        assert_eq!(validate(&TaskInput::new(" \t\n")), Err(ValidationError::TitleRequired));
    }

    #[test]
    fn title_limit_is_inclusive() {
        assert_eq!(validate(&TaskInput::new("a".repeat(100))), Ok(()));
        assert_eq!(
            validate(&TaskInput::new("a".repeat(101))),
            Err(ValidationError::TitleTooLong)
        );
    }

    #[test]
    fn description_limit_is_inclusive() {
        let ok = TaskInput::new("t").with_description("d".repeat(500));
        let long = TaskInput::new("t").with_description("d".repeat(501));
        assert_eq!(validate(&ok), Ok(()));
        assert_eq!(validate(&long), Err(ValidationError::DescriptionTooLong));
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // 100 two-byte characters.
        assert_eq!(validate(&TaskInput::new("ğ".repeat(100))), Ok(()));
    }

    #[test]
    fn first_failing_rule_wins() {
        let input = TaskInput::new("a".repeat(101)).with_description("d".repeat(501));
        assert_eq!(validate(&input), Err(ValidationError::TitleTooLong));

        let input = TaskInput::new("  ").with_description("d".repeat(501));
        assert_eq!(validate(&input), Err(ValidationError::TitleRequired));
    }
}
