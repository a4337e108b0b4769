//! Pre-flight validation.
//!
//! Every check runs; violations are collected rather than short-circuited so
//! the operator sees everything that needs fixing at once. The function is
//! pure: the same inputs always produce the same report.

use bulk_core::{ActionData, ActionDescriptor, ItemId};

/// Collected validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// Check a prospective bulk run.
///
/// Checks, in order:
/// 1. an action is chosen
/// 2. at least one item is targeted
/// 3. no more than `max_selection` items are targeted
/// 4. every requirement the action declares is met by `data`
pub fn validate(
    action: Option<&ActionDescriptor>,
    target_ids: &[ItemId],
    data: &ActionData,
    max_selection: usize,
) -> ValidationReport {
    let mut errors = Vec::new();

    if action.is_none() {
        errors.push("Please select an action".to_string());
    }

    if target_ids.is_empty() {
        errors.push("Please select at least one item".to_string());
    }

    if target_ids.len() > max_selection {
        errors.push(format!(
            "Cannot process more than {} items at once ({} selected)",
            max_selection,
            target_ids.len()
        ));
    }

    if let Some(action) = action {
        errors.extend(
            action
                .requires
                .iter()
                .filter(|req| !req.is_satisfied(data))
                .map(|req| req.message().to_string()),
        );
    }

    ValidationReport { errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionCatalog;
    use bulk_core::ContentType;
    use serde_json::json;

    fn ids(n: usize) -> Vec<ItemId> {
        (0..n).map(|i| ItemId::Number(i as i64)).collect()
    }

    fn data(value: serde_json::Value) -> ActionData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_valid_request_passes() {
        let catalog = ActionCatalog::builtin();
        let publish = catalog.get(ContentType::BlogPost, "publish").unwrap();

        let report = validate(Some(&publish), &ids(3), &ActionData::new(), 100);
        assert!(report.is_ok());
    }

    #[test]
    fn test_change_category_requires_category() {
        let catalog = ActionCatalog::builtin();
        let action = catalog.get(ContentType::BlogPost, "change_category").unwrap();

        let targets = [ItemId::from("a"), ItemId::from("b")];
        let report = validate(Some(&action), &targets, &ActionData::new(), 100);
        assert!(!report.is_ok());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].to_lowercase().contains("category"));

        let report = validate(
            Some(&action),
            &targets,
            &data(json!({ "category": "announcements" })),
            100,
        );
        assert!(report.is_ok());
    }

    #[test]
    fn test_all_violations_collected() {
        let report = validate(None, &ids(0), &ActionData::new(), 100);
        assert_eq!(report.errors.len(), 2);

        let catalog = ActionCatalog::builtin();
        let email = catalog.get(ContentType::User, "send_email").unwrap();
        let report = validate(Some(&email), &ids(101), &ActionData::new(), 100);
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].contains("100"));
        assert!(report.errors[1].contains("subject"));
        assert!(report.errors[2].contains("message"));
    }

    #[test]
    fn test_tags_must_be_non_empty() {
        let catalog = ActionCatalog::builtin();
        let action = catalog.get(ContentType::Sermon, "remove_tags").unwrap();

        let report = validate(Some(&action), &ids(1), &data(json!({ "tags": [] })), 100);
        assert!(!report.is_ok());

        let report = validate(Some(&action), &ids(1), &data(json!({ "tags": ["lent"] })), 100);
        assert!(report.is_ok());
    }

    #[test]
    fn test_role_and_location_requirements() {
        let catalog = ActionCatalog::builtin();

        for id in ["promote", "demote"] {
            let action = catalog.get(ContentType::User, id).unwrap();
            let report = validate(Some(&action), &ids(1), &ActionData::new(), 100);
            assert_eq!(report.errors, vec!["Role is required".to_string()]);
        }

        let action = catalog.get(ContentType::Event, "change_location").unwrap();
        let report = validate(Some(&action), &ids(1), &ActionData::new(), 100);
        assert_eq!(report.errors, vec!["Location is required".to_string()]);
    }

    #[test]
    fn test_validate_is_pure() {
        let catalog = ActionCatalog::builtin();
        let action = catalog.get(ContentType::BlogPost, "add_tags").unwrap();
        let targets = ids(120);
        let params = data(json!({ "tags": "" }));

        let first = validate(Some(&action), &targets, &params, 100);
        let second = validate(Some(&action), &targets, &params, 100);
        assert_eq!(first, second);
        assert_eq!(first.errors.len(), 2);
    }

    #[test]
    fn test_exactly_at_ceiling_passes() {
        let catalog = ActionCatalog::builtin();
        let action = catalog.get(ContentType::BlogPost, "archive").unwrap();
        assert!(validate(Some(&action), &ids(100), &ActionData::new(), 100).is_ok());
    }
}
