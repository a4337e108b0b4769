//! Action-related types.

use serde::{Deserialize, Serialize};

use crate::item::{ContentType, ItemId};

/// Action-specific parameters (new category id, tag list, email body, ...).
pub type ActionData = serde_json::Map<String, serde_json::Value>;

/// A parameter an action needs before it may run.
///
/// Each action carries its own list of requirements, so validation is a
/// table lookup on the descriptor instead of a branch per action id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// Field must be present, non-null and not blank.
    Field { name: String, message: String },

    /// Field must hold at least one entry.
    ///
    /// Accepts a JSON array or a comma-separated string.
    NonEmptyList { name: String, message: String },
}

impl Requirement {
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Field {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn non_empty_list(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NonEmptyList {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Name of the `ActionData` field this requirement inspects.
    pub fn name(&self) -> &str {
        match self {
            Self::Field { name, .. } | Self::NonEmptyList { name, .. } => name,
        }
    }

    /// Message reported when the requirement is not met.
    pub fn message(&self) -> &str {
        match self {
            Self::Field { message, .. } | Self::NonEmptyList { message, .. } => message,
        }
    }

    /// Check the requirement against the supplied parameters.
    pub fn is_satisfied(&self, data: &ActionData) -> bool {
        use serde_json::Value;

        let value = data.get(self.name());
        match self {
            Self::Field { .. } => match value {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            },
            Self::NonEmptyList { .. } => match value {
                Some(Value::Array(items)) => !items.is_empty(),
                Some(Value::String(s)) => s.split(',').any(|part| !part.trim().is_empty()),
                _ => false,
            },
        }
    }
}

/// Describes one bulk action an operator can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Stable action identifier sent to the backend, e.g. "publish".
    pub id: String,

    /// Human label shown in the action menu.
    pub label: String,

    /// Icon identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// One-line description for confirmation prompts.
    #[serde(default)]
    pub description: String,

    /// Destructive actions get a confirmation step in the UI.
    #[serde(default)]
    pub destructive: bool,

    /// Parameters that must be present in `ActionData`.
    #[serde(default)]
    pub requires: Vec<Requirement>,

    /// Action id that compensates for this one, used by undo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse: Option<String>,
}

impl ActionDescriptor {
    /// Create a descriptor with required fields.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: None,
            description: String::new(),
            destructive: false,
            requires: Vec::new(),
            inverse: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    pub fn requires(mut self, requirement: Requirement) -> Self {
        self.requires.push(requirement);
        self
    }

    pub fn with_inverse(mut self, inverse: impl Into<String>) -> Self {
        self.inverse = Some(inverse.into());
        self
    }

    /// Whether the action needs extra parameters.
    pub fn needs_parameters(&self) -> bool {
        !self.requires.is_empty()
    }
}

/// One bulk action, resolved and ready to execute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRequest {
    pub content_type: ContentType,
    pub action: ActionDescriptor,
    pub target_ids: Vec<ItemId>,
    #[serde(default)]
    pub additional_data: ActionData,
}

impl BulkRequest {
    pub fn new(
        content_type: ContentType,
        action: ActionDescriptor,
        target_ids: Vec<ItemId>,
    ) -> Self {
        Self {
            content_type,
            action,
            target_ids,
            additional_data: ActionData::new(),
        }
    }

    pub fn with_data(mut self, additional_data: ActionData) -> Self {
        self.additional_data = additional_data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: serde_json::Value) -> ActionData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_field_requirement() {
        let req = Requirement::field("category", "Category is required");

        assert!(!req.is_satisfied(&data(json!({}))));
        assert!(!req.is_satisfied(&data(json!({ "category": null }))));
        assert!(!req.is_satisfied(&data(json!({ "category": "  " }))));
        assert!(req.is_satisfied(&data(json!({ "category": "news" }))));
        assert!(req.is_satisfied(&data(json!({ "category": 12 }))));
    }

    #[test]
    fn test_list_requirement() {
        let req = Requirement::non_empty_list("tags", "At least one tag is required");

        assert!(!req.is_satisfied(&data(json!({ "tags": [] }))));
        assert!(!req.is_satisfied(&data(json!({ "tags": " , " }))));
        assert!(!req.is_satisfied(&data(json!({ "tags": 3 }))));
        assert!(req.is_satisfied(&data(json!({ "tags": ["easter"] }))));
        assert!(req.is_satisfied(&data(json!({ "tags": "easter, youth" }))));
    }

    #[test]
    fn test_descriptor_builder() {
        let action = ActionDescriptor::new("delete", "Delete")
            .with_icon("trash")
            .destructive();

        assert!(action.destructive);
        assert!(!action.needs_parameters());
        assert_eq!(action.icon.as_deref(), Some("trash"));
    }
}
