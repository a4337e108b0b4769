//! Action Catalog
//!
//! Per-content-type table of bulk actions. The built-in table covers blog
//! posts, sermons, events and users; callers can register extra actions.
//! Descriptors are immutable once registered.

use parking_lot::RwLock;
use std::collections::HashMap;

use bulk_core::{ActionDescriptor, ContentType, Requirement};

/// Registry of bulk actions by content type.
pub struct ActionCatalog {
    actions: RwLock<HashMap<ContentType, Vec<ActionDescriptor>>>,
}

impl ActionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            actions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a catalog populated with the built-in actions.
    pub fn builtin() -> Self {
        let catalog = Self::new();
        for content_type in ContentType::ALL {
            for action in builtin_actions(content_type) {
                catalog.insert(content_type, action);
            }
        }
        catalog
    }

    /// Register an action.
    ///
    /// Returns false (and leaves the catalog unchanged) when the id is
    /// already taken for that content type.
    pub fn register(&self, content_type: ContentType, action: ActionDescriptor) -> bool {
        let id = action.id.clone();
        if self.insert(content_type, action) {
            tracing::info!("Registered bulk action '{}' for {}", id, content_type);
            true
        } else {
            tracing::warn!("Bulk action '{}' already registered for {}", id, content_type);
            false
        }
    }

    fn insert(&self, content_type: ContentType, action: ActionDescriptor) -> bool {
        let mut actions = self.actions.write();
        let list = actions.entry(content_type).or_default();
        if list.iter().any(|a| a.id == action.id) {
            return false;
        }
        list.push(action);
        true
    }

    /// Look up an action by id.
    pub fn get(&self, content_type: ContentType, id: &str) -> Option<ActionDescriptor> {
        let actions = self.actions.read();
        actions
            .get(&content_type)
            .and_then(|list| list.iter().find(|a| a.id == id).cloned())
    }

    /// Actions available for a content type, in registration order.
    pub fn list(&self, content_type: ContentType) -> Vec<ActionDescriptor> {
        let actions = self.actions.read();
        actions.get(&content_type).cloned().unwrap_or_default()
    }

    /// Count of actions registered for a content type.
    pub fn count(&self, content_type: ContentType) -> usize {
        let actions = self.actions.read();
        actions.get(&content_type).map_or(0, Vec::len)
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Built-in Table
// =============================================================================

fn publish() -> ActionDescriptor {
    ActionDescriptor::new("publish", "Publish")
        .with_icon("send")
        .with_description("Make the selected items publicly visible")
        .with_inverse("unpublish")
}

fn unpublish() -> ActionDescriptor {
    ActionDescriptor::new("unpublish", "Unpublish")
        .with_icon("eye-off")
        .with_description("Move the selected items back to draft")
        .with_inverse("publish")
}

fn delete() -> ActionDescriptor {
    ActionDescriptor::new("delete", "Delete")
        .with_icon("trash")
        .with_description("Permanently delete the selected items")
        .destructive()
        .with_inverse("restore")
}

fn feature() -> ActionDescriptor {
    ActionDescriptor::new("feature", "Feature")
        .with_icon("star")
        .with_description("Pin the selected items to the front page")
        .with_inverse("unfeature")
}

fn unfeature() -> ActionDescriptor {
    ActionDescriptor::new("unfeature", "Unfeature")
        .with_icon("star-off")
        .with_description("Remove the selected items from the front page")
        .with_inverse("feature")
}

fn add_tags() -> ActionDescriptor {
    ActionDescriptor::new("add_tags", "Add Tags")
        .with_icon("tag")
        .with_description("Add tags to the selected items")
        .requires(Requirement::non_empty_list("tags", "At least one tag is required"))
        .with_inverse("remove_tags")
}

fn remove_tags() -> ActionDescriptor {
    ActionDescriptor::new("remove_tags", "Remove Tags")
        .with_icon("tag-off")
        .with_description("Remove tags from the selected items")
        .requires(Requirement::non_empty_list("tags", "At least one tag is required"))
        .with_inverse("add_tags")
}

fn change_category() -> ActionDescriptor {
    ActionDescriptor::new("change_category", "Change Category")
        .with_icon("folder")
        .with_description("Move the selected items to another category")
        .requires(Requirement::field("category", "Category is required"))
}

fn builtin_actions(content_type: ContentType) -> Vec<ActionDescriptor> {
    match content_type {
        ContentType::BlogPost => vec![
            publish(),
            unpublish(),
            feature(),
            unfeature(),
            change_category(),
            add_tags(),
            remove_tags(),
            ActionDescriptor::new("archive", "Archive")
                .with_icon("archive")
                .with_description("Hide the selected posts from listings")
                .with_inverse("unarchive"),
            delete(),
        ],
        ContentType::Sermon => vec![
            publish(),
            unpublish(),
            feature(),
            unfeature(),
            change_category(),
            add_tags(),
            remove_tags(),
            ActionDescriptor::new("change_series", "Change Series")
                .with_icon("layers")
                .with_description("Move the selected sermons to another series")
                .requires(Requirement::field("series", "Series is required")),
            delete(),
        ],
        ContentType::Event => vec![
            publish(),
            unpublish(),
            feature(),
            unfeature(),
            ActionDescriptor::new("change_location", "Change Location")
                .with_icon("map-pin")
                .with_description("Move the selected events to another venue")
                .requires(Requirement::field("location", "Location is required")),
            ActionDescriptor::new("cancel_event", "Cancel Event")
                .with_icon("calendar-x")
                .with_description("Cancel the selected events and notify registrants")
                .destructive()
                .with_inverse("reinstate_event"),
            delete(),
        ],
        ContentType::User => vec![
            ActionDescriptor::new("activate", "Activate")
                .with_icon("user-check")
                .with_description("Allow the selected users to sign in")
                .with_inverse("deactivate"),
            ActionDescriptor::new("deactivate", "Deactivate")
                .with_icon("user-x")
                .with_description("Block the selected users from signing in")
                .with_inverse("activate"),
            ActionDescriptor::new("promote", "Promote")
                .with_icon("shield")
                .with_description("Grant the selected users a higher role")
                .requires(Requirement::field("role", "Role is required"))
                .with_inverse("demote"),
            ActionDescriptor::new("demote", "Demote")
                .with_icon("shield-off")
                .with_description("Move the selected users to a lower role")
                .requires(Requirement::field("role", "Role is required"))
                .with_inverse("promote"),
            ActionDescriptor::new("send_email", "Send Email")
                .with_icon("mail")
                .with_description("Email the selected users")
                .requires(Requirement::field("subject", "Email subject is required"))
                .requires(Requirement::field("message", "Email message is required")),
            ActionDescriptor::new("reset_password", "Reset Password")
                .with_icon("key")
                .with_description("Send password reset links to the selected users"),
            delete(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_content_type() {
        let catalog = ActionCatalog::builtin();
        for content_type in ContentType::ALL {
            assert!(catalog.count(content_type) > 0, "{} has no actions", content_type);
            assert!(catalog.get(content_type, "delete").is_some());
        }
    }

    #[test]
    fn test_ids_unique_per_content_type() {
        let catalog = ActionCatalog::builtin();
        for content_type in ContentType::ALL {
            let list = catalog.list(content_type);
            let mut ids: Vec<_> = list.iter().map(|a| a.id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), list.len());
        }
    }

    #[test]
    fn test_parameterised_actions_declare_requirements() {
        let catalog = ActionCatalog::builtin();

        let category = catalog.get(ContentType::BlogPost, "change_category").unwrap();
        assert_eq!(category.requires[0].name(), "category");

        let email = catalog.get(ContentType::User, "send_email").unwrap();
        let names: Vec<_> = email.requires.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["subject", "message"]);

        let location = catalog.get(ContentType::Event, "change_location").unwrap();
        assert!(location.needs_parameters());

        assert!(!catalog.get(ContentType::BlogPost, "publish").unwrap().needs_parameters());
    }

    #[test]
    fn test_actions_scoped_by_content_type() {
        let catalog = ActionCatalog::builtin();
        assert!(catalog.get(ContentType::User, "publish").is_none());
        assert!(catalog.get(ContentType::BlogPost, "send_email").is_none());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let catalog = ActionCatalog::new();
        let first = ActionDescriptor::new("duplicate", "Duplicate");
        let second = ActionDescriptor::new("duplicate", "Again");
        assert!(catalog.register(ContentType::Event, first));
        assert!(!catalog.register(ContentType::Event, second));

        assert_eq!(catalog.count(ContentType::Event), 1);
        assert_eq!(catalog.get(ContentType::Event, "duplicate").unwrap().label, "Duplicate");
        assert_eq!(catalog.count(ContentType::User), 0);
    }
}
