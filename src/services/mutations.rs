//! Mutations that need the user's confirmation before they are sent.

use crate::api::ResourceWriter;
use crate::api::errors::ApiResult;
use crate::domain::types::{EntityId, ResourceName};

/// Row reference carried by a confirmation: id plus display title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub id: EntityId,
    pub title: String,
}

impl Target {
    pub fn new(id: EntityId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// A staged mutation waiting for confirm or dismiss.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    Delete(Target),
    BulkDelete(Vec<Target>),
    Restore(Target),
    ForceDelete(Target),
    BulkForceDelete(Vec<Target>),
    /// Every row of the current page. Showing deleted rows makes it a force
    /// delete.
    DeleteAll { targets: Vec<Target>, force: bool },
    ToggleActive { target: Target, current: bool },
}

fn titles(targets: &[Target]) -> String {
    targets
        .iter()
        .map(|target| target.title.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl PendingAction {
    pub fn ids(&self) -> Vec<EntityId> {
        match self {
            PendingAction::Delete(target)
            | PendingAction::Restore(target)
            | PendingAction::ForceDelete(target)
            | PendingAction::ToggleActive { target, .. } => vec![target.id],
            PendingAction::BulkDelete(targets)
            | PendingAction::BulkForceDelete(targets)
            | PendingAction::DeleteAll { targets, .. } => {
                targets.iter().map(|target| target.id).collect()
            }
        }
    }

    /// Question put to the user.
    pub fn message(&self) -> String {
        match self {
            PendingAction::Delete(target) => {
                format!("Are you sure you want to delete \"{}\"?", target.title)
            }
            PendingAction::BulkDelete(targets) => format!(
                "Are you sure you want to delete {} selected item(s)?\n\n{}",
                targets.len(),
                titles(targets)
            ),
            PendingAction::Restore(target) => {
                format!("Are you sure you want to restore \"{}\"?", target.title)
            }
            PendingAction::ForceDelete(target) => format!(
                "Are you sure you want to permanently delete \"{}\"? This action cannot be undone!",
                target.title
            ),
            PendingAction::BulkForceDelete(targets) => format!(
                "Are you sure you want to PERMANENTLY delete {} selected item(s)?\n\n{}\n\nThis action cannot be undone!",
                targets.len(),
                titles(targets)
            ),
            PendingAction::DeleteAll {
                targets,
                force: true,
            } => format!(
                "Are you sure you want to PERMANENTLY delete all {} items?",
                targets.len()
            ),
            PendingAction::DeleteAll {
                targets,
                force: false,
            } => format!(
                "Are you sure you want to delete all {} items: {}?",
                targets.len(),
                titles(targets)
            ),
            PendingAction::ToggleActive { target, current } => format!(
                "Are you sure you want to {} \"{}\"?",
                if *current { "deactivate" } else { "activate" },
                target.title
            ),
        }
    }

    /// Only force deletes cannot be taken back.
    pub fn is_irreversible(&self) -> bool {
        matches!(
            self,
            PendingAction::ForceDelete(_)
                | PendingAction::BulkForceDelete(_)
                | PendingAction::DeleteAll { force: true, .. }
        )
    }

    /// Bulk operations act on the selection and clear it when they succeed.
    pub fn clears_selection(&self) -> bool {
        matches!(
            self,
            PendingAction::BulkDelete(_)
                | PendingAction::BulkForceDelete(_)
                | PendingAction::DeleteAll { .. }
        )
    }

    /// Issues the single API call behind this action.
    pub fn execute<W>(&self, api: &W, resource: &ResourceName) -> ApiResult<()>
    where
        W: ResourceWriter + ?Sized,
    {
        let ids = self.ids();
        match self {
            PendingAction::Delete(_)
            | PendingAction::BulkDelete(_)
            | PendingAction::DeleteAll { force: false, .. } => api.delete(resource, &ids),
            PendingAction::ForceDelete(_)
            | PendingAction::BulkForceDelete(_)
            | PendingAction::DeleteAll { force: true, .. } => api.force_delete(resource, &ids),
            PendingAction::Restore(_) => api.restore(resource, &ids),
            PendingAction::ToggleActive { target, current } => {
                api.set_active(resource, target.id, !current)
            }
        }
    }

    pub fn success_message(&self) -> String {
        match self {
            PendingAction::Delete(_) => "Deleted successfully!".to_string(),
            PendingAction::BulkDelete(targets)
            | PendingAction::DeleteAll {
                targets,
                force: false,
            } => format!("{} items deleted successfully!", targets.len()),
            PendingAction::Restore(target) => {
                format!("\"{}\" has been successfully restored!", target.title)
            }
            PendingAction::ForceDelete(target) => {
                format!("\"{}\" has been permanently deleted!", target.title)
            }
            PendingAction::BulkForceDelete(targets)
            | PendingAction::DeleteAll {
                targets,
                force: true,
            } => format!("All {} items permanently deleted!", targets.len()),
            PendingAction::ToggleActive { current, .. } => format!(
                "{} successfully!",
                if *current { "Deactivated" } else { "Activated" }
            ),
        }
    }

    /// Shown when the call fails and the server gave no message.
    pub fn failure_message(&self) -> &'static str {
        match self {
            PendingAction::Delete(_)
            | PendingAction::BulkDelete(_)
            | PendingAction::DeleteAll { force: false, .. } => "Error deleting items",
            PendingAction::Restore(_) => "An error occurred while restoring the item.",
            PendingAction::ForceDelete(_)
            | PendingAction::BulkForceDelete(_)
            | PendingAction::DeleteAll { force: true, .. } => "Error permanently deleting items",
            PendingAction::ToggleActive { .. } => "Error updating status",
        }
    }
}
