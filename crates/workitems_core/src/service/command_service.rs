//! Work-item command use-cases.
//!
//! # Responsibility
//! - Translate one user gesture into validated store mutations.
//! - Enforce hierarchy legality before `WorkItemStore::create_item` is called.
//! - Keep completeness in step with field edits (fields first, then status).
//!
//! # Invariants
//! - Titles are trimmed and must not be blank.
//! - Parents must exist and match `ItemType::allowed_parent`.
//! - A declined delete confirmation never mutates the store.

use crate::model::item::{
    check_placement, FieldValue, Fields, ItemId, ItemType, PlacementError, StatusPatch, WorkItem,
    FIELD_TITLE,
};
use crate::store::WorkItemStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Number of children created by the generate commands.
pub const DEFAULT_GENERATED_CHILDREN: usize = 5;

const GENERATED_SUFFIX_RANGE: u128 = 10_000;

/// Errors from command use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Title is blank after trim.
    InvalidTitle,
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Requested parent does not exist.
    ParentNotFound(ItemId),
    /// Type/parent combination violates the hierarchy.
    Placement(PlacementError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::ItemNotFound(id) => write!(f, "work item not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent work item not found: {id}"),
            Self::Placement(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Placement(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PlacementError> for CommandError {
    fn from(value: PlacementError) -> Self {
        Self::Placement(value)
    }
}

/// Result of a delete gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// User declined the confirmation.
    Cancelled,
    /// Item and `removed - 1` descendants were deleted.
    Deleted { removed: usize },
}

/// Command facade over a borrowed store.
pub struct CommandService<'store> {
    store: &'store mut WorkItemStore,
}

impl<'store> CommandService<'store> {
    pub fn new(store: &'store mut WorkItemStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &WorkItemStore {
        &*self.store
    }

    /// Creates a root epic.
    pub fn add_epic(&mut self, title: impl Into<String>) -> Result<ItemId, CommandError> {
        self.add_item(ItemType::Epic, None, title.into())
    }

    /// Creates a feature under an epic.
    pub fn add_feature(
        &mut self,
        epic_id: ItemId,
        title: impl Into<String>,
    ) -> Result<ItemId, CommandError> {
        self.add_item(ItemType::Feature, Some(epic_id), title.into())
    }

    /// Creates a solution intent under an epic.
    pub fn add_solution_intent(
        &mut self,
        epic_id: ItemId,
        title: impl Into<String>,
    ) -> Result<ItemId, CommandError> {
        self.add_item(ItemType::SolutionIntent, Some(epic_id), title.into())
    }

    /// Creates a story under a feature.
    pub fn add_story(
        &mut self,
        feature_id: ItemId,
        title: impl Into<String>,
    ) -> Result<ItemId, CommandError> {
        self.add_item(ItemType::Story, Some(feature_id), title.into())
    }

    /// Creates a child of any legal type under `parent_id`.
    pub fn add_child(
        &mut self,
        parent_id: ItemId,
        kind: ItemType,
        title: impl Into<String>,
    ) -> Result<ItemId, CommandError> {
        self.add_item(kind, Some(parent_id), title.into())
    }

    /// Creates `count` features titled `FEATURE-<n>` under an epic.
    pub fn generate_features(
        &mut self,
        epic_id: ItemId,
        count: usize,
    ) -> Result<Vec<ItemId>, CommandError> {
        self.generate_children(epic_id, ItemType::Feature, "FEATURE", count)
    }

    /// Creates `count` stories titled `STORY-<n>` under a feature.
    pub fn generate_stories(
        &mut self,
        feature_id: ItemId,
        count: usize,
    ) -> Result<Vec<ItemId>, CommandError> {
        self.generate_children(feature_id, ItemType::Story, "STORY", count)
    }

    /// Replaces the title and recomputes completeness.
    pub fn edit_title(
        &mut self,
        id: ItemId,
        title: impl Into<String>,
    ) -> Result<(), CommandError> {
        let title = normalize_title(title.into())?;
        let mut fields = Fields::new();
        fields.insert(FIELD_TITLE.to_string(), FieldValue::Text(title));
        self.edit_fields(id, fields)
    }

    /// Merges `fields` into the item, then recomputes completeness.
    ///
    /// Keys outside the item's field set are ignored, since the field set is
    /// fixed at creation.
    pub fn edit_fields(&mut self, id: ItemId, fields: Fields) -> Result<(), CommandError> {
        let item = self.require_item(id)?;
        let allowed: Fields = fields
            .into_iter()
            .filter(|(name, _)| item.fields.contains_key(name))
            .collect();

        self.store.update_item_fields(&id, allowed);
        self.store.recompute_completeness(&id);
        Ok(())
    }

    /// Sets the loading flag shown while an item is being produced.
    pub fn set_loading(&mut self, id: ItemId, loading: bool) -> Result<(), CommandError> {
        self.require_item(id)?;
        self.store.update_item_status(&id, StatusPatch::loading(loading));
        Ok(())
    }

    /// Sets the error flag.
    pub fn mark_error(&mut self, id: ItemId, is_error: bool) -> Result<(), CommandError> {
        self.require_item(id)?;
        self.store.update_item_status(&id, StatusPatch::error(is_error));
        Ok(())
    }

    /// Deletes an item and its subtree once `confirm` approves it.
    pub fn delete_item(
        &mut self,
        id: ItemId,
        confirm: impl FnOnce(&WorkItem) -> bool,
    ) -> Result<DeleteOutcome, CommandError> {
        let item = self.require_item(id)?;
        if !confirm(item) {
            info!(
                "event=command_delete module=command status=cancelled item_id={}",
                id
            );
            return Ok(DeleteOutcome::Cancelled);
        }

        let removed = self.store.delete_item(&id);
        Ok(DeleteOutcome::Deleted { removed })
    }

    /// One-line summary, e.g. `Details for feature: Checkout`.
    pub fn show_details(&self, id: ItemId) -> Result<String, CommandError> {
        let item = self.require_item(id)?;
        Ok(format!("Details for {}: {}", item.kind, item_label(item)))
    }

    fn add_item(
        &mut self,
        kind: ItemType,
        parent_id: Option<ItemId>,
        title: String,
    ) -> Result<ItemId, CommandError> {
        let title = normalize_title(title)?;
        self.ensure_placement(&kind, parent_id)?;

        let mut overrides = Fields::new();
        overrides.insert(FIELD_TITLE.to_string(), FieldValue::Text(title));
        let id = self.store.create_item(kind.clone(), parent_id, Some(overrides));
        self.store.recompute_completeness(&id);

        info!(
            "event=command_add module=command status=ok kind={} item_id={}",
            kind, id
        );
        Ok(id)
    }

    fn generate_children(
        &mut self,
        parent_id: ItemId,
        kind: ItemType,
        prefix: &str,
        count: usize,
    ) -> Result<Vec<ItemId>, CommandError> {
        self.ensure_placement(&kind, Some(parent_id))?;
        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            let title = format!("{prefix}-{}", random_suffix());
            created.push(self.add_item(kind.clone(), Some(parent_id), title)?);
        }
        Ok(created)
    }

    fn ensure_placement(
        &self,
        kind: &ItemType,
        parent_id: Option<ItemId>,
    ) -> Result<(), CommandError> {
        let parent_kind = match parent_id {
            Some(parent_id) => Some(
                &self
                    .store
                    .get_item(&parent_id)
                    .ok_or(CommandError::ParentNotFound(parent_id))?
                    .kind,
            ),
            None => None,
        };
        check_placement(kind, parent_kind).map_err(Into::into)
    }

    fn require_item(&self, id: ItemId) -> Result<&WorkItem, CommandError> {
        self.store
            .get_item(&id)
            .ok_or(CommandError::ItemNotFound(id))
    }
}

/// Title shown for an item: its non-blank title, else its type name.
pub fn item_label(item: &WorkItem) -> &str {
    match item.title().map(str::trim) {
        Some(title) if !title.is_empty() => title,
        _ => item.kind.as_str(),
    }
}

fn normalize_title(value: String) -> Result<String, CommandError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CommandError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}

fn random_suffix() -> u128 {
    Uuid::new_v4().as_u128() % GENERATED_SUFFIX_RANGE
}
