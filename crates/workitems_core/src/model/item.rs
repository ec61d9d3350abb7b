//! Work-item model.
//!
//! # Responsibility
//! - Define the `WorkItem` record, its type tag, fields and status flags.
//! - Provide type-specific default fields and the completeness predicate.
//! - Describe which parent type each item type may be placed under.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `status.is_complete` is derived; `is_complete()` is the source of truth.
//! - Unknown type names are preserved verbatim and get a `Title`-only field set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one work item.
pub type ItemId = Uuid;

/// Field name -> value mapping of one item.
pub type Fields = BTreeMap<String, FieldValue>;

/// Field present on every item type.
pub const FIELD_TITLE: &str = "Title";

const EPIC_FIELDS: &[&str] = &[FIELD_TITLE, "Description"];
const FEATURE_FIELDS: &[&str] = &[FIELD_TITLE, "Description"];
const SOLUTION_INTENT_FIELDS: &[&str] = &[
    FIELD_TITLE,
    "InitiativeBackground",
    "SolutionBackOrHighLevelRequirement",
];
const STORY_FIELDS: &[&str] = &[FIELD_TITLE, "AcceptanceCriteria", "Description"];
const FALLBACK_FIELDS: &[&str] = &[FIELD_TITLE];

/// Hierarchy tier of a work item.
///
/// Serialized with kebab-case wire names (`solution-intent`). Names outside the
/// known set round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
    /// Top-level, root-only item.
    Epic,
    /// Second tier under an epic; may hold stories.
    Feature,
    /// Second tier under an epic; leaf.
    SolutionIntent,
    /// Leaf under a feature.
    Story,
    /// Type name not known to this build.
    Other(String),
}

impl ItemType {
    /// Parses a wire name. Unknown names are kept as `Other`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "epic" => Self::Epic,
            "feature" => Self::Feature,
            "solution-intent" => Self::SolutionIntent,
            "story" => Self::Story,
            other => Self::Other(other.to_string()),
        }
    }

    /// Kebab-case wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Epic => "epic",
            Self::Feature => "feature",
            Self::SolutionIntent => "solution-intent",
            Self::Story => "story",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Human-facing label, e.g. `Solution Intent`.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Epic => "Epic",
            Self::Feature => "Feature",
            Self::SolutionIntent => "Solution Intent",
            Self::Story => "Story",
            Self::Other(name) => name.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Ordered field names created for this type.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::Epic => EPIC_FIELDS,
            Self::Feature => FEATURE_FIELDS,
            Self::SolutionIntent => SOLUTION_INTENT_FIELDS,
            Self::Story => STORY_FIELDS,
            Self::Other(_) => FALLBACK_FIELDS,
        }
    }

    /// Parent type this item must be placed under.
    ///
    /// `None` means the item is a root (epic) or its type is unknown.
    pub fn allowed_parent(&self) -> Option<ItemType> {
        match self {
            Self::Feature | Self::SolutionIntent => Some(Self::Epic),
            Self::Story => Some(Self::Feature),
            Self::Epic | Self::Other(_) => None,
        }
    }
}

impl From<String> for ItemType {
    fn from(value: String) -> Self {
        Self::parse(value.as_str())
    }
}

impl From<&str> for ItemType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<ItemType> for String {
    fn from(value: ItemType) -> Self {
        match value {
            ItemType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for ItemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field value.
///
/// Items created by this crate only hold `Text`. `Other` keeps non-string
/// values found in persisted snapshots instead of rejecting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Other(serde_json::Value),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Other(_) => None,
        }
    }

    /// Whether this value satisfies the completeness rule.
    ///
    /// Non-string values are vacuously satisfied.
    pub fn is_filled(&self) -> bool {
        match self {
            Self::Text(value) => !value.trim().is_empty(),
            Self::Other(_) => true,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Status flags rendered next to an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatus {
    pub is_loading: bool,
    /// Derived from fields; recompute instead of trusting a stored value.
    pub is_complete: bool,
    pub is_error: bool,
}

/// Partial status update; `None` keys are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusPatch {
    pub is_loading: Option<bool>,
    pub is_complete: Option<bool>,
    pub is_error: Option<bool>,
}

impl StatusPatch {
    pub fn complete(value: bool) -> Self {
        Self {
            is_complete: Some(value),
            ..Self::default()
        }
    }

    pub fn loading(value: bool) -> Self {
        Self {
            is_loading: Some(value),
            ..Self::default()
        }
    }

    pub fn error(value: bool) -> Self {
        Self {
            is_error: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.is_loading.is_none() && self.is_complete.is_none() && self.is_error.is_none()
    }

    /// Merges set keys into `status`. Returns whether any flag changed.
    pub fn apply_to(&self, status: &mut ItemStatus) -> bool {
        let before = *status;
        if let Some(value) = self.is_loading {
            status.is_loading = value;
        }
        if let Some(value) = self.is_complete {
            status.is_complete = value;
        }
        if let Some(value) = self.is_error {
            status.is_error = value;
        }
        before != *status
    }
}

/// Canonical work-item record owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: ItemId,
    /// Serialized as `type` to match the persisted snapshot format.
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub fields: Fields,
    #[serde(default)]
    pub status: ItemStatus,
    /// Display order of children.
    #[serde(default)]
    pub child_ids: Vec<ItemId>,
}

impl WorkItem {
    /// Builds a fresh item with default status and no children.
    ///
    /// Only the store calls this; callers go through `WorkItemStore::create_item`.
    pub(crate) fn new(id: ItemId, kind: ItemType, fields: Fields) -> Self {
        Self {
            id,
            kind,
            fields,
            status: ItemStatus::default(),
            child_ids: Vec::new(),
        }
    }

    /// Title text, if the item has a string `Title` field.
    pub fn title(&self) -> Option<&str> {
        self.fields.get(FIELD_TITLE).and_then(FieldValue::as_text)
    }

    /// Text value of one field.
    pub fn field_text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }

    pub fn is_complete(&self) -> bool {
        is_complete(self)
    }

    /// Rewrites `status.is_complete` from fields. Returns whether it changed.
    pub fn refresh_completeness(&mut self) -> bool {
        let complete = fields_complete(&self.fields);
        let changed = self.status.is_complete != complete;
        self.status.is_complete = complete;
        changed
    }
}

/// Returns the empty default field set of `kind`.
pub fn default_fields(kind: &ItemType) -> Fields {
    kind.field_names()
        .iter()
        .map(|name| ((*name).to_string(), FieldValue::Text(String::new())))
        .collect()
}

/// Completeness predicate: every string field is non-blank after trim.
pub fn is_complete(item: &WorkItem) -> bool {
    fields_complete(&item.fields)
}

pub fn fields_complete(fields: &Fields) -> bool {
    fields.values().all(FieldValue::is_filled)
}

/// Hierarchy rule violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// Type is not one of the known tiers.
    UnknownType(String),
    /// Epics are roots and take no parent.
    EpicCannotHaveParent,
    /// Non-epic item was created without a parent.
    MissingParent(ItemType),
    /// Parent exists but has the wrong tier.
    ParentTypeMismatch {
        kind: ItemType,
        expected: ItemType,
        actual: ItemType,
    },
}

impl Display for PlacementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType(name) => write!(f, "unknown work item type: `{name}`"),
            Self::EpicCannotHaveParent => write!(f, "an epic cannot have a parent"),
            Self::MissingParent(kind) => write!(f, "a {kind} requires a parent"),
            Self::ParentTypeMismatch {
                kind,
                expected,
                actual,
            } => write!(
                f,
                "a {kind} must be placed under a {expected}, not a {actual}"
            ),
        }
    }
}

impl Error for PlacementError {}

/// Checks that `kind` may be created under a parent of `parent_kind`.
pub fn check_placement(
    kind: &ItemType,
    parent_kind: Option<&ItemType>,
) -> Result<(), PlacementError> {
    if let ItemType::Other(name) = kind {
        return Err(PlacementError::UnknownType(name.clone()));
    }
    match (kind.allowed_parent(), parent_kind) {
        (None, None) => Ok(()),
        (None, Some(_)) => Err(PlacementError::EpicCannotHaveParent),
        (Some(_), None) => Err(PlacementError::MissingParent(kind.clone())),
        (Some(expected), Some(actual)) if expected == *actual => Ok(()),
        (Some(expected), Some(actual)) => Err(PlacementError::ParentTypeMismatch {
            kind: kind.clone(),
            expected,
            actual: actual.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_placement, default_fields, ItemType, PlacementError, StatusPatch};

    #[test]
    fn parse_keeps_unknown_names() {
        assert_eq!(ItemType::parse("solution-intent"), ItemType::SolutionIntent);
        assert_eq!(
            ItemType::parse("initiative"),
            ItemType::Other("initiative".to_string())
        );
        assert_eq!(String::from(ItemType::Story), "story");
    }

    #[test]
    fn unknown_type_defaults_to_title_only() {
        let fields = default_fields(&ItemType::parse("bug"));
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("Title"));
    }

    #[test]
    fn placement_table_matches_hierarchy() {
        assert!(check_placement(&ItemType::Epic, None).is_ok());
        assert!(check_placement(&ItemType::Feature, Some(&ItemType::Epic)).is_ok());
        assert!(check_placement(&ItemType::SolutionIntent, Some(&ItemType::Epic)).is_ok());
        assert!(check_placement(&ItemType::Story, Some(&ItemType::Feature)).is_ok());

        assert_eq!(
            check_placement(&ItemType::Story, Some(&ItemType::Epic)).unwrap_err(),
            PlacementError::ParentTypeMismatch {
                kind: ItemType::Story,
                expected: ItemType::Feature,
                actual: ItemType::Epic,
            }
        );
        assert_eq!(
            check_placement(&ItemType::Epic, Some(&ItemType::Epic)).unwrap_err(),
            PlacementError::EpicCannotHaveParent
        );
        assert_eq!(
            check_placement(&ItemType::Feature, None).unwrap_err(),
            PlacementError::MissingParent(ItemType::Feature)
        );
    }

    #[test]
    fn status_patch_reports_changes_only() {
        let mut status = super::ItemStatus::default();
        assert!(!StatusPatch::complete(false).apply_to(&mut status));
        assert!(StatusPatch::loading(true).apply_to(&mut status));
        assert!(status.is_loading);
        assert!(StatusPatch::default().is_empty());
    }
}
