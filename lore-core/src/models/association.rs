//! Project ↔ bucket associations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a project holds a bucket.
///
/// `owned` is exclusive (local scope, exactly one owner); `imported` is a
/// reference to a shared library bucket — many projects may hold one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    Imported,
    Owned,
}

impl AssociationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imported => "imported",
            Self::Owned => "owned",
        }
    }
}

impl std::fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project's link to a bucket. Created on import/promote, destroyed on
/// unlink or project deletion. Deleting a project's associations never
/// deletes a library bucket's underlying index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAssociation {
    pub project_id: String,
    pub bucket_id: String,
    pub kind: AssociationKind,
    /// Whether the bucket participates in whole-library retrieval for the
    /// project. Defaults to true; toggled without touching the link itself.
    #[serde(default = "default_active")]
    pub active: bool,
    pub linked_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl ProjectAssociation {
    pub fn new(project_id: impl Into<String>, bucket_id: impl Into<String>, kind: AssociationKind) -> Self {
        Self {
            project_id: project_id.into(),
            bucket_id: bucket_id.into(),
            kind,
            active: true,
            linked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_association_is_active() {
        let a = ProjectAssociation::new("proj", "bucket", AssociationKind::Imported);
        assert!(a.active);
        assert_eq!(a.kind, AssociationKind::Imported);
    }

    #[test]
    fn active_defaults_on_deserialize() {
        // Association files written before the activation feature lack the field.
        let json = r#"{"project_id":"p","bucket_id":"b","kind":"owned","linked_at":"2024-01-01T00:00:00Z"}"#;
        let a: ProjectAssociation = serde_json::from_str(json).unwrap();
        assert!(a.active);
    }
}
