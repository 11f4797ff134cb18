//! References: the indirection layer between nodes and components.
//!
//! A reference names one component and optionally carries a partial config
//! override for that usage site. Reuse happens here: several references can
//! point at the same component with different overrides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use trellis_common::{shallow_merge, CompId, ConfigMap, RefId};

/// One usage site of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub ref_id: RefId,
    pub comp_id: CompId,
    /// Partial config patch for this site. `None` means no overrides.
    pub overrides: Option<ConfigMap>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reference {
    pub fn new(ref_id: RefId, comp_id: CompId, overrides: Option<ConfigMap>) -> Self {
        let now = Utc::now();
        Self {
            ref_id,
            comp_id,
            overrides,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply this reference's overrides to a base config.
    pub fn merge_config(&self, base: &ConfigMap) -> ConfigMap {
        shallow_merge(base, self.overrides.as_ref())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Flat map of references by ID.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReferenceStore {
    references: HashMap<RefId, Reference>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: Reference) {
        debug!(ref_id = %reference.ref_id, comp_id = %reference.comp_id, "Inserting reference");
        self.references.insert(reference.ref_id, reference);
    }

    pub fn get(&self, ref_id: RefId) -> Option<&Reference> {
        self.references.get(&ref_id)
    }

    pub fn get_mut(&mut self, ref_id: RefId) -> Option<&mut Reference> {
        self.references.get_mut(&ref_id)
    }

    pub fn remove(&mut self, ref_id: RefId) -> Option<Reference> {
        debug!(ref_id = %ref_id, "Removing reference");
        self.references.remove(&ref_id)
    }

    pub fn contains(&self, ref_id: RefId) -> bool {
        self.references.contains_key(&ref_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.references.values()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Every reference pointing at a component.
    pub fn referencing(&self, comp_id: CompId) -> Vec<&Reference> {
        self.references
            .values()
            .filter(|r| r.comp_id == comp_id)
            .collect()
    }
}
