//! Tag set reconciliation
//!
//! Computes the minimal untag/tag operations that turn an observed tag
//! mapping into a desired one. Keys are independent of each other, so the
//! removals and additions may be applied in either order.

use crate::model::Tags;
use std::collections::BTreeSet;

/// Tag operations needed to reach the desired mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    /// Keys present in observed but absent from desired
    pub to_remove: BTreeSet<String>,

    /// New keys, and existing keys whose value changed
    pub to_add: Tags,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Apply removals then additions to `observed`
    pub fn apply(&self, observed: &Tags) -> Tags {
        let mut result: Tags = observed
            .iter()
            .filter(|(key, _)| !self.to_remove.contains(*key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, value) in &self.to_add {
            result.insert(key.clone(), value.clone());
        }
        result
    }

    /// Removal keys as a list, in key order
    pub fn removed_keys(&self) -> Vec<String> {
        self.to_remove.iter().cloned().collect()
    }
}

/// Compute the tag diff between observed and desired mappings
pub fn diff(observed: &Tags, desired: &Tags) -> TagDiff {
    let mut result = TagDiff::default();

    for (key, observed_value) in observed {
        match desired.get(key) {
            None => {
                result.to_remove.insert(key.clone());
            }
            Some(desired_value) if desired_value != observed_value => {
                result.to_add.insert(key.clone(), desired_value.clone());
            }
            Some(_) => {}
        }
    }

    for (key, desired_value) in desired {
        if !observed.contains_key(key) {
            result.to_add.insert(key.clone(), desired_value.clone());
        }
    }

    result
}
