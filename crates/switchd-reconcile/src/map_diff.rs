//! Generic three-way diff/merge over id-keyed entity maps.

use crate::error::{ReconcileError, ReconcileResult};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use switchd_state::NodeMap;

/// Accumulates the outcome of reconciling one entity class.
///
/// Each reconciled entity is pushed with its previous node (if the id
/// existed before) and its updated node (`None` meaning "identical to
/// previous; carry the old handle forward"). [`NodeMapDiff::finish`]
/// then reports the new map, or `None` when nothing observable changed:
/// no node was replaced or created, and every previous id was consumed
/// (ids not consumed are implicit deletions, which count as change).
pub(crate) struct NodeMapDiff<K, V> {
    kind: &'static str,
    entries: BTreeMap<K, Arc<V>>,
    changed: bool,
    existing_processed: usize,
}

impl<K: Ord + Display, V> NodeMapDiff<K, V> {
    pub(crate) fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
            changed: false,
            existing_processed: 0,
        }
    }

    /// Returns true if `id` has already been pushed.
    pub(crate) fn contains(&self, id: &K) -> bool {
        self.entries.contains_key(id)
    }

    /// Records the outcome for one entity.
    ///
    /// At least one of `orig` and `updated` must be present: an entity is
    /// either carried over, replaced, or newly created.
    pub(crate) fn update(
        &mut self,
        id: K,
        orig: Option<&Arc<V>>,
        updated: Option<Arc<V>>,
    ) -> ReconcileResult<()> {
        if orig.is_some() {
            self.existing_processed += 1;
        }
        let node = match (updated, orig) {
            (Some(node), _) => {
                self.changed = true;
                node
            }
            (None, Some(orig)) => Arc::clone(orig),
            (None, None) => unreachable!("entity with neither previous nor updated node"),
        };
        let id_str = id.to_string();
        if self.entries.insert(id, node).is_some() {
            return Err(ReconcileError::DuplicateEntry {
                kind: self.kind,
                id: id_str,
            });
        }
        Ok(())
    }

    /// Builds the new map, or `None` when nothing changed relative to
    /// `prev`.
    pub(crate) fn finish(mut self, prev: &NodeMap<K, V>) -> Option<NodeMap<K, V>> {
        if self.existing_processed < prev.len() {
            // Some previous entities were implicitly deleted.
            self.changed = true;
        }
        if self.changed {
            Some(NodeMap::from(self.entries))
        } else {
            None
        }
    }
}
