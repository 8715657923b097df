//! Id-keyed map of shared entity nodes.

use std::collections::BTreeMap;
use std::sync::Arc;

/// An ordered map from entity id to a shared entity node.
///
/// This is the container every entity class of the state tree lives in.
/// Values are `Arc` handles: cloning the map, or carrying a node from one
/// state generation to the next, never copies the node itself. Two state
/// generations that share a node expose that through
/// [`Arc::ptr_eq`], which is the downstream change-detection primitive.
///
/// The map itself is never mutated once it is part of a published
/// `SwitchState`; [`NodeMap::insert`] exists for building new generations
/// and test fixtures.
#[derive(Debug)]
pub struct NodeMap<K, V> {
    nodes: BTreeMap<K, Arc<V>>,
}

impl<K: Ord, V> NodeMap<K, V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Returns the number of entities in the map.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the map holds no entities.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up the node for `id`.
    pub fn get(&self, id: &K) -> Option<&Arc<V>> {
        self.nodes.get(id)
    }

    /// Returns true if `id` is present.
    pub fn contains(&self, id: &K) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterates over `(id, node)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Arc<V>)> {
        self.nodes.iter()
    }

    /// Iterates over nodes in id order.
    pub fn values(&self) -> impl Iterator<Item = &Arc<V>> {
        self.nodes.values()
    }

    /// Inserts a node, returning the previous node for `id` if any.
    pub fn insert(&mut self, id: K, node: Arc<V>) -> Option<Arc<V>> {
        self.nodes.insert(id, node)
    }
}

impl<K: Ord, V> Default for NodeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V> Clone for NodeMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
        }
    }
}

impl<K: Ord, V> From<BTreeMap<K, Arc<V>>> for NodeMap<K, V> {
    fn from(nodes: BTreeMap<K, Arc<V>>) -> Self {
        Self { nodes }
    }
}

impl<K: Ord, V> FromIterator<(K, Arc<V>)> for NodeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, Arc<V>)>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl<K: Ord, V: PartialEq> PartialEq for NodeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_and_get() {
        let mut map: NodeMap<u32, String> = NodeMap::new();
        assert!(map.is_empty());

        map.insert(1, Arc::new("one".to_string()));
        map.insert(2, Arc::new("two".to_string()));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1).unwrap().as_str(), "one");
        assert!(map.get(&3).is_none());
    }

    #[test]
    fn test_clone_shares_nodes() {
        let mut map: NodeMap<u32, String> = NodeMap::new();
        map.insert(1, Arc::new("shared".to_string()));

        let copy = map.clone();
        assert!(Arc::ptr_eq(map.get(&1).unwrap(), copy.get(&1).unwrap()));
    }

    #[test]
    fn test_value_equality() {
        let a: NodeMap<u32, String> = [(1, Arc::new("x".to_string()))].into_iter().collect();
        let b: NodeMap<u32, String> = [(1, Arc::new("x".to_string()))].into_iter().collect();
        // Distinct handles, equal values.
        assert!(!Arc::ptr_eq(a.get(&1).unwrap(), b.get(&1).unwrap()));
        assert_eq!(a, b);
    }
}
