//! In-memory storage backend

use super::traits::{EdgeRepository, StorageResult};
use crate::graph::{Edge, EdgeId, EdgeKey, EntityRef, RelationType};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
struct StoredEdge {
    seq: u64,
    edge: Edge,
}

/// Edge repository held entirely in memory.
///
/// Keys live in a `DashMap`; uniqueness comes from its per-shard entry
/// lock, so concurrent `create` calls for one key insert once. An atomic
/// sequence number records insertion order for listings.
///
/// `by_source` and `by_target` index keys by endpoint. They are only
/// written while the key's entry in `edges` is locked, so they never
/// disagree with it for long; readers skip keys that are already gone.
#[derive(Debug, Default)]
pub struct MemoryStore {
    edges: DashMap<EdgeKey, StoredEdge>,
    by_source: DashMap<EntityRef, Vec<EdgeKey>>,
    by_target: DashMap<EntityRef, Vec<EdgeKey>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn index_keys(index: &DashMap<EntityRef, Vec<EdgeKey>>, entity: &EntityRef) -> Vec<EdgeKey> {
        index.get(entity).map(|keys| keys.clone()).unwrap_or_default()
    }

    fn unindex(index: &DashMap<EntityRef, Vec<EdgeKey>>, entity: &EntityRef, key: &EdgeKey) {
        if let Entry::Occupied(mut slot) = index.entry(entity.clone()) {
            slot.get_mut().retain(|k| k != key);
            if slot.get().is_empty() {
                slot.remove();
            }
        }
    }

    /// Resolve keys to stored edges in insertion order
    fn resolve(&self, keys: impl IntoIterator<Item = EdgeKey>) -> Vec<Edge> {
        let mut matched: Vec<(u64, Edge)> = keys
            .into_iter()
            .filter_map(|key| {
                self.edges
                    .get(&key)
                    .map(|stored| (stored.seq, stored.edge.clone()))
            })
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        matched.dedup_by_key(|(seq, _)| *seq);
        matched.into_iter().map(|(_, edge)| edge).collect()
    }
}

impl EdgeRepository for MemoryStore {
    fn create(&self, edge: &Edge) -> StorageResult<(EdgeId, bool)> {
        let key = edge.key();
        match self.edges.entry(key.clone()) {
            Entry::Occupied(existing) => Ok((existing.get().edge.id, false)),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                self.by_source
                    .entry(key.source.clone())
                    .or_default()
                    .push(key.clone());
                self.by_target
                    .entry(key.target.clone())
                    .or_default()
                    .push(key);
                slot.insert(StoredEdge {
                    seq,
                    edge: edge.clone(),
                });
                Ok((edge.id, true))
            }
        }
    }

    fn delete(&self, key: &EdgeKey) -> StorageResult<bool> {
        match self.edges.entry(key.clone()) {
            Entry::Occupied(slot) => {
                Self::unindex(&self.by_source, &key.source, key);
                Self::unindex(&self.by_target, &key.target, key);
                slot.remove();
                Ok(true)
            }
            Entry::Vacant(_) => Ok(false),
        }
    }

    fn exists(&self, key: &EdgeKey) -> StorageResult<bool> {
        Ok(self.edges.contains_key(key))
    }

    fn get(&self, key: &EdgeKey) -> StorageResult<Option<Edge>> {
        Ok(self.edges.get(key).map(|stored| stored.edge.clone()))
    }

    fn edges_from(
        &self,
        entity: &EntityRef,
        include_bidirectional_reverse: bool,
    ) -> StorageResult<Vec<Edge>> {
        let mut keys = Self::index_keys(&self.by_source, entity);
        if include_bidirectional_reverse {
            keys.extend(Self::index_keys(&self.by_target, entity));
        }
        Ok(self
            .resolve(keys)
            .into_iter()
            .filter(|edge| &edge.source == entity || edge.is_bidirectional)
            .collect())
    }

    fn edges_to(&self, entity: &EntityRef) -> StorageResult<Vec<Edge>> {
        Ok(self.resolve(Self::index_keys(&self.by_target, entity)))
    }

    fn edges_with_relation(&self, relation: RelationType) -> StorageResult<Vec<Edge>> {
        let mut matched: Vec<(u64, Edge)> = self
            .edges
            .iter()
            .filter(|entry| entry.value().edge.relation == relation)
            .map(|entry| (entry.value().seq, entry.value().edge.clone()))
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        Ok(matched.into_iter().map(|(_, edge)| edge).collect())
    }

    fn delete_all_for_entity(&self, entity: &EntityRef) -> StorageResult<usize> {
        let mut keys: HashSet<EdgeKey> =
            Self::index_keys(&self.by_source, entity).into_iter().collect();
        keys.extend(Self::index_keys(&self.by_target, entity));

        let mut removed = 0;
        for key in keys {
            if self.delete(&key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeType;
    use std::sync::Arc;

    fn note(id: &str) -> EntityRef {
        EntityRef::new(NodeType::Note, id)
    }

    fn research(id: &str) -> EntityRef {
        EntityRef::new(NodeType::Research, id)
    }

    #[test]
    fn create_is_idempotent_per_key() {
        let store = MemoryStore::new();
        let first = Edge::new(note("n1"), research("r1"), RelationType::Summarizes);
        let again = Edge::new(note("n1"), research("r1"), RelationType::Summarizes);

        assert_eq!(store.create(&first).unwrap(), (first.id, true));
        assert_eq!(store.create(&again).unwrap(), (first.id, false));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn same_endpoints_different_relation_are_distinct() {
        let store = MemoryStore::new();
        store.create(&Edge::new(note("n1"), research("r1"), RelationType::Summarizes)).unwrap();
        store.create(&Edge::new(note("n1"), research("r1"), RelationType::References)).unwrap();
        assert_eq!(store.edges_from(&note("n1"), false).unwrap().len(), 2);
    }

    #[test]
    fn reverse_listing_requires_edge_flag() {
        let store = MemoryStore::new();
        store
            .create(
                &Edge::new(note("n1"), research("r1"), RelationType::Related).bidirectional(false),
            )
            .unwrap();
        store
            .create(
                &Edge::new(note("n2"), research("r1"), RelationType::References)
                    .bidirectional(true),
            )
            .unwrap();

        let reverse = store.edges_from(&research("r1"), true).unwrap();
        assert_eq!(reverse.len(), 1);
        assert_eq!(reverse[0].source, note("n2"));
    }

    #[test]
    fn listings_follow_insertion_order() {
        let store = MemoryStore::new();
        for id in ["z", "m", "a"] {
            store.create(&Edge::new(note(id), research("r"), RelationType::References)).unwrap();
        }
        let sources: Vec<_> = store
            .edges_to(&research("r"))
            .unwrap()
            .into_iter()
            .map(|e| e.source.id)
            .collect();
        assert_eq!(sources, vec!["z", "m", "a"]);
    }

    #[test]
    fn cascade_counts_self_loop_once() {
        let store = MemoryStore::new();
        let n = note("n");
        store.create(&Edge::new(n.clone(), n.clone(), RelationType::Related)).unwrap();
        store.create(&Edge::new(n.clone(), research("r"), RelationType::References)).unwrap();
        store.create(&Edge::new(research("q"), n.clone(), RelationType::Summarizes)).unwrap();
        store.create(&Edge::new(research("q"), research("r"), RelationType::Related)).unwrap();

        assert_eq!(store.delete_all_for_entity(&n).unwrap(), 3);
        assert_eq!(store.len(), 1);
        assert_eq!(store.delete_all_for_entity(&n).unwrap(), 0);
    }

    #[test]
    fn endpoint_index_follows_delete_and_recreate() {
        let store = MemoryStore::new();
        let edge = Edge::new(note("n1"), research("r1"), RelationType::Related);
        store.create(&edge).unwrap();
        store.create(&Edge::new(note("n1"), research("r2"), RelationType::References)).unwrap();

        assert!(store.delete(&edge.key()).unwrap());
        assert!(!store.delete(&edge.key()).unwrap());
        assert_eq!(store.edges_from(&note("n1"), false).unwrap().len(), 1);
        assert!(store.edges_to(&research("r1")).unwrap().is_empty());
        assert!(store.edges_from(&research("r1"), true).unwrap().is_empty());

        store.create(&edge).unwrap();
        let targets: Vec<_> = store
            .edges_from(&note("n1"), false)
            .unwrap()
            .into_iter()
            .map(|e| e.target.id)
            .collect();
        assert_eq!(targets, vec!["r2", "r1"]);
        assert_eq!(store.edges_from(&research("r1"), true).unwrap().len(), 1);
    }

    #[test]
    fn self_loop_listed_once() {
        let store = MemoryStore::new();
        let n = note("n");
        store.create(&Edge::new(n.clone(), n.clone(), RelationType::Related)).unwrap();

        assert_eq!(store.edges_from(&n, true).unwrap().len(), 1);
        assert_eq!(store.edges_to(&n).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_creates_insert_once() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .create(&Edge::new(note("n"), research("r"), RelationType::References))
                        .unwrap()
                        .1
                })
            })
            .collect();

        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();
        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
    }
}
