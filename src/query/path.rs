//! Shortest-path search between two entities

use std::collections::{HashMap, HashSet};

use super::types::{clamp_depth, PathElement, PathResult, Traversal, DEFAULT_MAX_DEPTH};
use crate::graph::{Edge, EntityRef};
use crate::storage::{EdgeRepository, StorageResult};

/// Query for the shortest connection between two entities
#[derive(Debug, Clone)]
pub struct PathQuery {
    pub source: EntityRef,
    pub target: EntityRef,
    /// Maximum number of hops searched
    pub max_depth: usize,
}

impl PathQuery {
    /// Create a new path query between two entities
    pub fn between(source: EntityRef, target: EntityRef) -> Self {
        Self {
            source,
            target,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set maximum path length, clamped into the allowed range
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = clamp_depth(max_depth);
        self
    }

    /// Execute the path query (level-by-level BFS, edges treated as undirected).
    ///
    /// Among several shortest paths the first one reached in frontier order
    /// wins; frontier order follows the repository's insertion order.
    pub fn execute<S: EdgeRepository + ?Sized>(&self, store: &S) -> StorageResult<PathResult> {
        if self.source == self.target {
            return Ok(PathResult::found(vec![PathElement::node(0, &self.source)]));
        }

        let max_depth = clamp_depth(self.max_depth);
        let mut visited: HashSet<EntityRef> = HashSet::new();
        let mut predecessors: HashMap<EntityRef, (EntityRef, Edge)> = HashMap::new();
        let mut frontier = vec![self.source.clone()];
        visited.insert(self.source.clone());

        for _ in 0..max_depth {
            if frontier.is_empty() {
                break;
            }

            let mut next = Vec::new();
            for current in &frontier {
                for edge in self.neighbor_edges(store, current)? {
                    let Some(neighbor) = edge.other_end(current).cloned() else {
                        continue;
                    };

                    if !visited.insert(neighbor.clone()) {
                        continue;
                    }

                    predecessors.insert(neighbor.clone(), (current.clone(), edge));

                    if neighbor == self.target {
                        return Ok(self.reconstruct_path(&predecessors));
                    }
                    next.push(neighbor);
                }
            }
            frontier = next;
        }

        Ok(PathResult::not_found())
    }

    /// Outgoing then incoming edges; self-loops never lead anywhere new
    fn neighbor_edges<S: EdgeRepository + ?Sized>(
        &self,
        store: &S,
        node: &EntityRef,
    ) -> StorageResult<Vec<Edge>> {
        let mut edges = store.edges_from(node, false)?;
        edges.extend(store.edges_to(node)?);
        edges.retain(|edge| !edge.is_self_loop());
        Ok(edges)
    }

    /// Reconstruct the path from predecessors map
    fn reconstruct_path(&self, predecessors: &HashMap<EntityRef, (EntityRef, Edge)>) -> PathResult {
        // Walk backwards from target to source
        let mut hops: Vec<(EntityRef, Edge)> = Vec::new();
        let mut current = self.target.clone();
        while let Some((pred, edge)) = predecessors.get(&current) {
            hops.push((current.clone(), edge.clone()));
            current = pred.clone();
        }
        hops.reverse();

        let mut elements = vec![PathElement::node(0, &self.source)];
        let mut previous = self.source.clone();
        for (node, edge) in hops {
            let traversal = if edge.source == previous {
                Traversal::Forward
            } else {
                Traversal::Reverse
            };
            elements.push(PathElement::relationship(elements.len(), &edge, traversal));
            elements.push(PathElement::node(elements.len(), &node));
            previous = node;
        }

        PathResult::found(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeType, RelationType};
    use crate::storage::MemoryStore;

    fn entity(node_type: NodeType, id: &str) -> EntityRef {
        EntityRef::new(node_type, id)
    }

    fn link(store: &MemoryStore, from: &EntityRef, to: &EntityRef, relation: RelationType) {
        store.create(&Edge::new(from.clone(), to.clone(), relation)).unwrap();
    }

    /// A -> B -> C -> D
    ///      \-> E -> F
    fn create_test_graph() -> (MemoryStore, Vec<EntityRef>) {
        let store = MemoryStore::new();
        let ids: Vec<_> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|id| entity(NodeType::Factor, id))
            .collect();

        link(&store, &ids[0], &ids[1], RelationType::DerivedFrom);
        link(&store, &ids[1], &ids[2], RelationType::DerivedFrom);
        link(&store, &ids[2], &ids[3], RelationType::DerivedFrom);
        link(&store, &ids[1], &ids[4], RelationType::References);
        link(&store, &ids[4], &ids[5], RelationType::References);

        (store, ids)
    }

    #[test]
    fn test_path_same_node() {
        let (store, ids) = create_test_graph();
        let result = PathQuery::between(ids[0].clone(), ids[0].clone())
            .execute(&store)
            .unwrap();

        assert!(result.found);
        assert_eq!(result.hops(), 0);
        assert_eq!(result.elements, vec![PathElement::node(0, &ids[0])]);
    }

    #[test]
    fn test_path_same_node_without_edges() {
        let store = MemoryStore::new();
        let lonely = entity(NodeType::Note, "lonely");
        let result = PathQuery::between(lonely.clone(), lonely).execute(&store).unwrap();
        assert!(result.found);
        assert_eq!(result.elements.len(), 1);
    }

    #[test]
    fn test_path_direct_neighbor() {
        let (store, ids) = create_test_graph();
        let result = PathQuery::between(ids[0].clone(), ids[1].clone())
            .execute(&store)
            .unwrap();

        assert!(result.found);
        assert_eq!(result.hops(), 1);
        assert_eq!(result.elements.len(), 3);
        match &result.elements[1] {
            PathElement::Relationship {
                position,
                relation,
                traversal,
                ..
            } => {
                assert_eq!(*position, 1);
                assert_eq!(*relation, RelationType::DerivedFrom);
                assert_eq!(*traversal, Traversal::Forward);
            }
            other => panic!("expected relationship, got {:?}", other),
        }
    }

    #[test]
    fn test_path_three_hops() {
        let (store, ids) = create_test_graph();
        let result = PathQuery::between(ids[0].clone(), ids[3].clone())
            .execute(&store)
            .unwrap();

        assert!(result.found);
        assert_eq!(result.hops(), 3);
        assert_eq!(result.nodes(), ids[0..4].to_vec());
        let positions: Vec<_> = result.elements.iter().map(|e| e.position()).collect();
        assert_eq!(positions, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_path_against_edge_direction() {
        let (store, ids) = create_test_graph();
        // F -> ... -> D has to walk F <- E <- B -> C -> D
        let result = PathQuery::between(ids[5].clone(), ids[3].clone())
            .execute(&store)
            .unwrap();

        assert!(result.found);
        assert_eq!(result.hops(), 4);
        let traversals: Vec<_> = result
            .elements
            .iter()
            .filter_map(|e| match e {
                PathElement::Relationship { traversal, .. } => Some(*traversal),
                PathElement::Node { .. } => None,
            })
            .collect();
        assert_eq!(
            traversals,
            vec![
                Traversal::Reverse,
                Traversal::Reverse,
                Traversal::Forward,
                Traversal::Forward
            ]
        );
    }

    #[test]
    fn test_path_with_max_depth() {
        let (store, ids) = create_test_graph();
        // A to D requires 3 hops, but we limit to 2
        let result = PathQuery::between(ids[0].clone(), ids[3].clone())
            .max_depth(2)
            .execute(&store)
            .unwrap();

        assert!(!result.found);
        assert!(result.elements.is_empty());
    }

    #[test]
    fn test_path_disconnected_components() {
        let (store, ids) = create_test_graph();
        let island = entity(NodeType::Research, "island");
        link(&store, &island, &entity(NodeType::Note, "n"), RelationType::Summarizes);

        let result = PathQuery::between(ids[0].clone(), island).execute(&store).unwrap();
        assert!(!result.found);
        assert!(result.elements.is_empty());
    }

    #[test]
    fn test_path_prefers_fewest_hops() {
        let (store, ids) = create_test_graph();
        // Shortcut A -> D makes the three-hop chain irrelevant
        link(&store, &ids[0], &ids[3], RelationType::Related);

        let result = PathQuery::between(ids[0].clone(), ids[3].clone())
            .execute(&store)
            .unwrap();
        assert_eq!(result.hops(), 1);
    }

    #[test]
    fn test_path_ignores_self_loops() {
        let store = MemoryStore::new();
        let (a, b) = (entity(NodeType::Factor, "a"), entity(NodeType::Factor, "b"));
        link(&store, &a, &a, RelationType::Related);
        link(&store, &b, &a, RelationType::DerivedFrom);

        let result = PathQuery::between(a.clone(), b.clone()).execute(&store).unwrap();
        assert_eq!(result.nodes(), vec![a, b]);
    }

    #[test]
    fn test_path_across_entity_types() {
        let store = MemoryStore::new();
        let data = entity(NodeType::Data, "BTC-USDT");
        let factor = entity(NodeType::Factor, "Mom");
        let strategy = entity(NodeType::Strategy, "S1");
        link(&store, &factor, &data, RelationType::DerivedFrom);
        link(&store, &strategy, &factor, RelationType::AppliedTo);

        let result = PathQuery::between(strategy.clone(), data.clone())
            .max_depth(5)
            .execute(&store)
            .unwrap();

        assert!(result.found);
        assert_eq!(result.elements.len(), 5);
        assert_eq!(result.nodes(), vec![strategy, factor, data]);
    }
}
