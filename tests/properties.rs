//! Randomized checks of the repository contract on every backend
//!
//! Run with: `cargo test --test properties`

mod common;

use common::{all_backends, random_graph, RandomGraphConfig};
use quantlink::query::MAX_DEPTH_LIMIT;
use quantlink::{Direction, LineageQuery, PathElement, PathQuery};
use std::collections::HashSet;

const SEEDS: [u64; 4] = [1, 7, 42, 2024];

#[test]
fn every_attempted_edge_exists_once() {
    for seed in SEEDS {
        for backend in all_backends() {
            let store = backend.store.as_ref();
            let graph = random_graph(store, &RandomGraphConfig { seed, ..Default::default() });

            let distinct: HashSet<_> = graph.attempts.iter().map(|e| e.key()).collect();
            assert_eq!(graph.created, distinct.len(), "{} seed {}", backend.name, seed);

            for edge in &graph.attempts {
                assert!(store.exists(&edge.key()).unwrap());
                let (_, created) = store.create(edge).unwrap();
                assert!(!created, "{}: re-create of {} inserted", backend.name, edge.key());
            }
        }
    }
}

#[test]
fn cascade_count_equals_union_of_listings() {
    for seed in SEEDS {
        for backend in all_backends() {
            let store = backend.store.as_ref();
            let graph = random_graph(store, &RandomGraphConfig { seed, ..Default::default() });

            for entity in &graph.entities {
                let mut union: HashSet<_> = store
                    .edges_from(entity, false)
                    .unwrap()
                    .into_iter()
                    .map(|e| e.key())
                    .collect();
                union.extend(store.edges_to(entity).unwrap().into_iter().map(|e| e.key()));

                let removed = store.delete_all_for_entity(entity).unwrap();
                assert_eq!(removed, union.len(), "{} seed {} {}", backend.name, seed, entity);
                assert!(store.edges_to(entity).unwrap().is_empty());
                assert!(store.edges_from(entity, true).unwrap().is_empty());
            }
        }
    }
}

#[test]
fn lineage_reports_each_entity_once_within_depth() {
    for seed in SEEDS {
        for backend in all_backends() {
            let store = backend.store.as_ref();
            let graph = random_graph(store, &RandomGraphConfig { seed, ..Default::default() });

            for entity in graph.entities.iter().take(6) {
                for direction in [Direction::Backward, Direction::Forward] {
                    let result = LineageQuery::from(entity.clone())
                        .direction(direction)
                        .max_depth(MAX_DEPTH_LIMIT)
                        .execute(store)
                        .unwrap();

                    let mut seen = HashSet::new();
                    for entry in &result.entries {
                        assert!(entry.depth >= 1 && entry.depth <= MAX_DEPTH_LIMIT);
                        assert!(seen.insert(entry.entity()), "{} reported twice", entry.entity());
                        assert_ne!(&entry.entity(), entity);
                    }
                }
            }
        }
    }
}

#[test]
fn paths_alternate_and_respect_depth() {
    for seed in SEEDS {
        for backend in all_backends() {
            let store = backend.store.as_ref();
            let graph = random_graph(
                store,
                &RandomGraphConfig {
                    seed,
                    edge_attempts: 40,
                    ..Default::default()
                },
            );

            let (source, target) = (&graph.entities[0], &graph.entities[graph.entities.len() - 1]);
            for depth in [1, 2, 5] {
                let result = PathQuery::between(source.clone(), target.clone())
                    .max_depth(depth)
                    .execute(store)
                    .unwrap();
                if !result.found {
                    assert!(result.elements.is_empty());
                    continue;
                }

                assert!(result.hops() <= depth);
                for (i, element) in result.elements.iter().enumerate() {
                    assert_eq!(element.position(), i);
                    let is_node = matches!(element, PathElement::Node { .. });
                    assert_eq!(is_node, i % 2 == 0);
                }
                let nodes = result.nodes();
                assert_eq!(nodes.first(), Some(source));
                assert_eq!(nodes.last(), Some(target));
            }
        }
    }
}
