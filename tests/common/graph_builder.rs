//! Seeded random graphs over a small entity pool

use quantlink::{Edge, EdgeRepository, EntityRef, NodeType, RelationType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RandomGraphConfig {
    pub seed: u64,
    /// Distinct entities per node type
    pub entities_per_type: usize,
    /// Create attempts; duplicates and self-loops are kept in the mix
    pub edge_attempts: usize,
}

impl Default for RandomGraphConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            entities_per_type: 4,
            edge_attempts: 120,
        }
    }
}

#[derive(Debug)]
pub struct RandomGraph {
    pub entities: Vec<EntityRef>,
    /// Every edge passed to `create`, in order, duplicates included
    pub attempts: Vec<Edge>,
    /// How many `create` calls reported a new edge
    pub created: usize,
}

/// Build a random graph in `store` from a fixed seed
pub fn random_graph(store: &dyn EdgeRepository, config: &RandomGraphConfig) -> RandomGraph {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let entities: Vec<EntityRef> = NodeType::ALL
        .iter()
        .filter(|t| **t != NodeType::Tag)
        .flat_map(|t| {
            (0..config.entities_per_type).map(move |i| EntityRef::new(*t, format!("{}-{}", t, i)))
        })
        .collect();

    let mut attempts = Vec::with_capacity(config.edge_attempts);
    let mut created = 0;
    for _ in 0..config.edge_attempts {
        let source = entities[rng.gen_range(0..entities.len())].clone();
        let target = entities[rng.gen_range(0..entities.len())].clone();
        let relation = RelationType::ALL[rng.gen_range(0..RelationType::ALL.len())];
        let edge = Edge::new(source, target, relation).bidirectional(rng.gen_bool(0.3));

        let (_, was_created) = store.create(&edge).expect("create edge");
        if was_created {
            created += 1;
        }
        attempts.push(edge);
    }

    RandomGraph {
        entities,
        attempts,
        created,
    }
}
