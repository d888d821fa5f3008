//! Graph building utilities for integration tests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use verse_xref::{CrossRef, GraphSnapshot, Passage};

/// A passage in a single synthetic collection
pub fn passage(id: i64) -> Passage {
    Passage::new(id, "TST", "Testament", 1 + id / 1000, id % 1000, format!("passage {}", id))
}

/// Configuration for a seeded random citation graph
#[derive(Debug, Clone)]
pub struct RandomGraphConfig {
    /// Passages are numbered 1..=passages
    pub passages: i64,
    /// Outgoing citations per passage are drawn from 0..=max_out_degree
    pub max_out_degree: usize,
    /// Fraction of citations pointing at ids that do not exist
    pub dangling_ratio: f64,
    /// Fraction of citations emitted twice
    pub duplicate_ratio: f64,
    pub seed: u64,
}

impl Default for RandomGraphConfig {
    fn default() -> Self {
        Self {
            passages: 400,
            max_out_degree: 12,
            dangling_ratio: 0.05,
            duplicate_ratio: 0.05,
            seed: 7,
        }
    }
}

impl RandomGraphConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Random graph with cycles, hubs, duplicate edges and dangling targets
pub fn random_graph(config: &RandomGraphConfig) -> (Vec<Passage>, Vec<CrossRef>) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut edges = Vec::new();

    let hubs: Vec<i64> = (0..5).map(|_| rng.gen_range(1..=config.passages)).collect();

    for from in 1..=config.passages {
        let degree = rng.gen_range(0..=config.max_out_degree);
        for _ in 0..degree {
            let to = if rng.gen_bool(config.dangling_ratio) {
                config.passages + rng.gen_range(1..=1000)
            } else if rng.gen_bool(0.3) {
                hubs[rng.gen_range(0..hubs.len())]
            } else {
                rng.gen_range(1..=config.passages)
            };
            edges.push(CrossRef::new(from, to));
            if rng.gen_bool(config.duplicate_ratio) {
                edges.push(CrossRef::new(from, to));
            }
        }
    }

    ((1..=config.passages).map(passage).collect(), edges)
}

/// Snapshot over [`random_graph`]
pub fn random_snapshot(config: &RandomGraphConfig) -> GraphSnapshot {
    let (passages, edges) = random_graph(config);
    GraphSnapshot::from_parts(passages, edges)
}

/// Small hand-written graph around anchor 100.
///
/// - 200 is cited by 100 and 101, 210 by 99 only, 220 by 101 only
/// - 200 and 210 both cite 250; 200 cites 260
/// - 250 cites 280 and back to 100; 280 cites 290
pub fn verse_fixture() -> (Vec<Passage>, Vec<CrossRef>) {
    let passages = (90..=300).map(passage).collect();
    let edges = vec![
        CrossRef::new(99, 210),
        CrossRef::new(100, 200),
        CrossRef::new(101, 200),
        CrossRef::new(101, 220),
        CrossRef::new(200, 250),
        CrossRef::new(210, 250),
        CrossRef::new(200, 260),
        CrossRef::new(250, 280),
        CrossRef::new(250, 100),
        CrossRef::new(280, 290),
    ];
    (passages, edges)
}
