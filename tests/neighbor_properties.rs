use proptest::prelude::*;
use vicsek_common::Vec2;
use vicsek_engine::{BruteForceNeighbors, NeighborQuery, SwarmState, UniformGrid};

fn swarm(max_len: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0f64..10.0, 0.0f64..10.0), 1..max_len)
}

fn state(points: &[(f64, f64)]) -> SwarmState {
    let positions: Vec<Vec2> = points.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
    SwarmState::new(&positions, vec![0.0; points.len()]).unwrap()
}

proptest! {
    #[test]
    fn neighborhood_is_symmetric_and_self_inclusive(points in swarm(60), radius in 0.2f64..3.0) {
        let s = state(&points);
        let query = BruteForceNeighbors::new(radius);
        let sets: Vec<Vec<usize>> = (0..s.len()).map(|i| query.neighbors(&s, i)).collect();
        for (i, set) in sets.iter().enumerate() {
            prop_assert!(set.contains(&i));
            for &j in set {
                prop_assert!(sets[j].contains(&i), "{} sees {} but not the reverse", i, j);
            }
        }
    }

    #[test]
    fn grid_matches_brute_force(points in swarm(80), radius in 0.2f64..4.0) {
        let s = state(&points);
        let brute = BruteForceNeighbors::new(radius);
        let mut grid = UniformGrid::new(10.0, radius);
        grid.rebuild(&s);
        for i in 0..s.len() {
            prop_assert_eq!(grid.neighbors(&s, i), brute.neighbors(&s, i));
        }
    }
}
