//! Property tests over arbitrary text: determinism, score ranges, and
//! traversal/cluster invariants.

use std::collections::HashSet;

use proptest::prelude::*;
use weave_core::{
    AffinityScorer, EngineConfig, FeatureExtractor, SequentialIds, SpatialMapper, ThoughtId,
    WeaveEngine,
};

fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ,!?]{0,60}",
        "[A-Za-z0-9 .,;!?'-]{0,80}",
        any::<String>(),
    ]
}

/// Posts drawn from a small vocabulary so edges actually form.
fn posts() -> impl Strategy<Value = Vec<(String, usize)>> {
    prop::collection::vec(
        (
            prop::sample::select(vec![
                "the garden grows in spring",
                "garden spring rain",
                "abc",
                "xyz",
                "rain rain rain!",
                "what grows? the garden",
                "",
            ])
            .prop_map(str::to_string),
            0usize..3,
        ),
        1..12,
    )
}

fn build(posts: &[(String, usize)]) -> (WeaveEngine, Vec<ThoughtId>) {
    let mut engine =
        WeaveEngine::with_id_generator(EngineConfig::default(), SequentialIds::new()).unwrap();
    let ids = posts
        .iter()
        .map(|(content, author)| engine.ingest(content, &format!("author{author}"), None, Some(0)))
        .collect();
    (engine, ids)
}

proptest! {
    #[test]
    fn extract_is_deterministic(s in text()) {
        let ex = FeatureExtractor::default();
        let a = ex.extract(&s);
        let b = ex.extract(&s);
        prop_assert_eq!(a.pattern.len(), ex.pattern_len());
        prop_assert_eq!(
            a.pattern.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            b.pattern.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
        prop_assert_eq!(a, b);
    }

    #[test]
    fn map_to_space_is_deterministic(s in text()) {
        let mapper = SpatialMapper::default();
        let a = mapper.map_to_space(&s).map(f64::to_bits);
        let b = mapper.map_to_space(&s).map(f64::to_bits);
        prop_assert_eq!(a, b);
        for v in mapper.map_to_space(&s) {
            prop_assert!(v.is_finite() && v >= 0.0);
        }
    }

    #[test]
    fn similarity_in_unit_interval_and_symmetric(a in text(), b in text()) {
        let ex = FeatureExtractor::default();
        let scorer = AffinityScorer::default();
        let (fa, fb) = (ex.extract(&a), ex.extract(&b));
        let ab = scorer.similarity(&fa, &fb);
        let ba = scorer.similarity(&fb, &fa);
        prop_assert!((0.0..=1.0).contains(&ab), "similarity {} out of range", ab);
        prop_assert_eq!(ab.to_bits(), ba.to_bits());
    }

    #[test]
    fn traversal_respects_depth_bound(posts in posts(), depth in 0usize..4) {
        let (engine, ids) = build(&posts);
        for id in &ids {
            let c = engine.connections_of(id, depth);
            prop_assert_eq!(c.get(id).map(|e| e.depth), Some(0));
            prop_assert!(c.max_depth() <= depth);
            for (node, entry) in &c.nodes {
                prop_assert!(ids.contains(node));
                prop_assert_eq!(entry.strength_from_origin.is_none(), node == id);
            }
        }
    }

    #[test]
    fn clusters_disjoint_subsets(posts in posts(), min_size in 1usize..4) {
        let (engine, ids) = build(&posts);
        let all: HashSet<&ThoughtId> = ids.iter().collect();
        let mut seen = HashSet::new();
        for cluster in engine.clusters(min_size) {
            prop_assert!(cluster.len() >= min_size);
            for id in &cluster {
                prop_assert!(all.contains(id));
                prop_assert!(seen.insert(id.clone()), "{} in two clusters", id);
            }
        }
    }

    #[test]
    fn symmetry_in_half_open_unit_interval(posts in posts()) {
        let (engine, ids) = build(&posts);
        for id in &ids {
            let m = engine.structure_metrics(id);
            prop_assert!(m.node_count >= 1);
            prop_assert!(m.symmetry > 0.0 && m.symmetry <= 1.0);
            prop_assert!(m.dominant_face.is_some());
        }
    }

    #[test]
    fn influence_radius_bounded(posts in posts()) {
        let (engine, ids) = build(&posts);
        for author in 0..3 {
            let r = engine.influence_radius(&format!("author{author}"));
            prop_assert!(r >= 0.0 && r <= (ids.len() - 1) as f64);
        }
    }
}
