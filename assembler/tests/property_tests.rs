// Property-based tests for graph construction invariants.
//
// Four categories:
// 1. Random DAGs validate; any back edge over a chain is reported as a cycle
// 2. Wildcard expansion is deterministic, sorted, and equals the name intersection
// 3. Reference parsing splits at the first '.'
// 4. Blackbody output is continuous inside the fitted range
//
// Uses proptest with explicit configuration to prevent CI flakiness.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rgc::builder::GraphBuilder;
use rgc::catalog::{PassCatalog, PassConfig, PassDecl};
use rgc::error::GraphError;
use rgc::reference::{self, Reference};

// ── Test helpers ────────────────────────────────────────────────────────────

const MAX_NODES: usize = 8;

/// One pass type with a single output and one input slot per possible
/// upstream pass, so any DAG over `MAX_NODES` passes can be wired.
fn dag_catalog() -> PassCatalog {
    let mut decl = PassDecl::new("Node").output("out");
    for i in 0..MAX_NODES {
        decl = decl.input(&format!("in{i}"));
    }
    PassCatalog::from_declarations([decl]).unwrap()
}

/// A node count and, for every node `i > 0`, the set of extra upstream
/// nodes `j < i - 1` it reads from. `i - 1 → i` is always present.
fn arb_chain_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2..=MAX_NODES).prop_flat_map(|n| {
        let extras = proptest::collection::vec((0..n, 0..n), 0..12).prop_map(move |pairs| {
            pairs
                .into_iter()
                .filter(|&(a, b)| a + 1 < b)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect::<Vec<_>>()
        });
        (Just(n), extras)
    })
}

fn build_dag(n: usize, extras: &[(usize, usize)]) -> GraphBuilder {
    let catalog = dag_catalog();
    let mut b = GraphBuilder::new("dag");
    for i in 0..n {
        b.add_pass(catalog.instantiate("Node", &format!("N{i}"), &PassConfig::new()).unwrap())
            .unwrap();
    }
    for i in 1..n {
        b.add_edge(&format!("N{}.out", i - 1), &format!("N{i}.in{}", i - 1))
            .unwrap();
    }
    for &(src, dst) in extras {
        b.add_edge(&format!("N{src}.out"), &format!("N{dst}.in{src}"))
            .unwrap();
    }
    b
}

fn port_names() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set(
        prop_oneof![
            Just("color"),
            Just("albedo"),
            Just("count"),
            Just("time"),
            Just("posW"),
            Just("normW"),
            Just("Filtered image"),
        ]
        .prop_map(String::from),
        0..6,
    )
}

// ── 1. Random DAGs ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        max_shrink_iters: 200,
        .. ProptestConfig::default()
    })]

    #[test]
    fn random_dag_validates((n, extras) in arb_chain_dag()) {
        let mut b = build_dag(n, &extras);
        b.mark_output(&format!("N{}.out", n - 1)).unwrap();
        let g = b.validate().unwrap();
        prop_assert_eq!(g.passes().len(), n);
        prop_assert_eq!(g.edges().len(), n - 1 + extras.len());
    }

    #[test]
    fn back_edge_is_a_cycle(
        (n, extras) in arb_chain_dag(),
        pick in any::<proptest::sample::Index>(),
    ) {
        let mut b = build_dag(n, &extras);
        // Back edge from a later node to an earlier one, on an unused input.
        let src = 1 + pick.index(n - 1);
        let dst = pick.index(src);
        b.add_edge(&format!("N{src}.out"), &format!("N{dst}.in{src}")).unwrap();
        b.mark_output(&format!("N{}.out", n - 1)).unwrap();

        match b.validate() {
            Err(GraphError::CycleDetected { path }) => {
                prop_assert!(!path.is_empty());
                let src_name = format!("N{src}");
                let dst_name = format!("N{dst}");
                prop_assert!(path.contains(&src_name), "{:?} lacks {}", path, src_name);
                prop_assert!(path.contains(&dst_name), "{:?} lacks {}", path, dst_name);
            }
            other => prop_assert!(false, "expected CycleDetected, got {:?}", other.map(|g| g.name().to_string())),
        }
    }
}

// ── 2. Wildcard expansion ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        .. ProptestConfig::default()
    })]

    #[test]
    fn wildcard_expansion_is_sorted_intersection(
        outputs in port_names(),
        inputs in port_names(),
    ) {
        let mut src = PassDecl::new("Src");
        for p in &outputs {
            src = src.output(p);
        }
        let mut dst = PassDecl::new("Dst");
        for p in &inputs {
            dst = dst.input(p);
        }
        let catalog = PassCatalog::from_declarations([src, dst]).unwrap();
        let s = catalog.instantiate("Src", "S", &PassConfig::new()).unwrap();
        let d = catalog.instantiate("Dst", "D", &PassConfig::new()).unwrap();

        let sref = Reference::parse("S").unwrap();
        let dref = Reference::parse("D").unwrap();
        let first = reference::expand(&sref, &dref, &s, &d);
        let second = reference::expand(&sref, &dref, &s, &d);

        let expected: Vec<String> = outputs.intersection(&inputs).cloned().collect();
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(&a, &b);
                let names: Vec<String> = a.iter().map(|(o, _)| o.port.clone()).collect();
                prop_assert_eq!(names, expected);
                for (o, i) in &a {
                    prop_assert_eq!(&o.port, &i.port);
                    prop_assert_eq!(o.node.as_str(), "S");
                    prop_assert_eq!(i.node.as_str(), "D");
                }
            }
            (Err(GraphError::NoMatchingPorts { .. }), Err(GraphError::NoMatchingPorts { .. })) => {
                prop_assert!(expected.is_empty());
            }
            (a, b) => prop_assert!(false, "inconsistent expansion: {:?} / {:?}", a.is_ok(), b.is_ok()),
        }
    }
}

// ── 3. Reference parsing ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        .. ProptestConfig::default()
    })]

    #[test]
    fn reference_splits_at_first_dot(
        node in "[A-Za-z][A-Za-z0-9_]{0,10}",
        port in "[A-Za-z][A-Za-z0-9 .]{0,10}",
    ) {
        let text = format!("{node}.{port}");
        let r = Reference::parse(&text).unwrap();
        prop_assert_eq!(r.node, node.as_str());
        prop_assert_eq!(r.port, Some(port.as_str()));
    }
}

// ── 4. Blackbody ────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 500,
        .. ProptestConfig::default()
    })]

    #[test]
    fn blackbody_is_continuous_in_range(t in 965.0f64..11999.0) {
        let a = rgc::blackbody::blackbody(t);
        let b = rgc::blackbody::blackbody(t + 1e-3);
        for c in 0..3 {
            prop_assert!((a[c] - b[c]).abs() < 5e-3, "channel {} jumps at {}: {:?} vs {:?}", c, t, a, b);
        }
    }

    #[test]
    fn blackbody_asymptotes(t in 12000.0f64..1.0e6, cold in 0.0f64..965.0) {
        prop_assert_eq!(rgc::blackbody::blackbody(t), rgc::blackbody::HIGH_TEMPERATURE_RGB);
        prop_assert_eq!(rgc::blackbody::blackbody(cold), rgc::blackbody::LOW_TEMPERATURE_RGB);
    }
}
