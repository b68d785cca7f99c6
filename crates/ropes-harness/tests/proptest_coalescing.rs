//! Property-based invariant tests for orchestrated loading.
//!
//! For any set of data objects and any anchors depending on any subsets:
//! 1. Each endpoint some dependency uses is requested exactly once
//! 2. No other endpoint is requested
//! 3. Every anchor is bound exactly once, in order
//! 4. The loader queue is empty afterwards

use proptest::prelude::*;
use ropes::prelude::*;
use ropes_harness::{RecordingEngine, ScriptedTransport};
use serde_json::json;
use tokio::task::LocalSet;

const ENDPOINTS: &[&str] = &["c.json", "o.json", "json/combined.js"];

#[derive(Debug, Clone)]
struct Scenario {
    /// Endpoint index per data object.
    objects: Vec<usize>,
    /// Dependency indices per anchor.
    anchors: Vec<Vec<usize>>,
}

fn arb_scenario() -> impl Strategy<Value = Scenario> {
    proptest::collection::vec(0..ENDPOINTS.len(), 1..6).prop_flat_map(|objects| {
        let count = objects.len();
        proptest::collection::vec(proptest::collection::vec(0..count, 0..5), 1..5)
            .prop_map(move |anchors| Scenario {
                objects: objects.clone(),
                anchors,
            })
    })
}

fn run(scenario: &Scenario) -> (Vec<String>, RecordingEngine, usize) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let local = LocalSet::new();
    local.block_on(&runtime, async {
        let mut registry = Registry::new();
        for (i, &endpoint) in scenario.objects.iter().enumerate() {
            registry
                .insert(
                    &format!("obj{i}"),
                    DataObject::new(
                        [FieldSpec::new("name", "Name", "")],
                        DataObjectOptions::endpoint(ENDPOINTS[endpoint]),
                    ),
                )
                .expect("insert");
        }
        let transport = ScriptedTransport::new();
        for endpoint in ENDPOINTS {
            transport.reply(*endpoint, json!({ "Name": *endpoint }));
        }
        let loader = Loader::new(transport.clone());
        let engine = RecordingEngine::new();

        let factories: Vec<_> = scenario
            .anchors
            .iter()
            .map(|deps| {
                factory(
                    deps.iter().map(|i| format!("obj{i}")),
                    |_: &Registry| Ok(FieldViewModel::new().boxed()),
                )
            })
            .collect();
        let names: Vec<String> = (0..factories.len()).map(|i| format!("#a{i}")).collect();
        let entries: Vec<(&str, &dyn ViewModelFactory)> = names
            .iter()
            .zip(&factories)
            .map(|(name, f)| (name.as_str(), f as &dyn ViewModelFactory))
            .collect();

        Ropes::new(&registry, &loader, &engine)
            .bind(&entries)
            .expect("bind")
            .settle()
            .await;
        (transport.requests(), engine, loader.pending_len())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn each_used_endpoint_is_fetched_once(scenario in arb_scenario()) {
        let (requests, _, _) = run(&scenario);
        let mut expected: Vec<&str> = Vec::new();
        for deps in &scenario.anchors {
            for &dep in deps {
                let endpoint = ENDPOINTS[scenario.objects[dep]];
                if !expected.contains(&endpoint) {
                    expected.push(endpoint);
                }
            }
        }
        prop_assert_eq!(requests, expected);
    }

    #[test]
    fn every_anchor_bound_once_and_queue_drained(scenario in arb_scenario()) {
        let (_, engine, pending) = run(&scenario);
        let anchors = engine.anchors();
        prop_assert_eq!(anchors.len(), scenario.anchors.len());
        for (i, anchor) in anchors.iter().enumerate() {
            prop_assert_eq!(anchor, &format!("#a{i}"));
            prop_assert_eq!(engine.binds(anchor), 1);
        }
        prop_assert_eq!(pending, 0);
    }
}
