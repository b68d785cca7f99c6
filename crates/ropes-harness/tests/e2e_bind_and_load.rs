#![forbid(unsafe_code)]

//! End-to-end: declare data objects, bind view models, load once.
//!
//! Uses `ScriptedTransport` and `RecordingEngine` to verify:
//! 1. Anchors render defaults before any payload arrives
//! 2. Shared data objects are fetched once per endpoint
//! 3. Distinct endpoints never share a fetch
//! 4. Each bound view model is bound once and refreshed once per observed
//!    field mutation
//! 5. Failed fetches leave defaults in place and are reported, not retried

use ropes::prelude::*;
use ropes::Dispatch;
use ropes_harness::{RecordingEngine, ScriptedTransport, TraceCapture};
use serde_json::{Value, json};
use tokio::task::LocalSet;

// ── Fixtures ─────────────────────────────────────────────────────────

const MANIFEST: &str = r#"
[[data_object]]
name = "contact"
endpoint = "json/contact.js"
fields = [
    { client_key = "name", api_key = "Name", default = "" },
    { client_key = "phone", api_key = "ContactMethods.Phone", default = "" },
]

[[data_object]]
name = "outlet"
endpoint = "json/combined.js"
response_node = "Outlet"
fields = [
    { client_key = "name", api_key = "Name", default = "" },
    { client_key = "circulation", api_key = "Circulation", default = 0 },
]
"#;

fn demo_registry() -> Registry {
    Manifest::from_toml_str(MANIFEST)
        .and_then(|manifest| manifest.to_registry())
        .expect("manifest builds")
}

fn contact_view(registry: &Registry) -> ropes::Result<Box<dyn ViewModel>> {
    let name = registry.field("contact", "name")?;
    let phone = registry.field("contact", "phone")?;
    Ok(FieldViewModel::new()
        .cell("name", &name)
        .cell("phone", &phone)
        .boxed())
}

fn outlet_view(registry: &Registry) -> ropes::Result<Box<dyn ViewModel>> {
    let name = registry.field("outlet", "name")?;
    let circulation = registry.field("outlet", "circulation")?;
    let label = derive(&[circulation.clone()], |values| {
        json!(format!("{} readers", values[0].as_i64().unwrap_or(0)))
    });
    Ok(FieldViewModel::new()
        .cell("name", &name)
        .derived("readers", Binding::new(move || label.get()), &[circulation])
        .boxed())
}

fn bind(
    registry: &Registry,
    loader: &Loader<ScriptedTransport>,
    engine: &RecordingEngine,
    entries: &[(&str, &dyn ViewModelFactory)],
) -> Dispatch {
    Ropes::new(registry, loader, engine)
        .bind(entries)
        .expect("bind succeeds")
}

// ═════════════════════════════════════════════════════════════════════════
// Construction
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn construction_fetches_nothing() {
    let registry = demo_registry();
    let transport = ScriptedTransport::new();
    let _loader: Loader<ScriptedTransport> = Loader::new(transport.clone());

    assert_eq!(registry.len(), 2);
    let outlet = registry.resolve("outlet").expect("outlet");
    assert_eq!(outlet.len(), 2);
    assert_eq!(outlet.get("circulation"), Some(json!(0)));
    assert!(transport.requests().is_empty());
}

// ═════════════════════════════════════════════════════════════════════════
// End to end
// ═════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn end_to_end_binds_once_and_refreshes_per_mutation() {
    LocalSet::new()
        .run_until(async {
            let registry = demo_registry();
            let transport = ScriptedTransport::new();
            transport
                .reply(
                    "json/contact.js",
                    json!({ "Name": "Ada Lovelace", "ContactMethods": { "Phone": "555-0100" } }),
                )
                .reply(
                    "json/combined.js",
                    json!({
                        "Contact": { "Name": "ignored" },
                        "Outlet": { "Name": "Analytical Gazette", "Circulation": 1200 }
                    }),
                );
            let loader = Loader::new(transport.clone());
            let engine = RecordingEngine::new();

            let contact = factory(["contact"], contact_view);
            let outlet = factory(["outlet"], outlet_view);
            let dispatch = bind(
                &registry,
                &loader,
                &engine,
                &[("#contact", &contact), ("#outlet", &outlet)],
            );

            assert_eq!(engine.anchors(), vec!["#contact", "#outlet"]);
            assert_eq!(engine.value("#contact", "name"), Some(json!("")));
            assert_eq!(engine.value("#outlet", "readers"), Some(json!("0 readers")));

            let outcomes = dispatch.settle().await;
            assert!(outcomes.iter().all(|outcome| outcome.is_ok()));

            let contact_obj = registry.resolve("contact").expect("contact");
            let outlet_obj = registry.resolve("outlet").expect("outlet");
            assert_eq!(contact_obj.get("name"), Some(json!("Ada Lovelace")));
            assert_eq!(outlet_obj.get("name"), Some(json!("Analytical Gazette")));

            assert_eq!(engine.binds("#contact"), 1);
            assert_eq!(engine.binds("#outlet"), 1);
            assert_eq!(engine.refreshes("#contact"), 2);
            assert_eq!(engine.refreshes("#outlet"), 2);
            assert_eq!(engine.value("#contact", "phone"), Some(json!("555-0100")));
            assert_eq!(
                engine.value("#outlet", "readers"),
                Some(json!("1200 readers"))
            );
        })
        .await;
}

// ═════════════════════════════════════════════════════════════════════════
// Coalescing
// ═════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn shared_objects_are_fetched_once() {
    LocalSet::new()
        .run_until(async {
            let mut registry = Registry::new();
            registry
                .insert(
                    "contact",
                    DataObject::new(
                        [FieldSpec::new("name", "Name", "")],
                        DataObjectOptions::endpoint("c.json"),
                    ),
                )
                .expect("contact");
            registry
                .insert(
                    "outlet",
                    DataObject::new(
                        [FieldSpec::new("name", "Name", "")],
                        DataObjectOptions::endpoint("o.json"),
                    ),
                )
                .expect("outlet");

            let transport = ScriptedTransport::new();
            transport
                .reply("c.json", json!({ "Name": "Ada" }))
                .reply("o.json", json!({ "Name": "Gazette" }));
            let loader = Loader::new(transport.clone());
            let engine = RecordingEngine::new();
            let capture = TraceCapture::new();
            let _guard = capture.set_default();

            let a = factory(["contact", "outlet"], |registry: &Registry| {
                let contact = registry.field("contact", "name")?;
                let outlet = registry.field("outlet", "name")?;
                Ok(FieldViewModel::new()
                    .cell("contact", &contact)
                    .cell("outlet", &outlet)
                    .boxed())
            });
            let b = factory(["outlet"], |registry: &Registry| {
                let outlet = registry.field("outlet", "name")?;
                Ok(FieldViewModel::new().cell("outlet", &outlet).boxed())
            });
            let dispatch = bind(&registry, &loader, &engine, &[("#a", &a), ("#b", &b)]);

            assert_eq!(transport.requests(), vec!["c.json", "o.json"]);

            let outcomes = dispatch.settle().await;
            let outlet_reports = outcomes
                .iter()
                .find(|outcome| outcome.endpoint == "o.json")
                .and_then(|outcome| outcome.result.as_ref().ok())
                .expect("o.json loaded");
            assert_eq!(outlet_reports.len(), 1, "outlet extracted once");

            let outlet_extracts = capture
                .named("model.extract")
                .into_iter()
                .filter(|event| event.field("data_object") == Some("outlet"))
                .count();
            assert_eq!(outlet_extracts, 1);
            assert_eq!(engine.value("#b", "outlet"), Some(json!("Gazette")));
            assert_eq!(engine.refreshes("#b"), 1);
        })
        .await;
}

#[tokio::test]
async fn distinct_endpoints_never_share_a_fetch() {
    LocalSet::new()
        .run_until(async {
            let mut registry = Registry::new();
            for (name, url) in [("left", "left.json"), ("right", "right.json")] {
                registry
                    .insert(
                        name,
                        DataObject::new(
                            [FieldSpec::new("value", "Value", Value::Null)],
                            DataObjectOptions::endpoint(url),
                        ),
                    )
                    .expect("insert");
            }
            let transport = ScriptedTransport::new();
            transport
                .reply("left.json", json!({ "Value": "L" }))
                .reply("right.json", json!({ "Value": "R" }));
            let loader = Loader::new(transport.clone());
            let engine = RecordingEngine::new();

            let both = factory(["left", "right"], |_: &Registry| {
                Ok(FieldViewModel::new().boxed())
            });
            bind(&registry, &loader, &engine, &[("#both", &both)])
                .settle()
                .await;

            assert_eq!(transport.request_count("left.json"), 1);
            assert_eq!(transport.request_count("right.json"), 1);
            assert_eq!(
                registry.resolve("left").expect("left").get("value"),
                Some(json!("L"))
            );
            assert_eq!(
                registry.resolve("right").expect("right").get("value"),
                Some(json!("R"))
            );
        })
        .await;
}

// ═════════════════════════════════════════════════════════════════════════
// Failures and in-flight cycles
// ═════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn failed_fetch_keeps_defaults() {
    LocalSet::new()
        .run_until(async {
            let registry = demo_registry();
            let transport = ScriptedTransport::new();
            transport
                .fail("json/contact.js", "connection refused")
                .reply("json/combined.js", json!({ "Outlet": { "Name": "Gazette" } }));
            let loader = Loader::new(transport.clone());
            let engine = RecordingEngine::new();
            let capture = TraceCapture::new();
            let _guard = capture.set_default();

            let contact = factory(["contact"], contact_view);
            let outlet = factory(["outlet"], outlet_view);
            let outcomes = bind(
                &registry,
                &loader,
                &engine,
                &[("#contact", &contact), ("#outlet", &outlet)],
            )
            .settle()
            .await;

            let failed: Vec<_> = outcomes.iter().filter(|o| !o.is_ok()).collect();
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].endpoint, "json/contact.js");
            assert_eq!(capture.named("load.fetch.failed").len(), 1);

            assert_eq!(engine.refreshes("#contact"), 0);
            assert_eq!(engine.value("#contact", "name"), Some(json!("")));
            assert_eq!(engine.value("#outlet", "name"), Some(json!("Gazette")));
            assert_eq!(transport.request_count("json/contact.js"), 1, "no retry");

            // The combined payload had no Circulation key.
            let misses = capture.at(tracing::Level::WARN);
            assert!(
                misses
                    .iter()
                    .any(|event| event.field("client_key") == Some("circulation"))
            );
        })
        .await;
}

#[tokio::test]
async fn new_cycle_while_fetch_in_flight() {
    LocalSet::new()
        .run_until(async {
            let registry = demo_registry();
            let transport = ScriptedTransport::new();
            transport.hold("json/contact.js").reply(
                "json/combined.js",
                json!({ "Outlet": { "Name": "Gazette", "Circulation": 5 } }),
            );
            let loader = Loader::new(transport.clone());
            let engine = RecordingEngine::new();

            let contact = factory(["contact"], contact_view);
            let first = bind(&registry, &loader, &engine, &[("#contact", &contact)]);
            assert_eq!(transport.held_count(), 1);

            let outlet = factory(["outlet"], outlet_view);
            let second = bind(&registry, &loader, &engine, &[("#outlet", &outlet)]);
            assert_eq!(
                second.endpoints().collect::<Vec<_>>(),
                vec!["json/combined.js"]
            );
            second.settle().await;
            assert_eq!(engine.value("#outlet", "readers"), Some(json!("5 readers")));

            transport.complete("json/contact.js", json!({ "Name": "Ada" }));
            first.settle().await;
            assert_eq!(engine.value("#contact", "name"), Some(json!("Ada")));
            assert_eq!(transport.requests().len(), 2);
        })
        .await;
}

#[test]
fn unknown_dependency_is_a_configuration_error() {
    let registry = demo_registry();
    let transport = ScriptedTransport::new();
    let loader = Loader::new(transport.clone());
    let engine = RecordingEngine::new();

    let author = factory(["author"], contact_view);
    let entries: [(&str, &dyn ViewModelFactory); 1] = [("#author", &author)];
    let err = Ropes::new(&registry, &loader, &engine)
        .bind(&entries)
        .expect_err("unknown data object");

    assert!(matches!(err, RopesError::UnknownDataObject { .. }));
    assert!(engine.anchors().is_empty());
    assert!(transport.requests().is_empty());
}
