use async_trait::async_trait;
use hoist_engine::backend::{Bridge, BridgeError};
use hoist_engine::executor::{Invocation, QueryExecutor};
use hoist_engine::extract::extract_each;
use hoist_engine::handle::{RemoteHandle, Resolution};
use hoist_engine::protocol::{BridgeRequest, BridgeResponse};
use hoist_engine::record::{BookmarkRecord, Record};
use hoist_engine::resolver::Resolver;
use hoist_engine::specifier::{Specifier, Step};
use serde_json::{Value, json};
use std::collections::HashMap;

fn hook_index(spec: &Specifier) -> Option<usize> {
    spec.steps.iter().find_map(|s| match s {
        Step::Index { index } => Some(*index),
        _ => None,
    })
}

/// Every specifier a request makes the bridge evaluate.
fn evaluated(request: &BridgeRequest) -> &Specifier {
    match request {
        BridgeRequest::Elements(req) => &req.collection,
        BridgeRequest::Read(req) => &req.handle,
        BridgeRequest::Column(req) => &req.collection,
    }
}

/// Bridge whose hooks are numbered; listed indices fault in the configured way.
#[derive(Debug, Default)]
struct MockBridge {
    count: usize,
    stale: Vec<usize>,
    session_fault_at: Option<usize>,
    unreadable_address: Vec<usize>,
    /// Evaluations per hook index, over every kind of request.
    evaluations: HashMap<usize, usize>,
}

impl MockBridge {
    fn read_hook(&self, i: usize, attributes: &[String]) -> BridgeResponse {
        if self.stale.contains(&i) {
            return BridgeResponse::error(&BridgeError::StaleReference {
                target: format!("hookedBookmarks()[{}]", i),
            });
        }
        let mut row = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            if attribute == "address" && self.unreadable_address.contains(&i) {
                return BridgeResponse::error(&BridgeError::AttributeUnavailable {
                    attribute: "address".into(),
                    reason: "Can't get address.".into(),
                });
            }
            row.push(json!(format!("{}-{}", attribute, i)));
        }
        BridgeResponse::ok(Value::Array(row))
    }
}

#[async_trait]
impl Bridge for MockBridge {
    async fn launch(&mut self) -> Result<(), BridgeError> {
        Ok(())
    }
    async fn close(&mut self) -> Result<(), BridgeError> {
        Ok(())
    }
    async fn is_ready(&self) -> bool {
        true
    }

    async fn execute(&mut self, request: BridgeRequest) -> Result<BridgeResponse, BridgeError> {
        if let Some(i) = hook_index(evaluated(&request)) {
            *self.evaluations.entry(i).or_default() += 1;
            if self.session_fault_at == Some(i) {
                return Err(BridgeError::Io("osascript vanished".into()));
            }
        }
        match request {
            BridgeRequest::Elements(_) => Ok(BridgeResponse::ok(json!({ "count": self.count }))),
            BridgeRequest::Read(req) => {
                let i = hook_index(&req.handle).expect("handle carries an index");
                Ok(self.read_hook(i, &req.attributes))
            }
            BridgeRequest::Column(_) => Err(BridgeError::NotSupported("column".into())),
        }
    }
}

/// Bridge that lists the hooks afresh for every request, like separate script runs do, and gains
/// a new hook at the front after each read.
struct ShiftingBridge {
    hooks: Vec<(&'static str, &'static str)>,
}

#[async_trait]
impl Bridge for ShiftingBridge {
    async fn launch(&mut self) -> Result<(), BridgeError> {
        Ok(())
    }
    async fn close(&mut self) -> Result<(), BridgeError> {
        Ok(())
    }
    async fn is_ready(&self) -> bool {
        true
    }

    async fn execute(&mut self, request: BridgeRequest) -> Result<BridgeResponse, BridgeError> {
        match request {
            BridgeRequest::Elements(_) => {
                Ok(BridgeResponse::ok(json!({ "count": self.hooks.len() })))
            }
            BridgeRequest::Read(req) => {
                let i = hook_index(&req.handle).expect("handle carries an index");
                let (name, address) = self.hooks[i];
                let row: Vec<Value> = req
                    .attributes
                    .iter()
                    .map(|a| match a.as_str() {
                        "name" => json!(name),
                        _ => json!(address),
                    })
                    .collect();
                self.hooks.insert(0, ("New", "file:///new.md"));
                Ok(BridgeResponse::ok(Value::Array(row)))
            }
            BridgeRequest::Column(_) => Err(BridgeError::NotSupported("column".into())),
        }
    }
}

fn hooks() -> Specifier {
    Specifier::application("Hookmark")
        .make("Bookmark", [("address", "/docs/a.txt")])
        .call("hookedBookmarks")
}

#[tokio::test]
async fn test_resolver_drops_stale_handles_in_order() {
    let mut bridge = MockBridge {
        count: 5,
        stale: vec![1, 3],
        ..Default::default()
    };
    let handles = bridge.elements(&hooks()).await.unwrap();
    assert_eq!(handles.len(), 5);

    let resolved = Resolver::resolve_all(&mut bridge, &handles, BookmarkRecord::ATTRIBUTES)
        .await
        .unwrap();
    assert_eq!(resolved.dropped, 2);
    let survivors: Vec<usize> = resolved
        .objects
        .iter()
        .filter_map(|o| hook_index(o.origin()))
        .collect();
    assert_eq!(survivors, vec![0, 2, 4]);
}

#[tokio::test]
async fn test_each_handle_is_evaluated_once_per_query() {
    let mut bridge = MockBridge {
        count: 4,
        stale: vec![0, 2],
        unreadable_address: vec![3],
        ..Default::default()
    };
    let out = QueryExecutor::default()
        .run(
            &mut bridge,
            &Invocation::Bookmarks {
                address: "/docs/a.txt".into(),
            },
        )
        .await
        .unwrap();

    assert_eq!(out, r#"[{"name":"name-1","address":"address-1"}]"#);
    for i in 0..4 {
        assert_eq!(bridge.evaluations.get(&i), Some(&1), "handle {}", i);
    }
}

#[tokio::test]
async fn test_records_never_mix_hooks() {
    let mut bridge = ShiftingBridge {
        hooks: vec![
            ("Spec", "file:///spec.md"),
            ("Ticket", "https://tracker/42"),
        ],
    };
    let out = QueryExecutor::default()
        .run(
            &mut bridge,
            &Invocation::Bookmarks {
                address: "/docs/a.txt".into(),
            },
        )
        .await
        .unwrap();

    let records: Vec<BookmarkRecord> = serde_json::from_str(&out).unwrap();
    assert_eq!(records.len(), 2);
    let known = [
        ("Spec", "file:///spec.md"),
        ("Ticket", "https://tracker/42"),
        ("New", "file:///new.md"),
    ];
    for record in &records {
        assert!(
            known
                .iter()
                .any(|(n, a)| record.name == *n && record.address == *a),
            "mixed record {:?}",
            record
        );
    }
}

#[tokio::test]
async fn test_resolver_propagates_session_faults() {
    let mut bridge = MockBridge {
        count: 3,
        session_fault_at: Some(1),
        ..Default::default()
    };
    let handles = bridge.elements(&hooks()).await.unwrap();
    let err = Resolver::resolve_all(&mut bridge, &handles, BookmarkRecord::ATTRIBUTES)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Io(_)));
    assert!(!bridge.evaluations.contains_key(&2));
}

#[tokio::test]
async fn test_handle_resolution_outcome() {
    let mut bridge = MockBridge {
        count: 2,
        stale: vec![1],
        ..Default::default()
    };
    let live = RemoteHandle::new(hooks().index(0));
    let broken = RemoteHandle::new(hooks().index(1));

    match live.resolve(&mut bridge, &["name"]).await.unwrap() {
        Resolution::Live(object) => assert_eq!(object.values(), &[json!("name-0")]),
        Resolution::Dropped(fault) => panic!("live handle dropped: {}", fault),
    }
    match broken.resolve(&mut bridge, &["name"]).await.unwrap() {
        Resolution::Dropped(fault) => assert_eq!(fault.code(), "STALE_REFERENCE"),
        Resolution::Live(_) => panic!("stale handle resolved"),
    }
}

#[tokio::test]
async fn test_unreadable_attribute_drops_the_object() {
    let mut bridge = MockBridge {
        count: 3,
        unreadable_address: vec![1],
        ..Default::default()
    };
    let handles = bridge.elements(&hooks()).await.unwrap();
    let resolved = Resolver::resolve_all(&mut bridge, &handles, BookmarkRecord::ATTRIBUTES)
        .await
        .unwrap();
    assert_eq!(resolved.dropped, 1);
    let records: Vec<BookmarkRecord> = extract_each(resolved.objects);

    assert_eq!(
        records,
        vec![
            BookmarkRecord {
                name: "name-0".into(),
                address: "address-0".into()
            },
            BookmarkRecord {
                name: "name-2".into(),
                address: "address-2".into()
            },
        ]
    );
}
