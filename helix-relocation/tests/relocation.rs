//! End-to-end relocation signalling tests.
//!
//! These tests play both sides of a remote call: the server detects that an
//! entity group moved and serializes the error, the RPC layer delivers it as
//! class name plus message, and the client digs the new location out of the
//! error chain it receives.

use std::sync::{Arc, Mutex, Once};

use helix_core::Limits;
use helix_relocation::{
    find_relocation, EntityGroupMoved, ErrorNode, ErrorRegistry, Field, FieldError,
    FinderConfig, NotServingError, ParseDiagnostics, RelocationFinder, RemoteError,
    RemoteUnwrap, SignalCodec, TextCodec,
};

static TRACING: Once = Once::new();

/// Installs a test-friendly subscriber so decode warnings show up in output.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("helix_relocation=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Diagnostics sink that counts failures per field.
#[derive(Debug, Default)]
struct CountingDiagnostics {
    failures: Mutex<Vec<Field>>,
}

impl ParseDiagnostics for CountingDiagnostics {
    fn field_unparseable(&self, field: Field, _error: &FieldError, _input: &str) {
        self.failures.lock().unwrap().push(field);
    }
}

/// Simulates the RPC layer: the server-side error crosses the wire as text.
fn send_over_rpc(server_error: &ErrorNode, registry: &Arc<ErrorRegistry>) -> RemoteError {
    RemoteError::wrap(server_error, Arc::clone(registry))
}

#[derive(Debug, thiserror::Error)]
enum ClientError {
    #[error("write to entity group {group} failed")]
    Write {
        group: String,
        #[source]
        source: RemoteError,
    },
}

#[test]
fn test_moved_signal_survives_rpc() {
    init_tracing();
    let registry = Arc::new(ErrorRegistry::default());

    let server_error = ErrorNode::moved("dn1.cluster.local", 9090);
    let remote = send_over_rpc(&server_error, &registry);
    assert_eq!(remote.class_name(), EntityGroupMoved::CLASS_NAME);
    assert_eq!(
        remote.message(),
        "EntityGroup moved to: hostname=dn1.cluster.local port=9090."
    );

    let client_error = ErrorNode::caused(
        "scan failed",
        ErrorNode::caused("rpc failed", ErrorNode::from(remote)),
    );
    let found = find_relocation(&client_error).unwrap();
    assert_eq!(found, EntityGroupMoved::new("dn1.cluster.local", 9090));
}

#[test]
fn test_not_serving_without_location() {
    init_tracing();
    let registry = Arc::new(ErrorRegistry::default());

    let server_error = ErrorNode::not_serving("entity group orders,17 is not online");
    let remote = send_over_rpc(&server_error, &registry);

    let rebuilt = remote.unwrap_declared().unwrap();
    assert!(matches!(
        rebuilt,
        ErrorNode::NotServing(NotServingError::NotServing { .. })
    ));
    assert_eq!(find_relocation(&ErrorNode::from(remote)), None);
}

#[test]
fn test_corrupted_message_is_not_found() {
    init_tracing();
    let diagnostics = Arc::new(TextCodec::with_diagnostics(CountingDiagnostics::default()));
    let codec: Arc<dyn SignalCodec> = diagnostics.clone();
    let registry = Arc::new(ErrorRegistry::with_codec(codec));

    let remote = RemoteError::with_registry(
        EntityGroupMoved::CLASS_NAME,
        "EntityGroup moved to: hostname=dn1.cluster.local",
        registry,
    );
    assert_eq!(find_relocation(&ErrorNode::from(remote)), None);
    assert_eq!(
        *diagnostics.diagnostics().failures.lock().unwrap(),
        vec![Field::Hostname, Field::Port]
    );
}

#[test]
fn test_client_error_type_chain() {
    init_tracing();
    let registry = Arc::new(ErrorRegistry::default());
    let remote = send_over_rpc(&ErrorNode::moved("dn3.cluster.local", 16020), &registry);

    let err = ClientError::Write {
        group: "users,42".to_string(),
        source: remote,
    };
    let found = RelocationFinder::default().find_in(&err).unwrap();
    assert_eq!(found.address().as_deref(), Some("dn3.cluster.local:16020"));
}

#[test]
fn test_limits_flow_into_codec_and_finder() {
    init_tracing();
    let limits = Limits::new()
        .with_max_chain_depth(8)
        .with_max_encoded_bytes(48);
    limits.validate().unwrap();

    let codec: Arc<dyn SignalCodec> = Arc::new(TextCodec::new().with_limits(&limits));
    let registry = Arc::new(ErrorRegistry::with_codec(codec));
    let finder = RelocationFinder::try_new(FinderConfig::from_limits(&limits)).unwrap();

    // Fits in 48 bytes once the prefix is left out.
    let short = RemoteError::with_registry(
        EntityGroupMoved::CLASS_NAME,
        "hostname=dn1 port=9090.",
        Arc::clone(&registry),
    );
    assert_eq!(finder.find(Some(&ErrorNode::from(short))).map(|m| m.port()), Some(9090));

    // The canonical text of a long hostname exceeds the encoded limit.
    let long = send_over_rpc(&ErrorNode::moved("dn1.rack7.zone3.cluster.local", 9090), &registry);
    assert_eq!(finder.find(Some(&ErrorNode::from(long))), None);

    let mut deep = ErrorNode::moved("dn1", 9090);
    for i in 0..8 {
        deep = ErrorNode::caused(format!("level {i}"), deep);
    }
    assert_eq!(finder.find(Some(&deep)), None);
}

#[test]
fn test_concurrent_finders() {
    init_tracing();
    let registry = Arc::new(ErrorRegistry::default());
    let error = Arc::new(ErrorNode::caused(
        "batch failed",
        ErrorNode::from(send_over_rpc(&ErrorNode::moved("dn9", 9099), &registry)),
    ));
    let finder = Arc::new(RelocationFinder::default());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let error = Arc::clone(&error);
            let finder = Arc::clone(&finder);
            std::thread::spawn(move || finder.find(Some(&*error)))
        })
        .collect();

    for handle in handles {
        let found = handle.join().unwrap().unwrap();
        assert_eq!(found.port(), 9099);
    }
}
