//! Behaviour of `SecurityManager` driven through its public surface.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use manager::{
    HandshakeStep, ManagerConfig, ProtocolObserver, SecurityManager, SecurityManagerListener,
};
use protocol::{
    ConnectionKey, InternalErrorCode, QueryHeader, QueryId, QueryType, RawMessage, SecurityQuery,
    ServiceType, serialize,
};
use test_support::{
    MemorySessionObserver, RecordingListener, RecordingProtocolHandler, ScriptedCryptoManager,
    ScriptedSslContext,
};

struct Harness {
    manager: SecurityManager,
    sessions: Arc<MemorySessionObserver>,
    crypto: Arc<ScriptedCryptoManager>,
    outbox: Arc<RecordingProtocolHandler>,
    listener: Arc<RecordingListener>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    fn with_config(config: ManagerConfig) -> Self {
        let manager = SecurityManager::new(config).expect("spawn manager");
        let sessions = MemorySessionObserver::new();
        let crypto = ScriptedCryptoManager::new();
        let outbox = RecordingProtocolHandler::new();
        let listener = RecordingListener::new(false);
        manager.set_session_observer(sessions.clone());
        manager.set_crypto_manager(crypto.clone());
        manager.set_protocol_handler(outbox.clone());
        manager.add_listener(listener.clone());
        Self {
            manager,
            sessions,
            crypto,
            outbox,
            listener,
        }
    }

    fn deliver(&self, key: u32, query_id: QueryId, seq_number: u32, payload: &[u8]) {
        let frame = SecurityQuery::new(QueryType::Request, query_id, seq_number, payload.to_vec())
            .and_then(|query| query.encode())
            .expect("frame");
        self.manager
            .on_message_received(&RawMessage::control(ConnectionKey(key), frame));
        assert!(self.manager.sync());
    }
}

#[test]
fn config_section_name() {
    assert_eq!(SecurityManager::config_section(), "Security Manager");
}

#[test]
fn non_control_traffic_is_ignored() {
    let h = Harness::new();
    let frame = SecurityQuery::new(QueryType::Request, QueryId::InvalidQueryId, 1, Vec::new())
        .and_then(|query| query.encode())
        .expect("frame");

    for service in [ServiceType::Rpc, ServiceType::Audio, ServiceType::Video, ServiceType::Bulk] {
        let message = RawMessage::new(ConnectionKey(1), 2, frame.clone(), service);
        h.manager.on_message_received(&message);
    }
    assert!(h.manager.sync());

    assert!(h.outbox.is_empty());
    assert_eq!(h.listener.calls(), 0);
}

#[test]
fn malformed_frame_is_reported_with_seq_zero() {
    let h = Harness::new();

    h.manager
        .on_message_received(&RawMessage::control(ConnectionKey(2), vec![0x00, 0x00, 0x01]));
    assert!(h.manager.sync());

    let reports = h.outbox.error_reports();
    assert_eq!(reports.len(), 1);
    let (seq_number, report) = &reports[0];
    assert_eq!(*seq_number, 0);
    assert_eq!(report.code(), Some(InternalErrorCode::InvalidQuerySize));
    assert_eq!(report.text, "Incorrect message received");
    assert_eq!(h.listener.calls(), 0);
}

#[test]
fn declared_size_mismatch_is_malformed() {
    let h = Harness::new();
    let header = QueryHeader::new(QueryType::Request, QueryId::SendHandshakeData, 5, 10);
    let mut frame = header.encode().to_vec();
    frame.extend_from_slice(b"short");

    h.manager
        .on_message_received(&RawMessage::control(ConnectionKey(3), frame));
    assert!(h.manager.sync());

    let reports = h.outbox.error_reports();
    assert_eq!(reports[0].0, 0);
    assert_eq!(reports[0].1.code(), Some(InternalErrorCode::InvalidQuerySize));
}

#[test]
fn outbound_messages_use_control_service_and_configured_version() {
    let h = Harness::with_config(ManagerConfig::builder().protocol_version(3).build());

    h.deliver(4, QueryId::InvalidQueryId, 7, b"");

    let messages = h.outbox.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].connection_key(), ConnectionKey(4));
    assert_eq!(messages[0].service_type(), ServiceType::Control);
    assert_eq!(messages[0].protocol_version(), 3);
    assert_eq!(h.outbox.final_flags(), vec![false]);
}

#[test]
fn protect_failures_notify_and_report() {
    let h = Harness::new();

    h.crypto.set_fail_creation(true);
    assert!(!h.manager.protect_connection(ConnectionKey(5)));
    h.crypto.set_fail_creation(false);

    h.sessions.reject_with(Some(0x21));
    assert!(!h.manager.protect_connection(ConnectionKey(6)));
    h.sessions.reject_with(None);

    h.sessions.set_discard_installs(true);
    assert!(!h.manager.protect_connection(ConnectionKey(7)));

    let reports: Vec<_> = h
        .outbox
        .error_reports()
        .into_iter()
        .map(|(_, report)| (report.id, report.text))
        .collect();
    assert_eq!(reports[0], (5, "CryptoManager could not create SSL context.".to_owned()));
    assert_eq!(reports[1].0, 0x21);
    assert_eq!(reports[2].0, InternalErrorCode::Internal.as_u8());
    assert_eq!(h.crypto.released(), 1);
    assert_eq!(
        h.listener.events(),
        vec![
            (ConnectionKey(5), false),
            (ConnectionKey(6), false),
            (ConnectionKey(7), false),
        ]
    );
}

#[test]
fn protect_requires_bound_adapters() {
    let manager = SecurityManager::new(ManagerConfig::default()).expect("spawn manager");
    let outbox = RecordingProtocolHandler::new();
    let listener = RecordingListener::new(false);
    manager.set_protocol_handler(outbox.clone());
    manager.add_listener(listener.clone());

    assert!(!manager.protect_connection(ConnectionKey(8)));
    manager.set_session_observer(MemorySessionObserver::new());
    assert!(!manager.protect_connection(ConnectionKey(8)));

    let codes: Vec<_> = outbox
        .error_reports()
        .into_iter()
        .map(|(_, report)| report.code())
        .collect();
    assert_eq!(
        codes,
        vec![
            Some(InternalErrorCode::Internal),
            Some(InternalErrorCode::NotSupported),
        ]
    );
    assert_eq!(listener.calls(), 2);
}

#[test]
fn failed_start_sends_no_bytes() {
    let h = Harness::new();
    let context = ScriptedSslContext::new();
    context.set_start_step(HandshakeStep::fail(b"alert".to_vec()));
    h.crypto.enqueue_context(context.clone());
    h.crypto.set_last_error("no shared cipher");
    assert!(h.manager.protect_connection(ConnectionKey(9)));

    h.manager.start_handshake(ConnectionKey(9));

    assert_eq!(context.start_calls(), 1);
    assert!(h.outbox.handshake_data().is_empty());
    let reports = h.outbox.error_reports();
    assert_eq!(reports[0].1.code(), Some(InternalErrorCode::SslInvalidData));
    assert_eq!(reports[0].1.text, "no shared cipher");
    assert_eq!(h.listener.events(), vec![(ConnectionKey(9), false)]);
}

#[test]
fn removed_listener_is_not_notified() {
    let h = Harness::new();
    let extra = RecordingListener::new(false);
    let handle: Arc<dyn SecurityManagerListener> = extra.clone();
    h.manager.add_listener(Arc::clone(&handle));
    h.manager.add_listener(Arc::clone(&handle));

    assert!(h.manager.remove_listener(&handle));
    h.manager.start_handshake(ConnectionKey(10));

    assert_eq!(extra.calls(), 0);
    assert_eq!(h.listener.calls(), 1);
}

#[test]
fn done_listener_sees_one_outcome() {
    let h = Harness::new();
    let once = RecordingListener::new(true);
    h.manager.add_listener(once.clone());

    h.manager.start_handshake(ConnectionKey(11));
    h.manager.start_handshake(ConnectionKey(12));

    assert_eq!(once.events(), vec![(ConnectionKey(11), false)]);
    assert_eq!(h.listener.calls(), 2);
}

#[test]
fn shutdown_drains_queue_and_ignores_later_messages() {
    let h = Harness::new();
    let frame = |seq: u32| {
        let header = QueryHeader::new(QueryType::Request, QueryId::InvalidQueryId, seq, 0);
        serialize(header, &[]).expect("frame")
    };

    for seq in 1..=3 {
        h.manager
            .on_message_received(&RawMessage::control(ConnectionKey(13), frame(seq)));
    }
    h.manager.shutdown();
    h.manager
        .on_message_received(&RawMessage::control(ConnectionKey(13), frame(4)));
    h.manager.shutdown();

    let seqs: Vec<_> = h.outbox.error_reports().into_iter().map(|(seq, _)| seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
    assert!(!h.manager.sync());
}

#[test]
fn transport_observer_hooks_forward_to_manager() {
    let h = Harness::new();
    let observer: &dyn ProtocolObserver = &h.manager;
    let frame = SecurityQuery::new(QueryType::Request, QueryId::InvalidQueryId, 21, Vec::new())
        .and_then(|query| query.encode())
        .expect("frame");
    let message = RawMessage::control(ConnectionKey(14), frame);

    observer.on_message_received(&message);
    observer.on_mobile_message_sent(&message);
    assert!(h.manager.sync());

    assert_eq!(h.outbox.error_reports()[0].0, 21);
}

#[test]
fn concurrent_connections_complete_independently() {
    let h = Arc::new(Harness::new());
    let keys: Vec<u32> = (100..108).collect();
    for &key in &keys {
        let context = ScriptedSslContext::new();
        context.push_completing_step(HandshakeStep::success(Vec::new()));
        h.crypto.enqueue_context(context);
        assert!(h.manager.protect_connection(ConnectionKey(key)));
    }

    let workers: Vec<_> = keys
        .iter()
        .map(|&key| {
            let h = Arc::clone(&h);
            thread::spawn(move || {
                h.manager.start_handshake(ConnectionKey(key));
                h.deliver(key, QueryId::SendHandshakeData, 1, b"server-hello");
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker thread");
    }

    let mut events = h.listener.events();
    events.sort();
    let expected: Vec<_> = keys.iter().map(|&key| (ConnectionKey(key), true)).collect();
    assert_eq!(events, expected);
    assert!(h.outbox.error_reports().is_empty());
    for context in h.crypto.created() {
        assert_eq!(context.start_calls(), 1);
        assert_eq!(context.inputs(), vec![b"server-hello".to_vec()]);
    }
}

struct Gate {
    started: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl SecurityManagerListener for Gate {
    fn on_handshake_done(&self, _: ConnectionKey, _: bool) -> bool {
        let _ = self.started.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        false
    }
}

#[test]
fn full_queue_reports_dropped_query_to_peer() {
    let h = Harness::with_config(ManagerConfig::builder().queue_capacity(1).build());
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    h.manager.add_listener(Arc::new(Gate {
        started: Mutex::new(started_tx),
        release: Mutex::new(release_rx),
    }));
    let post = |seq: u32| {
        let frame =
            SecurityQuery::new(QueryType::Request, QueryId::SendHandshakeData, seq, Vec::new())
                .and_then(|query| query.encode())
                .expect("frame");
        h.manager
            .on_message_received(&RawMessage::control(ConnectionKey(20), frame));
    };

    post(1);
    started_rx.recv().expect("worker is notifying");
    post(2);
    post(3);
    let reports = h.outbox.error_reports();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].0, 3);
    assert_eq!(reports[1].1.code(), Some(InternalErrorCode::Internal));
    assert_eq!(reports[1].1.text, "Security query queue is full");

    release_tx.send(()).unwrap();
    release_tx.send(()).unwrap();
    assert!(h.manager.sync());

    let seqs: Vec<_> = h.outbox.error_reports().into_iter().map(|(seq, _)| seq).collect();
    assert_eq!(seqs, vec![1, 3, 2]);
    assert_eq!(h.listener.events(), vec![(ConnectionKey(20), false); 2]);
}
