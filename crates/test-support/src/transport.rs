use std::sync::{Arc, Mutex};

use manager::ProtocolHandler;
use protocol::{ErrorReport, QueryId, RawMessage, SecurityQuery};

use crate::lock;

/// Protocol handler that keeps every outbound message.
#[derive(Debug, Default)]
pub struct RecordingProtocolHandler {
    sent: Mutex<Vec<(RawMessage, bool)>>,
}

impl RecordingProtocolHandler {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Messages in send order.
    #[must_use]
    pub fn messages(&self) -> Vec<RawMessage> {
        lock(&self.sent).iter().map(|(message, _)| message.clone()).collect()
    }

    /// The `final_message` flag of every send.
    #[must_use]
    pub fn final_flags(&self) -> Vec<bool> {
        lock(&self.sent).iter().map(|&(_, last)| last).collect()
    }

    /// Outbound payloads decoded as security queries.
    ///
    /// # Panics
    ///
    /// Panics if a recorded payload is not a well-formed query frame.
    #[must_use]
    pub fn queries(&self) -> Vec<SecurityQuery> {
        lock(&self.sent)
            .iter()
            .map(|(message, _)| {
                SecurityQuery::parse(message.data())
                    .expect("manager sent a malformed query frame")
                    .with_connection_key(message.connection_key())
            })
            .collect()
    }

    /// Sequence numbers and reports of every internal error sent.
    ///
    /// # Panics
    ///
    /// Panics if an error payload is not a JSON report.
    #[must_use]
    pub fn error_reports(&self) -> Vec<(u32, ErrorReport)> {
        self.queries()
            .into_iter()
            .filter(|query| query.header().query_id() == QueryId::SendInternalError)
            .map(|query| {
                let report = ErrorReport::from_json(query.json_message().unwrap_or_default())
                    .expect("manager sent a malformed error report");
                (query.header().seq_number(), report)
            })
            .collect()
    }

    /// Handshake payloads sent, paired with their sequence numbers.
    #[must_use]
    pub fn handshake_data(&self) -> Vec<(u32, Vec<u8>)> {
        self.queries()
            .into_iter()
            .filter(|query| query.header().query_id() == QueryId::SendHandshakeData)
            .map(|query| (query.header().seq_number(), query.data().to_vec()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.sent).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.sent).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.sent).clear();
    }
}

impl ProtocolHandler for RecordingProtocolHandler {
    fn send_message_to_mobile_app(&self, message: RawMessage, final_message: bool) {
        lock(&self.sent).push((message, final_message));
    }
}
