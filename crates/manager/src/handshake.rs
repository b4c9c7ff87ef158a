//! Per-connection TLS handshake driver.
//!
//! A connection moves through `Unprotected → Protecting → Handshaking →
//! Established | Failed`. No state is stored here: the session registry
//! knows whether a context exists, and the context knows whether its
//! handshake has completed.
//!
//! Every failure funnels through [`HandshakeCoordinator::fail`], which logs
//! the error, reports it to the peer as an internal error query and, when
//! the failure concludes a handshake, notifies listeners.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use logging::{HANDSHAKE_TARGET, QUERY_TARGET, trace_handshake, trace_query};
use protocol::{
    ConnectionKey, ErrorReport, QueryHeader, QueryId, QueryType, RawMessage, SecurityQuery,
    ServiceType, serialize,
};

use crate::bindings::Bindings;
use crate::crypto::{CryptoManager, HandshakeResult, HandshakeStep, SslContext};
use crate::error::HandshakeError;
use crate::listener::{ListenerRegistry, SecurityManagerListener};
use crate::pipeline::QueryHandler;
use crate::session::SessionObserver;
use crate::transport::ProtocolHandler;

/// Drives handshakes and answers security queries.
pub struct HandshakeCoordinator {
    protocol_version: u8,
    bindings: Bindings,
    listeners: ListenerRegistry,
    step_lock: Mutex<()>,
}

impl fmt::Debug for HandshakeCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandshakeCoordinator")
            .field("protocol_version", &self.protocol_version)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl HandshakeCoordinator {
    /// Creates a coordinator stamping `protocol_version` on outbound messages.
    #[must_use]
    pub fn new(protocol_version: u8) -> Self {
        Self {
            protocol_version,
            bindings: Bindings::default(),
            listeners: ListenerRegistry::new(),
            step_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    pub fn set_session_observer(&self, observer: Arc<dyn SessionObserver>) {
        trace_handshake!("session observer bound");
        self.bindings.set_session_observer(observer);
    }

    pub fn set_protocol_handler(&self, handler: Arc<dyn ProtocolHandler>) {
        trace_handshake!("protocol handler bound");
        self.bindings.set_protocol_handler(handler);
    }

    pub fn set_crypto_manager(&self, crypto: Arc<dyn CryptoManager>) {
        trace_handshake!("crypto manager bound");
        self.bindings.set_crypto_manager(crypto);
    }

    pub fn add_listener(&self, listener: Arc<dyn SecurityManagerListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn SecurityManagerListener>) -> bool {
        self.listeners.remove(listener)
    }

    /// Listeners notified when handshakes conclude.
    #[must_use]
    pub const fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Creates and installs a TLS context for `connection_key`.
    ///
    /// Returns `true` once the registry holds the new context. Any failure is
    /// reported to the peer and concludes the handshake as failed.
    pub fn protect_connection(&self, connection_key: ConnectionKey) -> bool {
        tracing::info!(target: HANDSHAKE_TARGET, connection_key = %connection_key, "protect connection");
        let outcome = {
            let _step = self.step_guard();
            self.install_context(connection_key)
        };
        match outcome {
            Ok(()) => true,
            Err(error) => {
                self.fail(connection_key, &error);
                false
            }
        }
    }

    fn install_context(&self, connection_key: ConnectionKey) -> Result<(), HandshakeError> {
        let observer = self
            .bindings
            .session_observer()
            .ok_or(HandshakeError::SessionObserverUnbound)?;
        let crypto = self
            .bindings
            .crypto_manager()
            .ok_or(HandshakeError::ProtectionUnsupported)?;

        if observer
            .ssl_context(connection_key, ServiceType::Control)
            .is_some()
        {
            return Err(HandshakeError::AlreadyProtected);
        }

        let context = crypto
            .create_ssl_context()
            .ok_or(HandshakeError::CreateSslContext)?;
        if let Err(rejection) = observer.set_ssl_context(connection_key, Arc::clone(&context)) {
            crypto.release_ssl_context(context);
            return Err(HandshakeError::RegistryRejected {
                code: rejection.code(),
            });
        }

        if observer
            .ssl_context(connection_key, ServiceType::Control)
            .is_none()
        {
            return Err(HandshakeError::ContextNotInstalled);
        }
        trace_handshake!(connection_key = %connection_key, "SSL context installed");
        Ok(())
    }

    /// Sends the first handshake flight for a protected connection.
    ///
    /// A connection whose handshake has already completed is reported as a
    /// success without touching the engine.
    pub fn start_handshake(&self, connection_key: ConnectionKey) {
        tracing::info!(target: HANDSHAKE_TARGET, connection_key = %connection_key, "start handshake");
        if let Err(error) = self.begin_handshake(connection_key) {
            self.fail(connection_key, &error);
        }
    }

    fn begin_handshake(&self, connection_key: ConnectionKey) -> Result<(), HandshakeError> {
        let context = self
            .protected_context(connection_key)
            .ok_or(HandshakeError::NotProtected)?;

        let step = {
            let _step = self.step_guard();
            (!context.is_init_completed()).then(|| context.start_handshake())
        };
        let Some(HandshakeStep { result, data }) = step else {
            tracing::info!(
                target: HANDSHAKE_TARGET,
                connection_key = %connection_key,
                "handshake already completed"
            );
            self.listeners.notify_handshake_done(connection_key, true);
            return Ok(());
        };

        if result != HandshakeResult::Success {
            return Err(HandshakeError::InvalidHandshakeData {
                seq_number: 0,
                text: self.last_error(),
            });
        }
        if !data.is_empty() {
            self.send_handshake_data(connection_key, data, 0);
        }
        Ok(())
    }

    /// Processes one inbound query; returns `false` if it failed.
    pub fn handle_query(&self, query: &SecurityQuery) -> bool {
        let connection_key = query.connection_key();
        let header = query.header();
        tracing::info!(
            target: QUERY_TARGET,
            connection_key = %connection_key,
            query_type = %header.query_type(),
            query_id = %header.query_id(),
            seq_number = header.seq_number(),
            "received security query"
        );

        match self.dispatch(query) {
            Ok(()) => true,
            Err(error) => {
                self.fail(connection_key, &error);
                false
            }
        }
    }

    fn dispatch(&self, query: &SecurityQuery) -> Result<(), HandshakeError> {
        let seq_number = query.header().seq_number();
        if self.bindings.crypto_manager().is_none() {
            return Err(HandshakeError::CryptoManagerUnbound { seq_number });
        }

        match query.header().query_id() {
            QueryId::SendHandshakeData => self.process_handshake_data(query),
            QueryId::SendInternalError => Self::process_internal_error(query),
            QueryId::InvalidQueryId => Err(HandshakeError::UnknownQueryId { seq_number }),
        }
    }

    fn process_handshake_data(&self, query: &SecurityQuery) -> Result<(), HandshakeError> {
        let connection_key = query.connection_key();
        let seq_number = query.header().seq_number();
        trace_handshake!(
            connection_key = %connection_key,
            seq_number,
            "received {} bytes of handshake data",
            query.data_size()
        );

        if query.data().is_empty() {
            return Err(HandshakeError::EmptyHandshakeData { seq_number });
        }
        let context = self
            .protected_context(connection_key)
            .ok_or(HandshakeError::ServiceNotProtected { seq_number })?;

        let HandshakeStep { result, data } = {
            let _step = self.step_guard();
            context.do_handshake_step(query.data())
        };
        if result == HandshakeResult::AbnormalFail {
            return Err(HandshakeError::InvalidHandshakeData {
                seq_number,
                text: self.last_error(),
            });
        }

        if context.is_init_completed() {
            tracing::info!(
                target: HANDSHAKE_TARGET,
                connection_key = %connection_key,
                "handshake finished with success"
            );
            self.listeners.notify_handshake_done(connection_key, true);
        } else if result == HandshakeResult::Fail {
            tracing::warn!(
                target: HANDSHAKE_TARGET,
                connection_key = %connection_key,
                "handshake finished with fail"
            );
            self.listeners.notify_handshake_done(connection_key, false);
        }

        if !data.is_empty() {
            self.send_handshake_data(connection_key, data, seq_number);
        }
        Ok(())
    }

    fn process_internal_error(query: &SecurityQuery) -> Result<(), HandshakeError> {
        let text = query
            .json_message()
            .ok_or(HandshakeError::NonUtf8ErrorReport)?;
        tracing::info!(
            target: QUERY_TARGET,
            connection_key = %query.connection_key(),
            "received internal error {text}"
        );
        let report = ErrorReport::from_json(text).map_err(HandshakeError::MalformedErrorReport)?;
        trace_query!(id = report.id, text = %report.text, "peer internal error");
        Ok(())
    }

    /// Logs `error`, reports it to the peer, and notifies listeners when it
    /// concludes a handshake.
    pub(crate) fn fail(&self, connection_key: ConnectionKey, error: &HandshakeError) {
        if error.is_warning() {
            tracing::warn!(target: HANDSHAKE_TARGET, connection_key = %connection_key, "{error}");
        } else {
            tracing::error!(
                target: HANDSHAKE_TARGET,
                connection_key = %connection_key,
                code = error.code(),
                details = ?error,
                "{error}"
            );
        }

        if error.is_reportable() {
            self.send_internal_error(
                connection_key,
                error.code(),
                &error.to_string(),
                error.seq_number(),
            );
        }
        if error.notifies_listeners() {
            self.listeners.notify_handshake_done(connection_key, false);
        }
    }

    fn protected_context(&self, connection_key: ConnectionKey) -> Option<Arc<dyn SslContext>> {
        self.bindings
            .session_observer()?
            .ssl_context(connection_key, ServiceType::Control)
    }

    fn last_error(&self) -> String {
        self.bindings
            .crypto_manager()
            .map(|crypto| crypto.last_error())
            .unwrap_or_default()
    }

    fn step_guard(&self) -> MutexGuard<'_, ()> {
        self.step_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send_handshake_data(&self, connection_key: ConnectionKey, data: Vec<u8>, seq_number: u32) {
        trace_handshake!(
            connection_key = %connection_key,
            seq_number,
            "sending {} bytes of handshake data",
            data.len()
        );
        self.send_query(connection_key, QueryId::SendHandshakeData, seq_number, &data);
    }

    fn send_internal_error(
        &self,
        connection_key: ConnectionKey,
        code: u8,
        text: &str,
        seq_number: u32,
    ) {
        match ErrorReport::new(code, text).to_json() {
            Ok(json) => {
                self.send_query(connection_key, QueryId::SendInternalError, seq_number, &json);
            }
            Err(error) => tracing::error!(
                target: QUERY_TARGET,
                connection_key = %connection_key,
                "failed to encode internal error report: {error}"
            ),
        }
    }

    fn send_query(
        &self,
        connection_key: ConnectionKey,
        query_id: QueryId,
        seq_number: u32,
        payload: &[u8],
    ) {
        let frame =
            QueryHeader::for_payload(QueryType::Notification, query_id, seq_number, payload)
                .and_then(|header| serialize(header, payload));
        let frame = match frame {
            Ok(frame) => frame,
            Err(error) => {
                tracing::error!(
                    target: QUERY_TARGET,
                    connection_key = %connection_key,
                    "failed to frame {query_id} query: {error}"
                );
                return;
            }
        };

        let Some(handler) = self.bindings.protocol_handler() else {
            tracing::error!(
                target: QUERY_TARGET,
                connection_key = %connection_key,
                "no protocol handler bound, dropping {query_id} query"
            );
            return;
        };
        trace_query!(connection_key = %connection_key, seq_number, "sending {query_id}");
        handler.send_message_to_mobile_app(
            RawMessage::new(
                connection_key,
                self.protocol_version,
                frame,
                ServiceType::Control,
            ),
            false,
        );
    }
}

impl QueryHandler for HandshakeCoordinator {
    fn handle(&self, query: SecurityQuery) {
        if !self.handle_query(&query) {
            trace_query!(
                connection_key = %query.connection_key(),
                seq_number = query.header().seq_number(),
                "security query processing failed"
            );
        }
    }
}
