//! Transport-level message types shared with the connection layer.

use ::core::fmt;

/// Protocol version used for messages the security manager originates.
pub const PROTOCOL_VERSION_2: u8 = 2;

/// Opaque identifier correlating all traffic of one peer connection.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConnectionKey(pub u32);

impl ConnectionKey {
    /// Returns the numeric value of the key.
    #[must_use]
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ConnectionKey {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Logical sub-channels multiplexed over one connection.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum ServiceType {
    /// Session and security negotiation; carries every security query.
    Control = 0x00,
    /// Remote procedure calls.
    Rpc = 0x07,
    /// Audio streaming.
    Audio = 0x0A,
    /// Video streaming.
    Video = 0x0B,
    /// Bulk binary transfers.
    Bulk = 0x0F,
}

impl ServiceType {
    /// Returns the numeric service identifier.
    #[must_use]
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Looks up a service by its numeric identifier.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Control),
            0x07 => Some(Self::Rpc),
            0x0A => Some(Self::Audio),
            0x0B => Some(Self::Video),
            0x0F => Some(Self::Bulk),
            _ => None,
        }
    }
}

/// One message as exchanged with the transport layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawMessage {
    connection_key: ConnectionKey,
    protocol_version: u8,
    data: Vec<u8>,
    service_type: ServiceType,
}

impl RawMessage {
    /// Creates a message for `connection_key` on `service_type`.
    #[must_use]
    pub fn new(
        connection_key: ConnectionKey,
        protocol_version: u8,
        data: Vec<u8>,
        service_type: ServiceType,
    ) -> Self {
        Self {
            connection_key,
            protocol_version,
            data,
            service_type,
        }
    }

    /// Creates a control-service message using [`PROTOCOL_VERSION_2`].
    #[must_use]
    pub fn control(connection_key: ConnectionKey, data: Vec<u8>) -> Self {
        Self::new(
            connection_key,
            PROTOCOL_VERSION_2,
            data,
            ServiceType::Control,
        )
    }

    /// Returns the connection the message belongs to.
    #[must_use]
    #[inline]
    pub const fn connection_key(&self) -> ConnectionKey {
        self.connection_key
    }

    /// Returns the transport protocol version.
    #[must_use]
    #[inline]
    pub const fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    /// Returns the message body.
    #[must_use]
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the body length in bytes.
    #[must_use]
    #[inline]
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Returns the service the message travels on.
    #[must_use]
    #[inline]
    pub const fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Consumes the message and returns its body.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
