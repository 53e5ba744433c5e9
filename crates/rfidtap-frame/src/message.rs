use std::fmt;

/// Reader message classes, keyed by the frame type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    ConnectionEstablished,
    TagRead,
    Heartbeat,
    Unrecognized(u8),
}

impl MessageKind {
    pub const CONNECTION_ESTABLISHED: u8 = 0x3A;
    pub const TAG_READ: u8 = 0x17;
    pub const HEARTBEAT: u8 = 0x40;

    #[must_use]
    pub const fn from_type_byte(value: u8) -> Self {
        match value {
            Self::CONNECTION_ESTABLISHED => Self::ConnectionEstablished,
            Self::TAG_READ => Self::TagRead,
            Self::HEARTBEAT => Self::Heartbeat,
            other => Self::Unrecognized(other),
        }
    }

    #[must_use]
    pub const fn type_byte(self) -> u8 {
        match self {
            Self::ConnectionEstablished => Self::CONNECTION_ESTABLISHED,
            Self::TagRead => Self::TAG_READ,
            Self::Heartbeat => Self::HEARTBEAT,
            Self::Unrecognized(other) => other,
        }
    }

    #[must_use]
    pub const fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ConnectionEstablished => "TCP connection with RFID reader successful",
            Self::TagRead => "TAG Read",
            Self::Heartbeat => "Heartbeat",
            Self::Unrecognized(_) => "The RFID type is not recognized",
        }
    }
}

impl From<u8> for MessageKind {
    fn from(value: u8) -> Self {
        Self::from_type_byte(value)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionEstablished => f.write_str("connection-established"),
            Self::TagRead => f.write_str("tag-read"),
            Self::Heartbeat => f.write_str("heartbeat"),
            Self::Unrecognized(value) => write!(f, "unrecognized(0x{value:02x})"),
        }
    }
}
