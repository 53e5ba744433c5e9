use thiserror::Error;

/// Byte budgets for reading from the reader connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    pub max_read_bytes: usize,
    pub max_pending_bytes: usize,
}

impl Limits {
    pub const DEFAULT_MAX_READ_BYTES: usize = 1_024;
    pub const DEFAULT_MAX_PENDING_BYTES: usize = 4_096;
    /// Header, type, length and checksum bytes of an empty frame.
    pub const MIN_FRAME_BYTES: usize = 4;
    /// An empty frame plus the largest payload the length byte can declare.
    pub const MAX_FRAME_BYTES: usize = Self::MIN_FRAME_BYTES + 255;

    #[must_use]
    pub const fn conservative_defaults() -> Self {
        Self {
            max_read_bytes: Self::DEFAULT_MAX_READ_BYTES,
            max_pending_bytes: Self::DEFAULT_MAX_PENDING_BYTES,
        }
    }

    pub fn validate(&self) -> Result<(), LimitsError> {
        if self.max_read_bytes < Self::MIN_FRAME_BYTES {
            return Err(LimitsError::ReadBelowMinimumFrame {
                max_read_bytes: self.max_read_bytes,
                min_frame_bytes: Self::MIN_FRAME_BYTES,
            });
        }

        if self.max_pending_bytes < self.max_read_bytes {
            return Err(LimitsError::PendingBelowRead {
                max_pending_bytes: self.max_pending_bytes,
                max_read_bytes: self.max_read_bytes,
            });
        }

        if self.max_pending_bytes < Self::MAX_FRAME_BYTES {
            return Err(LimitsError::PendingBelowMaxFrame {
                max_pending_bytes: self.max_pending_bytes,
                max_frame_bytes: Self::MAX_FRAME_BYTES,
            });
        }

        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::conservative_defaults()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitsError {
    #[error("max_read_bytes ({max_read_bytes}) must be >= the smallest frame ({min_frame_bytes})")]
    ReadBelowMinimumFrame {
        max_read_bytes: usize,
        min_frame_bytes: usize,
    },

    #[error(
        "max_pending_bytes ({max_pending_bytes}) must be >= max_read_bytes ({max_read_bytes})"
    )]
    PendingBelowRead {
        max_pending_bytes: usize,
        max_read_bytes: usize,
    },

    #[error(
        "max_pending_bytes ({max_pending_bytes}) must hold the largest frame ({max_frame_bytes})"
    )]
    PendingBelowMaxFrame {
        max_pending_bytes: usize,
        max_frame_bytes: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::{Limits, LimitsError};

    #[test]
    fn conservative_defaults_validate() {
        assert!(Limits::conservative_defaults().validate().is_ok());
    }

    #[test]
    fn rejects_read_buffer_smaller_than_a_frame() {
        let limits = Limits {
            max_read_bytes: 3,
            ..Limits::default()
        };
        assert_eq!(
            limits.validate(),
            Err(LimitsError::ReadBelowMinimumFrame {
                max_read_bytes: 3,
                min_frame_bytes: 4,
            })
        );
    }

    #[test]
    fn rejects_pending_buffer_smaller_than_read() {
        let limits = Limits {
            max_read_bytes: 2_048,
            max_pending_bytes: 1_024,
        };
        assert_eq!(
            limits.validate(),
            Err(LimitsError::PendingBelowRead {
                max_pending_bytes: 1_024,
                max_read_bytes: 2_048,
            })
        );
    }

    #[test]
    fn rejects_pending_buffer_that_cannot_hold_a_full_frame() {
        let limits = Limits {
            max_read_bytes: 8,
            max_pending_bytes: 8,
        };
        assert_eq!(
            limits.validate(),
            Err(LimitsError::PendingBelowMaxFrame {
                max_pending_bytes: 8,
                max_frame_bytes: 259,
            })
        );

        let limits = Limits {
            max_read_bytes: 8,
            max_pending_bytes: Limits::MAX_FRAME_BYTES,
        };
        assert!(limits.validate().is_ok());
    }
}
