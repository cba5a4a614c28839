//! Error handling primitives for the MAX30102 driver.

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The part identifier register did not hold the MAX30102 constant.
    PartIdMismatch(u8),
    /// Any error reported by the underlying bus interface.
    Transport(E),
    /// The bus interface gave up waiting on the device.
    Timeout(E),
    /// A caller supplied an empty buffer or an unusable setting.
    InvalidParam,
    /// No sample was available this cycle. Expected between sampling intervals.
    NoData,
}

/// Closed classification of [`Error`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Hardware did not come up as expected.
    Init,
    /// Bus-level failure.
    Transport,
    /// Bus-level timeout; propagated like [`ErrorKind::Transport`].
    Timeout,
    /// Programmer error; retrying does not help.
    InvalidParam,
    /// Routine absence of data.
    NoData,
}

impl ErrorKind {
    /// Returns `false` only for the routine [`ErrorKind::NoData`] outcome.
    pub const fn is_fault(self) -> bool {
        !matches!(self, Self::NoData)
    }

    /// Returns `true` for failures that a higher layer may retry.
    pub const fn is_transport(self) -> bool {
        matches!(self, Self::Transport | Self::Timeout)
    }
}

impl<E> Error<E> {
    /// Classifies the error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PartIdMismatch(_) => ErrorKind::Init,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::InvalidParam => ErrorKind::InvalidParam,
            Self::NoData => ErrorKind::NoData,
        }
    }

    /// Shorthand for `self.kind() == ErrorKind::NoData`.
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Returns the bus error, if this error carries one.
    pub fn into_transport(self) -> Option<E> {
        match self {
            Self::Transport(err) | Self::Timeout(err) => Some(err),
            _ => None,
        }
    }
}
