use embedded_hal::digital::ErrorKind;

/// Faults that stop a payment attempt. A note that never arrives is not one of these, it is
/// reported as [`DebounceResult::TimedOut`](crate::drivers::debounce::DebounceResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The requested channel index is not in the channel table
    #[error("no channel at index {0}")]
    UnknownChannel(usize),
    /// The channel table was already holding its maximum number of channels
    #[error("channel table is full ({0} channels)")]
    ChannelTableFull(usize),
    /// Reading an accept line failed
    #[error("failed to read accept line: {0}")]
    AcceptLine(ErrorKind),
    /// Driving an inhibit line failed
    #[error("failed to drive inhibit line: {0}")]
    InhibitLine(ErrorKind),
}

pub type Result<T> = core::result::Result<T, Error>;
