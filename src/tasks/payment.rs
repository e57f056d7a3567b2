use crate::{
    ACCEPTED_LEVEL, ALLOW_LEVEL, CHANNEL_COUNT, DENY_LEVEL, Result,
    drivers::{
        acceptor::{ChannelTable, Denomination, write_level},
        debounce::{DebounceResult, Debouncer, WaitMode},
    },
};
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

/// Where a payment attempt has got to. `ChannelDisabled` is reached from both outcomes, so a
/// channel is never left open once [`PaymentSequencer::pay`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaymentState {
    /// No attempt running
    Idle,
    /// Inhibit released, waiting for a note
    ChannelEnabled,
    /// The accept line settled low, a note was taken
    Stable,
    /// No note arrived inside the timeout budget
    TimedOut,
    /// Inhibit driven back to deny
    ChannelDisabled,
    /// Attempt finished and reported
    Done,
}

/// Runs single payment attempts against the validator.
///
/// Owns the channel table and the debouncer for its whole life, there is only ever one attempt
/// in flight.
pub struct PaymentSequencer<I, O, D, const N: usize = CHANNEL_COUNT> {
    channels: ChannelTable<I, O, N>,
    debouncer: Debouncer<D>,
    state: PaymentState,
}

impl<I, O, D, const N: usize> PaymentSequencer<I, O, D, N>
where
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    pub fn new(channels: ChannelTable<I, O, N>, debouncer: Debouncer<D>) -> Self {
        Self {
            channels,
            debouncer,
            state: PaymentState::Idle,
        }
    }

    /// The last state the most recent attempt reached
    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn channels(&self) -> &ChannelTable<I, O, N> {
        &self.channels
    }

    pub fn release(self) -> (ChannelTable<I, O, N>, Debouncer<D>) {
        (self.channels, self.debouncer)
    }

    /// Take one note on the given channel.
    ///
    /// Releases the channel's inhibit line, waits (bounded) for the accept line to settle at its
    /// accepted level and then drives the inhibit line back to deny. The re-inhibit always
    /// happens, also after a timeout or a pin failure. There is no retry.
    ///
    /// # Parameters
    /// * `index` - Position of the channel in the channel table
    ///
    /// # Returns
    /// `Ok(true)` if a note was taken, `Ok(false)` if none arrived in time. Pin failures are
    /// reported after the cleanup; a failure while enabling or waiting wins over one while
    /// re-inhibiting.
    pub fn pay(&mut self, index: usize) -> Result<bool> {
        self.state = PaymentState::Idle;
        let channel = self.channels.get_mut(index)?;
        info!(
            "PAYMENT: Initializing payment of {} PLN on channel {}",
            channel.value(),
            index
        );
        let (accept, inhibit) = channel.lines();

        let outcome = match write_level(inhibit, ALLOW_LEVEL) {
            Ok(()) => {
                self.state = PaymentState::ChannelEnabled;
                info!("PAYMENT: Channel {} enabled, waiting for its accept line", index);
                self.debouncer.wait_for(accept, ACCEPTED_LEVEL, WaitMode::Bounded)
            }
            Err(e) => Err(e),
        };
        if let Ok(result) = outcome {
            self.state = match result {
                DebounceResult::Stable => PaymentState::Stable,
                DebounceResult::TimedOut => PaymentState::TimedOut,
            };
        }

        let cleanup = write_level(inhibit, DENY_LEVEL);
        match cleanup {
            Ok(()) => {
                self.state = PaymentState::ChannelDisabled;
                debug!("PAYMENT: Channel {} disabled", index);
            }
            Err(e) => error!("PAYMENT: Channel {} could not be disabled: {}", index, e),
        }

        let result = outcome.and_then(|result| cleanup.map(|()| result))?;
        self.state = PaymentState::Done;
        if result.is_stable() {
            info!("PAYMENT: Note accepted on channel {}", index);
        } else {
            warn!("PAYMENT: No note on channel {}", index);
        }
        Ok(result.is_stable())
    }

    /// Take one note of the given denomination
    pub fn pay_denomination(&mut self, denomination: Denomination) -> Result<bool> {
        self.pay(denomination.index())
    }
}
