//! Channel model for an NV10 note validator in parallel mode (all DIP switches down).
//!
//! Each note channel has an accept line driven by the validator (low for 100 ± 3 ms when a note
//! of that channel was taken) and an inhibit line driven by us (high stops the validator taking
//! that note). The validator works with 5 V signals, so the lines must go through a level
//! shifter before reaching a 3V3 MCU.

use crate::{CHANNEL_COUNT, DENY_LEVEL, Result, error::Error};
use embedded_hal::digital::{Error as _, OutputPin, PinState};
use heapless::Vec;

/// The notes the validator is programmed for, in channel order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Denomination {
    Ten = 0,
    Twenty,
    Fifty,
    Hundred,
}

impl Denomination {
    pub const ALL: [Denomination; CHANNEL_COUNT] = [
        Denomination::Ten,
        Denomination::Twenty,
        Denomination::Fifty,
        Denomination::Hundred,
    ];

    /// Face value in PLN
    pub const fn value(self) -> u16 {
        match self {
            Denomination::Ten => 10,
            Denomination::Twenty => 20,
            Denomination::Fifty => 50,
            Denomination::Hundred => 100,
        }
    }

    /// Position of this denomination's channel in the channel table
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Drive a line to the given level
pub fn write_level<O: OutputPin>(sink: &mut O, level: PinState) -> Result<()> {
    sink.set_state(level)
        .map_err(|e| Error::InhibitLine(e.kind()))
}

/// One note channel: a face value, the accept line we read and the inhibit line we drive
pub struct Channel<I, O> {
    value: u16,
    accept: I,
    inhibit: O,
}

impl<I, O> Channel<I, O> {
    pub fn new(value: u16, accept: I, inhibit: O) -> Self {
        Self {
            value,
            accept,
            inhibit,
        }
    }

    /// A channel for one of the programmed denominations
    pub fn for_denomination(denomination: Denomination, accept: I, inhibit: O) -> Self {
        Self::new(denomination.value(), accept, inhibit)
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn accept(&mut self) -> &mut I {
        &mut self.accept
    }

    pub fn inhibit(&mut self) -> &mut O {
        &mut self.inhibit
    }

    /// Both lines at once, for when the accept line is read while the inhibit line is held
    pub fn lines(&mut self) -> (&mut I, &mut O) {
        (&mut self.accept, &mut self.inhibit)
    }

    pub fn into_parts(self) -> (I, O) {
        (self.accept, self.inhibit)
    }
}

/// Fixed-capacity, ordered set of channels built once at startup. A channel's identity is its
/// position in the table.
pub struct ChannelTable<I, O, const N: usize = CHANNEL_COUNT> {
    channels: Vec<Channel<I, O>, N>,
}

impl<I, O, const N: usize> ChannelTable<I, O, N> {
    pub const fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Append a channel, returning its index
    pub fn push(&mut self, channel: Channel<I, O>) -> Result<usize> {
        self.channels
            .push(channel)
            .map_err(|_| Error::ChannelTableFull(N))?;
        Ok(self.channels.len() - 1)
    }

    pub fn get(&self, index: usize) -> Result<&Channel<I, O>> {
        self.channels.get(index).ok_or(Error::UnknownChannel(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Channel<I, O>> {
        self.channels
            .get_mut(index)
            .ok_or(Error::UnknownChannel(index))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel<I, O>> {
        self.channels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel<I, O>> {
        self.channels.iter_mut()
    }
}

impl<I, O: OutputPin, const N: usize> ChannelTable<I, O, N> {
    /// Drive every inhibit line to the deny level. Every channel is visited even if an earlier
    /// one fails; the first failure is returned.
    pub fn inhibit_all(&mut self) -> Result<()> {
        let mut outcome = Ok(());
        for (index, channel) in self.channels.iter_mut().enumerate() {
            if let Err(e) = write_level(channel.inhibit(), DENY_LEVEL) {
                error!("ACCEPTOR: Failed to inhibit channel {}", index);
                outcome = outcome.and(Err(e));
            }
        }
        debug!("ACCEPTOR: {} channels inhibited", self.channels.len());
        outcome
    }
}

impl<I, O, const N: usize> Default for ChannelTable<I, O, N> {
    fn default() -> Self {
        Self::new()
    }
}
