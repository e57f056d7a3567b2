#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin, PinState};
use nv10_acceptor::{
    Channel, ChannelTable, DebounceConfig, Debouncer, Denomination, PaymentSequencer,
};

pub use PinState::{High, Low};

/// Fault raised by a line set up to fail
#[derive(Debug)]
pub struct LineFault;

impl embedded_hal::digital::Error for LineFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Accept line that plays back a script and then holds its last level
pub struct ScriptedLine {
    levels: Vec<PinState>,
    reads: Rc<Cell<usize>>,
    broken: bool,
}

impl ScriptedLine {
    fn next(&mut self) -> Result<PinState, LineFault> {
        if self.broken {
            return Err(LineFault);
        }
        let n = self.reads.get();
        self.reads.set(n + 1);
        let level = self.levels.get(n).or(self.levels.last()).copied();
        Ok(level.unwrap_or(High))
    }
}

impl ErrorType for ScriptedLine {
    type Error = LineFault;
}

impl InputPin for ScriptedLine {
    fn is_high(&mut self) -> Result<bool, LineFault> {
        Ok(self.next()? == High)
    }

    fn is_low(&mut self) -> Result<bool, LineFault> {
        Ok(self.next()? == Low)
    }
}

/// Inhibit line that records every level it was driven to
pub struct RecordingLine {
    writes: Rc<RefCell<Vec<PinState>>>,
    refuse: Option<PinState>,
}

impl RecordingLine {
    fn drive(&mut self, level: PinState) -> Result<(), LineFault> {
        if self.refuse == Some(level) {
            return Err(LineFault);
        }
        self.writes.borrow_mut().push(level);
        Ok(())
    }
}

impl ErrorType for RecordingLine {
    type Error = LineFault;
}

impl OutputPin for RecordingLine {
    fn set_low(&mut self) -> Result<(), LineFault> {
        self.drive(Low)
    }

    fn set_high(&mut self) -> Result<(), LineFault> {
        self.drive(High)
    }
}

/// Delay that returns at once and adds up the time it was asked to wait
#[derive(Clone, Default)]
pub struct NoDelay {
    pub waited_us: Rc<Cell<u64>>,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waited_us.set(self.waited_us.get() + u64::from(ns) / 1_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.waited_us.set(self.waited_us.get() + u64::from(us));
    }
}

/// How each simulated channel misbehaves
#[derive(Clone, Default)]
pub struct LineSetup {
    pub accept: Vec<PinState>,
    pub broken_accept: bool,
    pub refuse_inhibit: Option<PinState>,
}

impl LineSetup {
    pub fn playing(levels: &[PinState]) -> Self {
        Self {
            accept: levels.to_vec(),
            ..Self::default()
        }
    }
}

/// Handles onto the simulated lines after the sequencer has taken ownership of them
pub struct Probes {
    pub reads: Vec<Rc<Cell<usize>>>,
    pub writes: Vec<Rc<RefCell<Vec<PinState>>>>,
    pub delay: NoDelay,
}

impl Probes {
    pub fn writes(&self, denomination: Denomination) -> Vec<PinState> {
        self.writes[denomination.index()].borrow().clone()
    }

    pub fn reads(&self, denomination: Denomination) -> usize {
        self.reads[denomination.index()].get()
    }

    pub fn untouched_except(&self, denomination: Denomination) -> bool {
        Denomination::ALL
            .iter()
            .filter(|d| **d != denomination)
            .all(|d| self.writes(*d).is_empty() && self.reads(*d) == 0)
    }
}

pub type SimSequencer = PaymentSequencer<ScriptedLine, RecordingLine, NoDelay>;

/// A sequencer over four simulated channels. Channels without a setup idle high.
pub fn sequencer(
    config: DebounceConfig,
    setups: &[(Denomination, LineSetup)],
) -> (SimSequencer, Probes) {
    let delay = NoDelay::default();
    let mut probes = Probes {
        reads: Vec::new(),
        writes: Vec::new(),
        delay: delay.clone(),
    };
    let mut channels = ChannelTable::new();
    for denomination in Denomination::ALL {
        let setup = setups
            .iter()
            .find(|(d, _)| *d == denomination)
            .map(|(_, s)| s.clone())
            .unwrap_or_else(|| LineSetup::playing(&[High]));
        let reads = Rc::new(Cell::new(0));
        let writes = Rc::new(RefCell::new(Vec::new()));
        let accept = ScriptedLine {
            levels: setup.accept,
            reads: reads.clone(),
            broken: setup.broken_accept,
        };
        let inhibit = RecordingLine {
            writes: writes.clone(),
            refuse: setup.refuse_inhibit,
        };
        channels
            .push(Channel::for_denomination(denomination, accept, inhibit))
            .unwrap();
        probes.reads.push(reads);
        probes.writes.push(writes);
    }
    let sequencer = PaymentSequencer::new(channels, Debouncer::new(delay, config));
    (sequencer, probes)
}

/// Sequencer whose only scripted channel is `denomination`
pub fn single(denomination: Denomination, setup: LineSetup) -> (SimSequencer, Probes) {
    sequencer(DebounceConfig::default(), &[(denomination, setup)])
}
