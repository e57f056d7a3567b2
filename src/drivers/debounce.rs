//! Polling debouncer for the validator's accept lines.
//!
//! A line is only trusted once it has read the wanted level for a run of consecutive samples
//! taken at a fixed interval. The validator holds an accept line low for 100 ± 3 ms per note, so
//! the default run of 5 samples 10 ms apart (50 ms) settles well inside one pulse.

use crate::{REQUIRED_RUN_LENGTH, Result, SAMPLE_INTERVAL_MS, TIMEOUT_BUDGET, error::Error};
use embassy_time::Duration;
use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, InputPin, PinState},
};

/// Outcome of [`Debouncer::wait_for`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceResult {
    /// The line held the target level for the whole run
    Stable,
    /// The timeout budget ran out before the line settled
    TimedOut,
}

impl DebounceResult {
    pub fn is_stable(self) -> bool {
        self == DebounceResult::Stable
    }
}

/// Whether a wait may give up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitMode {
    /// Spend the timeout budget and report [`DebounceResult::TimedOut`] once it is gone
    Bounded,
    /// Never time out. A line that never reaches the target level blocks forever.
    Unbounded,
}

/// Which samples spend the timeout budget in [`WaitMode::Bounded`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BudgetPolicy {
    /// Only a mismatching sample (the one that also resets the run) spends budget. Matching
    /// samples are free, so a line flickering around the target level can stretch the wait well
    /// past `timeout_budget * sample_interval`.
    #[default]
    OnMismatch,
    /// Every sample spends budget, making the bound a hard sample count
    EverySample,
}

/// Timing of a debounced wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceConfig {
    /// Delay after every sample
    pub sample_interval: Duration,
    /// Consecutive matching samples needed to report [`DebounceResult::Stable`]
    pub required_run_length: u16,
    /// Budget available to a bounded wait, see [`BudgetPolicy`]
    pub timeout_budget: u32,
    pub budget_policy: BudgetPolicy,
}

impl DebounceConfig {
    pub const fn new() -> Self {
        Self {
            sample_interval: Duration::from_millis(SAMPLE_INTERVAL_MS),
            required_run_length: REQUIRED_RUN_LENGTH,
            timeout_budget: TIMEOUT_BUDGET,
            budget_policy: BudgetPolicy::OnMismatch,
        }
    }

    pub const fn with_sample_interval(mut self, sample_interval: Duration) -> Self {
        self.sample_interval = sample_interval;
        self
    }

    pub const fn with_required_run_length(mut self, required_run_length: u16) -> Self {
        self.required_run_length = required_run_length;
        self
    }

    pub const fn with_timeout_budget(mut self, timeout_budget: u32) -> Self {
        self.timeout_budget = timeout_budget;
        self
    }

    pub const fn with_budget_policy(mut self, budget_policy: BudgetPolicy) -> Self {
        self.budget_policy = budget_policy;
        self
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the current level of a line
pub fn read_level<P: InputPin>(source: &mut P) -> Result<PinState> {
    source
        .is_high()
        .map(PinState::from)
        .map_err(|e| Error::AcceptLine(e.kind()))
}

pub(crate) fn level_name(level: PinState) -> &'static str {
    match level {
        PinState::Low => "LOW",
        PinState::High => "HIGH",
    }
}

/// Samples input lines at a fixed interval until they settle
pub struct Debouncer<D> {
    delay: D,
    config: DebounceConfig,
}

impl<D: DelayNs> Debouncer<D> {
    /// Create a new debouncer.
    ///
    /// # Parameters
    /// * `delay` - Blocking delay used between samples
    /// * `config` - Sample interval, run length and timeout budget
    pub fn new(delay: D, config: DebounceConfig) -> Self {
        Self { delay, config }
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    /// Give back the delay provider
    pub fn release(self) -> D {
        self.delay
    }

    /// Wait one sample interval. Intervals longer than a single `delay_us` call can express are
    /// split into several calls.
    fn pause(&mut self) {
        let mut remaining = self.config.sample_interval.as_micros();
        while remaining > u64::from(u32::MAX) {
            self.delay.delay_us(u32::MAX);
            remaining -= u64::from(u32::MAX);
        }
        // fits after the loop
        self.delay.delay_us(remaining as u32);
    }

    /// Block until `source` has read `target` for `required_run_length` consecutive samples,
    /// or until a bounded wait has spent its timeout budget.
    ///
    /// Every sample is followed by one `sample_interval` delay. A mismatching sample restarts the
    /// run and, in [`WaitMode::Bounded`], spends one unit of budget. The loop condition is checked
    /// before sampling, so a zero run length is stable and a zero bounded budget times out
    /// without touching the line.
    ///
    /// # Parameters
    /// * `source` - The line to watch
    /// * `target` - The level the line has to settle at
    /// * `mode` - Whether the wait may time out
    ///
    /// # Returns
    /// [`DebounceResult::Stable`] or [`DebounceResult::TimedOut`], or [`Error::AcceptLine`] if
    /// the line could not be read
    pub fn wait_for<P: InputPin>(
        &mut self,
        source: &mut P,
        target: PinState,
        mode: WaitMode,
    ) -> Result<DebounceResult> {
        info!("DEBOUNCE: Waiting for line to settle {}", level_name(target));
        let run_length = self.config.required_run_length;
        let bounded = mode == WaitMode::Bounded;
        let every_sample = self.config.budget_policy == BudgetPolicy::EverySample;

        let mut remaining = run_length;
        let mut budget = self.config.timeout_budget;
        let mut samples: u32 = 0;

        while remaining > 0 && (!bounded || budget > 0) {
            let level = read_level(source)?;
            samples = samples.saturating_add(1);
            if level == target {
                remaining -= 1;
                if bounded && every_sample {
                    budget -= 1;
                }
            } else {
                if remaining != run_length {
                    trace!("DEBOUNCE: Run broken after {} samples", run_length - remaining);
                }
                remaining = run_length;
                if bounded {
                    budget -= 1;
                }
            }
            self.pause();
        }

        let result = if remaining == 0 {
            DebounceResult::Stable
        } else {
            DebounceResult::TimedOut
        };
        match result {
            DebounceResult::Stable => info!("DEBOUNCE: Done waiting. Result: GOOD ({} samples)", samples),
            DebounceResult::TimedOut => warn!("DEBOUNCE: Done waiting. Result: TIMEOUT ({} samples)", samples),
        }
        Ok(result)
    }
}
