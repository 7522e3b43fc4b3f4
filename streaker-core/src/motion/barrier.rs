//! Motion barrier
//!
//! Blocks until the commanded joints stop. The wait is an explicit state
//! machine (INIT -> SETTLING -> POLLING -> DONE) that asks its driver for
//! delays and status samples, so it can be stepped against a simulated
//! clock as easily as a real one.
//!
//! A joint that finishes before the first status read is never seen
//! moving. After `idle_reads` consecutive idle samples the barrier ends
//! with [`BarrierOutcome::Unconfirmed`] instead of claiming completion,
//! since a silent bus looks exactly the same.

use embedded_hal::delay::DelayNs;

use crate::config::BarrierConfig;
use crate::traits::{ActuatorPort, JointSet};

/// How a barrier ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BarrierOutcome {
    /// Motion was observed and has stopped
    Completed,
    /// No motion was ever observed
    Unconfirmed,
    /// Configured timeout elapsed with joints still moving
    TimedOut,
}

impl BarrierOutcome {
    /// Check if the barrier ended with the joints at rest
    pub fn is_settled(&self) -> bool {
        !matches!(self, BarrierOutcome::TimedOut)
    }
}

/// Barrier state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BarrierState {
    /// Not started
    Init,
    /// Waiting out the settle delay
    Settling,
    /// Sampling the moving flags
    Polling,
    /// Finished
    Done(BarrierOutcome),
}

/// Next thing the driver must do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BarrierAction {
    /// Wait this many milliseconds, then step again
    Delay(u32),
    /// Read the moving flags and pass the result to [`MotionBarrier::record`]
    Sample,
    /// The barrier is done
    Finished(BarrierOutcome),
}

/// Motion barrier state machine
#[derive(Debug, Clone)]
pub struct MotionBarrier {
    /// Timing
    config: BarrierConfig,
    /// Current state
    state: BarrierState,
    /// Time spent in requested delays (ms)
    elapsed_ms: u32,
    /// Consecutive idle samples before any motion was seen
    idle_reads: u8,
    /// Motion has been observed at least once
    seen_moving: bool,
    /// A sample was requested and not yet recorded
    sample_pending: bool,
}

impl MotionBarrier {
    /// Create a barrier in the INIT state
    pub fn new(config: BarrierConfig) -> Self {
        Self {
            config,
            state: BarrierState::Init,
            elapsed_ms: 0,
            idle_reads: 0,
            seen_moving: false,
            sample_pending: false,
        }
    }

    /// Current state
    pub fn state(&self) -> BarrierState {
        self.state
    }

    /// Time spent in delays so far (ms)
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Check if motion has been observed
    pub fn seen_moving(&self) -> bool {
        self.seen_moving
    }

    /// Advance the state machine
    pub fn step(&mut self) -> BarrierAction {
        match self.state {
            BarrierState::Init => {
                self.state = BarrierState::Settling;
                self.delay(self.config.settle_ms)
            }
            BarrierState::Settling => {
                self.state = BarrierState::Polling;
                self.sample_pending = true;
                BarrierAction::Sample
            }
            BarrierState::Polling => {
                if self.sample_pending {
                    return BarrierAction::Sample;
                }
                if let Some(timeout) = self.config.timeout_ms {
                    if self.elapsed_ms >= timeout {
                        return self.finish(BarrierOutcome::TimedOut);
                    }
                }
                self.sample_pending = true;
                self.delay(self.config.poll_ms)
            }
            BarrierState::Done(outcome) => BarrierAction::Finished(outcome),
        }
    }

    /// Record the result of a requested sample
    ///
    /// Samples that were not requested are ignored.
    pub fn record(&mut self, moving: bool) {
        if self.state != BarrierState::Polling || !self.sample_pending {
            return;
        }
        self.sample_pending = false;

        if moving {
            self.seen_moving = true;
            self.idle_reads = 0;
        } else if self.seen_moving {
            self.finish(BarrierOutcome::Completed);
        } else {
            self.idle_reads = self.idle_reads.saturating_add(1);
            if self.idle_reads >= self.config.idle_reads {
                self.finish(BarrierOutcome::Unconfirmed);
            }
        }
    }

    fn delay(&mut self, ms: u32) -> BarrierAction {
        self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
        BarrierAction::Delay(ms)
    }

    fn finish(&mut self, outcome: BarrierOutcome) -> BarrierAction {
        self.state = BarrierState::Done(outcome);
        self.sample_pending = false;
        BarrierAction::Finished(outcome)
    }
}

/// Block until the joints in `joints` stop moving
///
/// Drives a [`MotionBarrier`] with real delays and bus reads. Bus errors
/// abort the wait.
pub fn wait_for_motion<P, D>(
    port: &mut P,
    delay: &mut D,
    joints: JointSet<'_>,
    config: &BarrierConfig,
) -> Result<BarrierOutcome, P::Error>
where
    P: ActuatorPort,
    D: DelayNs,
{
    let mut barrier = MotionBarrier::new(*config);
    loop {
        match barrier.step() {
            BarrierAction::Delay(ms) => delay.delay_ms(ms),
            BarrierAction::Sample => {
                let moving = port.any_moving(joints)?;
                barrier.record(moving);
            }
            BarrierAction::Finished(outcome) => {
                trace!("barrier done after {} ms", barrier.elapsed_ms());
                return Ok(outcome);
            }
        }
    }
}
