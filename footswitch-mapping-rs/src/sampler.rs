//! Debounced switch sampling.
//!
//! [`InputSampler`] polls every switch once per main-cycle iteration and
//! reports stable press/release transitions. A transition is accepted only
//! when the raw level differs from the stable level and at least the quiet
//! interval has passed since the previous accepted transition on that input.
//!
//! Switches are wired to ground with pull-ups, so a closed switch reads low
//! and is reported as pressed.

use crate::hal::SwitchInputs;
use crate::mapping::{SwitchEvent, MAX_SWITCHES};

/// Default quiet interval between accepted transitions.
pub const DEFAULT_DEBOUNCE_MS: u64 = 20;

/// Debounce state of one physical switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitalInput {
    stable: bool,
    last_change_ms: u64,
}

impl DigitalInput {
    /// A released input that last changed at time zero.
    pub const fn new() -> Self {
        Self {
            stable: false,
            last_change_ms: 0,
        }
    }

    /// Current debounced state.
    pub fn is_pressed(&self) -> bool {
        self.stable
    }

    /// Time of the last accepted transition.
    pub fn last_change_ms(&self) -> u64 {
        self.last_change_ms
    }

    /// Feed one raw reading. Returns the event if the transition is accepted.
    pub fn sample(&mut self, pressed: bool, now_ms: u64, debounce_ms: u64) -> Option<SwitchEvent> {
        if pressed == self.stable || now_ms.saturating_sub(self.last_change_ms) < debounce_ms {
            return None;
        }

        self.stable = pressed;
        self.last_change_ms = now_ms;

        Some(if pressed {
            SwitchEvent::Press
        } else {
            SwitchEvent::Release
        })
    }
}

/// Debouncer for up to [`MAX_SWITCHES`] inputs.
///
/// # Example
///
/// ```ignore
/// let mut sampler = InputSampler::new(DEFAULT_DEBOUNCE_MS);
/// sampler.poll(now_ms, &mut pins, |switch, event| {
///     route(&config, switch, event, 0, &mut transport);
/// });
/// ```
#[derive(Debug, Clone)]
pub struct InputSampler {
    inputs: [DigitalInput; MAX_SWITCHES],
    debounce_ms: u64,
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl InputSampler {
    pub const fn new(debounce_ms: u64) -> Self {
        Self {
            inputs: [DigitalInput::new(); MAX_SWITCHES],
            debounce_ms,
        }
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    /// Debounce state of one input, if `index` is in range.
    pub fn input(&self, index: usize) -> Option<&DigitalInput> {
        self.inputs.get(index)
    }

    /// Sample every input once and call `on_event` for each accepted
    /// transition, in input order.
    ///
    /// Returns the number of events reported.
    pub fn poll<P, E>(&mut self, now_ms: u64, pins: &mut P, mut on_event: E) -> usize
    where
        P: SwitchInputs,
        E: FnMut(usize, SwitchEvent),
    {
        let count = pins.count().min(MAX_SWITCHES);
        let mut events = 0;

        for (index, input) in self.inputs[..count].iter_mut().enumerate() {
            let pressed = !pins.is_high(index);
            if let Some(event) = input.sample(pressed, now_ms, self.debounce_ms) {
                #[cfg(feature = "defmt")]
                defmt::trace!("Switch {} {} at {} ms", index, event, now_ms);

                on_event(index, event);
                events += 1;
            }
        }

        events
    }
}
