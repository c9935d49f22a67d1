//! Status LED scheduling.
//!
//! The LED mirrors the USB mount state, except for a short blink burst after
//! MIDI traffic in either direction. [`StatusLed`] is pure: it is given the
//! time and mount state and returns the level to drive, so the firmware only
//! has to copy that level onto the pin.

/// Default full blink period (on + off).
pub const DEFAULT_BLINK_PERIOD_MS: u64 = 250;

/// Default number of blinks per burst.
pub const DEFAULT_BLINK_COUNT: u8 = 3;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusLed {
    period_ms: u64,
    blink_count: u8,
    /// Half-period toggles left in the current burst. Zero when idle.
    toggles_left: u8,
    level: bool,
    last_toggle_ms: u64,
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new(DEFAULT_BLINK_PERIOD_MS, DEFAULT_BLINK_COUNT)
    }
}

impl StatusLed {
    pub const fn new(period_ms: u64, blink_count: u8) -> Self {
        Self {
            period_ms,
            blink_count,
            toggles_left: 0,
            level: false,
            last_toggle_ms: 0,
        }
    }

    /// Whether a blink burst is in progress.
    pub fn is_blinking(&self) -> bool {
        self.toggles_left > 0
    }

    /// Start (or restart) a blink burst. The LED turns on immediately.
    pub fn trigger(&mut self, now_ms: u64) {
        self.toggles_left = self.blink_count.saturating_mul(2);
        self.level = true;
        self.last_toggle_ms = now_ms;
    }

    /// Advance the schedule and return the LED level to drive.
    ///
    /// Outside a burst the LED shows `mounted`.
    pub fn update(&mut self, now_ms: u64, mounted: bool) -> bool {
        if self.toggles_left == 0 {
            return mounted;
        }

        if now_ms.saturating_sub(self.last_toggle_ms) >= self.period_ms / 2 {
            self.level = !self.level;
            self.last_toggle_ms = now_ms;
            self.toggles_left -= 1;
        }
        self.level
    }
}
