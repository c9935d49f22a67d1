//! The main cycle.
//!
//! [`Controller`] owns the live [`Configuration`] and everything that acts
//! on it. The firmware calls [`Controller::poll()`] once per tick; each call
//! drains pending transport input through the SysEx receiver, samples the
//! switches, routes accepted transitions and returns the status LED level.
//! Nothing in a poll blocks or awaits.

use crate::hal::{ConfigFlash, MidiTransport, SwitchInputs};
use crate::mapping::Configuration;
use crate::router::route;
use crate::sampler::{InputSampler, DEFAULT_DEBOUNCE_MS};
use crate::status::{StatusLed, DEFAULT_BLINK_COUNT, DEFAULT_BLINK_PERIOD_MS};
use crate::storage::{BootSource, ConfigStore, STORAGE_OFFSET};
use crate::sysex::{dispatch, SysexReceiver};

/// Bytes pulled from the transport per read.
const READ_CHUNK: usize = 32;

// ── ControllerConfig ─────────────────────────────────────────────────────

/// Tunables for the main cycle.
///
/// [`ControllerConfig::default()`] matches the stock hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// Quiet interval between accepted switch transitions. Default: 20.
    pub debounce_ms: u64,
    /// Full status LED blink period. Default: 250.
    pub blink_period_ms: u64,
    /// Blinks per burst of MIDI activity. Default: 3.
    pub blink_count: u8,
    /// Flash offset of the configuration region. Default: 256 KiB.
    pub storage_offset: u32,
    /// USB-MIDI cable number for outgoing events. Default: 0.
    pub cable: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            blink_period_ms: DEFAULT_BLINK_PERIOD_MS,
            blink_count: DEFAULT_BLINK_COUNT,
            storage_offset: STORAGE_OFFSET,
            cable: 0,
        }
    }
}

// ── Controller ───────────────────────────────────────────────────────────

/// Footswitch state and the single-threaded main cycle.
///
/// # Example
///
/// ```ignore
/// let mut controller = Controller::boot(flash, ControllerConfig::default());
/// loop {
///     let led_on = controller.poll(now_ms(), &mut pins, &mut transport);
///     led.set_level(led_on.into());
/// }
/// ```
pub struct Controller<F> {
    config: Configuration,
    store: ConfigStore<F>,
    boot_source: BootSource,
    sampler: InputSampler,
    receiver: SysexReceiver,
    led: StatusLed,
    cable: u8,
}

impl<F> Controller<F>
where
    F: ConfigFlash,
{
    /// Load the stored mapping (or install and persist the defaults) and
    /// set up the cycle state.
    pub fn boot(flash: F, settings: ControllerConfig) -> Self {
        let mut store = ConfigStore::new(flash, settings.storage_offset);
        let (config, boot_source) = store.load_or_default();

        #[cfg(feature = "defmt")]
        defmt::info!("Boot: {}", boot_source);

        Self {
            config,
            store,
            boot_source,
            sampler: InputSampler::new(settings.debounce_ms),
            receiver: SysexReceiver::new(),
            led: StatusLed::new(settings.blink_period_ms, settings.blink_count),
            cable: settings.cable,
        }
    }

    /// Run one iteration of the main cycle. Returns the status LED level.
    pub fn poll<P, T>(&mut self, now_ms: u64, pins: &mut P, transport: &mut T) -> bool
    where
        P: SwitchInputs,
        T: MidiTransport,
    {
        self.service_input(now_ms, transport);

        let config = &self.config;
        let cable = self.cable;
        let mut sent = 0;
        self.sampler.poll(now_ms, pins, |switch, event| {
            sent += route(config, switch, event, cable, transport);
        });
        if sent > 0 {
            self.led.trigger(now_ms);
        }

        self.led.update(now_ms, transport.is_mounted())
    }

    /// Drain transport input through the SysEx receiver.
    fn service_input<T: MidiTransport>(&mut self, now_ms: u64, transport: &mut T) {
        let mut buf = [0u8; READ_CHUNK];

        while transport.available() > 0 {
            let n = transport.read(&mut buf);
            if n == 0 {
                break;
            }
            self.led.trigger(now_ms);

            for &byte in &buf[..n] {
                let Some(frame) = self.receiver.push(byte) else {
                    continue;
                };
                if let Err(_e) = dispatch(frame, &mut self.config, &mut self.store, transport) {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("SysEx frame ignored: {}", _e);
                }
            }
        }
    }

    /// The live mapping table.
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Which boot path was taken.
    pub fn boot_source(&self) -> BootSource {
        self.boot_source
    }

    pub fn store(&self) -> &ConfigStore<F> {
        &self.store
    }

    pub fn sampler(&self) -> &InputSampler {
        &self.sampler
    }

    pub fn receiver(&self) -> &SysexReceiver {
        &self.receiver
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────
