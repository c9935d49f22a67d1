use super::error::MappingError;
use super::slot::{EventSlot, SwitchEvent, SwitchMapping};
use super::{DEFAULT_MAPPING, DEFAULT_SWITCH_COUNT, MAX_SWITCHES};

/// The complete switch-to-message mapping table.
///
/// Only the first [`switch_count()`](Self::switch_count) entries are
/// addressable; the remaining entries are kept empty so two configurations
/// with the same visible content compare equal.
///
/// # Initialization
///
/// [`Configuration::defaults()`] builds the table from the static
/// [`DEFAULT_MAPPING`] constant. Loading from flash goes through
/// [`storage::deserialize()`](crate::storage::deserialize), which produces
/// a fresh `Configuration` and never touches the live one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    switch_count: u8,
    switches: [SwitchMapping; MAX_SWITCHES],
}

impl Default for Configuration {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Configuration {
    /// Create a table for `switch_count` switches with every slot empty.
    ///
    /// Returns [`MappingError::InvalidSwitchCount`] unless
    /// `1 <= switch_count <= MAX_SWITCHES`.
    pub fn new(switch_count: usize) -> Result<Self, MappingError> {
        if switch_count == 0 || switch_count > MAX_SWITCHES {
            return Err(MappingError::InvalidSwitchCount);
        }
        Ok(Self {
            switch_count: switch_count as u8,
            switches: Default::default(),
        })
    }

    /// The built-in mapping for the stock two-switch hardware.
    ///
    /// # Examples
    ///
    /// ```
    /// use footswitch::mapping::{Configuration, Message, SwitchEvent};
    ///
    /// let config = Configuration::defaults();
    /// assert_eq!(config.switch_count(), 2);
    ///
    /// let press = config.slot(0, SwitchEvent::Press).unwrap();
    /// assert_eq!(press.messages(), &[Message::control_change(0, 64, 127)]);
    /// ```
    pub fn defaults() -> Self {
        let mut switches: [SwitchMapping; MAX_SWITCHES] = Default::default();

        for (mapping, [press, release]) in switches.iter_mut().zip(DEFAULT_MAPPING) {
            mapping.press = EventSlot::single(press);
            mapping.release = EventSlot::single(release);
        }

        Self {
            switch_count: DEFAULT_SWITCH_COUNT as u8,
            switches,
        }
    }

    /// Number of addressable switches.
    pub fn switch_count(&self) -> usize {
        self.switch_count as usize
    }

    /// The addressable switch mappings, indexed by switch number.
    pub fn mappings(&self) -> &[SwitchMapping] {
        &self.switches[..self.switch_count()]
    }

    // ── Slot access ──────────────────────────────────────────────────

    /// The slot for one switch transition.
    ///
    /// Returns [`MappingError::InvalidSwitchIndex`] if `switch` is not below
    /// the configured switch count.
    pub fn slot(&self, switch: usize, event: SwitchEvent) -> Result<&EventSlot, MappingError> {
        self.mappings()
            .get(switch)
            .map(|mapping| mapping.slot(event))
            .ok_or(MappingError::InvalidSwitchIndex)
    }

    /// Replace the slot for one switch transition.
    ///
    /// The whole slot is overwritten, so a shorter list never leaves stale
    /// trailing messages behind.
    pub fn set_slot(
        &mut self,
        switch: usize,
        event: SwitchEvent,
        slot: EventSlot,
    ) -> Result<(), MappingError> {
        if switch >= self.switch_count() {
            return Err(MappingError::InvalidSwitchIndex);
        }

        *self.switches[switch].slot_mut(event) = slot;
        Ok(())
    }

    /// Iterate every addressable slot in storage order: switch-major,
    /// press before release.
    pub fn slots(&self) -> impl Iterator<Item = (usize, SwitchEvent, &EventSlot)> + '_ {
        self.mappings().iter().enumerate().flat_map(|(switch, mapping)| {
            SwitchEvent::ALL
                .into_iter()
                .map(move |event| (switch, event, mapping.slot(event)))
        })
    }

    /// Integrity checksum of the persisted image of this configuration.
    pub fn checksum(&self) -> u32 {
        crate::storage::image_checksum(self)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
