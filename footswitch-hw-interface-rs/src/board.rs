//! Board implementations of the footswitch collaborator traits.

use embassy_rp::flash::{Blocking, Error as FlashError, Flash};
use embassy_rp::gpio::Input;
use embassy_rp::peripherals::FLASH;

use footswitch::hal::{ConfigFlash, SwitchInputs};

/// On-board QSPI flash size of the Pico 2.
pub const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// TRS jack inputs: tip on GP2, ring on GP3, both pulled up.
pub struct FootswitchPins {
    inputs: [Input<'static>; 2],
}

impl FootswitchPins {
    pub fn new(tip: Input<'static>, ring: Input<'static>) -> Self {
        Self { inputs: [tip, ring] }
    }
}

impl SwitchInputs for FootswitchPins {
    fn count(&self) -> usize {
        self.inputs.len()
    }

    fn is_high(&mut self, index: usize) -> bool {
        self.inputs[index].is_high()
    }
}

/// Blocking access to the configuration sector.
pub struct BoardFlash {
    flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>,
}

impl BoardFlash {
    pub fn new(flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>) -> Self {
        Self { flash }
    }
}

impl ConfigFlash for BoardFlash {
    type Error = FlashError;

    fn erase(&mut self, offset: u32, len: u32) -> Result<(), Self::Error> {
        self.flash.blocking_erase(offset, offset + len)
    }

    fn program(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.flash.blocking_write(offset, bytes)
    }

    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.flash.blocking_read(offset, buf)
    }
}
