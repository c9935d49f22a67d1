//! footswitch-hw-interface
//!
//! USB-MIDI footswitch firmware for the Raspberry Pi Pico 2. Wires the
//! `footswitch` library to the board:
//!
//! 1. A TRS footswitch on GP2 (tip) / GP3 (ring) closes to ground.
//! 2. The controller task polls the `Controller` once per millisecond; it
//!    debounces the pins, routes transitions to MIDI packets and drives the
//!    status LED on GP25.
//! 3. The MIDI tx task forwards queued packets to the USB IN endpoint.
//! 4. The MIDI rx task forwards packets from the host into the controller,
//!    where SysEx configuration frames are reassembled and answered.
//!
//! The mapping table lives in the flash sector at 256 KiB.

#![no_std]
#![no_main]

mod board;
mod usb_port;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::flash::Flash;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{self, Driver};
use embassy_time::{Duration, Instant, Ticker};
use embassy_usb::class::midi::{MidiClass, Receiver, Sender};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use footswitch::controller::{Controller, ControllerConfig};

use board::{BoardFlash, FootswitchPins};
use usb_port::{MountHandler, UsbMidiPort, RX_PACKETS, TX_PACKETS};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => usb::InterruptHandler<USB>;
});

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static MOUNT_HANDLER: StaticCell<MountHandler> = StaticCell::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type UsbDriver = Driver<'static, USB>;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[embassy_executor::task]
async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) {
    device.run().await;
}

/// Forward host packets to the controller. Packets are dropped when the
/// controller falls behind.
#[embassy_executor::task]
async fn midi_rx_task(mut receiver: Receiver<'static, UsbDriver>) {
    let mut buf = [0u8; 64];

    loop {
        receiver.wait_connection().await;
        info!("MIDI OUT endpoint connected");

        loop {
            let n = match receiver.read_packet(&mut buf).await {
                Ok(n) => n,
                Err(EndpointError::Disabled) => break,
                Err(EndpointError::BufferOverflow) => {
                    warn!("MIDI OUT packet overflow");
                    continue;
                }
            };

            for chunk in buf[..n].chunks_exact(4) {
                let packet = [chunk[0], chunk[1], chunk[2], chunk[3]];
                if RX_PACKETS.try_send(packet).is_err() {
                    warn!("RX queue full; dropped {:02x}", packet);
                }
            }
        }

        info!("MIDI OUT endpoint disconnected");
    }
}

/// Drain queued packets to the host.
#[embassy_executor::task]
async fn midi_tx_task(mut sender: Sender<'static, UsbDriver>) {
    loop {
        sender.wait_connection().await;

        loop {
            let packet = TX_PACKETS.receive().await;
            if sender.write_packet(&packet).await.is_err() {
                warn!("MIDI IN endpoint disabled; dropped {:02x}", packet);
                break;
            }
            debug!("Sent {:02x}", packet);
        }
    }
}

/// The main cycle: one `Controller::poll()` per millisecond tick.
#[embassy_executor::task]
async fn controller_task(
    mut controller: Controller<BoardFlash>,
    mut pins: FootswitchPins,
    mut led: Output<'static>,
    cable: u8,
) {
    let mut port = UsbMidiPort::new(cable);
    let mut ticker = Ticker::every(Duration::from_millis(1));

    loop {
        let led_on = controller.poll(Instant::now().as_millis(), &mut pins, &mut port);
        led.set_level(Level::from(led_on));
        ticker.next().await;
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("footswitch-hw-interface starting");

    // ── Pin assignments ─────────────────────────────────────────────────────
    // TIP  → GP2   (p.PIN_2)   active-low, pull-up enabled
    // RING → GP3   (p.PIN_3)   active-low, pull-up enabled
    // LED  → GP25  (p.PIN_25)  on-board status LED
    // ───────────────────────────────────────────────────────────────────────

    let pins = FootswitchPins::new(
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
    );
    let led = Output::new(p.PIN_25, Level::Low);

    // Load the mapping before USB comes up so the first event already uses it.
    let flash = BoardFlash::new(Flash::new_blocking(p.FLASH));
    let settings = ControllerConfig::default();
    let controller = Controller::boot(flash, settings);
    info!(
        "Mapping ready: {} switches ({})",
        controller.configuration().switch_count(),
        controller.boot_source()
    );

    // ── USB device ──────────────────────────────────────────────────────────

    let driver = Driver::new(p.USB, Irqs);

    let mut config = Config::new(0xCAFE, 0x4011);
    config.manufacturer = Some("Maker");
    config.product = Some("USB MIDI Footswitch");
    config.serial_number = Some("123456");
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        MSOS_DESCRIPTOR.init([0; 256]),
        CONTROL_BUF.init([0; 64]),
    );
    builder.handler(MOUNT_HANDLER.init(MountHandler));

    // One IN jack, one OUT jack, 64-byte bulk endpoints.
    let class = MidiClass::new(&mut builder, 1, 1, 64);
    let device = builder.build();
    let (sender, receiver) = class.split();

    // ── Spawn tasks ─────────────────────────────────────────────────────────

    spawner.spawn(usb_task(device)).unwrap();
    spawner.spawn(midi_rx_task(receiver)).unwrap();
    spawner.spawn(midi_tx_task(sender)).unwrap();
    spawner
        .spawn(controller_task(controller, pins, led, settings.cable))
        .unwrap();

    info!("All tasks spawned");
}
