//! Spinring controller firmware
//!
//! Renders the ring image from the rotor angle and streams every frame to
//! the two bridge groups over SPI.
//!
//! Pin assignments (RP2040):
//!
//! | Function          | Pins                               |
//! |-------------------|------------------------------------|
//! | Bridge channel 0  | SPI0: SCK 18, MOSI 19, MISO 16, CS 17 |
//! | Bridge channel 1  | SPI1: SCK 10, MOSI 11, MISO 12, CS 13 |
//! | Encoder PWM       | GPIO 2                             |
//! | Zero button       | GPIO 3 (active low)                |
//! | Motor H-bridge    | GPIO 6 / GPIO 7 (PWM slice 3)      |
//! | Status LED        | GPIO 25                            |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Duration, Ticker};
use {defmt_rtt as _, panic_probe as _};

use spinring_core::config::RingGeometry;
use spinring_drivers::link::{LinkConfig, LinkMaster, SpiLink};
use spinring_drivers::motor::HBridge;
use spinring_hal::link::{Phase, Polarity, SpiConfig};

use crate::storage::CalibrationStore;
use crate::tasks::link::Channel;

mod channels;
mod storage;
mod tasks;

/// Motor PWM top for a 20 kHz carrier at 125 MHz
const MOTOR_PWM_TOP: u16 = 6249;

/// Status LED blink period
const HEARTBEAT: Duration = Duration::from_millis(500);

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Spinring firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut store = CalibrationStore::new(p.FLASH, p.DMA_CH0);
    let calibration = store.load_or_default().await;

    // The rig scans ring x against the panel column order
    let geometry = RingGeometry::REFERENCE.with_mirrored(true);
    info!(
        "Ring: {} panels of {}x{}, gap {}, {} bytes per frame",
        geometry.panels,
        geometry.panel_width,
        geometry.panel_height,
        geometry.gap,
        geometry.frame_bytes()
    );

    // Bridge link, one SPI block per channel, DMA so both payloads overlap
    let spi0 = Spi::new(
        p.SPI0,
        p.PIN_18,
        p.PIN_19,
        p.PIN_16,
        p.DMA_CH1,
        p.DMA_CH2,
        link_spi_config(&SpiConfig::LINK),
    );
    let spi1 = Spi::new(
        p.SPI1,
        p.PIN_10,
        p.PIN_11,
        p.PIN_12,
        p.DMA_CH3,
        p.DMA_CH4,
        link_spi_config(&SpiConfig::LINK),
    );
    let cs0 = Output::new(p.PIN_17, Level::High);
    let cs1 = Output::new(p.PIN_13, Level::High);
    let mut link = LinkMaster::with_config(
        [
            Channel::Spi0(SpiLink::new(spi0, cs0)),
            Channel::Spi1(SpiLink::new(spi1, cs1)),
        ],
        LinkConfig::new(),
    );
    info!("Link initialized at {} Hz", SpiConfig::LINK.frequency);

    for channel in 0..link.channels() {
        if let Err(e) = link.set_id_direction(channel, calibration.reverse_lanes) {
            warn!("Bridge {} direction not set: {:?}", channel, Debug2Format(&e));
        }
    }

    // Encoder and zero button
    let encoder = Input::new(p.PIN_2, Pull::None);
    let button = Input::new(p.PIN_3, Pull::Up);

    // Rotor motor
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = MOTOR_PWM_TOP;
    let pwm = Pwm::new_output_ab(p.PWM_SLICE3, p.PIN_6, p.PIN_7, pwm_config);
    let (in1, in2) = pwm.split();

    let mut led = Output::new(p.PIN_25, Level::Low);

    spawner.spawn(tasks::angle_task(encoder)).unwrap();
    spawner
        .spawn(tasks::render_task(geometry, calibration))
        .unwrap();
    spawner.spawn(tasks::link_task(link)).unwrap();
    spawner
        .spawn(tasks::calibration_task(button, store, calibration))
        .unwrap();
    match (in1, in2) {
        (Some(in1), Some(in2)) => {
            spawner.spawn(tasks::spin_task(HBridge::new(in1, in2))).unwrap();
        }
        _ => warn!("Motor PWM outputs unavailable, rotor not driven"),
    }

    info!("All tasks spawned, firmware running");

    let mut ticker = Ticker::every(HEARTBEAT);
    loop {
        led.toggle();
        ticker.next().await;
    }
}

/// Embassy SPI settings for a link channel
fn link_spi_config(link: &SpiConfig) -> spi::Config {
    let mut config = spi::Config::default();
    config.frequency = link.frequency;
    config.polarity = match link.polarity() {
        Polarity::IdleLow => spi::Polarity::IdleLow,
        Polarity::IdleHigh => spi::Polarity::IdleHigh,
    };
    config.phase = match link.phase() {
        Phase::CaptureOnFirstTransition => spi::Phase::CaptureOnFirstTransition,
        Phase::CaptureOnSecondTransition => spi::Phase::CaptureOnSecondTransition,
    };
    config
}
