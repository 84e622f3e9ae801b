//! Rotor spin task
//!
//! Runs the rotor at a fixed power. Speed regulation is left to the
//! mechanics; the display only needs the angle.

use defmt::*;
use embassy_rp::pwm::PwmOutput;
use embassy_time::{Duration, Timer};

use spinring_core::traits::{Decay, SpinDrive};
use spinring_drivers::motor::HBridge;

/// Power after the ramp
const RUN_POWER: i16 = 160;

/// Ramp step interval
const RAMP_STEP: Duration = Duration::from_millis(20);

#[embassy_executor::task]
pub async fn spin_task(mut drive: HBridge<PwmOutput<'static>, PwmOutput<'static>>) {
    info!("Spin task started");
    drive.set_decay(Decay::Slow);

    // Soft start to keep the inrush down
    for power in (0..=RUN_POWER).step_by(4) {
        if let Err(e) = drive.set_power(power) {
            error!("Spin drive failed: {:?}", Debug2Format(&e));
            return;
        }
        Timer::after(RAMP_STEP).await;
    }
    info!("Rotor at power {}", RUN_POWER);
}
