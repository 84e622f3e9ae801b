//! Encoder PWM capture task
//!
//! Timestamps every edge of the encoder output into [`ANGLE`].

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Instant;

use spinring_drivers::sensor::capture_pulses;

use crate::channels::ANGLE;

#[embassy_executor::task]
pub async fn angle_task(mut pin: Input<'static>) {
    info!("Angle capture task started");

    // Microsecond clock truncated to 32 bits; pulse widths use wrapping math
    let result = capture_pulses(&mut pin, &ANGLE, || Instant::now().as_micros() as u32).await;
    match result {
        Ok(never) => match never {},
        Err(never) => match never {},
    }
}
