//! Calibration task
//!
//! A press of the zero button makes the current rotor position ring x = 0.
//! The new offset is saved to flash and handed to the render task.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Timer};

use spinring_core::angle::{zero_offset, PulseWindow};
use spinring_core::config::RingCalibration;

use crate::channels::{ANGLE, CALIBRATION_CHANGED};
use crate::storage::CalibrationStore;

const DEBOUNCE: Duration = Duration::from_millis(50);

#[embassy_executor::task]
pub async fn calibration_task(
    mut button: Input<'static>,
    mut store: CalibrationStore<'static>,
    mut calibration: RingCalibration,
) {
    info!("Calibration task started");

    loop {
        // Button is active low
        button.wait_for_falling_edge().await;
        Timer::after(DEBOUNCE).await;
        if button.is_high() {
            continue;
        }

        let angle = PulseWindow::AS5048.to_angle(ANGLE.width_us());
        calibration.angle_offset = zero_offset(angle);
        info!("Zeroing angle, offset {}", calibration.angle_offset);
        CALIBRATION_CHANGED.signal(calibration);

        match store.save(&calibration).await {
            Ok(()) => info!("Calibration saved"),
            Err(e) => error!("Failed to save calibration: {:?}", e),
        }

        button.wait_for_high().await;
    }
}
