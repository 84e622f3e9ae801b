//! Render task
//!
//! Reads the rotor angle, draws the next frame into the pipeline's write
//! slot and commits it for the link task.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Text};

use spinring_core::angle::PulseWindow;
use spinring_core::config::{RingCalibration, RingGeometry};
use spinring_core::draw::{RingDrawer, Snowfall, Style};
use spinring_core::ring::{Color, RingSurface};
use spinring_core::traits::{AngleSource, XorShift32};
use spinring_drivers::sensor::PwmAngle;

use crate::channels::{ANGLE, CALIBRATION_CHANGED, FRAME_READY, PIPELINE, SLOT_FREE};

/// Frame period; the link is the real limit
const FRAME_PERIOD: Duration = Duration::from_millis(20);

/// Grains in the snow layer
const GRAINS: usize = 96;

#[embassy_executor::task]
pub async fn render_task(geometry: RingGeometry, calibration: RingCalibration) {
    info!("Render task started");

    let mut sensor = PwmAngle::new(&ANGLE, PulseWindow::AS5048);
    sensor.set_offset(calibration.angle_offset);

    let mut rng = XorShift32::new(Instant::now().as_ticks() as u32);
    let mut snow = Snowfall::<GRAINS>::new(
        geometry.virtual_width() as i32,
        i32::from(geometry.panel_height),
    );

    let mut ticker = Ticker::every(FRAME_PERIOD);
    loop {
        if let Some(calibration) = CALIBRATION_CHANGED.try_take() {
            debug!("Angle offset now {}", calibration.angle_offset);
            sensor.set_offset(calibration.angle_offset);
        }

        let angle = match sensor.angle() {
            Ok(angle) => angle,
            Err(never) => match never {},
        };
        snow.step(&mut rng);

        let committed = {
            let mut pipeline = PIPELINE.lock().await;
            match pipeline.write_slot() {
                Ok(frame) => match RingSurface::new(geometry, frame) {
                    Ok(surface) => {
                        let mut drawer = RingDrawer::new(surface);
                        let xpos = drawer.angle_to_xpos(angle);
                        draw_scene(&mut drawer, &snow, xpos);
                        pipeline.advance_write().is_ok()
                    }
                    Err(e) => {
                        error!("Geometry does not fit the frame buffer: {:?}", e);
                        return;
                    }
                },
                Err(_) => false,
            }
        };

        if committed {
            FRAME_READY.signal(());
            ticker.next().await;
        } else {
            // Both slots are waiting on the link
            SLOT_FREE.wait().await;
        }
    }
}

/// Snow over a fixed banner, both held still against the rotation
fn draw_scene<const N: usize>(drawer: &mut RingDrawer<'_>, snow: &Snowfall<N>, xpos: i32) {
    drawer.clear_frame(Color::Clear);

    let center_y = drawer.height() / 2;
    drawer.hline(-xpos, drawer.width() - 1 - xpos, center_y + 12);
    drawer.hline(-xpos, drawer.width() - 1 - xpos, center_y - 12);
    drawer.circle(drawer.width() / 2 - xpos, center_y, 20, Style::Outline);

    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let banner = Text::with_alignment(
        "SPINRING",
        Point::new(-xpos, center_y + 3),
        style,
        Alignment::Center,
    );
    // Ring surfaces never fail to draw
    let _ = banner.draw(drawer);

    snow.draw(drawer, xpos);
}
