//! Encoder PWM capture
//!
//! The encoder outputs one pulse per PWM period whose high time encodes
//! the angle. Every edge is timestamped; on a falling edge the time since
//! the previous edge is the pulse width.

use core::convert::Infallible;
use core::f32::consts::TAU;

use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;
use spinring_core::angle::{AngleCell, PulseWindow, REGISTER_SCALE};
use spinring_core::traits::AngleSource;

/// Edge timestamp bookkeeping for one PWM input
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTimer {
    last_edge_us: u32,
}

impl EdgeTimer {
    pub const fn new(now_us: u32) -> Self {
        Self {
            last_edge_us: now_us,
        }
    }

    /// Record an edge seen at `now_us`; `low` is the pin level after it
    pub fn on_edge(&mut self, low: bool, now_us: u32, cell: &AngleCell) {
        if low {
            cell.store(now_us.wrapping_sub(self.last_edge_us), self.last_edge_us);
        }
        self.last_edge_us = now_us;
    }
}

/// Timestamp every edge of `pin` into `cell` until the pin fails
///
/// `now_us` is a free-running microsecond clock.
pub async fn capture_pulses<P, F>(
    pin: &mut P,
    cell: &AngleCell,
    mut now_us: F,
) -> Result<Infallible, P::Error>
where
    P: Wait + InputPin,
    F: FnMut() -> u32,
{
    let mut timer = EdgeTimer::new(now_us());
    loop {
        pin.wait_for_any_edge().await?;
        let now = now_us();
        let low = pin.is_low()?;
        timer.on_edge(low, now, cell);
    }
}

/// Angle from the last captured pulse width
pub struct PwmAngle<'a> {
    cell: &'a AngleCell,
    window: PulseWindow,
    offset: u16,
}

impl<'a> PwmAngle<'a> {
    pub fn new(cell: &'a AngleCell, window: PulseWindow) -> Self {
        Self {
            cell,
            window,
            offset: 0,
        }
    }

    pub fn window(&self) -> PulseWindow {
        self.window
    }
}

impl AngleSource for PwmAngle<'_> {
    type Error = Infallible;

    /// The offset is in angle register units and is added after the pulse
    /// is converted
    fn angle(&mut self) -> Result<f32, Infallible> {
        let shift = f32::from(self.offset) / REGISTER_SCALE as f32 * TAU;
        let mut angle = self.window.to_angle(self.cell.width_us()) + shift;
        while angle >= TAU {
            angle -= TAU;
        }
        Ok(angle)
    }

    /// Pulse width in microseconds, without the offset
    fn raw(&mut self) -> Result<u32, Infallible> {
        Ok(self.cell.width_us())
    }

    fn set_offset(&mut self, offset: u16) {
        self.offset = offset % REGISTER_SCALE as u16;
    }
}
