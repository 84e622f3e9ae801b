//! Rotor angle sensing

/// Source of the rotor angle
pub trait AngleSource {
    /// Error type for sensor reads
    type Error;

    /// Current angle in radians, `[0, 2π)`
    fn angle(&mut self) -> Result<f32, Self::Error>;

    /// Raw sensor reading (pulse width or register value, offset applied
    /// where the sensor supports it)
    fn raw(&mut self) -> Result<u32, Self::Error>;

    /// Set the calibration offset in raw sensor units
    fn set_offset(&mut self, offset: u16);
}
