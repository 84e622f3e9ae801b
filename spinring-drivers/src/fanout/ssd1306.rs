//! SSD1306 panel array
//!
//! Every lane carries one 128x32 SSD1306 panel at the same bus address.
//! Commands go to all panels at once; frame data goes out in lock-step with
//! each panel getting its own slice.

use spinring_hal::BusLane;

use super::{FanoutEngine, LaneError, LaneReport, MAX_LANES};

/// SSD1306 command bytes
pub mod cmd {
    pub const MEMORY_MODE: u8 = 0x20;
    pub const COLUMN_ADDR: u8 = 0x21;
    pub const PAGE_ADDR: u8 = 0x22;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const CHARGE_PUMP: u8 = 0x8D;
    pub const SEG_REMAP: u8 = 0xA0;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const INVERT_DISPLAY: u8 = 0xA7;
    pub const SET_MULTIPLEX: u8 = 0xA8;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const COM_SCAN_INC: u8 = 0xC0;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;

    /// Horizontal addressing for [`MEMORY_MODE`]
    pub const HORIZONTAL_ADDRESSING: u8 = 0x00;
}

/// Panel supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Vcc {
    /// Panel supplied externally
    External,
    /// Internal charge pump
    #[default]
    Internal,
}

impl Vcc {
    /// Pre-charge period for this supply
    pub const fn precharge(self) -> u8 {
        match self {
            Vcc::External => 0x22,
            Vcc::Internal => 0xF1,
        }
    }
}

/// Panel array configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelArrayConfig {
    pub contrast: u8,
    pub vcc: Vcc,
    /// Panel width in pixels
    pub columns: u8,
    /// Panel height in pixels, a multiple of 8
    pub rows: u8,
}

impl Default for PanelArrayConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelArrayConfig {
    /// 128x32 panel on its charge pump
    pub const fn new() -> Self {
        Self {
            contrast: 0x8F,
            vcc: Vcc::Internal,
            columns: 128,
            rows: 32,
        }
    }

    /// Bytes of display RAM covering the panel
    pub const fn panel_bytes(&self) -> usize {
        self.columns as usize * self.rows as usize / 8
    }

    /// Configuration sequence sent by [`PanelArray::init`]
    pub const fn init_sequence(&self) -> [u8; 26] {
        [
            cmd::DISPLAY_OFF,
            cmd::SET_DISPLAY_CLOCK_DIV,
            0x80,
            cmd::SET_MULTIPLEX,
            self.rows - 1,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::CHARGE_PUMP,
            0x14,
            cmd::SEG_REMAP | 0x01,
            cmd::COM_SCAN_DEC,
            cmd::MEMORY_MODE,
            cmd::HORIZONTAL_ADDRESSING,
            cmd::SET_COM_PINS,
            0x02,
            cmd::SET_CONTRAST,
            self.contrast,
            cmd::SET_PRECHARGE,
            self.vcc.precharge(),
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::DISPLAY_ALL_ON_RESUME,
            cmd::NORMAL_DISPLAY,
            cmd::DEACTIVATE_SCROLL,
            cmd::DISPLAY_ON,
        ]
    }

    /// Address window covering the whole panel
    pub const fn window(&self) -> [u8; 6] {
        [
            cmd::PAGE_ADDR,
            0x00,
            0xFF,
            cmd::COLUMN_ADDR,
            0x00,
            self.columns - 1,
        ]
    }
}

/// SSD1306 panels on every lane of a fan-out engine
pub struct PanelArray<L, const M: usize = MAX_LANES> {
    engine: FanoutEngine<L, M>,
    config: PanelArrayConfig,
    initialized: bool,
}

impl<L: BusLane, const M: usize> PanelArray<L, M> {
    pub fn new(engine: FanoutEngine<L, M>, config: PanelArrayConfig) -> Self {
        Self {
            engine,
            config,
            initialized: false,
        }
    }

    pub fn config(&self) -> &PanelArrayConfig {
        &self.config
    }

    pub fn engine(&self) -> &FanoutEngine<L, M> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FanoutEngine<L, M> {
        &mut self.engine
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Select the lane mapping; `true` reverses the lane order
    pub fn set_direction(&mut self, reverse: bool) {
        self.engine.set_direction(reverse);
    }

    /// Configure every panel and blank it
    pub fn init(&mut self) -> LaneReport {
        let mut report = LaneReport::default();
        for byte in self.config.init_sequence() {
            report.merge(self.engine.send_all(&[byte], true));
        }
        report.merge(self.engine.send_all(&self.config.window(), true));
        report.merge(self.engine.fill_all(0x00, self.config.panel_bytes()));

        self.initialized = true;
        #[cfg(feature = "defmt")]
        defmt::info!(
            "panels: {} lanes initialized, failed {=u8:b}",
            self.engine.lane_count(),
            report.failed_lanes()
        );
        report
    }

    /// Send raw command bytes to every panel
    pub fn command(&mut self, bytes: &[u8]) -> LaneReport {
        self.engine.send_all(bytes, true)
    }

    pub fn display_on(&mut self) -> LaneReport {
        self.command(&[cmd::DISPLAY_ON])
    }

    pub fn display_off(&mut self) -> LaneReport {
        self.command(&[cmd::DISPLAY_OFF])
    }

    pub fn set_contrast(&mut self, contrast: u8) -> LaneReport {
        self.config.contrast = contrast;
        self.command(&[cmd::SET_CONTRAST, contrast])
    }

    pub fn set_inverted(&mut self, inverted: bool) -> LaneReport {
        let byte = if inverted {
            cmd::INVERT_DISPLAY
        } else {
            cmd::NORMAL_DISPLAY
        };
        self.command(&[byte])
    }

    /// Mirror columns; `true` undoes the remap set by [`init`](Self::init)
    pub fn flip_horizontal(&mut self, flip: bool) -> LaneReport {
        self.command(&[cmd::SEG_REMAP | u8::from(!flip)])
    }

    /// Mirror rows; `true` undoes the scan direction set by [`init`](Self::init)
    pub fn flip_vertical(&mut self, flip: bool) -> LaneReport {
        let byte = if flip {
            cmd::COM_SCAN_INC
        } else {
            cmd::COM_SCAN_DEC
        };
        self.command(&[byte])
    }

    /// Display RAM row shown at the top, `0..64`
    pub fn set_start_line(&mut self, line: u8) -> LaneReport {
        self.command(&[cmd::SET_START_LINE | (line & 0x3F)])
    }

    /// Write one panel's display RAM
    pub fn write_frame(&mut self, slot: usize, data: &[u8]) -> Result<(), LaneError> {
        let window = self.config.window();
        self.engine.send(slot, &window, true)?;
        self.engine.send(slot, data, false)
    }

    /// Write all panels from one frame, panel `i` taking the `i`th slice
    pub fn write_frame_multi(&mut self, frame: &[u8]) -> LaneReport {
        let mut report = self.engine.send_all(&self.config.window(), true);
        report.merge(
            self.engine
                .write_frame_multi(frame, self.config.panel_bytes()),
        );
        report
    }
}
