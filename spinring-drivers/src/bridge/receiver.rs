//! Bridge receiver

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use spinring_hal::BusLane;
use spinring_protocol::status::{BUSY, ERROR, PING_ACK, VALID};
use spinring_protocol::{FrameParser, Opcode, Received, Status};

use crate::fanout::{LaneReport, PanelArray, MAX_LANES};

/// Link receiver of one bridge board with an `N` byte frame buffer
pub struct BridgeReceiver<L, LED, const N: usize, const M: usize = MAX_LANES> {
    parser: FrameParser<N>,
    panels: PanelArray<L, M>,
    led: LED,
    error: bool,
    frame_pending: bool,
    reset_requested: bool,
    frames: u32,
}

impl<L, LED, const N: usize, const M: usize> BridgeReceiver<L, LED, N, M>
where
    L: BusLane,
    LED: OutputPin<Error = Infallible>,
{
    pub fn new(panels: PanelArray<L, M>, led: LED) -> Self {
        Self {
            parser: FrameParser::new(),
            panels,
            led,
            error: false,
            frame_pending: false,
            reset_requested: false,
            frames: 0,
        }
    }

    pub fn panels(&self) -> &PanelArray<L, M> {
        &self.panels
    }

    pub fn panels_mut(&mut self) -> &mut PanelArray<L, M> {
        &mut self.panels
    }

    /// Frames written to the panels so far
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Current status byte
    pub fn status(&self) -> Status {
        let busy = self.frame_pending || self.parser.in_transfer();
        Status(VALID).with(BUSY, busy).with(ERROR, self.error)
    }

    /// True once if the controller asked for a reset since the last call
    pub fn take_reset_request(&mut self) -> bool {
        core::mem::take(&mut self.reset_requested)
    }

    /// Process one received byte and return the byte to clock out next
    pub fn on_byte(&mut self, byte: u8) -> u8 {
        match self.parser.feed(byte) {
            Ok(Some(Received::Command(command))) => {
                if self.on_command(command.opcode) {
                    return VALID | PING_ACK;
                }
            }
            Ok(Some(Received::Data(_len))) => {
                self.frame_pending = true;
            }
            Ok(None) => {}
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("bridge: dropped frame: {}", _err);
                self.error = true;
            }
        }
        self.status().0
    }

    /// Returns true when the command wants a ping acknowledgement
    fn on_command(&mut self, opcode: Opcode) -> bool {
        match opcode {
            Opcode::GetStatus | Opcode::SetData => {}
            Opcode::StartFrame => {
                #[cfg(feature = "defmt")]
                defmt::trace!("bridge: frame start");
            }
            Opcode::Ping => return true,
            Opcode::LedOn => {
                self.led.set_high().unwrap_or_else(|e| match e {});
            }
            Opcode::LedOff => {
                self.led.set_low().unwrap_or_else(|e| match e {});
            }
            Opcode::DirectionA => self.panels.set_direction(true),
            Opcode::DirectionB => self.panels.set_direction(false),
            Opcode::HardReset => self.reset_requested = true,
        }
        false
    }

    /// Write a verified frame to the panels, if one is waiting
    ///
    /// A pending frame whose buffer was overwritten by a later, rejected
    /// transfer is dropped without touching the panels.
    pub fn service(&mut self) -> Option<LaneReport> {
        if !self.frame_pending {
            return None;
        }
        if self.parser.payload().is_empty() {
            self.frame_pending = false;
            return None;
        }
        let report = self.panels.write_frame_multi(self.parser.payload());
        self.frame_pending = false;
        self.error = !report.is_ok();
        self.frames = self.frames.wrapping_add(1);
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::{FanoutConfig, FanoutEngine, PanelArrayConfig};
    use crate::link::{LinkConfig, LinkError, LinkMaster};
    use spinring_hal::LinkPort;
    use spinring_protocol::{crc16, Crc16, CommandFrame};

    #[derive(Default)]
    struct Lane {
        data: Vec<u8>,
        words: usize,
        fail: bool,
        error: bool,
    }

    impl BusLane for Lane {
        fn start(&mut self) {
            self.words = 0;
        }
        fn stop(&mut self) {}
        fn repeated_start(&mut self) {}
        fn set_rx_enabled(&mut self, _enabled: bool) {}
        fn push(&mut self, word: u16) {
            self.words += 1;
            if self.fail {
                self.error = true;
            }
            // Skip the address and control words
            if self.words > 2 {
                self.data.push((word >> 1) as u8);
            }
        }
        fn is_tx_full(&self) -> bool {
            false
        }
        fn has_error(&self) -> bool {
            self.error
        }
        fn resume_after_error(&mut self) {
            self.error = false;
        }
        fn is_idle(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct Led {
        on: bool,
    }

    impl embedded_hal::digital::ErrorType for Led {
        type Error = Infallible;
    }

    impl OutputPin for Led {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.on = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.on = true;
            Ok(())
        }
    }

    const PANEL: PanelArrayConfig = PanelArrayConfig {
        contrast: 0x8F,
        vcc: crate::fanout::Vcc::Internal,
        columns: 16,
        rows: 8,
    };

    type Bridge = BridgeReceiver<Lane, Led, 32, 2>;

    fn bridge() -> Bridge {
        let engine = FanoutEngine::new([Lane::default(), Lane::default()], FanoutConfig::new(2));
        BridgeReceiver::new(PanelArray::new(engine, PANEL), Led::default())
    }

    fn feed(bridge: &mut Bridge, bytes: &[u8]) -> u8 {
        let mut last = bridge.status().0;
        for byte in bytes {
            last = bridge.on_byte(*byte);
        }
        last
    }

    fn data_frame(payload: &[u8], corrupt: bool) -> Vec<u8> {
        let header = CommandFrame::set_data(payload.len() as u16).header();
        let mut crc = Crc16::seeded(crc16(&header));
        crc.extend(payload);
        let mut crc = crc.value();
        if corrupt {
            crc ^= 1;
        }

        let mut bytes = header.to_vec();
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&[0; 32]);
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes
    }

    fn lane_data(bridge: &Bridge, lane: usize) -> &[u8] {
        &bridge.panels().engine().lanes()[lane].data
    }

    #[test]
    fn test_idle_status() {
        let mut bridge = bridge();
        assert_eq!(bridge.status(), Status::IDLE);
        assert_eq!(bridge.on_byte(0x00), 0x80);
    }

    #[test]
    fn test_ping_ack_once() {
        let mut bridge = bridge();
        let ack = feed(&mut bridge, &CommandFrame::simple(Opcode::Ping).encode());
        assert_eq!(ack, 0x84);
        assert_eq!(bridge.on_byte(0x00), 0x80);
    }

    #[test]
    fn test_led_and_direction() {
        let mut bridge = bridge();
        feed(&mut bridge, &CommandFrame::simple(Opcode::LedOn).encode());
        assert!(bridge.led.on);
        feed(&mut bridge, &CommandFrame::simple(Opcode::LedOff).encode());
        assert!(!bridge.led.on);

        feed(&mut bridge, &CommandFrame::simple(Opcode::DirectionA).encode());
        assert_eq!(
            bridge.panels().engine().lane_map(),
            crate::fanout::LaneMap::Reverse
        );
        feed(&mut bridge, &CommandFrame::simple(Opcode::DirectionB).encode());
        assert_eq!(
            bridge.panels().engine().lane_map(),
            crate::fanout::LaneMap::Forward
        );
    }

    #[test]
    fn test_reset_request() {
        let mut bridge = bridge();
        assert!(!bridge.take_reset_request());
        feed(&mut bridge, &CommandFrame::simple(Opcode::HardReset).encode());
        assert!(bridge.take_reset_request());
        assert!(!bridge.take_reset_request());
    }

    #[test]
    fn test_frame_busy_until_serviced() {
        let mut bridge = bridge();
        let payload: Vec<u8> = (0..32).collect();
        let frame = data_frame(&payload, false);

        // Busy from the header on
        let status = feed(&mut bridge, &frame[..10]);
        assert!(Status(status).is_busy());

        let status = feed(&mut bridge, &frame[10..]);
        assert!(Status(status).is_busy());
        assert!(lane_data(&bridge, 0).is_empty());

        let report = bridge.service().unwrap();
        assert!(report.is_ok());
        assert_eq!(bridge.status(), Status::IDLE);
        assert_eq!(bridge.frames(), 1);

        // Window command bytes are followed by the panel slice
        let lane0 = lane_data(&bridge, 0);
        assert_eq!(&lane0[lane0.len() - 16..], &payload[..16]);
        let lane1 = lane_data(&bridge, 1);
        assert_eq!(&lane1[lane1.len() - 16..], &payload[16..]);

        assert!(bridge.service().is_none());
    }

    #[test]
    fn test_corrupt_frame_dropped() {
        let mut bridge = bridge();
        let payload = [0xFFu8; 32];
        let status = feed(&mut bridge, &data_frame(&payload, true));
        assert!(Status(status).is_error());
        assert!(!Status(status).is_busy());
        assert!(bridge.service().is_none());
        assert!(lane_data(&bridge, 0).is_empty());

        feed(&mut bridge, &data_frame(&payload, false));
        assert!(bridge.service().unwrap().is_ok());
        assert!(!bridge.status().is_error());
    }

    #[test]
    fn test_pending_frame_lost_to_corrupt_transfer() {
        let mut bridge = bridge();
        feed(&mut bridge, &data_frame(&[0x55; 32], false));
        assert!(bridge.status().is_busy());

        // Second transfer reuses the buffer and fails its CRC
        let status = feed(&mut bridge, &data_frame(&[0xAA; 32], true));
        assert!(Status(status).is_error());

        assert!(bridge.service().is_none());
        assert_eq!(bridge.frames(), 0);
        assert!(lane_data(&bridge, 0).is_empty());
        assert!(lane_data(&bridge, 1).is_empty());
        assert!(!bridge.status().is_busy());
    }

    #[test]
    fn test_lane_error_reported() {
        let mut bridge = bridge();
        bridge.panels_mut().engine_mut().lane_mut(1).unwrap().fail = true;
        feed(&mut bridge, &data_frame(&[1; 32], false));
        let report = bridge.service().unwrap();
        assert_eq!(report.failed_lanes(), 0b10);
        assert!(bridge.status().is_error());
        assert!(bridge.status().is_ready());
    }

    /// Link port wired straight into a bridge
    struct Loopback {
        bridge: Bridge,
        next: u8,
    }

    impl Loopback {
        fn new() -> Self {
            let bridge = bridge();
            let next = bridge.status().0;
            Self { bridge, next }
        }
    }

    impl LinkPort for Loopback {
        type Error = Infallible;

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
            for (out, byte) in read.iter_mut().zip(write) {
                *out = self.next;
                self.next = self.bridge.on_byte(*byte);
            }
            self.bridge.service();
            Ok(())
        }

        fn write(&mut self, data: &[u8]) -> Result<(), Infallible> {
            for byte in data {
                self.next = self.bridge.on_byte(*byte);
            }
            self.bridge.service();
            Ok(())
        }
    }

    #[test]
    fn test_master_to_bridges() {
        let mut link = LinkMaster::with_config(
            [Loopback::new(), Loopback::new()],
            LinkConfig::new().with_ready_retries(8),
        );
        link.ping(0).unwrap();
        link.ping(1).unwrap();
        link.set_id_direction(1, true).unwrap();

        let frame: Vec<u8> = (0..64).collect();
        link.send_frame_parallel(&frame).unwrap();
        link.send_frame_parallel(&frame).unwrap();

        let [a, b] = link.release();
        assert_eq!(a.bridge.frames(), 2);
        assert_eq!(b.bridge.frames(), 2);

        let tail = |bridge: &Bridge, lane: usize| {
            let data = lane_data(bridge, lane);
            data[data.len() - 16..].to_vec()
        };
        assert_eq!(tail(&a.bridge, 0), &frame[0..16]);
        assert_eq!(tail(&a.bridge, 1), &frame[16..32]);
        // Reversed bridge
        assert_eq!(tail(&b.bridge, 0), &frame[48..64]);
        assert_eq!(tail(&b.bridge, 1), &frame[32..48]);
    }

    #[test]
    fn test_master_sees_busy_bridge() {
        let mut port = Loopback::new();
        // Leave a verified frame unwritten
        let payload = [0u8; 32];
        for byte in data_frame(&payload, false) {
            port.next = port.bridge.on_byte(byte);
        }
        assert!(port.bridge.status().is_busy());

        let mut link = LinkMaster::with_config([port], LinkConfig::new().with_ready_retries(3));
        // Status polling services the frame, so the second poll sees ready
        assert!(link.wait_ready(0).is_ok());

        let mut link = LinkMaster::with_config(
            [Loopback::new()],
            LinkConfig::new().with_ready_retries(0),
        );
        assert_eq!(link.wait_ready(0), Err(LinkError::ReadinessTimeout(0)));
    }
}
