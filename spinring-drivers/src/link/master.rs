//! Link master
//!
//! Sequencing of one frame transfer, per channel:
//!
//! ```text
//! GET_STATUS ... (until ready)        all channels, in order
//! START_FRAME                         all channels
//! SET_DATA header (7 bytes)           all channels
//! payload block                       all channels, streamed concurrently
//! zero pad                            all channels
//! payload CRC (LE)                    all channels
//! ```
//!
//! A channel that never becomes ready aborts the transfer before anything
//! but status probes has been sent on any channel.

use spinring_hal::LinkPort;
use spinring_protocol::{crc16, crc16_update, CommandFrame, Opcode, Status};

use super::{LinkConfig, LinkError};

/// Zero bytes written per call while padding
const PAD_CHUNK: [u8; 32] = [0; 32];

/// Controller side of `N` link channels
pub struct LinkMaster<P, const N: usize = 2> {
    ports: [P; N],
    config: LinkConfig,
}

impl<P: LinkPort, const N: usize> LinkMaster<P, N> {
    /// Create a master with the default link configuration
    pub fn new(ports: [P; N]) -> Self {
        Self::with_config(ports, LinkConfig::new())
    }

    pub fn with_config(ports: [P; N], config: LinkConfig) -> Self {
        Self { ports, config }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Number of link channels
    pub const fn channels(&self) -> usize {
        N
    }

    /// Direct access to one port
    pub fn port_mut(&mut self, channel: usize) -> Option<&mut P> {
        self.ports.get_mut(channel)
    }

    /// Give the ports back
    pub fn release(self) -> [P; N] {
        self.ports
    }

    fn port(&mut self, channel: usize) -> Result<&mut P, LinkError<P::Error>> {
        self.ports
            .get_mut(channel)
            .ok_or(LinkError::InvalidChannel(channel))
    }

    /// Write one command frame
    pub fn send_command(
        &mut self,
        channel: usize,
        command: CommandFrame,
    ) -> Result<(), LinkError<P::Error>> {
        self.port(channel)?
            .write(&command.encode())
            .map_err(LinkError::Port)
    }

    /// Clock out idle bytes until the bridge answers with a valid status
    ///
    /// Gives up after `response_tries` bytes and reports [`Status::NONE`].
    pub fn receive_response(&mut self, channel: usize) -> Result<Status, LinkError<P::Error>> {
        let tries = self.config.response_tries;
        let port = self.port(channel)?;

        for _ in 0..tries {
            let status = Status(port.exchange(0x00).map_err(LinkError::Port)?);
            if status.is_valid() {
                return Ok(status);
            }
        }
        Ok(Status::NONE)
    }

    /// Ask a channel for its status byte
    pub fn query_status(&mut self, channel: usize) -> Result<Status, LinkError<P::Error>> {
        self.send_command(channel, CommandFrame::simple(Opcode::GetStatus))?;
        self.receive_response(channel)
    }

    /// Poll a channel until it reports ready
    ///
    /// A missing response counts as busy.
    pub fn wait_ready(&mut self, channel: usize) -> Result<Status, LinkError<P::Error>> {
        for _ in 0..self.config.ready_retries {
            let status = self.query_status(channel)?;
            if status.is_ready() {
                if status.is_error() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("link {}: bridge reports error {}", channel, status);
                }
                return Ok(status);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("link {}: not ready", channel);
        Err(LinkError::ReadinessTimeout(channel))
    }

    /// Check that a channel answers pings
    pub fn ping(&mut self, channel: usize) -> Result<(), LinkError<P::Error>> {
        self.send_command(channel, CommandFrame::simple(Opcode::Ping))?;
        let status = self.receive_response(channel)?;
        if status.is_ping_ack() {
            Ok(())
        } else {
            Err(LinkError::PingFailed { channel, status })
        }
    }

    /// Switch the bridge status LED
    pub fn set_led(&mut self, channel: usize, on: bool) -> Result<(), LinkError<P::Error>> {
        let opcode = if on { Opcode::LedOn } else { Opcode::LedOff };
        self.send_command(channel, CommandFrame::simple(opcode))
    }

    /// Select the bridge's lane mapping
    ///
    /// `true` sends direction A, which reverses the lane order.
    pub fn set_id_direction(
        &mut self,
        channel: usize,
        reverse: bool,
    ) -> Result<(), LinkError<P::Error>> {
        let opcode = if reverse {
            Opcode::DirectionA
        } else {
            Opcode::DirectionB
        };
        self.send_command(channel, CommandFrame::simple(opcode))
    }

    /// Ask the bridge to reboot
    pub fn hard_reset(&mut self, channel: usize) -> Result<(), LinkError<P::Error>> {
        self.send_command(channel, CommandFrame::simple(Opcode::HardReset))
    }

    /// Split `frame` evenly across all channels and stream it
    pub fn send_frame_parallel(&mut self, frame: &[u8]) -> Result<(), LinkError<P::Error>> {
        let block = self.begin_frame(frame)?;

        for (port, chunk) in self.ports.iter_mut().zip(frame.chunks_exact(block)) {
            port.begin_write(chunk).map_err(LinkError::Port)?;
        }
        for port in self.ports.iter_mut() {
            port.finish_write().map_err(LinkError::Port)?;
        }

        self.end_frame(frame)
    }

    /// Open a frame transfer on every channel
    ///
    /// Waits for all channels to report ready, then sends `START_FRAME` and
    /// the `SET_DATA` header. Returns the per-channel block length. The
    /// caller streams `frame.chunks_exact(block)` to the ports in channel
    /// order, then calls [`end_frame`](Self::end_frame).
    pub fn begin_frame(&mut self, frame: &[u8]) -> Result<usize, LinkError<P::Error>> {
        if N == 0 || frame.is_empty() || frame.len() % N != 0 {
            return Err(LinkError::FrameSize(frame.len()));
        }
        let block = frame.len() / N;
        let block_len = u16::try_from(block).map_err(|_| LinkError::FrameSize(frame.len()))?;

        let start = CommandFrame::simple(Opcode::StartFrame).encode();
        let header = CommandFrame::set_data(block_len).header();

        for channel in 0..N {
            self.wait_ready(channel)?;
        }

        for port in self.ports.iter_mut() {
            port.write(&start).map_err(LinkError::Port)?;
        }
        for port in self.ports.iter_mut() {
            port.write(&header).map_err(LinkError::Port)?;
        }
        Ok(block)
    }

    /// Close a transfer opened with [`begin_frame`](Self::begin_frame)
    ///
    /// Sends the zero pad and each channel's payload CRC.
    pub fn end_frame(&mut self, frame: &[u8]) -> Result<(), LinkError<P::Error>> {
        if N == 0 || frame.is_empty() || frame.len() % N != 0 {
            return Err(LinkError::FrameSize(frame.len()));
        }
        let block = frame.len() / N;
        let block_len = u16::try_from(block).map_err(|_| LinkError::FrameSize(frame.len()))?;
        let base_crc = crc16(&CommandFrame::set_data(block_len).header());

        let pad_len = self.config.pad_len;
        for port in self.ports.iter_mut() {
            let mut left = pad_len;
            while left > 0 {
                let n = left.min(PAD_CHUNK.len());
                port.write(&PAD_CHUNK[..n]).map_err(LinkError::Port)?;
                left -= n;
            }
        }
        for (port, chunk) in self.ports.iter_mut().zip(frame.chunks_exact(block)) {
            let crc = crc16_update(base_crc, chunk);
            port.write(&crc.to_le_bytes()).map_err(LinkError::Port)?;
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("link: sent {} bytes over {} channels", frame.len(), N);
        Ok(())
    }

    /// All ports at once, for streaming a payload block outside the master
    pub fn ports_mut(&mut self) -> &mut [P; N] {
        &mut self.ports
    }
}
