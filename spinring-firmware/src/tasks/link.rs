//! Link transmit task
//!
//! Streams committed frames from the pipeline to both bridge channels.
//! Commands and status polls are blocking; the two payload blocks are
//! written by DMA at the same time.

use defmt::*;
use embassy_futures::join::join;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{SPI0, SPI1};
use embassy_rp::spi::{Async, Spi};
use embassy_time::{Duration, Timer};

use spinring_core::config::REFERENCE_FRAME_BYTES;
use spinring_drivers::link::{LinkError, LinkMaster, SpiLink};
use spinring_hal::LinkPort;

use crate::channels::{FRAME_READY, PIPELINE, SLOT_FREE};

/// Back-off after a failed frame before the next attempt
const RETRY_DELAY: Duration = Duration::from_millis(5);

pub type Link0 = SpiLink<Spi<'static, SPI0, Async>, Output<'static>>;
pub type Link1 = SpiLink<Spi<'static, SPI1, Async>, Output<'static>>;

/// Error reported by either channel
pub type ChannelError = <Link0 as LinkPort>::Error;

/// One bridge channel; the two SPI blocks are distinct types
pub enum Channel {
    Spi0(Link0),
    Spi1(Link1),
}

/// Link master over both bridge channels
pub type ControllerLink = LinkMaster<Channel, 2>;

impl LinkPort for Channel {
    // Both blocks share the embassy SPI error type
    type Error = ChannelError;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        match self {
            Channel::Spi0(link) => link.transfer(read, write),
            Channel::Spi1(link) => link.transfer(read, write),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        match self {
            Channel::Spi0(link) => link.write(data),
            Channel::Spi1(link) => link.write(data),
        }
    }

    fn begin_write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        match self {
            Channel::Spi0(link) => link.begin_write(data),
            Channel::Spi1(link) => link.begin_write(data),
        }
    }

    fn is_write_done(&mut self) -> bool {
        match self {
            Channel::Spi0(link) => link.is_write_done(),
            Channel::Spi1(link) => link.is_write_done(),
        }
    }

    fn finish_write(&mut self) -> Result<(), Self::Error> {
        match self {
            Channel::Spi0(link) => link.finish_write(),
            Channel::Spi1(link) => link.finish_write(),
        }
    }
}

impl Channel {
    async fn write_async(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        match self {
            Channel::Spi0(link) => link.write_async(data).await,
            Channel::Spi1(link) => link.write_async(data).await,
        }
    }
}

/// Send one frame with both payload blocks in flight together
async fn send_frame(
    link: &mut ControllerLink,
    frame: &[u8],
) -> Result<(), LinkError<ChannelError>> {
    let block = link.begin_frame(frame)?;
    let (first, second) = frame.split_at(block);

    let [port0, port1] = link.ports_mut();
    let (sent0, sent1) = join(port0.write_async(first), port1.write_async(second)).await;
    sent0.map_err(LinkError::Port)?;
    sent1.map_err(LinkError::Port)?;

    link.end_frame(frame)
}

#[embassy_executor::task]
pub async fn link_task(mut link: ControllerLink) {
    info!("Link task started");

    for channel in 0..link.channels() {
        match link.ping(channel) {
            Ok(()) => info!("Bridge {} answered ping", channel),
            Err(e) => warn!("Bridge {} ping failed: {:?}", channel, Debug2Format(&e)),
        }
    }

    // Sent from a copy so the render task keeps the pipeline while DMA runs
    let mut frame = [0u8; REFERENCE_FRAME_BYTES];
    let mut sent: u32 = 0;
    loop {
        let ready = {
            let pipeline = PIPELINE.lock().await;
            match pipeline.read_slot() {
                Ok(slot) => {
                    frame.copy_from_slice(slot);
                    true
                }
                Err(_) => false,
            }
        };

        let result = if ready {
            let result = send_frame(&mut link, &frame).await;
            if result.is_ok() && PIPELINE.lock().await.advance_read().is_ok() {
                SLOT_FREE.signal(());
            }
            Some(result)
        } else {
            None
        };

        match result {
            None => FRAME_READY.wait().await,
            Some(Ok(())) => {
                sent = sent.wrapping_add(1);
                if sent % 1000 == 0 {
                    debug!("{} frames sent", sent);
                }
            }
            Some(Err(LinkError::ReadinessTimeout(channel))) => {
                trace!("Bridge {} busy, retrying", channel);
                Timer::after(RETRY_DELAY).await;
            }
            Some(Err(e)) => {
                warn!("Frame send failed: {:?}", Debug2Format(&e));
                Timer::after(RETRY_DELAY).await;
            }
        }
    }
}
