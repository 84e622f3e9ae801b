//! Shared state between tasks
//!
//! The render and link tasks hand frames over through [`PIPELINE`]; the
//! angle task feeds [`ANGLE`] from pin edges.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use spinring_core::angle::AngleCell;
use spinring_core::config::{RingCalibration, REFERENCE_FRAME_BYTES};
use spinring_core::pipeline::Pipeline;

/// Number of frames in flight between render and link
pub const PIPELINE_SLOTS: usize = 2;

/// Frame pipeline for the reference ring
pub type FramePipeline = Pipeline<PIPELINE_SLOTS, REFERENCE_FRAME_BYTES>;

/// Frames rendered but not yet sent
pub static PIPELINE: Mutex<CriticalSectionRawMutex, FramePipeline> = Mutex::new(Pipeline::new());

/// Last encoder pulse, written on every falling edge
pub static ANGLE: AngleCell = AngleCell::new();

/// A frame was committed to the pipeline
pub static FRAME_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// A slot was released by the link task
pub static SLOT_FREE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Calibration changed at runtime; the render task picks up the offset
pub static CALIBRATION_CHANGED: Signal<CriticalSectionRawMutex, RingCalibration> = Signal::new();
