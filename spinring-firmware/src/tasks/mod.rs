//! Embassy tasks

pub mod angle;
pub mod calibration;
pub mod link;
pub mod render;
pub mod spin;

pub use angle::angle_task;
pub use calibration::calibration_task;
pub use link::link_task;
pub use render::render_task;
pub use spin::spin_task;
