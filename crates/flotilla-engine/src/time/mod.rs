//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per render loop
//! - call `tick()` once per presented frame and feed `dt` to the display's
//!   animation time

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
