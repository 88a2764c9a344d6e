pub mod engine;
pub mod gesture;
pub mod input;
pub mod scheduler;
pub mod surface;
pub mod zoom;

pub use engine::CanvasEngine;
pub use input::{Modifiers, PointerEvent, WheelDeltaMode, WheelEvent};
pub use surface::{RecordingSurface, Surface};
