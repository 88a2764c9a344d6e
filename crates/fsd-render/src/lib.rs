pub mod hit;
pub mod scene;
pub mod theme;
pub mod transform;
pub mod vello_backend;

pub use hit::{CursorKind, ResizeHandle, hit_test_handle, hit_test_node};
pub use scene::{DisplayList, DrawCmd, Overlay, build_display_list};
pub use theme::CanvasTheme;
pub use transform::{SurfaceSize, Viewport};
