mod capture_handle;
mod irrigation_handle;
mod relay_handle;
mod schedule_handle;
mod sse_handle;
mod status_handle;

pub use capture_handle::*;
pub use irrigation_handle::*;
pub use relay_handle::*;
pub use schedule_handle::*;
pub use sse_handle::*;
pub use status_handle::*;
