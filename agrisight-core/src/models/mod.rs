mod capture;
mod irrigation;
mod pump;
mod schedule;
mod sensor;
mod weather;

pub use capture::*;
pub use irrigation::*;
pub use pump::*;
pub use schedule::*;
pub use sensor::*;
pub use weather::*;
