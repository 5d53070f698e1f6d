mod crops;
mod settings;

pub use crops::{CROP_TYPES, is_supported_crop};
pub use settings::*;
