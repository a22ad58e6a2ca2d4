pub mod f32;
pub mod io;
pub mod labels;
pub mod traits;

pub use self::f32::ImageF32;
pub use self::labels::{mask_area, LabelImage};
pub use self::traits::{ImageView, ImageViewMut};
