pub mod io;
pub mod page;
pub mod traits;
pub mod u8;

pub use self::page::{Channels, PageImage};
pub use self::traits::{ImageView, ImageViewMut, Rows};
pub use self::u8::{GrayImageU8, ImageU8};
