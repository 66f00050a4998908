pub mod config;
pub mod local_background;
pub mod mask;

pub use config::{LocalBackgroundConfig, SelectionConfig};
pub use local_background::{annulus_background, subtract_local_background};
pub use mask::{select_stars, SelectionReport};
