pub mod align;
pub mod consts;
pub mod detection;
pub mod error;
pub mod frame;
pub mod fwhm;
pub mod io;
pub mod pipeline;
pub mod select;
pub mod stack;
pub mod star;
pub mod stats;
