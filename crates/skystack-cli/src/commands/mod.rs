pub mod config;
pub mod fwhm;
pub mod info;
pub mod pipeline;
pub mod select;
pub mod stack;
