pub mod image_io;
pub mod star_table;
