pub mod matcher;
pub mod shift;

pub use matcher::{match_stars, ShiftRecord};
pub use shift::{resolve_shift, roll_array, roll_frame, shift_by_records, PixelShift};
