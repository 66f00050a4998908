use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::star::StarTable;

/// Write a star table as pretty-printed JSON for downstream PSF tools.
pub fn write_star_table(table: &StarTable, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(table)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a star table written by [`write_star_table`]. Duplicate ids are rejected.
pub fn read_star_table(path: &Path) -> Result<StarTable> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
