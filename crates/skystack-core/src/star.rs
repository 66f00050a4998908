use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkystackError};

/// One detected point source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    /// Identifier, unique within its table.
    pub id: u32,
    /// Centroid column (pixels).
    pub x: f64,
    /// Centroid row (pixels).
    pub y: f64,
    /// Background-subtracted peak intensity.
    pub peak: f64,
    /// Integrated background-subtracted flux.
    pub flux: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharpness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roundness: Option<f64>,
}

impl StarRecord {
    pub fn new(id: u32, x: f64, y: f64, peak: f64, flux: f64) -> Self {
        Self {
            id,
            x,
            y,
            peak,
            flux,
            sharpness: None,
            roundness: None,
        }
    }

    /// Euclidean distance between two centroids.
    pub fn distance_to(&self, other: &StarRecord) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Ordered collection of stars detected in a single frame.
///
/// Order is whatever produced the table until a component sorts it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StarRecord>", into = "Vec<StarRecord>")]
pub struct StarTable {
    records: Vec<StarRecord>,
}

impl StarTable {
    /// Build a table, rejecting duplicate ids.
    pub fn new(records: Vec<StarRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(SkystackError::DuplicateStarId(record.id));
            }
        }
        Ok(Self { records })
    }

    /// Build from records whose ids are already known to be unique
    /// (a subset of an existing table, or freshly numbered detections).
    pub(crate) fn from_unique(records: Vec<StarRecord>) -> Self {
        debug_assert!(Self::new(records.clone()).is_ok());
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StarRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[StarRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&StarRecord> {
        self.records.get(index)
    }

    pub fn into_records(self) -> Vec<StarRecord> {
        self.records
    }
}

impl TryFrom<Vec<StarRecord>> for StarTable {
    type Error = SkystackError;

    fn try_from(records: Vec<StarRecord>) -> Result<Self> {
        Self::new(records)
    }
}

impl From<StarTable> for Vec<StarRecord> {
    fn from(table: StarTable) -> Self {
        table.records
    }
}

impl<'a> IntoIterator for &'a StarTable {
    type Item = &'a StarRecord;
    type IntoIter = std::slice::Iter<'a, StarRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
