use crate::base::Field;
use crate::StrError;
use serde::{Deserialize, Serialize};

/// Defines the destination of the (time, field values) pairs computed by the time integrator
pub trait ResultSink {
    /// Writes the nodal values of a field at a given time
    fn write(&mut self, field: Field, time: f64, values: &[f64]) -> Result<(), StrError>;
}

/// Holds the history of the nodal values of one field
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TimeSeries {
    /// The field
    pub field: Field,

    /// Number of components at each node
    pub n_components: usize,

    /// Ids of the points owning the nodal values (empty if unknown)
    pub owner_points: Vec<usize>,

    /// All recorded times
    pub times: Vec<f64>,

    /// All recorded values (one vector per time)
    pub values: Vec<Vec<f64>>,
}

/// Keeps all snapshots in memory
pub struct MemorySink {
    /// Holds one time series per field (in the order of [Field::all])
    pub series: Vec<TimeSeries>,
}

impl TimeSeries {
    /// Allocates a new (empty) instance
    pub fn new(field: Field, owner_points: Vec<usize>) -> Self {
        TimeSeries {
            field,
            n_components: field.n_components(),
            owner_points,
            times: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Appends a snapshot
    pub fn push(&mut self, time: f64, values: &[f64]) {
        self.times.push(time);
        self.values.push(values.to_vec());
    }

    /// Returns the number of snapshots
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns the last snapshot, if any
    pub fn last(&self) -> Option<(f64, &Vec<f64>)> {
        match (self.times.last(), self.values.last()) {
            (Some(t), Some(v)) => Some((*t, v)),
            _ => None,
        }
    }
}

impl MemorySink {
    /// Allocates a new instance
    pub fn new() -> Self {
        MemorySink {
            series: Field::all().iter().map(|f| TimeSeries::new(*f, Vec::new())).collect(),
        }
    }

    /// Returns the time series of a field
    pub fn get(&self, field: Field) -> &TimeSeries {
        &self.series[field as usize]
    }
}

impl ResultSink for MemorySink {
    fn write(&mut self, field: Field, time: f64, values: &[f64]) -> Result<(), StrError> {
        self.series[field as usize].push(time, values);
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
