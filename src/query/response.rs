//! Response envelope
//!
//! Results go out as `{"<name>_list": [...], "returned": n}`, with a
//! `timing` member in milliseconds when the request asked for it.

use std::time::Duration;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A page of results for one collection
#[derive(Debug, Clone)]
pub struct DataResponse<T> {
    data: Vec<T>,
    data_type_name: String,
    timing: Option<Duration>,
}

impl<T> DataResponse<T> {
    pub fn new(data: Vec<T>, data_type_name: impl Into<String>, timing: Option<Duration>) -> Self {
        Self {
            data,
            data_type_name: data_type_name.into(),
            timing,
        }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Number of items in the page
    pub fn returned(&self) -> usize {
        self.data.len()
    }

    pub fn timing(&self) -> Option<Duration> {
        self.timing
    }

    /// Name of the array member
    pub fn list_name(&self) -> String {
        format!("{}_list", self.data_type_name)
    }
}

impl<T: Serialize> Serialize for DataResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.timing.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(&self.list_name(), &self.data)?;
        map.serialize_entry("returned", &self.returned())?;
        if let Some(timing) = self.timing {
            map.serialize_entry("timing", &(timing.as_nanos() as f64 / 1_000_000.0))?;
        }
        map.end()
    }
}

/// A collection and its document count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Datatype {
    pub name: String,
    pub count: u64,
}

impl Datatype {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Number of collections available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionCount {
    pub count: usize,
}

impl From<usize> for CollectionCount {
    fn from(count: usize) -> Self {
        Self { count }
    }
}
