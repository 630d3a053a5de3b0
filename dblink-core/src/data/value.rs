use serde::{Deserialize, Serialize};

use super::DataType;

/// A single cell value returned from a data source.
///
/// Result rows are heterogeneous across vendors so each cell carries its own
/// scalar kind rather than being tied to a column-level schema.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum DataValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Utf8String(String),
    Binary(Vec<u8>),
    DateTime(chrono::NaiveDateTime),
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        *self == DataValue::Null
    }

    /// Gets the data type of this value
    pub fn r#type(&self) -> DataType {
        self.into()
    }
}

impl From<&str> for DataValue {
    fn from(str: &str) -> Self {
        DataValue::Utf8String(str.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(num: i64) -> Self {
        DataValue::Int64(num)
    }
}
