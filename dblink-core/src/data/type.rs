use serde::{Deserialize, Serialize};

use super::DataValue;

/// Data type of values
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum DataType {
    Null,
    Boolean,
    Int64,
    Float64,
    Utf8String,
    Binary,
    DateTime,
}

// Provide conversion from DataValue into DataType
impl<'a> From<&'a DataValue> for DataType {
    fn from(v: &'a DataValue) -> Self {
        match v {
            DataValue::Null => DataType::Null,
            DataValue::Boolean(_) => DataType::Boolean,
            DataValue::Int64(_) => DataType::Int64,
            DataValue::Float64(_) => DataType::Float64,
            DataValue::Utf8String(_) => DataType::Utf8String,
            DataValue::Binary(_) => DataType::Binary,
            DataValue::DateTime(_) => DataType::DateTime,
        }
    }
}
