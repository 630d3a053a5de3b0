use dblink_core::data::{DataType, DataValue};
use serde::{Deserialize, Serialize};

/// A fully materialized tabular result.
///
/// Columns are ordered and carry their name along with the reported or
/// inferred data type. Every row holds one value per column, positionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// The named columns of the result in positional order
    pub cols: Vec<(String, DataType)>,
    /// The rows of the result
    pub rows: Vec<Vec<DataValue>>,
}

impl TableData {
    pub fn new(cols: Vec<(String, DataType)>, rows: Vec<Vec<DataValue>>) -> Self {
        Self { cols, rows }
    }

    /// The column names in positional order
    pub fn col_names(&self) -> Vec<&str> {
        self.cols.iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// The outcome of executing a statement.
///
/// Statement-level failures are part of this contract rather than being
/// raised: callers branch on the variant, not on error handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryResult {
    /// The statement produced rows
    Table(TableData),
    /// The statement succeeded without producing rows
    Acknowledged,
    /// The statement failed
    Failed { message: String },
}

impl QueryResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table(_))
    }

    pub fn as_table(&self) -> Option<&TableData> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<TableData> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }
}

/// The outcome of a connectivity probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub success: bool,
    pub error_message: Option<String>,
}

impl StatusReport {
    pub fn ok() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
        }
    }
}
