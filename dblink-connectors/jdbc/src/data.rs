use dblink_core::data::DataType;

// Type ids from java.sql.Types
mod sql_types {
    pub const BIT: i32 = -7;
    pub const TINYINT: i32 = -6;
    pub const BIGINT: i32 = -5;
    pub const SMALLINT: i32 = 5;
    pub const INTEGER: i32 = 4;
    pub const FLOAT: i32 = 6;
    pub const REAL: i32 = 7;
    pub const DOUBLE: i32 = 8;
    pub const NUMERIC: i32 = 2;
    pub const DECIMAL: i32 = 3;
    pub const BOOLEAN: i32 = 16;
    pub const BINARY: i32 = -2;
    pub const VARBINARY: i32 = -3;
    pub const LONGVARBINARY: i32 = -4;
    pub const BLOB: i32 = 2004;
    pub const TIMESTAMP: i32 = 93;
    pub const NULL: i32 = 0;
}

/// Maps a java.sql.Types id onto the connector's data types.
///
/// Anything without a direct scalar mapping (char types, dates, clobs,
/// vendor-specific ids) is read through the driver's string rendering.
pub fn from_jdbc_type(type_id: i32) -> DataType {
    use sql_types::*;

    match type_id {
        BIT | BOOLEAN => DataType::Boolean,
        TINYINT | SMALLINT | INTEGER | BIGINT => DataType::Int64,
        FLOAT | REAL | DOUBLE | NUMERIC | DECIMAL => DataType::Float64,
        BINARY | VARBINARY | LONGVARBINARY | BLOB => DataType::Binary,
        TIMESTAMP => DataType::DateTime,
        NULL => DataType::Null,
        _ => DataType::Utf8String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_jdbc_type() {
        assert_eq!(from_jdbc_type(sql_types::INTEGER), DataType::Int64);
        assert_eq!(from_jdbc_type(sql_types::DOUBLE), DataType::Float64);
        assert_eq!(from_jdbc_type(sql_types::BOOLEAN), DataType::Boolean);
        assert_eq!(from_jdbc_type(sql_types::TIMESTAMP), DataType::DateTime);
        // VARCHAR and anything unknown read as text
        assert_eq!(from_jdbc_type(12), DataType::Utf8String);
        assert_eq!(from_jdbc_type(9999), DataType::Utf8String);
    }
}
