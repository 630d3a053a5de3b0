use dblink_core::data::{DataType, DataValue};
use rusqlite::types::Value;

/// Maps a declared column type onto the connector's data types using
/// sqlite's type affinity rules.
/// @see sqlite3AffinityType in the sqlite source
pub fn from_decl_type(decl: &str) -> DataType {
    let decl = decl.to_uppercase();

    if decl.contains("INT") {
        DataType::Int64
    } else if decl.contains("CHAR") || decl.contains("CLOB") || decl.contains("TEXT") {
        DataType::Utf8String
    } else if decl.contains("BLOB") {
        DataType::Binary
    } else if decl.contains("REAL") || decl.contains("FLOA") || decl.contains("DOUB") {
        DataType::Float64
    } else if decl.contains("BOOL") {
        DataType::Boolean
    } else {
        DataType::Utf8String
    }
}

/// Infers a column type from its values when no type was declared,
/// eg for expression columns. Sqlite is dynamically typed so the first
/// non-null value decides.
pub fn infer_type<'a>(mut vals: impl Iterator<Item = &'a Value>) -> DataType {
    vals.find(|val| !matches!(val, Value::Null))
        .map(|val| match val {
            Value::Null => DataType::Null,
            Value::Integer(_) => DataType::Int64,
            Value::Real(_) => DataType::Float64,
            Value::Text(_) => DataType::Utf8String,
            Value::Blob(_) => DataType::Binary,
        })
        .unwrap_or(DataType::Utf8String)
}

/// Converts a sqlite value into the connector's cell value
pub fn from_sqlite(val: Value) -> DataValue {
    match val {
        Value::Null => DataValue::Null,
        Value::Integer(d) => DataValue::Int64(d),
        Value::Real(d) => DataValue::Float64(d),
        Value::Text(d) => DataValue::Utf8String(d),
        Value::Blob(d) => DataValue::Binary(d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decl_type_affinity() {
        assert_eq!(from_decl_type("INTEGER"), DataType::Int64);
        assert_eq!(from_decl_type("bigint"), DataType::Int64);
        assert_eq!(from_decl_type("VARCHAR(255)"), DataType::Utf8String);
        assert_eq!(from_decl_type("TEXT"), DataType::Utf8String);
        assert_eq!(from_decl_type("BLOB"), DataType::Binary);
        assert_eq!(from_decl_type("DOUBLE PRECISION"), DataType::Float64);
        assert_eq!(from_decl_type("BOOLEAN"), DataType::Boolean);
        assert_eq!(from_decl_type("DATETIME"), DataType::Utf8String);
    }

    #[test]
    fn test_infer_type_skips_nulls() {
        let vals = vec![Value::Null, Value::Integer(1)];

        assert_eq!(infer_type(vals.iter()), DataType::Int64);
    }

    #[test]
    fn test_infer_type_defaults_to_text() {
        let vals = vec![Value::Null];

        assert_eq!(infer_type(vals.iter()), DataType::Utf8String);
        assert_eq!(infer_type([].iter()), DataType::Utf8String);
    }

    #[test]
    fn test_from_sqlite() {
        assert_eq!(from_sqlite(Value::Null), DataValue::Null);
        assert_eq!(from_sqlite(Value::Integer(5)), DataValue::Int64(5));
        assert_eq!(
            from_sqlite(Value::Text("a".to_string())),
            DataValue::Utf8String("a".to_string())
        );
    }
}
