use dblink_connectors_base::interface::{DriverBridge, Session, TableData};
use dblink_core::data::DataType;
use dblink_core::err::{ConnectorError, Context, Result};
use dblink_logging::debug;
use rusqlite::types::Value;

use crate::{from_decl_type, from_sqlite, infer_type, SqliteConnectionConfig};

/// Driver bridge for sqlite, linked statically into the binary
pub struct SqliteBridge;

impl DriverBridge for SqliteBridge {
    type TConfig = SqliteConnectionConfig;
    type TSession = SqliteSession;

    const TYPE: &'static str = "sqlite";

    fn establish(conf: &SqliteConnectionConfig) -> Result<SqliteSession> {
        let con = match conf.path.as_ref() {
            Some(path) => {
                debug!("Opening sqlite database at {}", path.display());
                rusqlite::Connection::open(path)
            }
            None => rusqlite::Connection::open_in_memory(),
        }
        .map_err(|err| ConnectorError::ConnectionFailed(err.to_string()))?;

        Ok(SqliteSession { con: Some(con) })
    }

    fn table_list_sql(_conf: &SqliteConnectionConfig) -> String {
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name".into()
    }

    fn column_list_sql(_conf: &SqliteConnectionConfig, table_name: &str) -> String {
        format!("PRAGMA table_info({})", table_name)
    }
}

/// A live session against a sqlite database
pub struct SqliteSession {
    con: Option<rusqlite::Connection>,
}

impl Session for SqliteSession {
    fn execute(&mut self, sql: &str) -> Result<Option<TableData>> {
        let con = self.con.as_ref().context("Session has been closed")?;

        let mut stmt = con.prepare(sql).context("Failed to prepare statement")?;

        // Statements without an output shape (DDL/DML) have no columns
        if stmt.column_count() == 0 {
            stmt.execute([]).context("Failed to execute statement")?;
            return Ok(None);
        }

        let names = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        let decls = stmt
            .columns()
            .iter()
            .map(|col| col.decl_type().map(from_decl_type))
            .collect::<Vec<_>>();

        let mut raw_rows: Vec<Vec<Value>> = vec![];
        let mut rows = stmt.query([]).context("Failed to execute query")?;

        while let Some(row) = rows.next().context("Failed to read row")? {
            let mut vals = vec![];
            for idx in 0..names.len() {
                vals.push(
                    row.get::<_, Value>(idx)
                        .context("Failed to read column value")?,
                );
            }
            raw_rows.push(vals);
        }

        // Sqlite is dynamically typed: fall back to inferring the column
        // type from the values when the statement declares none
        let cols = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let r#type = decls[idx]
                    .clone()
                    .unwrap_or_else(|| infer_type(raw_rows.iter().map(|row| &row[idx])));
                (name, r#type)
            })
            .collect::<Vec<(String, DataType)>>();

        let rows = raw_rows
            .into_iter()
            .map(|row| row.into_iter().map(from_sqlite).collect())
            .collect();

        Ok(Some(TableData::new(cols, rows)))
    }

    fn close(&mut self) -> Result<()> {
        if let Some(con) = self.con.take() {
            con.close()
                .map_err(|(_, err)| err)
                .context("Failed to close sqlite connection")?;
        }

        Ok(())
    }
}
