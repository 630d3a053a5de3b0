use dblink_core::err::Result;

mod result;
pub use result::*;

/// A driver bridge knows how to establish sessions against one family of
/// data sources.
///
/// Each supported protocol registers one implementation: the JDBC bridge
/// loads vendor driver artifacts into an in-process JVM, while statically
/// linked bridges (eg sqlite) dial their driver directly.
pub trait DriverBridge {
    /// The connection configuration for this bridge
    type TConfig: Clone + Send;
    /// The session type produced by this bridge
    type TSession: Session;

    /// The type identifier of the bridge
    const TYPE: &'static str;

    /// Establishes a new session against the data source.
    ///
    /// Configuration problems are reported as `ConnectorError::ConfigInvalid`
    /// before any driver activity, dial failures as
    /// `ConnectorError::ConnectionFailed`. Neither is retried.
    fn establish(conf: &Self::TConfig) -> Result<Self::TSession>;

    /// The vendor command which lists the tables in the data source
    fn table_list_sql(_conf: &Self::TConfig) -> String {
        "SHOW TABLES".into()
    }

    /// The vendor command which describes the columns of the supplied table.
    /// The table name is interpolated verbatim.
    fn column_list_sql(_conf: &Self::TConfig, table_name: &str) -> String {
        format!("DESCRIBE {}", table_name)
    }
}

/// A live session against a data source
pub trait Session {
    /// Runs the supplied sql statement on the session.
    ///
    /// Returns `Some` with the materialized result set for row-producing
    /// statements and `None` for statements without one (DDL/DML).
    /// Statement failures are `Err`; classifying them as in-band query
    /// failures is the connector's concern, not the session's.
    fn execute(&mut self, sql: &str) -> Result<Option<TableData>>;

    /// Closes the session, releasing the underlying channel
    fn close(&mut self) -> Result<()>;
}

/// Structured queries are rendered to sql text by an external collaborator.
/// This seam is all the connector knows about it.
pub trait RenderSql {
    /// Renders this query as a sql string
    fn render_sql(&self) -> Result<String>;
}

impl RenderSql for str {
    fn render_sql(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl RenderSql for String {
    fn render_sql(&self) -> Result<String> {
        Ok(self.clone())
    }
}
