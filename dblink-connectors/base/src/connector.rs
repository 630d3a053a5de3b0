use std::mem;
use std::sync::{Mutex, MutexGuard};

use dblink_core::err::Result;
use dblink_logging::{debug, error, info, warn};

use crate::interface::{DriverBridge, QueryResult, RenderSql, Session, StatusReport};

/// The canonical name of the first column of a `list_tables` result.
/// Downstream consumers hard-code this, vendor listing commands do not.
pub const TABLE_NAME_COL: &str = "table_name";

/// A connector instance bridging a caller to a single external database
/// through the driver bridge `B`.
///
/// At most one session is live per instance. The session handle and its
/// connected-state form a non-atomic check-then-act pair, so all transitions
/// happen under a single mutex (`Disconnected -> Connected -> Disconnected`).
/// All operations block the calling thread; callers needing concurrency run
/// one connector per logical session.
pub struct Connector<B: DriverBridge> {
    conf: B::TConfig,
    state: Mutex<State<B::TSession>>,
}

enum State<S> {
    Disconnected,
    Connected(S),
}

impl<S> State<S> {
    fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl<B: DriverBridge> Connector<B> {
    pub fn new(conf: B::TConfig) -> Self {
        Self {
            conf,
            state: Mutex::new(State::Disconnected),
        }
    }

    pub fn config(&self) -> &B::TConfig {
        &self.conf
    }

    /// Whether a session is currently open
    pub fn is_connected(&self) -> bool {
        self.lock().is_connected()
    }

    /// Opens a session to the data source.
    ///
    /// Idempotent: an already-open session is reused without re-dialing.
    /// Dial failures are logged and propagated, never retried.
    pub fn connect(&self) -> Result<()> {
        let mut state = self.lock();
        Self::open(&self.conf, &mut state).map(|_| ())
    }

    /// Closes the current session. No-op when disconnected.
    pub fn disconnect(&self) {
        let mut state = self.lock();
        Self::close(&mut state);
    }

    /// Executes the supplied sql against the data source.
    ///
    /// Statement-level failures are returned in-band as `QueryResult::Failed`
    /// while failures to open a session propagate as `Err`. Callers branch
    /// on the result variant for query errors, not on error handling.
    ///
    /// When no session is open one is established for the duration of this
    /// call only and closed before returning, whatever the outcome.
    pub fn execute(&self, sql: &str) -> Result<QueryResult> {
        let mut state = self.lock();
        let opened_here = !state.is_connected();

        let result = Self::open(&self.conf, &mut state).map(|session| {
            match session.execute(sql) {
                Ok(Some(table)) if !table.rows.is_empty() => QueryResult::Table(table),
                // Statements without rows (DDL/DML or an empty result set)
                // are a plain acknowledgement
                Ok(_) => QueryResult::Acknowledged,
                Err(err) => {
                    error!("Error running query {:?}: {:?}", sql, err);
                    // the alternate rendering keeps the driver's message,
                    // not just the outermost context
                    QueryResult::failed(format!("{:#}", err))
                }
            }
        });

        if opened_here {
            Self::close(&mut state);
        }

        result
    }

    /// Renders the supplied structured query to sql text and executes it
    pub fn query(&self, query: &impl RenderSql) -> Result<QueryResult> {
        self.execute(&query.render_sql()?)
    }

    /// Retrieves the list of tables from the data source.
    ///
    /// The first column of a tabular result is renamed to `table_name`
    /// whatever the vendor's listing command called it; rows and remaining
    /// columns pass through unmodified, as do non-tabular results.
    pub fn list_tables(&self) -> Result<QueryResult> {
        let mut result = self.execute(&B::table_list_sql(&self.conf))?;

        if let QueryResult::Table(table) = &mut result {
            if let Some(col) = table.cols.first_mut() {
                col.0 = TABLE_NAME_COL.to_string();
            }
        }

        Ok(result)
    }

    /// Retrieves the column description of the supplied table.
    ///
    /// The table name is interpolated into the vendor command verbatim;
    /// quoting or escaping the identifier is the caller's responsibility.
    pub fn list_columns(&self, table_name: &str) -> Result<QueryResult> {
        self.execute(&B::column_list_sql(&self.conf, table_name))
    }

    /// Probes connectivity to the data source.
    ///
    /// This is the one place dial failures are converted to an in-band
    /// report. No session is left open afterwards, whatever the outcome.
    pub fn check_connection(&self) -> StatusReport {
        let mut state = self.lock();

        let report = match Self::open(&self.conf, &mut state) {
            Ok(_) => StatusReport::ok(),
            Err(err) => {
                error!("Connection check to {} failed: {:?}", B::TYPE, err);
                StatusReport::error(format!("{:#}", err))
            }
        };

        Self::close(&mut state);

        report
    }

    fn lock(&self) -> MutexGuard<'_, State<B::TSession>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Transitions to connected, dialing via the driver bridge if required
    fn open<'a>(
        conf: &B::TConfig,
        state: &'a mut State<B::TSession>,
    ) -> Result<&'a mut B::TSession> {
        if let State::Disconnected = state {
            debug!("Establishing {} session", B::TYPE);
            let session = B::establish(conf).map_err(|err| {
                error!("Failed to establish {} session: {:?}", B::TYPE, err);
                err
            })?;
            info!("{} session established", B::TYPE);
            *state = State::Connected(session);
        }

        match state {
            State::Connected(session) => Ok(session),
            State::Disconnected => unreachable!(),
        }
    }

    /// Transitions to disconnected, closing the underlying session.
    /// Close failures are logged and do not mask the primary outcome.
    fn close(state: &mut State<B::TSession>) {
        if let State::Connected(mut session) = mem::replace(state, State::Disconnected) {
            if let Err(err) = session.close() {
                warn!("Failed to close {} session: {:?}", B::TYPE, err);
            }
        }
    }
}

impl<B: DriverBridge> Drop for Connector<B> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        Self::close(state);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use dblink_core::data::{DataType, DataValue};
    use dblink_core::err::{anyhow, bail, ConnectorError};

    use crate::interface::TableData;

    use super::*;

    #[derive(Clone, Default)]
    struct MockConfig {
        dials: Arc<AtomicUsize>,
        fail_dial: bool,
        closed: Arc<AtomicBool>,
        executed: Arc<Mutex<Vec<String>>>,
        /// Result returned for the table listing command
        tables: Option<TableData>,
        fail_tables: bool,
    }

    struct MockSession {
        conf: MockConfig,
    }

    struct MockBridge;

    impl DriverBridge for MockBridge {
        type TConfig = MockConfig;
        type TSession = MockSession;

        const TYPE: &'static str = "mock";

        fn establish(conf: &MockConfig) -> Result<MockSession> {
            conf.dials.fetch_add(1, Ordering::SeqCst);

            if conf.fail_dial {
                return Err(ConnectorError::ConnectionFailed("mock dial refused".into()).into());
            }

            Ok(MockSession { conf: conf.clone() })
        }
    }

    impl Session for MockSession {
        fn execute(&mut self, sql: &str) -> Result<Option<TableData>> {
            self.conf.executed.lock().unwrap().push(sql.to_string());

            match sql {
                "SELECT 1" => Ok(Some(TableData::new(
                    vec![("num".to_string(), DataType::Int64)],
                    vec![vec![DataValue::Int64(1)]],
                ))),
                "SELECT nothing" => Ok(Some(TableData::new(
                    vec![("num".to_string(), DataType::Int64)],
                    vec![],
                ))),
                "SHOW TABLES" if self.conf.fail_tables => bail!("listing not supported"),
                "SHOW TABLES" => Ok(self.conf.tables.clone()),
                sql if sql.contains("nonexistent_table") => {
                    // sessions wrap driver errors in context, as the real
                    // bridges do
                    Err(anyhow!("relation \"nonexistent_table\" does not exist")
                        .context("Failed to prepare statement"))
                }
                _ => Ok(None),
            }
        }

        fn close(&mut self) -> Result<()> {
            self.conf.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn mock_connector(conf: MockConfig) -> Connector<MockBridge> {
        Connector::new(conf)
    }

    #[test]
    fn test_connect_is_idempotent() {
        let conf = MockConfig::default();
        let con = mock_connector(conf.clone());

        con.connect().unwrap();
        con.connect().unwrap();

        assert!(con.is_connected());
        assert_eq!(conf.dials.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_connect_failure_propagates() {
        let conf = MockConfig {
            fail_dial: true,
            ..Default::default()
        };
        let con = mock_connector(conf.clone());

        let err = con.connect().unwrap_err();

        assert!(ConnectorError::is_connection(&err));
        assert!(!con.is_connected());
    }

    #[test]
    fn test_disconnect_is_noop_when_disconnected() {
        let con = mock_connector(MockConfig::default());

        con.disconnect();

        assert!(!con.is_connected());
    }

    #[test]
    fn test_disconnect_closes_session() {
        let conf = MockConfig::default();
        let con = mock_connector(conf.clone());

        con.connect().unwrap();
        con.disconnect();

        assert!(!con.is_connected());
        assert!(conf.closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_drop_closes_session() {
        let conf = MockConfig::default();
        let con = mock_connector(conf.clone());

        con.connect().unwrap();
        drop(con);

        assert!(conf.closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_execute_returns_table() {
        let con = mock_connector(MockConfig::default());

        let result = con.execute("SELECT 1").unwrap();

        assert_eq!(
            result,
            QueryResult::Table(TableData::new(
                vec![("num".to_string(), DataType::Int64)],
                vec![vec![DataValue::Int64(1)]],
            ))
        );
    }

    #[test]
    fn test_execute_acknowledges_rowless_statements() {
        let con = mock_connector(MockConfig::default());

        assert_eq!(
            con.execute("CREATE TABLE dummy (x INT)").unwrap(),
            QueryResult::Acknowledged
        );
        assert_eq!(
            con.execute("SELECT nothing").unwrap(),
            QueryResult::Acknowledged
        );
    }

    #[test]
    fn test_execute_releases_locally_opened_session() {
        let conf = MockConfig::default();
        let con = mock_connector(conf.clone());

        con.execute("SELECT 1").unwrap();

        assert!(!con.is_connected());
        assert!(conf.closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_execute_keeps_caller_held_session_open() {
        let con = mock_connector(MockConfig::default());

        con.connect().unwrap();
        con.execute("SELECT 1").unwrap();

        assert!(con.is_connected());
    }

    #[test]
    fn test_execute_query_failure_is_in_band() {
        let conf = MockConfig::default();
        let con = mock_connector(conf.clone());

        let result = con.execute("SELECT * FROM nonexistent_table").unwrap();

        match result {
            QueryResult::Failed { message } => {
                assert!(message.contains("nonexistent_table"))
            }
            other => panic!("expected failed result, got {:?}", other),
        }
        // the locally opened session is released even on statement failure
        assert!(!con.is_connected());
    }

    #[test]
    fn test_execute_query_failure_message_keeps_cause_chain() {
        let con = mock_connector(MockConfig::default());

        let result = con.execute("SELECT * FROM nonexistent_table").unwrap();

        match result {
            QueryResult::Failed { message } => {
                assert!(message.contains("Failed to prepare statement"));
                assert!(message.contains("relation \"nonexistent_table\" does not exist"));
            }
            other => panic!("expected failed result, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_query_failure_keeps_caller_held_session() {
        let con = mock_connector(MockConfig::default());

        con.connect().unwrap();
        con.execute("SELECT * FROM nonexistent_table").unwrap();

        assert!(con.is_connected());
    }

    #[test]
    fn test_execute_connect_failure_is_raised() {
        let conf = MockConfig {
            fail_dial: true,
            ..Default::default()
        };
        let con = mock_connector(conf);

        let err = con.execute("SELECT 1").unwrap_err();

        assert!(ConnectorError::is_connection(&err));
        assert!(!con.is_connected());
    }

    #[test]
    fn test_query_renders_through_seam() {
        struct FixedQuery;

        impl RenderSql for FixedQuery {
            fn render_sql(&self) -> Result<String> {
                Ok("SELECT 1".to_string())
            }
        }

        let con = mock_connector(MockConfig::default());

        let result = con.query(&FixedQuery).unwrap();

        assert!(result.is_table());
    }

    #[test]
    fn test_check_connection_success() {
        let conf = MockConfig::default();
        let con = mock_connector(conf.clone());

        let report = con.check_connection();

        assert_eq!(report, StatusReport::ok());
        assert!(!con.is_connected());
        assert_eq!(conf.dials.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_check_connection_failure_is_swallowed() {
        let conf = MockConfig {
            fail_dial: true,
            ..Default::default()
        };
        let con = mock_connector(conf);

        let report = con.check_connection();

        assert!(!report.success);
        assert!(report
            .error_message
            .unwrap()
            .contains("mock dial refused"));
        assert!(!con.is_connected());
    }

    #[test]
    fn test_check_connection_never_leaves_session_open() {
        let con = mock_connector(MockConfig::default());

        con.connect().unwrap();
        con.check_connection();

        assert!(!con.is_connected());
    }

    #[test]
    fn test_list_tables_renames_first_column() {
        let conf = MockConfig {
            tables: Some(TableData::new(
                vec![
                    ("tab_name".to_string(), DataType::Utf8String),
                    ("owner".to_string(), DataType::Utf8String),
                ],
                vec![vec![
                    DataValue::Utf8String("orders".to_string()),
                    DataValue::Utf8String("admin".to_string()),
                ]],
            )),
            ..Default::default()
        };
        let con = mock_connector(conf);

        let table = con.list_tables().unwrap().into_table().unwrap();

        assert_eq!(table.col_names(), vec![TABLE_NAME_COL, "owner"]);
        assert_eq!(
            table.rows,
            vec![vec![
                DataValue::Utf8String("orders".to_string()),
                DataValue::Utf8String("admin".to_string()),
            ]]
        );
    }

    #[test]
    fn test_list_tables_passes_through_acknowledged() {
        // no tables configured: the listing command yields no rows
        let con = mock_connector(MockConfig::default());

        assert_eq!(con.list_tables().unwrap(), QueryResult::Acknowledged);
    }

    #[test]
    fn test_list_tables_passes_through_failed() {
        let conf = MockConfig {
            fail_tables: true,
            ..Default::default()
        };
        let con = mock_connector(conf);

        match con.list_tables().unwrap() {
            QueryResult::Failed { message } => assert!(message.contains("listing not supported")),
            other => panic!("expected failed result, got {:?}", other),
        }
    }

    #[test]
    fn test_list_columns_interpolates_table_name() {
        let conf = MockConfig::default();
        let con = mock_connector(conf.clone());

        let result = con.list_columns("orders").unwrap();

        assert_eq!(result, QueryResult::Acknowledged);
        assert_eq!(
            conf.executed.lock().unwrap().as_slice(),
            &["DESCRIBE orders".to_string()]
        );
    }
}
