use chrono::NaiveDateTime;
use jni::objects::{GlobalRef, JObject, JValue};
use jni::JNIEnv;

use dblink_connectors_base::interface::{DriverBridge, Session, TableData};
use dblink_core::data::{DataType, DataValue};
use dblink_core::err::{ConnectorError, Context, Result};
use dblink_logging::{info, warn};

use crate::{from_jdbc_type, prepare_driver, JdbcConnectionConfig, Jvm};

/// The driver bridge for databases reached through a vendor JDBC driver
pub struct JdbcBridge;

impl DriverBridge for JdbcBridge {
    type TConfig = JdbcConnectionConfig;
    type TSession = JdbcSession;

    const TYPE: &'static str = "jdbc";

    fn establish(conf: &JdbcConnectionConfig) -> Result<JdbcSession> {
        let artifacts = prepare_driver(conf)?;
        info!(
            "Loading {} driver artifacts from {}",
            artifacts.paths().len(),
            conf.driver_path.display()
        );

        let jvm = Jvm::boot(&artifacts)
            .map_err(|err| ConnectorError::ConnectionFailed(format!("{:#}", err)))?;

        let connection = Self::dial(&jvm, conf)
            .map_err(|err| ConnectorError::ConnectionFailed(format!("{:#}", err)))?;

        Ok(JdbcSession {
            jvm,
            connection: Some(connection),
        })
    }
}

impl JdbcBridge {
    /// Dials the remote database via java.sql.DriverManager
    fn dial(jvm: &Jvm, conf: &JdbcConnectionConfig) -> Result<GlobalRef> {
        jvm.with_local_frame(32, |env| {
            // Loading the driver class registers it with DriverManager
            let class_name = env.new_string(&conf.driver_class_name)?;
            let loaded = env.call_static_method(
                "java/lang/Class",
                "forName",
                "(Ljava/lang/String;)Ljava/lang/Class;",
                &[JValue::Object(*class_name)],
            );
            jvm.check_exceptions(env)?;
            loaded.context("Failed to load driver class")?;

            let props = env
                .new_object("java/util/Properties", "()V", &[])
                .context("Failed to create java properties")?;

            for (key, val) in conf.auth_props() {
                let set = env.call_method(
                    props,
                    "setProperty",
                    "(Ljava/lang/String;Ljava/lang/String;)Ljava/lang/Object;",
                    &[
                        JValue::Object(env.auto_local(env.new_string(key)?).as_obj()),
                        JValue::Object(env.auto_local(env.new_string(val)?).as_obj()),
                    ],
                );
                jvm.check_exceptions(env)?;
                set.context("Failed to set property")?;
            }

            let url = env.new_string(&conf.connection_string)?;
            let connection = env.call_static_method(
                "java/sql/DriverManager",
                "getConnection",
                "(Ljava/lang/String;Ljava/util/Properties;)Ljava/sql/Connection;",
                &[JValue::Object(*url), JValue::Object(props)],
            );
            jvm.check_exceptions(env)?;
            let connection = connection
                .context("Failed to invoke DriverManager::getConnection")?
                .l()
                .context("Failed to convert Connection into object")?;

            let connection = env.new_global_ref(connection)?;

            Ok(connection)
        })
    }
}

/// A live session against a JDBC connection held by the in-process JVM
pub struct JdbcSession {
    jvm: Jvm,
    connection: Option<GlobalRef>,
}

impl Session for JdbcSession {
    fn execute(&mut self, sql: &str) -> Result<Option<TableData>> {
        let connection = self
            .connection
            .clone()
            .context("Session has been closed")?;

        self.jvm.with_local_frame(32, |env| {
            let statement = env.call_method(
                connection.as_obj(),
                "createStatement",
                "()Ljava/sql/Statement;",
                &[],
            );
            self.jvm.check_exceptions(env)?;
            let statement = statement
                .context("Failed to invoke Connection::createStatement")?
                .l()
                .context("Failed to convert Statement into object")?;

            // the statement is released on every exit path
            let result = Self::run_statement(&self.jvm, env, statement, sql);

            let closed = env.call_method(statement, "close", "()V", &[]);
            if let Err(err) = self
                .jvm
                .check_exceptions(env)
                .and_then(|_| closed.context("Failed to invoke Statement::close"))
            {
                warn!("Failed to close JDBC statement: {:?}", err);
            }

            result
        })
    }

    fn close(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            let env = self.jvm.env()?;
            let closed = env.call_method(connection.as_obj(), "close", "()V", &[]);
            self.jvm.check_exceptions(&env)?;
            closed.context("Failed to invoke Connection::close")?;
        }

        Ok(())
    }
}

impl JdbcSession {
    fn run_statement(
        jvm: &Jvm,
        env: &JNIEnv,
        statement: JObject,
        sql: &str,
    ) -> Result<Option<TableData>> {
        let sql_str = env.new_string(sql)?;
        let has_results = env.call_method(
            statement,
            "execute",
            "(Ljava/lang/String;)Z",
            &[JValue::Object(*sql_str)],
        );
        jvm.check_exceptions(env)?;
        let has_results = has_results
            .context("Failed to invoke Statement::execute")?
            .z()
            .context("Failed to convert Statement::execute return value")?;

        if !has_results {
            return Ok(None);
        }

        let result_set = env.call_method(statement, "getResultSet", "()Ljava/sql/ResultSet;", &[]);
        jvm.check_exceptions(env)?;
        let result_set = result_set
            .context("Failed to invoke Statement::getResultSet")?
            .l()
            .context("Failed to convert ResultSet into object")?;

        let cols = Self::read_structure(jvm, env, result_set)?;
        let rows = Self::read_rows(jvm, env, result_set, &cols)?;

        Ok(Some(TableData::new(cols, rows)))
    }

    /// Reads the column names and reported types from the result set metadata
    fn read_structure(
        jvm: &Jvm,
        env: &JNIEnv,
        result_set: JObject,
    ) -> Result<Vec<(String, DataType)>> {
        let metadata = env.call_method(
            result_set,
            "getMetaData",
            "()Ljava/sql/ResultSetMetaData;",
            &[],
        );
        jvm.check_exceptions(env)?;
        let metadata = metadata
            .context("Failed to invoke ResultSet::getMetaData")?
            .l()
            .context("Failed to convert ResultSetMetaData into object")?;

        let col_count = env.call_method(metadata, "getColumnCount", "()I", &[]);
        jvm.check_exceptions(env)?;
        let col_count = col_count
            .context("Failed to invoke ResultSetMetaData::getColumnCount")?
            .i()
            .context("Failed to convert column count")?;

        let mut cols = vec![];
        for idx in 1..=col_count {
            let name = env.call_method(
                metadata,
                "getColumnLabel",
                "(I)Ljava/lang/String;",
                &[JValue::Int(idx)],
            );
            jvm.check_exceptions(env)?;
            let name = env.auto_local(
                name.context("Failed to invoke ResultSetMetaData::getColumnLabel")?
                    .l()
                    .context("Failed to convert column label into object")?,
            );
            let name: String = env
                .get_string(name.as_obj().into())
                .context("Failed to read column label")?
                .into();

            let type_id = env.call_method(
                metadata,
                "getColumnType",
                "(I)I",
                &[JValue::Int(idx)],
            );
            jvm.check_exceptions(env)?;
            let type_id = type_id
                .context("Failed to invoke ResultSetMetaData::getColumnType")?
                .i()
                .context("Failed to convert column type id")?;

            cols.push((name, from_jdbc_type(type_id)));
        }

        Ok(cols)
    }

    /// Fetches all rows of the result set
    fn read_rows(
        jvm: &Jvm,
        env: &JNIEnv,
        result_set: JObject,
        cols: &[(String, DataType)],
    ) -> Result<Vec<Vec<DataValue>>> {
        let mut rows = vec![];

        loop {
            let more = env.call_method(result_set, "next", "()Z", &[]);
            jvm.check_exceptions(env)?;
            let more = more
                .context("Failed to invoke ResultSet::next")?
                .z()
                .context("Failed to convert ResultSet::next return value")?;

            if !more {
                break;
            }

            let mut row = vec![];
            for (idx, (_, r#type)) in cols.iter().enumerate() {
                row.push(Self::read_cell(jvm, env, result_set, (idx + 1) as i32, r#type)?);
            }

            rows.push(row);
        }

        Ok(rows)
    }

    /// Reads a single cell of the current row
    fn read_cell(
        jvm: &Jvm,
        env: &JNIEnv,
        result_set: JObject,
        idx: i32,
        r#type: &DataType,
    ) -> Result<DataValue> {
        let val = match r#type {
            DataType::Boolean => {
                let val = env.call_method(result_set, "getBoolean", "(I)Z", &[JValue::Int(idx)]);
                jvm.check_exceptions(env)?;
                DataValue::Boolean(
                    val.context("Failed to invoke ResultSet::getBoolean")?
                        .z()
                        .context("Failed to convert boolean cell")?,
                )
            }
            DataType::Int64 => {
                let val = env.call_method(result_set, "getLong", "(I)J", &[JValue::Int(idx)]);
                jvm.check_exceptions(env)?;
                DataValue::Int64(
                    val.context("Failed to invoke ResultSet::getLong")?
                        .j()
                        .context("Failed to convert integer cell")?,
                )
            }
            DataType::Float64 => {
                let val = env.call_method(result_set, "getDouble", "(I)D", &[JValue::Int(idx)]);
                jvm.check_exceptions(env)?;
                DataValue::Float64(
                    val.context("Failed to invoke ResultSet::getDouble")?
                        .d()
                        .context("Failed to convert float cell")?,
                )
            }
            DataType::Binary => {
                let val = env.call_method(result_set, "getBytes", "(I)[B", &[JValue::Int(idx)]);
                jvm.check_exceptions(env)?;
                let obj = env.auto_local(
                    val.context("Failed to invoke ResultSet::getBytes")?
                        .l()
                        .context("Failed to convert binary cell into object")?,
                );

                if obj.as_obj().is_null() {
                    DataValue::Null
                } else {
                    DataValue::Binary(
                        env.convert_byte_array(obj.as_obj().into_inner())
                            .context("Failed to read binary cell")?,
                    )
                }
            }
            // Timestamps and everything else come through the driver's
            // string rendering
            _ => {
                let val = env.call_method(
                    result_set,
                    "getString",
                    "(I)Ljava/lang/String;",
                    &[JValue::Int(idx)],
                );
                jvm.check_exceptions(env)?;
                let obj = env.auto_local(
                    val.context("Failed to invoke ResultSet::getString")?
                        .l()
                        .context("Failed to convert string cell into object")?,
                );

                if obj.as_obj().is_null() {
                    DataValue::Null
                } else {
                    let text: String = env
                        .get_string(obj.as_obj().into())
                        .context("Failed to read string cell")?
                        .into();

                    match r#type {
                        DataType::DateTime => {
                            // java.sql.Timestamp renders as "yyyy-mm-dd hh:mm:ss.f"
                            NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
                                .map(DataValue::DateTime)
                                .unwrap_or(DataValue::Utf8String(text))
                        }
                        _ => DataValue::Utf8String(text),
                    }
                }
            }
        };

        if val.is_null() {
            return Ok(val);
        }

        // Primitive getters render SQL NULL as zero values
        let was_null = env.call_method(result_set, "wasNull", "()Z", &[]);
        jvm.check_exceptions(env)?;
        let was_null = was_null
            .context("Failed to invoke ResultSet::wasNull")?
            .z()
            .context("Failed to convert ResultSet::wasNull return value")?;

        Ok(if was_null { DataValue::Null } else { val })
    }
}

impl Drop for JdbcSession {
    fn drop(&mut self) {
        if self.connection.is_some() {
            if let Err(err) = Session::close(self) {
                warn!("Failed to close JDBC connection: {:?}", err);
            }
        }
    }
}
