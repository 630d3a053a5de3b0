// Statically linked bridge for sqlite databases.
// Serves as the registry backend that dials its driver directly, without
// any runtime artifact loading.

mod conf;
pub use conf::*;
mod data;
pub use data::*;
mod session;
pub use session::*;

/// Connector instance over the sqlite bridge
pub type SqliteConnector = dblink_connectors_base::Connector<SqliteBridge>;
