// Bridge for databases reached through a vendor JDBC driver.
// Driver artifacts are resolved from the filesystem at runtime and loaded
// into an in-process JVM which hosts the vendor driver.

mod conf;
pub use conf::*;
mod prepare;
pub use prepare::*;
mod resolver;
pub use resolver::*;

#[cfg(feature = "jvm")]
mod data;
#[cfg(feature = "jvm")]
pub use data::*;
#[cfg(feature = "jvm")]
mod jvm;
#[cfg(feature = "jvm")]
pub use jvm::*;
#[cfg(feature = "jvm")]
mod session;
#[cfg(feature = "jvm")]
pub use session::*;

/// Connector instance over the JDBC bridge
#[cfg(feature = "jvm")]
pub type JdbcConnector = dblink_connectors_base::Connector<JdbcBridge>;
