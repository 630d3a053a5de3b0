use dblink_core::err::Result;

use crate::{DriverArtifactSet, JdbcConnectionConfig};

/// Validates the connection config and resolves the driver artifacts.
///
/// This is the local half of establishing a session: config validation runs
/// first, then the filesystem lookup. Neither the JVM nor the vendor driver
/// is touched, so configuration mistakes surface before any dial attempt.
pub fn prepare_driver(conf: &JdbcConnectionConfig) -> Result<DriverArtifactSet> {
    conf.validate()?;

    DriverArtifactSet::resolve(&conf.driver_path)
}
