// Bridge-agnostic connector machinery.
// Each supported protocol implements the DriverBridge/Session traits and the
// generic Connector drives the session lifecycle, query execution and
// metadata normalization on top of them.

pub mod interface;

mod connector;
pub use connector::*;
