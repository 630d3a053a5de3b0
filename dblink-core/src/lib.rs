// Core types shared across the dblink workspace:
// error handling, the scalar data model and config parsing

pub mod config;
pub mod data;
pub mod err;
