mod r#type;
mod value;

pub use r#type::*;
pub use value::*;

pub use chrono;
