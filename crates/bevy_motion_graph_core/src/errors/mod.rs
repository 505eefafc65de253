mod construction_error;
mod traversal_error;

pub use construction_error::*;
pub use traversal_error::*;
