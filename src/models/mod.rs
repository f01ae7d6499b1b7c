pub mod error_record;

pub use error_record::*;
