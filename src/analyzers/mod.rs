pub mod python;

pub use python::parse_source;
