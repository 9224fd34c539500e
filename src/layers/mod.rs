pub mod base;
pub mod macros;
pub mod wms;
