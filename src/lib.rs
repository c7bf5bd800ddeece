pub mod brand;
pub mod config;
pub mod context;
pub mod csv;
pub mod extract;
pub mod logger;
pub mod page;
pub mod record;
pub mod table;

pub use extract::{extract, Extraction};
pub use record::CommercialRecord;
