pub mod config;
pub mod derive;
pub mod error;
pub mod export;
pub mod merge;
pub mod months;
pub mod pipeline;
pub mod report;
pub mod summary;
pub mod wide_table;

pub use chi_parser::schema;
