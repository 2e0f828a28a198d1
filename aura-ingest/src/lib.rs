//! aura-ingest: CSV upload parsing for the Aura analyzer.

pub mod csv_parser;

pub use csv_parser::{CsvSchema, ParseError, parse_csv};
