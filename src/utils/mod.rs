// URL handling utilities
pub mod url_parser;
pub mod url_builder;

// Parsing utilities
pub mod parse_flag;

// Input/output helpers for the command line
pub mod io;

// Re-export all utilities for convenient access
pub use url_parser::query_of;
pub use url_builder::with_query;
pub use parse_flag::parse_flag;
pub use io::{read_input, write_output};
