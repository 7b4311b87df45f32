//! treeloc - schema-driven resource extraction and localization
//!
//! treeloc reads structured JSON documents, uses a JSON-Schema-like
//! description of each document type to find the localizable values in
//! them, and writes a localized copy of every document per target locale.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (arguments, commands, report output)
//! - `config`: Configuration file loading and parsing
//! - `core`: Schema registry, path mapping and the tree walker
//! - `issues`: Diagnostics produced while processing documents
//! - `utils`: Shared path helpers

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
