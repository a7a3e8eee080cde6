//! Input readers - extract the API surface from Java sources.
//!
//! [`runner`] recovers the script-visible entry points, [`api`] collects the
//! exposed members of every API class. Both walk trees produced by
//! [`java::parse_java`].

pub mod api;
pub mod java;
pub mod runner;

pub use api::{ApiScan, ExposureMarkers, collect_declaration, collect_declarations};
pub use java::{decode_string_literal, parse_java};
pub use runner::{RunnerPattern, extract_entry_points};
