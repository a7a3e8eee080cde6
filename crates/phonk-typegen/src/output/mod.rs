//! Output writers for the collected API surface.

pub mod typescript;

pub use typescript::{BUILTIN_NAME_MAP, DeclarationWriter, TypeRenderer, generate_typescript};
