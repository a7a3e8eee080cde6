//! TypeScript declarations for the PHONK scripting bridge.
//!
//! `phonk-typegen` reads a PHONK checkout and produces a `.d.ts`-style
//! description of everything scripts can reach: the objects the runner
//! registers into the interpreter and the annotated members of every API
//! class.
//!
//! # Architecture
//!
//! ```text
//! Java sources                 IR                     Output
//! ────────────────        ──────────────        ─────────────────────
//! AppRunner.java  ─────>  EntryPoints   ─┐
//!                                        ├─>  declare class ... { }
//! api/**/*.java   ─────>  Declarations  ─┘    export var ...: ...;
//!          (tree-sitter)   (ir.rs)             (output/typescript.rs)
//! ```
//!
//! # Example
//!
//! ```
//! use phonk_typegen::{input, output};
//!
//! let (name, decl) = input::collect_declaration(
//!     "class PApp { @PhonkMethod void run(String... args) {} }",
//!     &Default::default(),
//! )
//! .unwrap();
//!
//! let mut decls = phonk_typegen::ir::Declarations::new();
//! decls.insert(name, decl);
//!
//! let ts = output::generate_typescript(&decls, &Default::default(), &Default::default()).unwrap();
//! assert!(ts.contains("run(...args: string[]): void;"));
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod ir;
pub mod output;

pub use config::TypegenConfig;
pub use error::{Error, Result};
pub use input::{collect_declarations, extract_entry_points};
pub use ir::{Declaration, Declarations, EntryPoints, TypeExpr};
pub use output::{TypeRenderer, generate_typescript};

use std::path::Path;
use tracing::info;

/// Result of a full run over a checkout.
#[derive(Debug, Clone)]
pub struct Generation {
    pub entries: EntryPoints,
    pub declarations: Declarations,
    /// The emitted TypeScript.
    pub output: String,
}

/// Extract, collect and emit for the checkout at `root`.
pub fn generate(root: &Path, config: &TypegenConfig) -> Result<Generation> {
    let runner_path = config.runner_path(root);
    info!(path = %runner_path.display(), "reading runner");
    let source = std::fs::read_to_string(&runner_path).map_err(|source| Error::Io {
        path: runner_path.clone(),
        source,
    })?;
    let entries =
        extract_entry_points(&source, &config.runner.pattern()).map_err(|e| e.at(&runner_path))?;
    info!(count = entries.len(), "extracted entry points");

    let declarations = collect_declarations(&config.api_scan(root))?;

    let output = generate_typescript(&declarations, &entries, &config.renderer())?;

    Ok(Generation {
        entries,
        declarations,
        output,
    })
}
