//! Composer manifest parsing
//!
//! Reads the parts of `composer.json` that the workspace cache tracks:
//! the `scripts` table and the `require` / `require-dev` dependency
//! tables. Nothing here validates version constraints or resolves
//! packages.

pub mod parser;

pub use parser::{parse_manifest, Dependency, Manifest, ParseError, MANIFEST_FILE};
