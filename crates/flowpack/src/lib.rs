//! Convert a TypeScript `@types` package into Flow module declarations.
//!
//! Each `.d.ts` file is compiled to Flow syntax by an external compiler,
//! normalized by an external formatter, rewritten line-by-line into
//! declaration-file friendly Flow, wrapped in a named `declare module` block,
//! and finally concatenated into a single FlowTyped-ready bundle.

pub mod combine;
pub mod config;
pub mod dirs;
pub mod external;
pub mod module_wrapper;
pub mod orchestrator;
pub mod resolver;
pub mod transformations;
