//! Ordered line-level rewrites applied to compiled Flow output
//!
//! Each rule is a whole-document, line-anchored regex replace. The order is
//! load-bearing: the default-import rule carries the broadest pattern and has
//! to run after the require-form rule has claimed its lines, and relative
//! import re-rooting runs last so it only sees normalized `import type`
//! lines. Every rule matches only its un-rewritten shape, so re-running the
//! chain never double-prefixes a line.

use std::path::Path;

use log::trace;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::resolver::ModuleResolver;

/// `import x = require("y");` → `import type * as x from "y"`.
/// Flow declaration files have no require form.
static IMPORT_REQUIRE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*import\s+(\S+)\s*=\s*require\((.*)\);?\s*$").expect("valid regex")
});

/// `import x from "y";` → `import type * as x from "y";`. All value-level
/// imports become type-only namespace imports; the output has no runtime.
static IMPORT_DEFAULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*import\s+([A-Za-z_$][\w$]*)\s+from\s+(.*)\s*;?\s*$")
        .expect("valid regex")
});

/// `import * as x from "y";` → `import type * as x from "y";`.
static IMPORT_STAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*import\s*\*\s*as\s+(\S+)\s+from\s+(.*)\s*;?\s*$").expect("valid regex")
});

/// `import { x } from "y";` → `import type { x } from "y";`.
static IMPORT_NAMED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*import\s*\{(.*)\}\s*from\s+(.*)\s*;?\s*$").expect("valid regex")
});

/// `export type`/`export interface` → `declare export ...`; inside a
/// `declare module` block exports must be explicitly declared.
static EXPORT_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\s*)export\s+(type|interface)\b").expect("valid regex"));

/// Any remaining import-from line; rule 6 decides per match whether the
/// target gets re-rooted.
static IMPORT_FROM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(.*)\s+from\s+["'](.*)["']\s*;?\s*$"#).expect("valid regex")
});

/// Matches a dot-slash fragment anywhere in the specifier. Deliberately
/// permissive: a bare specifier that merely contains a dot (`lodash.merge`)
/// is treated as relative too. Tightening this changes which imports get
/// re-rooted, so the behavior is kept as is.
static RELATIVE_SPECIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\.?/?").expect("valid regex"));

/// One line-anchored pattern replace over the whole document.
struct Rewrite {
    name: &'static str,
    pattern: &'static Lazy<Regex>,
    replacement: &'static str,
}

/// Rules 1-5, in required order. Rule 6 (relative-import re-rooting) needs
/// the resolver and the current file's path, so it runs as an explicit final
/// step in [`apply_rewrites`].
static REWRITES: &[Rewrite] = &[
    Rewrite {
        name: "require-import",
        pattern: &IMPORT_REQUIRE_RE,
        replacement: "import type * as $1 from $2",
    },
    Rewrite {
        name: "default-import",
        pattern: &IMPORT_DEFAULT_RE,
        replacement: "import type * as $1 from $2",
    },
    Rewrite {
        name: "namespace-import",
        pattern: &IMPORT_STAR_RE,
        replacement: "import type * as $1 from $2",
    },
    Rewrite {
        name: "named-import",
        pattern: &IMPORT_NAMED_RE,
        replacement: "import type {$1} from $2",
    },
    Rewrite {
        name: "export-declaration",
        pattern: &EXPORT_TYPE_RE,
        replacement: "${1}declare export $2",
    },
];

/// Whether an import target should be re-rooted onto a package-relative
/// module name.
fn is_relative_specifier(specifier: &str) -> bool {
    RELATIVE_SPECIFIER_RE.is_match(specifier)
}

/// Rewrite every relative import target in `content` to the fully-qualified
/// module name of the file it points at. Bare specifiers are left
/// byte-for-byte untouched.
fn rewrite_relative_imports(
    content: &str,
    output_path: &Path,
    resolver: &ModuleResolver,
) -> String {
    IMPORT_FROM_RE
        .replace_all(content, |caps: &Captures<'_>| {
            let import_path = &caps[2];
            if is_relative_specifier(import_path) {
                let module_name = resolver.resolve_import(output_path, import_path);
                format!("import {} from \"{module_name}\";", caps[1].trim())
            } else {
                caps[0].to_owned()
            }
        })
        .into_owned()
}

/// Run the full rewrite chain over one compiled, formatted file.
pub fn apply_rewrites(content: &str, output_path: &Path, resolver: &ModuleResolver) -> String {
    let mut state = content.to_owned();
    for rewrite in REWRITES {
        if rewrite.pattern.is_match(&state) {
            trace!(
                "applied {} rewrite in {}",
                rewrite.name,
                output_path.display()
            );
            state = rewrite
                .pattern
                .replace_all(&state, rewrite.replacement)
                .into_owned();
        }
    }
    rewrite_relative_imports(&state, output_path, resolver)
}
