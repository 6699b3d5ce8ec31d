//! Wraps rewritten declaration bodies in named `declare module` blocks
//!
//! Wrapping is the last step for a file: every statement has to end up nested
//! inside the block, so it runs only after the whole rewrite chain.

/// Indentation applied to every non-empty line inside the block.
const BLOCK_INDENT: &str = "  ";

/// Prefix non-empty lines with the block indent. Empty lines stay empty so
/// no trailing whitespace is injected.
fn indent(content: &str) -> String {
    content
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                line.to_owned()
            } else {
                format!("{BLOCK_INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap one file's rewritten content in a `declare module` block, preceded by
/// a provenance comment naming the source package.
pub fn wrap_declare_module(content: &str, module_name: &str) -> String {
    format!(
        "// Generated from @types/{module_name} using flowpack\n\
         declare module \"{module_name}\" {{\n\
         {}\n\
         }}",
        indent(content)
    )
}
