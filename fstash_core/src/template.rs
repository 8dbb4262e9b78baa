//! Template expansion of stash files.
//!
//! A file is rendered when its stem (file name minus the last extension)
//! has a non-blank entry in the template data. The entry is raw JSON text
//! that must decode to an object; its fields become the template context.
//! Lookup ignores the directory, so `a/config.yaml` and `b/config.toml`
//! share the `config` entry.
//!
//! Templates use Jinja syntax (`{{ port }}`, `{% if %}`, `{% for %}`).
//! Printing a missing field renders an empty string; looking up an
//! attribute of a missing field is a render error.

use crate::copy::{Content, CopyStats, copy_with};
use crate::error::{Error, Result};
use crate::tree::Tree;
use minijinja::{AutoEscape, Environment};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// File stem -> raw JSON object text.
pub type TemplateData = HashMap<String, String>;

/// Copy `tree` like [`crate::copy_tree`], rendering files that have template data.
pub fn expand_tree(
    tree: &Tree,
    src_root: &Path,
    dest_root: &Path,
    data: &TemplateData,
) -> Result<CopyStats> {
    copy_with(tree, src_root, dest_root, |src, content| {
        let Some(raw) = lookup(data, src) else {
            return Ok(Content::Verbatim(content));
        };
        let context = parse_data(src, raw)?;
        let rendered = render(src, content, &context)?;
        debug!(file = %src.display(), "rendered template");
        Ok(Content::Rendered(rendered))
    })
}

/// Template data for `file`, if present and not blank.
fn lookup<'a>(data: &'a TemplateData, file: &Path) -> Option<&'a str> {
    let stem = file.file_stem()?.to_str()?;
    data.get(stem)
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
}

/// Decode raw template data into a JSON object.
pub fn parse_data(file: &Path, raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::template_data(
            file,
            format!("expected a JSON object, got {}", json_type(&other)),
        )),
        Err(e) => Err(Error::template_data(file, e.to_string())),
    }
}

/// Render `source` against `context`.
pub fn render(file: &Path, source: Vec<u8>, context: &Map<String, Value>) -> Result<Vec<u8>> {
    let source = String::from_utf8(source)
        .map_err(|e| Error::template_syntax(file, format!("not valid UTF-8: {}", e)))?;

    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);

    let template = env
        .template_from_str(&source)
        .map_err(|e| Error::template_syntax(file, e.to_string()))?;
    let rendered = template
        .render(context)
        .map_err(|e| Error::template_render(file, e.to_string()))?;

    Ok(rendered.into_bytes())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
