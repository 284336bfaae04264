//! YAML front-matter separation.
//!
//! A block is recognised only when the document's first line is `---`. It ends
//! at the next line that is `---` or `...`. Everything after that line is the
//! body, trimmed of surrounding whitespace.

use serde_json::{Map, Value};
use tracing::debug;

use autodesc_shared::{AutoDescError, CONFIG_KEY, Result};

/// A document split into its front-matter fields and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    /// Top-level front-matter keys.
    pub fields: Map<String, Value>,
    /// Document body without the front-matter block, trimmed.
    pub body: String,
}

impl FrontMatter {
    /// The tool's settings sub-block, or an empty map when absent.
    pub fn settings(&self) -> Result<Map<String, Value>> {
        match self.fields.get(CONFIG_KEY) {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(AutoDescError::parse(format!(
                "front matter key `{CONFIG_KEY}` must be a mapping, found {}",
                value_kind(other)
            ))),
        }
    }
}

/// Split a raw document into front matter and body.
pub fn split(document: &str) -> Result<FrontMatter> {
    let text = document.strip_prefix('\u{feff}').unwrap_or(document);

    let Some((yaml, rest)) = locate_block(text) else {
        return Ok(FrontMatter {
            fields: Map::new(),
            body: text.trim().to_string(),
        });
    };

    let fields = parse_yaml(yaml)?;
    debug!(keys = fields.len(), "front matter parsed");

    Ok(FrontMatter {
        fields,
        body: rest.trim().to_string(),
    })
}

/// Find the YAML between the fences and the text after the closing fence.
fn locate_block(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');

    let first = lines.next()?;
    if line_content(first) != "---" {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;

    for line in lines {
        let content = line_content(line);
        if content == "---" || content == "..." {
            return Some((&text[yaml_start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

fn line_content(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r']).trim_end()
}

fn parse_yaml(yaml: &str) -> Result<Map<String, Value>> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }

    let parsed: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|e| AutoDescError::parse(format!("invalid front matter: {e}")))?;

    match parsed {
        serde_yaml::Value::Null => Ok(Map::new()),
        serde_yaml::Value::Mapping(_) => match serde_json::to_value(&parsed) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(AutoDescError::parse(format!(
                "front matter must be a mapping, found {}",
                value_kind(&other)
            ))),
            Err(e) => Err(AutoDescError::parse(format!(
                "front matter cannot be represented as JSON: {e}"
            ))),
        },
        _ => Err(AutoDescError::parse(
            "front matter must be a mapping of keys to values",
        )),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
