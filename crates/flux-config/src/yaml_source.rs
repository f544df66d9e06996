//! YAML rule files.
//!
//! ```yaml
//! H:
//!   inputFileName: H
//!   variableName: H
//!   minMax: [-200, 800]
//!   dependent: [USTAR]
//! ```

use serde_yaml::Value;

use crate::error::{ConfigError, ConfigLoadError, Result};
use crate::schema::{RawSection, RawValue, SectionResult};

pub(crate) fn read_sections(text: &str) -> Result<Vec<SectionResult>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let document: Value =
        serde_yaml::from_str(text).map_err(|source| ConfigLoadError::Yaml { source })?;
    let mapping = match document {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(ConfigLoadError::layout(
                "top level must be a mapping of rule sections",
            ));
        }
    };

    Ok(mapping
        .into_iter()
        .map(|(name, body)| read_section(&name, body))
        .collect())
}

fn read_section(name: &Value, body: Value) -> SectionResult {
    let Some(name) = scalar_text(name) else {
        return Err(malformed(
            render(name),
            "section name must be a scalar".to_string(),
        ));
    };
    let name = name.trim().to_string();
    let Value::Mapping(entries) = body else {
        return Err(malformed(name, "expected a mapping of keys".to_string()));
    };
    let mut section = RawSection::new(&name);
    for (key, value) in entries {
        let Some(key) = scalar_text(&key) else {
            return Err(malformed(name, format!("non-scalar key {}", render(&key))));
        };
        match value {
            Value::Null => {}
            Value::Sequence(items) => {
                let mut texts = Vec::with_capacity(items.len());
                for item in &items {
                    let Some(text) = scalar_text(item) else {
                        return Err(malformed(
                            name,
                            format!("'{key}' has a non-scalar item {}", render(item)),
                        ));
                    };
                    texts.push(text);
                }
                section.push(key, RawValue::List(texts));
            }
            other => match scalar_text(&other) {
                Some(text) => section.push(key, RawValue::Text(text)),
                None => {
                    return Err(malformed(
                        name,
                        format!("'{key}' must be a scalar or a list"),
                    ));
                }
            },
        }
    }
    Ok(section)
}

fn malformed(section: String, reason: String) -> ConfigError {
    ConfigError::MalformedSection { section, reason }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "~".to_string(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim().replace('\n', " "))
            .unwrap_or_else(|_| "?".to_string()),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sequences_and_strings() {
        let text = "\
H:
  inputFileName: H
  variableName: H
  minMax: [-200, 800]
  dependent: [USTAR, TA]
TA:
  inputFileName: AirTC
  variableName: TA
  minMax: '[-40, 50]'
  dependent:
";
        let sections: Vec<RawSection> = read_sections(text)
            .unwrap()
            .into_iter()
            .map(|section| section.unwrap())
            .collect();
        assert_eq!(sections.len(), 2);
        assert_eq!(
            sections[0].entries[2].1,
            RawValue::List(vec!["-200".to_string(), "800".to_string()])
        );
        assert_eq!(
            sections[1].entries[2].1,
            RawValue::Text("[-40, 50]".to_string())
        );
        assert_eq!(sections[1].entries.len(), 3);
    }

    #[test]
    fn rejects_non_mapping_documents() {
        assert!(matches!(
            read_sections("- a\n- b\n"),
            Err(ConfigLoadError::Layout { .. })
        ));
        assert!(read_sections("").unwrap().is_empty());
    }

    #[test]
    fn malformed_sections_do_not_hide_their_neighbours() {
        let text = "\
TA: [1, 2]
RH: {inputFileName: RH, variableName: RH, minMax: [0, 100]}
WS:
  minMax: [~, 0, 30]
";
        let sections = read_sections(text).unwrap();
        assert_eq!(sections.len(), 3);
        assert!(matches!(
            &sections[0],
            Err(ConfigError::MalformedSection { section, .. }) if section == "TA"
        ));
        assert_eq!(sections[1].as_ref().unwrap().name, "RH");
        assert!(matches!(
            &sections[2],
            Err(ConfigError::MalformedSection { section, reason })
                if section == "WS" && reason.contains("minMax")
        ));
    }
}
