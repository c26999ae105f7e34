// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::consts::VARIABLES_SECTION;
use crate::errors::ConfigError;
use crate::observability::messages::config::{
    ConfigurationPrecedence, ReadingConfiguration, VariableSubstituted,
};
use crate::observability::messages::StructuredLog;

/// Parameter overrides for attached modules, keyed by module name.
///
/// The document is a TOML table of tables. Every top-level table is named after
/// a module and holds parameter values that take precedence over the values
/// given when the module is attached. A `VARIABLES` table defines constants:
/// any string value elsewhere that equals a variable name is replaced by the
/// variable's value.
///
/// # Example
/// ```toml
/// [VARIABLES]
/// DETECTOR = "orca.detx"
///
/// [CalibrationService]
/// filename = "DETECTOR"
///
/// [Printer]
/// every = 100
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleConfiguration {
    sections: BTreeMap<String, Map<String, JsonValue>>,
}

impl ModuleConfiguration {
    /// Load a module configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        ReadingConfiguration { path }.log();
        ConfigurationPrecedence.log();

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table: toml::Table = content.parse().map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        Self::from_table(table)
    }

    /// Parse a module configuration document held in memory.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content
            .parse()
            .map_err(|source| ConfigError::Parse { path: None, source })?;
        Self::from_table(table)
    }

    fn from_table(mut table: toml::Table) -> Result<Self, ConfigError> {
        let variables = match table.remove(VARIABLES_SECTION) {
            Some(toml::Value::Table(variables)) => variables,
            Some(_) => {
                return Err(ConfigError::InvalidSection {
                    section: VARIABLES_SECTION.to_string(),
                })
            }
            None => toml::Table::new(),
        };

        let mut sections = BTreeMap::new();
        for (section, entries) in table {
            let toml::Value::Table(entries) = entries else {
                return Err(ConfigError::InvalidSection { section });
            };
            let mut parameters = Map::new();
            for (parameter, value) in entries {
                let substitute = match &value {
                    toml::Value::String(name) => variables
                        .get(name)
                        .map(|substitute| (name.clone(), substitute.clone())),
                    _ => None,
                };
                let value = match substitute {
                    Some((variable, substitute)) => {
                        VariableSubstituted {
                            section: &section,
                            parameter: &parameter,
                            variable: &variable,
                        }
                        .log();
                        substitute
                    }
                    None => value,
                };
                let Some(value) = to_json(value) else {
                    return Err(ConfigError::NonFiniteNumber { section, parameter });
                };
                parameters.insert(parameter, value);
            }
            sections.insert(section, parameters);
        }

        Ok(Self { sections })
    }

    /// Overrides for the module attached as `name`.
    pub fn section(&self, name: &str) -> Option<&Map<String, JsonValue>> {
        self.sections.get(name)
    }

    /// Module names that have a section, sorted.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// `None` when the value holds a float that JSON cannot represent (`nan`, `inf`).
fn to_json(value: toml::Value) -> Option<JsonValue> {
    let json = match value {
        toml::Value::String(s) => JsonValue::String(s),
        toml::Value::Integer(i) => JsonValue::from(i),
        toml::Value::Float(f) => JsonValue::Number(Number::from_f64(f)?),
        toml::Value::Boolean(b) => JsonValue::Bool(b),
        toml::Value::Datetime(dt) => JsonValue::String(dt.to_string()),
        toml::Value::Array(items) => {
            JsonValue::Array(items.into_iter().map(to_json).collect::<Option<_>>()?)
        }
        toml::Value::Table(table) => JsonValue::Object(
            table
                .into_iter()
                .map(|(key, value)| to_json(value).map(|value| (key, value)))
                .collect::<Option<_>>()?,
        ),
    };
    Some(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_module_sections() {
        let cfg = ModuleConfiguration::from_toml_str(
            r#"
[Stage]
b = "y"
every = 3

[Other]
threshold = 1.5
keys = ["a", "b"]
"#,
        )
        .unwrap();

        let stage = cfg.section("Stage").unwrap();
        assert_eq!(stage.get("b"), Some(&json!("y")));
        assert_eq!(stage.get("every"), Some(&json!(3)));
        let other = cfg.section("Other").unwrap();
        assert_eq!(other.get("threshold"), Some(&json!(1.5)));
        assert_eq!(other.get("keys"), Some(&json!(["a", "b"])));
        assert_eq!(cfg.module_names().collect::<Vec<_>>(), vec!["Other", "Stage"]);
    }

    #[test]
    fn substitutes_variables_by_value() {
        let cfg = ModuleConfiguration::from_toml_str(
            r#"
[VARIABLES]
DETECTOR = "orca.detx"
RUN = 42

[Calibration]
filename = "DETECTOR"
run = "RUN"
label = "unrelated"
"#,
        )
        .unwrap();

        let section = cfg.section("Calibration").unwrap();
        assert_eq!(section.get("filename"), Some(&json!("orca.detx")));
        assert_eq!(section.get("run"), Some(&json!(42)));
        assert_eq!(section.get("label"), Some(&json!("unrelated")));
        assert!(cfg.section("VARIABLES").is_none());
    }

    #[test]
    fn rejects_non_table_entries() {
        let err = ModuleConfiguration::from_toml_str("stray = 1").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSection { section } if section == "stray"));
    }

    #[test]
    fn rejects_invalid_toml() {
        let err = ModuleConfiguration::from_toml_str("[Stage\nb = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }

    #[test]
    fn rejects_non_finite_floats() {
        let err = ModuleConfiguration::from_toml_str("[Stage]\nthreshold = nan\n").unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::NonFiniteNumber { section, parameter }
                if section == "Stage" && parameter == "threshold"
        ));
        assert!(err.to_string().contains("finite"));

        let err = ModuleConfiguration::from_toml_str("[Stage]\nlimits = [1.0, inf]\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonFiniteNumber { parameter, .. } if parameter == "limits"
        ));

        let err = ModuleConfiguration::from_toml_str(
            "[VARIABLES]\nLIMIT = -inf\n\n[Stage]\nlimit = \"LIMIT\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonFiniteNumber { .. }));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "[Printer]\nprefix = \">> \"\n").unwrap();

        let cfg = ModuleConfiguration::from_path(&path).unwrap();
        assert_eq!(
            cfg.section("Printer").unwrap().get("prefix"),
            Some(&json!(">> "))
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModuleConfiguration::from_path(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
