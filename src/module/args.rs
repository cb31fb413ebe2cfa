//! Raw Ansible module arguments and the type coercions Ansible applies to them.

use crate::core::error::{Result, UvPipError};
use crate::core::expand_path;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

const ARGS_WRAPPER_KEY: &str = "ANSIBLE_MODULE_ARGS";
const INTERNAL_PREFIX: &str = "_ansible_";

const TRUTHY: [&str; 7] = ["y", "yes", "on", "1", "true", "t", "1.0"];
const FALSY: [&str; 7] = ["n", "no", "off", "0", "false", "f", "0.0"];

/// Arguments handed over by the Ansible controller, split into user
/// parameters and the controller's `_ansible_*` settings.
#[derive(Debug, Clone, Default)]
pub struct ModuleArgs {
    params: Map<String, Value>,
    internal: Map<String, Value>,
}

impl ModuleArgs {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| UvPipError::ArgsFile(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| UvPipError::ArgsFile(format!("invalid JSON: {}", e)))?;

        let Value::Object(mut object) = value else {
            return Err(UvPipError::ArgsFile(
                "module arguments must be a JSON object".to_string(),
            ));
        };

        if let Some(wrapped) = object.remove(ARGS_WRAPPER_KEY) {
            let Value::Object(inner) = wrapped else {
                return Err(UvPipError::ArgsFile(format!(
                    "{} must be a JSON object",
                    ARGS_WRAPPER_KEY
                )));
            };
            object = inner;
        }

        Ok(Self::from_map(object))
    }

    pub fn from_map(object: Map<String, Value>) -> Self {
        let (internal, params) = object
            .into_iter()
            .partition(|(key, _)| key.starts_with(INTERNAL_PREFIX));
        Self { params, internal }
    }

    pub fn check_mode(&self) -> bool {
        self.internal_flag("check_mode")
    }

    pub fn set_check_mode(&mut self, enabled: bool) {
        self.internal
            .insert(format!("{}check_mode", INTERNAL_PREFIX), Value::Bool(enabled));
    }

    pub fn no_log(&self) -> bool {
        self.internal_flag("no_log")
    }

    fn internal_flag(&self, name: &str) -> bool {
        self.internal
            .get(&format!("{}{}", INTERNAL_PREFIX, name))
            .map(|v| coerce_bool(v).unwrap_or(false))
            .unwrap_or(false)
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// A parameter counts as provided when present and not null.
    pub fn provided(&self, key: &str) -> bool {
        self.params.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn ensure_supported(&self, module: &str, known: &[&str]) -> Result<()> {
        let mut unsupported: Vec<&str> = self
            .params
            .keys()
            .map(String::as_str)
            .filter(|key| !known.contains(key))
            .collect();

        if unsupported.is_empty() {
            return Ok(());
        }

        unsupported.sort_unstable();
        let mut supported = known.to_vec();
        supported.sort_unstable();
        Err(UvPipError::validation(format!(
            "Unsupported parameters for ({}) module: {}. Supported parameters include: {}.",
            module,
            unsupported.join(", "),
            supported.join(", ")
        )))
    }

    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        match self.params.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => scalar_to_string(value)
                .map(Some)
                .ok_or_else(|| type_error(key, value, "str")),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.params.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => coerce_bool(value).ok_or_else(|| type_error(key, value, "bool")),
        }
    }

    /// `list` with `elements: str`: a JSON array of scalars, or a comma separated string.
    pub fn get_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.params.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| scalar_to_string(item).ok_or_else(|| type_error(key, item, "str")))
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(Value::String(s)) => Ok(Some(s.split(',').map(str::to_string).collect())),
            Some(value @ (Value::Number(_) | Value::Bool(_))) => {
                Ok(scalar_to_string(value).map(|s| vec![s]))
            }
            Some(value) => Err(type_error(key, value, "list")),
        }
    }

    pub fn get_path(&self, key: &str) -> Result<Option<PathBuf>> {
        self.get_str(key)?
            .map(|raw| expand_path(&raw))
            .transpose()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(_) | Value::Number(_) => {
            let text = scalar_to_string(value)?.to_lowercase();
            if TRUTHY.contains(&text.as_str()) {
                Some(true)
            } else if FALSY.contains(&text.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn type_error(key: &str, value: &Value, expected: &str) -> UvPipError {
    UvPipError::validation(format!(
        "argument '{}' is of type {} and we were unable to convert to {}",
        key,
        json_type_name(value),
        expected
    ))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_keys_are_split_out() {
        let args = ModuleArgs::from_json(
            r#"{"name": "bottle", "_ansible_check_mode": true, "_ansible_verbosity": 3}"#,
        )
        .unwrap();

        assert!(args.check_mode());
        assert_eq!(args.params().len(), 1);
        assert!(args.ensure_supported("pip", &["name"]).is_ok());
    }

    #[test]
    fn accepts_test_module_wrapper() {
        let args = ModuleArgs::from_json(
            r#"{"ANSIBLE_MODULE_ARGS": {"name": ["six"], "_ansible_check_mode": "yes"}}"#,
        )
        .unwrap();

        assert!(args.check_mode());
        assert_eq!(args.get_list("name").unwrap(), Some(vec!["six".to_string()]));
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(matches!(
            ModuleArgs::from_json("[1, 2]"),
            Err(UvPipError::ArgsFile(_))
        ));
        assert!(matches!(
            ModuleArgs::from_json("{not json"),
            Err(UvPipError::ArgsFile(_))
        ));
    }

    #[test]
    fn string_lists_split_on_commas() {
        let args = ModuleArgs::from_json(r#"{"name": "django>1.11.0,<1.12.0"}"#).unwrap();
        assert_eq!(
            args.get_list("name").unwrap(),
            Some(vec!["django>1.11.0".to_string(), "<1.12.0".to_string()])
        );
    }

    #[test]
    fn bools_follow_ansible_spelling() {
        let args = ModuleArgs::from_json(
            r#"{"a": "yes", "b": "False", "c": 0, "d": "maybe", "e": true}"#,
        )
        .unwrap();

        assert!(args.get_bool("a", false).unwrap());
        assert!(!args.get_bool("b", true).unwrap());
        assert!(!args.get_bool("c", true).unwrap());
        assert!(args.get_bool("e", false).unwrap());
        assert!(args.get_bool("missing", true).unwrap());

        let err = args.get_bool("d", false).unwrap_err().to_string();
        assert!(err.contains("argument 'd' is of type str"));
    }

    #[test]
    fn scalars_stringify() {
        let args = ModuleArgs::from_json(r#"{"version": 2.5, "umask": 22, "x": {"a": 1}}"#).unwrap();
        assert_eq!(args.get_str("version").unwrap(), Some("2.5".to_string()));
        assert_eq!(args.get_str("umask").unwrap(), Some("22".to_string()));
        assert!(args.get_str("x").is_err());
    }

    #[test]
    fn null_is_not_provided() {
        let args = ModuleArgs::from_json(r#"{"executable": null, "virtualenv": "/v"}"#).unwrap();
        assert!(!args.provided("executable"));
        assert!(args.provided("virtualenv"));
        assert_eq!(args.get_str("executable").unwrap(), None);
    }

    #[test]
    fn unknown_parameters_are_listed() {
        let args = ModuleArgs::from_json(r#"{"name": "x", "zeta": 1, "alpha": 2}"#).unwrap();
        let err = args
            .ensure_supported("pip", &["name", "state"])
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("Unsupported parameters for (pip) module: alpha, zeta."));
    }
}
