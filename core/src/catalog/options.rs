use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Flag,
    Number,
    Text,
    Select,
}

impl OptionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Number => "number",
            Self::Text => "text",
            Self::Select => "select",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectChoice {
    pub value: String,
    pub label: String,
}

/// A typed, named parameter that maps onto one long-form command flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub key: String,

    #[serde(default)]
    pub label: String,

    pub flag: String,

    pub kind: OptionKind,

    /// Explicit default for `select` options. Only used for display.
    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub choices: Vec<SelectChoice>,
}

/// Value a user assigned to an advanced option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl OptionValue {
    /// `false` and empty text never reach the composed command.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s.trim()),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl OptionSpec {
    /// Parse user text into a value of this option's kind.
    pub fn parse_value(&self, raw: &str) -> Result<OptionValue, StateError> {
        let raw = raw.trim();
        let invalid = |reason: String| StateError::InvalidOptionValue {
            key: self.key.clone(),
            reason,
        };
        if raw.is_empty() {
            return Ok(self.blank_value());
        }
        match self.kind {
            OptionKind::Flag => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(OptionValue::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(OptionValue::Bool(false)),
                other => Err(invalid(format!("'{other}' is not a boolean"))),
            },
            OptionKind::Number => {
                if let Ok(n) = raw.parse::<i64>() {
                    return Ok(OptionValue::Number(n.into()));
                }
                raw.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(OptionValue::Number)
                    .ok_or_else(|| invalid(format!("'{raw}' is not a number")))
            }
            OptionKind::Select => {
                if self.choices.iter().any(|c| c.value == raw) {
                    Ok(OptionValue::Text(raw.to_string()))
                } else {
                    let allowed: Vec<&str> = self.choices.iter().map(|c| c.value.as_str()).collect();
                    Err(invalid(format!(
                        "'{raw}' is not one of [{}]",
                        allowed.join(", ")
                    )))
                }
            }
            OptionKind::Text => Ok(OptionValue::Text(raw.to_string())),
        }
    }

    /// The value an empty assignment stands for. It never reaches the composed command.
    pub fn blank_value(&self) -> OptionValue {
        match self.kind {
            OptionKind::Flag => OptionValue::Bool(false),
            _ => OptionValue::Text(String::new()),
        }
    }

    /// Reject values whose type does not match this option's kind.
    pub fn check_value(&self, value: &OptionValue) -> Result<(), StateError> {
        let ok = match (self.kind, value) {
            (OptionKind::Flag, OptionValue::Bool(_)) => true,
            (OptionKind::Number, OptionValue::Number(_)) => true,
            (OptionKind::Text, OptionValue::Text(_)) => true,
            (OptionKind::Select, OptionValue::Text(v)) => {
                v.trim().is_empty() || self.choices.iter().any(|c| c.value == v.trim())
            }
            (_, OptionValue::Text(v)) => v.trim().is_empty(),
            _ => false,
        };
        if ok {
            return Ok(());
        }
        Err(StateError::InvalidOptionValue {
            key: self.key.clone(),
            reason: format!("{value:?} does not fit a {} option", self.kind.as_str()),
        })
    }

    /// Value shown to the user: the assigned value, or the explicit default of a select.
    pub fn display_value(&self, values: Option<&TaskValues>) -> Option<OptionValue> {
        if let Some(v) = values.and_then(|vals| vals.get(&self.key)) {
            return Some(v.clone());
        }
        match self.kind {
            OptionKind::Select => self.default.clone().map(OptionValue::Text),
            _ => None,
        }
    }

    /// Command fragment for `value` (without leading space), or `None` when nothing is emitted.
    pub fn render_arg(&self, value: &OptionValue) -> Option<String> {
        if value.is_blank() {
            return None;
        }
        match (self.kind, value) {
            (OptionKind::Flag, OptionValue::Bool(true)) => Some(self.flag.clone()),
            (OptionKind::Flag, _) => None,
            (_, v) => Some(format!("{} {}", self.flag, v)),
        }
    }
}

/// Option key -> value for one task. Only keys the user touched are present.
pub type TaskValues = HashMap<String, OptionValue>;

/// Advanced option values for every task, keyed by task id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancedValues {
    #[serde(flatten)]
    tasks: HashMap<String, TaskValues>,
}

impl AdvancedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_task(&self, task_id: &str) -> Option<&TaskValues> {
        self.tasks.get(task_id)
    }

    pub fn get(&self, task_id: &str, key: &str) -> Option<&OptionValue> {
        self.tasks.get(task_id).and_then(|vals| vals.get(key))
    }

    pub fn set(&mut self, task_id: &str, key: &str, value: OptionValue) {
        self.tasks
            .entry(task_id.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn remove(&mut self, task_id: &str, key: &str) -> Option<OptionValue> {
        let vals = self.tasks.get_mut(task_id)?;
        let removed = vals.remove(key);
        if vals.is_empty() {
            self.tasks.remove(task_id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: OptionKind) -> OptionSpec {
        OptionSpec {
            key: "k".to_string(),
            label: String::new(),
            flag: "--k".to_string(),
            kind,
            default: None,
            choices: vec![],
        }
    }

    fn select() -> OptionSpec {
        OptionSpec {
            default: Some("1".to_string()),
            choices: vec![
                SelectChoice {
                    value: "0".to_string(),
                    label: "normal".to_string(),
                },
                SelectChoice {
                    value: "1".to_string(),
                    label: "raid".to_string(),
                },
            ],
            ..spec(OptionKind::Select)
        }
    }

    #[test]
    fn test_parse_flag_values() {
        let s = spec(OptionKind::Flag);
        assert_eq!(s.parse_value("yes").unwrap(), OptionValue::Bool(true));
        assert_eq!(s.parse_value("").unwrap(), OptionValue::Bool(false));
        assert_eq!(s.parse_value("  ").unwrap(), OptionValue::Bool(false));
        assert_eq!(s.parse_value("0").unwrap(), OptionValue::Bool(false));
        assert!(s.parse_value("maybe").is_err());
    }

    #[test]
    fn test_parse_number_keeps_integers_integral() {
        let s = spec(OptionKind::Number);
        let v = s.parse_value(" 3 ").unwrap();
        assert_eq!(v.to_string(), "3");
        assert_eq!(s.parse_value("1.5").unwrap().to_string(), "1.5");
        assert!(s.parse_value("three").is_err());
    }

    #[test]
    fn test_parse_select_requires_declared_choice() {
        let s = select();
        assert_eq!(s.parse_value("0").unwrap(), OptionValue::Text("0".into()));
        let err = s.parse_value("7").unwrap_err();
        assert!(err.to_string().contains("[0, 1]"));
    }

    #[test]
    fn test_empty_assignment_is_never_rendered() {
        for option in [
            spec(OptionKind::Flag),
            spec(OptionKind::Number),
            spec(OptionKind::Text),
            select(),
        ] {
            let value = option.parse_value("").unwrap();
            assert!(value.is_blank(), "{:?}", option.kind);
            assert_eq!(option.render_arg(&value), None);
            option.check_value(&value).unwrap();
        }
    }

    #[test]
    fn test_check_value_rejects_mismatched_kinds() {
        assert!(spec(OptionKind::Number)
            .check_value(&OptionValue::Bool(true))
            .is_err());
        assert!(spec(OptionKind::Flag)
            .check_value(&OptionValue::Text("yes".into()))
            .is_err());
        assert!(select().check_value(&OptionValue::Text("7".into())).is_err());
        assert!(select().check_value(&OptionValue::from(1_i64)).is_err());

        spec(OptionKind::Number)
            .check_value(&OptionValue::from(3_i64))
            .unwrap();
        select().check_value(&OptionValue::Text("0".into())).unwrap();
        spec(OptionKind::Text)
            .check_value(&OptionValue::Text("squad".into()))
            .unwrap();
    }

    #[test]
    fn test_display_value_uses_explicit_default() {
        let s = select();
        assert_eq!(s.display_value(None), Some(OptionValue::Text("1".into())));
        let mut vals = TaskValues::new();
        vals.insert("k".to_string(), OptionValue::Text("0".into()));
        assert_eq!(s.display_value(Some(&vals)), Some(OptionValue::Text("0".into())));
        assert_eq!(spec(OptionKind::Number).display_value(None), None);
    }

    #[test]
    fn test_render_arg() {
        let flag = spec(OptionKind::Flag);
        assert_eq!(flag.render_arg(&true.into()).as_deref(), Some("--k"));
        assert_eq!(flag.render_arg(&false.into()), None);
        assert_eq!(flag.render_arg(&"true".into()), None);

        let num = spec(OptionKind::Number);
        assert_eq!(num.render_arg(&5.into()).as_deref(), Some("--k 5"));

        let text = spec(OptionKind::Text);
        assert_eq!(text.render_arg(&"  ".into()), None);
        assert_eq!(text.render_arg(&" abc ".into()).as_deref(), Some("--k abc"));
    }

    #[test]
    fn test_advanced_values_remove_prunes_empty_task() {
        let mut values = AdvancedValues::new();
        values.set("fight", "times", 3.into());
        assert_eq!(values.get("fight", "times"), Some(&OptionValue::from(3)));
        assert_eq!(values.remove("fight", "times"), Some(OptionValue::from(3)));
        assert!(values.for_task("fight").is_none());
        assert_eq!(values.remove("fight", "times"), None);
    }

    #[test]
    fn test_option_value_untagged_json() {
        let v: OptionValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, OptionValue::Bool(true));
        let v: OptionValue = serde_json::from_str("4").unwrap();
        assert_eq!(v, OptionValue::from(4));
        let v: OptionValue = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(v, OptionValue::from("x"));
    }
}
