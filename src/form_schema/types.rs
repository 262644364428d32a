//! # Form Schema Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{FormSchemaError, FormSchemaResult};

/// Longest accepted version name
pub const MAX_NAME_LEN: usize = 200;

/// One stored version of the application form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchemaVersion {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Form definition document; opaque to this service
    pub schema: Value,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content of a new version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFormSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_schema")]
    pub schema: Value,
}

fn empty_schema() -> Value {
    Value::Object(Default::default())
}

impl NewFormSchema {
    /// Version with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            schema: empty_schema(),
        }
    }

    pub(crate) fn validate(&self) -> FormSchemaResult<()> {
        validate_name(&self.name)
    }
}

/// Partial content update. Has no active flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchemaPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Option<Value>,
}

impl FormSchemaPatch {
    pub(crate) fn validate(&self) -> FormSchemaResult<()> {
        match &self.name {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }

    pub(crate) fn apply_to(self, version: &mut FormSchemaVersion) {
        if let Some(name) = self.name {
            version.name = name;
        }
        if let Some(description) = self.description {
            version.description = description;
        }
        if let Some(schema) = self.schema {
            version.schema = schema;
        }
    }
}

fn validate_name(name: &str) -> FormSchemaResult<()> {
    if name.trim().is_empty() {
        return Err(FormSchemaError::Validation("name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(FormSchemaError::Validation(format!(
            "name longer than {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_schema_defaults() {
        let parsed: NewFormSchema = serde_json::from_value(json!({"name": "v1"})).unwrap();
        assert_eq!(parsed, NewFormSchema::named("v1"));
        assert!(parsed.schema.is_object());
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(matches!(
            NewFormSchema::named("   ").validate(),
            Err(FormSchemaError::Validation(_))
        ));
        let patch = FormSchemaPatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_long_name_rejected() {
        let at_limit = "x".repeat(MAX_NAME_LEN);
        assert!(NewFormSchema::named(at_limit.as_str()).validate().is_ok());

        let too_long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            NewFormSchema::named(too_long.as_str()).validate(),
            Err(FormSchemaError::Validation(_))
        ));
    }

    #[test]
    fn test_patch_ignores_active_field() {
        let patch: FormSchemaPatch =
            serde_json::from_value(json!({"description": "d", "active": true})).unwrap();

        let mut version = FormSchemaVersion {
            id: 1,
            name: "v1".into(),
            description: String::new(),
            schema: json!({}),
            active: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        patch.apply_to(&mut version);

        assert_eq!(version.description, "d");
        assert!(!version.active);
        assert_eq!(version.name, "v1");
    }
}
