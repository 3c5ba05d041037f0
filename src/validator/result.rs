//! Validation findings and the result container.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Standard,
    Strict,
}

impl ValidationLevel {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Standard
        }
    }

    pub fn is_strict(self) -> bool {
        self == Self::Strict
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

/// Category of a finding, serialized as its `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Structure,
    MissingField,
    InvalidFormat,
    InvalidValue,
    CrossReference,
    BestPractice,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub severity: Severity,
}

impl Finding {
    pub fn new(kind: FindingKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            context: None,
            property: None,
            message: message.into(),
            value: None,
            severity,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub suggestions: Vec<Finding>,
    pub timestamp: String,
    pub validation_level: ValidationLevel,
}

impl ValidationResult {
    pub(crate) fn new(level: ValidationLevel) -> Self {
        Self {
            valid: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            timestamp: Utc::now().to_rfc3339(),
            validation_level: level,
        }
    }

    /// Route a finding into the list matching its severity.
    pub(crate) fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
            Severity::Suggestion => self.suggestions.push(finding),
        }
    }

    pub(crate) fn finalize(mut self) -> Self {
        self.valid = self.errors.is_empty();
        self
    }

    pub fn finding_count(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.suggestions.len()
    }

    /// Human-readable report, one line per finding.
    pub fn report(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "{} ({} level): {} error(s), {} warning(s), {} suggestion(s)",
            if self.valid { "VALID" } else { "INVALID" },
            match self.validation_level {
                ValidationLevel::Standard => "standard",
                ValidationLevel::Strict => "strict",
            },
            self.errors.len(),
            self.warnings.len(),
            self.suggestions.len()
        ));
        for (label, findings) in [
            ("error", &self.errors),
            ("warning", &self.warnings),
            ("suggestion", &self.suggestions),
        ] {
            for f in findings {
                let mut line = format!("  [{}] ", label);
                if let Some(ctx) = &f.context {
                    line.push_str(ctx);
                    line.push_str(": ");
                }
                line.push_str(&f.message);
                lines.push(line);
            }
        }
        lines.join("\n")
    }
}

/// JSON type name of `value`, as used in findings and argument errors.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_routes_by_severity() {
        let mut result = ValidationResult::new(ValidationLevel::Standard);
        result.push(Finding::new(FindingKind::Structure, Severity::Warning, "w"));
        result.push(Finding::new(FindingKind::BestPractice, Severity::Suggestion, "s"));
        let result = result.finalize();
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.finding_count(), 2);
    }

    #[test]
    fn test_serialized_shape() {
        let mut result = ValidationResult::new(ValidationLevel::Strict);
        result.push(
            Finding::new(FindingKind::InvalidFormat, Severity::Error, "bad")
                .with_context("products[0]")
                .with_property("ordId")
                .with_value(json!("x")),
        );
        let value = serde_json::to_value(result.finalize()).unwrap();
        assert_eq!(value["valid"], json!(false));
        assert_eq!(value["validationLevel"], json!("strict"));
        assert_eq!(value["errors"][0]["type"], json!("invalid_format"));
        assert_eq!(value["errors"][0]["severity"], json!("error"));
        assert_eq!(value["errors"][0]["property"], json!("ordId"));
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(true)), "boolean");
        assert_eq!(json_type_name(&json!(1.5)), "number");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
