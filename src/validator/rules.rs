//! Per-field rule descriptors and the single function that applies them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::result::{json_type_name, FindingKind};

static ORD_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]+(?:\.[a-zA-Z0-9]+)*:[a-zA-Z]+:[a-zA-Z0-9._\-]+:v\d+$")
        .expect("ORD ID pattern compiles")
});

static VENDOR_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]+(?:\.[a-zA-Z0-9]+)*:vendor:[a-zA-Z0-9._\-]+:(?:v\d+)?$")
        .expect("vendor reference pattern compiles")
});

static SEMVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("version pattern compiles"));

/// Named patterns a field can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    OrdId,
    VendorReference,
    SemanticVersion,
}

impl Pattern {
    pub fn regex(self) -> &'static Regex {
        match self {
            Pattern::OrdId => &ORD_ID,
            Pattern::VendorReference => &VENDOR_REFERENCE,
            Pattern::SemanticVersion => &SEMVER,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Pattern::OrdId => "namespace:type:localId:v<major> (e.g. sap.foo:apiResource:orders:v1)",
            Pattern::VendorReference => "namespace:vendor:localId:[v<major>] (e.g. sap:vendor:SAP:v1)",
            Pattern::SemanticVersion => "<major>.<minor>.<patch> (e.g. 1.9.0)",
        }
    }

    pub fn is_match(self, value: &str) -> bool {
        self.regex().is_match(value)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    Pattern(Pattern),
    Length { min: usize, max: usize },
    OneOf(&'static [&'static str]),
}

/// Why a value failed its rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleViolation {
    pub kind: FindingKind,
    pub message: String,
}

impl RuleViolation {
    fn format(message: String) -> Self {
        Self {
            kind: FindingKind::InvalidFormat,
            message,
        }
    }

    fn value(message: String) -> Self {
        Self {
            kind: FindingKind::InvalidValue,
            message,
        }
    }
}

/// Check `value` of `field` against `rule`. All rules apply to strings.
pub fn apply_rule(field: &str, value: &Value, rule: &FieldRule) -> Result<(), RuleViolation> {
    let Some(text) = value.as_str() else {
        return Err(RuleViolation::value(format!(
            "{} must be a string, got {}",
            field,
            json_type_name(value)
        )));
    };

    match rule {
        FieldRule::Pattern(pattern) => {
            if pattern.is_match(text) {
                Ok(())
            } else {
                Err(RuleViolation::format(format!(
                    "{} '{}' does not match the required pattern {}",
                    field,
                    text,
                    pattern.describe()
                )))
            }
        }
        FieldRule::Length { min, max } => {
            let len = text.chars().count();
            if len > *max {
                Err(RuleViolation::format(format!(
                    "{} is too long ({} characters, maximum {})",
                    field, len, max
                )))
            } else if len < *min {
                Err(RuleViolation::format(format!(
                    "{} is too short ({} characters, minimum {})",
                    field, len, min
                )))
            } else {
                Ok(())
            }
        }
        FieldRule::OneOf(allowed) => {
            if allowed.contains(&text) {
                Ok(())
            } else {
                Err(RuleViolation::value(format!(
                    "{} '{}' is not one of: {}",
                    field,
                    text,
                    allowed.join(", ")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ord_id_pattern() {
        assert!(Pattern::OrdId.is_match("sap.foo:apiResource:orders:v1"));
        assert!(Pattern::OrdId.is_match("v:vendor:acme:v12"));
        assert!(!Pattern::OrdId.is_match("not-a-valid-id"));
        assert!(!Pattern::OrdId.is_match("sap:product:S4:1"));
        assert!(!Pattern::OrdId.is_match("sap:product:S4:v1:extra"));
    }

    #[test]
    fn test_vendor_reference_pattern() {
        assert!(Pattern::VendorReference.is_match("sap:vendor:SAP:"));
        assert!(Pattern::VendorReference.is_match("v:vendor:acme:v1"));
        assert!(!Pattern::VendorReference.is_match("sap:product:SAP:v1"));
    }

    #[test]
    fn test_distinct_messages() {
        let pattern = apply_rule("ordId", &json!("bad"), &FieldRule::Pattern(Pattern::OrdId))
            .unwrap_err();
        assert!(pattern.message.contains("required pattern"));
        assert_eq!(pattern.kind, FindingKind::InvalidFormat);

        let length = FieldRule::Length { min: 1, max: 5 };
        let long = apply_rule("title", &json!("abcdef"), &length).unwrap_err();
        assert!(long.message.contains("too long"));
        let short = apply_rule("title", &json!(""), &length).unwrap_err();
        assert!(short.message.contains("too short"));

        let choice = apply_rule("apiProtocol", &json!("ftp"), &FieldRule::OneOf(&["rest"]))
            .unwrap_err();
        assert!(choice.message.contains("is not one of: rest"));
        assert_eq!(choice.kind, FindingKind::InvalidValue);

        let typed = apply_rule("title", &json!(3), &length).unwrap_err();
        assert!(typed.message.contains("must be a string, got number"));
    }

    #[test]
    fn test_length_counts_characters() {
        let rule = FieldRule::Length { min: 1, max: 3 };
        assert!(apply_rule("title", &json!("äöü"), &rule).is_ok());
    }
}
