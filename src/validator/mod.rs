//! ORD metadata document validator.
//!
//! [`validate_metadata`] makes one linear pass over a document:
//!
//! 1. **Structure**: object check, `openResourceDiscoveryVersion`, empty document.
//! 2. **Per collection**: required fields, field rules and nested checks for
//!    every record, driven by the [`schema::SCHEMAS`] tables.
//! 3. **Cross references**: duplicate `ordId`s and unresolved references.
//! 4. **Finalization**: `valid` is set from the error list.
//!
//! Problems with the data are findings, never errors. A shape the validator
//! cannot walk (a collection that is not an array, a record that is not an
//! object) stops the pass with one `internal` error; everything collected
//! until then is kept.

pub mod result;
pub mod rules;
pub mod schema;

use serde_json::{Map, Value};
use std::collections::HashSet;

pub use result::{
    json_type_name, Finding, FindingKind, Severity, ValidationLevel, ValidationResult,
};
use rules::{apply_rule, Pattern};
use schema::{Cardinality, NestedCheck, ResourceSchema, RESOURCE_DEFINITION_TYPES, SCHEMAS};

const VERSION_FIELD: &str = "openResourceDiscoveryVersion";

/// A value whose shape the validator cannot walk.
#[derive(Debug)]
struct ShapeFault {
    context: String,
    expected: &'static str,
    found: &'static str,
}

type Walk = std::result::Result<(), ShapeFault>;

/// Validate `document` and return every finding.
pub fn validate_metadata(document: &Value, level: ValidationLevel) -> ValidationResult {
    let mut result = ValidationResult::new(level);

    if let Err(fault) = walk_document(document, level, &mut result) {
        tracing::debug!(context = %fault.context, "validation stopped on shape fault");
        result.push(
            Finding::new(
                FindingKind::Internal,
                Severity::Error,
                format!(
                    "Validation stopped: expected {} at {}, found {}",
                    fault.expected, fault.context, fault.found
                ),
            )
            .with_context(fault.context),
        );
    }

    result.finalize()
}

fn walk_document(document: &Value, level: ValidationLevel, out: &mut ValidationResult) -> Walk {
    let Some(doc) = document.as_object() else {
        out.push(
            Finding::new(
                FindingKind::Structure,
                Severity::Error,
                format!(
                    "Metadata document must be a JSON object, got {}",
                    json_type_name(document)
                ),
            )
            .with_context("document"),
        );
        return Ok(());
    };

    check_structure(doc, out);

    for schema in SCHEMAS {
        for (index, record) in records(doc, schema)?.into_iter().enumerate() {
            let context = format!("{}[{}]", schema.collection, index);
            let record = as_object(record, &context)?;
            check_record(schema, record, &context, level, out)?;
        }
    }

    check_cross_references(doc, out)?;
    Ok(())
}

// ============ Phase 1: structure ============

fn check_structure(doc: &Map<String, Value>, out: &mut ValidationResult) {
    match doc.get(VERSION_FIELD) {
        None | Some(Value::Null) => out.push(
            Finding::new(
                FindingKind::Structure,
                Severity::Error,
                format!("Missing required field: {}", VERSION_FIELD),
            )
            .with_context("document")
            .with_property(VERSION_FIELD),
        ),
        Some(value) => {
            let ok = value
                .as_str()
                .map(|v| Pattern::SemanticVersion.is_match(v))
                .unwrap_or(false);
            if !ok {
                out.push(
                    Finding::new(
                        FindingKind::InvalidFormat,
                        Severity::Error,
                        format!(
                            "{} must match the pattern {}",
                            VERSION_FIELD,
                            Pattern::SemanticVersion.describe()
                        ),
                    )
                    .with_context("document")
                    .with_property(VERSION_FIELD)
                    .with_value(value.clone()),
                );
            }
        }
    }

    let has_members = SCHEMAS.iter().any(|s| match doc.get(s.collection) {
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    });
    if !has_members {
        out.push(
            Finding::new(
                FindingKind::Structure,
                Severity::Warning,
                format!(
                    "Document does not declare any resources ({})",
                    schema::collection_names().join(", ")
                ),
            )
            .with_context("document"),
        );
    }
}

// ============ Phase 2: per-record checks ============

fn check_record(
    schema: &ResourceSchema,
    record: &Map<String, Value>,
    context: &str,
    level: ValidationLevel,
    out: &mut ValidationResult,
) -> Walk {
    for field in schema.required {
        if present(record, field).is_none() {
            out.push(
                Finding::new(
                    FindingKind::MissingField,
                    Severity::Error,
                    format!("{} is missing required field: {}", schema.label, field),
                )
                .with_context(context)
                .with_property(*field),
            );
        }
    }

    for (field, rule) in schema.rules {
        if let Some(value) = present(record, field) {
            if let Err(violation) = apply_rule(field, value, rule) {
                out.push(
                    Finding::new(violation.kind, Severity::Error, violation.message)
                        .with_context(context)
                        .with_property(*field)
                        .with_value(value.clone()),
                );
            }
        }
    }

    for check in schema.nested {
        match check {
            NestedCheck::EntryPoints => check_entry_points(schema, record, context, out)?,
            NestedCheck::ResourceDefinitions => {
                check_resource_definitions(record, context, out)?
            }
            NestedCheck::CredentialStrategies => check_credential_strategies(record, context, out),
            NestedCheck::BundleMembers => check_bundle_members(record, context, out)?,
        }
    }

    if level.is_strict() {
        if schema.suggest_description && present(record, "description").is_none() {
            out.push(
                Finding::new(
                    FindingKind::BestPractice,
                    Severity::Suggestion,
                    format!(
                        "Consider adding a description to this {} for better discoverability",
                        schema.label
                    ),
                )
                .with_context(context)
                .with_property("description"),
            );
        }
        if schema.checks(NestedCheck::ResourceDefinitions)
            && present(record, "resourceDefinitions").is_none()
        {
            out.push(
                Finding::new(
                    FindingKind::BestPractice,
                    Severity::Suggestion,
                    format!(
                        "Consider adding resourceDefinitions (e.g. OpenAPI, EDMX, AsyncAPI) to this {}",
                        schema.label
                    ),
                )
                .with_context(context)
                .with_property("resourceDefinitions"),
            );
        }
    }

    Ok(())
}

fn check_entry_points(
    schema: &ResourceSchema,
    record: &Map<String, Value>,
    context: &str,
    out: &mut ValidationResult,
) -> Walk {
    let Some(value) = present(record, "entryPoints") else {
        return Ok(());
    };
    let entry_points = as_array(value, &format!("{}.entryPoints", context))?;

    if entry_points.is_empty() && schema.requires("entryPoints") {
        out.push(
            Finding::new(
                FindingKind::MissingField,
                Severity::Error,
                format!("{} must declare at least one entry point", schema.label),
            )
            .with_context(context)
            .with_property("entryPoints"),
        );
    }

    for (index, entry) in entry_points.iter().enumerate() {
        let entry_context = format!("{}.entryPoints[{}]", context, index);
        let Some(entry) = entry.as_object() else {
            out.push(
                Finding::new(
                    FindingKind::InvalidValue,
                    Severity::Error,
                    "Entry point must be an object with type and url",
                )
                .with_context(entry_context)
                .with_property("entryPoints")
                .with_value(entry.clone()),
            );
            continue;
        };
        for field in ["type", "url"] {
            if non_empty_str(entry, field).is_none() {
                out.push(
                    Finding::new(
                        FindingKind::MissingField,
                        Severity::Error,
                        format!("Entry point is missing required field: {}", field),
                    )
                    .with_context(entry_context.clone())
                    .with_property(field),
                );
            }
        }
    }

    Ok(())
}

fn check_resource_definitions(
    record: &Map<String, Value>,
    context: &str,
    out: &mut ValidationResult,
) -> Walk {
    let Some(value) = present(record, "resourceDefinitions") else {
        return Ok(());
    };
    let definitions = as_array(value, &format!("{}.resourceDefinitions", context))?;

    for (index, definition) in definitions.iter().enumerate() {
        let def_context = format!("{}.resourceDefinitions[{}]", context, index);
        let Some(definition) = definition.as_object() else {
            out.push(
                Finding::new(
                    FindingKind::InvalidValue,
                    Severity::Error,
                    "Resource definition must be an object",
                )
                .with_context(def_context)
                .with_property("resourceDefinitions")
                .with_value(definition.clone()),
            );
            continue;
        };

        for field in ["type", "mediaType"] {
            if non_empty_str(definition, field).is_none() {
                out.push(
                    Finding::new(
                        FindingKind::MissingField,
                        Severity::Error,
                        format!("Resource definition is missing required field: {}", field),
                    )
                    .with_context(def_context.clone())
                    .with_property(field),
                );
            }
        }

        if present(definition, "url").is_none() && present(definition, "content").is_none() {
            out.push(
                Finding::new(
                    FindingKind::MissingField,
                    Severity::Error,
                    "Resource definition must provide either url or inline content",
                )
                .with_context(def_context.clone())
                .with_property("url"),
            );
        }

        if let Some(kind) = non_empty_str(definition, "type") {
            if !RESOURCE_DEFINITION_TYPES.contains(&kind) {
                out.push(
                    Finding::new(
                        FindingKind::InvalidValue,
                        Severity::Warning,
                        format!(
                            "Unknown resource definition type '{}'; known types: {}",
                            kind,
                            RESOURCE_DEFINITION_TYPES.join(", ")
                        ),
                    )
                    .with_context(def_context)
                    .with_property("type")
                    .with_value(Value::String(kind.to_string())),
                );
            }
        }
    }

    Ok(())
}

fn check_credential_strategies(
    record: &Map<String, Value>,
    context: &str,
    out: &mut ValidationResult,
) {
    // Absence is already reported as a missing required field.
    let Some(value) = present(record, "credentialExchangeStrategies") else {
        return;
    };

    let strategies = match value.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => {
            out.push(
                Finding::new(
                    FindingKind::InvalidValue,
                    Severity::Error,
                    "credentialExchangeStrategies must be a non-empty array",
                )
                .with_context(context)
                .with_property("credentialExchangeStrategies")
                .with_value(value.clone()),
            );
            return;
        }
    };

    for (index, strategy) in strategies.iter().enumerate() {
        let strategy_context = format!("{}.credentialExchangeStrategies[{}]", context, index);
        let Some(strategy) = strategy.as_object() else {
            out.push(
                Finding::new(
                    FindingKind::InvalidValue,
                    Severity::Error,
                    "Credential exchange strategy must be an object",
                )
                .with_context(strategy_context)
                .with_value(strategy.clone()),
            );
            continue;
        };

        match non_empty_str(strategy, "type") {
            None => out.push(
                Finding::new(
                    FindingKind::MissingField,
                    Severity::Error,
                    "Credential exchange strategy is missing required field: type",
                )
                .with_context(strategy_context)
                .with_property("type"),
            ),
            Some("oauth2") if non_empty_str(strategy, "callbackUrl").is_none() => out.push(
                Finding::new(
                    FindingKind::MissingField,
                    Severity::Error,
                    "OAuth2 credential exchange strategy requires a callbackUrl",
                )
                .with_context(strategy_context)
                .with_property("callbackUrl"),
            ),
            Some(_) => {}
        }
    }
}

fn check_bundle_members(
    record: &Map<String, Value>,
    context: &str,
    out: &mut ValidationResult,
) -> Walk {
    let mut member_count = 0;

    for field in ["apiResources", "eventResources"] {
        let Some(value) = present(record, field) else {
            continue;
        };
        let members = as_array(value, &format!("{}.{}", context, field))?;
        member_count += members.len();

        for (index, member) in members.iter().enumerate() {
            if member_ord_id(member).is_none() {
                out.push(
                    Finding::new(
                        FindingKind::InvalidValue,
                        Severity::Error,
                        format!(
                            "{} entries must be ORD ID strings or objects with an ordId",
                            field
                        ),
                    )
                    .with_context(format!("{}.{}[{}]", context, field, index))
                    .with_property(field)
                    .with_value(member.clone()),
                );
            }
        }
    }

    if member_count == 0 {
        out.push(
            Finding::new(
                FindingKind::CrossReference,
                Severity::Warning,
                "Consumption bundle does not reference any API or Event resources",
            )
            .with_context(context),
        );
    }

    Ok(())
}

// ============ Phase 3: cross references ============

fn check_cross_references(doc: &Map<String, Value>, out: &mut ValidationResult) -> Walk {
    let mut declared: HashSet<&str> = HashSet::new();

    for schema in SCHEMAS {
        for (index, record) in records(doc, schema)?.into_iter().enumerate() {
            let Some(ord_id) = record.get("ordId").and_then(Value::as_str) else {
                continue;
            };
            if ord_id.is_empty() {
                continue;
            }
            if !declared.insert(ord_id) {
                out.push(
                    Finding::new(
                        FindingKind::CrossReference,
                        Severity::Error,
                        format!("Duplicate ORD ID: {}", ord_id),
                    )
                    .with_context(format!("{}[{}]", schema.collection, index))
                    .with_property("ordId")
                    .with_value(Value::String(ord_id.to_string())),
                );
            }
        }
    }

    for schema in SCHEMAS {
        if schema.references.is_empty() {
            continue;
        }
        for (index, record) in records(doc, schema)?.into_iter().enumerate() {
            let context = format!("{}[{}]", schema.collection, index);
            for reference in schema.references {
                let Some(value) = present_value(record, reference.field) else {
                    continue;
                };
                let targets: Vec<&str> = match reference.cardinality {
                    Cardinality::One => value.as_str().into_iter().collect(),
                    Cardinality::Many => value
                        .as_array()
                        .map(|items| items.iter().filter_map(member_ord_id).collect())
                        .unwrap_or_default(),
                };
                for target in targets {
                    if target.is_empty() || declared.contains(target) {
                        continue;
                    }
                    out.push(
                        Finding::new(
                            FindingKind::CrossReference,
                            reference.severity,
                            format!(
                                "{} references unknown {}: {}",
                                schema.label, reference.target, target
                            ),
                        )
                        .with_context(context.clone())
                        .with_property(reference.field)
                        .with_value(Value::String(target.to_string())),
                    );
                }
            }
        }
    }

    Ok(())
}

// ============ Helpers ============

/// Records of one collection; absent or null collections have none.
fn records<'a>(
    doc: &'a Map<String, Value>,
    schema: &ResourceSchema,
) -> Result<Vec<&'a Value>, ShapeFault> {
    match doc.get(schema.collection) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => Ok(as_array(value, schema.collection)?.iter().collect()),
    }
}

fn as_array<'a>(value: &'a Value, context: &str) -> Result<&'a Vec<Value>, ShapeFault> {
    value.as_array().ok_or_else(|| ShapeFault {
        context: context.to_string(),
        expected: "an array",
        found: json_type_name(value),
    })
}

fn as_object<'a>(value: &'a Value, context: &str) -> Result<&'a Map<String, Value>, ShapeFault> {
    value.as_object().ok_or_else(|| ShapeFault {
        context: context.to_string(),
        expected: "an object",
        found: json_type_name(value),
    })
}

/// A field counts as present unless it is absent or `null`.
fn present<'a>(record: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    record.get(field).filter(|v| !v.is_null())
}

fn present_value<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    record.get(field).filter(|v| !v.is_null())
}

fn non_empty_str<'a>(record: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// A bundle member is either `"ordId"` or `{ "ordId": "..." }`.
fn member_ord_id(member: &Value) -> Option<&str> {
    match member {
        Value::String(id) => Some(id.as_str()),
        Value::Object(obj) => obj.get("ordId").and_then(Value::as_str),
        _ => None,
    }
}
