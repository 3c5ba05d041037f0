//! ORD concept catalog and explainer.
//!
//! The catalog is a fixed table of hand-written entries, built once on first
//! access and never mutated. [`explain`] turns one entry into markdown:
//!
//! ````text
//! # ORD Concept: Product
//!
//! ## Description
//! ...
//!
//! ## Key Properties
//! - **ordId** (required): ...
//! - **description** (optional): ...
//!
//! ## Example
//! ```json
//! { ... }
//! ```
//! ````
//!
//! Lookup is exact after case folding; `"product"` and `"PRODUCT"` match
//! `Product`, `"prod"` does not.

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::fmt::Write;

use crate::error::ToolError;
use crate::validator::json_type_name;

/// One catalog entry.
#[derive(Debug, Clone)]
pub struct ConceptEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub required_properties: &'static [(&'static str, &'static str)],
    pub optional_properties: &'static [(&'static str, &'static str)],
    pub example: Value,
}

static CATALOG: Lazy<Vec<ConceptEntry>> = Lazy::new(build_catalog);

/// All catalog entries in declaration order.
pub fn catalog() -> &'static [ConceptEntry] {
    &CATALOG
}

/// Canonical names of every concept, in declaration order.
pub fn concept_names() -> Vec<&'static str> {
    CATALOG.iter().map(|c| c.name).collect()
}

/// Case-insensitive exact lookup.
pub fn find_concept(name: &str) -> Option<&'static ConceptEntry> {
    let needle = name.trim();
    CATALOG.iter().find(|c| c.name.eq_ignore_ascii_case(needle))
}

/// Render the explanation for `name`.
///
/// Fails with [`ToolError::InvalidArgument`] for blank input and
/// [`ToolError::UnknownConcept`] when nothing matches.
pub fn explain(name: &str) -> Result<String, ToolError> {
    if name.trim().is_empty() {
        return Err(ToolError::invalid("concept must not be empty"));
    }

    let entry = find_concept(name).ok_or_else(|| ToolError::UnknownConcept {
        name: name.trim().to_string(),
        valid: concept_names().into_iter().map(String::from).collect(),
    })?;

    Ok(render(entry))
}

/// Like [`explain`], but accepts an arbitrary JSON value (tool parameters).
pub fn explain_value(value: Option<&Value>) -> Result<String, ToolError> {
    match value {
        Some(Value::String(s)) => explain(s),
        Some(Value::Null) | None => Err(ToolError::invalid("concept is required")),
        Some(other) => Err(ToolError::invalid(format!(
            "concept must be a string, got {}",
            json_type_name(other)
        ))),
    }
}

fn render(entry: &ConceptEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# ORD Concept: {}", entry.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Description");
    let _ = writeln!(out, "{}", entry.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Key Properties");
    for (prop, text) in entry.required_properties {
        let _ = writeln!(out, "- **{}** (required): {}", prop, text);
    }
    for (prop, text) in entry.optional_properties {
        let _ = writeln!(out, "- **{}** (optional): {}", prop, text);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "## Example");
    let _ = writeln!(out, "```json");
    let _ = writeln!(
        out,
        "{}",
        serde_json::to_string_pretty(&entry.example).unwrap_or_else(|_| "{}".to_string())
    );
    let _ = writeln!(out, "```");
    out
}

fn build_catalog() -> Vec<ConceptEntry> {
    vec![
        ConceptEntry {
            name: "Product",
            description: "A Product is a commercial offering that customers can buy or subscribe to. \
                It groups the resources and capabilities that ship together and is the \
                top-level entry point when browsing an ORD provider.",
            required_properties: &[
                ("ordId", "Unique ORD ID of the product, e.g. `sap:product:S4HANA:v1`"),
                ("title", "Human-readable product name"),
                ("shortDescription", "One-line plain-text summary, at most 255 characters"),
                ("vendor", "ORD ID of the Vendor that owns the product"),
            ],
            optional_properties: &[
                ("description", "Full description, may contain CommonMark"),
                ("parent", "ORD ID of a parent product"),
                ("correlationIds", "Identifiers correlating the product with other systems"),
                ("tags", "Free-form keywords"),
                ("labels", "Generic key/value labels"),
            ],
            example: json!({
                "ordId": "sap:product:SAPCloudPlatform:v1",
                "title": "SAP Business Technology Platform",
                "shortDescription": "Platform for building and extending business applications",
                "vendor": "sap:vendor:SAP:v1"
            }),
        },
        ConceptEntry {
            name: "Package",
            description: "A Package organizes a set of related APIs, Events, Entity Types and \
                Capabilities for publishing. Each resource belongs to exactly one package, \
                and the package carries shared policy, licensing and vendor information.",
            required_properties: &[
                ("ordId", "Unique ORD ID of the package"),
                ("title", "Human-readable package title"),
                ("shortDescription", "One-line plain-text summary"),
                ("description", "Full description of the package contents"),
                ("version", "Semantic version of the package, e.g. `1.0.0`"),
                ("vendor", "ORD ID of the Vendor responsible for the package"),
            ],
            optional_properties: &[
                ("partOfProducts", "ORD IDs of the products the package belongs to"),
                ("policyLevel", "Compliance policy level, e.g. `sap:core:v1` or `none`"),
                ("licenseType", "SPDX license identifier"),
                ("packageLinks", "Links to terms of service, support and similar"),
                ("tags", "Free-form keywords"),
            ],
            example: json!({
                "ordId": "sap.s4:package:SAPS4HANACloud:v1",
                "title": "SAP S/4HANA Cloud APIs",
                "shortDescription": "APIs exposed by SAP S/4HANA Cloud",
                "description": "This package contains the public APIs of SAP S/4HANA Cloud.",
                "version": "1.0.0",
                "vendor": "sap:vendor:SAP:v1",
                "partOfProducts": ["sap:product:S4HANA:v1"]
            }),
        },
        ConceptEntry {
            name: "ConsumptionBundle",
            description: "A Consumption Bundle groups APIs and Events that can be consumed \
                together with the same credentials. It describes how a consumer \
                obtains access through its credential exchange strategies.",
            required_properties: &[
                ("ordId", "Unique ORD ID of the bundle"),
                ("title", "Human-readable bundle title"),
                (
                    "credentialExchangeStrategies",
                    "Non-empty list of strategies describing how credentials are obtained",
                ),
            ],
            optional_properties: &[
                ("shortDescription", "One-line plain-text summary"),
                ("description", "Full description of the bundle"),
                ("version", "Semantic version of the bundle"),
                ("apiResources", "ORD IDs of the API resources in the bundle"),
                ("eventResources", "ORD IDs of the Event resources in the bundle"),
            ],
            example: json!({
                "ordId": "sap.foo:consumptionBundle:basicAuth:v1",
                "title": "Basic Auth Bundle",
                "shortDescription": "APIs accessible with basic authentication",
                "credentialExchangeStrategies": [
                    { "type": "custom", "customType": "sap.foo:basicAuth:v1" }
                ],
                "apiResources": ["sap.foo:apiResource:astronomy:v1"]
            }),
        },
        ConceptEntry {
            name: "APIResource",
            description: "An API Resource describes a single API exposed by the system, \
                including its protocol, entry points and machine-readable resource \
                definitions such as OpenAPI or EDMX documents.",
            required_properties: &[
                ("ordId", "Unique ORD ID of the API, e.g. `sap.foo:apiResource:astronomy:v1`"),
                ("title", "Human-readable API title"),
                ("shortDescription", "One-line plain-text summary"),
                ("apiProtocol", "Protocol of the API, e.g. `odata-v4`, `rest`, `graphql`"),
                ("entryPoints", "At least one entry point with `type` and `url`"),
            ],
            optional_properties: &[
                ("description", "Full description of the API"),
                ("version", "Semantic version of the API"),
                ("visibility", "`public`, `internal` or `private`"),
                ("releaseStatus", "`active`, `beta`, `deprecated` or `sunset`"),
                ("resourceDefinitions", "Machine-readable definitions (OpenAPI, EDMX, ...)"),
                ("partOfPackage", "ORD ID of the package containing the API"),
            ],
            example: json!({
                "ordId": "sap.foo:apiResource:astronomy:v1",
                "title": "Astronomy API",
                "shortDescription": "Read access to astronomical objects",
                "apiProtocol": "rest",
                "visibility": "public",
                "releaseStatus": "active",
                "entryPoints": [
                    { "type": "rest", "url": "/api/astronomy/v1" }
                ],
                "resourceDefinitions": [
                    {
                        "type": "openapi-v3",
                        "mediaType": "application/json",
                        "url": "/ord/v1/astronomy/openapi.json"
                    }
                ]
            }),
        },
        ConceptEntry {
            name: "EventResource",
            description: "An Event Resource describes events the system emits, typically \
                documented with an AsyncAPI definition. Consumers use it to discover \
                which business events they can subscribe to.",
            required_properties: &[
                ("ordId", "Unique ORD ID of the event resource"),
                ("title", "Human-readable title"),
                ("shortDescription", "One-line plain-text summary"),
            ],
            optional_properties: &[
                ("description", "Full description of the events"),
                ("version", "Semantic version"),
                ("eventResourceType", "Kind of event resource, e.g. `cloudevents-v1`"),
                ("resourceDefinitions", "AsyncAPI or custom event definitions"),
                ("partOfPackage", "ORD ID of the package"),
            ],
            example: json!({
                "ordId": "sap.foo:eventResource:planetEvents:v1",
                "title": "Planet Events",
                "shortDescription": "Events emitted when planets change",
                "eventResourceType": "cloudevents-v1",
                "resourceDefinitions": [
                    {
                        "type": "asyncapi-v2",
                        "mediaType": "application/json",
                        "url": "/ord/v1/planet-events/asyncapi.json"
                    }
                ]
            }),
        },
        ConceptEntry {
            name: "EntityType",
            description: "An Entity Type describes a business object, such as a sales \
                order, independent of the APIs that expose it. It lets consumers relate \
                APIs and events that work on the same underlying data.",
            required_properties: &[
                ("ordId", "Unique ORD ID of the entity type"),
                ("localId", "Identifier of the entity type inside its namespace"),
                ("title", "Human-readable title"),
                ("level", "Abstraction level, e.g. `aggregate` or `root-entity`"),
            ],
            optional_properties: &[
                ("shortDescription", "One-line plain-text summary"),
                ("description", "Full description of the business object"),
                ("relatedEntityTypes", "Relations to other entity types"),
            ],
            example: json!({
                "ordId": "sap.odm:entityType:SalesOrder:v1",
                "localId": "SalesOrder",
                "title": "Sales Order",
                "level": "aggregate",
                "shortDescription": "A customer order for goods or services"
            }),
        },
        ConceptEntry {
            name: "Capability",
            description: "A Capability describes a feature of the system that can be \
                enabled or configured, such as a machine-learning scenario, without \
                being an API in its own right.",
            required_properties: &[
                ("ordId", "Unique ORD ID of the capability"),
                ("title", "Human-readable title"),
                ("shortDescription", "One-line plain-text summary"),
            ],
            optional_properties: &[
                ("description", "Full description"),
                ("type", "Capability type, e.g. `sap.mdo:mdi-capability:v1`"),
                ("version", "Semantic version"),
                ("definitions", "Machine-readable capability definitions"),
            ],
            example: json!({
                "ordId": "sap.foo:capability:fieldExtensibility:v1",
                "title": "Field Extensibility",
                "shortDescription": "Add custom fields to business objects",
                "type": "custom"
            }),
        },
        ConceptEntry {
            name: "DataProduct",
            description: "A Data Product is a curated data set offered for consumption, \
                with defined ownership and quality, exposed through one or more output \
                ports that reference API resources.",
            required_properties: &[
                ("ordId", "Unique ORD ID of the data product"),
                ("title", "Human-readable title"),
                ("type", "`primary` or `derived`"),
                ("category", "e.g. `business-object` or `analytical`"),
                ("outputPorts", "API resources through which the data is consumed"),
            ],
            optional_properties: &[
                ("shortDescription", "One-line plain-text summary"),
                ("inputPorts", "Integration dependencies the data product consumes"),
                ("responsible", "Team or organization owning the data product"),
            ],
            example: json!({
                "ordId": "sap.foo:dataProduct:customer:v1",
                "title": "Customer",
                "type": "primary",
                "category": "business-object",
                "outputPorts": [
                    { "ordId": "sap.foo:apiResource:customerDelta:v1" }
                ]
            }),
        },
        ConceptEntry {
            name: "Vendor",
            description: "A Vendor is the organization that provides products and \
                resources. Vendor IDs are referenced from products and packages.",
            required_properties: &[
                ("ordId", "Unique ORD ID of the vendor, e.g. `sap:vendor:SAP:v1`"),
                ("title", "Name of the vendor"),
            ],
            optional_properties: &[
                ("partners", "ORD IDs of partner vendors"),
                ("tags", "Free-form keywords"),
                ("labels", "Generic key/value labels"),
            ],
            example: json!({
                "ordId": "sap:vendor:SAP:v1",
                "title": "SAP SE"
            }),
        },
        ConceptEntry {
            name: "Group",
            description: "A Group assigns resources to a custom taxonomy defined by a \
                Group Type, for example grouping APIs by business process.",
            required_properties: &[
                ("groupId", "Identifier combining the group type and a local id"),
                ("groupTypeId", "ID of the Group Type the group belongs to"),
                ("title", "Human-readable title"),
            ],
            optional_properties: &[("description", "Full description of the group")],
            example: json!({
                "groupId": "sap.foo:process:sap.foo:orderToCash",
                "groupTypeId": "sap.foo:process",
                "title": "Order to Cash"
            }),
        },
        ConceptEntry {
            name: "GroupType",
            description: "A Group Type defines one custom taxonomy dimension under which \
                Groups can be created.",
            required_properties: &[
                ("groupTypeId", "Namespaced identifier of the group type"),
                ("title", "Human-readable title"),
            ],
            optional_properties: &[("description", "Full description of the taxonomy")],
            example: json!({
                "groupTypeId": "sap.foo:process",
                "title": "Business Process"
            }),
        },
        ConceptEntry {
            name: "IntegrationDependency",
            description: "An Integration Dependency states that the system needs external \
                APIs or events to fulfil an integration scenario, listing the resources \
                it expects to consume.",
            required_properties: &[
                ("ordId", "Unique ORD ID of the integration dependency"),
                ("title", "Human-readable title"),
                ("version", "Semantic version"),
                ("mandatory", "Whether the integration is required for the system to work"),
            ],
            optional_properties: &[
                ("shortDescription", "One-line plain-text summary"),
                ("aspects", "Groups of API and event resources the dependency expects"),
            ],
            example: json!({
                "ordId": "sap.foo:integrationDependency:supplierSync:v1",
                "title": "Supplier Synchronization",
                "version": "1.0.0",
                "mandatory": false,
                "aspects": [
                    {
                        "title": "Supplier master data",
                        "mandatory": true,
                        "apiResources": [
                            { "ordId": "sap.bar:apiResource:supplier:v1" }
                        ]
                    }
                ]
            }),
        },
        ConceptEntry {
            name: "Tombstone",
            description: "A Tombstone marks a resource as removed. It keeps the ORD ID \
                and removal date so aggregators can delete their copies.",
            required_properties: &[
                ("removalDate", "RFC 3339 timestamp of the removal"),
            ],
            optional_properties: &[
                ("ordId", "ORD ID of the removed resource"),
                ("groupId", "Group ID of a removed group"),
                ("description", "Reason for the removal"),
            ],
            example: json!({
                "ordId": "sap.foo:apiResource:astronomy:v0",
                "removalDate": "2024-03-01T00:00:00Z"
            }),
        },
        ConceptEntry {
            name: "DocumentProperties",
            description: "Document Properties are the top-level fields of an ORD document. \
                They declare the specification version and describe the providing system \
                instance alongside the resource collections.",
            required_properties: &[
                ("openResourceDiscoveryVersion", "Version of the ORD specification, e.g. `1.9.0`"),
            ],
            optional_properties: &[
                ("$schema", "URL of the ORD document JSON schema"),
                ("description", "Description of the document"),
                ("perspective", "`system-version`, `system-instance` or `system-independent`"),
                ("describedSystemInstance", "The system instance the document describes"),
                ("policyLevel", "Default policy level for all resources"),
            ],
            example: json!({
                "$schema": "https://open-resource-discovery.github.io/specification/spec-v1/interfaces/Document.schema.json",
                "openResourceDiscoveryVersion": "1.9.0",
                "description": "ORD document of the astronomy service",
                "products": [],
                "apiResources": []
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_concept_explains_in_any_case() {
        for name in concept_names() {
            for variant in [
                name.to_string(),
                name.to_lowercase(),
                name.to_uppercase(),
            ] {
                let text = explain(&variant).unwrap();
                assert!(text.contains(&format!("# ORD Concept: {}", name)));
                assert!(text.contains("## Description"));
            }
        }
    }

    #[test]
    fn test_section_order() {
        let text = explain("apiresource").unwrap();
        let desc = text.find("## Description").unwrap();
        let props = text.find("## Key Properties").unwrap();
        let example = text.find("## Example").unwrap();
        assert!(desc < props && props < example);

        let required = text.find("**apiProtocol** (required)").unwrap();
        let optional = text.find("**visibility** (optional)").unwrap();
        assert!(required < optional);
        assert!(text.contains("```json"));
    }

    #[test]
    fn test_unknown_concept_lists_names() {
        let err = explain("NotARealConcept").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown concept"));
        assert!(msg.contains("Product"));
        assert!(matches!(err, ToolError::UnknownConcept { .. }));
    }

    #[test]
    fn test_no_partial_match() {
        assert!(matches!(
            explain("Prod"),
            Err(ToolError::UnknownConcept { .. })
        ));
    }

    #[test]
    fn test_blank_input_is_invalid() {
        assert!(matches!(explain(""), Err(ToolError::InvalidArgument(_))));
        assert!(matches!(explain("   "), Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_non_string_value_is_invalid() {
        assert!(matches!(
            explain_value(Some(&Value::Null)),
            Err(ToolError::InvalidArgument(_))
        ));
        assert!(matches!(
            explain_value(None),
            Err(ToolError::InvalidArgument(_))
        ));
        assert!(matches!(
            explain_value(Some(&json!(42))),
            Err(ToolError::InvalidArgument(_))
        ));
        assert!(explain_value(Some(&json!("vendor"))).is_ok());
    }

    #[test]
    fn test_catalog_names_unique() {
        let mut names: Vec<String> = concept_names().iter().map(|n| n.to_lowercase()).collect();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(before, names.len());
        assert_eq!(before, 14);
    }
}
