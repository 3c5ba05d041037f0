//! Schema descriptors for the six resource collections.
//!
//! Each collection is described by data: required fields, field rules,
//! nested-structure checks and outgoing references. The driver in
//! [`super`] interprets these tables; there is no per-kind validation code.

use super::result::Severity;
use super::rules::{FieldRule, Pattern};

pub const API_PROTOCOLS: &[&str] = &[
    "odata-v2",
    "odata-v4",
    "rest",
    "graphql",
    "delta-sharing",
    "soap-inbound",
    "soap-outbound",
    "mcp",
    "sap-rfc",
    "sap-sql-api-v1",
    "sap-ina-api-v1",
    "websocket",
    "grpc",
];

pub const EVENT_RESOURCE_TYPES: &[&str] = &[
    "cloudevents-v1",
    "asyncapi-v2",
    "sap-event-catalog-v1",
    "custom",
];

pub const VISIBILITIES: &[&str] = &["public", "internal", "private"];

pub const RELEASE_STATUSES: &[&str] = &["active", "beta", "deprecated", "sunset"];

/// Resource definition types recognized without a warning.
pub const RESOURCE_DEFINITION_TYPES: &[&str] = &[
    "openapi-v2",
    "openapi-v3",
    "openapi-v3.1+",
    "raml-v1",
    "edmx",
    "csdl-json",
    "graphql-sdl",
    "wsdl-v1",
    "wsdl-v2",
    "asyncapi-v2",
    "sap-rfc-metadata-v1",
    "sap-sql-api-definition-v1",
    "sap-csn-interop-effective-v1",
    "sap-ina-api-v1",
    "custom",
];

/// Upper bound for `title` and `shortDescription`, in characters.
pub const MAX_TEXT_LEN: usize = 255;

const TEXT: FieldRule = FieldRule::Length {
    min: 1,
    max: MAX_TEXT_LEN,
};
const ORD_ID: FieldRule = FieldRule::Pattern(Pattern::OrdId);

/// Structural checks below the top level of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedCheck {
    EntryPoints,
    ResourceDefinitions,
    CredentialStrategies,
    BundleMembers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// An outgoing `ordId` reference that must resolve within the document.
#[derive(Debug, Clone, Copy)]
pub struct Reference {
    pub field: &'static str,
    pub cardinality: Cardinality,
    pub target: &'static str,
    pub severity: Severity,
}

#[derive(Debug)]
pub struct ResourceSchema {
    /// Key of the collection in the document, e.g. `apiResources`.
    pub collection: &'static str,
    /// Display name used in messages.
    pub label: &'static str,
    pub required: &'static [&'static str],
    pub rules: &'static [(&'static str, FieldRule)],
    pub nested: &'static [NestedCheck],
    pub references: &'static [Reference],
    /// Strict mode suggests a `description` when absent.
    pub suggest_description: bool,
}

impl ResourceSchema {
    pub fn requires(&self, field: &str) -> bool {
        self.required.contains(&field)
    }

    pub fn checks(&self, check: NestedCheck) -> bool {
        self.nested.contains(&check)
    }
}

/// All known collections, in validation order.
pub static SCHEMAS: &[ResourceSchema] = &[
    ResourceSchema {
        collection: "products",
        label: "Product",
        required: &["ordId", "title", "shortDescription", "vendor"],
        rules: &[
            ("ordId", ORD_ID),
            ("title", TEXT),
            ("shortDescription", TEXT),
            ("vendor", FieldRule::Pattern(Pattern::VendorReference)),
        ],
        nested: &[],
        references: &[Reference {
            field: "vendor",
            cardinality: Cardinality::One,
            target: "vendor",
            severity: Severity::Warning,
        }],
        suggest_description: true,
    },
    ResourceSchema {
        collection: "vendors",
        label: "Vendor",
        required: &["ordId", "title"],
        rules: &[("ordId", ORD_ID), ("title", TEXT)],
        nested: &[],
        references: &[],
        suggest_description: false,
    },
    ResourceSchema {
        collection: "apiResources",
        label: "API resource",
        required: &["ordId", "title", "shortDescription", "apiProtocol", "entryPoints"],
        rules: &[
            ("ordId", ORD_ID),
            ("title", TEXT),
            ("shortDescription", TEXT),
            ("apiProtocol", FieldRule::OneOf(API_PROTOCOLS)),
            ("visibility", FieldRule::OneOf(VISIBILITIES)),
            ("releaseStatus", FieldRule::OneOf(RELEASE_STATUSES)),
        ],
        nested: &[NestedCheck::EntryPoints, NestedCheck::ResourceDefinitions],
        references: &[],
        suggest_description: true,
    },
    ResourceSchema {
        collection: "eventResources",
        label: "Event resource",
        required: &["ordId", "title", "shortDescription"],
        rules: &[
            ("ordId", ORD_ID),
            ("title", TEXT),
            ("shortDescription", TEXT),
            ("eventResourceType", FieldRule::OneOf(EVENT_RESOURCE_TYPES)),
            ("visibility", FieldRule::OneOf(VISIBILITIES)),
            ("releaseStatus", FieldRule::OneOf(RELEASE_STATUSES)),
        ],
        nested: &[NestedCheck::EntryPoints, NestedCheck::ResourceDefinitions],
        references: &[],
        suggest_description: true,
    },
    ResourceSchema {
        collection: "consumptionBundles",
        label: "Consumption bundle",
        required: &["ordId", "title", "credentialExchangeStrategies"],
        rules: &[("ordId", ORD_ID), ("title", TEXT), ("shortDescription", TEXT)],
        nested: &[NestedCheck::CredentialStrategies, NestedCheck::BundleMembers],
        references: &[
            Reference {
                field: "apiResources",
                cardinality: Cardinality::Many,
                target: "API resource",
                severity: Severity::Error,
            },
            Reference {
                field: "eventResources",
                cardinality: Cardinality::Many,
                target: "event resource",
                severity: Severity::Error,
            },
        ],
        suggest_description: true,
    },
    ResourceSchema {
        collection: "capabilities",
        label: "Capability",
        required: &["ordId", "title", "shortDescription"],
        rules: &[("ordId", ORD_ID), ("title", TEXT), ("shortDescription", TEXT)],
        nested: &[],
        references: &[],
        suggest_description: true,
    },
];

/// Collection keys in validation order.
pub fn collection_names() -> Vec<&'static str> {
    SCHEMAS.iter().map(|s| s.collection).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_order() {
        assert_eq!(
            collection_names(),
            vec![
                "products",
                "vendors",
                "apiResources",
                "eventResources",
                "consumptionBundles",
                "capabilities"
            ]
        );
    }

    #[test]
    fn test_every_schema_requires_ord_id() {
        for schema in SCHEMAS {
            assert!(schema.requires("ordId"), "{}", schema.collection);
        }
    }
}
