//! Example ORD records, a complete document, and a CAP annotation sample.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ToolError;

pub const EXAMPLE_KINDS: &[&str] = &[
    "product",
    "vendor",
    "capability",
    "api",
    "event",
    "bundle",
    "complete",
    "cap-annotations",
];

#[derive(Debug, Clone, Serialize)]
pub struct Example {
    pub kind: &'static str,
    pub title: &'static str,
    /// `json` or `cds`.
    pub format: &'static str,
    pub content: Value,
}

pub fn get_example(kind: &str) -> Result<Example, ToolError> {
    let normalized = kind.trim().to_lowercase();
    let example = match normalized.as_str() {
        "product" => json_example("product", "Product", product()),
        "vendor" => json_example("vendor", "Vendor", vendor()),
        "capability" => json_example("capability", "Capability", capability()),
        "api" => json_example("api", "API resource", api_resource()),
        "event" => json_example("event", "Event resource", event_resource()),
        "bundle" => json_example("bundle", "Consumption bundle", bundle()),
        "complete" => json_example("complete", "Complete ORD document", complete_document()),
        "cap-annotations" => Example {
            kind: "cap-annotations",
            title: "CAP service with ORD annotations",
            format: "cds",
            content: Value::String(CAP_ANNOTATIONS.to_string()),
        },
        "" => return Err(ToolError::invalid("example type must not be empty")),
        _ => {
            return Err(ToolError::invalid(format!(
                "unknown example type '{}'; valid types: {}",
                kind.trim(),
                EXAMPLE_KINDS.join(", ")
            )))
        }
    };
    Ok(example)
}

fn json_example(kind: &'static str, title: &'static str, content: Value) -> Example {
    Example {
        kind,
        title,
        format: "json",
        content,
    }
}

fn vendor() -> Value {
    json!({
        "ordId": "acme:vendor:Acme:v1",
        "title": "Acme Corporation"
    })
}

fn product() -> Value {
    json!({
        "ordId": "acme:product:Bookshop:v1",
        "title": "Acme Bookshop",
        "shortDescription": "Online bookshop built on CAP",
        "description": "The Acme Bookshop lets customers browse and order books.",
        "vendor": "acme:vendor:Acme:v1"
    })
}

fn capability() -> Value {
    json!({
        "ordId": "acme.bookshop:capability:Recommendations:v1",
        "title": "Book Recommendations",
        "shortDescription": "Personalized book recommendations",
        "description": "Suggests books based on previous orders.",
        "type": "custom"
    })
}

fn api_resource() -> Value {
    json!({
        "ordId": "acme.bookshop:apiResource:CatalogService:v1",
        "title": "Catalog Service",
        "shortDescription": "Browse books and authors",
        "description": "Read-only OData API for the book catalog.",
        "version": "1.0.0",
        "visibility": "public",
        "releaseStatus": "active",
        "apiProtocol": "odata-v4",
        "entryPoints": [
            { "type": "odata-v4", "url": "/odata/v4/catalog" }
        ],
        "resourceDefinitions": [
            {
                "type": "edmx",
                "mediaType": "application/xml",
                "url": "/ord/v1/acme.bookshop:apiResource:CatalogService:v1/CatalogService.edmx"
            },
            {
                "type": "openapi-v3",
                "mediaType": "application/json",
                "url": "/ord/v1/acme.bookshop:apiResource:CatalogService:v1/CatalogService.oas3.json"
            }
        ]
    })
}

fn event_resource() -> Value {
    json!({
        "ordId": "acme.bookshop:eventResource:OrderEvents:v1",
        "title": "Order Events",
        "shortDescription": "Events emitted when orders change",
        "description": "CloudEvents published on order creation and cancellation.",
        "version": "1.0.0",
        "visibility": "public",
        "releaseStatus": "active",
        "eventResourceType": "cloudevents-v1",
        "resourceDefinitions": [
            {
                "type": "asyncapi-v2",
                "mediaType": "application/json",
                "url": "/ord/v1/acme.bookshop:eventResource:OrderEvents:v1/OrderEvents.asyncapi2.json"
            }
        ]
    })
}

fn bundle() -> Value {
    json!({
        "ordId": "acme.bookshop:consumptionBundle:OAuth:v1",
        "title": "OAuth Bundle",
        "shortDescription": "Bookshop APIs secured with OAuth 2.0",
        "description": "Access all bookshop APIs and events with one OAuth client.",
        "credentialExchangeStrategies": [
            {
                "type": "oauth2",
                "callbackUrl": "https://bookshop.acme.example/oauth/callback"
            }
        ],
        "apiResources": ["acme.bookshop:apiResource:CatalogService:v1"],
        "eventResources": [{ "ordId": "acme.bookshop:eventResource:OrderEvents:v1" }]
    })
}

fn complete_document() -> Value {
    json!({
        "$schema": "https://open-resource-discovery.github.io/specification/spec-v1/interfaces/Document.schema.json",
        "openResourceDiscoveryVersion": "1.9.0",
        "description": "ORD document of the Acme Bookshop",
        "vendors": [vendor()],
        "products": [product()],
        "capabilities": [capability()],
        "apiResources": [api_resource()],
        "eventResources": [event_resource()],
        "consumptionBundles": [bundle()]
    })
}

const CAP_ANNOTATIONS: &str = r#"using { sap.capire.bookshop as my } from '../db/schema';

service CatalogService @(path: '/catalog') {
    @readonly entity Books  as projection on my.Books;
    @readonly entity Authors as projection on my.Authors;
}

annotate CatalogService with @ORD.Extensions: {
    title            : 'Catalog Service',
    shortDescription : 'Browse books and authors',
    description      : 'Read-only OData API for the book catalog.',
    version          : '1.0.0',
    visibility       : 'public',
    releaseStatus    : 'active',
    industry         : ['Retail'],
    lineOfBusiness   : ['Sales'],
};

annotate CatalogService.Books with @ODM.entityName: 'Books';
"#;
