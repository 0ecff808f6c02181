//! Test builders: ergonomic constructors for table definitions and items.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use dynamotest::aws_sdk_dynamodb::operation::create_table::CreateTableInput;
use dynamotest::aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, GlobalSecondaryIndex, KeySchemaElement,
    KeyType, Projection, ProjectionType, PutRequest, ScalarAttributeType, WriteRequest,
};
use dynamotest::Item;

// ---------------------------------------------------------------------------
// TableBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`CreateTableInput`] fixtures. Tables are on-demand so
/// no throughput needs to be declared.
///
/// # Example
///
/// ```rust
/// let table = TableBuilder::new("orders")
///     .hash_key("customer", ScalarAttributeType::S)
///     .range_key("placed_at", ScalarAttributeType::S)
///     .global_index("status-index", "status", ScalarAttributeType::S)
///     .build();
/// ```
pub struct TableBuilder {
    name: Option<String>,
    attributes: Vec<(String, ScalarAttributeType)>,
    keys: Vec<KeySchemaElement>,
    indexes: Vec<GlobalSecondaryIndex>,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::unnamed()
        }
    }

    /// A template without a table name, for `create_single_schema`.
    pub fn unnamed() -> Self {
        Self {
            name: None,
            attributes: Vec::new(),
            keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn hash_key(self, attribute: &str, kind: ScalarAttributeType) -> Self {
        self.key(attribute, kind, KeyType::Hash)
    }

    pub fn range_key(self, attribute: &str, kind: ScalarAttributeType) -> Self {
        self.key(attribute, kind, KeyType::Range)
    }

    /// Global secondary index projecting all attributes, keyed on `attribute`.
    pub fn global_index(mut self, index: &str, attribute: &str, kind: ScalarAttributeType) -> Self {
        self.define(attribute, kind);
        let gsi = GlobalSecondaryIndex::builder()
            .index_name(index)
            .key_schema(key_element(attribute, KeyType::Hash))
            .projection(
                Projection::builder()
                    .projection_type(ProjectionType::All)
                    .build(),
            )
            .build()
            .expect("global secondary index should build");
        self.indexes.push(gsi);
        self
    }

    pub fn build(self) -> CreateTableInput {
        let attributes = self
            .attributes
            .into_iter()
            .map(|(name, kind)| {
                AttributeDefinition::builder()
                    .attribute_name(name)
                    .attribute_type(kind)
                    .build()
                    .expect("attribute definition should build")
            })
            .collect();
        CreateTableInput::builder()
            .set_table_name(self.name)
            .set_attribute_definitions(Some(attributes))
            .set_key_schema(Some(self.keys))
            .set_global_secondary_indexes((!self.indexes.is_empty()).then_some(self.indexes))
            .billing_mode(BillingMode::PayPerRequest)
            .build()
            .expect("CreateTableInput should build")
    }

    fn key(mut self, attribute: &str, kind: ScalarAttributeType, key_type: KeyType) -> Self {
        self.define(attribute, kind);
        self.keys.push(key_element(attribute, key_type));
        self
    }

    fn define(&mut self, attribute: &str, kind: ScalarAttributeType) {
        if !self.attributes.iter().any(|(name, _)| name == attribute) {
            self.attributes.push((attribute.to_string(), kind));
        }
    }
}

fn key_element(attribute: &str, key_type: KeyType) -> KeySchemaElement {
    KeySchemaElement::builder()
        .attribute_name(attribute)
        .key_type(key_type)
        .build()
        .expect("key schema element should build")
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

pub fn s(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

pub fn n(value: impl ToString) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

pub fn b(value: bool) -> AttributeValue {
    AttributeValue::Bool(value)
}

/// Build an [`Item`] from `(attribute, value)` pairs.
pub fn item<const N: usize>(pairs: [(&str, AttributeValue); N]) -> Item {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// The write request the loader is expected to send for `item`.
pub fn put(item: Item) -> WriteRequest {
    WriteRequest::builder()
        .put_request(
            PutRequest::builder()
                .set_item(Some(item))
                .build()
                .expect("put request should build"),
        )
        .build()
}

/// `count` distinct single-attribute items: `id = "row-000"`, `"row-001"`, ...
pub fn numbered_items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| item([("id", s(&format!("row-{i:03}")))]))
        .collect()
}
