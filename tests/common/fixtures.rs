//! Canned table definitions and rows shared across harnesses.

use super::builders::*;
use dynamotest::aws_sdk_dynamodb::operation::create_table::CreateTableInput;
use dynamotest::aws_sdk_dynamodb::types::ScalarAttributeType::S;
use dynamotest::SchemaSeed;
use serde::{Deserialize, Serialize};

/// Repository-style model used by the single-table helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleModel {
    #[serde(rename = "pk")]
    pub id: String,
    #[serde(rename = "sk")]
    pub sk: String,
    pub value: String,
}

impl ExampleModel {
    pub fn new(id: &str, sk: &str, value: &str) -> Self {
        Self {
            id: id.to_string(),
            sk: sk.to_string(),
            value: value.to_string(),
        }
    }
}

/// Unnamed `pk`/`sk` template matching [`ExampleModel`].
pub fn example_template() -> CreateTableInput {
    TableBuilder::unnamed()
        .hash_key("pk", S)
        .range_key("sk", S)
        .build()
}

/// `my-table` keyed on `id`, holding John Doe.
pub fn simple_table() -> SchemaSeed {
    SchemaSeed::new(TableBuilder::new("my-table").hash_key("id", S).build()).with_rows([item([
        ("id", s("123")),
        ("name", s("John Doe")),
        ("email", s("john@doe.io")),
    ])])
}

/// `sortable-table` keyed on `s_id` + `date`, three consecutive days.
pub fn sortable_table() -> SchemaSeed {
    SchemaSeed::new(
        TableBuilder::new("sortable-table")
            .hash_key("s_id", S)
            .range_key("date", S)
            .build(),
    )
    .with_rows(
        ["2022-02-15", "2022-02-16", "2022-02-17"]
            .map(|date| item([("s_id", s("111")), ("date", s(date))])),
    )
}

/// `sortable-week` keyed on `s_id` + `date`, eight days for `111` and one
/// day for `222`.
pub fn sortable_week() -> SchemaSeed {
    let days = (10..=17)
        .map(|day| item([("s_id", s("111")), ("date", s(&format!("2022-02-{day}")))]));
    SchemaSeed::new(
        TableBuilder::new("sortable-week")
            .hash_key("s_id", S)
            .range_key("date", S)
            .build(),
    )
    .with_rows(days.chain([item([("s_id", s("222")), ("date", s("2022-02-17"))])]))
}

/// `complex-table` keyed on `id` + `category`.
pub fn complex_table() -> SchemaSeed {
    SchemaSeed::new(
        TableBuilder::new("complex-table")
            .hash_key("id", S)
            .range_key("category", S)
            .build(),
    )
    .with_rows([
        item([("id", s("1")), ("category", s("A")), ("name", s("Item 1"))]),
        item([("id", s("2")), ("category", s("B")), ("name", s("Item 2"))]),
        item([("id", s("3")), ("category", s("A")), ("name", s("Item 3"))]),
    ])
}

pub fn empty_table() -> SchemaSeed {
    SchemaSeed::new(TableBuilder::new("empty-table").hash_key("id", S).build())
}

/// `index-table` with a `name-index` global secondary index.
pub fn index_table() -> SchemaSeed {
    SchemaSeed::new(
        TableBuilder::new("index-table")
            .hash_key("id", S)
            .global_index("name-index", "name", S)
            .build(),
    )
    .with_rows([
        item([("id", s("1")), ("name", s("Alice"))]),
        item([("id", s("2")), ("name", s("Bob"))]),
    ])
}

pub fn mixed_types_table() -> SchemaSeed {
    SchemaSeed::new(TableBuilder::new("mixed-types-table").hash_key("id", S).build()).with_rows([
        item([("id", s("1")), ("number", n(42)), ("boolean", b(true))]),
    ])
}
