//! Domain-specific assertion macros for dynamotest harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that say which
//! table or which error was involved.

use dynamotest::aws_sdk_dynamodb::types::AttributeValue;
use dynamotest::Item;
use std::collections::BTreeMap;

/// Items with their attributes in a stable order, so diffs are readable.
pub fn sorted(items: &[Item]) -> Vec<BTreeMap<String, AttributeValue>> {
    items
        .iter()
        .map(|item| item.clone().into_iter().collect())
        .collect()
}

/// Assert two item lists are equal in order, diffing attributes by name.
///
/// ```rust
/// assert_items_eq!(output.items(), [item([("id", s("1"))])]);
/// ```
#[macro_export]
macro_rules! assert_items_eq {
    ($actual:expr, $expected:expr) => {{
        let actual: &[dynamotest::Item] = &$actual;
        let expected: &[dynamotest::Item] = &$expected;
        pretty_assertions::assert_eq!(
            $crate::common::assertions::sorted(actual),
            $crate::common::assertions::sorted(expected),
            "item lists differ"
        );
    }};
}

/// Assert a `Result<_, LoadError>` failed with the given variant and that the
/// error names `table`.
///
/// ```rust
/// assert_load_error!(result, LoadError::CreateTable { .. }, "orders");
/// ```
#[macro_export]
macro_rules! assert_load_error {
    ($result:expr, $pattern:pat, $table:expr) => {{
        match $result {
            Ok(value) => panic!(
                "assert_load_error! failed: expected {}, got Ok({:?})",
                stringify!($pattern),
                value
            ),
            Err(err) => {
                assert!(
                    matches!(err, $pattern),
                    "assert_load_error! failed: expected {}, got {:?}",
                    stringify!($pattern),
                    err
                );
                pretty_assertions::assert_eq!(err.table(), Some($table), "error: {}", err);
            }
        }
    }};
}
