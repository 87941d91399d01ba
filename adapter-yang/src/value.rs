//! Leaf character data coercion.
//!
//! NETCONF delivers every leaf as character data; the schema's leaf type
//! decides what the adapter stores in the intermediate tree. Coerced values
//! are `serde_json::Value`s so directory reads can be re-encoded as JSON
//! without a second conversion.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::pattern::all_patterns_match;
use crate::types::{TypeKind, YangType};

#[derive(Debug, Error)]
pub enum CoercionError {
    /// No member type of a union accepted the value.
    #[error("failed to coerce union value: {0}")]
    NoUnionMatch(String),
}

/// Coerce leaf character data into a typed value.
///
/// Surrounding whitespace is trimmed first. Unsigned integers that fail to
/// parse become zero, and a union value that matches no member becomes null;
/// both are logged rather than failing the decode, so a single malformed
/// leaf cannot poison an otherwise valid subtree.
pub fn coerce_leaf(text: &str, leaf_type: &YangType) -> Value {
    let trimmed = text.trim();
    match leaf_type.kind {
        TypeKind::String | TypeKind::Enumeration => Value::from(trimmed),
        TypeKind::Uint32 => match trimmed.parse::<u64>() {
            Ok(v) => Value::from(v),
            Err(error) => {
                warn!(value = trimmed, %error, "malformed unsigned leaf value, using zero");
                Value::from(0u64)
            }
        },
        TypeKind::Int32 => match trimmed.parse::<i64>() {
            Ok(v) => Value::from(v),
            Err(error) => {
                warn!(value = trimmed, %error, "malformed signed leaf value, using zero");
                Value::from(0i64)
            }
        },
        TypeKind::Union => match union_value(trimmed, &leaf_type.union) {
            Ok(v) => v,
            Err(error) => {
                warn!(%error, "leaf value matched no union member");
                Value::Null
            }
        },
        kind => {
            warn!(?kind, "leaf kind not yet supported, keeping value as string");
            Value::from(trimmed)
        }
    }
}

/// Coerce a value against the member types of a union, in declared order.
///
/// A string member matches when the value satisfies all of its patterns; an
/// int32 member matches when the value parses and falls inside one of its
/// declared ranges. Other member kinds do not participate in dispatch.
pub fn union_value(text: &str, members: &[YangType]) -> Result<Value, CoercionError> {
    for member in members {
        match member.kind {
            TypeKind::String => {
                if all_patterns_match(text, &member.patterns) {
                    return Ok(Value::from(text));
                }
            }
            TypeKind::Int32 => {
                if let Some(v) = valid_int32(text, member) {
                    return Ok(Value::from(v));
                }
            }
            _ => {}
        }
    }
    Err(CoercionError::NoUnionMatch(text.to_string()))
}

/// Parse a signed 32-bit value and check it against the member's ranges.
///
/// A member with no declared ranges accepts nothing.
fn valid_int32(text: &str, member: &YangType) -> Option<i64> {
    let value = i64::from(text.parse::<i32>().ok()?);
    member
        .ranges
        .iter()
        .any(|r| r.contains(value))
        .then_some(value)
}
