//! Decoding of catalog service records into [`Product`].
//!
//! The mock service is loosely typed: ids and prices may arrive as numbers or
//! as numeric strings, and tag fields may be missing entirely. Everything is
//! coerced or rejected here so the rest of the storefront only ever sees a
//! validated `Product`.

use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

use casualwear_core::product::MAX_RATING;
use casualwear_core::{Price, Product, ProductId};

/// Highest unit price accepted from the service, in dollars.
const MAX_PRICE: i64 = 1_000_000;

/// A catalog record that does not fit the product shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected a JSON {expected}, got {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{product}: missing field `{field}`")]
    MissingField {
        product: String,
        field: &'static str,
    },

    #[error("{product}: invalid `{field}`: {reason}")]
    InvalidField {
        product: String,
        field: &'static str,
        reason: String,
    },
}

/// Decode a `GET /products` body. Any bad record fails the whole list.
///
/// # Errors
///
/// Returns `DecodeError` if the body is not an array or any element is not a
/// valid product.
pub fn decode_products(body: &Value) -> Result<Vec<Product>, DecodeError> {
    let Value::Array(records) = body else {
        return Err(DecodeError::UnexpectedShape {
            expected: "array",
            found: kind(body),
        });
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| decode_record(record, &format!("product at index {index}")))
        .collect()
}

/// Decode a `GET /products/{id}` body.
///
/// # Errors
///
/// Returns `DecodeError` if the body is not a valid product object.
pub fn decode_product(body: &Value) -> Result<Product, DecodeError> {
    decode_record(body, "product")
}

fn decode_record(record: &Value, position: &str) -> Result<Product, DecodeError> {
    let Value::Object(fields) = record else {
        return Err(DecodeError::UnexpectedShape {
            expected: "object",
            found: kind(record),
        });
    };

    let id = decode_id(fields, position)?;
    let label = format!("product {id}");

    Ok(Product {
        id,
        title: required_text(fields, "title", &label)?,
        price: Price::usd(decode_price(fields, &label)?),
        image: required_text(fields, "image", &label)?,
        rating: decode_rating(fields, &label)?,
        description: optional_text(fields, "description", &label)?,
        category: optional_text(fields, "category", &label)?.unwrap_or_default(),
        brand: optional_text(fields, "brand", &label)?.unwrap_or_default(),
        gender: optional_text(fields, "gender", &label)?.unwrap_or_default(),
        colors: decode_colors(fields, &label)?,
    })
}

fn decode_id(fields: &Map<String, Value>, position: &str) -> Result<ProductId, DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidField {
        product: position.to_string(),
        field: "id",
        reason,
    };

    match fields.get("id") {
        None | Some(Value::Null) => Err(DecodeError::MissingField {
            product: position.to_string(),
            field: "id",
        }),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|id| i32::try_from(id).ok())
            .map(ProductId::new)
            .ok_or_else(|| invalid(format!("{n} is not a 32-bit integer"))),
        Some(Value::String(s)) => s
            .parse::<ProductId>()
            .map_err(|_| invalid(format!("\"{s}\" is not an integer"))),
        Some(other) => Err(invalid(format!("unexpected {}", kind(other)))),
    }
}

fn decode_price(fields: &Map<String, Value>, label: &str) -> Result<Decimal, DecodeError> {
    let amount = required_decimal(fields, "price", label)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DecodeError::InvalidField {
            product: label.to_string(),
            field: "price",
            reason: format!("{amount} is negative"),
        });
    }
    if amount > Decimal::from(MAX_PRICE) {
        return Err(DecodeError::InvalidField {
            product: label.to_string(),
            field: "price",
            reason: format!("{amount} exceeds {MAX_PRICE}"),
        });
    }
    Ok(amount)
}

fn decode_rating(fields: &Map<String, Value>, label: &str) -> Result<f64, DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidField {
        product: label.to_string(),
        field: "rating",
        reason,
    };

    let rating = match fields.get("rating") {
        None | Some(Value::Null) => {
            return Err(DecodeError::MissingField {
                product: label.to_string(),
                field: "rating",
            });
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => return Err(invalid(format!("unexpected {}", kind(other)))),
    }
    .filter(|r| r.is_finite())
    .ok_or_else(|| invalid("not a number".to_string()))?;

    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(invalid(format!("{rating} is outside 0-{MAX_RATING}")));
    }
    Ok(rating)
}

fn decode_colors(
    fields: &Map<String, Value>,
    label: &str,
) -> Result<BTreeSet<String>, DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidField {
        product: label.to_string(),
        field: "colors",
        reason,
    };

    let values: Vec<&Value> = match fields.get("colors") {
        None | Some(Value::Null) => return Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::String(_)) => vec![single],
        Some(other) => return Err(invalid(format!("unexpected {}", kind(other)))),
    };

    values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(Ok(s.trim().to_string())),
            other => Some(Err(invalid(format!("unexpected {} in list", kind(other))))),
        })
        .collect()
}

fn required_text(
    fields: &Map<String, Value>,
    field: &'static str,
    label: &str,
) -> Result<String, DecodeError> {
    optional_text(fields, field, label)?.ok_or_else(|| DecodeError::MissingField {
        product: label.to_string(),
        field,
    })
}

/// A trimmed string field. Absent, null and blank all decode to `None`.
fn optional_text(
    fields: &Map<String, Value>,
    field: &'static str,
    label: &str,
) -> Result<Option<String>, DecodeError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(other) => Err(DecodeError::InvalidField {
            product: label.to_string(),
            field,
            reason: format!("expected a string, got {}", kind(other)),
        }),
    }
}

fn required_decimal(
    fields: &Map<String, Value>,
    field: &'static str,
    label: &str,
) -> Result<Decimal, DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidField {
        product: label.to_string(),
        field,
        reason,
    };

    let raw = match fields.get(field) {
        None | Some(Value::Null) => {
            return Err(DecodeError::MissingField {
                product: label.to_string(),
                field,
            });
        }
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => return Err(invalid(format!("unexpected {}", kind(other)))),
    };

    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| invalid(format!("\"{raw}\" is not a number")))
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
