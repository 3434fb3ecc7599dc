//! Renders value trees as typed Rust literal expressions
//!
//! Structure fields are emitted in the shape's declared member order; the
//! decoded input mapping is only used for lookups. Keys without a matching
//! member abort generation.

use crate::error::{GenError, Result};
use crate::naming::{field_ident, type_ident};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use behave_core::model::{ApiModel, Shape, ShapeRef};
use proc_macro2::{Literal, TokenStream};
use quote::quote;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Builds literal construction expressions for shapes of one API model
pub struct ShapeValueBuilder<'a> {
    model: &'a ApiModel,
    client: &'a syn::Path,
    base64_blobs: bool,
}

impl<'a> ShapeValueBuilder<'a> {
    /// Create a builder emitting types under `client`
    pub fn new(model: &'a ApiModel, client: &'a syn::Path) -> Self {
        Self {
            model,
            client,
            base64_blobs: false,
        }
    }

    /// Decode blob string values as base64 before emission
    pub fn with_base64_blobs(mut self, enabled: bool) -> Self {
        self.base64_blobs = enabled;
        self
    }

    /// Literal of a structure shape populated from a keyed mapping
    pub fn build_struct(
        &self,
        shape_ref: &ShapeRef,
        fields: &Map<String, Value>,
    ) -> Result<TokenStream> {
        let shape = self.model.resolve(shape_ref)?;
        self.structure(&shape_ref.shape, shape, fields, &shape_ref.shape)
    }

    /// Literal of any shape populated from a value
    pub fn build(&self, shape_ref: &ShapeRef, value: &Value, path: &str) -> Result<TokenStream> {
        let shape = self.model.resolve(shape_ref)?;
        match (shape, value) {
            (Shape::Structure { .. }, Value::Object(fields)) => {
                self.structure(&shape_ref.shape, shape, fields, path)
            }
            (Shape::Structure { .. }, Value::Null) => {
                self.structure(&shape_ref.shape, shape, &Map::new(), path)
            }
            (Shape::List { member }, Value::Array(items)) => {
                let items = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.build(member, item, &format!("{path}[{i}]")))
                    .collect::<Result<Vec<_>>>()?;
                Ok(quote! { vec![#(#items),*] })
            }
            (Shape::Map { key, value: value_ref }, Value::Object(entries)) => {
                let sorted: BTreeMap<&String, &Value> = entries.iter().collect();
                let pairs = sorted
                    .into_iter()
                    .map(|(k, v)| -> Result<TokenStream> {
                        let entry_path = format!("{path}[{k:?}]");
                        let key = self.build(key, &Value::String(k.clone()), &entry_path)?;
                        let value = self.build(value_ref, v, &entry_path)?;
                        Ok(quote! { (#key, #value) })
                    })
                    .collect::<Result<Vec<_>>>()?;
                if pairs.is_empty() {
                    Ok(quote! { ::std::collections::HashMap::new() })
                } else {
                    Ok(quote! { ::std::collections::HashMap::from([#(#pairs),*]) })
                }
            }
            (Shape::String, Value::String(s)) => {
                let lit = Literal::string(s);
                Ok(quote! { ::std::string::String::from(#lit) })
            }
            (Shape::Integer, Value::Number(n)) => {
                integer(n, i64::from(i32::MIN), i64::from(i32::MAX), path)
            }
            (Shape::Long, Value::Number(n)) => integer(n, i64::MIN, i64::MAX, path),
            (Shape::Float | Shape::Double, Value::Number(n)) => float(n, path),
            (Shape::Boolean, Value::Bool(b)) => Ok(quote! { #b }),
            (Shape::Blob, Value::String(s)) => {
                let bytes = if self.base64_blobs {
                    STANDARD.decode(s).map_err(|e| GenError::ValueMismatch {
                        path: path.to_string(),
                        expected: "base64 blob".to_string(),
                        found: e.to_string(),
                    })?
                } else {
                    s.as_bytes().to_vec()
                };
                let lit = Literal::byte_string(&bytes);
                Ok(quote! { #lit.to_vec() })
            }
            (Shape::Timestamp, Value::Number(n)) => match n.as_f64() {
                Some(secs) if secs.is_finite() && secs >= 0.0 => {
                    let lit = Literal::f64_unsuffixed(secs);
                    Ok(quote! {
                        ::std::time::UNIX_EPOCH + ::std::time::Duration::from_secs_f64(#lit)
                    })
                }
                _ => Err(mismatch(path, "non-negative epoch seconds", value)),
            },
            (Shape::Timestamp, Value::String(s)) => {
                let parsed =
                    OffsetDateTime::parse(s, &Rfc3339).map_err(|e| GenError::ValueMismatch {
                        path: path.to_string(),
                        expected: "RFC 3339 timestamp".to_string(),
                        found: e.to_string(),
                    })?;
                let secs = u64::try_from(parsed.unix_timestamp())
                    .map_err(|_| mismatch(path, "timestamp after the epoch", value))?;
                let secs = Literal::u64_unsuffixed(secs);
                let nanos = Literal::u32_unsuffixed(parsed.nanosecond());
                Ok(quote! {
                    ::std::time::UNIX_EPOCH + ::std::time::Duration::new(#secs, #nanos)
                })
            }
            (shape, value) => Err(mismatch(path, shape.type_name(), value)),
        }
    }

    fn structure(
        &self,
        name: &str,
        shape: &Shape,
        fields: &Map<String, Value>,
        path: &str,
    ) -> Result<TokenStream> {
        let Shape::Structure { members, .. } = shape else {
            return Err(mismatch(path, shape.type_name(), &Value::Object(fields.clone())));
        };

        // Unknown keys mean the suite and the model disagree
        if let Some(field) = fields.keys().find(|k| shape.member(k).is_none()) {
            return Err(GenError::FieldMismatch {
                path: path.to_string(),
                field: field.clone(),
                shape: name.to_string(),
            });
        }

        let mut assignments = Vec::new();
        for member in members {
            let Some(value) = fields.get(&member.name).filter(|v| !v.is_null()) else {
                continue;
            };
            let ident = field_ident(&member.name);
            let expr = self.build(&member.target, value, &format!("{path}.{}", member.name))?;
            if shape.is_required(&member.name) {
                assignments.push(quote! { #ident: #expr });
            } else {
                assignments.push(quote! { #ident: Some(#expr) });
            }
        }

        let client = self.client;
        let ty = type_ident(name);
        if assignments.len() == members.len() {
            Ok(quote! { #client::#ty { #(#assignments),* } })
        } else {
            Ok(quote! { #client::#ty { #(#assignments,)* ..Default::default() } })
        }
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> GenError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    GenError::ValueMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn integer(n: &Number, min: i64, max: i64, path: &str) -> Result<TokenStream> {
    match n.as_i64() {
        Some(v) if (min..=max).contains(&v) => {
            let lit = Literal::u64_unsuffixed(v.unsigned_abs());
            if v < 0 {
                Ok(quote! { -#lit })
            } else {
                Ok(quote! { #lit })
            }
        }
        _ => Err(mismatch(path, "integer in range", &Value::Number(n.clone()))),
    }
}

fn float(n: &Number, path: &str) -> Result<TokenStream> {
    match n.as_f64() {
        Some(v) if v.is_finite() => {
            let lit = Literal::f64_unsuffixed(v.abs());
            if v.is_sign_negative() && v != 0.0 {
                Ok(quote! { -#lit })
            } else {
                Ok(quote! { #lit })
            }
        }
        _ => Err(mismatch(path, "finite number", &Value::Number(n.clone()))),
    }
}
