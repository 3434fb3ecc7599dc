//! Compiles `expect` entries into predicate invocations
//!
//! Each entry becomes a `report.check(..)` statement that calls the runtime
//! predicate bound to its kind with the artifact it inspects and the expected
//! argument rendered per the kind's argument form.

use crate::error::{GenError, Result};
use crate::shape_builder::ShapeValueBuilder;
use behave_core::model::Operation;
use behave_core::{ArgumentForm, Artifact, AssertionKind, Expectation};
use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::quote;
use serde_json::Value;
use std::collections::BTreeMap;

/// One compiled assertion statement
#[derive(Debug, Clone)]
pub struct CompiledAssertion {
    pub kind: AssertionKind,
    pub check: TokenStream,
}

/// Turns expectations of one case into checks against the emitted locals
///
/// The emitted code is expected to bind `req`, `output`, `send_error` and
/// `report`.
pub struct AssertionCompiler<'a> {
    runtime: &'a syn::Path,
    shapes: &'a ShapeValueBuilder<'a>,
}

impl<'a> AssertionCompiler<'a> {
    pub fn new(runtime: &'a syn::Path, shapes: &'a ShapeValueBuilder<'a>) -> Self {
        Self { runtime, shapes }
    }

    /// Compile every expectation of a case, keeping document order
    pub fn compile_all(
        &self,
        case: usize,
        operation: &Operation,
        expect: &[Expectation],
    ) -> Result<Vec<CompiledAssertion>> {
        expect
            .iter()
            .map(|expectation| self.compile(case, operation, expectation))
            .collect()
    }

    /// Compile a single expectation
    pub fn compile(
        &self,
        case: usize,
        operation: &Operation,
        expectation: &Expectation,
    ) -> Result<CompiledAssertion> {
        let kind = expectation.kind;
        let runtime = self.runtime;
        let predicate = Ident::new(kind.predicate(), Span::call_site());
        let label = kind.name();

        let artifact = match kind.artifact() {
            Artifact::Request => quote! { &mut req },
            Artifact::Response => quote! { &output },
            Artifact::Error => quote! { send_error.as_ref() },
        };
        let argument = self.argument(case, operation, expectation)?;

        tracing::debug!("case {}: {} -> {}", case, label, kind.predicate());
        Ok(CompiledAssertion {
            kind,
            check: quote! {
                report.check(#label, #runtime::#predicate(#artifact, #argument));
            },
        })
    }

    fn argument(
        &self,
        case: usize,
        operation: &Operation,
        expectation: &Expectation,
    ) -> Result<TokenStream> {
        let kind = expectation.kind;
        let invalid = |message: String| GenError::InvalidExpectation {
            case,
            kind: kind.name().to_string(),
            message,
        };

        match (kind.argument_form(), &expectation.expected) {
            (ArgumentForm::Text, Value::String(text)) => {
                let lit = Literal::string(text);
                Ok(quote! { #lit })
            }
            // A JSON body may be written inline as a document
            (ArgumentForm::Text, value) if kind == AssertionKind::RequestBodyEqualsJson => {
                let lit = Literal::string(&value.to_string());
                Ok(quote! { #lit })
            }
            (ArgumentForm::Text, value) => {
                Err(invalid(format!("expected a string, found {value}")))
            }
            (ArgumentForm::HeaderTable, Value::Object(headers)) => {
                let sorted: BTreeMap<&String, &Value> = headers.iter().collect();
                let pairs = sorted
                    .into_iter()
                    .map(|(name, value)| match value {
                        Value::String(value) => {
                            let name = Literal::string(name);
                            let value = Literal::string(value);
                            Ok(quote! { (#name, #value) })
                        }
                        other => Err(invalid(format!(
                            "header {name} must be a string, found {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(quote! { &[#(#pairs),*] })
            }
            (ArgumentForm::HeaderTable, value) => {
                Err(invalid(format!("expected a header mapping, found {value}")))
            }
            (ArgumentForm::JsonDocument, Value::String(text)) => {
                serde_json::from_str::<Value>(text)
                    .map_err(|e| invalid(format!("invalid JSON document: {e}")))?;
                let lit = Literal::string(text);
                Ok(quote! { #lit })
            }
            (ArgumentForm::JsonDocument, value) => {
                let lit = Literal::string(&value.to_string());
                Ok(quote! { #lit })
            }
            (ArgumentForm::OutputShape, value) => {
                let path = format!("{}.output", operation.name);
                let literal = self.shapes.build(&operation.output, value, &path)?;
                Ok(quote! { &#literal })
            }
        }
    }
}
