//! Behavior suite compiler
//!
//! Weaves the shape value builder and the assertion compiler into one test
//! function per case and prints the result as a single source file.

use crate::assertions::AssertionCompiler;
use crate::config::GeneratorConfig;
use crate::error::{GenError, Result};
use crate::naming::request_method_ident;
use crate::shape_builder::ShapeValueBuilder;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use behave_core::{ApiModel, Artifact, BehaviorSuite, Case};
use proc_macro2::{Literal, TokenStream};
use quote::quote;

/// Marker placed at the top of every generated file
pub const GENERATED_HEADER: &str = "// @generated by behave-gen. Do not edit.\n\n";

/// Compiles behavior suites against one API model
pub struct SuiteCompiler<'a> {
    model: &'a ApiModel,
    config: &'a GeneratorConfig,
}

impl<'a> SuiteCompiler<'a> {
    /// Create a compiler
    pub fn new(model: &'a ApiModel, config: &'a GeneratorConfig) -> Self {
        Self { model, config }
    }

    /// Compile a suite into formatted Rust source
    pub fn compile(&self, suite: &BehaviorSuite) -> Result<String> {
        let file: syn::File = syn::parse2(self.compile_tokens(suite)?)
            .map_err(|e| GenError::Render(e.to_string()))?;
        let formatted = prettyplease::unparse(&file);

        tracing::info!("Generated {} behavior tests", suite.tests.cases.len());
        Ok(format!("{GENERATED_HEADER}{formatted}"))
    }

    /// Compile a suite into an unformatted token stream
    pub fn compile_tokens(&self, suite: &BehaviorSuite) -> Result<TokenStream> {
        self.config.validate()?;
        let client = self.config.client()?;
        let runtime = self.config.runtime()?;
        let shapes =
            ShapeValueBuilder::new(self.model, &client).with_base64_blobs(self.config.base64_blobs);
        let assertions = AssertionCompiler::new(&runtime, &shapes);

        let procedures = suite
            .tests
            .cases
            .iter()
            .enumerate()
            .map(|(index, case)| {
                self.procedure(suite, index, case, &client, &runtime, &shapes, &assertions)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(quote! { #(#procedures)* })
    }

    #[allow(clippy::too_many_arguments)]
    fn procedure(
        &self,
        suite: &BehaviorSuite,
        index: usize,
        case: &Case,
        client: &syn::Path,
        runtime: &syn::Path,
        shapes: &ShapeValueBuilder<'_>,
        assertions: &AssertionCompiler<'_>,
    ) -> Result<TokenStream> {
        let fn_name = self.config.test_ident(index)?;
        let name = fn_name.to_string();
        tracing::info!("Compiling case {} as {}: {}", index, name, case.description);

        let operation = self.model.operation(&case.request.operation)?;
        let input = shapes.build_struct(&operation.input, &case.request.input)?;
        let request_method = request_method_ident(&operation.name);

        let overlay = suite.merged_env(case).into_iter().map(|(key, value)| {
            let key = Literal::string(key);
            let value = Literal::string(value);
            quote! { .set(#key, #value) }
        });

        let response = self.response(runtime, index, case)?;

        let compiled = assertions.compile_all(index, operation, &case.expect)?;
        let expects_error = compiled.iter().any(|c| c.kind.artifact() == Artifact::Error);
        let checks = compiled.into_iter().map(|c| c.check);
        let no_error = if expects_error {
            quote! {}
        } else {
            quote! { report.expect_no_send_error(send_error.as_ref()); }
        };

        let doc = if case.description.is_empty() {
            quote! {}
        } else {
            let text = format!(" {}", case.description);
            quote! { #[doc = #text] }
        };
        let report_name = Literal::string(&name);

        Ok(quote! {
            #doc
            #[test]
            #[allow(unused_variables, unused_mut)]
            fn #fn_name() {
                let overlay = #runtime::EnvOverlay::isolated() #(#overlay)*;
                let session = #runtime::Session::from_overlay(&overlay);
                let client = #client::Client::new(&session);

                let input = #input;
                let (mut req, output) = client.#request_method(input);
                req.swap_send_hook(#response);
                let send_error = req.send().err();

                let mut report = #runtime::Report::new(#report_name);
                #(#checks)*
                #no_error
                report.finish();
            }
        })
    }

    /// The substitute send hook built from the case's response block
    fn response(&self, runtime: &syn::Path, index: usize, case: &Case) -> Result<TokenStream> {
        let response = case.response.clone().unwrap_or_default();
        let status = Literal::u16_unsuffixed(response.status());

        let body = if response.is_base64_body() {
            STANDARD
                .decode(response.body_content.trim())
                .map_err(|e| GenError::InvalidBody {
                    case: index,
                    message: e.to_string(),
                })?
        } else {
            response.body_content.into_bytes()
        };
        let body = Literal::byte_string(&body);

        let headers = response.headers.iter().map(|(name, value)| {
            let name = Literal::string(name);
            let value = Literal::string(value);
            quote! { .with(#name, #value) }
        });

        Ok(quote! {
            #runtime::respond_with(#status, #runtime::Headers::new() #(#headers)*, #body.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use behave_core::SuiteLoader;

    const MODEL: &str = r#"{
        "metadata": {"serviceId": "Sample"},
        "operations": {
            "EmptyOperation": {"http": {"method": "POST", "requestUri": "/"}},
            "PutItem": {
                "http": {"method": "PUT", "requestUri": "/items/{Id}"},
                "input": {"shape": "PutItemInput"},
                "output": {"shape": "PutItemOutput"}
            }
        },
        "shapes": {
            "PutItemInput": {
                "type": "structure",
                "required": ["Id"],
                "members": {
                    "Id": {"shape": "String"},
                    "Count": {"shape": "Integer"},
                    "Label": {"shape": "String"}
                }
            },
            "PutItemOutput": {
                "type": "structure",
                "members": {"Version": {"shape": "Integer"}}
            },
            "String": {"type": "string"},
            "Integer": {"type": "integer"}
        }
    }"#;

    const EMPTY_OPERATION: &str = r#"{
        "defaults": {"env": {
            "AWS_REGION": "us-west-2",
            "AWS_ACCESS_KEY": "AKID",
            "AWS_SECRET_ACCESS_KEY": "SECRET"
        }},
        "tests": {
            "cases": [
                {
                    "description": "Empty operation hits the service root",
                    "request": {"operation": "EmptyOperation", "input": {}},
                    "expect": [{"requestUrlMatches": "https://svc.region.example/"}]
                }
            ]
        }
    }"#;

    /// Strip whitespace and the trailing commas the printer adds to wrapped lists
    fn squash(s: &str) -> String {
        let flat: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        flat.replace(",)", ")").replace(",]", "]").replace(",}", "}")
    }

    fn generate(suite: &str) -> Result<String> {
        let model = ApiModel::from_json(MODEL).unwrap();
        let config = GeneratorConfig::default();
        let suite = SuiteLoader::new().load_string(suite).unwrap();
        SuiteCompiler::new(&model, &config).compile(&suite)
    }

    #[test]
    fn test_empty_operation_end_to_end() {
        let out = generate(EMPTY_OPERATION).unwrap();
        let flat = squash(&out);

        assert!(out.starts_with("// @generated"), "Missing header:\n{out}");
        assert!(out.contains("/// Empty operation hits the service root"), "{out}");
        assert!(out.contains("fn behavior_000()"), "{out}");
        for fragment in [
            ".set(\"AWS_ACCESS_KEY\",\"AKID\")",
            "client::Client::new(&session)",
            "letinput=client::EmptyOperationInput{};",
            "client.empty_operation_request(input)",
            "behave_testing::respond_with(200,behave_testing::Headers::new(),b\"\".to_vec())",
            "behave_testing::assert_request_url_matches(&mutreq,\"https://svc.region.example/\")",
            "report.expect_no_send_error(send_error.as_ref());",
            "report.finish();",
        ] {
            assert!(flat.contains(fragment), "Missing {fragment}:\n{out}");
        }

        syn::parse_file(&out).unwrap();
    }

    #[test]
    fn test_env_overlay_precedence_and_order() {
        let suite = r#"{
            "defaults": {"env": {"AWS_SECRET_ACCESS_KEY": "s", "AWS_REGION": "us-east-1"}},
            "tests": {
                "defaults": {"env": {"AWS_REGION": "eu-west-1"}},
                "cases": [{
                    "localConfig": {"AWS_REGION": "ap-south-1"},
                    "request": {"operation": "EmptyOperation"}
                }]
            }
        }"#;
        let out = generate(suite).unwrap();

        assert!(squash(&out).contains("\"AWS_REGION\",\"ap-south-1\""), "{out}");
        assert!(!out.contains("eu-west-1"), "{out}");
        let region = out.find("AWS_REGION").unwrap();
        let secret = out.find("AWS_SECRET_ACCESS_KEY").unwrap();
        assert!(region < secret, "overlay keys not sorted:\n{out}");
    }

    #[test]
    fn test_output_is_deterministic() {
        let a = r#"{"tests": {"cases": [{
            "request": {"operation": "PutItem", "input": {"Label": "x", "Count": 2, "Id": "a"}},
            "response": {
                "statusCode": 200,
                "headers": {"X-B": "2", "X-A": "1"},
                "bodyContent": "{}"
            },
            "expect": [{"requestMethodEquals": "PUT"}]
        }]}}"#;
        let b = r#"{"tests": {"cases": [{
            "request": {"operation": "PutItem", "input": {"Id": "a", "Count": 2, "Label": "x"}},
            "response": {
                "headers": {"X-A": "1", "X-B": "2"},
                "statusCode": 200,
                "bodyContent": "{}"
            },
            "expect": [{"requestMethodEquals": "PUT"}]
        }]}}"#;

        let out = generate(a).unwrap();
        assert_eq!(out, generate(b).unwrap());
        assert_eq!(out, generate(a).unwrap());

        let flat = squash(&out);
        let id = flat
            .find("id:::std::string::String::from(\"a\")")
            .unwrap_or_else(|| panic!("{out}"));
        let count = flat.find("count:Some(2)").unwrap();
        assert!(id < count, "fields not in declared order:\n{out}");
        assert!(flat.contains(".with(\"X-A\",\"1\")"), "{out}");
    }

    #[test]
    fn test_unknown_field_aborts() {
        let suite = r#"{"tests": {"cases": [{
            "request": {"operation": "PutItem", "input": {"Id": "a", "Colour": "red"}}
        }]}}"#;
        let err = generate(suite).unwrap_err();
        assert!(matches!(err, GenError::FieldMismatch { ref field, .. } if field == "Colour"));
    }

    #[test]
    fn test_unknown_operation_aborts() {
        let suite = r#"{"tests": {"cases": [{"request": {"operation": "DeleteEverything"}}]}}"#;
        let err = generate(suite).unwrap_err();
        assert!(err.to_string().contains("DeleteEverything"), "{err}");
    }

    #[test]
    fn test_error_response_case() {
        let suite = r#"{"tests": {"cases": [{
            "request": {"operation": "PutItem", "input": {"Id": "a"}},
            "response": {
                "statusCode": 404,
                "bodyType": "base64",
                "bodyContent": "eyJtZXNzYWdlIjoibm9wZSJ9",
                "headers": {"x-amzn-errortype": "NotFound"}
            },
            "expect": [
                {"responseErrorIsKindOf": "NotFound"},
                {"responseErrorMessageEquals": "nope"}
            ]
        }]}}"#;
        let out = generate(suite).unwrap();

        assert!(squash(&out).contains("respond_with(404,"), "{out}");
        assert!(out.contains(r#"b"{\"message\":\"nope\"}""#), "body not decoded:\n{out}");
        assert!(!out.contains("expect_no_send_error"), "{out}");

        let first = out.find("responseErrorIsKindOf").unwrap();
        let second = out.find("responseErrorMessageEquals").unwrap();
        assert!(first < second, "expectations out of order:\n{out}");
    }

    #[test]
    fn test_invalid_base64_body_aborts() {
        let suite = r#"{"tests": {"cases": [{
            "request": {"operation": "EmptyOperation"},
            "response": {"bodyType": "binary", "bodyContent": "%%%"}
        }]}}"#;
        let err = generate(suite).unwrap_err();
        assert!(matches!(err, GenError::InvalidBody { case: 0, .. }));
    }

    #[test]
    fn test_fixture_matches_generator() {
        let model = ApiModel::from_json(include_str!("../../fixtures/model.json")).unwrap();
        let config =
            GeneratorConfig::from_yaml_str(include_str!("../../fixtures/behave.yaml")).unwrap();
        let suite = SuiteLoader::new()
            .load_string(include_str!("../../fixtures/behavior.json"))
            .unwrap();
        let out = SuiteCompiler::new(&model, &config).compile(&suite).unwrap();

        let fixture = include_str!("../../fixtures/generated.rs");
        assert!(fixture.starts_with(GENERATED_HEADER), "fixture lost its header");
        let canonical = |source: &str| prettyplease::unparse(&syn::parse_file(source).unwrap());
        assert_eq!(
            canonical(&out),
            canonical(fixture),
            "fixtures/generated.rs is stale; regenerate it with behave-gen"
        );
    }

    #[test]
    fn test_squash_drops_wrapped_trailing_commas() {
        let wrapped = "f(\n    &mut req,\n    \"https://a.example/\",\n);";
        assert_eq!(squash(wrapped), "f(&mutreq,\"https://a.example/\");");
    }

    #[test]
    fn test_invalid_test_prefix_aborts() {
        let model = ApiModel::from_json(MODEL).unwrap();
        let config = GeneratorConfig {
            test_prefix: "bad prefix".to_string(),
            ..GeneratorConfig::default()
        };
        let suite = SuiteLoader::new().load_string(EMPTY_OPERATION).unwrap();
        let err = SuiteCompiler::new(&model, &config).compile(&suite).unwrap_err();
        assert!(matches!(err, GenError::Config(_)), "{err}");
    }

    #[test]
    fn test_one_function_per_case() {
        let suite = r#"{"tests": {"cases": [
            {"request": {"operation": "EmptyOperation"}},
            {"request": {"operation": "EmptyOperation"}},
            {"request": {"operation": "PutItem", "input": {"Id": "z"}}}
        ]}}"#;
        let out = generate(suite).unwrap();
        let file = syn::parse_file(&out).unwrap();
        let names: Vec<String> = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Fn(f) => Some(f.sig.ident.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(names, ["behavior_000", "behavior_001", "behavior_002"]);
    }
}
