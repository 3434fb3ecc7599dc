//! The closed set of assertion kinds a case may expect

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Runtime artifact an assertion inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// The constructed wire request
    Request,
    /// The deserialized output of the simulated response
    Response,
    /// The error returned from sending
    Error,
}

/// How the expected value of an assertion is rendered into generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentForm {
    /// A plain string literal
    Text,
    /// A header name/value table
    HeaderTable,
    /// A JSON document carried as a string literal
    JsonDocument,
    /// A literal of the operation's output shape
    OutputShape,
}

/// Raised when an expectation names a kind outside the closed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown assertion kind `{0}`")]
pub struct UnknownAssertionKind(pub String);

macro_rules! assertion_kinds {
    ($( $variant:ident => $name:literal, $artifact:ident, $form:ident, $predicate:literal; )*) => {
        /// One of the closed set of assertion kinds
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum AssertionKind {
            $( $variant, )*
        }

        impl AssertionKind {
            /// Every assertion kind, in declaration order
            pub const ALL: &'static [AssertionKind] = &[ $( AssertionKind::$variant, )* ];

            /// The name used for this kind in suite documents
            pub const fn name(&self) -> &'static str {
                match self {
                    $( AssertionKind::$variant => $name, )*
                }
            }

            /// The artifact this kind inspects
            pub const fn artifact(&self) -> Artifact {
                match self {
                    $( AssertionKind::$variant => Artifact::$artifact, )*
                }
            }

            /// How the expected value is rendered
            pub const fn argument_form(&self) -> ArgumentForm {
                match self {
                    $( AssertionKind::$variant => ArgumentForm::$form, )*
                }
            }

            /// Name of the runtime predicate implementing this kind
            pub const fn predicate(&self) -> &'static str {
                match self {
                    $( AssertionKind::$variant => $predicate, )*
                }
            }
        }

        impl FromStr for AssertionKind {
            type Err = UnknownAssertionKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(AssertionKind::$variant), )*
                    other => Err(UnknownAssertionKind(other.to_string())),
                }
            }
        }
    };
}

assertion_kinds! {
    RequestMethodEquals => "requestMethodEquals", Request, Text, "assert_request_method_equals";
    RequestUrlMatches => "requestUrlMatches", Request, Text, "assert_request_url_matches";
    RequestUrlPathMatches => "requestUrlPathMatches", Request, Text,
        "assert_request_url_path_matches";
    RequestUrlQueryMatches => "requestUrlQueryMatches", Request, Text,
        "assert_request_url_query_matches";
    RequestHeadersMatch => "requestHeadersMatch", Request, HeaderTable,
        "assert_request_headers_match";
    RequestBodyEqualsBytes => "requestBodyEqualsBytes", Request, Text,
        "assert_request_body_equals_bytes";
    RequestBodyEqualsJson => "requestBodyEqualsJson", Request, Text,
        "assert_request_body_equals_json";
    RequestBodyMatchesXml => "requestBodyMatchesXml", Request, Text,
        "assert_request_body_matches_xml";
    RequestBodyEqualsString => "requestBodyEqualsString", Request, Text,
        "assert_request_body_equals_string";
    RequestIdEquals => "requestIdEquals", Request, Text, "assert_request_id_equals";
    ResponseDataEquals => "responseDataEquals", Response, OutputShape,
        "assert_response_data_equals";
    ResponseErrorIsKindOf => "responseErrorIsKindOf", Error, Text,
        "assert_response_error_is_kind_of";
    ResponseErrorMessageEquals => "responseErrorMessageEquals", Error, Text,
        "assert_response_error_message_equals";
    ResponseErrorDataEquals => "responseErrorDataEquals", Error, JsonDocument,
        "assert_response_error_data_equals";
    ResponseErrorRequestIdEquals => "responseErrorRequestIdEquals", Error, Text,
        "assert_response_error_request_id_equals";
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_kind_round_trips_by_name() {
        for kind in AssertionKind::ALL {
            assert_eq!(kind.name().parse::<AssertionKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_predicates_are_distinct() {
        let predicates: HashSet<_> = AssertionKind::ALL.iter().map(|k| k.predicate()).collect();
        assert_eq!(predicates.len(), AssertionKind::ALL.len());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = "requestSmellsNice".parse::<AssertionKind>().unwrap_err();
        assert_eq!(err, UnknownAssertionKind("requestSmellsNice".to_string()));
    }

    #[test]
    fn test_artifacts() {
        assert_eq!(AssertionKind::RequestIdEquals.artifact(), Artifact::Request);
        assert_eq!(AssertionKind::ResponseDataEquals.artifact(), Artifact::Response);
        assert_eq!(
            AssertionKind::ResponseErrorRequestIdEquals.artifact(),
            Artifact::Error
        );
    }
}
