// @generated by behave-gen. Do not edit.

/// Empty operation posts an empty document to the service root
#[test]
#[allow(unused_variables, unused_mut)]
fn behavior_000() {
    let overlay = crate::EnvOverlay::isolated()
        .set("AWS_ACCESS_KEY", "AKID")
        .set("AWS_REGION", "region")
        .set("AWS_SECRET_ACCESS_KEY", "SECRET");
    let session = crate::Session::from_overlay(&overlay);
    let client = client::Client::new(&session);
    let input = client::EmptyOperationInput {};
    let (mut req, output) = client.empty_operation_request(input);
    req.swap_send_hook(crate::respond_with(200, crate::Headers::new(), b"".to_vec()));
    let send_error = req.send().err();
    let mut report = crate::Report::new("behavior_000");
    report.check("requestMethodEquals", crate::assert_request_method_equals(&mut req, "POST"));
    report
        .check(
            "requestUrlMatches",
            crate::assert_request_url_matches(&mut req, "https://svc.region.example/"),
        );
    report
        .check("requestBodyEqualsJson", crate::assert_request_body_equals_json(&mut req, "{}"));
    report
        .check(
            "requestBodyEqualsString",
            crate::assert_request_body_equals_string(&mut req, "{}"),
        );
    report
        .check(
            "requestBodyEqualsString",
            crate::assert_request_body_equals_string(&mut req, "{}"),
        );
    report.expect_no_send_error(send_error.as_ref());
    report.finish();
}
/// GetThing decodes the response into the output
#[test]
#[allow(unused_variables, unused_mut)]
fn behavior_001() {
    let overlay = crate::EnvOverlay::isolated()
        .set("AWS_ACCESS_KEY", "AKID")
        .set("AWS_REGION", "region")
        .set("AWS_SECRET_ACCESS_KEY", "SECRET");
    let session = crate::Session::from_overlay(&overlay);
    let client = client::Client::new(&session);
    let input = client::GetThingInput {
        name: ::std::string::String::from("box"),
        verbose: Some(true),
    };
    let (mut req, output) = client.get_thing_request(input);
    req.swap_send_hook(
        crate::respond_with(
            200,
            crate::Headers::new().with("x-amzn-requestid", "req-1"),
            b"{\"Size\": 3, \"Tags\": [\"a\", \"b\"]}".to_vec(),
        ),
    );
    let send_error = req.send().err();
    let mut report = crate::Report::new("behavior_001");
    report.check("requestMethodEquals", crate::assert_request_method_equals(&mut req, "GET"));
    report
        .check(
            "requestUrlPathMatches",
            crate::assert_request_url_path_matches(&mut req, "/things/box"),
        );
    report
        .check(
            "requestUrlQueryMatches",
            crate::assert_request_url_query_matches(
                &mut req,
                "https://svc.region.example/things/box?verbose=true",
            ),
        );
    report
        .check(
            "requestHeadersMatch",
            crate::assert_request_headers_match(
                &mut req,
                &[("Accept", "application/json")],
            ),
        );
    report.check("requestIdEquals", crate::assert_request_id_equals(&mut req, "req-1"));
    report
        .check(
            "responseDataEquals",
            crate::assert_response_data_equals(
                &output,
                &client::GetThingOutput {
                    size: Some(3),
                    tags: Some(
                        vec![
                            ::std::string::String::from("a"), ::std::string::String::from("b")
                        ],
                    ),
                },
            ),
        );
    report.expect_no_send_error(send_error.as_ref());
    report.finish();
}
/// GetThing surfaces a service error in the overridden region
#[test]
#[allow(unused_variables, unused_mut)]
fn behavior_002() {
    let overlay = crate::EnvOverlay::isolated()
        .set("AWS_ACCESS_KEY", "AKID")
        .set("AWS_REGION", "eu-west-1")
        .set("AWS_SECRET_ACCESS_KEY", "SECRET");
    let session = crate::Session::from_overlay(&overlay);
    let client = client::Client::new(&session);
    let input = client::GetThingInput {
        name: ::std::string::String::from("gone"),
        ..Default::default()
    };
    let (mut req, output) = client.get_thing_request(input);
    req.swap_send_hook(
        crate::respond_with(
            404,
            crate::Headers::new()
                .with("x-amzn-errortype", "NotFound")
                .with("x-amzn-requestid", "req-2"),
            b"{\"message\":\"no such thing\"}".to_vec(),
        ),
    );
    let send_error = req.send().err();
    let mut report = crate::Report::new("behavior_002");
    report
        .check(
            "requestUrlMatches",
            crate::assert_request_url_matches(
                &mut req,
                "https://svc.eu-west-1.example/things/gone",
            ),
        );
    report
        .check(
            "responseErrorIsKindOf",
            crate::assert_response_error_is_kind_of(send_error.as_ref(), "NotFound"),
        );
    report
        .check(
            "responseErrorMessageEquals",
            crate::assert_response_error_message_equals(
                send_error.as_ref(),
                "no such thing",
            ),
        );
    report
        .check(
            "responseErrorRequestIdEquals",
            crate::assert_response_error_request_id_equals(send_error.as_ref(), "req-2"),
        );
    report
        .check(
            "responseErrorDataEquals",
            crate::assert_response_error_data_equals(
                send_error.as_ref(),
                "{\"message\":\"no such thing\"}",
            ),
        );
    report.finish();
}
