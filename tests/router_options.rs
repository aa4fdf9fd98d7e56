use bunner_route_compiler::{
    DEFAULT_PATH_ATTRIBUTES, DEFAULT_QUERY_ATTRIBUTE, FunctionRegistry, RouterError,
    RouterOptions, RouterOptionsError, SpecNode, codegen::DEFAULT_REGEX_GROUP_LIMIT, compile,
};
use std::collections::HashMap;

#[test]
fn router_options_when_defaulted_then_values_match_constants() {
    let options = RouterOptions::default();
    assert_eq!(options.regex_group_limit, DEFAULT_REGEX_GROUP_LIMIT);
    assert_eq!(options.regex_group_limit, 16 * 1024);
    assert_eq!(options.path_attributes, DEFAULT_PATH_ATTRIBUTES.to_vec());
    assert_eq!(options.query_attribute, DEFAULT_QUERY_ATTRIBUTE);
    assert!(!options.debug);
    options.validate().expect("defaults should validate");
}

#[test]
fn router_options_when_all_fields_customized_then_values_are_assigned() {
    let options = RouterOptions::builder()
        .regex_group_limit(1024)
        .path_attributes(["URI"])
        .query_attribute("QS")
        .debug(true)
        .build()
        .expect("options should build");

    assert_eq!(options.regex_group_limit, 1024);
    assert_eq!(options.path_attributes, vec!["URI".to_string()]);
    assert_eq!(options.query_attribute, "QS");
    assert!(options.debug);
}

#[test]
fn router_options_when_limit_too_small_then_returns_error() {
    let err = RouterOptions::builder()
        .regex_group_limit(10)
        .build()
        .expect_err("tiny limit should be rejected");
    assert_eq!(
        err,
        RouterOptionsError::RegexGroupLimitTooSmall {
            provided: 10,
            min: 64
        }
    );
}

#[test]
fn router_options_when_attributes_blank_then_returns_error() {
    let err = RouterOptions::builder()
        .path_attributes(["", "  "])
        .build()
        .expect_err("blank path attributes should be rejected");
    assert_eq!(err, RouterOptionsError::EmptyPathAttributes);

    let err = RouterOptions::builder()
        .query_attribute(" ")
        .build()
        .expect_err("blank query attribute should be rejected");
    assert_eq!(err, RouterOptionsError::EmptyQueryAttribute);
}

#[test]
fn router_options_when_deserialized_partially_then_missing_fields_default() {
    let options: RouterOptions =
        serde_json::from_str(r#"{ "debug": true, "regex_group_limit": 2048 }"#)
            .expect("options should deserialize");

    assert!(options.debug);
    assert_eq!(options.regex_group_limit, 2048);
    assert_eq!(options.query_attribute, DEFAULT_QUERY_ATTRIBUTE);
}

#[test]
fn router_options_when_invalid_options_passed_to_compile_then_returns_error() {
    let options = RouterOptions {
        regex_group_limit: 1,
        ..RouterOptions::default()
    };
    let err = compile(&SpecNode::router(), &options, &FunctionRegistry::new());

    match err.expect_err("invalid options should fail compilation") {
        RouterError::Options(RouterOptionsError::RegexGroupLimitTooSmall { provided, .. }) => {
            assert_eq!(provided, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn router_options_when_custom_attributes_set_then_request_is_read_from_them() {
    let options = RouterOptions::builder()
        .path_attributes(["URI"])
        .query_attribute("QS")
        .build()
        .expect("options should build");
    let spec = SpecNode::router().child(
        SpecNode::path("find").child(SpecNode::returning().attr("q", "{q}")),
    );
    let router = compile(&spec, &options, &FunctionRegistry::new()).expect("should compile");

    let request = HashMap::from([
        ("URI".to_string(), "/find".to_string()),
        ("QS".to_string(), "q=rust".to_string()),
        ("PATH_INFO".to_string(), "/ignored".to_string()),
    ]);
    assert_eq!(router.route(&request).get("q"), Some("rust"));
    assert_eq!(router.route_path("/find?q=go").get("q"), Some("go"));
}

#[test]
fn router_options_when_first_path_attribute_empty_then_next_is_used() {
    let spec = SpecNode::router().child(
        SpecNode::path("a").child(SpecNode::returning().attr("render", "a.php")),
    );
    let router = compile(&spec, &RouterOptions::default(), &FunctionRegistry::new())
        .expect("should compile");

    let request = HashMap::from([
        ("PATH_INFO".to_string(), String::new()),
        ("REQUEST_URI".to_string(), "/a?x=1".to_string()),
    ]);
    assert_eq!(router.route(&request).render(), Some("a.php"));
}
