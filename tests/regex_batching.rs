use bunner_route_compiler::{
    CompiledRouter, FunctionRegistry, MatchStats, RouterOptions, SpecNode, compile,
};

const SMALL_LIMIT: usize = 64;

fn build(spec: &SpecNode, limit: usize) -> CompiledRouter {
    let options = RouterOptions::builder()
        .regex_group_limit(limit)
        .build()
        .expect("options should build");
    compile(spec, &options, &FunctionRegistry::new()).expect("routes should compile")
}

/// Parameterized siblings whose first and last alternatives overlap on `item-<digits>`.
fn catalog_spec() -> SpecNode {
    let mut level = SpecNode::path("c")
        .child(SpecNode::path("item-{id:int}").child(SpecNode::returning().attr("via", "int:{id}")));
    for i in 0..20 {
        level = level.child(
            SpecNode::path(format!("p{i}-{{v:int}}"))
                .child(SpecNode::returning().attr("via", format!("p{i}:{{v}}"))),
        );
    }
    level = level.child(
        SpecNode::path("item-{slug}").child(SpecNode::returning().attr("via", "slug:{slug}")),
    );
    SpecNode::router().child(level)
}

#[test]
fn batching_when_limit_is_small_then_alternations_are_split() {
    let spec = catalog_spec();
    let small = build(&spec, SMALL_LIMIT);
    let whole = build(&spec, RouterOptions::default().regex_group_limit);

    assert_eq!(whole.program().regex_groups(), 1);
    assert!(small.program().regex_groups() > 1);
    assert_eq!(small.program().branches(), 22);
    assert_eq!(whole.program().branches(), 22);
}

#[test]
fn batching_when_split_across_groups_then_results_match_unsplit_order() {
    let spec = catalog_spec();
    let small = build(&spec, SMALL_LIMIT);
    let whole = build(&spec, RouterOptions::default().regex_group_limit);

    let cases = [
        ("/c/item-5", Some("int:5")),
        ("/c/item-five", Some("slug:five")),
        ("/c/p0-1", Some("p0:1")),
        ("/c/p19-42", Some("p19:42")),
        ("/c/p7-x", None),
        ("/c/zzz", None),
    ];
    for (path, expected) in cases {
        let a = small.route_path(path);
        let b = whole.route_path(path);
        assert_eq!(a, b, "results differ for {path}");
        assert_eq!(a.get("via"), expected, "unexpected result for {path}");
    }
}

#[test]
fn batching_when_compiled_twice_then_programs_are_identical() {
    let spec = catalog_spec();
    let first = build(&spec, SMALL_LIMIT);
    let second = build(&spec, SMALL_LIMIT);
    assert_eq!(first.program().to_string(), second.program().to_string());
}

#[test]
fn cursor_when_path_matches_then_advances_once_per_level() {
    let spec = SpecNode::router().child(
        SpecNode::path("a").child(
            SpecNode::path("{b:int}").child(
                SpecNode::path("c").child(SpecNode::returning().attr("render", "abc.php")),
            ),
        ),
    );
    let router = build(&spec, RouterOptions::default().regex_group_limit);

    let (result, stats) = router.route_with_stats(&path_request("/a/1/c"));
    assert_eq!(result.render(), Some("abc.php"));
    assert_eq!(stats, MatchStats { advances: 3, retreats: 0 });

    let (result, stats) = router.route_with_stats(&path_request("/a/1/d"));
    assert!(result.is_not_found());
    assert_eq!(stats, MatchStats { advances: 3, retreats: 3 });

    let (_, stats) = router.route_with_stats(&path_request("/a"));
    assert_eq!(stats, MatchStats { advances: 1, retreats: 1 });
}

fn path_request(path: &str) -> std::collections::HashMap<String, String> {
    std::collections::HashMap::from([("PATH_INFO".to_string(), path.to_string())])
}
