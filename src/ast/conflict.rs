use crate::ast::node::{NodeId, NodeKind};
use crate::ast::tree::Ast;
use crate::ast::{AstError, AstResult};

/// Rejects `literal` if a literal path with the same text is already reachable
/// at the dispatch level of `parent`, looking through blank paths.
///
/// Parameterized siblings are not compared; declaration order decides between them.
pub(crate) fn check_literal(ast: &Ast, parent: NodeId, literal: &str) -> AstResult<()> {
    let level = ast.scope_owner(parent);
    let clash = ast.effective_children(level).into_iter().any(|sibling| {
        matches!(
            &ast.node(sibling).kind,
            NodeKind::Path { pattern, .. } if pattern.literal() == Some(literal)
        )
    });

    if clash {
        tracing::event!(tracing::Level::DEBUG, literal, level = %level, "duplicate literal path");
        return Err(AstError::DuplicateLiteral {
            literal: literal.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::ast::{AstError, build_ast};
    use crate::spec::SpecNode;

    fn expect_duplicate(spec: SpecNode, literal: &str) {
        match build_ast(&spec).expect_err("duplicate literal should fail") {
            AstError::DuplicateLiteral { literal: found } => assert_eq!(found, literal),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_equal_literal_siblings() {
        expect_duplicate(
            SpecNode::router()
                .child(SpecNode::path("about"))
                .child(SpecNode::path("/about/")),
            "about",
        );
    }

    #[test]
    fn rejects_duplicates_spliced_through_groups() {
        expect_duplicate(
            SpecNode::router()
                .child(SpecNode::group().child(SpecNode::path("news")))
                .child(SpecNode::path("news")),
            "news",
        );
        expect_duplicate(
            SpecNode::router()
                .child(SpecNode::path("news"))
                .child(SpecNode::group().child(SpecNode::group().child(SpecNode::path("news")))),
            "news",
        );
    }

    #[test]
    fn rejects_duplicates_introduced_by_ref() {
        expect_duplicate(
            SpecNode::router()
                .child(SpecNode::block("common").child(SpecNode::path("help")))
                .child(SpecNode::path("help"))
                .child(SpecNode::reference("common")),
            "help",
        );
    }

    #[test]
    fn allows_same_literal_under_different_parents() {
        let spec = SpecNode::router()
            .child(SpecNode::path("a").child(SpecNode::path("edit")))
            .child(SpecNode::path("b").child(SpecNode::path("edit")));
        build_ast(&spec).expect("literals under different parents do not clash");
    }

    #[test]
    fn parameterized_siblings_are_not_compared() {
        let spec = SpecNode::router()
            .child(SpecNode::path("{id:int}"))
            .child(SpecNode::path("{id:int}"))
            .child(SpecNode::path("{slug}"));
        build_ast(&spec).expect("overlapping parameterized siblings are accepted");
    }
}
