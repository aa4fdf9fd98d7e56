mod machine;
mod request;
mod result;
mod scope;

pub use request::RequestContext;
pub use result::{MatchResult, MatchStats, NOT_FOUND_CODE};
pub use scope::{Frame, MatchScope};

use crate::codegen::Program;
use machine::Machine;

/// Evaluates `program` for one request; unmatched requests yield [`MatchResult::not_found`].
#[tracing::instrument(level = "trace", skip(program, request), fields(path = request.path()))]
pub fn execute(program: &Program, request: &RequestContext<'_>) -> (MatchResult, MatchStats) {
    Machine::new(request).run(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FunctionRegistry, RouterOptions, SpecNode, compile};
    use std::collections::HashMap;

    #[test]
    fn execute_accepts_requests_borrowed_for_a_single_iteration() {
        let spec = SpecNode::router()
            .child(SpecNode::path("{id}").child(SpecNode::returning().attr("id", "{id}")));
        let options = RouterOptions::default();
        let router =
            compile(&spec, &options, &FunctionRegistry::new()).expect("routes should compile");

        for id in ["1", "22"] {
            let attributes = HashMap::from([("PATH_INFO".to_string(), format!("/{id}"))]);
            let request = RequestContext::new(
                &attributes,
                &options.path_attributes,
                &options.query_attribute,
            );
            let (result, stats) = execute(router.program(), &request);

            assert_eq!(result.get("id"), Some(id));
            assert_eq!(stats.advances, 1);
        }
    }
}
