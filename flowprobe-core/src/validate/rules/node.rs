use std::collections::HashSet;

use crate::compatibility::check_assertion;
use crate::types::{DebugNode, DelayNode, Node, Output, RequestNode};
use crate::validate::validator::{Validator, METHOD_RE};

pub(crate) fn validate_node(v: &mut Validator, node: &Node, path: &str) {
    match node {
        Node::Request(n) => validate_request(v, n, path),
        Node::Delay(n) => validate_delay(v, n, path),
        Node::Debug(n) => validate_debug(v, n, path),
    }
}

fn validate_request(v: &mut Validator, n: &RequestNode, path: &str) {
    if n.data.url.trim().is_empty() {
        v.push(format!("{path}.data.url"), "must not be empty");
    }
    if !METHOD_RE.is_match(&n.data.method) {
        v.push(
            format!("{path}.data.method"),
            format!("'{}' is not an upper-case HTTP method", n.data.method),
        );
    }
    if n.data.timeout == Some(0) {
        v.push(format!("{path}.data.timeout"), "must be greater than zero");
    }

    for (i, a) in n.assertions.iter().enumerate() {
        if let Err(e) = check_assertion(a) {
            v.push(format!("{path}.assertions[{i}]"), e.to_string());
        }
    }
    validate_outputs(v, &n.outputs, path);
}

fn validate_outputs(v: &mut Validator, outputs: &[Output], path: &str) {
    let mut names = HashSet::new();
    for (i, o) in outputs.iter().enumerate() {
        let p = format!("{path}.outputs[{i}].name");
        if o.name.trim().is_empty() {
            v.push(p, "must not be empty");
        } else if !names.insert(o.name.as_str()) {
            v.push(p, format!("duplicate output name '{}'", o.name));
        }
    }
}

fn validate_delay(v: &mut Validator, n: &DelayNode, path: &str) {
    for (i, r) in n.data.passthrough.iter().enumerate() {
        if r.trim().is_empty() {
            v.push(format!("{path}.data.passthrough[{i}]"), "must not be empty");
        }
    }
}

fn validate_debug(v: &mut Validator, n: &DebugNode, path: &str) {
    if n.data.expressions.is_empty() {
        v.push(format!("{path}.data.expressions"), "must list at least one expression");
    }
}
