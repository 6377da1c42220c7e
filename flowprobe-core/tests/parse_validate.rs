use flowprobe_core::{
    parse_flow_str, validate_flow, EdgeSide, Extractor, FlowFormat, GraphError, Node, NodeType,
    Operator, ParseError,
};
use flowprobe_core::types::{EdgeType, InputRef};

fn user_flow_yaml() -> &'static str {
    r#"
name: user-signup
description: create a user then fetch it
version: "1"
initialInputs:
  baseUrl: https://api.example.com
edges:
  - id: e1
    source: create
    target: fetch
    type: success
nodes:
  - id: create
    type: request
    data:
      method: POST
      url: "{{baseUrl}}/users"
      headers:
        Content-Type: application/json
      body:
        name: "{{ userName }}"
      timeout: 5000
    assertions:
      - extractorType: statusCode
        operatorType: between
        operatorData: { min: 200, max: 299 }
    outputs:
      - name: userId
        extractor: { type: jsonPath, path: "$.id" }
  - id: fetch
    type: request
    data:
      url: "{{baseUrl}}/users/{{create.userId}}"
"#
}

#[test]
fn parse_yaml_and_validate_ok() {
    let parsed = parse_flow_str(user_flow_yaml(), FlowFormat::Yaml).unwrap();
    validate_flow(&parsed.flow).unwrap();
    assert_eq!(parsed.flow.name, "user-signup");
    assert_eq!(parsed.flow.edges[0].edge_type, EdgeType::Success);
}

#[test]
fn parse_auto_detects_yaml() {
    let parsed = parse_flow_str(user_flow_yaml(), FlowFormat::Auto).unwrap();
    assert_eq!(parsed.format, FlowFormat::Yaml);
}

#[test]
fn input_schema_is_inferred_from_templates() {
    let parsed = parse_flow_str(user_flow_yaml(), FlowFormat::Auto).unwrap();
    let create = parsed.flow.node("create").unwrap();
    assert_eq!(create.input_schema(), vec!["baseUrl", "userName"]);
    assert_eq!(create.output_schema(), vec!["userId"]);

    let fetch = parsed.flow.node("fetch").unwrap();
    assert_eq!(fetch.input_schema(), vec!["baseUrl", "create.userId"]);
    let schema = fetch.input_schema();
    let r = InputRef::parse(&schema[1]);
    assert_eq!((r.source, r.key), ("create", "userId"));
}

#[test]
fn parse_json_with_nested_assertions_and_outputs() {
    let json = r#"
{
  "name": "nested",
  "version": "1",
  "initialInputs": {},
  "edges": [],
  "nodes": [
    {
      "id": "ping",
      "type": "request",
      "data": {
        "method": "GET",
        "url": "https://example.com/health",
        "assertions": [
          {"extractorType": "header", "extractorData": {"headerName": "Content-Type"},
           "operatorType": "contains", "operatorData": {"substring": "json"}}
        ],
        "outputs": [{"name": "status", "extractor": {"type": "statusCode"}}]
      }
    },
    {"id": "pause", "type": "delay", "data": {"duration": 10}},
    {"id": "show", "type": "debug", "data": {"label": "dbg", "expressions": ["{{ping.status}}"]}}
  ]
}
"#;
    let parsed = parse_flow_str(json, FlowFormat::Auto).unwrap();
    assert_eq!(parsed.format, FlowFormat::Json);
    let flow = parsed.flow;

    let ping = flow.nodes[0].expect_request();
    assert_eq!(ping.assertions.len(), 1);
    assert_eq!(ping.assertions[0].extractor.tag(), "header");
    assert_eq!(
        ping.assertions[0].operator,
        Operator::Contains {
            substring: "json".to_string()
        }
    );
    assert_eq!(ping.outputs[0].name, "status");

    assert_eq!(flow.nodes[1].node_type(), NodeType::Delay);
    assert_eq!(flow.nodes[1].expect_delay().data.duration, 10);
    assert!(flow.nodes[2].as_request().is_none());
    assert_eq!(flow.nodes[2].input_schema(), vec!["ping.status"]);
}

#[test]
fn unknown_node_type_reports_index() {
    let json = r#"{"name": "x", "nodes": [
        {"id": "a", "type": "debug", "data": {"expressions": ["hi"]}},
        {"id": "b", "type": "websocket", "data": {}}
    ]}"#;
    match parse_flow_str(json, FlowFormat::Json) {
        Err(ParseError::InvalidNode { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected InvalidNode, got {other:?}"),
    }
}

#[test]
fn unknown_extractor_type_is_a_parse_error() {
    let json = r#"{"name": "x", "nodes": [
        {"id": "a", "type": "request", "data": {"url": "http://x"},
         "outputs": [{"name": "c", "extractor": {"type": "cookie", "name": "sid"}}]}
    ]}"#;
    let err = parse_flow_str(json, FlowFormat::Json).unwrap_err();
    assert!(err.to_string().contains("unknown extractor type 'cookie'"), "{err}");
}

#[test]
fn round_trips_through_json() {
    let parsed = parse_flow_str(user_flow_yaml(), FlowFormat::Yaml).unwrap();
    let text = serde_json::to_string(&parsed.flow).unwrap();
    let again = parse_flow_str(&text, FlowFormat::Json).unwrap().flow;
    let create = again.node("create").unwrap().expect_request();
    assert_eq!(create.assertions[0].operator, Operator::between(200.0, 299.0));
    assert_eq!(create.outputs[0].extractor.config()["path"], "$.id");
}

#[test]
fn validation_collects_every_violation() {
    let json = r#"{"name": "broken",
      "edges": [{"id": "e1", "source": "a", "target": "ghost"}],
      "nodes": [
        {"id": "a", "type": "request", "data": {"method": "get", "url": ""},
         "assertions": [{"extractorType": "statusCode", "operatorType": "contains",
                         "operatorData": {"substring": "2"}}]},
        {"id": "a", "type": "debug", "data": {"expressions": []}}
      ]}"#;
    let flow = parse_flow_str(json, FlowFormat::Json).unwrap().flow;
    let err = validate_flow(&flow).unwrap_err();
    let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
    assert!(paths.contains(&"nodes[1].id"), "{paths:?}");
    assert!(paths.contains(&"nodes[0].data.url"));
    assert!(paths.contains(&"nodes[0].data.method"));
    assert!(paths.contains(&"nodes[0].assertions[0]"));
    assert!(paths.contains(&"nodes[1].data.expressions"));
    assert!(paths.contains(&"edges[0].target"));
}

#[test]
fn validation_flags_cycles_and_bad_references() {
    let flow = flowprobe_core::Flow::new("loop")
        .with_node(Node::from(
            flowprobe_core::types::DebugNode::new("a").with_expression("{{b.out}}"),
        ))
        .with_node(Node::from(
            flowprobe_core::types::RequestNode::new(
                "b",
                flowprobe_core::types::RequestData::new("GET", "http://x/{{a.missing}}"),
            )
            .with_output(flowprobe_core::types::Output::new("out", Extractor::body())),
        ))
        .with_edge(flowprobe_core::types::Edge::new("e1", "a", "b"))
        .with_edge(flowprobe_core::types::Edge::new("e2", "b", "a"));

    let err = validate_flow(&flow).unwrap_err();
    let messages: Vec<String> = err.violations.iter().map(ToString::to_string).collect();
    assert!(messages.iter().any(|m| m.contains("dependency cycle")), "{messages:?}");
    assert!(messages.iter().any(|m| m.contains("does not declare output 'missing'")));
}

#[test]
fn graph_errors_name_the_dangling_side() {
    let json = r#"{"name": "x",
      "edges": [{"id": "e9", "source": "ghost", "target": "a"}],
      "nodes": [{"id": "a", "type": "debug", "data": {"expressions": ["x"]}}]}"#;
    let flow = parse_flow_str(json, FlowFormat::Json).unwrap().flow;
    let err = flowprobe_core::ExecutionGraph::build(&flow).unwrap_err();
    assert_eq!(
        err,
        GraphError::DanglingEdge {
            edge_id: "e9".to_string(),
            side: EdgeSide::Source,
            node_id: "ghost".to_string(),
        }
    );
}

#[test]
fn query_params_accept_non_string_values() {
    let json = r#"{
        "name": "search",
        "nodes": [{
            "id": "find",
            "type": "request",
            "data": {
                "url": "https://api.example.com/search",
                "queryParams": {"page": 1, "active": true, "q": "{{term}}"}
            }
        }]
    }"#;
    let parsed = parse_flow_str(json, FlowFormat::Json).unwrap();
    let find = parsed.flow.nodes[0].expect_request();
    assert_eq!(find.data.query_params["page"], serde_json::json!(1));
    assert_eq!(find.data.query_params["active"], serde_json::json!(true));
    assert_eq!(parsed.flow.nodes[0].input_schema(), vec!["term"]);
    validate_flow(&parsed.flow).unwrap();
}
