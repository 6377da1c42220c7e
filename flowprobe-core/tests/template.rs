use flowprobe_core::template::{has_placeholders, placeholders, TemplateResolver};
use serde_json::{json, Map, Value};

fn vars(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap_or_default()
}

#[test]
fn strings_without_placeholders_are_unchanged() {
    let vars = vars(json!({"x": 1}));
    let r = TemplateResolver::new(&vars);
    for s in ["", "plain", "{single}", "{{", "}}", "a { {x} } b"] {
        assert_eq!(r.resolve_str(s), s);
    }
}

#[test]
fn resolved_output_has_no_placeholders_when_fully_bound() {
    let vars = vars(json!({"x": "abc", "A.userId": "123", "n": 4}));
    let r = TemplateResolver::new(&vars);
    let out = r.resolve_str("{{x}}/{{ A.userId }}?n={{n}}");
    assert_eq!(out, "abc/123?n=4");
    assert!(!has_placeholders(&out));
}

#[test]
fn unbound_placeholders_stay_verbatim() {
    let vars = Map::new();
    let r = TemplateResolver::new(&vars);
    assert_eq!(r.resolve_str("id={{ missing }}"), "id={{ missing }}");
}

#[test]
fn nested_values_keep_their_shape() {
    let vars = vars(json!({"name": "ann", "age": 31}));
    let r = TemplateResolver::new(&vars);
    let body = json!({
        "user": {"name": "{{name}}", "tags": ["{{age}}", 7, null, true]},
        "static": 2.5
    });
    assert_eq!(
        r.resolve(&body),
        json!({
            "user": {"name": "ann", "tags": ["31", 7, null, true]},
            "static": 2.5
        })
    );
}

#[test]
fn scanning_agrees_with_substitution() {
    let names = placeholders("{{a}} {{ b }} {{a}} {{c.d}}");
    assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c.d"]);
}
