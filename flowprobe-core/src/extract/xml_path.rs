use serde_json::{json, Value};

use super::{
    collapse_matches, require, Capability, Extract, ExtractError, ExtractorConfigError,
    ResponseContext,
};

/// XPath subset over an XML body.
///
/// Supported: absolute `/a/b` and descendant `//b` steps, `*`, 1-based
/// positional predicates such as `item[2]`, and a final `@attr` or `text()`
/// step. Element results are returned as their concatenated text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlPathExtractor {
    path: String,
    steps: Vec<Step>,
    terminal: Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    /// `None` matches any element.
    name: Option<String>,
    position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Terminal {
    Element,
    Attribute(String),
    Text,
}

impl XmlPathExtractor {
    pub fn new(path: &str) -> Result<Self, ExtractorConfigError> {
        let (steps, terminal) = parse_path(path).map_err(|m| ExtractorConfigError::invalid("xmlPath", m))?;
        Ok(Self {
            path: path.to_string(),
            steps,
            terminal,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn evaluate(&self, xml: &str) -> Result<Value, ExtractError> {
        let doc = roxmltree::Document::parse(xml).map_err(|e| ExtractError::InvalidXml(e.to_string()))?;
        let mut current = vec![doc.root()];
        for step in &self.steps {
            current = apply_step(&current, step);
            if current.is_empty() {
                break;
            }
        }

        let matches: Vec<Value> = match &self.terminal {
            Terminal::Element => current
                .iter()
                .map(|n| Value::String(text_content(*n)))
                .collect(),
            Terminal::Attribute(name) => current
                .iter()
                .filter_map(|n| n.attribute(name.as_str()))
                .map(|v| Value::String(v.to_string()))
                .collect(),
            Terminal::Text => current
                .iter()
                .flat_map(|n| n.children())
                .filter(|c| c.is_text())
                .filter_map(|c| c.text())
                .filter(|t| !t.trim().is_empty())
                .map(|t| Value::String(t.to_string()))
                .collect(),
        };
        collapse_matches(&self.path, matches)
    }
}

impl Extract for XmlPathExtractor {
    fn tag(&self) -> &str {
        "xmlPath"
    }

    fn extract(&self, ctx: &dyn ResponseContext) -> Result<Value, ExtractError> {
        require(ctx, self.tag(), Capability::Body)?;
        let raw = ctx.raw_body().unwrap_or_default();
        let xml = std::str::from_utf8(raw).map_err(|e| ExtractError::InvalidXml(e.to_string()))?;
        self.evaluate(xml)
    }

    fn config(&self) -> Value {
        json!({ "path": self.path })
    }
}

fn apply_step<'a, 'i>(
    context: &[roxmltree::Node<'a, 'i>],
    step: &Step,
) -> Vec<roxmltree::Node<'a, 'i>> {
    // `//x` is descendant-or-self followed by a child step, so positions are
    // counted per parent.
    let mut parents: Vec<roxmltree::Node<'a, 'i>> = match step.axis {
        Axis::Child => context.to_vec(),
        Axis::Descendant => context
            .iter()
            .flat_map(|n| n.descendants())
            .filter(|n| n.is_element() || n.is_root())
            .collect(),
    };
    parents.sort_by_key(|n| n.id().get());
    parents.dedup_by_key(|n| n.id().get());

    let mut out = Vec::new();
    for parent in parents {
        let matching = parent.children().filter(|c| {
            c.is_element()
                && step
                    .name
                    .as_deref()
                    .map_or(true, |name| c.tag_name().name() == name)
        });
        match step.position {
            Some(pos) => out.extend(matching.skip(pos - 1).take(1)),
            None => out.extend(matching),
        }
    }
    out
}

fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn parse_path(path: &str) -> Result<(Vec<Step>, Terminal), String> {
    let path = path.trim();
    if !path.starts_with('/') {
        return Err(format!("path '{path}' must start with '/'"));
    }

    let mut steps = Vec::new();
    let mut terminal = Terminal::Element;
    let mut rest = path;
    while !rest.is_empty() {
        let axis = if let Some(r) = rest.strip_prefix("//") {
            rest = r;
            Axis::Descendant
        } else if let Some(r) = rest.strip_prefix('/') {
            rest = r;
            Axis::Child
        } else {
            return Err(format!("unexpected '{rest}'"));
        };

        let end = rest.find('/').unwrap_or(rest.len());
        let token = &rest[..end];
        rest = &rest[end..];
        if token.is_empty() {
            return Err("empty step".to_string());
        }

        if token == "text()" || token.starts_with('@') {
            if !rest.is_empty() {
                return Err(format!("'{token}' must be the last step"));
            }
            if axis == Axis::Descendant {
                return Err(format!("'//{token}' is not supported"));
            }
            terminal = if token == "text()" {
                Terminal::Text
            } else {
                let attr = &token[1..];
                if attr.is_empty() {
                    return Err("attribute name must not be empty".to_string());
                }
                Terminal::Attribute(attr.to_string())
            };
            break;
        }

        steps.push(parse_step(axis, token)?);
    }

    if steps.is_empty() {
        return Err("path selects no element".to_string());
    }
    Ok((steps, terminal))
}

fn parse_step(axis: Axis, token: &str) -> Result<Step, String> {
    let (name, position) = match token.split_once('[') {
        Some((name, pred)) => {
            let pred = pred
                .strip_suffix(']')
                .ok_or_else(|| format!("unclosed predicate in '{token}'"))?;
            let pos: usize = pred
                .trim()
                .parse()
                .map_err(|_| format!("only positional predicates are supported, got '[{pred}]'"))?;
            if pos == 0 {
                return Err("positions are 1-based".to_string());
            }
            (name, Some(pos))
        }
        None => (token, None),
    };
    if name.is_empty() {
        return Err(format!("missing element name in '{token}'"));
    }
    Ok(Step {
        axis,
        name: (name != "*").then(|| name.to_string()),
        position,
    })
}
