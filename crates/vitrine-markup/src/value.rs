//! Scope values.
//!
//! Hosts bind names to these; evaluated programs look them up by identifier.
//! JSON values convert losslessly, which is how CLI-provided bindings arrive.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::element::Node;
use crate::error::{MarkupError, Result};

/// Arguments handed to a component when a capitalized tag is invoked.
#[derive(Debug, Clone)]
pub struct Props {
    /// Evaluated attribute values, by attribute name.
    pub attrs: HashMap<String, Value>,
    /// Already-rendered children.
    pub children: Vec<Node>,
}

type ComponentFn = dyn Fn(Props) -> Result<Node> + Send + Sync;

/// A native component: a host function from props to a rendered node.
#[derive(Clone)]
pub struct Component(Arc<ComponentFn>);

impl Component {
    pub fn new(f: impl Fn(Props) -> Result<Node> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, props: Props) -> Result<Node> {
        (self.0)(props)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Component")
    }
}

/// A binding value visible to evaluated programs.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value>),
    Object(HashMap<String, Value>),
    Element(Node),
    Component(Component),
}

impl Value {
    /// Human-readable kind, used in error descriptors and type checks.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::Str(_) => "a string",
            Value::List(_) => "a list",
            Value::Object(_) => "an object",
            Value::Element(_) => "an element",
            Value::Component(_) => "a component",
        }
    }

    /// Render this value as an attribute string, or `None` to omit the
    /// attribute entirely (null and false drop out, like boolean HTML
    /// attributes).
    pub fn to_attr(&self) -> Result<Option<String>> {
        match self {
            Value::Null | Value::Bool(false) => Ok(None),
            Value::Bool(true) => Ok(Some("true".to_string())),
            Value::Number(n) => Ok(Some(format_number(*n))),
            Value::Str(s) => Ok(Some(s.clone())),
            other => Err(MarkupError::Unrenderable {
                kind: other.kind(),
                context: "as an attribute value",
            }),
        }
    }

    /// Render this value as a child node, or `None` to render nothing
    /// (null and booleans disappear, as in most markup runtimes).
    pub fn to_node(&self) -> Result<Option<Node>> {
        match self {
            Value::Null | Value::Bool(_) => Ok(None),
            Value::Number(n) => Ok(Some(Node::Text(format_number(*n)))),
            Value::Str(s) => Ok(Some(Node::Text(s.clone()))),
            Value::List(items) => {
                let mut nodes = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(node) = item.to_node()? {
                        nodes.push(node);
                    }
                }
                Ok(Some(Node::Fragment(nodes)))
            }
            Value::Element(node) => Ok(Some(node.clone())),
            Value::Component(_) => Err(MarkupError::Unrenderable {
                kind: "a component",
                context: "directly; invoke it as an element",
            }),
            Value::Object(_) => Err(MarkupError::Unrenderable {
                kind: "an object",
                context: "as markup content",
            }),
        }
    }
}

/// Integers print without the trailing `.0` a plain f64 format would add.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Element(node)
    }
}
