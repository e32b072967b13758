//! Program evaluation against a binding scope.
//!
//! [`MarkupEvaluator`] implements both coordinator strategies. Inline
//! programs are a single expression whose value becomes the unit; deferred
//! programs are statement sequences that report their own result by calling
//! `render(...)`, which drives the settlement. A deferred program that never
//! renders leaves the coordinator pending, by design.

use std::collections::HashMap;

use vitrine_core::{Error as CoreError, EvaluationInput, Evaluator, Settlement};

use crate::element::{Element, Node};
use crate::error::{MarkupError, Result};
use crate::parser::{self, AttrValue, Child, ElementExpr, Expr, Stmt, TypeTag};
use crate::value::{Props, Value};

/// The reference evaluator for markup programs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupEvaluator;

impl MarkupEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for MarkupEvaluator {
    type Unit = Node;
    type Value = Value;

    fn evaluate(&self, input: &EvaluationInput<Value>) -> vitrine_core::Result<Node> {
        inline_program(input).map_err(|err| CoreError::Evaluation(err.to_string()))
    }

    fn evaluate_deferred(&self, input: EvaluationInput<Value>, settlement: Settlement<Node>) {
        deferred_program(&input, settlement);
    }
}

/// Inline strategy: exactly one expression statement; its value is the unit.
fn inline_program(input: &EvaluationInput<Value>) -> Result<Node> {
    let stmts = parser::parse(&input.code, input.typed)?;
    let mut env = Env::new(&input.scope);

    let expr = match stmts.as_slice() {
        [Stmt::Expr(expr)] => expr,
        [] => return Err(MarkupError::InvalidProgram("empty program".to_string())),
        [Stmt::Render(_)] => return Err(MarkupError::RenderNotAvailable),
        _ => {
            return Err(MarkupError::InvalidProgram(
                "inline programs are a single expression; statements need the deferred strategy"
                    .to_string(),
            ));
        }
    };

    let value = env.eval(expr)?;
    Ok(value.to_node()?.unwrap_or(Node::Fragment(Vec::new())))
}

/// Deferred strategy: execute statements; the first `render(...)` settles.
///
/// Parse and evaluation failures reject the settlement — unless the program
/// already rendered, in which case the one-shot settlement is spent and the
/// late failure is only logged.
fn deferred_program(input: &EvaluationInput<Value>, settlement: Settlement<Node>) {
    let stmts = match parser::parse(&input.code, input.typed) {
        Ok(stmts) => stmts,
        Err(err) => {
            settlement.reject(err);
            return;
        }
    };

    let mut env = Env::new(&input.scope);
    let mut settlement = Some(settlement);

    for stmt in &stmts {
        let outcome = match stmt {
            Stmt::Let { name, value } => env.eval(value).map(|value| {
                env.locals.insert(name.clone(), value);
            }),
            Stmt::Expr(expr) => env.eval(expr).map(|_| ()),
            Stmt::Render(expr) => {
                match env
                    .eval(expr)
                    .and_then(|value| Ok(value.to_node()?.unwrap_or(Node::Fragment(Vec::new()))))
                {
                    Ok(node) => {
                        if let Some(settlement) = settlement.take() {
                            settlement.resolve(node);
                        } else {
                            tracing::debug!("ignoring repeated render call");
                        }
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
        };

        if let Err(err) = outcome {
            match settlement.take() {
                Some(settlement) => settlement.reject(err),
                None => tracing::debug!(error = %err, "failure after settlement; dropped"),
            }
            return;
        }
    }
    // No render call: the settlement drops here and the coordinator stays
    // pending, matching the self-rendering contract.
}

/// Locals layered over the host scope.
struct Env<'a> {
    scope: &'a HashMap<String, Value>,
    locals: HashMap<String, Value>,
}

impl<'a> Env<'a> {
    fn new(scope: &'a HashMap<String, Value>) -> Self {
        Self {
            scope,
            locals: HashMap::new(),
        }
    }

    fn lookup(&self, name: &str) -> Result<&Value> {
        self.locals
            .get(name)
            .or_else(|| self.scope.get(name))
            .ok_or_else(|| MarkupError::Unbound(name.to_string()))
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Path(segments) => self.eval_path(segments),
            Expr::Element(element) => Ok(Value::Element(self.eval_element(element)?)),
            Expr::Annotated { expr, ty } => {
                let value = self.eval(expr)?;
                check_type(*ty, &value)?;
                Ok(value)
            }
        }
    }

    fn eval_path(&self, segments: &[String]) -> Result<Value> {
        let mut current = self.lookup(&segments[0])?;
        for field in &segments[1..] {
            match current {
                Value::Object(fields) => {
                    current = fields.get(field).ok_or_else(|| MarkupError::Field {
                        field: field.clone(),
                        kind: "an object",
                    })?;
                }
                other => {
                    return Err(MarkupError::Field {
                        field: field.clone(),
                        kind: other.kind(),
                    });
                }
            }
        }
        Ok(current.clone())
    }

    fn eval_element(&mut self, element: &ElementExpr) -> Result<Node> {
        // Capitalized tags resolve through the scope as components.
        if element.tag.chars().next().is_some_and(char::is_uppercase) {
            return self.invoke_component(element);
        }

        let mut built = Element::new(&element.tag);
        for (name, attr) in &element.attrs {
            match attr {
                AttrValue::Literal(text) => built.attrs.push((name.clone(), text.clone())),
                AttrValue::Flag => built.attrs.push((name.clone(), "true".to_string())),
                AttrValue::Expr(expr) => {
                    if let Some(text) = self.eval(expr)?.to_attr()? {
                        built.attrs.push((name.clone(), text));
                    }
                }
            }
        }
        for child in &element.children {
            if let Some(node) = self.eval_child(child)? {
                built.children.push(node);
            }
        }
        Ok(Node::Element(built))
    }

    fn eval_child(&mut self, child: &Child) -> Result<Option<Node>> {
        match child {
            Child::Text(text) => Ok(Some(Node::Text(text.clone()))),
            Child::Element(element) => Ok(Some(self.eval_element(element)?)),
            Child::Expr(expr) => self.eval(expr)?.to_node(),
        }
    }

    fn invoke_component(&mut self, element: &ElementExpr) -> Result<Node> {
        let component = match self.lookup(&element.tag)? {
            Value::Component(component) => component.clone(),
            _ => return Err(MarkupError::NotComponent(element.tag.clone())),
        };

        let mut attrs = HashMap::new();
        for (name, attr) in &element.attrs {
            let value = match attr {
                AttrValue::Literal(text) => Value::Str(text.clone()),
                AttrValue::Flag => Value::Bool(true),
                AttrValue::Expr(expr) => self.eval(expr)?,
            };
            attrs.insert(name.clone(), value);
        }

        let mut children = Vec::new();
        for child in &element.children {
            if let Some(node) = self.eval_child(child)? {
                children.push(node);
            }
        }

        component.call(Props { attrs, children })
    }
}

fn check_type(ty: TypeTag, value: &Value) -> Result<()> {
    let matches = match ty {
        TypeTag::Str => matches!(value, Value::Str(_)),
        TypeTag::Int => matches!(value, Value::Number(n) if n.fract() == 0.0),
        TypeTag::Float => matches!(value, Value::Number(_)),
        TypeTag::Bool => matches!(value, Value::Bool(_)),
        TypeTag::Element => matches!(value, Value::Element(_)),
    };
    if matches {
        Ok(())
    } else {
        Err(MarkupError::TypeMismatch {
            expected: ty.name(),
            found: value.kind(),
        })
    }
}
