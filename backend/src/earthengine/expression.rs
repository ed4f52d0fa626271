//! Computation graphs in the compute service's serialized form.
//!
//! An [`Expr`] tree is built client-side and encoded into an [`Expression`]:
//!
//! ```json
//! {
//!   "result": "3",
//!   "values": {
//!     "0": { "functionInvocationValue": { "functionName": "...", "arguments": { ... } } },
//!     "3": { "functionInvocationValue": { ... "arguments": { "input": { "valueReference": "0" } } } }
//!   }
//! }
//! ```
//!
//! Every function invocation is stored once in `values`; identical subtrees
//! (e.g. the same median composite feeding several band selections) collapse
//! onto a single entry and are referenced by id.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{json, Map, Value};

/// A node of a computation graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal JSON value (number, string, list of literals, ...).
    Constant(Value),
    /// Named function applied to named arguments.
    Invocation {
        function: String,
        arguments: BTreeMap<String, Expr>,
    },
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    /// Literal list of strings, e.g. band names.
    pub fn strings(items: &[&str]) -> Self {
        Expr::Constant(Value::Array(
            items.iter().map(|s| Value::String((*s).to_string())).collect(),
        ))
    }

    /// Invoke `function` without arguments.
    pub fn nullary(function: &str) -> Self {
        Expr::Invocation {
            function: function.to_string(),
            arguments: BTreeMap::new(),
        }
    }

    /// Invoke `function` with the given named arguments.
    pub fn call<'a>(function: &str, arguments: impl IntoIterator<Item = (&'a str, Expr)>) -> Self {
        Expr::Invocation {
            function: function.to_string(),
            arguments: arguments
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

/// An encoded graph ready to be sent as the `expression` field of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    result: String,
    values: BTreeMap<String, Value>,
}

impl Expression {
    /// Encode `root`, deduplicating repeated invocations.
    pub fn encode(root: &Expr) -> Self {
        let mut encoder = Encoder::default();
        let node = encoder.encode(root);
        let result = match node.get("valueReference").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => encoder.intern(node),
        };

        Self {
            result,
            values: encoder.values,
        }
    }

    /// Id of the node holding the final result.
    pub fn result(&self) -> &str {
        &self.result
    }

    /// Number of distinct nodes in the graph.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether any node of the graph invokes `function`.
    pub fn invokes(&self, function: &str) -> bool {
        self.values.values().any(|node| {
            node.pointer("/functionInvocationValue/functionName")
                .and_then(Value::as_str)
                == Some(function)
        })
    }

    /// Literal arguments passed to every invocation of `function`, keyed by
    /// argument name. Computed arguments are skipped.
    pub fn constant_arguments(&self, function: &str) -> Vec<Map<String, Value>> {
        self.values
            .values()
            .filter_map(|node| node.get("functionInvocationValue"))
            .filter(|inv| inv.get("functionName").and_then(Value::as_str) == Some(function))
            .map(|inv| {
                inv.get("arguments")
                    .and_then(Value::as_object)
                    .map(|args| {
                        args.iter()
                            .filter_map(|(name, arg)| {
                                arg.get("constantValue").map(|v| (name.clone(), v.clone()))
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect()
    }
}

#[derive(Default)]
struct Encoder {
    values: BTreeMap<String, Value>,
    seen: HashMap<String, String>,
}

impl Encoder {
    fn encode(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Constant(value) => json!({ "constantValue": value }),
            Expr::Invocation {
                function,
                arguments,
            } => {
                let arguments: Map<String, Value> = arguments
                    .iter()
                    .map(|(name, arg)| (name.clone(), self.encode(arg)))
                    .collect();
                let node = json!({
                    "functionInvocationValue": {
                        "functionName": function,
                        "arguments": arguments,
                    }
                });
                json!({ "valueReference": self.intern(node) })
            }
        }
    }

    fn intern(&mut self, node: Value) -> String {
        let key = node.to_string();
        if let Some(id) = self.seen.get(&key) {
            return id.clone();
        }
        let id = self.values.len().to_string();
        self.values.insert(id.clone(), node);
        self.seen.insert(key, id.clone());
        id
    }
}
