//! Minimal XML-RPC value model, request encoding and response decoding.
//!
//! Covers what rTorrent exchanges: integer, boolean, string, double,
//! date-time and base64 scalars, arrays, structs and faults.

use std::collections::BTreeMap;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ReaperError, Result};

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(String),
    Double(f64),
    DateTime(String),
    Base64(String),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    /// Integer view. Booleans read as 0/1, numeric strings are parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean view. rTorrent reports flags as integers.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Value::Int(v) => out.push_str(&format!("<i8>{v}</i8>")),
            Value::Bool(b) => out.push_str(&format!("<boolean>{}</boolean>", u8::from(*b))),
            Value::String(s) => {
                out.push_str("<string>");
                out.push_str(&escape(s.as_str()));
                out.push_str("</string>");
            }
            Value::Double(d) => out.push_str(&format!("<double>{d}</double>")),
            Value::DateTime(s) => {
                out.push_str("<dateTime.iso8601>");
                out.push_str(&escape(s.as_str()));
                out.push_str("</dateTime.iso8601>");
            }
            Value::Base64(s) => {
                out.push_str("<base64>");
                out.push_str(&escape(s.as_str()));
                out.push_str("</base64>");
            }
            Value::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    item.write_xml(out);
                }
                out.push_str("</data></array>");
            }
            Value::Struct(members) => {
                out.push_str("<struct>");
                for (name, value) in members {
                    out.push_str("<member><name>");
                    out.push_str(&escape(name.as_str()));
                    out.push_str("</name>");
                    value.write_xml(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
            Value::Nil => out.push_str("<nil/>"),
        }
        out.push_str("</value>");
    }

    fn from_node(node: &Node) -> Result<Self> {
        if node.name != "value" {
            return Err(unexpected(format!("expected <value>, found <{}>", node.name)));
        }

        let Some(typed) = node.children.first() else {
            // An untyped value is a string
            return Ok(Value::String(node.text.clone()));
        };

        match typed.name.as_str() {
            "i4" | "i8" | "int" => typed
                .text
                .trim()
                .parse()
                .map(Value::Int)
                .map_err(|e| unexpected(format!("bad integer '{}': {e}", typed.text))),
            "boolean" => match typed.text.trim() {
                "1" => Ok(Value::Bool(true)),
                "0" => Ok(Value::Bool(false)),
                other => Err(unexpected(format!("bad boolean '{other}'"))),
            },
            "string" => Ok(Value::String(typed.text.clone())),
            "double" => typed
                .text
                .trim()
                .parse()
                .map(Value::Double)
                .map_err(|e| unexpected(format!("bad double '{}': {e}", typed.text))),
            "dateTime.iso8601" => Ok(Value::DateTime(typed.text.trim().to_string())),
            "base64" => Ok(Value::Base64(typed.text.trim().to_string())),
            "nil" => Ok(Value::Nil),
            "array" => {
                let data = typed.child("data")?;
                data.children
                    .iter()
                    .map(Value::from_node)
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            "struct" => {
                let mut members = BTreeMap::new();
                for member in &typed.children {
                    let name = member.child("name")?.text.clone();
                    let value = Value::from_node(member.child("value")?)?;
                    members.insert(name, value);
                }
                Ok(Value::Struct(members))
            }
            other => Err(unexpected(format!("unsupported value type <{other}>"))),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

/// Encode a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?><methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        param.write_xml(&mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Decode a `methodResponse` document into its single return value.
///
/// A `<fault>` response becomes [`ReaperError::Fault`].
pub fn decode_response(xml: &str) -> Result<Value> {
    let root = parse_document(xml)?;
    if root.name != "methodResponse" {
        return Err(unexpected(format!(
            "expected <methodResponse>, found <{}>",
            root.name
        )));
    }

    if let Ok(fault) = root.child("fault") {
        return Err(fault_error(&Value::from_node(fault.child("value")?)?));
    }

    let param = root.child("params")?.child("param")?;
    Value::from_node(param.child("value")?)
}

/// Turn a fault struct (`faultCode`, `faultString`) into an error.
pub fn fault_error(value: &Value) -> ReaperError {
    match value {
        Value::Struct(members) => ReaperError::Fault {
            code: members.get("faultCode").and_then(Value::as_i64).unwrap_or(0),
            message: members
                .get("faultString")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        other => unexpected(format!("malformed fault: {other:?}")),
    }
}

fn unexpected(message: String) -> ReaperError {
    ReaperError::UnexpectedResponse(message)
}

/// Element tree built from the response before interpretation.
#[derive(Debug, Default)]
struct Node {
    name: String,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn named(name: &[u8]) -> Result<Self> {
        let name = std::str::from_utf8(name)
            .map_err(|e| ReaperError::Xml(e.to_string()))?
            .to_string();
        Ok(Self {
            name,
            ..Self::default()
        })
    }

    fn child(&self, name: &str) -> Result<&Node> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| unexpected(format!("<{}> has no <{name}>", self.name)))
    }
}

fn parse_document(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Node::default()];

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Node::named(start.name().as_ref())?),
            Event::Empty(empty) => {
                let node = Node::named(empty.name().as_ref())?;
                attach(&mut stack, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| ReaperError::Xml("unbalanced end tag".to_string()))?;
                attach(&mut stack, node)?;
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                let data = data.into_inner();
                let text =
                    std::str::from_utf8(&data).map_err(|e| ReaperError::Xml(e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(ReaperError::Xml("unexpected end of document".to_string()));
    }
    stack
        .pop()
        .and_then(|document| document.children.into_iter().next())
        .ok_or_else(|| ReaperError::Xml("empty document".to_string()))
}

fn attach(stack: &mut [Node], node: Node) -> Result<()> {
    let parent = stack
        .last_mut()
        .ok_or_else(|| ReaperError::Xml("unbalanced end tag".to_string()))?;
    parent.children.push(node);
    Ok(())
}
