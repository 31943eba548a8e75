//! XML-RPC wire codec.
//!
//! Requests are small and written directly. Responses are parsed with
//! `quick-xml` into a minimal element tree and then interpreted, which keeps
//! the value grammar (`<value>` with an optional type tag, arrays, structs)
//! in one readable place.

use crate::domain::error::{Fault, RpcCodecError};
use crate::domain::value::RpcValue;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;

/// Decoded `<methodResponse>`.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Value(RpcValue),
    Fault(Fault),
}

/// Encode a `<methodCall>` document.
pub fn encode_call(method: &str, params: &[RpcValue]) -> String {
    let mut out = String::with_capacity(128);
    out.push_str("<?xml version=\"1.0\"?><methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn write_value(out: &mut String, value: &RpcValue) {
    out.push_str("<value>");
    match value {
        RpcValue::Int(i) => {
            out.push_str("<int>");
            out.push_str(&i.to_string());
            out.push_str("</int>");
        }
        RpcValue::Bool(b) => {
            out.push_str(if *b { "<boolean>1</boolean>" } else { "<boolean>0</boolean>" });
        }
        RpcValue::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        RpcValue::Double(d) => {
            out.push_str("<double>");
            out.push_str(&d.to_string());
            out.push_str("</double>");
        }
        RpcValue::DateTime(s) => {
            out.push_str("<dateTime.iso8601>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</dateTime.iso8601>");
        }
        RpcValue::Base64(s) => {
            out.push_str("<base64>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</base64>");
        }
        RpcValue::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        RpcValue::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        RpcValue::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

/// Decode a `<methodResponse>` document into a value or a fault.
pub fn decode_response(xml: &str) -> Result<MethodResponse, RpcCodecError> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(RpcCodecError::Structure(format!(
            "expected <methodResponse>, found <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let value = decode_value(fault.required("value")?)?;
        let code = value
            .member("faultCode")
            .and_then(RpcValue::as_i64)
            .ok_or_else(|| RpcCodecError::Structure("fault without integer faultCode".into()))?;
        let message = value
            .member("faultString")
            .and_then(RpcValue::as_str)
            .unwrap_or_default();
        return Ok(MethodResponse::Fault(Fault::new(code, message)));
    }

    let value = root
        .required("params")?
        .required("param")?
        .required("value")?;
    decode_value(value).map(MethodResponse::Value)
}

fn decode_value(node: &Element) -> Result<RpcValue, RpcCodecError> {
    // Untyped <value>text</value> is a string.
    let Some(typed) = node.children.first() else {
        return Ok(RpcValue::String(node.text.clone()));
    };

    let text = typed.text.trim();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => text.parse().map(RpcValue::Int).map_err(|_| invalid("int", text)),
        "boolean" => match text {
            "1" => Ok(RpcValue::Bool(true)),
            "0" => Ok(RpcValue::Bool(false)),
            _ => Err(invalid("boolean", text)),
        },
        "string" => Ok(RpcValue::String(typed.text.clone())),
        "double" => text.parse().map(RpcValue::Double).map_err(|_| invalid("double", text)),
        "dateTime.iso8601" => Ok(RpcValue::DateTime(text.to_string())),
        "base64" => Ok(RpcValue::Base64(
            text.chars().filter(|c| !c.is_whitespace()).collect(),
        )),
        "nil" => Ok(RpcValue::Nil),
        "array" => {
            let data = typed.required("data")?;
            data.children_named("value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(RpcValue::Array)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children_named("member") {
                let name = member.required("name")?.text.clone();
                let value = decode_value(member.required("value")?)?;
                members.insert(name, value);
            }
            Ok(RpcValue::Struct(members))
        }
        other => Err(RpcCodecError::UnknownType(other.to_string())),
    }
}

fn invalid(kind: &'static str, text: &str) -> RpcCodecError {
    RpcCodecError::InvalidScalar {
        kind,
        text: text.to_string(),
    }
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn required(&self, name: &str) -> Result<&Element, RpcCodecError> {
        self.child(name).ok_or_else(|| {
            RpcCodecError::Structure(format!("<{}> is missing <{}>", self.name, name))
        })
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn parse_tree(xml: &str) -> Result<Element, RpcCodecError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| RpcCodecError::Xml(e.to_string()))?;
        match event {
            Event::Start(start) => stack.push(Element::new(element_name(start.name().as_ref())?)),
            Event::Empty(start) => {
                let element = Element::new(element_name(start.name().as_ref())?);
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| RpcCodecError::Xml("unbalanced end tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| RpcCodecError::Xml(e.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(RpcCodecError::Xml(format!("unclosed <{}>", open.name)));
    }
    root.ok_or_else(|| RpcCodecError::Xml("empty document".into()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), RpcCodecError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(RpcCodecError::Xml("multiple root elements".into())),
    }
    Ok(())
}

fn element_name(raw: &[u8]) -> Result<String, RpcCodecError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| RpcCodecError::Xml(e.to_string()))
}
