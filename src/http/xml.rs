//! XML payload conversion.
//!
//! Every element becomes
//! `{name, value, attributes, has_children, children}`.
//!
//! # Design Decisions
//! - Text-only elements carry their trimmed text in `value` (`null` if blank)
//! - Elements with children have a `null` value
//! - A child is appended to `children` as a sequence entry when its tag name
//!   is repeated among its siblings, or when it has children of its own and
//!   is not an only child; otherwise it is keyed by its tag name
//! - `children` renders as a sequence when every entry is positional
//! - `name` is the local tag name; children keys and attributes of
//!   namespaced nodes are written `prefix:name`

use indexmap::IndexMap;
use roxmltree::{Document, Node, ParsingOptions};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub value: Option<String>,
    pub attributes: IndexMap<String, String>,
    pub has_children: bool,
    /// `None` keys are positional entries.
    pub children: Vec<(Option<String>, XmlNode)>,
}

/// Parse an XML document into its root mapping; `None` when malformed.
pub fn parse(raw: &str) -> Option<Value> {
    parse_tree(raw).map(|node| node.to_value())
}

pub fn parse_tree(raw: &str) -> Option<XmlNode> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(raw.trim_start(), options).ok()?;
    Some(convert(doc.root_element()))
}

fn qualified_name(node: &Node) -> String {
    let tag = node.tag_name();
    match tag.namespace().and_then(|ns| node.lookup_prefix(ns)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", tag.name()),
        _ => tag.name().to_string(),
    }
}

fn convert(node: Node) -> XmlNode {
    let mut attributes = IndexMap::new();
    for attr in node.attributes() {
        let name = match attr.namespace().and_then(|ns| node.lookup_prefix(ns)) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", attr.name()),
            _ => attr.name().to_string(),
        };
        attributes.insert(name.trim().to_string(), attr.value().trim().to_string());
    }

    let elements: Vec<Node> = node.children().filter(Node::is_element).collect();
    if elements.is_empty() {
        let text: String = node
            .children()
            .filter(Node::is_text)
            .filter_map(|n| n.text())
            .collect();
        let text = text.trim();
        return XmlNode {
            name: node.tag_name().name().to_string(),
            value: (!text.is_empty()).then(|| text.to_string()),
            attributes,
            has_children: false,
            children: Vec::new(),
        };
    }

    let mut name_counts: IndexMap<String, usize> = IndexMap::new();
    for child in &elements {
        *name_counts.entry(qualified_name(child)).or_default() += 1;
    }

    let count = elements.len();
    let children = elements
        .into_iter()
        .map(|child| {
            let name = qualified_name(&child);
            let converted = convert(child);
            let positional = (count > 1 && converted.has_children) || name_counts[&name] > 1;
            (if positional { None } else { Some(name) }, converted)
        })
        .collect();

    XmlNode {
        name: node.tag_name().name().to_string(),
        value: None,
        attributes,
        has_children: true,
        children,
    }
}

impl XmlNode {
    pub fn to_value(&self) -> Value {
        let attributes: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let mut keyed = Map::new();
        let mut next = 0usize;
        for (key, child) in &self.children {
            let key = match key {
                Some(name) => name.clone(),
                None => {
                    let k = next.to_string();
                    next += 1;
                    k
                }
            };
            keyed.insert(key, child.to_value());
        }
        let children = if self.children.iter().all(|(k, _)| k.is_none()) {
            Value::Array(keyed.into_iter().map(|(_, v)| v).collect())
        } else {
            Value::Object(keyed)
        };

        let mut map = Map::new();
        map.insert("name".into(), Value::String(self.name.clone()));
        map.insert(
            "value".into(),
            self.value.clone().map(Value::String).unwrap_or(Value::Null),
        );
        map.insert("attributes".into(), Value::Object(attributes));
        map.insert("has_children".into(), Value::Bool(self.has_children));
        map.insert("children".into(), children);
        Value::Object(map)
    }
}

/// Render a converted mapping back to XML; `None` if it is not one.
pub fn to_xml(value: &Value) -> Option<String> {
    let mut out = String::new();
    write_element(value, &mut out)?;
    Some(out)
}

fn write_element(value: &Value, out: &mut String) -> Option<()> {
    let map = value.as_object()?;
    let name = map.get("name")?.as_str()?;
    out.push('<');
    out.push_str(name);
    if let Some(Value::Object(attributes)) = map.get("attributes") {
        for (k, v) in attributes {
            let v = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
            out.push_str(&format!(" {k}=\"{}\"", escape(&v)));
        }
    }
    out.push('>');
    match map.get("children") {
        Some(Value::Array(items)) if !items.is_empty() => {
            for child in items {
                write_element(child, out)?;
            }
        }
        Some(Value::Object(items)) if !items.is_empty() => {
            for child in items.values() {
                write_element(child, out)?;
            }
        }
        _ => {
            if let Some(text) = map.get("value").and_then(Value::as_str) {
                out.push_str(&escape(text));
            }
        }
    }
    out.push_str(&format!("</{name}>"));
    Some(())
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
