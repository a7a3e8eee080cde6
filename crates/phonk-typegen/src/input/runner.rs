//! Entry-point extraction from the runner class.
//!
//! The runner registers script-visible objects from its interpreter
//! initialisation routine with calls of the shape
//! `interp.addJavaObjectToJs("Name", field);`. Each registered field's
//! declared type becomes the type of the exported binding.

use super::java::{JavaReader, decode_string_literal, parse_java};
use crate::error::{Error, Result};
use crate::ir::{EntryPoints, TypeExpr};
use std::collections::HashMap;
use tracing::{debug, trace, warn};
use tree_sitter::Node;

/// Names that identify the registration pattern in the runner source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerPattern {
    /// Class holding the registrations (`AppRunner`).
    pub class: String,
    /// Interpreter initialisation method (`initInterpreter`).
    pub init_method: String,
    /// Receiver of the registration calls (`interp`).
    pub receiver: String,
    /// Registration method (`addJavaObjectToJs`).
    pub register_method: String,
}

impl Default for RunnerPattern {
    fn default() -> Self {
        Self {
            class: "AppRunner".into(),
            init_method: "initInterpreter".into(),
            receiver: "interp".into(),
            register_method: "addJavaObjectToJs".into(),
        }
    }
}

/// Extract the binding name → type map from runner source text.
pub fn extract_entry_points(source: &str, pattern: &RunnerPattern) -> Result<EntryPoints> {
    let tree = parse_java(source)?;
    let reader = JavaReader::new(source);

    let class = reader
        .find_first(tree.root_node(), &|n| {
            n.kind() == "class_declaration" && reader.name_of(n) == Some(pattern.class.as_str())
        })
        .ok_or_else(|| Error::RunnerClassNotFound(pattern.class.clone()))?;

    let members = reader.body_members(class);
    let field_types = field_types(&reader, &members)?;

    let init = members
        .iter()
        .find(|m| {
            m.kind() == "method_declaration"
                && reader.name_of(**m) == Some(pattern.init_method.as_str())
        })
        .ok_or_else(|| Error::InitMethodNotFound {
            class: pattern.class.clone(),
            method: pattern.init_method.clone(),
        })?;

    let mut entries = EntryPoints::new();
    let Some(body) = init.child_by_field_name("body") else {
        return Ok(entries);
    };

    let mut cursor = body.walk();
    for statement in body.named_children(&mut cursor) {
        let Some((binding, field)) = registration(&reader, statement, pattern) else {
            trace!(statement = reader.node_text(statement), "not a registration");
            continue;
        };

        let ty = field_types
            .get(field)
            .ok_or_else(|| Error::UnknownEntryField {
                binding: binding.clone(),
                field: field.to_string(),
            })?;
        debug!(%binding, field, "entry point");
        entries.insert(binding, ty.clone());
    }

    Ok(entries)
}

/// Reference-typed, single-declarator fields declared directly in the class.
fn field_types<'a>(
    reader: &JavaReader<'a>,
    members: &[Node],
) -> Result<HashMap<&'a str, TypeExpr>> {
    let mut types = HashMap::new();

    for member in members.iter().filter(|m| m.kind() == "field_declaration") {
        let declarators = reader.declarators(*member);
        let [declarator] = declarators[..] else {
            continue;
        };
        let Some(name) = reader.name_of(declarator) else {
            continue;
        };
        let ty = reader.field_type(*member, declarator)?;
        if ty.is_reference() {
            types.insert(name, ty);
        }
    }

    Ok(types)
}

/// Match `receiver.method("literal", field);` and return the decoded literal
/// and the field name.
fn registration<'a>(
    reader: &JavaReader<'a>,
    statement: Node,
    pattern: &RunnerPattern,
) -> Option<(String, &'a str)> {
    if statement.kind() != "expression_statement" {
        return None;
    }
    let mut cursor = statement.walk();
    let call = statement
        .named_children(&mut cursor)
        .find(|c| !c.is_extra())?;
    if call.kind() != "method_invocation" {
        return None;
    }

    let receiver = call.child_by_field_name("object")?;
    if receiver.kind() != "identifier" || reader.node_text(receiver) != pattern.receiver {
        return None;
    }
    if reader.name_of(call)? != pattern.register_method {
        return None;
    }

    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let args: Vec<Node> = arguments
        .named_children(&mut cursor)
        .filter(|a| !a.is_extra())
        .collect();
    let [literal, field] = args[..] else {
        return None;
    };
    if literal.kind() != "string_literal" || field.kind() != "identifier" {
        return None;
    }

    let raw = reader.node_text(literal);
    let Some(binding) = decode_string_literal(raw) else {
        warn!(literal = raw, "skipping registration with undecodable name");
        return None;
    };
    Some((binding, reader.node_text(field)))
}
