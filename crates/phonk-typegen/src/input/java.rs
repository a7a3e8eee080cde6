//! Tree-sitter access to Java sources.
//!
//! Parsing is delegated to tree-sitter with the arborium Java grammar. This
//! module only navigates the resulting tree: finding declarations, reading
//! annotations and declarators, and converting type nodes into [`TypeExpr`].

use crate::error::{Error, Result};
use crate::ir::{Dimension, Parameter, TypeExpr};
use indexmap::IndexMap;
use std::path::PathBuf;
use tree_sitter::{Node, Parser, Tree};

/// Parse Java source. A tree containing any syntax error is rejected.
pub fn parse_java(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_java::language().into())
        .map_err(|e| Error::Language(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or_else(|| Error::Parse {
        path: PathBuf::new(),
        message: "parser produced no tree".into(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        let message = match first_error(root) {
            Some(node) => {
                let pos = node.start_position();
                format!("syntax error at {}:{}", pos.row + 1, pos.column + 1)
            }
            None => "syntax error in source".into(),
        };
        return Err(Error::Parse {
            path: PathBuf::new(),
            message,
        });
    }

    Ok(tree)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error()
            && let Some(found) = first_error(child)
        {
            return Some(found);
        }
    }
    None
}

/// Read-only view over one parsed Java file.
pub(crate) struct JavaReader<'a> {
    source: &'a str,
}

/// One `Name<Args>` segment of a dotted type.
struct Segment {
    name: String,
    arguments: Option<Vec<TypeExpr>>,
}

impl<'a> JavaReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Name of a class, interface, method or declarator node.
    pub fn name_of(&self, node: Node) -> Option<&'a str> {
        node.child_by_field_name("name").map(|n| self.node_text(n))
    }

    /// First node in pre-order (starting at `node` itself) matching `pred`.
    pub fn find_first<'t>(
        &self,
        node: Node<'t>,
        pred: &dyn Fn(Node<'t>) -> bool,
    ) -> Option<Node<'t>> {
        if pred(node) {
            return Some(node);
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if let Some(found) = self.find_first(child, pred) {
                return Some(found);
            }
        }
        None
    }

    /// Direct members of a class or interface body.
    pub fn body_members<'t>(&self, declaration: Node<'t>) -> Vec<Node<'t>> {
        let Some(body) = declaration.child_by_field_name("body") else {
            return Vec::new();
        };
        let mut cursor = body.walk();
        body.named_children(&mut cursor).collect()
    }

    /// Whether a member carries `@name` or `@name(...)`.
    ///
    /// Qualified annotation names match on their last segment.
    pub fn has_annotation(&self, member: Node, name: &str) -> bool {
        let mut cursor = member.walk();
        let Some(modifiers) = member
            .children(&mut cursor)
            .find(|c| c.kind() == "modifiers")
        else {
            return false;
        };

        let mut cursor = modifiers.walk();
        modifiers.children(&mut cursor).any(|child| {
            matches!(child.kind(), "marker_annotation" | "annotation")
                && child
                    .child_by_field_name("name")
                    .map(|n| simple_name(self.node_text(n)) == name)
                    .unwrap_or(false)
        })
    }

    /// `variable_declarator` children of a field or constant declaration.
    pub fn declarators<'t>(&self, field: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = field.walk();
        field
            .children_by_field_name("declarator", &mut cursor)
            .collect()
    }

    /// Declared type of a field, with C-style declarator dimensions applied.
    pub fn field_type(&self, field: Node, declarator: Node) -> Result<TypeExpr> {
        let ty = field
            .child_by_field_name("type")
            .ok_or_else(|| self.missing(field, "type"))?;
        let ty = self.read_type(ty)?;
        Ok(self.with_declarator_dimensions(ty, declarator))
    }

    /// Return type of a method; `None` for `void`.
    pub fn return_type(&self, method: Node) -> Result<Option<TypeExpr>> {
        let ty = method
            .child_by_field_name("type")
            .ok_or_else(|| self.missing(method, "type"))?;
        if ty.kind() == "void_type" {
            return Ok(None);
        }
        self.read_type(ty).map(Some)
    }

    /// Parameters of a method in declaration order.
    pub fn parameters(&self, method: Node) -> Result<IndexMap<String, Parameter>> {
        let mut parameters = IndexMap::new();
        let Some(list) = method.child_by_field_name("parameters") else {
            return Ok(parameters);
        };

        let mut cursor = list.walk();
        for param in list.named_children(&mut cursor) {
            match param.kind() {
                "formal_parameter" => {
                    let name = self
                        .name_of(param)
                        .ok_or_else(|| self.missing(param, "name"))?;
                    let ty = param
                        .child_by_field_name("type")
                        .ok_or_else(|| self.missing(param, "type"))?;
                    let ty = self.with_declarator_dimensions(self.read_type(ty)?, param);
                    parameters.insert(
                        name.to_string(),
                        Parameter {
                            ty,
                            variadic: false,
                        },
                    );
                }
                "spread_parameter" => {
                    let (name, ty) = self.read_spread_parameter(param)?;
                    parameters.insert(name, Parameter { ty, variadic: true });
                }
                // receiver parameters (`Foo this`), comments
                _ => {}
            }
        }

        Ok(parameters)
    }

    fn read_spread_parameter(&self, param: Node) -> Result<(String, TypeExpr)> {
        let mut ty = None;
        let mut declarator = None;
        let mut cursor = param.walk();
        for child in param.named_children(&mut cursor) {
            match child.kind() {
                "modifiers" => {}
                _ if child.is_extra() => {}
                "variable_declarator" => declarator = Some(child),
                _ if ty.is_none() => ty = Some(child),
                _ => {}
            }
        }

        let declarator = declarator.ok_or_else(|| self.missing(param, "declarator"))?;
        let name = self
            .name_of(declarator)
            .ok_or_else(|| self.missing(declarator, "name"))?;
        let ty = ty.ok_or_else(|| self.missing(param, "type"))?;
        let ty = self.with_declarator_dimensions(self.read_type(ty)?, declarator);
        Ok((name.to_string(), ty))
    }

    /// Convert a type node into a [`TypeExpr`].
    pub fn read_type(&self, node: Node) -> Result<TypeExpr> {
        match node.kind() {
            "integral_type" | "floating_point_type" | "boolean_type" => {
                Ok(TypeExpr::primitive(self.node_text(node)))
            }

            "type_identifier" | "scoped_type_identifier" | "generic_type" => {
                let mut segments = Vec::new();
                self.read_segments(node, &mut segments)?;
                Ok(chain(strip_package(segments)))
            }

            "array_type" => {
                let element = node
                    .child_by_field_name("element")
                    .ok_or_else(|| self.missing(node, "element"))?;
                let element = self.read_type(element)?;
                match node.child_by_field_name("dimensions") {
                    Some(dims) => Ok(self.append_dimensions(element, dims)),
                    None => Ok(element),
                }
            }

            "annotated_type" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .filter(|c| !is_annotation(*c) && !c.is_extra())
                    .last()
                    .ok_or_else(|| self.missing(node, "type"))?;
                self.read_type(inner)
            }

            // `?` is `? extends Object`; bounds collapse to the bound type.
            "wildcard" => {
                let mut cursor = node.walk();
                let bound = node
                    .named_children(&mut cursor)
                    .find(|c| !is_annotation(*c) && !c.is_extra() && c.kind() != "super");
                match bound {
                    Some(bound) => self.read_type(bound),
                    None => Ok(TypeExpr::named("Object")),
                }
            }

            _ => Err(self.unsupported(node)),
        }
    }

    fn read_segments(&self, node: Node, out: &mut Vec<Segment>) -> Result<()> {
        match node.kind() {
            "type_identifier" | "identifier" => {
                out.push(Segment {
                    name: self.node_text(node).to_string(),
                    arguments: None,
                });
                Ok(())
            }
            "scoped_type_identifier" | "generic_type" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if is_annotation(child) || child.is_extra() {
                        continue;
                    }
                    if child.kind() == "type_arguments" {
                        let arguments = self.read_type_arguments(child)?;
                        if let Some(last) = out.last_mut() {
                            last.arguments = Some(arguments);
                        }
                    } else {
                        self.read_segments(child, out)?;
                    }
                }
                Ok(())
            }
            _ => Err(self.unsupported(node)),
        }
    }

    fn read_type_arguments(&self, node: Node) -> Result<Vec<TypeExpr>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| !is_annotation(*c) && !c.is_extra())
            .map(|c| self.read_type(c))
            .collect()
    }

    fn append_dimensions(&self, mut ty: TypeExpr, dims: Node) -> TypeExpr {
        let mut cursor = dims.walk();
        for child in dims.children(&mut cursor) {
            match child.kind() {
                "[" => ty = ty.with_dimension(Dimension::Unsized),
                _ if child.is_named() && !is_annotation(child) && !child.is_extra() => {
                    // `[expr]` only appears in creation expressions; keep it so
                    // rendering can reject it.
                    let size = self.node_text(child).to_string();
                    ty = ty.with_dimension(Dimension::Sized(size));
                }
                _ => {}
            }
        }
        ty
    }

    fn with_declarator_dimensions(&self, ty: TypeExpr, declarator: Node) -> TypeExpr {
        match declarator.child_by_field_name("dimensions") {
            Some(dims) => self.append_dimensions(ty, dims),
            None => ty,
        }
    }

    fn unsupported(&self, node: Node) -> Error {
        Error::UnsupportedType {
            path: PathBuf::new(),
            text: self.node_text(node).to_string(),
        }
    }

    fn missing(&self, node: Node, what: &str) -> Error {
        let pos = node.start_position();
        Error::Parse {
            path: PathBuf::new(),
            message: format!(
                "{} at {}:{} has no {}",
                node.kind(),
                pos.row + 1,
                pos.column + 1,
                what
            ),
        }
    }
}

fn is_annotation(node: Node) -> bool {
    matches!(node.kind(), "marker_annotation" | "annotation")
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Drop leading package segments (`java.util.List` is `List`).
///
/// A segment counts as a package when it starts lowercase, carries no type
/// arguments and is not the last segment.
fn strip_package(mut segments: Vec<Segment>) -> Vec<Segment> {
    let keep_from = segments
        .iter()
        .position(|s| {
            s.arguments.is_some()
                || !s.name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        })
        .unwrap_or(segments.len().saturating_sub(1));
    segments.drain(..keep_from);
    segments
}

fn chain(segments: Vec<Segment>) -> TypeExpr {
    let mut tail: Option<Box<TypeExpr>> = None;
    for segment in segments.into_iter().rev() {
        tail = Some(Box::new(TypeExpr::Named {
            name: segment.name,
            arguments: segment.arguments,
            qualifier: tail,
            dimensions: Vec::new(),
        }));
    }
    tail.map(|t| *t).unwrap_or_else(|| TypeExpr::named(""))
}

/// Decode a Java string literal token to its value.
///
/// Only single-line `"..."` literals are accepted; text blocks, char
/// literals and anything malformed yield `None`.
pub fn decode_string_literal(raw: &str) -> Option<String> {
    if raw.starts_with("\"\"\"") {
        return None;
    }
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;

    let mut units: Vec<u16> = Vec::with_capacity(inner.len());
    let mut buf = [0u16; 2];
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        let decoded = match c {
            '"' | '\n' | '\r' => return None,
            '\\' => match chars.next()? {
                'b' => '\u{8}',
                't' => '\t',
                'n' => '\n',
                'f' => '\u{c}',
                'r' => '\r',
                's' => ' ',
                '"' => '"',
                '\'' => '\'',
                '\\' => '\\',
                first @ '0'..='7' => {
                    let max_digits = if first <= '3' { 3 } else { 2 };
                    let mut value = first.to_digit(8)?;
                    for _ in 1..max_digits {
                        match chars.peek().and_then(|d| d.to_digit(8)) {
                            Some(d) => {
                                value = value * 8 + d;
                                chars.next();
                            }
                            None => break,
                        }
                    }
                    char::from_u32(value)?
                }
                'u' => {
                    while chars.peek() == Some(&'u') {
                        chars.next();
                    }
                    let mut value = 0u32;
                    for _ in 0..4 {
                        value = value * 16 + chars.next()?.to_digit(16)?;
                    }
                    // Surrogate halves are pushed raw and paired up below.
                    units.push(u16::try_from(value).ok()?);
                    continue;
                }
                _ => return None,
            },
            other => other,
        };
        units.extend_from_slice(decoded.encode_utf16(&mut buf));
    }

    String::from_utf16(&units).ok()
}
