//! TypeScript declaration writer.
//!
//! Emits one `declare class` / `declare interface` block per collected
//! declaration, followed by one `export var` line per entry point.

use crate::error::{Error, Result};
use crate::ir::{Attribute, Declaration, Declarations, Dimension, EntryPoints, Method, TypeExpr};
use std::collections::HashMap;
use tracing::debug;

/// Java names with a dedicated TypeScript spelling.
pub const BUILTIN_NAME_MAP: &[(&str, &str)] = &[
    ("Boolean", "boolean"),
    ("NativeArray", "Array<any>"),
    ("NativeObject", "object"),
    ("Object", "any"),
    ("ReturnInterface", "Function"),
    ("String", "string"),
];

/// Renders [`TypeExpr`] values as TypeScript type syntax.
///
/// Names missing from the map pass through unchanged, which is how API
/// classes refer to each other.
#[derive(Debug, Clone)]
pub struct TypeRenderer {
    names: HashMap<String, String>,
}

impl Default for TypeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRenderer {
    /// Renderer with the built-in name map.
    pub fn new() -> Self {
        Self {
            names: BUILTIN_NAME_MAP
                .iter()
                .map(|(java, ts)| (java.to_string(), ts.to_string()))
                .collect(),
        }
    }

    /// Add or override name mappings.
    pub fn with_names<I, K, V>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.names
            .extend(names.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn map_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.names.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Render a type; `None` is `void`.
    pub fn render(&self, ty: Option<&TypeExpr>) -> Result<String> {
        let Some(ty) = ty else {
            return Ok("void".into());
        };
        let mut out = String::new();
        self.write_type(ty, &mut out)?;
        Ok(out)
    }

    fn write_type(&self, ty: &TypeExpr, out: &mut String) -> Result<()> {
        match ty {
            TypeExpr::Primitive { name, dimensions } => {
                out.push_str(self.map_name(name));
                write_dimensions(dimensions, out)
            }
            TypeExpr::Named {
                name,
                arguments,
                qualifier,
                dimensions,
            } => {
                out.push_str(self.map_name(name));
                if let Some(arguments) = arguments {
                    out.push('<');
                    for (i, arg) in arguments.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write_type(arg, out)?;
                    }
                    out.push('>');
                }
                if let Some(qualifier) = qualifier {
                    out.push('.');
                    self.write_type(qualifier, out)?;
                }
                write_dimensions(dimensions, out)
            }
        }
    }
}

/// One `[]` per dimension.
fn write_dimensions(dimensions: &[Dimension], out: &mut String) -> Result<()> {
    for dimension in dimensions {
        match dimension {
            Dimension::Unsized => out.push_str("[]"),
            Dimension::Sized(size) => return Err(Error::SizedArrayDimension(size.clone())),
        }
    }
    Ok(())
}

/// Emit declarations and entry points as TypeScript.
pub fn generate_typescript(
    declarations: &Declarations,
    entries: &EntryPoints,
    renderer: &TypeRenderer,
) -> Result<String> {
    DeclarationWriter::new(renderer, declarations).emit(entries)
}

/// Accumulates the declaration stream.
pub struct DeclarationWriter<'a> {
    renderer: &'a TypeRenderer,
    declarations: &'a Declarations,
    output: String,
}

impl<'a> DeclarationWriter<'a> {
    pub fn new(renderer: &'a TypeRenderer, declarations: &'a Declarations) -> Self {
        Self {
            renderer,
            declarations,
            output: String::new(),
        }
    }

    pub fn emit(mut self, entries: &EntryPoints) -> Result<String> {
        for (name, declaration) in self.declarations {
            self.write_declaration(name, declaration)?;
        }
        for (name, ty) in entries {
            let ty = self.renderer.render(Some(ty))?;
            self.line(&format!("export var {}: {};", name, ty));
        }
        Ok(self.output)
    }

    fn write_declaration(&mut self, name: &str, declaration: &Declaration) -> Result<()> {
        let mut header = format!("declare {} {}", declaration.kind.keyword(), name);

        if let Some(extends) = self.known_supertype(declaration.extends.as_ref())? {
            header.push_str(" extends ");
            header.push_str(&extends);
        }

        let mut implements = Vec::new();
        for ty in declaration.implements() {
            if let Some(ty) = self.known_supertype(Some(ty))? {
                implements.push(ty);
            }
        }
        if !implements.is_empty() {
            header.push_str(" implements ");
            header.push_str(&implements.join(", "));
        }

        header.push_str(" {");
        self.line(&header);

        for (attr_name, attribute) in &declaration.attributes {
            let line = match attribute {
                Attribute::Field(field) => {
                    format!("  {}: {};", attr_name, self.renderer.render(Some(&field.ty))?)
                }
                Attribute::Method(method) => {
                    format!("  {}{};", attr_name, self.signature(method)?)
                }
            };
            self.line(&line);
        }

        self.line("}");
        Ok(())
    }

    /// Rendered supertype, or `None` when it was not scanned.
    fn known_supertype(&self, ty: Option<&TypeExpr>) -> Result<Option<String>> {
        let Some(ty) = ty else {
            return Ok(None);
        };
        let rendered = self.renderer.render(Some(ty))?;
        if self.declarations.contains_key(&rendered) {
            Ok(Some(rendered))
        } else {
            debug!(supertype = %rendered, "dropping supertype outside the scanned set");
            Ok(None)
        }
    }

    /// `(a: A, ...rest: B[]): R`
    fn signature(&self, method: &Method) -> Result<String> {
        let mut params = Vec::with_capacity(method.parameters.len());
        for (name, param) in &method.parameters {
            let ty = self.renderer.render(Some(&param.ty))?;
            if param.variadic {
                params.push(format!("...{}: {}[]", name, ty));
            } else {
                params.push(format!("{}: {}", name, ty));
            }
        }
        let returns = self.renderer.render(method.returns.as_ref())?;
        Ok(format!("({}): {}", params.join(", "), returns))
    }

    fn line(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }
}
