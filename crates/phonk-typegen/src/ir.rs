//! Intermediate representation of the scripting-bridge API surface.
//!
//! Readers in [`crate::input`] build these values from Java sources; the
//! writer in [`crate::output`] turns them into TypeScript declarations.
//! Everything here is built once per run and never mutated afterwards.

use indexmap::IndexMap;

/// One array dimension of a type occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dimension {
    /// `[]`
    Unsized,
    /// `[expr]`, kept as source text. Never renderable.
    Sized(String),
}

/// A Java type occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `int`, `boolean`, `double`, ...
    Primitive {
        name: String,
        dimensions: Vec<Dimension>,
    },
    /// A class or interface reference.
    ///
    /// `Outer.Inner<T>[]` is `Named("Outer", qualifier: Named("Inner", arguments: [T]))`
    /// with the dimension on the outermost node.
    Named {
        name: String,
        /// `None` when the source has no `<...>` clause at all.
        arguments: Option<Vec<TypeExpr>>,
        qualifier: Option<Box<TypeExpr>>,
        dimensions: Vec<Dimension>,
    },
}

impl TypeExpr {
    /// A primitive type without dimensions.
    pub fn primitive(name: impl Into<String>) -> Self {
        TypeExpr::Primitive {
            name: name.into(),
            dimensions: Vec::new(),
        }
    }

    /// A plain named type without arguments, qualifier or dimensions.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            arguments: None,
            qualifier: None,
            dimensions: Vec::new(),
        }
    }

    /// A named type with a type-argument clause.
    pub fn generic(name: impl Into<String>, arguments: Vec<TypeExpr>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            arguments: Some(arguments),
            qualifier: None,
            dimensions: Vec::new(),
        }
    }

    /// Nest `inner` under this type (`self.inner`).
    ///
    /// The qualifier is attached to the innermost existing segment so that
    /// calling this repeatedly builds `A.B.C` left to right. Primitives have
    /// no members, so nesting under one is a no-op and `inner` is dropped.
    pub fn nested(mut self, inner: TypeExpr) -> Self {
        self.push_qualifier(inner);
        self
    }

    fn push_qualifier(&mut self, inner: TypeExpr) {
        match self {
            TypeExpr::Named { qualifier, .. } => match qualifier {
                Some(existing) => existing.push_qualifier(inner),
                None => *qualifier = Some(Box::new(inner)),
            },
            TypeExpr::Primitive { .. } => {}
        }
    }

    /// Append `count` unsized dimensions.
    pub fn array(mut self, count: usize) -> Self {
        self.dimensions_mut()
            .extend(std::iter::repeat_n(Dimension::Unsized, count));
        self
    }

    /// Append one dimension.
    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions_mut().push(dimension);
        self
    }

    pub fn name(&self) -> &str {
        match self {
            TypeExpr::Primitive { name, .. } | TypeExpr::Named { name, .. } => name,
        }
    }

    pub fn dimensions(&self) -> &[Dimension] {
        match self {
            TypeExpr::Primitive { dimensions, .. } | TypeExpr::Named { dimensions, .. } => {
                dimensions
            }
        }
    }

    fn dimensions_mut(&mut self) -> &mut Vec<Dimension> {
        match self {
            TypeExpr::Primitive { dimensions, .. } | TypeExpr::Named { dimensions, .. } => {
                dimensions
            }
        }
    }

    /// True for class/interface references, including arrays of them.
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeExpr::Named { .. })
    }
}

/// An exposed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub ty: TypeExpr,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ty: TypeExpr,
    /// `T... name`. Only ever true for the last parameter.
    pub variadic: bool,
}

/// An exposed method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// `None` for `void`.
    pub returns: Option<TypeExpr>,
    /// Parameters in declaration order.
    pub parameters: IndexMap<String, Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Field(Field),
    Method(Method),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    Class { implements: Vec<TypeExpr> },
    Interface,
}

impl DeclarationKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclarationKind::Class { .. } => "class",
            DeclarationKind::Interface => "interface",
        }
    }
}

/// A scanned class or interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub extends: Option<TypeExpr>,
    /// Exposed members in source order. Overloads appear once per overload.
    pub attributes: Vec<(String, Attribute)>,
}

impl Declaration {
    pub fn class(extends: Option<TypeExpr>, implements: Vec<TypeExpr>) -> Self {
        Self {
            kind: DeclarationKind::Class { implements },
            extends,
            attributes: Vec::new(),
        }
    }

    pub fn interface(extends: Option<TypeExpr>) -> Self {
        Self {
            kind: DeclarationKind::Interface,
            extends,
            attributes: Vec::new(),
        }
    }

    pub fn add_field(&mut self, name: impl Into<String>, ty: TypeExpr) {
        self.attributes
            .push((name.into(), Attribute::Field(Field { ty })));
    }

    pub fn add_method(&mut self, name: impl Into<String>, method: Method) {
        self.attributes.push((name.into(), Attribute::Method(method)));
    }

    pub fn implements(&self) -> &[TypeExpr] {
        match &self.kind {
            DeclarationKind::Class { implements } => implements,
            DeclarationKind::Interface => &[],
        }
    }
}

/// All scanned declarations by name, in collection order.
///
/// Inserting an existing name replaces the value but keeps its position.
pub type Declarations = IndexMap<String, Declaration>;

/// Script-visible bindings by name, in registration order.
pub type EntryPoints = IndexMap<String, TypeExpr>;
