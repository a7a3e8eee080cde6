//! API member collection.
//!
//! Every API source file defines one class or interface. Members annotated
//! with the exposure markers (`@PhonkField`, `@PhonkMethod`) are collected in
//! source order; everything else in the body is ignored.

use super::java::{JavaReader, parse_java};
use crate::error::{Error, Result};
use crate::ir::{Declaration, Declarations, Method, TypeExpr};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};
use tree_sitter::Node;
use walkdir::WalkDir;

/// Annotation names that mark members as script-exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureMarkers {
    pub field: String,
    pub method: String,
}

impl Default for ExposureMarkers {
    fn default() -> Self {
        Self {
            field: "PhonkField".into(),
            method: "PhonkMethod".into(),
        }
    }
}

/// Where and what to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiScan {
    pub dir: PathBuf,
    /// File extension without the dot (`java`).
    pub extension: String,
    pub markers: ExposureMarkers,
}

/// Collect one declaration from each matching file under `scan.dir`.
///
/// Files are visited in file-name order so repeated runs agree. A repeated
/// declaration name replaces the earlier one.
pub fn collect_declarations(scan: &ApiScan) -> Result<Declarations> {
    let mut declarations = Declarations::new();

    for entry in WalkDir::new(&scan.dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), &scan.extension) {
            continue;
        }

        let path = entry.path();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (name, declaration) =
            collect_declaration(&source, &scan.markers).map_err(|e| e.at(path))?;
        debug!(
            path = %path.display(),
            %name,
            kind = declaration.kind.keyword(),
            attributes = declaration.attributes.len(),
            "collected declaration"
        );
        declarations.insert(name, declaration);
    }

    info!(
        dir = %scan.dir.display(),
        count = declarations.len(),
        "collected declarations"
    );
    Ok(declarations)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

/// Collect the first class or interface declared in `source`.
pub fn collect_declaration(
    source: &str,
    markers: &ExposureMarkers,
) -> Result<(String, Declaration)> {
    let tree = parse_java(source)?;
    let reader = JavaReader::new(source);

    let node = reader
        .find_first(tree.root_node(), &|n| {
            matches!(n.kind(), "class_declaration" | "interface_declaration")
        })
        .ok_or_else(|| Error::NoDeclaration {
            path: PathBuf::new(),
        })?;

    let name = reader
        .name_of(node)
        .ok_or_else(|| Error::NoDeclaration {
            path: PathBuf::new(),
        })?
        .to_string();

    let mut declaration = match node.kind() {
        "class_declaration" => {
            let extends = match node.child_by_field_name("superclass") {
                Some(clause) => first_type(&reader, clause)?,
                None => None,
            };
            let implements = match node.child_by_field_name("interfaces") {
                Some(clause) => type_list(&reader, clause)?,
                None => Vec::new(),
            };
            Declaration::class(extends, implements)
        }
        _ => {
            let mut cursor = node.walk();
            let clause = node
                .children(&mut cursor)
                .find(|c| c.kind() == "extends_interfaces");
            let extends = match clause {
                Some(clause) => type_list(&reader, clause)?.into_iter().next(),
                None => None,
            };
            Declaration::interface(extends)
        }
    };

    for member in reader.body_members(node) {
        match member.kind() {
            "field_declaration" | "constant_declaration" => {
                if !reader.has_annotation(member, &markers.field) {
                    continue;
                }
                let declarators = reader.declarators(member);
                let [declarator] = declarators[..] else {
                    trace!(%name, "skipping multi-declarator field");
                    continue;
                };
                let Some(field_name) = reader.name_of(declarator) else {
                    continue;
                };
                let ty = reader.field_type(member, declarator)?;
                declaration.add_field(field_name, ty);
            }
            "method_declaration" => {
                if !reader.has_annotation(member, &markers.method) {
                    continue;
                }
                let Some(method_name) = reader.name_of(member) else {
                    continue;
                };
                let method = Method {
                    returns: reader.return_type(member)?,
                    parameters: reader.parameters(member)?,
                };
                declaration.add_method(method_name, method);
            }
            _ => {}
        }
    }

    Ok((name, declaration))
}

/// The single type in a `superclass` clause.
fn first_type(reader: &JavaReader, clause: Node) -> Result<Option<TypeExpr>> {
    let mut cursor = clause.walk();
    let ty = clause.named_children(&mut cursor).find(|c| !c.is_extra());
    ty.map(|t| reader.read_type(t)).transpose()
}

/// Types of a `super_interfaces` / `extends_interfaces` clause.
fn type_list(reader: &JavaReader, clause: Node) -> Result<Vec<TypeExpr>> {
    let mut cursor = clause.walk();
    let Some(list) = clause
        .named_children(&mut cursor)
        .find(|c| c.kind() == "type_list")
    else {
        return Ok(Vec::new());
    };

    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|t| !t.is_extra())
        .map(|t| reader.read_type(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Attribute, DeclarationKind, Parameter};

    fn collect(source: &str) -> (String, Declaration) {
        collect_declaration(source, &ExposureMarkers::default()).unwrap()
    }

    #[test]
    fn collects_only_annotated_members_in_order() {
        let (name, decl) = collect(
            r#"
package io.phonk.runner.apprunner.api.widgets;

@PhonkClass
public class PText extends TextView implements PViewMethodsInterface, PTextInterface {
    public StyleProperties props = new StyleProperties();

    @PhonkField(description = "a")
    public String a;

    public PText(AppRunner appRunner) { super(appRunner.getAppContext()); }

    @PhonkMethod(description = "Sets the text color", example = "")
    @PhonkMethodParam(params = {"colorHex"})
    public PText b(String c) { return this; }

    @PhonkField
    public int c;

    public void hidden() {}

    static class Inner {
        @PhonkMethod
        public void nope() {}
    }
}
"#,
        );

        assert_eq!(name, "PText");
        let names: Vec<_> = decl.attributes.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(decl.extends, Some(TypeExpr::named("TextView")));
        assert_eq!(
            decl.kind,
            DeclarationKind::Class {
                implements: vec![
                    TypeExpr::named("PViewMethodsInterface"),
                    TypeExpr::named("PTextInterface"),
                ]
            }
        );
    }

    #[test]
    fn collects_variadic_parameters() {
        let (_, decl) = collect(
            "class P { @PhonkMethod void run(String... args) {} \
             @PhonkMethod Object get(int i, NativeArray arr) { return null; } }",
        );
        let Attribute::Method(run) = &decl.attributes[0].1 else {
            panic!("expected method");
        };
        assert_eq!(run.returns, None);
        assert_eq!(
            run.parameters["args"],
            Parameter {
                ty: TypeExpr::named("String"),
                variadic: true
            }
        );

        let Attribute::Method(get) = &decl.attributes[1].1 else {
            panic!("expected method");
        };
        let params: Vec<_> = get.parameters.keys().map(String::as_str).collect();
        assert_eq!(params, ["i", "arr"]);
        assert_eq!(get.returns, Some(TypeExpr::named("Object")));
    }

    #[test]
    fn keeps_overloads_separately() {
        let (_, decl) = collect(
            "class P { @PhonkMethod void f(int a) {} @PhonkMethod void f(String a) {} }",
        );
        assert_eq!(decl.attributes.len(), 2);
    }

    #[test]
    fn interface_takes_first_extended_type() {
        let (name, decl) = collect(
            "public interface B extends A, C { @PhonkMethod void f(); @PhonkField int X = 1; }",
        );
        assert_eq!(name, "B");
        assert_eq!(decl.kind, DeclarationKind::Interface);
        assert_eq!(decl.extends, Some(TypeExpr::named("A")));
        assert_eq!(decl.attributes.len(), 2);
    }

    #[test]
    fn multi_declarator_exposed_field_is_skipped() {
        let (_, decl) = collect("class P { @PhonkField int a, b; }");
        assert!(decl.attributes.is_empty());
    }

    #[test]
    fn qualified_annotation_matches() {
        let (_, decl) = collect(
            "class P { @io.phonk.runner.apidoc.annotation.PhonkMethod void f() {} }",
        );
        assert_eq!(decl.attributes.len(), 1);
    }

    #[test]
    fn enum_is_descended_into() {
        let (name, decl) = collect("enum E { A; interface Inner {} }");
        assert_eq!(name, "Inner");
        assert_eq!(decl.kind, DeclarationKind::Interface);
    }

    #[test]
    fn file_without_declaration_is_fatal() {
        let err = collect_declaration("package a;", &ExposureMarkers::default()).unwrap_err();
        assert!(matches!(err, Error::NoDeclaration { .. }));
    }

    #[test]
    fn scans_tree_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("widgets");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("PB.java"), "class PB {}").unwrap();
        std::fs::write(dir.path().join("PA.java"), "class PA {}").unwrap();
        std::fs::write(nested.join("PC.java"), "interface PC {}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not java").unwrap();

        let scan = ApiScan {
            dir: dir.path().to_path_buf(),
            extension: "java".into(),
            markers: ExposureMarkers::default(),
        };
        let decls = collect_declarations(&scan).unwrap();
        let names: Vec<_> = decls.keys().map(String::as_str).collect();
        assert_eq!(names, ["PA", "PB", "PC"]);
    }

    #[test]
    fn unsupported_type_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("PV.java"), "class PV { @PhonkField void x; }").unwrap();
        let scan = ApiScan {
            dir: dir.path().to_path_buf(),
            extension: "java".into(),
            markers: ExposureMarkers::default(),
        };
        let err = collect_declarations(&scan).unwrap_err();
        assert!(err.to_string().ends_with("PV.java"), "{err}");
        match err {
            Error::UnsupportedType { path, text } => {
                assert!(path.ends_with("PV.java"));
                assert_eq!(text, "void");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Broken.java"), "class Broken {").unwrap();
        let scan = ApiScan {
            dir: dir.path().to_path_buf(),
            extension: "java".into(),
            markers: ExposureMarkers::default(),
        };
        match collect_declarations(&scan).unwrap_err() {
            Error::Parse { path, .. } => assert!(path.ends_with("Broken.java")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
