//! Hover text for the identifier or type under the cursor.

use std::sync::Arc;

use bdl_core::lang::packages;
use bdl_syntax::ast::attributes::BoundSql;
use bdl_syntax::ast::{NodeId, NodeKind, Span};

use super::{target_at, Target};
use crate::frontend::program::{Program, SourceFile};
use crate::frontend::providers::SearchMode;
use crate::frontend::resolver::{Definition, ResolvedType, Resolver};
use crate::frontend::symbols::{Namespace, SymbolKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hover {
    /// Range the hover applies to.
    pub span: Span,
    /// Plain text, one fact per line.
    pub contents: String,
}

/// Hover for `offset` in `file`, or `None` when nothing resolvable is under the cursor.
pub fn hover(program: &Program, file: &Arc<SourceFile>, offset: usize) -> Option<Hover> {
    let target = target_at(&file.tree, offset)?;
    let resolver = Resolver::new(program);
    let contents = match target {
        Target::Value { name, at } => {
            if let Some(resolution) = resolver.resolve_at(file, at, Namespace::Value, &name.node) {
                describe_value(&resolver, file, &resolution.definition)
            } else if let Some(function) = resolver.resolve_function(file, &name.node, SearchMode::All) {
                function.signature(&resolver)
            } else {
                describe_cursor(&resolver, file, at, &name.node)?
            }
        }
        Target::Member { name, node } => {
            let ty = resolver.expression_type(file, node)?;
            format!("member {}: {}", name.node, ty.describe())
        }
        Target::Call { name } | Target::Routine { name } => resolver
            .resolve_function(file, &name.node, SearchMode::All)?
            .signature(&resolver),
        Target::TypeUse { node } => describe_type_use(&resolver, file, node)?,
        Target::TypeName { name, at } => {
            let resolution = resolver.resolve_at(file, at, Namespace::Type, &name.node)?;
            let definition = &resolution.definition;
            let ty = resolver.symbol_type(&definition.file, &definition.symbol)?;
            format!("type {} = {}", definition.symbol.name.node, ty.expand())
        }
        Target::Cursor { name, at } => describe_cursor(&resolver, file, at, &name.node)?,
    };
    Some(Hover {
        span: target.span(&file.tree),
        contents,
    })
}

fn declared_in(file: &SourceFile, definition: &Definition) -> Option<String> {
    if definition.file.path == file.path {
        return None;
    }
    let (line, column) = definition.location();
    Some(format!("defined in {}:{line}:{column}", definition.file.display_name()))
}

fn describe_value(resolver: &Resolver<'_>, file: &SourceFile, definition: &Definition) -> String {
    let symbol = &definition.symbol;
    let mut text = format!("{} {}", symbol.kind.describe(), symbol.name.node);
    if let Some(ty) = resolver.symbol_type(&definition.file, symbol) {
        text.push_str(&format!(": {}", ty.describe()));
    }
    if let SymbolKind::Constant { value: Some(value), .. } = symbol.kind {
        let span = definition.file.tree.span(value);
        if let Some(written) = definition.file.source.get(span.start..span.end) {
            text.push_str(&format!(" = {written}"));
        }
    }
    if symbol.global {
        text.push_str(" (global)");
    }
    if let Some(location) = declared_in(file, definition) {
        text.push('\n');
        text.push_str(&location);
    }
    text
}

fn describe_type_use(resolver: &Resolver<'_>, file: &Arc<SourceFile>, node: NodeId) -> Option<String> {
    let ty = file
        .tree
        .attributes(node)
        .and_then(|bag| bag.get::<ResolvedType>())
        .cloned()
        .unwrap_or_else(|| resolver.resolve_type(file, node));
    Some(match &ty {
        ResolvedType::Package(id) => {
            let info = packages::info_for(*id);
            format!("{}\n{}", info.qualified_name(), info.description)
        }
        ResolvedType::Missing => return None,
        ResolvedType::Unresolved(name) => format!("unknown type {name}"),
        _ => match file.tree.kind(node) {
            NodeKind::TypeReference(t) if t.mimic.is_some() => format!("mimic {}", ty.describe()),
            _ => format!("type {}", ty.describe()),
        },
    })
}

fn describe_cursor(resolver: &Resolver<'_>, file: &Arc<SourceFile>, at: NodeId, name: &str) -> Option<String> {
    let resolution = resolver.resolve_at(file, at, Namespace::Cursor, name)?;
    let definition = &resolution.definition;
    let mut text = format!("{} {}", definition.symbol.kind.describe(), definition.symbol.name.node);
    let bound = definition
        .file
        .tree
        .attributes(definition.symbol.node)
        .and_then(|bag| bag.get::<BoundSql>());
    if let Some(sql) = bound {
        text.push('\n');
        text.push_str(&sql.text);
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hover_at(program: &Program, path: &str, source: &str, needle: &str) -> Option<Hover> {
        let id = program.file_id(std::path::Path::new(path)).unwrap();
        let file = program.file(id).unwrap();
        let offset = source.rfind(needle).unwrap();
        hover(program, &file, offset)
    }

    #[test]
    fn test_hover_variable_shows_expanded_type() {
        let source = "TYPE money_t DECIMAL(10,2)\nDEFINE total money_t\nMAIN\n  DISPLAY total\nEND MAIN\n";
        let program = Program::default();
        program.add_source("main.4gl", source);
        let hover = hover_at(&program, "main.4gl", source, "total").unwrap();
        assert_eq!(hover.contents, "variable total: money_t = DECIMAL(10,2)");
        assert_eq!(hover.span.len(), "total".len());
    }

    #[test]
    fn test_hover_function_call_from_sibling() {
        let source = "MAIN\n  CALL add_tax(1)\nEND MAIN\n";
        let program = Program::default();
        program.add_source("main.4gl", source);
        program.add_source(
            "tax.4gl",
            "FUNCTION add_tax(amount)\n  DEFINE amount DECIMAL(10,2)\n  RETURN amount\nEND FUNCTION\n",
        );
        let hover = hover_at(&program, "main.4gl", source, "add_tax").unwrap();
        assert_eq!(hover.contents, "FUNCTION add_tax(amount DECIMAL(10,2))");
    }

    #[test]
    fn test_hover_constant_and_global() {
        let source = "GLOBALS\n  CONSTANT max_rows = 100\nEND GLOBALS\nMAIN\n  DISPLAY max_rows\nEND MAIN\n";
        let program = Program::default();
        program.add_source("main.4gl", source);
        let hover = hover_at(&program, "main.4gl", source, "max_rows").unwrap();
        assert_eq!(hover.contents, "constant max_rows = 100 (global)");
    }

    #[test]
    fn test_hover_package_type() {
        let source = "DEFINE sb base.StringBuffer\n";
        let program = Program::default();
        program.add_source("main.4gl", source);
        let hover = hover_at(&program, "main.4gl", source, "StringBuffer").unwrap();
        assert!(hover.contents.starts_with("base.StringBuffer\n"));
    }

    #[test]
    fn test_hover_nothing_on_keyword() {
        let source = "MAIN\nEND MAIN\n";
        let program = Program::default();
        program.add_source("main.4gl", source);
        assert!(hover_at(&program, "main.4gl", source, "END").is_none());
    }
}
