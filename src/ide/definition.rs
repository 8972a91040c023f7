//! Go-to-definition.

use std::path::PathBuf;
use std::sync::Arc;

use bdl_syntax::ast::NodeKind;
use serde::Serialize;

use super::{target_at, Target};
use crate::frontend::program::{Program, SourceFile};
use crate::frontend::providers::SearchMode;
use crate::frontend::resolver::{Definition, FunctionTarget, Resolver};
use crate::frontend::symbols::Namespace;

/// A declaration site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: PathBuf,
    pub start: usize,
    pub end: usize,
    /// 1-based.
    pub line: u32,
    /// 1-based.
    pub column: u32,
}

impl Location {
    fn of(definition: &Definition) -> Self {
        let span = definition.span();
        let (line, column) = definition.location();
        Self {
            path: definition.file.path.clone(),
            start: span.start,
            end: span.end,
            line,
            column,
        }
    }
}

fn function_location(resolver: &Resolver<'_>, file: &Arc<SourceFile>, name: &str) -> Option<Location> {
    match resolver.resolve_function(file, name, SearchMode::All)? {
        FunctionTarget::Defined(resolution) => Some(Location::of(&resolution.definition)),
        FunctionTarget::External(signature) => signature.location.map(|path| Location {
            path,
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }),
        FunctionTarget::Builtin(_) => None,
    }
}

/// Where the name under `offset` is declared. Resolution follows the same order as type names.
pub fn definition(program: &Program, file: &Arc<SourceFile>, offset: usize) -> Option<Location> {
    let target = target_at(&file.tree, offset)?;
    let resolver = Resolver::new(program);
    match target {
        Target::Value { name, at } => resolver
            .resolve_at(file, at, Namespace::Value, &name.node)
            .map(|r| Location::of(&r.definition))
            .or_else(|| function_location(&resolver, file, &name.node)),
        Target::Member { .. } => None,
        Target::Call { name } | Target::Routine { name } => function_location(&resolver, file, &name.node),
        Target::TypeUse { node } => {
            let NodeKind::TypeReference(type_ref) = file.tree.kind(node) else { return None };
            let name = type_ref.name.as_ref().filter(|_| type_ref.base.is_none())?;
            let resolution = resolver.resolve_at(file, node, Namespace::Type, &name.node)?;
            Some(Location::of(&resolution.definition))
        }
        Target::TypeName { name, at } => resolver
            .resolve_at(file, at, Namespace::Type, &name.node)
            .map(|r| Location::of(&r.definition)),
        Target::Cursor { name, at } => resolver
            .resolve_at(file, at, Namespace::Cursor, &name.node)
            .map(|r| Location::of(&r.definition)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn definition_at(program: &Program, path: &str, needle: &str) -> Option<Location> {
        let file = program.file(program.file_id(Path::new(path)).unwrap()).unwrap();
        let offset = file.source.rfind(needle).unwrap();
        definition(program, &file, offset)
    }

    #[test]
    fn test_local_variable() {
        let program = Program::default();
        program.add_source("main.4gl", "MAIN\n  DEFINE n INTEGER\n  LET n = 1\nEND MAIN\n");
        let location = definition_at(&program, "main.4gl", "n =").unwrap();
        assert_eq!((location.line, location.column), (2, 10));
    }

    #[test]
    fn test_type_in_sibling_module() {
        let program = Program::default();
        program.add_source("main.4gl", "DEFINE c customer_t\n");
        program.add_source("types.4gl", "\nPUBLIC TYPE customer_t INTEGER\n");
        let location = definition_at(&program, "main.4gl", "customer_t").unwrap();
        assert_eq!(location.path, PathBuf::from("types.4gl"));
        assert_eq!(location.line, 2);
    }

    #[test]
    fn test_cursor_declaration() {
        let program = Program::default();
        program.add_source(
            "main.4gl",
            "MAIN\n  DECLARE c1 CURSOR FOR SELECT id FROM customer\n  OPEN c1\nEND MAIN\n",
        );
        let location = definition_at(&program, "main.4gl", "c1").unwrap();
        assert_eq!(location.line, 2);
    }

    #[test]
    fn test_call_and_declaration_point_at_function() {
        let program = Program::default();
        program.add_source("main.4gl", "MAIN\n  CALL helper()\nEND MAIN\nFUNCTION helper()\nEND FUNCTION\n");
        let file = program.file(program.file_id(Path::new("main.4gl")).unwrap()).unwrap();
        let call = definition(&program, &file, file.source.find("helper").unwrap()).unwrap();
        let declaration = definition_at(&program, "main.4gl", "helper").unwrap();
        assert_eq!((call.line, call.column), (4, 10));
        assert_eq!(call, declaration);
    }

    #[test]
    fn test_builtin_has_no_location() {
        let program = Program::default();
        program.add_source("main.4gl", "MAIN\n  DISPLAY length(\"abc\")\nEND MAIN\n");
        assert!(definition_at(&program, "main.4gl", "length").is_none());
    }
}
