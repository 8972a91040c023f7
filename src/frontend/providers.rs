//! Interfaces to the world outside a single program: function catalogs, database schemas, the program's file
//! list, and referenced projects.
//!
//! The front end consumes these; it never implements a real database connection or project system. The
//! in-memory implementations here back the CLI (`--schema schema.json`) and the tests.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use super::program::SourceFile;

/// How far a function lookup may reach beyond the current file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Only the current file and what it includes. Unknown calls are not reported.
    None,
    /// The current file plus the other modules of the program.
    #[default]
    Program,
    /// Everything: the program, referenced projects, and the function provider.
    All,
}

impl SearchMode {
    pub fn includes_program(self) -> bool {
        matches!(self, SearchMode::Program | SearchMode::All)
    }

    pub fn includes_external(self) -> bool {
        self == SearchMode::All
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::None => write!(f, "none"),
            SearchMode::Program => write!(f, "program"),
            SearchMode::All => write!(f, "all"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SearchMode::None),
            "program" => Ok(SearchMode::Program),
            "all" => Ok(SearchMode::All),
            other => Err(format!("unknown search mode '{other}' (expected none, program or all)")),
        }
    }
}

/// A function known to a [`FunctionProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<String>,
    pub returns: Vec<String>,
    /// Where the function is defined, when the provider knows.
    pub location: Option<PathBuf>,
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FUNCTION {}({})", self.name, self.params.join(", "))?;
        if !self.returns.is_empty() {
            write!(f, " RETURNS ({})", self.returns.join(", "))?;
        }
        Ok(())
    }
}

/// Functions defined outside the loaded sources (libraries, other repositories).
pub trait FunctionProvider: Send + Sync {
    fn function(&self, name: &str, mode: SearchMode) -> Option<FunctionSignature>;
}

/// A column of a schema table. `type_text` is the declared type as BDL spells it (`DECIMAL(10,2)`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
}

/// Database schemas, for `LIKE table.column` and `RECORD LIKE table.*`.
pub trait SchemaProvider: Send + Sync {
    /// Declared type of one column, or `None` when the table or column does not exist.
    fn column_type(&self, database: Option<&str>, table: &str, column: &str) -> Option<String>;

    /// Every column of a table in declaration order, or `None` when the table does not exist.
    fn table_columns(&self, database: Option<&str>, table: &str) -> Option<Vec<Column>>;
}

/// Enumerates the source files that make up one program.
pub trait ProgramFileProvider: Send + Sync {
    /// Files of the program `entry` belongs to, `entry` included.
    fn program_files(&self, entry: &Path) -> Vec<PathBuf>;
}

/// Parsed files of projects the program references.
pub trait ReferencedProjectProvider: Send + Sync {
    fn files(&self) -> Vec<Arc<SourceFile>>;
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// Schema read from JSON: `{ "name": "stores", "tables": { "customer": [ { "name": "id", "type": "INTEGER" } ] } }`.
///
/// Table and column names match case-insensitively. A database name in a lookup must match the schema's name
/// when one is given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticSchema {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    tables: HashMap<String, Vec<Column>>,
}

/// Failure to load a schema file.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("cannot read schema '{path}': {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid schema '{path}': {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

impl StaticSchema {
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            tables: HashMap::new(),
        }
    }

    /// Add a table; `columns` are `(name, type)` pairs.
    pub fn with_table(mut self, table: &str, columns: &[(&str, &str)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, ty)| Column {
                name: name.to_string(),
                type_text: ty.to_string(),
            })
            .collect();
        self.tables.insert(table.to_ascii_lowercase(), columns);
        self
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut schema: StaticSchema = serde_json::from_str(text)?;
        schema.tables = schema
            .tables
            .into_iter()
            .map(|(name, columns)| (name.to_ascii_lowercase(), columns))
            .collect();
        Ok(schema)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| SchemaError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn table(&self, database: Option<&str>, table: &str) -> Option<&Vec<Column>> {
        if let (Some(wanted), Some(name)) = (database, self.name.as_deref()) {
            if !wanted.eq_ignore_ascii_case(name) {
                return None;
            }
        }
        self.tables.get(&table.to_ascii_lowercase())
    }
}

impl SchemaProvider for StaticSchema {
    fn column_type(&self, database: Option<&str>, table: &str, column: &str) -> Option<String> {
        self.table(database, table)?
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(column))
            .map(|c| c.type_text.clone())
    }

    fn table_columns(&self, database: Option<&str>, table: &str) -> Option<Vec<Column>> {
        self.table(database, table).cloned()
    }
}

/// Fixed catalog of external functions.
#[derive(Debug, Clone, Default)]
pub struct StaticFunctions {
    functions: Vec<FunctionSignature>,
}

impl StaticFunctions {
    pub fn new(functions: Vec<FunctionSignature>) -> Self {
        Self { functions }
    }
}

impl FunctionProvider for StaticFunctions {
    fn function(&self, name: &str, mode: SearchMode) -> Option<FunctionSignature> {
        if !mode.includes_external() {
            return None;
        }
        self.functions.iter().find(|f| f.name.eq_ignore_ascii_case(name)).cloned()
    }
}

/// Treats every source file in the entry's directory as part of the program.
#[derive(Debug, Clone)]
pub struct DirectoryProgram {
    extensions: Vec<String>,
}

impl Default for DirectoryProgram {
    fn default() -> Self {
        Self {
            extensions: vec!["4gl".to_string(), "bdl".to_string()],
        }
    }
}

impl DirectoryProgram {
    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }
}

impl ProgramFileProvider for DirectoryProgram {
    fn program_files(&self, entry: &Path) -> Vec<PathBuf> {
        let dir = entry.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && self.is_source(p))
                .collect(),
            Err(e) => {
                tracing::warn!("cannot list program directory {}: {e}", dir.display());
                Vec::new()
            }
        };
        if !files.iter().any(|f| f.file_name() == entry.file_name()) {
            files.push(entry.to_path_buf());
        }
        files.sort();
        files
    }
}

/// Referenced project whose files were parsed up front.
#[derive(Debug, Clone, Default)]
pub struct LoadedProject {
    files: Vec<Arc<SourceFile>>,
}

impl LoadedProject {
    pub fn new(files: Vec<Arc<SourceFile>>) -> Self {
        Self { files }
    }
}

impl ReferencedProjectProvider for LoadedProject {
    fn files(&self) -> Vec<Arc<SourceFile>> {
        self.files.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lookup_ignores_case() {
        let schema = StaticSchema::new(Some("stores")).with_table("Customer", &[("id", "INTEGER"), ("name", "CHAR(30)")]);
        assert_eq!(schema.column_type(None, "CUSTOMER", "Name").as_deref(), Some("CHAR(30)"));
        assert_eq!(schema.column_type(Some("STORES"), "customer", "id").as_deref(), Some("INTEGER"));
        assert_eq!(schema.column_type(Some("other"), "customer", "id"), None);
        assert_eq!(schema.column_type(None, "customer", "missing"), None);
        assert_eq!(schema.table_columns(None, "customer").map(|c| c.len()), Some(2));
    }

    #[test]
    fn test_schema_from_json() {
        let schema = StaticSchema::from_json(
            r#"{ "name": "stores", "tables": { "Orders": [ { "name": "total", "type": "DECIMAL(10,2)" } ] } }"#,
        )
        .unwrap();
        assert_eq!(schema.column_type(None, "orders", "TOTAL").as_deref(), Some("DECIMAL(10,2)"));
    }

    #[test]
    fn test_search_mode_parse() {
        assert_eq!("ALL".parse::<SearchMode>().unwrap(), SearchMode::All);
        assert_eq!("none".parse::<SearchMode>().unwrap(), SearchMode::None);
        assert!("everything".parse::<SearchMode>().is_err());
        assert!(!SearchMode::None.includes_program());
        assert!(SearchMode::Program.includes_program());
        assert!(!SearchMode::Program.includes_external());
    }

    #[test]
    fn test_static_functions_need_all_mode() {
        let functions = StaticFunctions::new(vec![FunctionSignature {
            name: "fgl_winmessage".into(),
            params: vec!["title".into(), "text".into(), "icon".into()],
            returns: vec![],
            location: None,
        }]);
        assert!(functions.function("FGL_WINMESSAGE", SearchMode::Program).is_none());
        let found = functions.function("FGL_WINMESSAGE", SearchMode::All).unwrap();
        assert_eq!(found.to_string(), "FUNCTION fgl_winmessage(title, text, icon)");
    }
}
