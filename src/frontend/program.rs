//! Multi-file program model.
//!
//! A [`Program`] owns the parsed files of one program. Files are parsed in parallel by independent parser
//! instances and each finished [`SourceFile`] is published into a concurrent map, read-only from then on.
//! Cross-file lookups only read what is already published: a sibling that is still being parsed is simply
//! "not found".
//!
//! ## Notes
//! - Files named by `&include "x"` or `GLOBALS "x"` are loaded after the program files, relative to the file
//!   that names them, until no new include turns up. A missing include is left for the check pass to report.
//! - Program-wide scans check the shared [`CancellationFlag`] between files.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use bdl_syntax::ast::{NodeId, NodeKind, Spanned, SyntaxTree};
use bdl_syntax::diagnostics::{CollectingSink, LocatedDiagnostic};
use bdl_syntax::parser::{self, ParseOptions};
use dashmap::DashMap;
use rayon::prelude::*;

use super::providers::{FunctionProvider, ProgramFileProvider, ReferencedProjectProvider, SchemaProvider};
use super::resolver::ResolutionCache;
use super::symbols::FileSymbols;

/// Largest source file the loader accepts (100 MB).
pub const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Stack size of the parsing threads. Deeply nested input recurses deeply in debug builds.
const PARSER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Index of a file within its [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Why a file is part of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// A module of the program.
    Module,
    /// Only pulled in by `&include` or `GLOBALS "file"`.
    Included,
}

/// One parsed file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    pub source: String,
    pub tree: SyntaxTree,
    /// Lexical and syntax diagnostics, in source order.
    pub diagnostics: Vec<LocatedDiagnostic>,
    pub symbols: FileSymbols,
    pub role: FileRole,
}

impl SourceFile {
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn parse(id: FileId, path: PathBuf, source: String, options: &ParseOptions, role: FileRole) -> Self {
        let mut sink = CollectingSink::new();
        let tree = parser::parse(&source, options, &mut sink);
        let symbols = FileSymbols::collect(&tree);
        tracing::debug!(nodes = tree.len(), diagnostics = sink.len(), "parsed");
        Self {
            id,
            path,
            source,
            tree,
            diagnostics: sink.into_diagnostics(),
            symbols,
            role,
        }
    }

    /// Files this one names with `&include "x"` or `GLOBALS "x"`, with the node that names them.
    pub fn includes(&self) -> Vec<(NodeId, &Spanned<String>)> {
        let module = self.tree.node(self.tree.root());
        module
            .children()
            .filter_map(|id| match self.tree.kind(id) {
                NodeKind::Include(i) => Some((id, &i.path)),
                NodeKind::GlobalsFile(g) => Some((id, &g.path)),
                _ => None,
            })
            .collect()
    }

    /// 1-based line and column of `offset`.
    pub fn location_of(&self, offset: usize) -> (u32, u32) {
        self.tree.line_table().location_of(offset)
    }

    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }

    /// Directory includes are resolved against.
    fn include_base(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}

/// Failure to load program files. Problems *inside* the files are diagnostics, not errors.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("cannot read '{}': {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("source file '{}' is too large ({size} bytes, max {max} bytes)", path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },
    #[error("operation cancelled")]
    Cancelled,
}

/// Shared, cooperative cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<(), ProgramError> {
        if self.is_cancelled() { Err(ProgramError::Cancelled) } else { Ok(()) }
    }
}

/// The files of one program plus the providers that describe its surroundings.
pub struct Program {
    options: ParseOptions,
    files: DashMap<FileId, Arc<SourceFile>>,
    paths: DashMap<PathBuf, FileId>,
    next_id: AtomicU32,
    schema: Option<Arc<dyn SchemaProvider>>,
    functions: Option<Arc<dyn FunctionProvider>>,
    projects: Vec<Arc<dyn ReferencedProjectProvider>>,
    cancel: CancellationFlag,
    pub(crate) cache: ResolutionCache,
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("files", &self.files.len())
            .field("schema", &self.schema.is_some())
            .field("functions", &self.functions.is_some())
            .field("projects", &self.projects.len())
            .finish()
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

/// Lexically normalize `path`: drop `.` components and fold `dir/..`.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn read_source(path: &Path) -> Result<String, ProgramError> {
    let metadata = fs::metadata(path).map_err(|source| ProgramError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(ProgramError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max: MAX_SOURCE_SIZE,
        });
    }
    fs::read_to_string(path).map_err(|source| ProgramError::Read {
        path: path.to_path_buf(),
        source,
    })
}

impl Program {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            files: DashMap::new(),
            paths: DashMap::new(),
            next_id: AtomicU32::new(0),
            schema: None,
            functions: None,
            projects: Vec::new(),
            cancel: CancellationFlag::new(),
            cache: ResolutionCache::default(),
        }
    }

    pub fn with_schema(mut self, schema: Arc<dyn SchemaProvider>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_functions(mut self, functions: Arc<dyn FunctionProvider>) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn with_project(mut self, project: Arc<dyn ReferencedProjectProvider>) -> Self {
        self.projects.push(project);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn schema(&self) -> Option<&dyn SchemaProvider> {
        self.schema.as_deref()
    }

    pub fn functions(&self) -> Option<&dyn FunctionProvider> {
        self.functions.as_deref()
    }

    pub fn projects(&self) -> &[Arc<dyn ReferencedProjectProvider>] {
        &self.projects
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    // ------------------------------------------------------------------------
    // Publishing
    // ------------------------------------------------------------------------

    /// Id for `path`, reusing the existing one when the path was seen before.
    fn reserve_id(&self, path: &Path) -> FileId {
        *self
            .paths
            .entry(path.to_path_buf())
            .or_insert_with(|| FileId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn publish(&self, file: SourceFile) -> FileId {
        let id = file.id;
        self.files.insert(id, Arc::new(file));
        self.cache.clear();
        id
    }

    /// Parse `source` as the module at `path` and publish it, replacing an earlier version of the same path.
    pub fn add_source(&self, path: impl AsRef<Path>, source: impl Into<String>) -> FileId {
        self.add_with_role(path.as_ref(), source.into(), FileRole::Module)
    }

    /// Like [`add_source`](Self::add_source) for a file that is only included by others.
    pub fn add_included_source(&self, path: impl AsRef<Path>, source: impl Into<String>) -> FileId {
        self.add_with_role(path.as_ref(), source.into(), FileRole::Included)
    }

    fn add_with_role(&self, path: &Path, source: String, role: FileRole) -> FileId {
        let path = normalize(path);
        let id = self.reserve_id(&path);
        self.publish(SourceFile::parse(id, path, source, &self.options, role))
    }

    /// Read and parse `paths` in parallel, then every file they include.
    ///
    /// ## Errors
    /// - [`ProgramError::Read`] / [`ProgramError::TooLarge`] when a program file cannot be loaded.
    /// - [`ProgramError::Cancelled`] when the cancellation flag is raised between files.
    #[tracing::instrument(skip_all, fields(files = paths.len()))]
    pub fn load(&self, paths: &[PathBuf]) -> Result<Vec<FileId>, ProgramError> {
        let jobs: Vec<(FileId, PathBuf)> = paths
            .iter()
            .map(|p| {
                let path = normalize(p);
                (self.reserve_id(&path), path)
            })
            .collect();
        let ids = self.parse_all(&jobs, FileRole::Module)?;

        let mut frontier = ids.clone();
        let mut queued: HashSet<PathBuf> = HashSet::new();
        while !frontier.is_empty() {
            let mut includes = Vec::new();
            for id in &frontier {
                let Some(file) = self.file(*id) else { continue };
                for (_, target) in file.includes() {
                    let path = normalize(&file.include_base().join(&target.node));
                    if self.paths.contains_key(&path) || !path.is_file() || !queued.insert(path.clone()) {
                        continue;
                    }
                    includes.push((self.reserve_id(&path), path));
                }
            }
            if !includes.is_empty() {
                tracing::debug!(count = includes.len(), "loading included files");
            }
            frontier = self.parse_all(&includes, FileRole::Included)?;
        }
        Ok(ids)
    }

    /// Load every file `provider` lists for the program `entry` belongs to.
    pub fn load_program(&self, entry: &Path, provider: &dyn ProgramFileProvider) -> Result<Vec<FileId>, ProgramError> {
        self.load(&provider.program_files(entry))
    }

    fn parse_all(&self, jobs: &[(FileId, PathBuf)], role: FileRole) -> Result<Vec<FileId>, ProgramError> {
        let work = |(id, path): &(FileId, PathBuf)| -> Result<FileId, ProgramError> {
            self.cancel.check()?;
            let source = read_source(path)?;
            Ok(self.publish(SourceFile::parse(*id, path.clone(), source, &self.options, role)))
        };
        if jobs.len() <= 1 {
            return jobs.iter().map(work).collect();
        }
        match rayon::ThreadPoolBuilder::new().stack_size(PARSER_STACK_SIZE).build() {
            Ok(pool) => pool.install(|| jobs.par_iter().map(work).collect()),
            Err(e) => {
                tracing::warn!("failed to create thread pool ({e}), parsing sequentially");
                jobs.iter().map(work).collect()
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn file(&self, id: FileId) -> Option<Arc<SourceFile>> {
        self.files.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        let id = *self.paths.get(&normalize(path))?;
        self.files.contains_key(&id).then_some(id)
    }

    /// Published files in id order.
    pub fn files(&self) -> Vec<Arc<SourceFile>> {
        let mut files: Vec<Arc<SourceFile>> = self.files.iter().map(|e| Arc::clone(e.value())).collect();
        files.sort_by_key(|f| f.id);
        files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The other modules of the program, in id order.
    pub fn siblings(&self, of: FileId) -> Vec<Arc<SourceFile>> {
        self.files()
            .into_iter()
            .filter(|f| f.id != of && f.role == FileRole::Module)
            .collect()
    }

    /// Published file that `target` (as written in `from`) names.
    pub fn resolve_include(&self, from: &SourceFile, target: &str) -> Option<Arc<SourceFile>> {
        let id = self.file_id(&from.include_base().join(target))?;
        self.file(id)
    }

    /// Replace the published tree of `id` with a copy carrying resolved-type attributes.
    ///
    /// Returns the number of annotated type references.
    pub fn annotate(&self, id: FileId) -> Option<usize> {
        let file = self.file(id)?;
        let mut updated = SourceFile::clone(&file);
        let count = super::resolver::Resolver::new(self).annotate(&file, &mut updated.tree);
        self.files.insert(id, Arc::new(updated));
        Some(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::AtomicU64;

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_temp_dir() -> PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("bdl_program_test_{pid}_{id}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b/../c.4gl")), PathBuf::from("a/c.4gl"));
        assert_eq!(normalize(Path::new("../x.4gl")), PathBuf::from("../x.4gl"));
    }

    #[test]
    fn test_add_source_replaces_same_path() {
        let program = Program::default();
        let first = program.add_source("main.4gl", "MAIN\nEND MAIN\n");
        let second = program.add_source("./main.4gl", "MAIN\n  DISPLAY 1\nEND MAIN\n");
        assert_eq!(first, second);
        assert_eq!(program.len(), 1);
        assert!(program.file(first).unwrap().source.contains("DISPLAY"));
    }

    #[test]
    fn test_load_follows_includes() {
        let dir = unique_temp_dir();
        let main = write(&dir, "main.4gl", "GLOBALS \"globals.4gl\"\nMAIN\nEND MAIN\n");
        let other = write(&dir, "util.4gl", "FUNCTION helper()\nEND FUNCTION\n");
        write(&dir, "globals.4gl", "GLOBALS\n  DEFINE g_count INTEGER\nEND GLOBALS\n");

        let program = Program::default();
        let ids = program.load(&[main.clone(), other]).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(program.len(), 3);

        let main_file = program.file(program.file_id(&main).unwrap()).unwrap();
        let included = program.resolve_include(&main_file, "globals.4gl").unwrap();
        assert_eq!(included.role, FileRole::Included);
        assert_eq!(program.siblings(main_file.id).len(), 1);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_reports_missing_file() {
        let program = Program::default();
        let err = program.load(&[PathBuf::from("/nonexistent/bdl/main.4gl")]).unwrap_err();
        assert!(matches!(err, ProgramError::Read { .. }));
    }

    #[test]
    fn test_cancelled_load() {
        let dir = unique_temp_dir();
        let main = write(&dir, "main.4gl", "MAIN\nEND MAIN\n");
        let cancel = CancellationFlag::new();
        let program = Program::default().with_cancellation(cancel.clone());
        cancel.cancel();
        assert!(matches!(program.load(&[main]), Err(ProgramError::Cancelled)));
        assert!(program.is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }
}
