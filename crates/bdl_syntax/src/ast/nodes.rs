//! Node kinds and their payloads.
//!
//! Payloads refer to their sub-nodes by [`NodeId`]; every id a payload mentions is also one of the node's
//! children, so generic walks (offset lookup, span checks) never need to know the payload shape.

use bdl_core::lang::keywords::KeywordId;
use bdl_core::lang::types::BaseTypeId;

use super::{Name, NodeId, Spanned};

/// Closed set of node kinds, grouped into module structure, declarations, types, statements and expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // ========== Module structure ==========
    Module(ModuleNode),
    Import(ImportDecl),
    Schema(SchemaDecl),
    GlobalsFile(GlobalsFile),
    Globals(GlobalsBlock),
    Include(IncludeDirective),
    Directive(DirectiveNode),
    Main(MainDef),
    Function(FunctionDef),
    Report(ReportDef),
    ReportSection(ReportSection),

    // ========== Declarations ==========
    Define(DefineDecl),
    VariableGroup(VariableGroup),
    Constant(ConstantDecl),
    ConstantItem(ConstantItem),
    TypeDecl(TypeDecl),
    TypeItem(TypeItem),
    Parameter(Parameter),

    // ========== Type references ==========
    TypeReference(TypeReference),
    ArrayType(ArrayType),
    RecordDefinition(RecordDefinition),
    DictionaryDefinition(DictionaryDefinition),
    FunctionType(FunctionType),

    // ========== Statements ==========
    Call(CallStmt),
    Let(LetStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Foreach(ForeachStmt),
    Case(CaseStmt),
    CaseArm(CaseArm),
    Return(ReturnStmt),
    Exit(ExitStmt),
    Goto(GotoStmt),
    Label(LabelStmt),
    Prepare(PrepareStmt),
    Declare(DeclareStmt),
    CursorOp(CursorOpStmt),
    Sql(SqlStmt),
    Try(TryStmt),
    Dialog(DialogStmt),
    DialogBlock(DialogBlock),
    ReportCall(ReportCallStmt),
    Simple(SimpleStmt),

    // ========== Expressions ==========
    Literal(Literal),
    Variable(VariableRef),
    Member(MemberExpr),
    Index(IndexExpr),
    CallExpr(CallExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Postfix(PostfixExpr),
    Between(BetweenExpr),
    IsNull(IsNullExpr),
    In(InExpr),
    Grouped(GroupedExpr),
    Current(CurrentExpr),
    Star,
}

impl NodeKind {
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            NodeKind::TypeReference(_)
                | NodeKind::ArrayType(_)
                | NodeKind::RecordDefinition(_)
                | NodeKind::DictionaryDefinition(_)
                | NodeKind::FunctionType(_)
        )
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Literal(_)
                | NodeKind::Variable(_)
                | NodeKind::Member(_)
                | NodeKind::Index(_)
                | NodeKind::CallExpr(_)
                | NodeKind::Unary(_)
                | NodeKind::Binary(_)
                | NodeKind::Postfix(_)
                | NodeKind::Between(_)
                | NodeKind::IsNull(_)
                | NodeKind::In(_)
                | NodeKind::Grouped(_)
                | NodeKind::Current(_)
                | NodeKind::Star
        )
    }

    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::Define(_)
                | NodeKind::VariableGroup(_)
                | NodeKind::Constant(_)
                | NodeKind::ConstantItem(_)
                | NodeKind::TypeDecl(_)
                | NodeKind::TypeItem(_)
                | NodeKind::Parameter(_)
        )
    }

    /// Routines and other items that own a body of statements.
    pub fn is_routine(&self) -> bool {
        matches!(self, NodeKind::Main(_) | NodeKind::Function(_) | NodeKind::Report(_))
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Call(_)
                | NodeKind::Let(_)
                | NodeKind::If(_)
                | NodeKind::While(_)
                | NodeKind::For(_)
                | NodeKind::Foreach(_)
                | NodeKind::Case(_)
                | NodeKind::Return(_)
                | NodeKind::Exit(_)
                | NodeKind::Goto(_)
                | NodeKind::Label(_)
                | NodeKind::Prepare(_)
                | NodeKind::Declare(_)
                | NodeKind::CursorOp(_)
                | NodeKind::Sql(_)
                | NodeKind::Try(_)
                | NodeKind::Dialog(_)
                | NodeKind::ReportCall(_)
                | NodeKind::Simple(_)
        )
    }

    /// Every node id the payload refers to, in payload order.
    ///
    /// The parser adopts exactly these ids as children, which keeps payload references and the generic child
    /// list in sync.
    pub fn child_ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::Module(m) => out.extend(&m.items),
            NodeKind::Globals(g) => out.extend(&g.items),
            NodeKind::Main(m) => out.extend(&m.body),
            NodeKind::Function(f) => {
                out.extend(&f.params);
                if let Some(returns) = &f.returns {
                    out.extend(returns);
                }
                out.extend(&f.body);
            }
            NodeKind::Report(r) => {
                out.extend(&r.params);
                out.extend(&r.body);
                out.extend(&r.sections);
            }
            NodeKind::ReportSection(s) => {
                out.extend(&s.args);
                out.extend(&s.body);
            }
            NodeKind::Define(d) => out.extend(&d.groups),
            NodeKind::VariableGroup(g) => out.extend(g.type_ref),
            NodeKind::Constant(c) => out.extend(&c.items),
            NodeKind::ConstantItem(c) => {
                out.extend(c.type_ref);
                out.extend(c.value);
            }
            NodeKind::TypeDecl(t) => out.extend(&t.items),
            NodeKind::TypeItem(t) => out.extend(t.type_ref),
            NodeKind::Parameter(p) => out.extend(p.type_ref),
            NodeKind::TypeReference(t) => out.extend(t.composite),
            NodeKind::ArrayType(a) => out.extend(a.element),
            NodeKind::RecordDefinition(r) => out.extend(r.members.iter().filter_map(|m| m.type_ref)),
            NodeKind::DictionaryDefinition(d) => out.extend(d.value),
            NodeKind::FunctionType(f) => {
                out.extend(&f.params);
                out.extend(&f.returns);
            }
            NodeKind::Call(c) => {
                out.extend(c.call);
                out.extend(&c.returning);
            }
            NodeKind::Let(l) => {
                out.extend(&l.targets);
                out.extend(&l.values);
            }
            NodeKind::If(i) => {
                out.extend(i.condition);
                out.extend(&i.then_body);
                out.extend(&i.else_body);
            }
            NodeKind::While(w) => {
                out.extend(w.condition);
                out.extend(&w.body);
            }
            NodeKind::For(f) => {
                out.extend(f.variable);
                out.extend(f.start);
                out.extend(f.end);
                out.extend(f.step);
                out.extend(&f.body);
            }
            NodeKind::Foreach(f) => {
                out.extend(&f.using);
                out.extend(&f.into);
                out.extend(&f.body);
            }
            NodeKind::Case(c) => {
                out.extend(c.subject);
                out.extend(&c.arms);
            }
            NodeKind::CaseArm(a) => {
                out.extend(&a.values);
                out.extend(&a.body);
            }
            NodeKind::Return(r) => out.extend(&r.values),
            NodeKind::Exit(e) => out.extend(e.value),
            NodeKind::Prepare(p) => out.extend(p.source),
            NodeKind::Declare(d) => {
                if let CursorSource::Expr(id) = d.source {
                    out.push(id);
                }
            }
            NodeKind::CursorOp(c) => out.extend(&c.args),
            NodeKind::Try(t) => {
                out.extend(&t.body);
                out.extend(&t.catch_body);
            }
            NodeKind::Dialog(d) => {
                out.extend(&d.bindings);
                out.extend(&d.blocks);
            }
            NodeKind::DialogBlock(b) => out.extend(&b.body),
            NodeKind::ReportCall(r) => out.extend(&r.args),
            NodeKind::Simple(s) => out.extend(&s.args),
            NodeKind::Member(m) => out.push(m.object),
            NodeKind::Index(i) => {
                out.push(i.object);
                out.extend(&i.indices);
            }
            NodeKind::CallExpr(c) => {
                out.push(c.callee);
                out.extend(&c.args);
            }
            NodeKind::Unary(u) => out.push(u.operand),
            NodeKind::Binary(b) => {
                out.push(b.lhs);
                out.push(b.rhs);
            }
            NodeKind::Postfix(p) => {
                out.push(p.operand);
                out.extend(p.argument);
            }
            NodeKind::Between(b) => {
                out.push(b.operand);
                out.push(b.low);
                out.extend(b.high);
            }
            NodeKind::IsNull(i) => out.push(i.operand),
            NodeKind::In(i) => {
                out.push(i.operand);
                out.extend(&i.items);
            }
            NodeKind::Grouped(g) => out.push(g.inner),
            NodeKind::Import(_)
            | NodeKind::Schema(_)
            | NodeKind::GlobalsFile(_)
            | NodeKind::Include(_)
            | NodeKind::Directive(_)
            | NodeKind::Goto(_)
            | NodeKind::Label(_)
            | NodeKind::Sql(_)
            | NodeKind::Literal(_)
            | NodeKind::Variable(_)
            | NodeKind::Current(_)
            | NodeKind::Star => {}
        }
        out
    }

    /// Short human-readable description, used in outlines, hovers and tree dumps.
    pub fn describe(&self) -> &'static str {
        match self {
            NodeKind::Module(_) => "module",
            NodeKind::Import(_) => "IMPORT",
            NodeKind::Schema(_) => "SCHEMA",
            NodeKind::GlobalsFile(_) => "GLOBALS file",
            NodeKind::Globals(_) => "GLOBALS",
            NodeKind::Include(_) => "&include",
            NodeKind::Directive(_) => "directive",
            NodeKind::Main(_) => "MAIN",
            NodeKind::Function(_) => "FUNCTION",
            NodeKind::Report(_) => "REPORT",
            NodeKind::ReportSection(_) => "report section",
            NodeKind::Define(_) => "DEFINE",
            NodeKind::VariableGroup(_) => "variable",
            NodeKind::Constant(_) => "CONSTANT",
            NodeKind::ConstantItem(_) => "constant",
            NodeKind::TypeDecl(_) => "TYPE",
            NodeKind::TypeItem(_) => "type",
            NodeKind::Parameter(_) => "parameter",
            NodeKind::TypeReference(_) => "type reference",
            NodeKind::ArrayType(_) => "ARRAY",
            NodeKind::RecordDefinition(_) => "RECORD",
            NodeKind::DictionaryDefinition(_) => "DICTIONARY",
            NodeKind::FunctionType(_) => "function type",
            NodeKind::Call(_) => "CALL",
            NodeKind::Let(_) => "LET",
            NodeKind::If(_) => "IF",
            NodeKind::While(_) => "WHILE",
            NodeKind::For(_) => "FOR",
            NodeKind::Foreach(_) => "FOREACH",
            NodeKind::Case(_) => "CASE",
            NodeKind::CaseArm(_) => "WHEN",
            NodeKind::Return(_) => "RETURN",
            NodeKind::Exit(_) => "EXIT",
            NodeKind::Goto(_) => "GOTO",
            NodeKind::Label(_) => "LABEL",
            NodeKind::Prepare(_) => "PREPARE",
            NodeKind::Declare(_) => "DECLARE",
            NodeKind::CursorOp(_) => "cursor operation",
            NodeKind::Sql(_) => "SQL",
            NodeKind::Try(_) => "TRY",
            NodeKind::Dialog(_) => "dialog",
            NodeKind::DialogBlock(_) => "dialog block",
            NodeKind::ReportCall(_) => "report statement",
            NodeKind::Simple(_) => "statement",
            NodeKind::Literal(_) => "literal",
            NodeKind::Variable(_) => "variable reference",
            NodeKind::Member(_) => "member access",
            NodeKind::Index(_) => "index",
            NodeKind::CallExpr(_) => "call",
            NodeKind::Unary(_) => "unary expression",
            NodeKind::Binary(_) => "binary expression",
            NodeKind::Postfix(_) => "postfix expression",
            NodeKind::Between(_) => "BETWEEN",
            NodeKind::IsNull(_) => "IS NULL",
            NodeKind::In(_) => "IN",
            NodeKind::Grouped(_) => "parenthesized expression",
            NodeKind::Current(_) => "CURRENT",
            NodeKind::Star => "*",
        }
    }
}

// ============================================================================
// Module structure
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleNode {
    pub items: Vec<NodeId>,
}

/// Visibility of a module-level item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// No modifier: visible to the other modules of the program.
    #[default]
    Default,
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Fgl,
    Java,
    Package,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub kind: ImportKind,
    /// Dotted path as written (`util`, `com.example.Tools`).
    pub path: Name,
}

/// `SCHEMA db` or `DATABASE db` at module level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDecl {
    pub keyword: KeywordId,
    pub database: Option<Name>,
}

/// `GLOBALS "file"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalsFile {
    pub path: Spanned<String>,
}

/// `GLOBALS ... END GLOBALS`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlobalsBlock {
    pub items: Vec<NodeId>,
}

/// `&include "file"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub path: Spanned<String>,
}

/// Any other preprocessor line (`&define`, `&ifdef`, ...), kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveNode {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MainDef {
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: Option<Name>,
    pub visibility: Visibility,
    /// [`Parameter`] nodes.
    pub params: Vec<NodeId>,
    /// Type references from the `RETURNS` clause. `None` when the clause is absent.
    pub returns: Option<Vec<NodeId>>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDef {
    pub name: Option<Name>,
    pub visibility: Visibility,
    pub params: Vec<NodeId>,
    /// Declarations before the first section.
    pub body: Vec<NodeId>,
    pub sections: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSectionKind {
    Output,
    OrderBy,
    FirstPageHeader,
    PageHeader,
    PageTrailer,
    OnEveryRow,
    OnLastRow,
    BeforeGroupOf,
    AfterGroupOf,
    /// `FORMAT EVERY ROW`.
    EveryRow,
}

impl ReportSectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportSectionKind::Output => "OUTPUT",
            ReportSectionKind::OrderBy => "ORDER BY",
            ReportSectionKind::FirstPageHeader => "FIRST PAGE HEADER",
            ReportSectionKind::PageHeader => "PAGE HEADER",
            ReportSectionKind::PageTrailer => "PAGE TRAILER",
            ReportSectionKind::OnEveryRow => "ON EVERY ROW",
            ReportSectionKind::OnLastRow => "ON LAST ROW",
            ReportSectionKind::BeforeGroupOf => "BEFORE GROUP OF",
            ReportSectionKind::AfterGroupOf => "AFTER GROUP OF",
            ReportSectionKind::EveryRow => "FORMAT EVERY ROW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub kind: ReportSectionKind,
    /// Expressions attached to the header (`GROUP OF x`, `ORDER BY a, b`).
    pub args: Vec<NodeId>,
    pub body: Vec<NodeId>,
}

// ============================================================================
// Declarations
// ============================================================================

/// `DEFINE a, b INTEGER, c STRING`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineDecl {
    pub visibility: Visibility,
    /// [`VariableGroup`] nodes.
    pub groups: Vec<NodeId>,
}

/// Names sharing one type inside a `DEFINE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableGroup {
    pub names: Vec<Name>,
    pub type_ref: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantDecl {
    pub visibility: Visibility,
    pub items: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantItem {
    pub name: Name,
    pub type_ref: Option<NodeId>,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub visibility: Visibility,
    pub items: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeItem {
    pub name: Name,
    pub type_ref: Option<NodeId>,
}

/// A routine or function-type parameter, optionally typed inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: Name,
    pub type_ref: Option<NodeId>,
}

// ============================================================================
// Type references
// ============================================================================

/// `[db:]table.column` target of a `LIKE` declaration. `column` is `*` for a whole-table mimic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimicTarget {
    pub database: Option<Name>,
    pub table: Name,
    pub column: Name,
}

impl MimicTarget {
    pub fn is_whole_table(&self) -> bool {
        self.column.node == "*"
    }

    pub fn display(&self) -> String {
        match &self.database {
            Some(db) => format!("{}:{}.{}", db.node, self.table.node, self.column.node),
            None => format!("{}.{}", self.table.node, self.column.node),
        }
    }
}

/// A type use.
///
/// Either *composite* (exactly one child: array, record, dictionary or function type) or *scalar* (a name,
/// optional constraint text, optional mimic target). A scalar with a mimic target never has a composite child.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeReference {
    /// Type name as written (`INTEGER`, `customer_t`, `base.StringBuffer`).
    pub name: Option<Name>,
    /// Set when the name is a base type keyword.
    pub base: Option<BaseTypeId>,
    /// Constraint suffix, e.g. `(10,2)` or `YEAR TO SECOND`.
    pub constraint: Option<String>,
    pub mimic: Option<MimicTarget>,
    pub composite: Option<NodeId>,
}

impl TypeReference {
    pub fn is_composite(&self) -> bool {
        self.composite.is_some()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.node.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    /// `ARRAY [n[,m[,k]]] OF t`
    Static,
    /// `DYNAMIC ARRAY [WITH DIMENSION n] OF t`, or `ARRAY [] OF t`
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    pub kind: ArrayKind,
    /// Declared sizes of a static array; `0` where the size is a named constant.
    pub sizes: Vec<i64>,
    pub dimensions: u8,
    pub element: Option<NodeId>,
}

/// One `name type` pair of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMember {
    pub name: Name,
    /// `None` when the member's type is missing.
    pub type_ref: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordDefinition {
    pub members: Vec<RecordMember>,
    /// `RECORD LIKE table.*`: members come from the schema.
    pub mimic: Option<MimicTarget>,
}

impl RecordDefinition {
    /// Member lookup, ignoring case.
    pub fn member(&self, name: &str) -> Option<&RecordMember> {
        self.members.iter().find(|m| m.name.is(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryDefinition {
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub params: Vec<NodeId>,
    pub returns: Vec<NodeId>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStmt {
    /// The call expression.
    pub call: Option<NodeId>,
    pub returning: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetStmt {
    pub targets: Vec<NodeId>,
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub condition: Option<NodeId>,
    pub then_body: Vec<NodeId>,
    pub else_body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    pub condition: Option<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForStmt {
    pub variable: Option<NodeId>,
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
    pub step: Option<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeachStmt {
    pub cursor: Option<Name>,
    pub using: Vec<NodeId>,
    pub into: Vec<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseStmt {
    pub subject: Option<NodeId>,
    pub arms: Vec<NodeId>,
}

/// `WHEN v1, v2 body` or `OTHERWISE body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseArm {
    pub values: Vec<NodeId>,
    pub otherwise: bool,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Exit,
    Continue,
}

/// `EXIT FOR`, `CONTINUE WHILE`, `EXIT PROGRAM [code]`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitStmt {
    pub kind: ExitKind,
    pub target: Option<KeywordId>,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoStmt {
    pub label: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelStmt {
    pub name: Option<Name>,
}

/// `PREPARE stmt FROM expr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareStmt {
    pub statement: Option<Name>,
    pub source: Option<NodeId>,
}

/// Where a cursor's SQL comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorSource {
    /// `FOR stmt` naming a prepared statement.
    Prepared(Name),
    /// `FOR SELECT ...` inline.
    Sql(String),
    /// `FROM expr`.
    Expr(NodeId),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareStmt {
    pub cursor: Option<Name>,
    pub scroll: bool,
    pub hold: bool,
    pub source: CursorSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorOp {
    Execute,
    Open,
    Fetch,
    Close,
    Free,
}

/// `EXECUTE s USING ...`, `OPEN c`, `FETCH NEXT c INTO ...`, `CLOSE c`, `FREE s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorOpStmt {
    pub op: CursorOp,
    pub target: Option<Name>,
    /// `USING` / `INTO` expressions.
    pub args: Vec<NodeId>,
}

/// Embedded SQL kept as normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStmt {
    pub verb: KeywordId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryStmt {
    pub body: Vec<NodeId>,
    pub catch_body: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    DisplayArray,
    InputArray,
    Input,
    Construct,
    Menu,
    Prompt,
    Dialog,
    Subdialog,
}

impl DialogKind {
    /// Keyword that closes the dialog (`END INPUT`, `END MENU`, ...).
    pub fn end_keyword(self) -> KeywordId {
        match self {
            DialogKind::DisplayArray => KeywordId::Display,
            DialogKind::InputArray | DialogKind::Input => KeywordId::Input,
            DialogKind::Construct => KeywordId::Construct,
            DialogKind::Menu => KeywordId::Menu,
            DialogKind::Prompt => KeywordId::Prompt,
            DialogKind::Dialog => KeywordId::Dialog,
            DialogKind::Subdialog => KeywordId::Subdialog,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DialogKind::DisplayArray => "DISPLAY ARRAY",
            DialogKind::InputArray => "INPUT ARRAY",
            DialogKind::Input => "INPUT",
            DialogKind::Construct => "CONSTRUCT",
            DialogKind::Menu => "MENU",
            DialogKind::Prompt => "PROMPT",
            DialogKind::Dialog => "DIALOG",
            DialogKind::Subdialog => "SUBDIALOG",
        }
    }
}

/// An interactive statement with control blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogStmt {
    pub kind: DialogKind,
    /// Expressions of the dialog header: bound variables, titles, prompt text.
    pub bindings: Vec<NodeId>,
    /// [`DialogBlock`] nodes, sub-dialogs, and dialog-local declarations, in source order.
    pub blocks: Vec<NodeId>,
}

/// `ON ACTION accept ...`, `BEFORE FIELD f ...`, `COMMAND "Add" ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogBlock {
    pub trigger: KeywordId,
    /// Normalized trigger header, e.g. `ON ACTION accept`.
    pub header: String,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    Start,
    Output,
    Finish,
    Terminate,
}

/// `START REPORT r`, `OUTPUT TO REPORT r(args)`, `FINISH REPORT r`, `TERMINATE REPORT r`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCallStmt {
    pub action: ReportAction,
    pub report: Option<Name>,
    pub args: Vec<NodeId>,
}

/// Statements the front end does not model in detail; the expressions they mention are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleStmt {
    pub keyword: KeywordId,
    pub args: Vec<NodeId>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    /// Exact decimal text (`3.14`, `1e10`).
    Decimal(String),
    String(String),
    Null,
    True,
    False,
    Today,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    pub name: Name,
}

/// `object.member`, or `object.*` when `member` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberExpr {
    pub object: NodeId,
    pub member: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpr {
    pub object: NodeId,
    pub indices: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub callee: NodeId,
    pub args: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    /// `COLUMN n` in report/display contexts.
    Column,
    /// `ASCII n`.
    Ascii,
    /// `GROUP agg(...)` in report sections.
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,
    Matches,
    NotMatches,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Or => "OR",
            BinaryOp::And => "AND",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Like => "LIKE",
            BinaryOp::NotLike => "NOT LIKE",
            BinaryOp::Matches => "MATCHES",
            BinaryOp::NotMatches => "NOT MATCHES",
            BinaryOp::Concat => "||",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "MOD",
            BinaryOp::Pow => "**",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Clipped,
    Using,
    Units(KeywordId),
    Spaces,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostfixExpr {
    pub op: PostfixOp,
    pub operand: NodeId,
    /// Format expression of `USING`.
    pub argument: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetweenExpr {
    pub operand: NodeId,
    pub low: NodeId,
    /// Missing when the `AND high` part is malformed.
    pub high: Option<NodeId>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsNullExpr {
    pub operand: NodeId,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InExpr {
    pub operand: NodeId,
    pub items: Vec<NodeId>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedExpr {
    pub inner: NodeId,
}

/// `CURRENT [YEAR TO SECOND]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentExpr {
    pub qualifier: Option<String>,
}
