//! Define the reserved keyword vocabulary for the BDL language.
//!
//! This module is the single source of truth for keywords: a stable identifier ([`KeywordId`]) plus a const
//! metadata table ([`KEYWORDS`]) that records canonical spellings, aliases, categories, and the language
//! version that introduced each word.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-insensitive** (`define`, `Define` and `DEFINE` are the same word).
//! - Most keywords are *soft*: the parser accepts them where an identifier is expected (record members named
//!   `date` or `type` are common). [`is_reserved`] lists the words that can never be identifiers.
//! - The spelling index is built once on first use and is read-only afterwards.
//!
//! ## Examples
//! ```rust
//! use bdl_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("foreach"), Some(KeywordId::Foreach));
//! assert_eq!(keywords::from_str("INT"), Some(KeywordId::Integer)); // alias
//! assert_eq!(keywords::as_str(KeywordId::Integer), "INTEGER");
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::version::LanguageVersion;

/// Stable identifier for every keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeywordId {
    // Control flow / statements
    If,
    Then,
    Else,
    End,
    While,
    For,
    Foreach,
    To,
    Step,
    Case,
    When,
    Otherwise,
    Continue,
    Exit,
    Return,
    Returns,
    Returning,
    Goto,
    Label,
    Call,
    Let,
    Sleep,
    Run,
    Try,
    Catch,
    Defer,
    Interrupt,
    Quit,
    Whenever,
    Stop,
    Program,
    Without,
    Waiting,

    // Definitions / declarations
    Main,
    Function,
    Report,
    Globals,
    Define,
    Constant,
    Type,
    Record,
    Array,
    Dynamic,
    Dictionary,
    Of,
    With,
    Dimension,
    Like,
    Public,
    Private,
    Import,
    Fgl,
    Java,
    Schema,
    Database,
    Attributes,

    // Base data types
    Char,
    Varchar,
    String,
    Integer,
    Smallint,
    Bigint,
    Tinyint,
    Float,
    Smallfloat,
    Decimal,
    Money,
    Date,
    Datetime,
    Interval,
    Byte,
    Text,
    Boolean,

    // Datetime / interval qualifiers
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Fraction,

    // Literals
    Null,
    True,
    False,
    Today,
    Current,
    Notfound,

    // Word operators
    And,
    Or,
    Not,
    Mod,
    Matches,
    Is,
    Between,
    In,
    Using,
    Clipped,
    Units,
    Spaces,
    Column,
    Ascii,
    Escape,
    Exists,
    Distinct,
    All,
    Any,
    As,

    // Interactive statements and dialog blocks
    Display,
    Input,
    Construct,
    Dialog,
    Menu,
    Command,
    Prompt,
    Message,
    Error,
    By,
    Name,
    From,
    Into,
    Defaults,
    Help,
    Before,
    After,
    On,
    Action,
    Idle,
    Field,
    Row,
    Key,
    Accept,
    Next,
    Subdialog,
    Open,
    Close,
    Window,
    Form,
    At,
    Clear,
    Options,
    Screen,
    Show,
    Hide,
    Cancel,
    Change,
    Timer,
    Infield,

    // SQL and cursors
    Prepare,
    Execute,
    Declare,
    Cursor,
    Scroll,
    Hold,
    Fetch,
    Free,
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Table,
    Temp,
    Where,
    Values,
    Set,
    Order,
    Group,
    Having,
    Begin,
    Work,
    Commit,
    Rollback,
    Sql,
    Lock,
    Unlock,
    Sqlerror,
    Warning,
    Sqlwarning,
    First,
    Last,
    Previous,
    Absolute,
    Relative,
    Immediate,

    // Report writer
    Start,
    Output,
    Finish,
    Terminate,
    Format,
    Every,
    Page,
    Header,
    Trailer,
    Line,
    Lines,
    Skip,
    Print,
    Need,
    Left,
    Right,
    Margin,
    Top,
    Bottom,
    Pipe,
    File,
    Printer,
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Percent,
    External,
    Pageno,
    Lineno,

    // Variable management
    Initialize,
    Locate,
    Validate,
    Memory,
}

/// High-level grouping for documentation and tooling.
///
/// ## Notes
/// - Categories are metadata only; they do not enforce parsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    ControlFlow,
    Definition,
    DataType,
    Qualifier,
    Literal,
    Operator,
    Interactive,
    Sql,
    Report,
    Storage,
}

/// Metadata for a keyword.
///
/// ## Notes
/// - `canonical` is the preferred (upper-case) spelling for docs and diagnostics.
/// - `aliases` are additional spellings accepted by the parser (`INT` for `INTEGER`).
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub category: KeywordCategory,
    pub since: LanguageVersion,
}

use KeywordCategory as C;
use KeywordId as K;

const BASE: LanguageVersion = LanguageVersion::BASE;

/// Registry of all keywords.
///
/// ## Notes
/// - The ordering is not semantically meaningful, but is grouped for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Control flow / statements
    info(K::If, "IF", &[], C::ControlFlow, BASE),
    info(K::Then, "THEN", &[], C::ControlFlow, BASE),
    info(K::Else, "ELSE", &[], C::ControlFlow, BASE),
    info(K::End, "END", &[], C::ControlFlow, BASE),
    info(K::While, "WHILE", &[], C::ControlFlow, BASE),
    info(K::For, "FOR", &[], C::ControlFlow, BASE),
    info(K::Foreach, "FOREACH", &[], C::ControlFlow, BASE),
    info(K::To, "TO", &[], C::ControlFlow, BASE),
    info(K::Step, "STEP", &[], C::ControlFlow, BASE),
    info(K::Case, "CASE", &[], C::ControlFlow, BASE),
    info(K::When, "WHEN", &[], C::ControlFlow, BASE),
    info(K::Otherwise, "OTHERWISE", &[], C::ControlFlow, BASE),
    info(K::Continue, "CONTINUE", &[], C::ControlFlow, BASE),
    info(K::Exit, "EXIT", &[], C::ControlFlow, BASE),
    info(K::Return, "RETURN", &[], C::ControlFlow, BASE),
    info(K::Returns, "RETURNS", &[], C::ControlFlow, LanguageVersion::MODULES),
    info(K::Returning, "RETURNING", &[], C::ControlFlow, BASE),
    info(K::Goto, "GOTO", &[], C::ControlFlow, BASE),
    info(K::Label, "LABEL", &[], C::ControlFlow, BASE),
    info(K::Call, "CALL", &[], C::ControlFlow, BASE),
    info(K::Let, "LET", &[], C::ControlFlow, BASE),
    info(K::Sleep, "SLEEP", &[], C::ControlFlow, BASE),
    info(K::Run, "RUN", &[], C::ControlFlow, BASE),
    info(K::Try, "TRY", &[], C::ControlFlow, LanguageVersion::DYNAMIC_ARRAYS),
    info(K::Catch, "CATCH", &[], C::ControlFlow, LanguageVersion::DYNAMIC_ARRAYS),
    info(K::Defer, "DEFER", &[], C::ControlFlow, BASE),
    info(K::Interrupt, "INTERRUPT", &[], C::ControlFlow, BASE),
    info(K::Quit, "QUIT", &[], C::ControlFlow, BASE),
    info(K::Whenever, "WHENEVER", &[], C::ControlFlow, BASE),
    info(K::Stop, "STOP", &[], C::ControlFlow, BASE),
    info(K::Program, "PROGRAM", &[], C::ControlFlow, BASE),
    info(K::Without, "WITHOUT", &[], C::ControlFlow, BASE),
    info(K::Waiting, "WAITING", &[], C::ControlFlow, BASE),
    // Definitions / declarations
    info(K::Main, "MAIN", &[], C::Definition, BASE),
    info(K::Function, "FUNCTION", &[], C::Definition, BASE),
    info(K::Report, "REPORT", &[], C::Definition, BASE),
    info(K::Globals, "GLOBALS", &[], C::Definition, BASE),
    info(K::Define, "DEFINE", &[], C::Definition, BASE),
    info(K::Constant, "CONSTANT", &[], C::Definition, BASE),
    info(K::Type, "TYPE", &[], C::Definition, BASE),
    info(K::Record, "RECORD", &[], C::Definition, BASE),
    info(K::Array, "ARRAY", &[], C::Definition, BASE),
    info(K::Dynamic, "DYNAMIC", &[], C::Definition, LanguageVersion::DYNAMIC_ARRAYS),
    info(K::Dictionary, "DICTIONARY", &[], C::Definition, LanguageVersion::DICTIONARY),
    info(K::Of, "OF", &[], C::Definition, BASE),
    info(K::With, "WITH", &[], C::Definition, BASE),
    info(K::Dimension, "DIMENSION", &[], C::Definition, LanguageVersion::DYNAMIC_ARRAYS),
    info(K::Like, "LIKE", &[], C::Definition, BASE),
    info(K::Public, "PUBLIC", &[], C::Definition, LanguageVersion::MODULES),
    info(K::Private, "PRIVATE", &[], C::Definition, LanguageVersion::MODULES),
    info(K::Import, "IMPORT", &[], C::Definition, LanguageVersion::MODULES),
    info(K::Fgl, "FGL", &[], C::Definition, LanguageVersion::MODULES),
    info(K::Java, "JAVA", &[], C::Definition, LanguageVersion::MODULES),
    info(K::Schema, "SCHEMA", &[], C::Definition, BASE),
    info(K::Database, "DATABASE", &[], C::Definition, BASE),
    info(K::Attributes, "ATTRIBUTES", &["ATTRIBUTE"], C::Definition, BASE),
    // Base data types
    info(K::Char, "CHAR", &["CHARACTER"], C::DataType, BASE),
    info(K::Varchar, "VARCHAR", &[], C::DataType, BASE),
    info(K::String, "STRING", &[], C::DataType, BASE),
    info(K::Integer, "INTEGER", &["INT"], C::DataType, BASE),
    info(K::Smallint, "SMALLINT", &[], C::DataType, BASE),
    info(K::Bigint, "BIGINT", &[], C::DataType, LanguageVersion::DYNAMIC_ARRAYS),
    info(K::Tinyint, "TINYINT", &[], C::DataType, LanguageVersion::FUNCTION_TYPES),
    info(K::Float, "FLOAT", &[], C::DataType, BASE),
    info(K::Smallfloat, "SMALLFLOAT", &["REAL"], C::DataType, BASE),
    info(K::Decimal, "DECIMAL", &["DEC", "NUMERIC"], C::DataType, BASE),
    info(K::Money, "MONEY", &[], C::DataType, BASE),
    info(K::Date, "DATE", &[], C::DataType, BASE),
    info(K::Datetime, "DATETIME", &[], C::DataType, BASE),
    info(K::Interval, "INTERVAL", &[], C::DataType, BASE),
    info(K::Byte, "BYTE", &[], C::DataType, BASE),
    info(K::Text, "TEXT", &[], C::DataType, BASE),
    info(K::Boolean, "BOOLEAN", &[], C::DataType, LanguageVersion::DYNAMIC_ARRAYS),
    // Qualifiers
    info(K::Year, "YEAR", &[], C::Qualifier, BASE),
    info(K::Month, "MONTH", &[], C::Qualifier, BASE),
    info(K::Day, "DAY", &[], C::Qualifier, BASE),
    info(K::Hour, "HOUR", &[], C::Qualifier, BASE),
    info(K::Minute, "MINUTE", &[], C::Qualifier, BASE),
    info(K::Second, "SECOND", &[], C::Qualifier, BASE),
    info(K::Fraction, "FRACTION", &[], C::Qualifier, BASE),
    // Literals
    info(K::Null, "NULL", &[], C::Literal, BASE),
    info(K::True, "TRUE", &[], C::Literal, BASE),
    info(K::False, "FALSE", &[], C::Literal, BASE),
    info(K::Today, "TODAY", &[], C::Literal, BASE),
    info(K::Current, "CURRENT", &[], C::Literal, BASE),
    info(K::Notfound, "NOTFOUND", &[], C::Literal, BASE),
    // Word operators
    info(K::And, "AND", &[], C::Operator, BASE),
    info(K::Or, "OR", &[], C::Operator, BASE),
    info(K::Not, "NOT", &[], C::Operator, BASE),
    info(K::Mod, "MOD", &[], C::Operator, BASE),
    info(K::Matches, "MATCHES", &[], C::Operator, BASE),
    info(K::Is, "IS", &[], C::Operator, BASE),
    info(K::Between, "BETWEEN", &[], C::Operator, BASE),
    info(K::In, "IN", &[], C::Operator, BASE),
    info(K::Using, "USING", &[], C::Operator, BASE),
    info(K::Clipped, "CLIPPED", &[], C::Operator, BASE),
    info(K::Units, "UNITS", &[], C::Operator, BASE),
    info(K::Spaces, "SPACES", &["SPACE"], C::Operator, BASE),
    info(K::Column, "COLUMN", &[], C::Operator, BASE),
    info(K::Ascii, "ASCII", &[], C::Operator, BASE),
    info(K::Escape, "ESCAPE", &[], C::Operator, BASE),
    info(K::Exists, "EXISTS", &[], C::Operator, BASE),
    info(K::Distinct, "DISTINCT", &[], C::Operator, BASE),
    info(K::All, "ALL", &[], C::Operator, BASE),
    info(K::Any, "ANY", &[], C::Operator, BASE),
    info(K::As, "AS", &[], C::Operator, BASE),
    // Interactive statements and dialog blocks
    info(K::Display, "DISPLAY", &[], C::Interactive, BASE),
    info(K::Input, "INPUT", &[], C::Interactive, BASE),
    info(K::Construct, "CONSTRUCT", &[], C::Interactive, BASE),
    info(K::Dialog, "DIALOG", &[], C::Interactive, LanguageVersion::DYNAMIC_ARRAYS),
    info(K::Menu, "MENU", &[], C::Interactive, BASE),
    info(K::Command, "COMMAND", &[], C::Interactive, BASE),
    info(K::Prompt, "PROMPT", &[], C::Interactive, BASE),
    info(K::Message, "MESSAGE", &[], C::Interactive, BASE),
    info(K::Error, "ERROR", &[], C::Interactive, BASE),
    info(K::By, "BY", &[], C::Interactive, BASE),
    info(K::Name, "NAME", &[], C::Interactive, BASE),
    info(K::From, "FROM", &[], C::Interactive, BASE),
    info(K::Into, "INTO", &[], C::Interactive, BASE),
    info(K::Defaults, "DEFAULTS", &[], C::Interactive, BASE),
    info(K::Help, "HELP", &[], C::Interactive, BASE),
    info(K::Before, "BEFORE", &[], C::Interactive, BASE),
    info(K::After, "AFTER", &[], C::Interactive, BASE),
    info(K::On, "ON", &[], C::Interactive, BASE),
    info(K::Action, "ACTION", &[], C::Interactive, BASE),
    info(K::Idle, "IDLE", &[], C::Interactive, BASE),
    info(K::Field, "FIELD", &[], C::Interactive, BASE),
    info(K::Row, "ROW", &[], C::Interactive, BASE),
    info(K::Key, "KEY", &[], C::Interactive, BASE),
    info(K::Accept, "ACCEPT", &[], C::Interactive, BASE),
    info(K::Next, "NEXT", &[], C::Interactive, BASE),
    info(K::Subdialog, "SUBDIALOG", &[], C::Interactive, LanguageVersion::DYNAMIC_ARRAYS),
    info(K::Open, "OPEN", &[], C::Interactive, BASE),
    info(K::Close, "CLOSE", &[], C::Interactive, BASE),
    info(K::Window, "WINDOW", &[], C::Interactive, BASE),
    info(K::Form, "FORM", &[], C::Interactive, BASE),
    info(K::At, "AT", &[], C::Interactive, BASE),
    info(K::Clear, "CLEAR", &[], C::Interactive, BASE),
    info(K::Options, "OPTIONS", &[], C::Interactive, BASE),
    info(K::Screen, "SCREEN", &[], C::Interactive, BASE),
    info(K::Show, "SHOW", &[], C::Interactive, BASE),
    info(K::Hide, "HIDE", &[], C::Interactive, BASE),
    info(K::Cancel, "CANCEL", &[], C::Interactive, BASE),
    info(K::Change, "CHANGE", &[], C::Interactive, BASE),
    info(K::Timer, "TIMER", &[], C::Interactive, LanguageVersion::FUNCTION_TYPES),
    info(K::Infield, "INFIELD", &[], C::Interactive, BASE),
    // SQL and cursors
    info(K::Prepare, "PREPARE", &[], C::Sql, BASE),
    info(K::Execute, "EXECUTE", &[], C::Sql, BASE),
    info(K::Declare, "DECLARE", &[], C::Sql, BASE),
    info(K::Cursor, "CURSOR", &[], C::Sql, BASE),
    info(K::Scroll, "SCROLL", &[], C::Sql, BASE),
    info(K::Hold, "HOLD", &[], C::Sql, BASE),
    info(K::Fetch, "FETCH", &[], C::Sql, BASE),
    info(K::Free, "FREE", &[], C::Sql, BASE),
    info(K::Select, "SELECT", &[], C::Sql, BASE),
    info(K::Insert, "INSERT", &[], C::Sql, BASE),
    info(K::Update, "UPDATE", &[], C::Sql, BASE),
    info(K::Delete, "DELETE", &[], C::Sql, BASE),
    info(K::Create, "CREATE", &[], C::Sql, BASE),
    info(K::Drop, "DROP", &[], C::Sql, BASE),
    info(K::Table, "TABLE", &[], C::Sql, BASE),
    info(K::Temp, "TEMP", &[], C::Sql, BASE),
    info(K::Where, "WHERE", &[], C::Sql, BASE),
    info(K::Values, "VALUES", &[], C::Sql, BASE),
    info(K::Set, "SET", &[], C::Sql, BASE),
    info(K::Order, "ORDER", &[], C::Sql, BASE),
    info(K::Group, "GROUP", &[], C::Sql, BASE),
    info(K::Having, "HAVING", &[], C::Sql, BASE),
    info(K::Begin, "BEGIN", &[], C::Sql, BASE),
    info(K::Work, "WORK", &[], C::Sql, BASE),
    info(K::Commit, "COMMIT", &[], C::Sql, BASE),
    info(K::Rollback, "ROLLBACK", &[], C::Sql, BASE),
    info(K::Sql, "SQL", &[], C::Sql, BASE),
    info(K::Lock, "LOCK", &[], C::Sql, BASE),
    info(K::Unlock, "UNLOCK", &[], C::Sql, BASE),
    info(K::Sqlerror, "SQLERROR", &[], C::Sql, BASE),
    info(K::Warning, "WARNING", &[], C::Sql, BASE),
    info(K::Sqlwarning, "SQLWARNING", &[], C::Sql, BASE),
    info(K::First, "FIRST", &[], C::Sql, BASE),
    info(K::Last, "LAST", &[], C::Sql, BASE),
    info(K::Previous, "PREVIOUS", &["PRIOR"], C::Sql, BASE),
    info(K::Absolute, "ABSOLUTE", &[], C::Sql, BASE),
    info(K::Relative, "RELATIVE", &[], C::Sql, BASE),
    info(K::Immediate, "IMMEDIATE", &[], C::Sql, BASE),
    // Report writer
    info(K::Start, "START", &[], C::Report, BASE),
    info(K::Output, "OUTPUT", &[], C::Report, BASE),
    info(K::Finish, "FINISH", &[], C::Report, BASE),
    info(K::Terminate, "TERMINATE", &[], C::Report, BASE),
    info(K::Format, "FORMAT", &[], C::Report, BASE),
    info(K::Every, "EVERY", &[], C::Report, BASE),
    info(K::Page, "PAGE", &[], C::Report, BASE),
    info(K::Header, "HEADER", &[], C::Report, BASE),
    info(K::Trailer, "TRAILER", &[], C::Report, BASE),
    info(K::Line, "LINE", &[], C::Report, BASE),
    info(K::Lines, "LINES", &[], C::Report, BASE),
    info(K::Skip, "SKIP", &[], C::Report, BASE),
    info(K::Print, "PRINT", &[], C::Report, BASE),
    info(K::Need, "NEED", &[], C::Report, BASE),
    info(K::Left, "LEFT", &[], C::Report, BASE),
    info(K::Right, "RIGHT", &[], C::Report, BASE),
    info(K::Margin, "MARGIN", &[], C::Report, BASE),
    info(K::Top, "TOP", &[], C::Report, BASE),
    info(K::Bottom, "BOTTOM", &[], C::Report, BASE),
    info(K::Pipe, "PIPE", &[], C::Report, BASE),
    info(K::File, "FILE", &[], C::Report, BASE),
    info(K::Printer, "PRINTER", &[], C::Report, BASE),
    info(K::Count, "COUNT", &[], C::Report, BASE),
    info(K::Sum, "SUM", &[], C::Report, BASE),
    info(K::Avg, "AVG", &[], C::Report, BASE),
    info(K::Min, "MIN", &[], C::Report, BASE),
    info(K::Max, "MAX", &[], C::Report, BASE),
    info(K::Percent, "PERCENT", &[], C::Report, BASE),
    info(K::External, "EXTERNAL", &[], C::Report, BASE),
    info(K::Pageno, "PAGENO", &[], C::Report, BASE),
    info(K::Lineno, "LINENO", &[], C::Report, BASE),
    // Variable management
    info(K::Initialize, "INITIALIZE", &[], C::Storage, BASE),
    info(K::Locate, "LOCATE", &[], C::Storage, BASE),
    info(K::Validate, "VALIDATE", &[], C::Storage, BASE),
    info(K::Memory, "MEMORY", &[], C::Storage, BASE),
];

/// Upper-case spelling (canonical and aliases) → id. Built once, never mutated.
static SPELLING_INDEX: Lazy<HashMap<&'static str, KeywordId>> = Lazy::new(|| {
    let mut index = HashMap::with_capacity(KEYWORDS.len() + 16);
    for info in KEYWORDS {
        index.insert(info.canonical, info.id);
        for &alias in info.aliases {
            index.insert(alias, info.id);
        }
    }
    index
});

/// Canonical spelling.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Accepted alias spellings.
pub fn aliases(id: KeywordId) -> &'static [&'static str] {
    info_for(id).aliases
}

pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Language version that introduced the keyword.
pub fn since(id: KeywordId) -> LanguageVersion {
    info_for(id).since
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (a registry bug, covered by the guardrail tests).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("INVARIANT: keyword info missing")
}

/// Lookup by spelling (canonical or alias), ignoring ASCII case.
///
/// ## Returns
/// - `Some(KeywordId)` if the spelling is a keyword, `None` otherwise.
pub fn from_str(s: &str) -> Option<KeywordId> {
    // Longest keyword is 10 characters; anything longer is an identifier.
    if s.len() > 12 || !s.is_ascii() {
        return None;
    }
    let mut buf = [0u8; 12];
    let upper = &mut buf[..s.len()];
    upper.copy_from_slice(s.as_bytes());
    upper.make_ascii_uppercase();
    let upper = std::str::from_utf8(upper).ok()?;
    SPELLING_INDEX.get(upper).copied()
}

/// Keywords that can never be used as identifiers.
pub fn is_reserved(id: KeywordId) -> bool {
    matches!(
        id,
        K::If
            | K::Then
            | K::Else
            | K::End
            | K::While
            | K::For
            | K::Foreach
            | K::Case
            | K::When
            | K::Otherwise
            | K::Return
            | K::Call
            | K::Let
            | K::Main
            | K::Function
            | K::Report
            | K::Globals
            | K::Define
            | K::Record
            | K::Like
            | K::And
            | K::Or
            | K::Not
            | K::Null
            | K::Try
            | K::Catch
    )
}

/// Keywords that begin a statement inside a function, report or `MAIN` body.
pub fn starts_statement(id: KeywordId) -> bool {
    matches!(
        id,
        K::Call
            | K::Let
            | K::If
            | K::While
            | K::For
            | K::Foreach
            | K::Case
            | K::Continue
            | K::Exit
            | K::Return
            | K::Goto
            | K::Label
            | K::Sleep
            | K::Display
            | K::Message
            | K::Error
            | K::Prompt
            | K::Input
            | K::Construct
            | K::Dialog
            | K::Menu
            | K::Prepare
            | K::Execute
            | K::Declare
            | K::Open
            | K::Fetch
            | K::Close
            | K::Free
            | K::Initialize
            | K::Locate
            | K::Validate
            | K::Whenever
            | K::Start
            | K::Output
            | K::Finish
            | K::Terminate
            | K::Run
            | K::Defer
            | K::Options
            | K::Clear
            | K::Current
            | K::Begin
            | K::Commit
            | K::Rollback
            | K::Try
            | K::Select
            | K::Insert
            | K::Update
            | K::Delete
            | K::Create
            | K::Drop
            | K::Define
            | K::Constant
            | K::Type
            | K::Sql
            | K::Database
            | K::Print
            | K::Skip
            | K::Need
            | K::Accept
            | K::Next
            | K::Lock
            | K::Unlock
    )
}

/// Keywords that begin a module-level item. A block body never consumes these.
pub fn starts_module_item(id: KeywordId) -> bool {
    matches!(
        id,
        K::Main | K::Function | K::Report | K::Globals | K::Public | K::Private | K::Import | K::Schema
    )
}

/// Keywords that, found first on a line inside an unterminated `(` or `[`, make the tokenizer abandon the
/// grouping and replay the suppressed newline.
///
/// This is narrower than [`starts_statement`]: words that commonly continue an expression or a sub-query
/// across lines (`SELECT`, `CURRENT`, `PRINT`, ...) are left out.
pub fn recovers_grouping(id: KeywordId) -> bool {
    matches!(
        id,
        K::Define
            | K::Let
            | K::Call
            | K::If
            | K::Else
            | K::While
            | K::For
            | K::Foreach
            | K::Case
            | K::Return
            | K::End
            | K::Main
            | K::Function
            | K::Report
            | K::Globals
            | K::Display
            | K::Input
            | K::Construct
            | K::Dialog
            | K::Menu
            | K::Prepare
            | K::Execute
            | K::Declare
            | K::Open
            | K::Fetch
            | K::Close
            | K::Free
            | K::Initialize
            | K::Message
            | K::Prompt
            | K::Try
            | K::Constant
            | K::Type
            | K::Import
            | K::Schema
            | K::Public
            | K::Private
    )
}

const fn info(
    id: KeywordId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    category: KeywordCategory,
    since: LanguageVersion,
) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        aliases,
        category,
        since,
    }
}
