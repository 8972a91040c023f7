//! Builtin function vocabulary.
//!
//! Functions the runtime provides without any source definition. The check pass consults this table before
//! asking the function provider, so calls such as `length(s)` never produce an "unknown function" warning.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-insensitive**.
//!
//! ## Examples
//! ```rust
//! use bdl_core::lang::builtins::{self, BuiltinFnId};
//!
//! assert_eq!(builtins::from_str("LENGTH"), Some(BuiltinFnId::Length));
//! assert_eq!(builtins::from_str("arr_count"), Some(BuiltinFnId::ArrCount));
//! assert_eq!(builtins::info_for(BuiltinFnId::Length).returns, 1);
//! ```

/// Stable identifier for a builtin function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFnId {
    Length,
    Upshift,
    Downshift,
    ArrCurr,
    ArrCount,
    ScrLine,
    SetCount,
    FglLastkey,
    FglKeyval,
    FglGetenv,
    Startlog,
    Errorlog,
    ErrGet,
    ShowHelp,
    Mdy,
    Weekday,
    Num2Str,
    Sfmt,
}

/// Metadata for a builtin function.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinFnInfo {
    pub id: BuiltinFnId,
    pub canonical: &'static str,
    pub params: &'static [&'static str],
    /// Number of values returned.
    pub returns: u8,
    pub description: &'static str,
}

use BuiltinFnId as F;

pub const BUILTIN_FUNCTIONS: &[BuiltinFnInfo] = &[
    info(F::Length, "length", &["s"], 1, "Length of a string without trailing blanks."),
    info(F::Upshift, "upshift", &["s"], 1, "Upper-case copy of a string."),
    info(F::Downshift, "downshift", &["s"], 1, "Lower-case copy of a string."),
    info(F::ArrCurr, "arr_curr", &[], 1, "Current row of the active array dialog."),
    info(F::ArrCount, "arr_count", &[], 1, "Number of rows in the active array dialog."),
    info(F::ScrLine, "scr_line", &[], 1, "Current screen line of the active array dialog."),
    info(F::SetCount, "set_count", &["n"], 0, "Set the row count of the next array dialog."),
    info(F::FglLastkey, "fgl_lastkey", &[], 1, "Code of the last key pressed."),
    info(F::FglKeyval, "fgl_keyval", &["name"], 1, "Code of a named key."),
    info(F::FglGetenv, "fgl_getenv", &["name"], 1, "Value of an environment variable."),
    info(F::Startlog, "startlog", &["file"], 0, "Start writing errors to a log file."),
    info(F::Errorlog, "errorlog", &["text"], 0, "Write a line to the error log."),
    info(F::ErrGet, "err_get", &["code"], 1, "Message text of an error code."),
    info(F::ShowHelp, "showhelp", &["number"], 0, "Display a help message."),
    info(F::Mdy, "mdy", &["month", "day", "year"], 1, "Build a DATE value."),
    info(F::Weekday, "weekday", &["date"], 1, "Day of the week of a DATE."),
    info(F::Num2Str, "num2str", &["n"], 1, "Format a number as text."),
    info(F::Sfmt, "sfmt", &["format", "args"], 1, "Substitute `%n` placeholders in a format string."),
];

pub fn as_str(id: BuiltinFnId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id`.
pub fn info_for(id: BuiltinFnId) -> &'static BuiltinFnInfo {
    BUILTIN_FUNCTIONS
        .iter()
        .find(|f| f.id == id)
        .expect("INVARIANT: builtin function info missing")
}

pub fn from_str(name: &str) -> Option<BuiltinFnId> {
    BUILTIN_FUNCTIONS
        .iter()
        .find(|f| f.canonical.eq_ignore_ascii_case(name))
        .map(|f| f.id)
}

const fn info(
    id: BuiltinFnId,
    canonical: &'static str,
    params: &'static [&'static str],
    returns: u8,
    description: &'static str,
) -> BuiltinFnInfo {
    BuiltinFnInfo {
        id,
        canonical,
        params,
        returns,
        description,
    }
}
