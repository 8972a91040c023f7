//! Coarse token categories.
//!
//! Every token kind produced by the tokenizer maps to exactly one [`TokenCategory`]. Categories are what
//! classification and completion consumers look at; the parser works with exact kinds.

/// Coarse classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Identifier,
    Keyword,
    NumericLiteral,
    StringLiteral,
    /// Separators and access markers: `,` `;` `:` `.`
    Delimiter,
    Operator,
    Comment,
    /// Blanks plus the layout markers (newline, indent, dedent).
    Whitespace,
    /// `(` `)` `[` `]`
    Grouping,
    /// Preprocessor directive lines (`&include ...`).
    Directive,
    EndOfStream,
    Error,
}

impl TokenCategory {
    /// Return `true` for categories the parser never looks at.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenCategory::Comment | TokenCategory::Whitespace)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenCategory::Identifier => "identifier",
            TokenCategory::Keyword => "keyword",
            TokenCategory::NumericLiteral => "number",
            TokenCategory::StringLiteral => "string",
            TokenCategory::Delimiter => "delimiter",
            TokenCategory::Operator => "operator",
            TokenCategory::Comment => "comment",
            TokenCategory::Whitespace => "whitespace",
            TokenCategory::Grouping => "grouping",
            TokenCategory::Directive => "directive",
            TokenCategory::EndOfStream => "eof",
            TokenCategory::Error => "error",
        }
    }
}
