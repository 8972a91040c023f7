/// Parse BDL source text into a [`SyntaxTree`].
///
/// This is the main public entrypoint for parsing. It never fails: every problem is reported to `sink` and the
/// returned tree covers the whole input.
///
/// ## Parameters
/// - `source`: Source text of one module (or a fragment of one, see [`ParseOptions::start`]).
/// - `options`: Language version, starting location and tokenizer settings.
/// - `sink`: Receives diagnostics in source order.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn parse(source: &str, options: &ParseOptions, sink: &mut dyn DiagnosticSink) -> SyntaxTree {
    Parser::new(source.as_bytes(), *options).parse(sink)
}

/// Parse from any byte reader. Tokens are pulled lazily, so the input is never held in memory twice.
///
/// An I/O error ends the input early; what was read so far is parsed normally.
#[tracing::instrument(skip_all)]
pub fn parse_reader<R: Read>(reader: R, options: &ParseOptions, sink: &mut dyn DiagnosticSink) -> SyntaxTree {
    Parser::new(reader, *options).parse(sink)
}
