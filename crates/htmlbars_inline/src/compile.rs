//! Parses source text, runs the transform and prints the module back

use std::fmt;

use swc_core::{
    common::{
        comments::{Comments, SingleThreadedComments},
        sync::Lrc,
        FileName, SourceMap, Span, Spanned,
    },
    ecma::ast::EsVersion,
};
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};
use swc_ecma_parser::{error::SyntaxError, lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::{error::TransformError, InlinePrecompile};

#[derive(Debug)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub filename: String,
    /// 1-based, 0 when the location is unknown
    pub line: usize,
    /// 1-based, 0 when the location is unknown
    pub column: usize,
}

#[derive(Debug)]
pub enum CompileErrorKind {
    /// The source is not a valid module
    Parse(SyntaxError),
    Transform(TransformError),
}

/// Transforms a module given as source text.
///
/// Returns the source untouched when it does not import any target module.
/// Comments are preserved, formatting is not.
pub fn transform_source(
    source: &str,
    filename: &str,
    transform: &InlinePrecompile,
) -> Result<String, CompileError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        Lrc::new(FileName::Custom(filename.to_owned())),
        source.to_owned(),
    );

    let comments = SingleThreadedComments::default();
    let lexer = Lexer::new(
        syntax_for(filename),
        EsVersion::EsNext,
        StringInput::from(&*fm),
        Some(&comments),
    );
    let mut parser = Parser::new_from(lexer);

    let parse_error = |e: swc_ecma_parser::error::Error| {
        let span = e.span();
        CompileError::new(CompileErrorKind::Parse(e.into_kind()), span, filename, &cm)
    };

    let mut module = parser.parse_module().map_err(parse_error)?;
    if let Some(e) = parser.take_errors().into_iter().next() {
        return Err(parse_error(e));
    }

    let summary = transform
        .transform_module(&mut module, &cm)
        .map_err(|e| {
            let span = e.span;
            CompileError::new(CompileErrorKind::Transform(e), span, filename, &cm)
        })?;

    if summary.is_noop() {
        return Ok(source.to_owned());
    }

    Ok(emit(&module, &cm, Some(&comments), false))
}

/// Prints a node without comments
pub fn stringify(item: &impl Node, cm: &Lrc<SourceMap>, minify: bool) -> String {
    emit(item, cm, None, minify)
}

fn emit(
    item: &impl Node,
    cm: &Lrc<SourceMap>,
    comments: Option<&dyn Comments>,
    minify: bool,
) -> String {
    // Emitting the result requires some setup with SWC
    let mut buff: Vec<u8> = Vec::new();
    let writer: JsWriter<&mut Vec<u8>> = JsWriter::new(cm.clone(), "\n", &mut buff, None);

    let mut emitter_cfg = swc_ecma_codegen::Config::default();
    emitter_cfg.minify = minify;

    let mut emitter = Emitter {
        cfg: emitter_cfg,
        comments,
        wr: writer,
        cm: cm.clone(),
    };

    let _ = item.emit_with(&mut emitter);

    String::from_utf8_lossy(&buff).into_owned()
}

fn syntax_for(filename: &str) -> Syntax {
    let extension = filename.rsplit_once('.').map_or("", |(_, ext)| ext);

    match extension {
        "ts" | "mts" | "cts" => Syntax::Typescript(TsSyntax::default()),
        "tsx" => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        "jsx" => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax::default()),
    }
}

impl CompileError {
    fn new(kind: CompileErrorKind, span: Span, filename: &str, cm: &SourceMap) -> CompileError {
        let (line, column) = if span.is_dummy() {
            (0, 0)
        } else {
            let loc = cm.lookup_char_pos(span.lo);
            (loc.line, loc.col.0 + 1)
        };

        CompileError {
            kind,
            filename: filename.to_owned(),
            line,
            column,
        }
    }

    pub fn message(&self) -> String {
        match self.kind {
            CompileErrorKind::Parse(ref e) => e.msg().into_owned(),
            CompileErrorKind::Transform(ref e) => e.to_string(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.filename,
            self.line,
            self.column,
            self.message()
        )
    }
}

impl std::error::Error for CompileError {}
