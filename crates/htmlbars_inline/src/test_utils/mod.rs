pub mod parser;

use swc_core::{
    common::{sync::Lrc, SourceMap},
    ecma::ast::Module,
};
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};

use crate::{error::TransformError, InlinePrecompile, TransformSummary};

use self::parser::parse_javascript_module;

/// Parses `input` as a JavaScript module
pub fn js(input: &str) -> (Module, Lrc<SourceMap>) {
    parse_javascript_module(input, Default::default()).expect("js expects the input to be parseable")
}

/// Parses `input`, transforms it and prints the resulting module
pub fn transform_js(
    transform: &InlinePrecompile,
    input: &str,
) -> Result<(String, TransformSummary), TransformError> {
    let (mut module, cm) = js(input);
    let summary = transform.transform_module(&mut module, &cm)?;
    Ok((to_str(&module, &cm), summary))
}

/// Precompiler which wraps the template into `precompiled(...)`
pub fn wrapping_precompiler() -> InlinePrecompile {
    InlinePrecompile::with_precompiler(|template: &str| format!("precompiled({})", template))
}

/// Prints a node using the source map it was parsed with
pub fn to_str(swc_node: &impl Node, cm: &Lrc<SourceMap>) -> String {
    // Emitting the result requires some setup with SWC
    let cm = cm.clone();
    let mut buff: Vec<u8> = Vec::with_capacity(128);
    let writer: JsWriter<&mut Vec<u8>> = JsWriter::new(cm.clone(), "\n", &mut buff, None);

    let mut emitter = Emitter {
        cfg: swc_ecma_codegen::Config::default(),
        comments: None,
        wr: writer,
        cm,
    };

    let _ = swc_node.emit_with(&mut emitter);

    String::from_utf8(buff).unwrap().trim().to_owned()
}
