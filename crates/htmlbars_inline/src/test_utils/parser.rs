use swc_core::{
    common::{comments::SingleThreadedComments, sync::Lrc, FileName, SourceMap},
    ecma::ast::{EsVersion, Module},
};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};

pub fn parse_javascript_module(
    input: &str,
    es_config: EsSyntax,
) -> Result<(Module, Lrc<SourceMap>), swc_ecma_parser::error::Error> {
    parse_module(input, Syntax::Es(es_config))
}

pub fn parse_typescript_module(
    input: &str,
    ts_config: TsSyntax,
) -> Result<(Module, Lrc<SourceMap>), swc_ecma_parser::error::Error> {
    parse_module(input, Syntax::Typescript(ts_config))
}

fn parse_module(
    input: &str,
    syntax: Syntax,
) -> Result<(Module, Lrc<SourceMap>), swc_ecma_parser::error::Error> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        Lrc::new(FileName::Custom("test.js".to_owned())),
        input.to_owned(),
    );

    let comments = SingleThreadedComments::default();

    let lexer = Lexer::new(
        syntax,
        EsVersion::EsNext,
        StringInput::from(&*fm),
        Some(&comments),
    );

    let mut parser = Parser::new_from(lexer);

    parser.parse_module().map(|module| (module, cm))
}
