use log::trace;
use swc_core::{
    common::{sync::Lrc, FileName, SourceMap, Span, Spanned, SyntaxContext, DUMMY_SP},
    ecma::{
        ast::{
            CallExpr, Callee, EsVersion, Expr, ExprOrSpread, Ident, IdentName, MemberExpr,
            MemberProp, ParenExpr,
        },
        visit::{VisitMut, VisitMutWith},
    },
};
use swc_ecma_parser::{error::SyntaxError, lexer::Lexer, Parser, StringInput, Syntax};

use crate::{
    atoms::{EMBER, HTMLBARS, TEMPLATE},
    error::{TransformError, TransformErrorKind},
    structs::{ModuleBinding, Precompile, Precompiled, UsageSite},
    usage::{extract_template, find_usage_site},
};

/// Replaces every usage site of the bindings with `Ember.HTMLBars.template(...)`.
///
/// Traversal stops at the first error, which is then stored in `error`.
pub struct TemplateRewriter<'a> {
    bindings: &'a [ModuleBinding],
    precompiler: &'a dyn Precompile,
    pub rewritten_sites: usize,
    pub error: Option<TransformError>,
}

impl<'a> TemplateRewriter<'a> {
    pub fn new(bindings: &'a [ModuleBinding], precompiler: &'a dyn Precompile) -> Self {
        TemplateRewriter {
            bindings,
            precompiler,
            rewritten_sites: 0,
            error: None,
        }
    }

    fn rewrite(&self, site: &UsageSite) -> Result<Expr, TransformError> {
        let span = site.span();
        let template = extract_template(site)?;
        let precompiled = precompile_template(self.precompiler, &template, span)?;

        trace!("precompiled a `{}` template", site.binding.local.sym);

        Ok(build_template_call(precompiled, span))
    }
}

impl VisitMut for TemplateRewriter<'_> {
    fn visit_mut_expr(&mut self, n: &mut Expr) {
        if self.error.is_some() {
            return;
        }

        let replacement = match find_usage_site(n, self.bindings) {
            Some(site) => self.rewrite(&site),
            None => {
                n.visit_mut_children_with(self);
                return;
            }
        };

        match replacement {
            Ok(expr) => {
                *n = expr;
                self.rewritten_sites += 1;
            }
            Err(e) => self.error = Some(e),
        }
    }
}

/// Invokes the precompiler and turns its output into an expression
pub fn precompile_template(
    precompiler: &dyn Precompile,
    template: &str,
    span: Span,
) -> Result<Box<Expr>, TransformError> {
    let precompiled = precompiler
        .precompile(template)
        .map_err(|e| TransformError::new(span, e.into()))?;

    match precompiled {
        Precompiled::Expr(expr) => Ok(expr),
        Precompiled::Code(code) => parse_precompiled(&code).map_err(|error| {
            TransformError::new(
                span,
                TransformErrorKind::InvalidPrecompileOutput {
                    output: code,
                    error,
                },
            )
        }),
    }
}

/// Parses the code returned by the precompiler as a single expression
fn parse_precompiled(code: &str) -> Result<Box<Expr>, SyntaxError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(Lrc::new(FileName::Anon), format!("({}\n)", code));

    let lexer = Lexer::new(
        Syntax::Es(Default::default()),
        EsVersion::EsNext,
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    let mut expr = parser.parse_expr().map_err(|e| e.into_kind())?;
    if let Some(e) = parser.take_errors().into_iter().next() {
        return Err(e.into_kind());
    }

    // The wrapping parentheses must be the whole input. Code closing them early,
    // e.g. `a); (b` or `a), (b`, has something after its expression
    if !expr.is_paren() || expr.span().hi != fm.end_pos {
        return Err(SyntaxError::Unexpected {
            got: ")".to_owned(),
            expected: "a single expression",
        });
    }

    // Spans of a separate source map mean nothing in the host file
    expr.visit_mut_with(&mut SpanEraser);

    Ok(match *expr {
        // A sequence must stay parenthesized to remain a single argument
        Expr::Paren(ParenExpr { expr: inner, .. }) if !inner.is_seq() => inner,
        other => Box::new(other),
    })
}

struct SpanEraser;

impl VisitMut for SpanEraser {
    fn visit_mut_span(&mut self, span: &mut Span) {
        *span = DUMMY_SP;
    }
}

/// Creates `Ember.HTMLBars.template(precompiled)`
pub fn build_template_call(precompiled: Box<Expr>, span: Span) -> Expr {
    let ember_htmlbars = Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(Expr::Ident(Ident::new(
            EMBER.to_owned(),
            DUMMY_SP,
            SyntaxContext::empty(),
        ))),
        prop: MemberProp::Ident(IdentName::new(HTMLBARS.to_owned(), DUMMY_SP)),
    });

    let template_fn = Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(ember_htmlbars),
        prop: MemberProp::Ident(IdentName::new(TEMPLATE.to_owned(), DUMMY_SP)),
    });

    Expr::Call(CallExpr {
        span,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(template_fn)),
        args: vec![ExprOrSpread {
            spread: None,
            expr: precompiled,
        }],
        type_args: None,
    })
}
