use swc_core::{
    common::Spanned,
    ecma::{
        ast::{
            AssignPatProp, BindingIdent, Callee, ClassDecl, ClassExpr, Expr, FnDecl, FnExpr, Ident,
            ImportSpecifier, Lit, Module, TsType, TsTypeElement, UpdateExpr,
        },
        visit::{Visit, VisitWith},
    },
};

use crate::{
    error::{TransformError, TransformErrorKind},
    structs::{ModuleBinding, UsageKind, UsageSite},
};

/// Matches a call or a tagged template whose callee (tag) is exactly the identifier of a binding.
/// Member access, optional chaining or any other indirection is not a usage site.
pub fn find_usage_site<'a>(expr: &'a Expr, bindings: &'a [ModuleBinding]) -> Option<UsageSite<'a>> {
    let (ident, kind) = match expr {
        Expr::TaggedTpl(tagged_tpl) => (
            tagged_tpl.tag.as_ident()?,
            UsageKind::TaggedTemplate(tagged_tpl),
        ),

        Expr::Call(call_expr) => {
            let Callee::Expr(ref callee) = call_expr.callee else {
                return None;
            };
            (callee.as_ident()?, UsageKind::Call(call_expr))
        }

        _ => return None,
    };

    let binding = bindings
        .iter()
        .find(|binding| binding.local.sym == ident.sym)?;

    Some(UsageSite { binding, kind })
}

/// Validates the shape of a usage site and returns the template string
pub fn extract_template(site: &UsageSite) -> Result<String, TransformError> {
    match site.kind {
        UsageKind::TaggedTemplate(tagged_tpl) => {
            if let Some(placeholder) = tagged_tpl.tpl.exprs.first() {
                return Err(TransformError::new(
                    placeholder.span(),
                    TransformErrorKind::UnsupportedPlaceholder,
                ));
            }

            let mut template = String::new();
            for quasi in tagged_tpl.tpl.quasis.iter() {
                // Invalid escapes have no cooked value
                template.push_str(quasi.cooked.as_deref().unwrap_or(&*quasi.raw));
            }

            Ok(template)
        }

        UsageKind::Call(call_expr) => {
            let callee = site.binding.local.sym.to_owned();

            // Spread arguments are never a single argument
            let [arg] = call_expr.args.as_slice() else {
                return Err(TransformError::new(
                    call_expr.span,
                    TransformErrorKind::InvalidCallArity { callee },
                ));
            };
            if arg.spread.is_some() {
                return Err(TransformError::new(
                    call_expr.span,
                    TransformErrorKind::InvalidCallArity { callee },
                ));
            }

            match *arg.expr {
                Expr::Lit(Lit::Str(ref s)) => Ok(s.value.to_string()),
                _ => Err(TransformError::new(
                    arg.expr.span(),
                    TransformErrorKind::InvalidCallArgumentType { callee },
                )),
            }
        }
    }
}

/// Fails if a tracked local name is declared again anywhere in the module.
/// Must run after the tracked imports were removed.
pub fn check_shadowing(module: &Module, bindings: &[ModuleBinding]) -> Result<(), TransformError> {
    if bindings.is_empty() {
        return Ok(());
    }

    let mut detector = ShadowDetector {
        bindings,
        error: None,
    };
    module.visit_with(&mut detector);

    match detector.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct ShadowDetector<'a> {
    bindings: &'a [ModuleBinding],
    error: Option<TransformError>,
}

impl ShadowDetector<'_> {
    fn check(&mut self, ident: &Ident) {
        if self.error.is_some() {
            return;
        }

        let Some(binding) = self
            .bindings
            .iter()
            .find(|binding| binding.local.sym == ident.sym)
        else {
            return;
        };

        self.error = Some(TransformError::new(
            ident.span,
            TransformErrorKind::ShadowedBinding {
                source: binding.source.to_owned(),
                local: ident.sym.to_owned(),
            },
        ));
    }
}

impl Visit for ShadowDetector<'_> {
    // Variables, parameters, catch clauses, destructuring and assignment targets
    fn visit_binding_ident(&mut self, n: &BindingIdent) {
        self.check(&n.id);
    }

    // `hbs++`
    fn visit_update_expr(&mut self, n: &UpdateExpr) {
        if let Expr::Ident(ref ident) = *n.arg {
            self.check(ident);
        }
        n.visit_children_with(self);
    }

    // Parameter names inside types do not bind values, e.g. `type F = (hbs: string) => void`
    fn visit_ts_type(&mut self, _: &TsType) {}

    fn visit_ts_type_element(&mut self, _: &TsTypeElement) {}

    // `const { hbs } = foo`
    fn visit_assign_pat_prop(&mut self, n: &AssignPatProp) {
        self.check(&n.key);
        n.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, n: &FnDecl) {
        self.check(&n.ident);
        n.visit_children_with(self);
    }

    fn visit_fn_expr(&mut self, n: &FnExpr) {
        if let Some(ref ident) = n.ident {
            self.check(ident);
        }
        n.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, n: &ClassDecl) {
        self.check(&n.ident);
        n.visit_children_with(self);
    }

    fn visit_class_expr(&mut self, n: &ClassExpr) {
        if let Some(ref ident) = n.ident {
            self.check(ident);
        }
        n.visit_children_with(self);
    }

    fn visit_import_specifier(&mut self, n: &ImportSpecifier) {
        let local = match n {
            ImportSpecifier::Named(named_spec) => &named_spec.local,
            ImportSpecifier::Default(default_spec) => &default_spec.local,
            ImportSpecifier::Namespace(ns_spec) => &ns_spec.local,
        };
        self.check(local);
    }
}

#[cfg(test)]
mod tests {
    use swc_core::ecma::ast::{ModuleItem, Stmt};

    use crate::{imports::track_imports, structs::TargetModule, test_utils::js};

    use super::*;

    fn tracked(input: &str) -> (Module, Vec<ModuleBinding>) {
        let (mut module, cm) = js(input);
        let bindings = track_imports(&mut module, &[TargetModule::default()], &cm).unwrap();
        (module, bindings)
    }

    /// Expression of the last statement
    fn last_expr(module: &Module) -> &Expr {
        match module.body.last() {
            Some(ModuleItem::Stmt(Stmt::Expr(expr_stmt))) => &expr_stmt.expr,
            _ => panic!("expected an expression statement"),
        }
    }

    fn extract(input: &str) -> Result<String, TransformError> {
        let (module, bindings) = tracked(input);
        let site = find_usage_site(last_expr(&module), &bindings).expect("usage site");
        extract_template(&site)
    }

    fn assert_call_error(input: &str) {
        let err = extract(input).unwrap_err();
        assert!(matches!(
            err.kind,
            TransformErrorKind::InvalidCallArity { .. }
                | TransformErrorKind::InvalidCallArgumentType { .. }
        ));
        assert_eq!(
            err.to_string(),
            "hbs should be invoked with a single argument: the template string"
        );
    }

    #[test]
    fn it_matches_tagged_templates_and_calls() {
        let (module, bindings) =
            tracked("import hbs from 'htmlbars-inline-precompile';\nhbs`hello`");
        let site = find_usage_site(last_expr(&module), &bindings).unwrap();
        assert!(matches!(site.kind, UsageKind::TaggedTemplate(_)));
        assert_eq!(&*site.binding.local.sym, "hbs");

        let (module, bindings) =
            tracked("import hbs from 'htmlbars-inline-precompile';\nhbs('hello')");
        let site = find_usage_site(last_expr(&module), &bindings).unwrap();
        assert!(matches!(site.kind, UsageKind::Call(_)));
    }

    #[test]
    fn it_ignores_other_callees() {
        for input in [
            "import hbs from 'htmlbars-inline-precompile';\nanotherTag`hello`",
            "import hbs from 'htmlbars-inline-precompile';\nfoo.hbs`hello`",
            "import hbs from 'htmlbars-inline-precompile';\nfoo['hbs']('hello')",
            "import hbs from 'htmlbars-inline-precompile';\nhbs?.('hello')",
            "import hbs from 'htmlbars-inline-precompile';\nnew hbs('hello')",
            "import hbs from 'htmlbars-inline-precompile';\n(0, hbs)('hello')",
        ] {
            let (module, bindings) = tracked(input);
            assert!(
                find_usage_site(last_expr(&module), &bindings).is_none(),
                "{}",
                input
            );
        }
    }

    #[test]
    fn it_matches_nothing_without_bindings() {
        let (module, bindings) = tracked("hbs`hello`");
        assert!(bindings.is_empty());
        assert!(find_usage_site(last_expr(&module), &bindings).is_none());
    }

    #[test]
    fn it_extracts_tagged_template() {
        assert_eq!(
            extract("import hbs from 'htmlbars-inline-precompile';\nhbs`<p>{{name}}</p>`").unwrap(),
            "<p>{{name}}</p>"
        );
        assert_eq!(
            extract("import hbs from 'htmlbars-inline-precompile';\nhbs`a\\nb`").unwrap(),
            "a\nb"
        );
    }

    #[test]
    fn it_rejects_placeholders() {
        let err = extract("import hbs from 'htmlbars-inline-precompile';\nhbs`string ${value}`")
            .unwrap_err();
        assert!(matches!(err.kind, TransformErrorKind::UnsupportedPlaceholder));
        assert!(err
            .to_string()
            .contains("placeholders inside a tagged template string are not supported"));
    }

    #[test]
    fn it_extracts_string_argument() {
        assert_eq!(
            extract("import hbs from 'htmlbars-inline-precompile';\nhbs('hello')").unwrap(),
            "hello"
        );
        assert_eq!(
            extract("import hbs from 'htmlbars-inline-precompile';\nhbs(\"it's\")").unwrap(),
            "it's"
        );
    }

    #[test]
    fn it_rejects_invalid_calls() {
        assert_call_error("import hbs from 'htmlbars-inline-precompile';\nhbs('first', 'second')");
        assert_call_error("import hbs from 'htmlbars-inline-precompile';\nhbs(123)");
        assert_call_error("import hbs from 'htmlbars-inline-precompile';\nhbs()");
        assert_call_error("import hbs from 'htmlbars-inline-precompile';\nhbs(`hello`)");
        assert_call_error("import hbs from 'htmlbars-inline-precompile';\nhbs(...args)");
    }

    #[test]
    fn it_uses_local_name_in_call_errors() {
        let err = extract("import tpl from 'htmlbars-inline-precompile';\ntpl()").unwrap_err();
        assert_eq!(
            err.to_string(),
            "tpl should be invoked with a single argument: the template string"
        );
    }

    #[test]
    fn it_detects_shadowing() {
        for input in [
            "import hbs from 'htmlbars-inline-precompile';\nfunction f(hbs) { return hbs`a`; }",
            "import hbs from 'htmlbars-inline-precompile';\n{ let hbs = 1; }",
            "import hbs from 'htmlbars-inline-precompile';\nfunction hbs() {}",
            "import hbs from 'htmlbars-inline-precompile';\nclass hbs {}",
            "import hbs from 'htmlbars-inline-precompile';\ntry {} catch (hbs) {}",
            "import hbs from 'htmlbars-inline-precompile';\nconst { hbs } = foo;",
            "import hbs from 'htmlbars-inline-precompile';\nhbs = other;",
            "import hbs from 'htmlbars-inline-precompile';\nconst f = (hbs) => hbs;",
            "import hbs from 'htmlbars-inline-precompile';\nhbs++;",
            "import hbs from 'htmlbars-inline-precompile';\n--hbs;",
            "import hbs from 'htmlbars-inline-precompile';\nhbs += 'a';",
        ] {
            let (module, bindings) = tracked(input);
            let err = check_shadowing(&module, &bindings).expect_err(input);
            assert!(matches!(err.kind, TransformErrorKind::ShadowedBinding { .. }));
        }
    }

    #[test]
    fn it_allows_unrelated_declarations() {
        let (module, bindings) = tracked(
            "import hbs from 'htmlbars-inline-precompile';\nconst other = { hbs };\nfunction f(a) { return a.hbs; }",
        );
        assert!(check_shadowing(&module, &bindings).is_ok());
    }
}
