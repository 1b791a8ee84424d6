use log::debug;
use smallvec::SmallVec;
use swc_core::{
    common::{sync::Lrc, SourceMap, SourceMapper, DUMMY_SP},
    ecma::ast::{Ident, ImportDecl, ImportSpecifier, Module, ModuleDecl, ModuleExportName, ModuleItem},
};

use crate::{
    compile::stringify,
    error::{TransformError, TransformErrorKind},
    structs::{ModuleBinding, TargetModule},
};

/// Collects the local bindings of the target modules and removes their imports.
///
/// An import of a target module is removed even if its binding is never used.
pub fn track_imports(
    module: &mut Module,
    targets: &[TargetModule],
    source_map: &SourceMap,
) -> Result<Vec<ModuleBinding>, TransformError> {
    let mut bindings: Vec<ModuleBinding> = Vec::new();
    let mut tracked_items: SmallVec<[usize; 1]> = SmallVec::new();

    for (idx, module_item) in module.body.iter().enumerate() {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import_decl)) = module_item else {
            continue;
        };

        let Some(target) = targets
            .iter()
            .find(|target| target.source == import_decl.src.value)
        else {
            continue;
        };

        let Some(local) = find_local(import_decl, target) else {
            return Err(TransformError::new(
                import_decl.span,
                TransformErrorKind::InvalidImportForm {
                    required: target.required_syntax(),
                    used: used_syntax(import_decl, source_map),
                },
            ));
        };

        let is_duplicate = bindings
            .iter()
            .any(|binding| binding.source == target.source || binding.local.sym == local.sym);
        if is_duplicate {
            return Err(TransformError::new(
                import_decl.span,
                TransformErrorKind::DuplicateImport {
                    source: target.source.to_owned(),
                    local: local.sym.to_owned(),
                },
            ));
        }

        debug!("`{}` is bound to '{}'", local.sym, target.source);

        bindings.push(ModuleBinding {
            source: target.source.to_owned(),
            local: local.to_owned(),
        });
        tracked_items.push(idx);
    }

    for idx in tracked_items.into_iter().rev() {
        module.body.remove(idx);
    }

    Ok(bindings)
}

/// Returns the local identifier if the import uses the only supported form
fn find_local<'i>(import_decl: &'i ImportDecl, target: &TargetModule) -> Option<&'i Ident> {
    if import_decl.type_only {
        return None;
    }

    // Exactly one specifier, `import hbs, { foo } from '...'` is not supported
    let [specifier] = import_decl.specifiers.as_slice() else {
        return None;
    };

    match specifier {
        // e.g. `import hbs from 'htmlbars-inline-precompile'`
        ImportSpecifier::Default(default_spec) if target.is_default_export() => {
            Some(&default_spec.local)
        }

        // e.g. `import { hbs } from 'ember-cli-htmlbars'`
        // or `import { hbs as compile } from 'ember-cli-htmlbars'`
        ImportSpecifier::Named(named_spec)
            if !target.is_default_export() && !named_spec.is_type_only =>
        {
            let imported_word = match named_spec.imported {
                Some(ModuleExportName::Ident(ref ident)) => &ident.sym,
                Some(ModuleExportName::Str(ref s)) => &s.value,
                None => &named_spec.local.sym,
            };

            (*imported_word == target.export).then_some(&named_spec.local)
        }

        _ => None,
    }
}

/// Source text of the import as the user wrote it, without the trailing semicolon
fn used_syntax(import_decl: &ImportDecl, source_map: &SourceMap) -> String {
    let snippet = source_map
        .span_to_snippet(import_decl.span)
        .ok()
        .filter(|snippet| !snippet.is_empty())
        .unwrap_or_else(|| {
            // Synthesized nodes have no source text, print them instead
            let cm: Lrc<SourceMap> = Default::default();
            let module = Module {
                span: DUMMY_SP,
                body: vec![ModuleItem::ModuleDecl(ModuleDecl::Import(import_decl.to_owned()))],
                shebang: None,
            };
            stringify(&module, &cm, false)
        });

    snippet.trim().trim_end_matches(';').trim_end().to_owned()
}
