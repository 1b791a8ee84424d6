//! Precompiles inline HTMLBars templates of ECMAScript modules.
//!
//! ```js
//! import hbs from 'htmlbars-inline-precompile';
//! let a = hbs`<p>{{name}}</p>`;
//! let b = hbs('<p>{{name}}</p>');
//! ```
//! becomes
//! ```js
//! let a = Ember.HTMLBars.template(/* precompiled template */);
//! let b = Ember.HTMLBars.template(/* precompiled template */);
//! ```
//!
//! The precompiler itself is supplied by the caller:
//! ```
//! use htmlbars_inline::{transform_source, InlinePrecompile};
//!
//! let transform = InlinePrecompile::with_precompiler(|t: &str| format!("precompiled({t})"));
//! let code = transform_source(
//!     "import hbs from 'htmlbars-inline-precompile';\nvar compiled = hbs`hello`;",
//!     "component.js",
//!     &transform,
//! )
//! .unwrap();
//!
//! assert_eq!(code.trim(), "var compiled = Ember.HTMLBars.template(precompiled(hello));");
//! ```

use log::debug;
use swc_core::{
    common::SourceMap,
    ecma::{ast::Module, visit::VisitMutWith},
};

#[macro_use]
extern crate lazy_static;

pub mod atoms;
pub mod cache;
pub mod compile;
pub mod error;
pub mod imports;
pub mod rewrite;
pub mod structs;
pub mod usage;

#[cfg(test)]
mod test_utils;

pub use cache::base_dir;
pub use compile::{transform_source, CompileError, CompileErrorKind};
pub use error::{ConfigError, PrecompileError, TransformError, TransformErrorKind};
pub use structs::*;

use imports::track_imports;
use rewrite::TemplateRewriter;
use usage::check_shadowing;

/// The transform, configured once and applied to any number of modules
pub struct InlinePrecompile {
    precompiler: Box<dyn Precompile>,
    targets: Vec<TargetModule>,
}

impl InlinePrecompile {
    /// Validates the options. A missing precompiler is reported here, not per file
    pub fn new(options: InlinePrecompileOptions) -> Result<InlinePrecompile, ConfigError> {
        let precompiler = options.precompile.ok_or(ConfigError::MissingPrecompiler)?;
        let targets = options.config.targets()?;

        Ok(InlinePrecompile {
            precompiler,
            targets,
        })
    }

    /// Transform for the default `htmlbars-inline-precompile` module
    pub fn with_precompiler(precompile: impl Precompile + 'static) -> InlinePrecompile {
        InlinePrecompile {
            precompiler: Box::new(precompile),
            targets: vec![TargetModule::default()],
        }
    }

    pub fn targets(&self) -> &[TargetModule] {
        &self.targets
    }

    /// Removes the imports of target modules and rewrites their usages.
    ///
    /// `source_map` is used to quote the offending source in error messages.
    /// The module is left in an unspecified state when an error is returned.
    pub fn transform_module(
        &self,
        module: &mut Module,
        source_map: &SourceMap,
    ) -> Result<TransformSummary, TransformError> {
        let bindings = track_imports(module, &self.targets, source_map)?;
        if bindings.is_empty() {
            return Ok(TransformSummary::default());
        }

        check_shadowing(module, &bindings)?;

        let mut rewriter = TemplateRewriter::new(&bindings, self.precompiler.as_ref());
        module.visit_mut_with(&mut rewriter);

        if let Some(e) = rewriter.error {
            return Err(e);
        }

        debug!(
            "removed {} import(s), rewrote {} template(s)",
            bindings.len(),
            rewriter.rewritten_sites
        );

        Ok(TransformSummary {
            removed_imports: bindings.len(),
            rewritten_sites: rewriter.rewritten_sites,
        })
    }
}
