//! Exports data structs used by the crate

use fxhash::FxHashMap;
use serde::Deserialize;
use swc_core::{
    common::Span,
    ecma::{
        ast::{CallExpr, Expr, Ident, TaggedTpl},
        atoms::Atom,
    },
};

use crate::{
    atoms::{DEFAULT, HTMLBARS_INLINE_PRECOMPILE},
    error::{ConfigError, PrecompileError},
};

/// Turns the raw template string into a precompiled template.
///
/// Any `Fn(&str) -> String` closure is a precompiler which returns expression code:
/// ```
/// use htmlbars_inline::InlinePrecompile;
///
/// let transform = InlinePrecompile::with_precompiler(|t: &str| format!("precompiled({t})"));
/// ```
pub trait Precompile {
    fn precompile(&self, template: &str) -> Result<Precompiled, PrecompileError>;
}

impl<F> Precompile for F
where
    F: Fn(&str) -> String,
{
    fn precompile(&self, template: &str) -> Result<Precompiled, PrecompileError> {
        Ok(Precompiled::Code(self(template)))
    }
}

/// What a [`Precompile`] implementation produced
#[derive(Debug, Clone, PartialEq)]
pub enum Precompiled {
    /// Source code of an expression. It is spliced as code, not as a string literal
    Code(String),
    /// A ready-made expression
    Expr(Box<Expr>),
}

impl From<String> for Precompiled {
    fn from(value: String) -> Self {
        Precompiled::Code(value)
    }
}

impl From<Box<Expr>> for Precompiled {
    fn from(value: Box<Expr>) -> Self {
        Precompiled::Expr(value)
    }
}

/// Options of [`crate::InlinePrecompile`]
#[derive(Default)]
pub struct InlinePrecompileOptions {
    /// Required. Absence is reported by [`crate::InlinePrecompile::new`]
    pub precompile: Option<Box<dyn Precompile>>,
    pub config: InlinePrecompileConfig,
}

/// The serializable part of [`InlinePrecompileOptions`]
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinePrecompileConfig {
    /// Replaces the default `htmlbars-inline-precompile` target when present
    #[serde(default)]
    pub modules: Option<FxHashMap<String, ModuleConfig>>,
}

/// Which export of a module is the template tag.
/// Deserializes from either `{ "export": "hbs" }` or just `"hbs"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ModuleConfigRepr")]
pub struct ModuleConfig {
    pub export: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModuleConfigRepr {
    Shorthand(String),
    Full { export: String },
}

impl From<ModuleConfigRepr> for ModuleConfig {
    fn from(value: ModuleConfigRepr) -> Self {
        match value {
            ModuleConfigRepr::Shorthand(export) | ModuleConfigRepr::Full { export } => {
                ModuleConfig { export }
            }
        }
    }
}

impl InlinePrecompileConfig {
    pub fn from_json(json: &str) -> Result<InlinePrecompileConfig, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolves the configured modules into targets ordered by module name
    pub fn targets(&self) -> Result<Vec<TargetModule>, ConfigError> {
        let Some(ref modules) = self.modules else {
            return Ok(vec![TargetModule::default()]);
        };

        let mut targets = modules
            .iter()
            .map(|(module, module_config)| {
                if module_config.export.is_empty() {
                    return Err(ConfigError::EmptyExport {
                        module: module.to_owned(),
                    });
                }

                Ok(TargetModule {
                    source: Atom::from(module.as_str()),
                    export: Atom::from(module_config.export.as_str()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        targets.sort_by(|a, b| (*a.source).cmp(&*b.source));
        Ok(targets)
    }
}

/// A module specifier together with the export which is used as the template tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetModule {
    pub source: Atom,
    /// `default` for `import hbs from '...'`
    pub export: Atom,
}

impl Default for TargetModule {
    fn default() -> Self {
        TargetModule {
            source: HTMLBARS_INLINE_PRECOMPILE.to_owned(),
            export: DEFAULT.to_owned(),
        }
    }
}

impl TargetModule {
    #[inline]
    pub fn is_default_export(&self) -> bool {
        self.export == *DEFAULT
    }

    /// The only import statement accepted for this module
    pub fn required_syntax(&self) -> String {
        if self.is_default_export() {
            format!("import hbs from '{}'", self.source)
        } else {
            format!("import {{ {} }} from '{}'", self.export, self.source)
        }
    }
}

/// Local binding of a target module's template tag, valid for a single file
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleBinding {
    pub source: Atom,
    pub local: Ident,
}

/// A call or tagged template which uses a [`ModuleBinding`]
#[derive(Debug)]
pub struct UsageSite<'a> {
    pub binding: &'a ModuleBinding,
    pub kind: UsageKind<'a>,
}

#[derive(Debug)]
pub enum UsageKind<'a> {
    /// hbs`hello`
    TaggedTemplate(&'a TaggedTpl),
    /// `hbs('hello')`
    Call(&'a CallExpr),
}

impl UsageSite<'_> {
    pub fn span(&self) -> Span {
        match self.kind {
            UsageKind::TaggedTemplate(tagged_tpl) => tagged_tpl.span,
            UsageKind::Call(call_expr) => call_expr.span,
        }
    }
}

/// Outcome of transforming one module
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformSummary {
    pub removed_imports: usize,
    pub rewritten_sites: usize,
}

impl TransformSummary {
    /// Whether the module did not import any target module and was left untouched
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.removed_imports == 0
    }
}
