use std::fmt;

use swc_core::{
    common::{Span, Spanned},
    ecma::atoms::Atom,
};
use swc_ecma_parser::error::SyntaxError;

#[derive(Debug)]
pub struct TransformError {
    pub span: Span,
    pub kind: TransformErrorKind,
}

#[derive(Debug)]
pub enum TransformErrorKind {
    /// The target module was imported using an unsupported form,
    /// e.g. `import { hbs } from 'htmlbars-inline-precompile'`
    InvalidImportForm { required: String, used: String },
    /// The target module was imported twice, or two target imports share a local name
    DuplicateImport { source: Atom, local: Atom },
    /// The imported binding is declared again (or assigned to) somewhere in the module
    ShadowedBinding { source: Atom, local: Atom },
    /// A `${}` placeholder inside a tagged template, e.g. hbs`{{${value}}}`
    UnsupportedPlaceholder,
    /// `hbs()` or `hbs('a', 'b')`
    InvalidCallArity { callee: Atom },
    /// `hbs(123)` or hbs(`tpl`)
    InvalidCallArgumentType { callee: Atom },
    /// The injected precompiler reported an error
    PrecompileFailed(PrecompileError),
    /// The precompiler returned code which does not parse as an expression
    InvalidPrecompileOutput { output: String, error: SyntaxError },
}

/// Error returned by a [`crate::Precompile`] implementation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecompileError(pub String);

/// Errors detected when constructing the transform, before any file is processed
#[derive(Debug)]
pub enum ConfigError {
    /// No `precompile` function was supplied
    MissingPrecompiler,
    /// A module was configured with an empty `export`
    EmptyExport { module: String },
    /// The configuration object could not be deserialized
    InvalidConfig(serde_json::Error),
}

impl TransformError {
    pub fn new(span: Span, kind: TransformErrorKind) -> TransformError {
        TransformError { span, kind }
    }
}

impl Spanned for TransformError {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for TransformErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformErrorKind::InvalidImportForm { required, used } => {
                write!(f, "Only `{}` is supported. You used: `{}`", required, used)
            }
            TransformErrorKind::DuplicateImport { source, local } => write!(
                f,
                "Only a single import from '{}' is supported per file, found another one binding `{}`",
                source, local
            ),
            TransformErrorKind::ShadowedBinding { source, local } => write!(
                f,
                "`{}` is imported from '{}' and cannot be redeclared or reassigned",
                local, source
            ),
            TransformErrorKind::UnsupportedPlaceholder => {
                write!(f, "placeholders inside a tagged template string are not supported")
            }
            TransformErrorKind::InvalidCallArity { callee }
            | TransformErrorKind::InvalidCallArgumentType { callee } => write!(
                f,
                "{} should be invoked with a single argument: the template string",
                callee
            ),
            TransformErrorKind::PrecompileFailed(e) => {
                write!(f, "Template precompilation failed: {}", e)
            }
            TransformErrorKind::InvalidPrecompileOutput { output, error } => write!(
                f,
                "Precompiled template is not a valid expression ({}): {}",
                error.msg(),
                output
            ),
        }
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for TransformError {}

impl fmt::Display for PrecompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for PrecompileError {}

impl From<PrecompileError> for TransformErrorKind {
    fn from(value: PrecompileError) -> Self {
        TransformErrorKind::PrecompileFailed(value)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingPrecompiler => {
                write!(f, "htmlbars-inline-precompile requires a `precompile` function")
            }
            ConfigError::EmptyExport { module } => {
                write!(f, "Module '{}' is configured with an empty `export`", module)
            }
            ConfigError::InvalidConfig(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::InvalidConfig(value)
    }
}
