#![deny(clippy::all)]

#[cfg(not(all(target_os = "linux", target_env = "musl", target_arch = "aarch64")))]
#[global_allocator]
static ALLOC: mimalloc_rust::GlobalMiMalloc = mimalloc_rust::GlobalMiMalloc;

use std::collections::HashMap;

use fxhash::FxHashMap;
use htmlbars_inline::{
    transform_source, InlinePrecompile, InlinePrecompileConfig, InlinePrecompileOptions,
    ModuleConfig, Precompile, PrecompileError, Precompiled,
};
use napi::{bindgen_prelude::*, Env, JsFunction, JsUnknown};
use napi_derive::napi;

#[napi(object)]
pub struct ModuleOptions {
    pub export: String,
}

#[napi(object)]
pub struct TransformOptions {
    /// Used in error messages and to pick the syntax (`.ts`, `.jsx`, ...)
    pub filename: Option<String>,
    pub modules: Option<HashMap<String, ModuleOptions>>,
}

/// Precompiler backed by a JavaScript function
struct JsPrecompiler {
    env: Env,
    precompile: JsFunction,
}

impl JsPrecompiler {
    fn call(&self, template: &str) -> Result<String> {
        let template = self.env.create_string(template)?;
        let precompiled: JsUnknown = self.precompile.call(None, &[template])?;
        precompiled.coerce_to_string()?.into_utf8()?.into_owned()
    }
}

impl Precompile for JsPrecompiler {
    fn precompile(&self, template: &str) -> std::result::Result<Precompiled, PrecompileError> {
        self.call(template)
            .map(Precompiled::Code)
            .map_err(|e| PrecompileError(e.reason))
    }
}

#[napi]
pub fn transform_sync(
    env: Env,
    source: String,
    precompile: Option<JsFunction>,
    options: Option<TransformOptions>,
) -> Result<String> {
    let (filename, modules) = match options {
        Some(options) => (options.filename, options.modules),
        None => (None, None),
    };

    let config = InlinePrecompileConfig {
        modules: modules.map(|modules| {
            modules
                .into_iter()
                .map(|(module, options)| {
                    (
                        module,
                        ModuleConfig {
                            export: options.export,
                        },
                    )
                })
                .collect::<FxHashMap<_, _>>()
        }),
    };

    let transform = InlinePrecompile::new(InlinePrecompileOptions {
        precompile: precompile.map(|precompile| {
            Box::new(JsPrecompiler { env, precompile }) as Box<dyn Precompile>
        }),
        config,
    })
    .map_err(|e| Error::from_reason(e.to_string()))?;

    let filename = filename.as_deref().unwrap_or("anonymous.js");
    transform_source(&source, filename, &transform).map_err(|e| Error::from_reason(e.to_string()))
}

/// Root of the transform crate, for build cache keys.
///
/// This is the directory the native module was built from, not where a prebuilt
/// binary is installed. Packages shipping prebuilt binaries should key their cache
/// on `path.resolve(__dirname, '..')` of the JavaScript loader instead.
#[napi]
pub fn base_dir() -> String {
    htmlbars_inline::base_dir().to_string_lossy().into_owned()
}
