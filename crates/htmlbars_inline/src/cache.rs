//! Identity of this transform for build cache keys

use std::path::{Path, PathBuf};

lazy_static! {
    static ref BASE_DIR: PathBuf = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
}

/// Absolute path of the crate root at build time, the same for the whole process.
///
/// Build caches hash it together with the file contents, so that output cached
/// by another build of the transform is not reused. A binary built on another
/// machine reports that machine's path.
#[inline]
pub fn base_dir() -> &'static Path {
    BASE_DIR.as_path()
}
