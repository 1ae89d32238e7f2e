//! # Utility Functions Module
//!
//! Helpers for building external tool command lines.

/// Macro for building argument vectors from mixed string and path items.
///
/// Every item only needs to implement `AsRef<OsStr>`; they don't have to
/// share a type. Paths are passed through as `OsString`, so non-UTF-8 file
/// names reach the external tool untouched.
///
/// # Example
/// ```rust,ignore
/// use crate::args;
///
/// let args = args![format!("--lossy={}", lossy), "-O3", input_path, "-o", output_path];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        ::std::vec![$(::std::ffi::OsStr::new(&$item).to_os_string()),*]
    };
}
