//! Language-specific preparation of untrusted source text.
//!
//! A runner turns the raw snippet into the exact program handed to an
//! external interpreter, applying whatever defense-in-depth the language
//! supports at the process level. None of this is isolation: the interpreter
//! still runs with the host's ambient privileges. What a runner guarantees
//! is output discipline (stdout corresponds to captured log lines) and, for
//! Python, an optional standard-library deny-list.

pub mod javascript;
pub mod python;

pub use javascript::JavascriptRunner;
pub use python::PythonRunner;

pub trait LanguageRunner: Send + Sync {
    /// File extension for the materialized scratch file.
    fn extension(&self) -> &'static str;

    /// Interpreter binary names to try, in order. The executor only
    /// advances past a candidate when the spawn itself fails.
    fn candidates(&self) -> &[&'static str];

    /// Wrap raw source into the exact text that will be executed.
    fn prepare(&self, source: &str) -> String;
}
