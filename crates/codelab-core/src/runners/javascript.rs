//! JavaScript runner: IIFE wrapper with global denial and console capture.
//!
//! The wrapper installs throwing getters for the most dangerous globals,
//! redirects `console.log`/`console.error` into an in-memory buffer, runs
//! the snippet inside a try/catch so a thrown error becomes one buffered
//! line instead of a crashed process, restores the console, and finally
//! prints the joined buffer through the restored `console.log`. A throwing
//! program therefore still exits zero and reports
//! `[EXECUTION ERROR]: <message>` as ordinary output.
//!
//! The global denial measurably reduces blast radius but is not a sandbox:
//! in a CommonJS module, `require` and `module` are module-scope bindings
//! that shadow the poisoned globals, and any code the getters do not cover
//! runs with the interpreter's full privileges.

use super::LanguageRunner;

pub const JS_CANDIDATES: &[&str] = &["node"];

const WRAPPER_TEMPLATE: &str = r#""use strict";
(function () {
  const blocked = ["eval", "Function", "process", "require", "global", "module", "exports", "__dirname", "__filename"];
  for (const name of blocked) {
    Object.defineProperty(globalThis, name, {
      get: function () { throw new Error(name + " is not allowed"); },
      configurable: false,
    });
  }

  const logs = [];
  const originalLog = console.log;
  const originalError = console.error;
  console.log = (...args) => { logs.push(args.join(" ")); };
  console.error = (...args) => { logs.push("[ERROR]: " + args.join(" ")); };

  try {
__USER_CODE__
  } catch (error) {
    logs.push("[EXECUTION ERROR]: " + error.message);
  }

  console.log = originalLog;
  console.error = originalError;

  if (logs.length > 0) {
    originalLog(logs.join("\n"));
  }
})();
"#;

#[derive(Debug, Default)]
pub struct JavascriptRunner;

impl LanguageRunner for JavascriptRunner {
    fn extension(&self) -> &'static str {
        "js"
    }

    fn candidates(&self) -> &[&'static str] {
        JS_CANDIDATES
    }

    fn prepare(&self, source: &str) -> String {
        WRAPPER_TEMPLATE.replace("__USER_CODE__", source)
    }
}
