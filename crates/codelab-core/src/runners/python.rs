//! Python runner with an optional standard-library deny-list.
//!
//! Python snippets run unmodified. In restricted mode (the default for a
//! public-facing deployment) a prelude pre-registers the deny-listed modules
//! as unavailable in `sys.modules` before the first user statement, so
//! `import os` raises instead of handing out process control. Poisoning
//! `sys.modules` stops the casual escape, not a determined one, which is
//! consistent with the process-level mitigation model of the whole service.

use super::LanguageRunner;

pub const PYTHON_CANDIDATES: &[&str] = &["python3", "python", "py"];

/// Modules withheld in restricted mode: OS/process control, subprocess
/// spawning, filesystem manipulation, and networking.
const DENIED_MODULES: &[&str] = &["os", "subprocess", "shutil", "socket"];

#[derive(Debug)]
pub struct PythonRunner {
    restricted: bool,
}

impl PythonRunner {
    pub fn new(restricted: bool) -> Self {
        Self { restricted }
    }

    fn restricted_prelude() -> String {
        let mut prelude = String::from("import sys\n\n");
        for module in DENIED_MODULES {
            prelude.push_str(&format!("sys.modules[\"{}\"] = None\n", module));
        }
        prelude.push('\n');
        prelude
    }
}

impl Default for PythonRunner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LanguageRunner for PythonRunner {
    fn extension(&self) -> &'static str {
        "py"
    }

    fn candidates(&self) -> &[&'static str] {
        PYTHON_CANDIDATES
    }

    fn prepare(&self, source: &str) -> String {
        if self.restricted {
            let mut program = Self::restricted_prelude();
            program.push_str(source);
            program.push('\n');
            program
        } else {
            source.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_mode_passes_source_through() {
        let runner = PythonRunner::new(false);
        assert_eq!(runner.prepare("print('hi')"), "print('hi')");
    }

    #[test]
    fn restricted_mode_prepends_the_deny_list() {
        let runner = PythonRunner::new(true);
        let program = runner.prepare("print('hi')");
        assert!(program.starts_with("import sys\n"));
        for module in DENIED_MODULES {
            assert!(program.contains(&format!("sys.modules[\"{}\"] = None", module)));
        }
        assert!(program.ends_with("print('hi')\n"));
    }

    #[test]
    fn restricted_mode_leaves_user_lines_unindented() {
        // Indenting user code under a try block breaks multiline strings,
        // so the prelude must not touch the snippet itself.
        let runner = PythonRunner::new(true);
        let program = runner.prepare("for i in range(3):\n    print(i)");
        assert!(program.contains("\nfor i in range(3):\n    print(i)\n"));
    }

    #[test]
    fn default_is_restricted() {
        let program = PythonRunner::default().prepare("1");
        assert!(program.contains("sys.modules"));
    }
}
