//! # Conformance Test Workspace
//!
//! Builds a throwaway project directory laid out the way the runner expects
//! (`tests/test_files/*.co` plus `build/come`), with a tiny shell-script compiler
//! standing in for the real one.
//!
//! The fake compiler understands three statements, one per line:
//! - `print <text>` prints `<text>`
//! - `exit <n>` exits with status `<n>`
//! - `sleep <secs>` blocks for `<secs>` seconds
//!
//! A fixture containing `syntax error` is rejected with a diagnostic on stderr.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use come_conformance::TestConfig;
use tempfile::TempDir;

const FAKE_COMPILER: &str = r#"#!/bin/sh
if [ "$1" != "build" ] || [ "$3" != "-o" ]; then
    echo "usage: come build <src> -o <out>" >&2
    exit 64
fi
src="$2"
out="$4"
if grep -q 'syntax error' "$src"; then
    echo "compiling $src"
    echo "$src:1:1: error: syntax error" >&2
    exit 1
fi
{
    echo '#!/bin/sh'
    sed -n \
        -e 's/^print \(.*\)$/echo "\1"/p' \
        -e 's/^exit \([0-9][0-9]*\)$/exit \1/p' \
        -e 's/^sleep \([0-9][0-9]*\)$/exec sleep \1/p' \
        "$src"
} > "$out"
chmod +x "$out"
"#;

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// A workspace with the fake compiler installed at `build/come`.
    pub fn new() -> Self {
        let ws = Self::without_compiler();
        fs::create_dir_all(ws.dir.path().join("build")).unwrap();
        write_executable(&ws.compiler(), FAKE_COMPILER);
        ws
    }

    /// A workspace with a fixture directory but no compiler.
    pub fn without_compiler() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tests").join("test_files")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("tests").join("test_files")
    }

    pub fn compiler(&self) -> PathBuf {
        self.dir.path().join("build").join("come")
    }

    pub fn fixture(&self, name: &str, text: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    /// Absolute-path configuration, for driving the library directly.
    pub fn config(&self) -> TestConfig {
        TestConfig {
            test_root: self.root(),
            compiler: self.compiler(),
            ..TestConfig::default()
        }
    }

    /// Files left in the fixture directory, by name, sorted.
    pub fn leftovers(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
