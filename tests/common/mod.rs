#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use fraggroup::FragmentRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Two families of three: poly-A and poly-C with one or two substitutions.
pub const TWO_FAMILIES: [&str; 6] = [
    "AAAAAAAAAA",
    "AAAAAAAAAT",
    "AAAAAAAATT",
    "CCCCCCCCCC",
    "CCCCCCCCCG",
    "CCCCCCCCGG",
];

/// Records named F1..Fn with a shared author.
pub fn records(seqs: &[&str]) -> Vec<FragmentRecord> {
    seqs.iter()
        .enumerate()
        .map(|(i, s)| FragmentRecord::new(format!("F{}", i + 1), format!("author{}", i + 1), *s))
        .collect()
}

/// Semicolon-separated fragment table
pub fn fragment_table(seqs: &[&str]) -> String {
    let mut content = String::from("Name;Author;Sequence\n");
    for (i, s) in seqs.iter().enumerate() {
        content.push_str(&format!("F{};author{};{}\n", i + 1, i + 1, s));
    }
    content
}

pub fn names(result: &fraggroup::BatchResult) -> Vec<Vec<String>> {
    result.records.iter().map(|r| r.names.clone()).collect()
}

pub fn fraggroup_cmd() -> Command {
    let mut cmd = Command::cargo_bin("fraggroup").expect("binary should build");
    cmd.env_remove("FRAGGROUP_CONFIG")
        .env_remove("FRAGGROUP_LOG")
        .env_remove("RUST_LOG");
    cmd
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn create_input_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    Ok(fs::read_to_string(path)?.lines().map(str::to_string).collect())
}
