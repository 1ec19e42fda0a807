//! Build script for pr-leaderboard: embeds a human-readable version string.
//!
//! `BUILD_INFO_HUMAN` is `<crate version> (<git describe>) <rustc version>`.
//! When the checkout carries no tags, the describe part falls back to
//! `v<crate version>-<YYYYmmddHHMMSS>-<short sha>[+dirty]`, stamped with the
//! commit time for clean trees and the build time for dirty ones.

use std::process::Command;

use chrono::{DateTime, Utc};

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn main() {
    for path in ["src", "build.rs", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={path}");
    }

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `None` outside a git checkout. `.cargo-ok` (written by `cargo install
/// --git`) does not count as a change.
fn working_tree_dirty() -> Option<bool> {
    run("git", &["status", "--porcelain"]).map(|status| {
        status
            .lines()
            .filter_map(|line| line.get(3..))
            .any(|path| path != ".cargo-ok")
    })
}

fn describe() -> String {
    match run("git", &["describe", "--tags", "--always", "--dirty"]) {
        Some(desc) if desc.contains('v') || desc.contains("-g") => desc,
        _ => pseudo_version(),
    }
}

fn pseudo_version() -> String {
    let sha = run("git", &["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let dirty = working_tree_dirty();

    let stamp = match dirty {
        Some(false) => run("git", &["log", "-1", "--format=%ct"])
            .and_then(|secs| secs.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
    .unwrap_or_else(Utc::now)
    .format(STAMP_FORMAT)
    .to_string();

    let suffix = if dirty == Some(true) { "+dirty" } else { "" };
    format!("v{}-{stamp}-{sha}{suffix}", env!("CARGO_PKG_VERSION"))
}

fn build_info() -> String {
    [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        Some(format!("({})", describe())),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}
