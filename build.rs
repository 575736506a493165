// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    // Re-run build script if git HEAD changes
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-env-changed=PHOTOBOOTH_VERSION");

    // Packagers may pin the version string
    let version = std::env::var("PHOTOBOOTH_VERSION").unwrap_or_else(|_| get_git_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Crate version, with the short commit hash when built from a checkout
fn get_git_version() -> String {
    let package = env!("CARGO_PKG_VERSION");

    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output();

    match output {
        Ok(output) if output.status.success() => {
            let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
            format!("{}-{}", package, hash)
        }
        _ => package.to_string(),
    }
}
