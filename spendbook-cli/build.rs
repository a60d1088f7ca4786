//! Stamps the binary with the git revision it was built from.

use std::process::Command;

fn git_revision(root: &str) -> Option<String> {
    let out = Command::new("git")
        .args(["-C", root, "describe", "--always", "--dirty"])
        .output()
        .ok()?;
    let rev = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (out.status.success() && !rev.is_empty()).then_some(rev)
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let rev = git_revision(&format!("{manifest_dir}/..")).unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=SPENDBOOK_BUILD_REV={rev}");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
