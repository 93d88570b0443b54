use std::path::Path;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    // Short commit plus a dirty marker, shown by `idle-cli --version`.
    let mut revision =
        git(&["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".into());
    if revision != "unknown" && git(&["status", "--porcelain", "--untracked-files=no"]).is_some() {
        revision.push_str("-dirty");
    }
    println!("cargo:rustc-env=IDLE_CLI_REVISION={revision}");

    if let Some(dir) = git(&["rev-parse", "--absolute-git-dir"]) {
        let dir = Path::new(&dir);
        for watched in ["HEAD", "refs", "index"] {
            println!("cargo:rerun-if-changed={}", dir.join(watched).display());
        }
    }
    println!("cargo:rerun-if-changed=build.rs");
}
