//! Bot version from `git describe`, logged at startup.

use std::path::Path;
use std::process::Command;

/// `git describe --tags --long --always` condensed to a display string:
/// `tag (commit)` on an exact tag, `tag+N (commit)` when N commits ahead,
/// the raw describe output for tagless repos, `unknown` on any failure.
pub fn git_version(repo_path: &Path) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .args(["describe", "--tags", "--long", "--always"])
        .output();

    let desc = match output {
        Ok(out) if out.status.success() => {
            String::from_utf8_lossy(&out.stdout).trim().to_string()
        }
        _ => return "unknown".to_string(),
    };

    format_describe(&desc)
}

fn format_describe(desc: &str) -> String {
    let parts: Vec<&str> = desc.split('-').collect();
    if parts.len() == 3 {
        let (tag, commits_ahead, commit) = (parts[0], parts[1], parts[2]);
        let commit = commit.trim_start_matches('g');
        if commits_ahead == "0" {
            return format!("{tag} ({commit})");
        }
        return format!("{tag}+{commits_ahead} ({commit})");
    }
    desc.to_string()
}
