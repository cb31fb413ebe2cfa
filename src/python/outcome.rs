//! Reading uv's output to decide whether an invocation changed anything.

use crate::module::params::PackageState;
use once_cell::sync::Lazy;
use regex::Regex;

static DRY_RUN_CHANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:Would uninstall|Would install)").unwrap());

static CHANGED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^(?:(?:Installed|Uninstalled) \d+ packages?\b| [-+~] \S|Successfully (?:installed|uninstalled)\b)",
    )
    .unwrap()
});

static UNCHANGED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?:^Audited \d+ packages?\b|not installed|^Requirement already satisfied|Would make no changes|No packages to uninstall)",
    )
    .unwrap()
});

/// What the tool's own output says about the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSignal {
    Changed,
    Unchanged,
    /// Nothing recognisable; the caller has to compare package listings.
    Unknown,
}

pub fn classify(stdout: &str, stderr: &str) -> ChangeSignal {
    if CHANGED_RE.is_match(stdout) || CHANGED_RE.is_match(stderr) {
        ChangeSignal::Changed
    } else if UNCHANGED_RE.is_match(stdout) || UNCHANGED_RE.is_match(stderr) {
        ChangeSignal::Unchanged
    } else {
        ChangeSignal::Unknown
    }
}

/// `--dry-run` reports pending work with `Would install` / `Would uninstall` lines.
pub fn dry_run_changed(stdout: &str, stderr: &str) -> bool {
    DRY_RUN_CHANGE_RE.is_match(stderr) || DRY_RUN_CHANGE_RE.is_match(stdout)
}

/// Uninstalling something that is not there exits 1 on some tool versions;
/// that is the desired state already, not a failure.
pub fn is_benign_failure(state: PackageState, rc: i32, stdout: &str, stderr: &str) -> bool {
    state == PackageState::Absent
        && rc == 1
        && (stdout.contains("not installed") || stderr.contains("not installed"))
}

/// Line-split view of captured output, as Ansible's `*_lines` fields.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
