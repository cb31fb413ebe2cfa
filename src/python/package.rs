//! Requirement strings as written in the `name` argument.

use crate::core::error::{Result, UvPipError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Version comparison operators, longest first so alternation prefers `>=` over `>`.
const VERSION_OPERATORS: [&str; 7] = [">=", "<=", "~=", "==", "!=", ">", "<"];

static VCS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(svn|git|hg|bzr)\+").unwrap());

static VERSION_OPS_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation: Vec<String> = VERSION_OPERATORS.iter().map(|op| regex::escape(op)).collect();
    Regex::new(&alternation.join("|")).unwrap()
});

pub fn is_vcs_url(name: &str) -> bool {
    VCS_RE.is_match(name)
}

/// False when the fragment is a bare version specifier such as `<2.0.0`.
pub fn is_package_name(name: &str) -> bool {
    let trimmed = name.trim_start();
    !VERSION_OPERATORS.iter().any(|op| trimmed.starts_with(op))
}

/// Rebuild package requirements from user input that may have been split on
/// commas, re-attaching version specifier fragments and bracketed extras to
/// the package they belong to.
pub fn recover_package_names(names: &[String]) -> Vec<String> {
    let fragments: Vec<&str> = names.iter().flat_map(|line| line.split(',')).collect();

    let mut packages = Vec::new();
    let mut parts: Vec<&str> = Vec::new();
    let mut in_brackets = false;

    for fragment in fragments {
        if is_package_name(fragment) && !in_brackets && !parts.is_empty() {
            packages.push(parts.join(","));
            parts.clear();
        }
        if fragment.contains('[') {
            in_brackets = true;
        }
        if in_brackets && fragment.contains(']') {
            in_brackets = false;
        }
        parts.push(fragment);
    }
    packages.push(parts.join(","));

    packages
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    requirement: String,
}

impl Package {
    pub fn new(requirement: impl Into<String>) -> Self {
        Self {
            requirement: requirement.into(),
        }
    }

    pub fn has_version_specifier(&self) -> bool {
        VERSION_OPS_RE.is_match(&self.requirement)
    }

    pub fn is_vcs(&self) -> bool {
        is_vcs_url(&self.requirement)
    }

    pub fn pinned(&self, version: &str) -> Self {
        Self::new(format!("{}=={}", self.requirement, version))
    }

    pub fn as_str(&self) -> &str {
        &self.requirement
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.requirement)
    }
}

/// Turn raw `name` entries into packages, folding `version` into the single
/// package when given.
pub fn resolve_packages(names: &[String], version: Option<&str>) -> Result<Vec<Package>> {
    let mut packages: Vec<Package> = recover_package_names(names)
        .into_iter()
        .map(Package::new)
        .collect();

    if let Some(version) = version {
        if packages.len() > 1 {
            return Err(UvPipError::validation(
                "'version' argument is ambiguous when installing multiple package distributions. \
                 Please specify version restrictions next to each package in 'name' argument.",
            ));
        }
        if packages[0].has_version_specifier() {
            return Err(UvPipError::validation(
                "The 'version' argument conflicts with any version specifier provided along with a package name. \
                 Please keep the version specifier, but remove the 'version' argument.",
            ));
        }
        packages[0] = packages[0].pinned(version);
    }

    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reattaches_split_specifiers() {
        let names = strings(&["django>1.11.1", "<1.11.3", "ipaddress", "simpleproject>1.1.0", "<2.0.0"]);
        assert_eq!(
            recover_package_names(&names),
            strings(&["django>1.11.1,<1.11.3", "ipaddress", "simpleproject>1.1.0,<2.0.0"])
        );
    }

    #[test]
    fn splits_packages_joined_in_one_entry() {
        let names = strings(&["django>1.11.1,<1.11.3,ipaddress", "simpleproject>1.1.0,<2.0.0"]);
        assert_eq!(
            recover_package_names(&names),
            strings(&["django>1.11.1,<1.11.3", "ipaddress", "simpleproject>1.1.0,<2.0.0"])
        );
    }

    #[test]
    fn keeps_extras_together() {
        let names = strings(&["requests[security,socks]>=2.0", "six"]);
        assert_eq!(
            recover_package_names(&names),
            strings(&["requests[security,socks]>=2.0", "six"])
        );
    }

    #[test]
    fn detects_vcs_urls() {
        assert!(is_vcs_url("git+http://myrepo/app/MyApp"));
        assert!(is_vcs_url("svn+http://myrepo/svn/MyApp#egg=MyApp"));
        assert!(!is_vcs_url("file:///path/to/MyApp.tar.gz"));
        assert!(!is_vcs_url("bottle"));
    }

    #[test]
    fn version_specifiers() {
        assert!(Package::new("bottle==0.11").has_version_specifier());
        assert!(Package::new("bottle>0.10,<0.20,!=0.11").has_version_specifier());
        assert!(Package::new("bottle~=0.12").has_version_specifier());
        assert!(!Package::new("bottle").has_version_specifier());
        assert!(!is_package_name(" <1.0"));
        assert!(is_package_name("bottle"));
    }

    #[test]
    fn version_is_folded_into_single_package() {
        let packages = resolve_packages(&strings(&["bottle"]), Some("0.11")).unwrap();
        assert_eq!(packages, vec![Package::new("bottle==0.11")]);
    }

    #[test]
    fn version_with_several_packages_is_ambiguous() {
        let err = resolve_packages(&strings(&["bottle", "six"]), Some("1.0"))
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("'version' argument is ambiguous"));
    }

    #[test]
    fn version_conflicts_with_inline_specifier() {
        let err = resolve_packages(&strings(&["bottle>=0.10"]), Some("0.11"))
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("The 'version' argument conflicts"));
    }
}
