//! Short-option cluster expansion.

use std::sync::LazyLock;

use regex::Regex;

static CLUSTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^-([a-zA-Z0-9?]{2,})(=.*)?$").expect("static regex must compile")
});

/// Expands clustered short options: `-xyz=v` becomes `-x -y -z=v`.
///
/// Only the last expanded token keeps the `=value` suffix. Tokens that are
/// not clusters pass through untouched; the registry is not consulted, so
/// `-abc` expands even if `abc` would have been a value.
///
/// # Examples
///
/// ```
/// use optspec_core::expand_clusters;
///
/// let args = vec!["-xf=bar".to_string(), "file".to_string()];
/// assert_eq!(expand_clusters(&args), vec!["-x", "-f=bar", "file"]);
/// ```
pub fn expand_clusters(args: &[String]) -> Vec<String> {
    let mut expanded = args.to_vec();

    // Right to left, so splicing never shifts an index still to be visited.
    for i in (0..expanded.len()).rev() {
        let (initials, suffix) = match CLUSTER_RE.captures(&expanded[i]) {
            Some(caps) => (
                caps[1].to_string(),
                caps.get(2).map(|m| m.as_str().to_string()),
            ),
            None => continue,
        };
        let mut set: Vec<String> = initials.chars().map(|c| format!("-{c}")).collect();
        if let (Some(last), Some(suffix)) = (set.last_mut(), suffix) {
            last.push_str(&suffix);
        }
        expanded.splice(i..=i, set);
    }

    expanded
}
