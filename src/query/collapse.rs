use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;

use crate::catalog::NormalizedModel;

/// A separator, then `YYYY-MM-DD` or `YYYYMMDD`, then end or another separator.
static DATE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-_](\d{4}-\d{2}-\d{2}|\d{8})(?:$|[-_])").expect("date suffix pattern is valid")
});

/// Base name and normalized `YYYY-MM-DD` date of a dated snapshot name.
///
/// Returns `None` for undated names and for names whose base would be empty.
pub fn dated_version(name: &str) -> Option<(&str, String)> {
    let captures = DATE_SUFFIX.captures(name)?;
    let start = captures.get(0)?.start();
    let base = &name[..start];
    if base.is_empty() {
        return None;
    }
    let date = captures.get(1)?.as_str();
    let normalized = if date.len() == 8 {
        format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..])
    } else {
        date.to_string()
    };
    Some((base, normalized))
}

/// Keep only the latest dated snapshot of each base model.
///
/// Undated models pass through. Survivors keep their relative input order;
/// among equal dates the first one seen wins. Returns the survivors and the
/// number of models dropped.
pub fn collapse_versions(models: Vec<&NormalizedModel>) -> (Vec<&NormalizedModel>, usize) {
    let versions: Vec<Option<(&str, String)>> =
        models.iter().map(|m| dated_version(&m.key)).collect();

    let mut latest: HashMap<&str, usize> = HashMap::new();
    for (idx, version) in versions.iter().enumerate() {
        let Some((base, date)) = version else { continue };
        match latest.get(base) {
            Some(&best) if versions[best].as_ref().is_some_and(|(_, d)| d >= date) => {}
            _ => {
                latest.insert(*base, idx);
            }
        }
    }

    let before = models.len();
    let kept: Vec<&NormalizedModel> = models
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| match &versions[*idx] {
            Some((base, _)) => latest.get(base) == Some(idx),
            None => true,
        })
        .map(|(_, m)| m)
        .collect();

    let hidden = before - kept.len();
    if hidden > 0 {
        tracing::trace!(hidden, "Collapsed older snapshots");
    }
    (kept, hidden)
}
