//! Filesystem completion for path-mode form fields.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Entries of the directory named by `input` whose names start with its last segment.
///
/// Suggestions keep the prefix exactly as typed (including a leading `~/`), directories end
/// in `/`, and dot entries only show up once the partial name itself starts with a dot. A
/// directory that does not exist yet simply has no suggestions.
pub fn list_path_suggestions(input: &str, home: Option<&Path>) -> Result<Vec<String>> {
    let input = if input == "~" { "~/" } else { input };
    let (typed_dir, partial) = match input.rfind('/') {
        Some(idx) => input.split_at(idx + 1),
        None => ("", input),
    };
    let scan = expand_dir(typed_dir, home)?;

    if !scan.is_dir() {
        return Ok(Vec::new());
    }
    let entries = match fs::read_dir(&scan) {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("read {}", scan.display())),
    };

    let show_hidden = partial.starts_with('.');
    let mut out: Vec<String> = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') && !show_hidden {
            continue;
        }
        if !name.starts_with(partial) {
            continue;
        }
        let suffix = if entry.path().is_dir() { "/" } else { "" };
        out.push(format!("{typed_dir}{name}{suffix}"));
    }
    out.sort();
    Ok(out)
}

fn expand_dir(typed_dir: &str, home: Option<&Path>) -> Result<PathBuf> {
    if typed_dir.is_empty() {
        return Ok(PathBuf::from("."));
    }
    match typed_dir.strip_prefix("~/") {
        Some(rest) => {
            let Some(home) = home else {
                bail!("cannot expand ~: home directory is unknown");
            };
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(typed_dir)),
    }
}

/// `[start, end)` of at most `max` suggestions, centred on `selected` where possible.
#[must_use]
pub fn suggestion_window(len: usize, selected: usize, max: usize) -> (usize, usize) {
    if len <= max {
        return (0, len);
    }
    let selected = selected.min(len - 1);
    let start = selected.saturating_sub(max / 2).min(len - max);
    (start, start + max)
}

/// Display rows for a suggestion list: the windowed items plus overflow markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionWindow<'a> {
    pub items: Vec<(usize, &'a str)>,
    pub more_above: bool,
    pub more_below: bool,
    /// `(i/n)`, present only when the list does not fit the window.
    pub counter: Option<String>,
}

#[must_use]
pub fn window<'a>(suggestions: &'a [String], selected: usize, max: usize) -> SuggestionWindow<'a> {
    let (start, end) = suggestion_window(suggestions.len(), selected, max);
    let overflow = suggestions.len() > max;
    SuggestionWindow {
        items: (start..end).map(|i| (i, suggestions[i].as_str())).collect(),
        more_above: start > 0,
        more_below: end < suggestions.len(),
        counter: overflow.then(|| format!("({}/{})", selected + 1, suggestions.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_centred_and_clamped() {
        assert_eq!(suggestion_window(3, 2, 5), (0, 3));
        assert_eq!(suggestion_window(20, 0, 5), (0, 5));
        assert_eq!(suggestion_window(20, 10, 5), (8, 13));
        assert_eq!(suggestion_window(20, 19, 5), (15, 20));
    }

    #[test]
    fn window_marks_overflow() {
        let items: Vec<String> = (0..10).map(|i| format!("s{i}")).collect();
        let w = window(&items, 5, 3);
        assert_eq!(w.items.first().map(|x| x.0), Some(4));
        assert!(w.more_above);
        assert!(w.more_below);
        assert_eq!(w.counter.as_deref(), Some("(6/10)"));

        let short = window(&items[..2], 0, 3);
        assert!(!short.more_above && !short.more_below);
        assert!(short.counter.is_none());
    }

    #[test]
    fn tilde_without_home_is_an_error() {
        assert!(list_path_suggestions("~/", None).is_err());
    }
}
