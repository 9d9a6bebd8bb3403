use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TARGET_URL: &str = "https://www.akc.org/dog-breeds/";
pub const DEFAULT_SELECTOR: &str = ".breed-type-card__title";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_OUTPUT_FILE: &str = "dog_names.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Breed names in document order, as scraped from a single page.
///
/// Entries are trimmed on construction with the same whitespace set as JavaScript's
/// `String.prototype.trim`. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameList(Vec<String>);

impl NameList {
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            raw.into_iter()
                .map(|s| s.as_ref().trim_matches(is_js_whitespace).to_string())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Two-space indented JSON array, no trailing newline.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }
}

/// ECMAScript WhiteSpace and LineTerminator: Unicode White_Space without NEL, plus the BOM.
fn is_js_whitespace(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{0085}')
}

impl<'a> IntoIterator for &'a NameList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Navigation milestone a page load waits for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    #[default]
    DomContentLoaded,
    Load,
}

impl fmt::Display for WaitUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitUntil::DomContentLoaded => f.write_str("domcontentloaded"),
            WaitUntil::Load => f.write_str("load"),
        }
    }
}

impl FromStr for WaitUntil {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "domcontentloaded" => Ok(WaitUntil::DomContentLoaded),
            "load" => Ok(WaitUntil::Load),
            other => Err(format!(
                "unknown wait condition '{}', expected 'domcontentloaded' or 'load'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_list_trims_and_keeps_order() {
        let names = NameList::from_raw(["  Affenpinscher  ", "Afghan Hound", "\n\tBeagle\n"]);
        assert_eq!(
            names.as_slice(),
            &["Affenpinscher", "Afghan Hound", "Beagle"]
        );
    }

    #[test]
    fn test_name_list_trims_like_javascript() {
        let names = NameList::from_raw([
            "\u{FEFF}Akita\u{FEFF}",
            "Beagle\u{0085}",
            "\u{00A0}Borzoi\u{3000}",
            "\u{2028}Boxer\u{2029}",
        ]);
        assert_eq!(
            names.as_slice(),
            &["Akita", "Beagle\u{0085}", "Borzoi", "Boxer"]
        );
    }

    #[test]
    fn test_name_list_keeps_duplicates() {
        let names = NameList::from_raw(["Poodle", " Poodle "]);
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n == "Poodle"));
    }

    #[test]
    fn test_pretty_json_uses_two_space_indent() {
        let names = NameList::from_raw(["  Affenpinscher  ", "Afghan Hound"]);
        let json = names.to_pretty_json().unwrap();
        assert_eq!(json, "[\n  \"Affenpinscher\",\n  \"Afghan Hound\"\n]");
    }

    #[test]
    fn test_empty_list_serializes_as_empty_array() {
        assert_eq!(NameList::default().to_pretty_json().unwrap(), "[]");
    }

    #[test]
    fn test_wait_until_parse() {
        assert_eq!(
            "DOMContentLoaded".parse::<WaitUntil>().unwrap(),
            WaitUntil::DomContentLoaded
        );
        assert_eq!("load".parse::<WaitUntil>().unwrap(), WaitUntil::Load);
        assert!("networkidle".parse::<WaitUntil>().is_err());
    }
}
