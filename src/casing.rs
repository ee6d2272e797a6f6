//! PasCamelCase classification and word splitting.

use regex::Regex;
use std::sync::LazyLock;

static PAS_CAMEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][a-z0-9]*(?:[A-Z0-9](?:[a-z0-9]+|$))*$").expect("static casing regex")
});

/// Accepts PascalCase or camelCase tokens, tolerating known abbreviations
/// written as capitalized runs (`deviceID`, `StreamIO`, `awsVPC`).
#[derive(Debug, Clone)]
pub struct CaseClassifier {
    /// Longest first so `ASN` is removed before `SN`
    abbreviations: Vec<String>,
}

impl CaseClassifier {
    pub fn new<S: AsRef<str>>(abbreviations: &[S]) -> Self {
        let mut abbreviations: Vec<String> = abbreviations
            .iter()
            .map(|a| a.as_ref().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        abbreviations.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { abbreviations }
    }

    pub fn is_acceptable(&self, token: &str) -> bool {
        if is_pas_camel(token) {
            return true;
        }
        let reduced = self.strip_abbreviations(token);
        if reduced.len() == token.len() {
            return false;
        }
        reduced.is_empty() || is_pas_camel(&reduced)
    }

    /// Remove abbreviations that form a whole capitalized run: the run starts
    /// a word and ends the token, a plural `s`, a digit, a new word or another
    /// abbreviation. `SNMP` keeps its `SN`.
    fn strip_abbreviations(&self, token: &str) -> String {
        let chars: Vec<char> = token.chars().collect();
        let mut reduced = String::with_capacity(token.len());
        let mut stripped_to = 0;
        let mut i = 0;
        while i < chars.len() {
            let starts_word = i == 0 || i == stripped_to || !chars[i - 1].is_ascii_uppercase();
            if starts_word && let Some(len) = self.run_at(&chars, i) {
                i += len;
                stripped_to = i;
                continue;
            }
            reduced.push(chars[i]);
            i += 1;
        }
        reduced
    }

    fn run_at(&self, chars: &[char], start: usize) -> Option<usize> {
        self.abbreviations.iter().find_map(|abbreviation| {
            let len = abbreviation.chars().count();
            let matches = chars.len() >= start + len
                && chars[start..start + len].iter().copied().eq(abbreviation.chars());
            (matches && self.ends_run(chars, start + len)).then_some(len)
        })
    }

    fn ends_run(&self, chars: &[char], end: usize) -> bool {
        match (chars.get(end).copied(), chars.get(end + 1).copied()) {
            (None, _) => true,
            (Some(c), _) if c.is_ascii_digit() => true,
            (Some('s'), next) => next.is_none_or(|n| !n.is_ascii_lowercase()),
            (Some(c), Some(n)) if c.is_ascii_uppercase() && n.is_ascii_lowercase() => true,
            (Some(c), _) if c.is_ascii_uppercase() => self.run_at(chars, end).is_some(),
            _ => false,
        }
    }
}

/// Plain PascalCase/camelCase check: letters and digits only, starting with a
/// letter, no two consecutive capitals except a single trailing one.
pub fn is_pas_camel(token: &str) -> bool {
    PAS_CAMEL_RE.is_match(token)
}

/// Split an identifier into words at separators, case changes and
/// letter/digit boundaries: `getUserIDs2` -> `get`, `User`, `IDs`, `2`.
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in text.split(|c: char| !c.is_ascii_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
                let next = chars.get(i + 1).copied();
                let boundary = (prev.is_ascii_lowercase() && c.is_ascii_uppercase())
                    || (prev.is_ascii_digit() != c.is_ascii_digit())
                    || (prev.is_ascii_uppercase()
                        && c.is_ascii_uppercase()
                        && next.is_some_and(|n| n.is_ascii_lowercase())
                        && !is_plural_suffix(&chars, i));
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

// `IDs` keeps its plural `s` rather than splitting into `I` + `Ds`.
fn is_plural_suffix(chars: &[char], i: usize) -> bool {
    chars.get(i + 1) == Some(&'s') && chars.get(i + 2).is_none_or(|c| !c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;

    fn classifier() -> CaseClassifier {
        CaseClassifier::new(&Vocabulary::default().abbreviations)
    }

    #[test]
    fn test_plain_casing() {
        assert!(is_pas_camel("userName"));
        assert!(is_pas_camel("UserName"));
        assert!(is_pas_camel("v2Users"));
        assert!(is_pas_camel("a"));
        assert!(!is_pas_camel("user_name"));
        assert!(!is_pas_camel("user-name"));
        assert!(!is_pas_camel("2fa"));
        assert!(!is_pas_camel(""));
    }

    #[test]
    fn test_abbreviations_accepted() {
        let c = classifier();
        for token in ["StreamIO", "deviceSN", "deviceID", "pathASNs", "dscpCP", "awsVPC"] {
            assert!(c.is_acceptable(token), "{} should be accepted", token);
        }
    }

    #[test]
    fn test_rejected_tokens() {
        let c = classifier();
        for token in ["snake_case", "THISISALLCAPS", "My-Name", "30DaysCount"] {
            assert!(!c.is_acceptable(token), "{} should be rejected", token);
        }
    }

    #[test]
    fn test_abbreviations_only_strip_whole_runs() {
        let c = classifier();
        for token in ["IOError", "deviceIDList", "awsVPCID", "deviceSNs", "userID2"] {
            assert!(c.is_acceptable(token), "{} should be accepted", token);
        }
        for token in ["SNMP", "CPUUsage", "IDentity", "IOstream", "myASNX"] {
            assert!(!c.is_acceptable(token), "{} should be rejected", token);
        }
    }

    #[test]
    fn test_classifier_does_not_touch_lowercase_runs() {
        let c = classifier();
        // "id" in lowercase is an ordinary word
        assert!(c.is_acceptable("videoId"));
        assert!(!c.is_acceptable("video_id"));
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("getUserIDs2"), vec!["get", "User", "IDs", "2"]);
        assert_eq!(split_words("createdAt"), vec!["created", "At"]);
        assert_eq!(split_words("IDList"), vec!["ID", "List"]);
        assert_eq!(split_words("user-list_v2"), vec!["user", "list", "v", "2"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
        assert!(split_words("").is_empty());
    }
}
