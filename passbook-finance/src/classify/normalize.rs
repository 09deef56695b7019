//! Narration cleanup: footer stripping, whitespace collapse, tokenisation.
//!
//! PDF extraction glues account metadata (branch address, customer id, page
//! footers) onto the last narration of a page. Left in, it poisons merchant
//! lookup, so anything after a footer marker is dropped.

/// Phrases that start statement boilerplate.
const FOOTER_MARKERS: &[&str] = &[
    "STATEMENT SUMMARY",
    "OPENING BALANCE",
    "CLOSING BALANCE",
    "GENERATED ON",
    "PAGE NO",
    "PAGE NUMBER",
    "THIS IS A COMPUTER GENERATED",
    "REGISTERED OFFICE",
    "ACCOUNT BRANCH",
    "BRANCH ADDRESS",
    "STATEMENT OF ACCOUNT",
    "STATEMENT FROM",
    "CUSTOMER ADDRESS",
    "NOMINATION",
];

/// Account-detail tokens that confirm an early footer marker is boilerplate.
const ACCOUNT_DETAIL_TOKENS: &[&str] = &[
    "ACCOUNT NO",
    "A/C NO",
    "CUST ID",
    "CUSTOMER ID",
    "IFSC",
    "MICR",
    "BRANCH CODE",
    "PHONE NO",
    "EMAIL",
];

/// Markers appearing before this offset are only honoured when followed by
/// account details.
const FOOTER_MIN_OFFSET: usize = 200;
const ACCOUNT_DETAIL_WINDOW: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedNarration {
    /// Uppercased, footer-stripped, whitespace-collapsed; punctuation kept
    pub upper: String,
    /// `upper` with everything but alphanumerics and dashes blanked out
    pub cleaned: String,
    /// Tokens of `cleaned` split on `/ - _` and whitespace, length >= 2
    pub tokens: Vec<String>,
}

impl NormalizedNarration {
    pub fn has_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Phrase match on word boundaries (space, dash, start/end).
    pub fn has_phrase(&self, phrase: &str) -> bool {
        contains_bounded(&self.cleaned, phrase)
    }

    /// Keyword/alias matching discipline shared by the rule tables:
    /// short single words (<= 4 chars) need an exact token, short phrases a
    /// bounded match, anything longer may match as a substring.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        if keyword.len() <= 4 {
            if keyword.contains(' ') || keyword.contains('-') {
                return self.has_phrase(keyword);
            }
            return self.has_token(keyword);
        }
        self.cleaned.contains(keyword)
    }

    /// Same as [`matches_keyword`] but also tries the punctuation-preserving text,
    /// for keywords like `INT.PD` or `@YBL`.
    pub fn matches_raw(&self, needle: &str) -> bool {
        self.upper.contains(needle) || self.matches_keyword(needle)
    }

    /// First `max_words` words / `max_chars` chars of the cleaned text.
    pub fn truncated(&self, max_words: usize, max_chars: usize) -> String {
        truncate_words(&self.cleaned, max_words, max_chars)
    }
}

pub fn normalize(narration: &str) -> NormalizedNarration {
    let upper = collapse_whitespace(&strip_footer(&narration.to_uppercase()));

    let cleaned: String = upper
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { ' ' })
        .collect();
    let cleaned = collapse_whitespace(&cleaned);

    let tokens = cleaned
        .split(|c: char| c == '/' || c == '-' || c == '_' || c.is_whitespace())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect();

    NormalizedNarration {
        upper,
        cleaned,
        tokens,
    }
}

fn strip_footer(upper: &str) -> String {
    let mut cut = upper.len();
    for marker in FOOTER_MARKERS {
        let Some(pos) = upper.find(marker) else {
            continue;
        };
        if pos >= cut {
            continue;
        }
        if pos > FOOTER_MIN_OFFSET || followed_by_account_details(&upper[pos..]) {
            cut = pos;
        }
    }
    upper[..cut].to_string()
}

fn followed_by_account_details(tail: &str) -> bool {
    let end = floor_char_boundary(tail, ACCOUNT_DETAIL_WINDOW);
    let window = &tail[..end];
    ACCOUNT_DETAIL_TOKENS.iter().any(|t| window.contains(t))
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn truncate_words(s: &str, max_words: usize, max_chars: usize) -> String {
    let words: Vec<&str> = s.split_whitespace().take(max_words).collect();
    let joined = words.join(" ");
    if joined.chars().count() <= max_chars {
        return joined;
    }
    joined.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Bounded substring match: the hit must sit between string edges, spaces or dashes.
pub fn contains_bounded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let is_boundary = |c: Option<char>| c.is_none_or(|c| c == ' ' || c == '-');
    let mut start = 0;
    while let Some(found) = haystack[start..].find(needle) {
        let at = start + found;
        let end = at + needle.len();
        let before = haystack[..at].chars().next_back();
        let after = haystack[end..].chars().next();
        if is_boundary(before) && is_boundary(after) {
            return true;
        }
        start = at + haystack[at..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizes_on_separators() {
        let n = normalize("UPI-RAHUL SHARMA-rahul@ybl-REF 223344556677");
        assert_eq!(n.upper, "UPI-RAHUL SHARMA-RAHUL@YBL-REF 223344556677");
        assert_eq!(n.cleaned, "UPI-RAHUL SHARMA-RAHUL YBL-REF 223344556677");
        assert_eq!(
            n.tokens,
            vec!["UPI", "RAHUL", "SHARMA", "RAHUL", "YBL", "REF", "223344556677"]
        );
    }

    #[test]
    fn test_drops_single_char_tokens_and_collapses_newlines() {
        let n = normalize("ACH D-\n  STAFF   LOAN EMI");
        assert_eq!(n.cleaned, "ACH D- STAFF LOAN EMI");
        assert!(!n.tokens.iter().any(|t| t == "D"));
        assert!(n.has_token("ACH"));
    }

    #[test]
    fn test_strips_late_footer() {
        let body = "POS 4598XXXXXX1234 AMAZON PAY INDIA ".repeat(7);
        let narration = format!("{body}STATEMENT SUMMARY Opening Balance 1000.00");
        let n = normalize(&narration);
        assert!(!n.upper.contains("STATEMENT SUMMARY"));
        assert!(n.upper.contains("AMAZON PAY"));
    }

    #[test]
    fn test_strips_early_footer_only_with_account_details() {
        let n = normalize("NEFT-ACME LTD REGISTERED OFFICE: MUMBAI CUST ID 12345 IFSC HDFC0000001");
        assert_eq!(n.upper, "NEFT-ACME LTD");

        let kept = normalize("PAYMENT TO REGISTERED OFFICE SUPPLIES");
        assert!(kept.upper.contains("REGISTERED OFFICE"));
    }

    #[test]
    fn test_short_alias_needs_word_boundary() {
        let n = normalize("UPI-MICHELLE DSOUZA-michelle@okaxis");
        assert!(!n.matches_keyword("EL"));
        assert!(!n.has_phrase("ELLE D"));
        let n = normalize("BILLPAY-EL-MSEDCL");
        assert!(n.matches_keyword("EL"));
    }

    #[test]
    fn test_truncated() {
        let n = normalize("ONE TWO THREE FOUR FIVE SIX SEVEN");
        assert_eq!(n.truncated(5, 60), "ONE TWO THREE FOUR FIVE");
        assert_eq!(truncate_words("ABCDEFGHIJ KLMNOP", 5, 8), "ABCDEFGH");
    }
}
