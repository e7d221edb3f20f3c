//! Case-insensitive keyword matching for note and action keywords.

/// An ordered list of keywords matched first-match-wins against
/// ASCII case-folded text.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
    folded: Vec<String>,
}

/// A keyword occurrence inside a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch<'a> {
    /// The keyword as configured.
    pub keyword: &'a str,
    /// The keyword as written in the text.
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl KeywordMatcher {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        let folded = keywords.iter().map(|k| k.to_ascii_lowercase()).collect();
        Self { keywords, folded }
    }

    pub fn first(&self) -> Option<&str> {
        self.keywords.first().map(String::as_str)
    }

    /// Match a keyword at the start of `text`.
    ///
    /// The keyword must be followed by the end of text or a non-word character.
    pub fn match_prefix<'a>(&'a self, text: &'a str) -> Option<KeywordMatch<'a>> {
        let folded = text.to_ascii_lowercase();
        self.folded.iter().enumerate().find_map(|(i, keyword)| {
            let end = keyword.len();
            (folded.starts_with(keyword.as_str()) && is_boundary(text, end)).then(|| {
                KeywordMatch {
                    keyword: &self.keywords[i],
                    text: &text[..end],
                    start: 0,
                    end,
                }
            })
        })
    }

    /// Find every whole-word keyword occurrence in `text`, in text order.
    ///
    /// Where several keywords match at the same position the first configured
    /// one wins.
    pub fn find_all<'a>(&'a self, text: &'a str) -> Vec<KeywordMatch<'a>> {
        let folded = text.to_ascii_lowercase();
        let mut found = Vec::new();
        let mut pos = 0;

        while pos < folded.len() {
            if !folded.is_char_boundary(pos) || !is_start_boundary(text, pos) {
                pos += 1;
                continue;
            }

            let rest = &folded[pos..];
            let hit = self.folded.iter().enumerate().find(|(_, keyword)| {
                rest.starts_with(keyword.as_str()) && is_boundary(text, pos + keyword.len())
            });

            match hit {
                Some((i, keyword)) => {
                    let end = pos + keyword.len();
                    found.push(KeywordMatch {
                        keyword: &self.keywords[i],
                        text: &text[pos..end],
                        start: pos,
                        end,
                    });
                    pos = end;
                }
                None => pos += 1,
            }
        }

        found
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_boundary(text: &str, end: usize) -> bool {
    text.as_bytes().get(end).is_none_or(|b| !is_word_byte(*b))
}

fn is_start_boundary(text: &str, start: usize) -> bool {
    start == 0 || !is_word_byte(text.as_bytes()[start - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        let matcher = KeywordMatcher::new(["BREAKING CHANGE", "BREAKING-CHANGE"]);
        let hit = matcher.match_prefix("breaking change: drop v1 api").unwrap();
        assert_eq!(hit.keyword, "BREAKING CHANGE");
        assert_eq!(hit.text, "breaking change");
    }

    #[test]
    fn test_prefix_requires_word_boundary() {
        let matcher = KeywordMatcher::new(["fix"]);
        assert!(matcher.match_prefix("fixture update").is_none());
        assert!(matcher.match_prefix("Fix #3").is_some());
    }

    #[test]
    fn test_first_configured_keyword_wins() {
        let matcher = KeywordMatcher::new(["close", "closes"]);
        // "close" is not a whole word inside "closes", so the second keyword matches.
        let hits = matcher.find_all("Closes #1");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].keyword, "closes");
    }

    #[test]
    fn test_find_all_reports_positions() {
        let matcher = KeywordMatcher::new(["fixes", "closes"]);
        let line = "Fixes #1, closes #2";
        let hits = matcher.find_all(line);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "Fixes");
        assert_eq!(hits[1].start, 10);
        assert_eq!(&line[hits[1].start..hits[1].end], "closes");
    }

    #[test]
    fn test_find_all_skips_embedded_words() {
        let matcher = KeywordMatcher::new(["fix"]);
        assert!(matcher.find_all("prefix suffix").is_empty());
    }
}
