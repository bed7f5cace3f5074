use icu_normalizer::ComposingNormalizerBorrowed;

const NBSP: char = '\u{00A0}';
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// Canonical form used for character-accuracy comparison.
///
/// Text is NFC-composed, CRLF/CR line breaks become `\n`, tabs and the Unicode
/// space separators become a plain space, and only the leading/trailing
/// whitespace is trimmed. Internal whitespace runs are left alone so that
/// positional comparison still sees every typed space.
pub fn for_comparison(text: &str) -> String {
    let composed = nfc(text);
    let mut out = String::with_capacity(composed.len());
    let mut chars = composed.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\u{2028}' | '\u{2029}' | '\u{0085}' => out.push('\n'),
            ch if is_space_variant(ch) => out.push(' '),
            ch => out.push(ch),
        }
    }
    out.trim().to_string()
}

/// Canonical form used for time-attack exact-match detection: the comparison
/// form with every internal whitespace run collapsed to a single space.
pub fn for_exact_match(text: &str) -> String {
    split_words(&for_comparison(text)).collect::<Vec<_>>().join(" ")
}

pub fn nfc(text: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(text)
        .to_string()
}

pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

pub fn word_count(text: &str) -> usize {
    split_words(text).count()
}

fn is_space_variant(ch: char) -> bool {
    matches!(ch, '\t' | NBSP | IDEOGRAPHIC_SPACE | '\u{202F}' | '\u{205F}' | '\u{1680}')
        || ('\u{2000}'..='\u{200A}').contains(&ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_only_outer_whitespace() {
        assert_eq!(for_comparison("  a  b \n"), "a  b");
    }

    #[test]
    fn test_space_variants_fold_to_space() {
        assert_eq!(for_comparison("a\tb\u{00A0}c\u{3000}d"), "a b c d");
    }

    #[test]
    fn test_line_breaks_fold_to_newline() {
        assert_eq!(for_comparison("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_nfc_composes_combining_marks() {
        // "e" + COMBINING ACUTE ACCENT composes to U+00E9
        assert_eq!(for_comparison("cafe\u{0301}"), "caf\u{00E9}");
        assert_eq!(for_comparison("caf\u{00E9}").chars().count(), 4);
    }

    #[test]
    fn test_exact_match_collapses_internal_runs() {
        assert_eq!(for_exact_match("  the   cat\n sat "), "the cat sat");
    }

    #[test]
    fn test_word_count_ignores_empty_tokens() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count(" The  cat\tsat. "), 3);
    }
}
