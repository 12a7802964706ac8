//! Text utilities: word counting, mention matching, filename slugs.

/// Count words in mixed-script prose.
///
/// CJK ideographs, kana and hangul syllables count one word each. Any other
/// run of alphanumeric characters counts as one word; apostrophes and hyphens
/// inside a run do not split it.
pub fn count_words(text: &str) -> i64 {
    let mut count = 0i64;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() {
            if !in_word {
                count += 1;
                in_word = true;
            }
        } else if in_word && matches!(c, '\'' | '-' | '\u{2019}') {
            // Joined forms like "don't" and "well-known" stay one word.
        } else {
            in_word = false;
        }
    }

    count
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF      // hiragana, katakana
        | 0x3400..=0x4DBF    // CJK extension A
        | 0x4E00..=0x9FFF    // CJK unified ideographs
        | 0xAC00..=0xD7AF    // hangul syllables
        | 0xF900..=0xFAFF    // CJK compatibility ideographs
        | 0x20000..=0x2A6DF  // CJK extension B
    )
}

/// Case-insensitive containment check used for outline mentions.
///
/// Needles shorter than two characters never match; single letters produce
/// nothing but noise.
pub fn mentions(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.chars().count() < 2 {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Turn a title into a filesystem-safe slug. Falls back to `untitled`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;

    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_latin_words() {
        assert_eq!(count_words("Hello, world!"), 2);
        assert_eq!(count_words("  The   rain\nfell.  "), 3);
    }

    #[test]
    fn joined_forms_are_one_word() {
        assert_eq!(count_words("don't stop"), 2);
        assert_eq!(count_words("a well-known fact"), 3);
        assert_eq!(count_words("it\u{2019}s late"), 2);
    }

    #[test]
    fn cjk_characters_count_individually() {
        assert_eq!(count_words("我们走吧"), 4);
        assert_eq!(count_words("Lin说hello"), 3);
        assert_eq!(count_words("カタカナ"), 4);
    }

    #[test]
    fn punctuation_only_is_zero() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("— - ... !!"), 0);
    }

    #[test]
    fn digits_count_as_words() {
        assert_eq!(count_words("Chapter 12 begins"), 3);
    }

    #[test]
    fn mentions_is_case_insensitive() {
        assert!(mentions("Lin Feng meets the ELDER at dawn", "elder"));
        assert!(mentions("林风在山门前等待", "林风"));
        assert!(!mentions("nothing here", "Elder"));
    }

    #[test]
    fn short_needles_never_match() {
        assert!(!mentions("a b c", "a"));
        assert!(!mentions("anything", "   "));
    }

    #[test]
    fn slugify_titles() {
        assert_eq!(slugify("The Long Night"), "the-long-night");
        assert_eq!(slugify("  Chapter 3: Ashes!  "), "chapter-3-ashes");
        assert_eq!(slugify("???"), "untitled");
        assert_eq!(slugify("第一章"), "第一章");
    }
}
