//! Porter stemming algorithm implementation.
//!
//! The Porter stemmer applies a series of rewrite rules in five steps:
//! 1. Plurals and -ed/-ing suffixes
//! 2. -ational → -ate, -tional → -tion, etc.
//! 3. -icate → -ic, -ative → "", etc.
//! 4. Remove -al, -ance, -ence, etc.
//! 5. Remove final -e and -ll
//!
//! Words containing non-ASCII characters are only lowercased.
//!
//! # Examples
//!
//! ```
//! use mapsearch::analysis::token_filter::stem::Stemmer;
//! use mapsearch::analysis::token_filter::stem::porter::PorterStemmer;
//!
//! let stemmer = PorterStemmer::new();
//!
//! assert_eq!(stemmer.stem("running"), "run");
//! assert_eq!(stemmer.stem("flies"), "fli");
//! assert_eq!(stemmer.stem("traditional"), "tradit");
//! ```

use crate::analysis::token_filter::stem::Stemmer;

/// Porter stemming algorithm over lowercase ASCII words.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }
}

/// Check if the byte at `pos` acts as a vowel.
fn is_vowel(word: &[u8], pos: usize) -> bool {
    match word.get(pos) {
        Some(b'a' | b'e' | b'i' | b'o' | b'u') => true,
        Some(b'y') if pos > 0 => !is_vowel(word, pos - 1),
        _ => false,
    }
}

/// Number of vowel-consonant sequences in the word.
fn measure(word: &[u8]) -> usize {
    let n = word.len();
    let mut m = 0;
    let mut i = 0;

    while i < n && !is_vowel(word, i) {
        i += 1;
    }

    while i < n {
        while i < n && is_vowel(word, i) {
            i += 1;
        }
        if i >= n {
            break;
        }
        m += 1;
        while i < n && !is_vowel(word, i) {
            i += 1;
        }
    }

    m
}

fn contains_vowel(word: &[u8]) -> bool {
    (0..word.len()).any(|i| is_vowel(word, i))
}

fn ends_with_double_consonant(word: &[u8]) -> bool {
    let len = word.len();
    len >= 2 && word[len - 1] == word[len - 2] && !is_vowel(word, len - 1)
}

/// consonant-vowel-consonant, where the final consonant is not w, x or y.
fn ends_cvc(word: &[u8]) -> bool {
    let len = word.len();
    len >= 3
        && !is_vowel(word, len - 3)
        && is_vowel(word, len - 2)
        && !is_vowel(word, len - 1)
        && !matches!(word[len - 1], b'w' | b'x' | b'y')
}

/// Strip `suffix` from `word`. Callers check `ends_with` first.
fn stem_of<'a>(word: &'a str, suffix: &str) -> &'a str {
    &word[..word.len() - suffix.len()]
}

fn replace_suffix(word: &str, old_suffix: &str, new_suffix: &str, min_measure: usize) -> String {
    if word.ends_with(old_suffix) {
        let stem = stem_of(word, old_suffix);
        if measure(stem.as_bytes()) >= min_measure {
            return format!("{stem}{new_suffix}");
        }
    }
    word.to_string()
}

fn step1a(word: &str) -> String {
    if word.ends_with("sses") {
        format!("{}ss", stem_of(word, "sses"))
    } else if word.ends_with("ies") {
        format!("{}i", stem_of(word, "ies"))
    } else if word.ends_with("ss") {
        word.to_string()
    } else if word.ends_with('s') && word.len() > 1 {
        stem_of(word, "s").to_string()
    } else {
        word.to_string()
    }
}

fn step1b(word: &str) -> String {
    let stripped = if word.ends_with("eed") {
        replace_suffix(word, "eed", "ee", 1)
    } else if let Some(suffix) = ["ed", "ing"].into_iter().find(|s| word.ends_with(s)) {
        let stem = stem_of(word, suffix);
        if contains_vowel(stem.as_bytes()) {
            stem.to_string()
        } else {
            word.to_string()
        }
    } else {
        word.to_string()
    };

    if stripped == word {
        return stripped;
    }

    let bytes = stripped.as_bytes();
    if stripped.ends_with("at") || stripped.ends_with("bl") || stripped.ends_with("iz") {
        format!("{stripped}e")
    } else if ends_with_double_consonant(bytes) && !matches!(bytes[bytes.len() - 1], b'l' | b's' | b'z')
    {
        stripped[..stripped.len() - 1].to_string()
    } else if measure(bytes) == 1 && ends_cvc(bytes) {
        format!("{stripped}e")
    } else {
        stripped
    }
}

fn step2(word: &str) -> String {
    const SUFFIXES: &[(&str, &str)] = &[
        ("ational", "ate"),
        ("tional", "tion"),
        ("enci", "ence"),
        ("anci", "ance"),
        ("izer", "ize"),
        ("abli", "able"),
        ("alli", "al"),
        ("entli", "ent"),
        ("eli", "e"),
        ("ousli", "ous"),
        ("ization", "ize"),
        ("ation", "ate"),
        ("ator", "ate"),
        ("alism", "al"),
        ("iveness", "ive"),
        ("fulness", "ful"),
        ("ousness", "ous"),
        ("aliti", "al"),
        ("iviti", "ive"),
        ("biliti", "ble"),
    ];

    SUFFIXES
        .iter()
        .find(|(old, _)| word.ends_with(old))
        .map(|(old, new)| replace_suffix(word, old, new, 1))
        .unwrap_or_else(|| word.to_string())
}

fn step3(word: &str) -> String {
    const SUFFIXES: &[(&str, &str)] = &[
        ("icate", "ic"),
        ("ative", ""),
        ("alize", "al"),
        ("iciti", "ic"),
        ("ical", "ic"),
        ("ful", ""),
        ("ness", ""),
    ];

    SUFFIXES
        .iter()
        .find(|(old, _)| word.ends_with(old))
        .map(|(old, new)| replace_suffix(word, old, new, 1))
        .unwrap_or_else(|| word.to_string())
}

fn step4(word: &str) -> String {
    const SUFFIXES: &[&str] = &[
        "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion",
        "ou", "ism", "ate", "iti", "ous", "ive", "ize",
    ];

    for suffix in SUFFIXES {
        if !word.ends_with(suffix) {
            continue;
        }
        let stem = stem_of(word, suffix);
        if measure(stem.as_bytes()) > 1
            && (*suffix != "ion" || stem.ends_with('s') || stem.ends_with('t'))
        {
            return stem.to_string();
        }
    }

    word.to_string()
}

fn step5(word: &str) -> String {
    let word = match word.strip_suffix('e') {
        Some(stem) => {
            let m = measure(stem.as_bytes());
            if m > 1 || (m == 1 && !ends_cvc(stem.as_bytes())) {
                stem.to_string()
            } else {
                word.to_string()
            }
        }
        None => word.to_string(),
    };

    if word.ends_with("ll") && measure(word.as_bytes()) > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let word = word.to_lowercase();
        if word.len() <= 2 || !word.is_ascii() {
            return word;
        }

        let word = step1a(&word);
        let word = step1b(&word);
        let word = step2(&word);
        let word = step3(&word);
        let word = step4(&word);
        step5(&word)
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}
