//! Query normalization and French phonetic coding.
//!
//! The engine consumes normalization through the [`Normalizer`] trait and
//! ships [`FrenchNormalizer`] as the default implementation. Three forms
//! are produced from raw user input:
//!
//! - `normalize_query` — the *original* form: trimmed, lowercased,
//!   whitespace collapsed, accents preserved.
//! - `clean_user_query` — the *cleaned* form: accents folded, ligatures
//!   expanded, every non-alphanumeric run replaced by a single space.
//! - `soundex_fr` — one French-adapted Soundex code per cleaned word,
//!   space-separated.
//!
//! The Soundex variant strips a single silent final consonant (t, d, x —
//! "bordeaux" and "bordot" both code to `B630`) before applying the
//! classic letter groups. The engine treats the codes as opaque tokens.

use std::sync::LazyLock;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Pure text-normalization interface consumed by the engine.
///
/// Implementations must be deterministic: the result cache and the
/// reply-determinism guarantee both assume equal inputs produce equal
/// forms.
pub trait Normalizer: Send + Sync {
    /// Lowercased, whitespace-collapsed form with accents preserved.
    fn normalize_query(&self, raw: &str) -> String;

    /// Accent-folded, punctuation-stripped matching form.
    fn clean_user_query(&self, raw: &str) -> String;

    /// Space-separated French phonetic codes, possibly empty.
    fn soundex_fr(&self, raw: &str) -> String;
}

/// Non-alphanumeric runs (post-folding the text is ASCII lowercase).
static NON_ALNUM: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[^a-z0-9]+").expect("static pattern compiles"));

/// Default normalizer for French establishment names.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrenchNormalizer;

impl Normalizer for FrenchNormalizer {
    fn normalize_query(&self, raw: &str) -> String {
        raw.trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn clean_user_query(&self, raw: &str) -> String {
        let folded = fold_accents(&raw.to_lowercase());
        NON_ALNUM
            .replace_all(&folded, " ")
            .trim()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn soundex_fr(&self, raw: &str) -> String {
        self.clean_user_query(raw)
            .split_whitespace()
            .filter_map(soundex_word)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Strip combining marks after NFD decomposition and expand the French
/// ligatures that do not decompose ("œ", "æ").
fn fold_accents(value: &str) -> String {
    value
        .chars()
        .flat_map(|c| match c {
            'œ' | 'Œ' => vec!['o', 'e'],
            'æ' | 'Æ' => vec!['a', 'e'],
            other => vec![other],
        })
        .collect::<String>()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Classic Soundex letter groups.
const fn soundex_digit(c: char) -> u8 {
    match c {
        'b' | 'f' | 'p' | 'v' => 1,
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => 2,
        'd' | 't' => 3,
        'l' => 4,
        'm' | 'n' => 5,
        'r' => 6,
        _ => 0,
    }
}

/// Encode a single cleaned word. Returns `None` when the word carries no
/// ASCII letter (pure digits are skipped — codes for them are noise).
fn soundex_word(word: &str) -> Option<String> {
    let mut letters: Vec<char> = word.chars().filter(char::is_ascii_lowercase).collect();
    let first = *letters.first()?;

    // French silent finals: "bordot" → "bordo", "bordeaux" → "bordeau".
    // Final s is kept (it separates codes too aggressively on plurals).
    if letters.len() > 2 && matches!(letters.last().copied(), Some('t' | 'd' | 'x')) {
        letters.pop();
    }

    let mut code = String::with_capacity(4);
    code.push(first.to_ascii_uppercase());
    let mut last_digit = soundex_digit(first);

    for &c in &letters[1..] {
        // h and w are transparent: they neither emit nor break adjacency
        if matches!(c, 'h' | 'w') {
            continue;
        }
        let digit = soundex_digit(c);
        if digit == 0 {
            last_digit = 0;
            continue;
        }
        if digit != last_digit {
            code.push(char::from(b'0' + digit));
            if code.len() == 4 {
                break;
            }
        }
        last_digit = digit;
    }

    while code.len() < 4 {
        code.push('0');
    }
    Some(code)
}
