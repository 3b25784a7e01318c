//! TTS text normalization — makes translated Japanese read naturally aloud.
//!
//! Pure functions, no I/O. Ported from `server/core/translation.py`'s
//! `postprocess_for_tts` in the original Python implementation.

use regex::Regex;
use std::sync::LazyLock;

// Compiled regexes — allocated once, reused across calls.
static RE_EXPLANATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)Explanation:.*").unwrap());
static RE_FRACTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)/(\d+)").unwrap());
static RE_DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d)\.(\d)").unwrap());
static RE_WAVE_DASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d)[〜～](\d)").unwrap());
static RE_PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d)[％%]").unwrap());
static RE_UPPER_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]{4,}").unwrap());
static RE_ASCII_THEN_JP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9])\s+([\p{Hiragana}\p{Katakana}\p{Han}])").unwrap());
static RE_JP_THEN_ASCII: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\p{Hiragana}\p{Katakana}\p{Han}])\s+([A-Za-z0-9])").unwrap());
static RE_LETTER_THEN_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z])\s+(\d)").unwrap());
static RE_DIGIT_THEN_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s+([A-Za-z])").unwrap());

/// Normalize translated Japanese text for better TTS pronunciation.
///
/// Applies rules in order (each documented in `spec.md` §4.4); idempotent on
/// its own output.
pub fn normalize(text: &str) -> String {
    let mut t = text.to_string();

    // 1. Drop any "Explanation:" prefix and everything after it.
    t = RE_EXPLANATION.replace(&t, "").into_owned();
    t = t.trim().to_string();

    // 2. Fractions: "1/2" -> "1分の2".
    t = RE_FRACTION.replace_all(&t, "${1}分の${2}").into_owned();

    // 3. Decimal point between digits -> "てん". The middle digit of a chained
    // run like "1.2.3" is shared between two candidate matches, so a single
    // replace_all pass only catches every other dot; repeat to a fixed point.
    t = replace_to_fixed_point(&RE_DECIMAL, &t, "${1}てん${2}");

    // 4. Wave dash between digits -> "から", same chained-run caveat as above.
    t = replace_to_fixed_point(&RE_WAVE_DASH, &t, "${1}から${2}");

    // 5. Percent sign following a digit -> "パーセント".
    t = RE_PERCENT.replace_all(&t, "${1}パーセント").into_owned();

    // 6. Remaining periods -> space.
    t = t.replace('.', " ");

    // 7. Hyphens and underscores -> space.
    t = t.replace('-', " ").replace('_', " ");

    // 8. Uppercase runs of >=4 letters -> title case ("HTTP" -> "Http").
    t = RE_UPPER_RUN
        .replace_all(&t, |caps: &regex::Captures| title_case(&caps[0]))
        .into_owned();

    // 9. Collapse whitespace between ASCII letter/digit and Japanese, both directions.
    t = RE_ASCII_THEN_JP.replace_all(&t, "$1$2").into_owned();
    t = RE_JP_THEN_ASCII.replace_all(&t, "$1$2").into_owned();

    // 10. Collapse whitespace between ASCII letter and ASCII digit, both directions.
    t = RE_LETTER_THEN_DIGIT.replace_all(&t, "$1$2").into_owned();
    t = RE_DIGIT_THEN_LETTER.replace_all(&t, "$1$2").into_owned();

    t
}

/// Apply a capturing replacement repeatedly until the text stops changing.
/// Needed for patterns whose middle digit can be shared between two
/// overlapping candidate matches (e.g. "1.2.3"), which a single
/// `replace_all` pass only resolves every other occurrence of.
fn replace_to_fixed_point(re: &Regex, text: &str, replacement: &str) -> String {
    let mut t = text.to_string();
    loop {
        let next = re.replace_all(&t, replacement).into_owned();
        if next == t {
            return t;
        }
        t = next;
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// A source text is pre-translated Japanese iff it starts with `『` and ends
/// with `』`. Markers are retained verbatim; the model is never called.
pub fn is_pre_translated(text: &str) -> bool {
    text.starts_with('『') && text.ends_with('』') && text.chars().count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_explanation_suffix() {
        let input = "バージョン3.2のリリース Explanation: version info";
        assert_eq!(normalize(input), "バージョン3てん2のリリース");
    }

    #[test]
    fn strips_explanation_case_insensitive() {
        assert_eq!(normalize("ok EXPLANATION: nope"), "ok");
    }

    #[test]
    fn fraction_to_bunno() {
        assert_eq!(normalize("1/2"), "1分の2");
    }

    #[test]
    fn decimal_to_ten() {
        assert_eq!(normalize("3.2"), "3てん2");
    }

    #[test]
    fn chained_decimals() {
        assert_eq!(normalize("1.2.3"), "1てん2てん3");
    }

    #[test]
    fn wave_dash_to_kara() {
        assert_eq!(normalize("1〜10"), "1から10");
        assert_eq!(normalize("50～100"), "50から100");
    }

    #[test]
    fn percent_halfwidth() {
        assert_eq!(normalize("50%"), "50パーセント");
    }

    #[test]
    fn percent_fullwidth() {
        assert_eq!(normalize("50％"), "50パーセント");
    }

    #[test]
    fn remaining_period_becomes_space() {
        assert_eq!(normalize("end. start"), "end  start");
    }

    #[test]
    fn hyphen_and_underscore_to_space() {
        assert_eq!(normalize("my-translator_tool"), "my translator tool");
    }

    #[test]
    fn uppercase_run_title_cased() {
        assert_eq!(normalize("HTTP error"), "Http error");
        assert_eq!(normalize("HTTPS"), "Https");
    }

    #[test]
    fn short_uppercase_run_untouched() {
        assert_eq!(normalize("USA"), "USA");
    }

    #[test]
    fn collapses_space_between_ascii_and_japanese() {
        assert_eq!(normalize("API 設定"), "API設定");
        assert_eq!(normalize("設定 API"), "設定API");
    }

    #[test]
    fn collapses_space_between_letter_and_digit() {
        assert_eq!(normalize("python 3"), "python3");
        assert_eq!(normalize("3 python"), "3python");
    }

    #[test]
    fn idempotent() {
        let cases = [
            "バージョン3.2のリリース Explanation: version info",
            "1/2 of 50% at 1〜10, HTTP-API_docs",
            "plain text unchanged",
        ];
        for case in cases {
            let once = normalize(case);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {case:?}");
        }
    }

    #[test]
    fn pre_translated_markers() {
        assert!(is_pre_translated("『サーバー準備完了。』"));
        assert!(!is_pre_translated("サーバー準備完了。"));
        assert!(!is_pre_translated("『missing end bracket"));
        assert!(!is_pre_translated("missing start bracket』"));
    }

    #[test]
    fn pre_translated_requires_two_chars() {
        assert!(!is_pre_translated("『"));
    }
}
