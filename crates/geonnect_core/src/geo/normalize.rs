//! Diacritic folding for address text.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Removes diacritical marks from `text` while preserving case, word
/// boundaries and every character that carries no mark.
///
/// Decomposes to NFD, drops combining marks, then recomposes to NFC so
/// scripts whose decomposition is not base+mark (e.g. Hangul) come back
/// unchanged. Total and idempotent; "São Paulo" becomes "Sao Paulo".
pub fn fold_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

#[cfg(test)]
mod tests {
    use super::fold_diacritics;

    #[test]
    fn strips_latin_diacritics() {
        assert_eq!(fold_diacritics("São Paulo"), "Sao Paulo");
        assert_eq!(fold_diacritics("Conceição"), "Conceicao");
        assert_eq!(fold_diacritics("Brasília"), "Brasilia");
    }

    #[test]
    fn preserves_unmarked_text() {
        assert_eq!(fold_diacritics("Av. Paulista, 1000"), "Av. Paulista, 1000");
    }

    #[test]
    fn preserves_case() {
        assert_eq!(fold_diacritics("ÀGUA"), "AGUA");
    }

    #[test]
    fn is_idempotent() {
        let once = fold_diacritics("Überlândia, Goiânia");
        assert_eq!(fold_diacritics(&once), once);
    }
}
