//! Rule-based lemmatization for English keyword tokens
//!
//! Deliberately shallow: it collapses plural/singular and possessive forms
//! and a narrow class of gerunds, and leaves every other token alone so
//! that unrelated words never end up with the same lemma.

use ahash::AHashMap;

/// Possessive-plural forms commonly typed without the apostrophe.
const IRREGULARS: &[(&str, &str)] = &[
    ("mens", "men"),
    ("womens", "women"),
    ("childrens", "children"),
];

/// Irregular plurals enabled by `NormalizerConfig::extended_irregulars`.
pub const EXTENDED_IRREGULARS: &[(&str, &str)] = &[
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("feet", "foot"),
    ("geese", "goose"),
];

/// Endings that take `es` in the plural (`boxes`, `dishes`).
const SIBILANT_ENDINGS: &[&str] = &["s", "x", "z", "ch", "sh"];

/// Lemmatizer with a configurable irregular-word table
#[derive(Debug, Clone)]
pub struct Lemmatizer {
    irregulars: AHashMap<String, String>,
}

impl Lemmatizer {
    /// Lemmatizer with only the built-in possessive irregulars
    pub fn new() -> Self {
        Self {
            irregulars: IRREGULARS
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        }
    }

    /// Add the extended irregular plural table (teeth, mice, feet, geese)
    pub fn with_extended_irregulars(mut self) -> Self {
        for (from, to) in EXTENDED_IRREGULARS {
            self.irregulars.insert((*from).to_string(), (*to).to_string());
        }
        self
    }

    /// Add a single irregular mapping; the token is matched after possessive
    /// stripping
    pub fn with_irregular(mut self, from: &str, to: &str) -> Self {
        self.irregulars
            .insert(from.trim().to_lowercase(), to.trim().to_lowercase());
        self
    }

    /// Number of irregular mappings in the table
    pub fn irregular_count(&self) -> usize {
        self.irregulars.len()
    }

    /// Lemmatize a single token
    ///
    /// Rules, in order:
    /// 1. Strip a trailing `'s` / `’s`; reduce a trailing `s'` / `s’` to `s`
    /// 2. Irregular table lookup (exact token match); a hit is final
    /// 3. Doubled-letter gerunds longer than six characters (`running` → `run`);
    ///    plural rules are skipped when this fires
    /// 4. First matching plural rule: `ies`→`y`, `ves`→`f`,
    ///    sibilant+`es`→sibilant, trailing `s` removed
    pub fn lemmatize(&self, word: &str) -> String {
        let lowered = word.trim().to_lowercase();
        let token = strip_possessive(&lowered);

        if let Some(lemma) = self.irregulars.get(&token) {
            return lemma.clone();
        }

        if let Some(stem) = strip_doubled_gerund(&token) {
            return stem;
        }

        apply_plural_rules(&token)
    }
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lemmatize a token with the default rule set
pub fn lemmatize_word(word: &str) -> String {
    Lemmatizer::new().lemmatize(word)
}

fn strip_possessive(token: &str) -> String {
    let mut token = token;
    for suffix in ["'s", "\u{2019}s"] {
        if let Some(stem) = token.strip_suffix(suffix) {
            token = stem;
            break;
        }
    }
    for suffix in ["s'", "s\u{2019}"] {
        if let Some(stem) = token.strip_suffix(suffix) {
            return format!("{}s", stem);
        }
    }
    token.to_string()
}

fn strip_doubled_gerund(token: &str) -> Option<String> {
    if !token.ends_with("ing") || token.chars().count() <= 6 {
        return None;
    }
    let base: Vec<char> = token[..token.len() - 3].chars().collect();
    let n = base.len();
    if n > 2 && base[n - 1] == base[n - 2] {
        Some(base[..n - 1].iter().collect())
    } else {
        None
    }
}

fn apply_plural_rules(token: &str) -> String {
    // A consonant+ies rule would be shadowed by this one, so it is folded in.
    if let Some(stem) = token.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    if let Some(stem) = token.strip_suffix("ves") {
        return format!("{}f", stem);
    }
    if let Some(stem) = token.strip_suffix("es") {
        if SIBILANT_ENDINGS.iter().any(|ending| stem.ends_with(ending)) {
            return stem.to_string();
        }
    }
    if let Some(stem) = token.strip_suffix('s') {
        return stem.to_string();
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_rules() {
        assert_eq!(lemmatize_word("cities"), "city");
        assert_eq!(lemmatize_word("puppies"), "puppy");
        assert_eq!(lemmatize_word("leaves"), "leaf");
        assert_eq!(lemmatize_word("boxes"), "box");
        assert_eq!(lemmatize_word("dishes"), "dish");
        assert_eq!(lemmatize_word("churches"), "church");
        assert_eq!(lemmatize_word("buzzes"), "buzz");
        assert_eq!(lemmatize_word("cats"), "cat");
        assert_eq!(lemmatize_word("treats"), "treat");
    }

    #[test]
    fn test_unchanged_tokens() {
        assert_eq!(lemmatize_word("dog"), "dog");
        assert_eq!(lemmatize_word("whitening"), "whitening");
        assert_eq!(lemmatize_word("whitener"), "whitener");
        assert_eq!(lemmatize_word("long"), "long");
    }

    #[test]
    fn test_possessives() {
        assert_eq!(lemmatize_word("men's"), "men");
        assert_eq!(lemmatize_word("dog\u{2019}s"), "dog");
        assert_eq!(lemmatize_word("boys'"), "boy");
        assert_eq!(lemmatize_word("women's"), "women");
    }

    #[test]
    fn test_builtin_irregulars() {
        assert_eq!(lemmatize_word("mens"), "men");
        assert_eq!(lemmatize_word("womens"), "women");
        assert_eq!(lemmatize_word("childrens"), "children");
        assert_eq!(lemmatize_word("men"), "men");
    }

    #[test]
    fn test_doubled_consonant_gerund() {
        assert_eq!(lemmatize_word("running"), "run");
        assert_eq!(lemmatize_word("swimming"), "swim");
        assert_eq!(lemmatize_word("shopping"), "shop");
    }

    #[test]
    fn test_gerund_rule_is_conservative() {
        // No doubled letter before "ing"
        assert_eq!(lemmatize_word("walking"), "walking");
        assert_eq!(lemmatize_word("whitening"), "whitening");
        // Six characters or fewer
        assert_eq!(lemmatize_word("sing"), "sing");
        assert_eq!(lemmatize_word("adding"), "adding");
        assert_eq!(lemmatize_word("bidding"), "bid");
    }

    #[test]
    fn test_teeth_and_mice_untouched_by_default() {
        assert_eq!(lemmatize_word("teeth"), "teeth");
        assert_eq!(lemmatize_word("mice"), "mice");
    }

    #[test]
    fn test_extended_irregulars() {
        let lemmatizer = Lemmatizer::new().with_extended_irregulars();
        assert_eq!(lemmatizer.lemmatize("teeth"), "tooth");
        assert_eq!(lemmatizer.lemmatize("mice"), "mouse");
        assert_eq!(lemmatizer.lemmatize("feet"), "foot");
        assert_eq!(lemmatizer.lemmatize("geese"), "goose");
        assert_eq!(lemmatizer.irregular_count(), 7);
    }

    #[test]
    fn test_custom_irregular() {
        let lemmatizer = Lemmatizer::new().with_irregular("Oxen", "ox");
        assert_eq!(lemmatizer.lemmatize("oxen"), "ox");
    }

    #[test]
    fn test_uppercase_input() {
        assert_eq!(lemmatize_word("BOXES"), "box");
    }
}
