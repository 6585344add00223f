//! English stop words ignored when comparing keyword phrases

use ahash::AHashSet;

/// Function words that don't change what a keyword phrase means.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
    "of", "with", "by", "from", "as", "is", "was", "are", "were",
    "been", "be", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "must", "can", "shall",
    "that", "this", "these", "those", "i", "you", "he", "she", "it",
    "we", "they", "them", "their", "what", "which", "who", "when",
    "where", "why", "how", "all", "each", "every", "both", "few",
    "more", "most", "other", "some", "such", "only", "own", "same",
    "so", "than", "too", "very", "just", "about",
];

/// Build the stop-word set, extended with caller-supplied words.
///
/// Extra words are lowercased and trimmed so they compare against cleaned
/// tokens.
pub fn stop_word_set<I, S>(extra: I) -> AHashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set: AHashSet<String> = STOP_WORDS.iter().map(|w| (*w).to_string()).collect();
    for word in extra {
        let word = word.as_ref().trim().to_lowercase();
        if !word.is_empty() {
            set.insert(word);
        }
    }
    set
}
