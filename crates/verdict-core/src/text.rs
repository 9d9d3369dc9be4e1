//! Text cleaning shared by training and serving
//!
//! Features are only comparable when the trainer and the server clean text
//! identically, so both go through [`clean_text`].

use std::collections::HashSet;
use std::sync::OnceLock;

/// English stopword list (NLTK corpus, 179 entries)
pub const ENGLISH_STOPWORDS: [&str; 179] = [
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

fn stopwords() -> &'static HashSet<&'static str> {
    static STOPWORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOPWORDS.get_or_init(|| ENGLISH_STOPWORDS.iter().copied().collect())
}

/// Check whether a lowercase word is an English stopword
pub fn is_stopword(word: &str) -> bool {
    stopwords().contains(word)
}

/// Clean raw text into space-joined tokens.
///
/// Strips ASCII punctuation, splits on whitespace, lowercases each word and
/// drops stopwords.
///
/// ```
/// use verdict_core::text::clean_text;
///
/// assert_eq!(clean_text("Free!! WIN money now"), "free win money");
/// ```
pub fn clean_text(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !c.is_ascii_punctuation()).collect();

    stripped
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| !is_stopword(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokens of already-cleaned text
pub fn tokens(cleaned: &str) -> impl Iterator<Item = &str> {
    cleaned.split_whitespace()
}
