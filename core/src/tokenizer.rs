use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// How raw text is turned into terms. Stored with the fitted model so queries
/// are analysed the same way as the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Apply NFKC normalization before lowercasing.
    pub nfkc: bool,
    /// Drop English stopwords.
    pub stop_words: bool,
    /// Reduce terms to their English stem.
    pub stem: bool,
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Lowercase text and extract runs of two or more word characters, then apply
/// the optional normalization, stopword and stemming steps.
pub fn tokenize(text: &str, config: &AnalyzerConfig) -> Vec<String> {
    let normalized = if config.nfkc {
        text.nfkc().collect::<String>().to_lowercase()
    } else {
        text.to_lowercase()
    };
    let mut tokens = Vec::new();
    for mat in RE.find_iter(&normalized) {
        let token = mat.as_str();
        if config.stop_words && is_stopword(token) { continue; }
        if config.stem {
            tokens.push(STEMMER.stem(token).into_owned());
        } else {
            tokens.push(token.to_string());
        }
    }
    tokens
}
