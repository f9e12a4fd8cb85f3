use triage_core::tokenizer::{tokenize, AnalyzerConfig};

#[test]
fn it_normalizes_and_stems_when_asked() {
    let cfg = AnalyzerConfig { nfkc: true, stop_words: false, stem: true };
    let words = tokenize("Running Runners RUN! The ﬁle menu.", &cfg);
    assert!(words.contains(&"run".to_string()));
    // NFKC expands the "ﬁ" ligature
    assert!(words.contains(&"file".to_string()));
}

#[test]
fn it_filters_stopwords_when_asked() {
    let cfg = AnalyzerConfig { stop_words: true, ..Default::default() };
    let words = tokenize("The quick brown fox and the lazy dog", &cfg);
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"fox".to_string()));
}

#[test]
fn default_analysis_keeps_stopwords_and_surface_forms() {
    let words = tokenize("The servers were Running", &AnalyzerConfig::default());
    assert_eq!(words, vec!["the", "servers", "were", "running"]);
}
