use triage_core::{
    Dataset, IndexBuilder, IndexStore, MemoryStore, Retriever, RetrievalError, VectorizerConfig, DEFAULT_TOP_K,
};

fn csv_of(descriptions: &[&str]) -> String {
    let mut out = String::from("Id,Description\n");
    for (i, d) in descriptions.iter().enumerate() {
        out.push_str(&format!("{i},\"{d}\"\n"));
    }
    out
}

fn retriever_for(descriptions: &[&str]) -> Retriever {
    let store = MemoryStore::new();
    let dataset = Dataset::from_reader(csv_of(descriptions).as_bytes()).unwrap();
    IndexBuilder::default().build_dataset(dataset, &store).unwrap();
    Retriever::load(&store).unwrap()
}

#[test]
fn scenario_memory_leak_and_timeout() {
    let r = retriever_for(&["server crashed due to memory leak", "network timeout during deployment"]);
    let hits = r.query_scored("memory leak", 5);
    assert_eq!(hits[0].row, 0);
    assert_eq!(hits[0].description, "server crashed due to memory leak");
    let hits = r.query_scored("timeout", 5);
    assert_eq!(hits[0].row, 1);
    assert_eq!(r.query("timeout")[0], "network timeout during deployment");
}

#[test]
fn own_description_ranks_first() {
    let docs = [
        "disk full on primary database host",
        "certificate expired for public gateway",
        "memory leak in worker pool after upgrade",
        "dns resolution failures in staging",
        "queue backlog caused delayed invoices",
        "cache stampede after cold restart",
        "disk latency spikes on replica",
    ];
    let r = retriever_for(&docs);
    for (row, text) in docs.iter().enumerate() {
        let hits = r.query_scored(text, 5);
        assert_eq!(hits[0].row, row, "query {text:?}");
        assert!((hits[0].score - 1.0).abs() < 1e-4);
    }
}

#[test]
fn ties_keep_row_order() {
    let r = retriever_for(&["alpha", "alpha", "beta"]);
    let hits = r.query_scored("alpha", 5);
    let rows: Vec<usize> = hits.iter().map(|h| h.row).collect();
    assert_eq!(rows, vec![0, 1, 2]);
    assert_eq!(hits[0].score, hits[1].score);
    assert!(hits[1].score > hits[2].score);
}

#[test]
fn unknown_or_empty_query_returns_first_rows() {
    let r = retriever_for(&["aa", "bb", "cc", "dd", "ee", "ff", "gg"]);
    for q in ["", "zz yy", "!!"] {
        let hits = r.query_scored(q, DEFAULT_TOP_K);
        let rows: Vec<usize> = hits.iter().map(|h| h.row).collect();
        assert_eq!(rows, vec![0, 1, 2, 3, 4]);
        assert!(hits.iter().all(|h| h.score == 0.0));
    }
}

#[test]
fn returns_min_of_five_and_record_count() {
    for n in [0usize, 1, 3, 5, 6, 12] {
        let docs: Vec<String> = (0..n).map(|i| format!("incident number{i} shared words")).collect();
        let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
        let r = retriever_for(&refs);
        assert_eq!(r.query("shared words").len(), n.min(5));
    }
}

#[test]
fn repeated_queries_are_identical() {
    let r = retriever_for(&["alpha beta", "beta gamma", "gamma alpha", "delta", "alpha"]);
    let first = r.query_scored("alpha gamma", 5);
    for _ in 0..10 {
        assert_eq!(r.query_scored("alpha gamma", 5), first);
    }
}

#[test]
fn empty_dataset_yields_empty_results() {
    let store = MemoryStore::new();
    let dataset = Dataset::from_reader("Description\n".as_bytes()).unwrap();
    let meta = IndexBuilder::default().build_dataset(dataset, &store).unwrap();
    assert_eq!(meta.num_docs, 0);
    let r = Retriever::load(&store).unwrap();
    assert!(r.is_empty());
    assert!(r.query("anything").is_empty());
    assert_eq!(r.relevant_context("anything"), None);
}

#[test]
fn missing_description_column_leaves_store_untouched() {
    let store = MemoryStore::new();
    let dataset = Dataset::from_reader("Summary\nsomething\n".as_bytes()).unwrap();
    let err = IndexBuilder::default().build_dataset(dataset, &store).unwrap_err();
    assert!(matches!(err, RetrievalError::InputFormat(_)));
    assert!(matches!(store.get(), Err(RetrievalError::IndexNotFound { .. })));
}

#[test]
fn load_before_build_is_not_found() {
    let store = MemoryStore::new();
    assert!(matches!(Retriever::load(&store), Err(RetrievalError::IndexNotFound { .. })));
}

#[test]
fn missing_descriptions_are_indexed_as_empty() {
    let store = MemoryStore::new();
    let dataset = Dataset::from_reader("Id,Description\n1,\n2,memory leak\n3\n".as_bytes()).unwrap();
    IndexBuilder::default().build_dataset(dataset, &store).unwrap();
    let r = Retriever::load(&store).unwrap();
    assert_eq!(r.len(), 3);
    assert_eq!(r.query("leak"), vec!["memory leak", "", ""]);
}

#[test]
fn rebuild_replaces_previous_index() {
    let store = MemoryStore::new();
    let builder = IndexBuilder::default();
    builder.build_dataset(Dataset::from_reader(csv_of(&["old one", "old two"]).as_bytes()).unwrap(), &store).unwrap();
    builder.build_dataset(Dataset::from_reader(csv_of(&["fresh record"]).as_bytes()).unwrap(), &store).unwrap();
    let r = Retriever::load(&store).unwrap();
    assert_eq!(r.len(), 1);
    assert_eq!(r.query("old"), vec!["fresh record"]);
}

#[test]
fn relevant_context_joins_with_spaces() {
    let r = retriever_for(&["memory leak in api", "timeout in api", "unrelated"]);
    let ctx = r.relevant_context("memory leak").unwrap();
    assert!(ctx.starts_with("memory leak in api timeout in api"));
}

#[test]
fn sublinear_and_stemmed_models_still_rank_self_first() {
    let cfg = VectorizerConfig {
        sublinear_tf: true,
        smooth_idf: false,
        analyzer: triage_core::AnalyzerConfig { nfkc: true, stop_words: true, stem: true },
    };
    let store = MemoryStore::new();
    let dataset = Dataset::from_reader(csv_of(&["leaking memory in the workers", "timeouts while deploying"]).as_bytes()).unwrap();
    IndexBuilder::new(cfg).build_dataset(dataset, &store).unwrap();
    let r = Retriever::load(&store).unwrap();
    assert_eq!(r.query_scored("memory leaks", 1)[0].row, 0);
    assert_eq!(r.query_scored("deployment timeout", 1)[0].row, 1);
}
