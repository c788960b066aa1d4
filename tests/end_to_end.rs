use std::fs;

use ir_search::{
    hashed_index::{paths::IndexPaths, HashedIndex, IndexBuilder},
    indexer::Indexer,
    kgram::KGramIndex,
    pagerank::{load_titles, LinkGraph, PageRank, PageRankConfig, PageRankScores},
    postings::{PostingsEntry, ScoredDoc},
    search::{Query, QueryType, RankingType, SearchEngine, SearchResult},
    tokenizer::Tokenizer,
};

fn build_corpus(root: &std::path::Path) -> IndexPaths {
    let corpus = root.join("corpus");
    fs::create_dir(&corpus).expect("Failed to create corpus dir");
    fs::write(corpus.join("D0.txt"), "the cat sat").expect("Failed to write");
    fs::write(corpus.join("D1.txt"), "the dog sat").expect("Failed to write");

    let paths = IndexPaths::new(root.join("index"));
    let builder = IndexBuilder::create(paths.clone(), 101).expect("Failed to create index");
    let indexer = Indexer::new(
        Tokenizer::new(false).expect("Failed to create tokenizer"),
        KGramIndex::new(2).expect("Failed to create k-gram index"),
    );
    indexer
        .index_corpus(&corpus, builder)
        .expect("Failed to index corpus");

    paths
}

#[test]
fn postings_survive_reopen() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let paths = IndexPaths::new(dir.path());

    let mut builder = IndexBuilder::create(paths.clone(), 11).expect("Failed to create index");
    for (offset, term) in ["to", "be", "or", "not", "to", "be"].iter().enumerate() {
        builder.insert(term, 4, offset as u32);
    }
    builder.insert("be", 9, 0);
    builder.set_document(4, "plays/hamlet.txt".to_string(), 6);
    builder.set_document(9, "plays/other.txt".to_string(), 1);
    drop(builder.commit().expect("Failed to commit"));

    let mut index = HashedIndex::open(&paths).expect("Failed to open index");

    let be = index.lookup("be").expect("Failed to lookup").expect("Missing term");
    assert_eq!(
        be.entries(),
        &[
            PostingsEntry::with_positions(4, vec![1, 5]),
            PostingsEntry::with_positions(9, vec![0]),
        ]
    );
    assert_eq!(index.lookup("question").expect("Failed to lookup"), None);
    assert_eq!(index.docs().length(4), Some(6));
    assert_eq!(
        paths.load_terms().expect("Failed to load terms"),
        vec!["be", "not", "or", "to"]
    );
}

#[test]
fn missing_doc_info_is_tolerated() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let paths = IndexPaths::new(dir.path());

    let mut builder = IndexBuilder::create(paths.clone(), 11).expect("Failed to create index");
    builder.insert("cat", 0, 0);
    drop(builder.commit().expect("Failed to commit"));
    fs::remove_file(paths.doc_info()).expect("Failed to remove docInfo");

    let mut index = HashedIndex::open(&paths).expect("Failed to open index");
    assert_eq!(index.doc_count(), 0);
    assert!(index.lookup("cat").expect("Failed to lookup").is_some());
}

#[test]
fn queries_against_reopened_index() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let paths = build_corpus(dir.path());

    let mut engine = SearchEngine::open(&paths, 2).expect("Failed to open engine");

    let Some(SearchResult::Postings(both)) = engine
        .search(&Query::from_terms(["the", "sat"]), QueryType::Intersection, RankingType::TfIdf)
        .expect("Failed to search")
    else {
        panic!("Expected postings");
    };
    assert_eq!(both.doc_ids(), vec![0, 1]);

    let Some(SearchResult::Postings(phrase)) = engine
        .search(&Query::from_terms(["the", "cat"]), QueryType::Phrase, RankingType::TfIdf)
        .expect("Failed to search")
    else {
        panic!("Expected postings");
    };
    assert_eq!(phrase.entries(), &[PostingsEntry::with_positions(0, vec![1])]);

    let Some(SearchResult::Ranked(ranked)) = engine
        .search(&Query::from_terms(["cat"]), QueryType::Ranked, RankingType::TfIdf)
        .expect("Failed to search")
    else {
        panic!("Expected ranked docs");
    };
    assert_eq!(ranked, vec![ScoredDoc::new(0, 2f64.ln() / 3.0)]);

    assert_eq!(
        engine.candidate_terms(&["at"]).expect("Failed to lookup"),
        vec!["cat", "sat"]
    );
}

#[test]
fn pagerank_scores_feed_ranking() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let paths = build_corpus(dir.path());

    // D1 is linked from both other pages.
    let links = dir.path().join("links.txt");
    let titles = dir.path().join("titles.txt");
    fs::write(&links, "0;1\n2;1\n1;0\n").expect("Failed to write");
    fs::write(&titles, "0;D0.txt\n1;D1.txt\n2;D2.txt\n").expect("Failed to write");

    let graph = LinkGraph::load(&links).expect("Failed to load links");
    let ranking = PageRank::new(PageRankConfig::default()).rank(&graph);
    let total: f64 = ranking.iter().map(|doc| doc.probability).sum();
    assert!((total - 1.0).abs() < 1e-9);

    let titles = load_titles(&titles).expect("Failed to load titles");
    let scores_path = dir.path().join("pagerank.txt");
    PageRankScores::from_ranking(&ranking, Some(&titles))
        .save(&scores_path)
        .expect("Failed to save scores");

    let scores = PageRankScores::load(&scores_path).expect("Failed to load scores");
    assert_eq!(scores.len(), 3);

    let mut engine = SearchEngine::open(&paths, 2)
        .expect("Failed to open engine")
        .with_pagerank(scores);

    let Some(SearchResult::Ranked(ranked)) = engine
        .search(&Query::from_terms(["sat"]), QueryType::Ranked, RankingType::PageRank)
        .expect("Failed to search")
    else {
        panic!("Expected ranked docs");
    };
    assert_eq!(
        ranked.iter().map(|doc| doc.doc_id).collect::<Vec<_>>(),
        vec![1, 0]
    );
}
