use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use clap::{Parser, Subcommand};
use ir_search::{
    config::Config,
    error::Result,
    hashed_index::{paths::IndexPaths, IndexBuilder},
    indexer::Indexer,
    kgram::KGramIndex,
    pagerank::{load_titles, LinkGraph, PageRank, PageRankScores},
    postings::DocId,
    search::{Query, QueryType, RankingType, SearchEngine, SearchResult},
    tokenizer::Tokenizer,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the index files
    #[arg(long)]
    index_dir: Option<PathBuf>,

    /// Stem terms when indexing and querying
    #[arg(long)]
    stem: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Builds the index from a corpus directory
    Index {
        /// Directory of documents to index
        corpus: PathBuf,
    },
    /// Reads queries from stdin, one per line, until `exit`
    Search {
        #[arg(long, value_enum, default_value_t = QueryType::Intersection)]
        query_type: QueryType,

        #[arg(long, value_enum, default_value_t = RankingType::TfIdf)]
        ranking: RankingType,

        /// Number of hits to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Computes PageRank over a link file
    Pagerank {
        /// Lines of `<title>;<outlink>,<outlink>,...`
        links: PathBuf,

        /// Lines of `<docNumber>;<title>` used to name the output
        #[arg(long)]
        titles: Option<PathBuf>,

        /// Writes `name:probability` lines here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of documents to print
        #[arg(long, default_value_t = 30)]
        top: usize,
    },
    /// Lists the indexed terms containing every given k-gram
    Kgram { kgrams: Vec<String> },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(index_dir) = args.index_dir {
        config.index_dir = index_dir;
    }
    config.stem |= args.stem;

    match args.command {
        Command::Index { corpus } => index(&config, &corpus),
        Command::Search {
            query_type,
            ranking,
            limit,
        } => search(&config, query_type, ranking, limit),
        Command::Pagerank {
            links,
            titles,
            output,
            top,
        } => pagerank(&config, &links, titles, output, top),
        Command::Kgram { kgrams } => kgram(&config, &kgrams),
    }
}

fn index(config: &Config, corpus: &Path) -> Result<()> {
    let start = Instant::now();

    let builder = IndexBuilder::create(IndexPaths::new(&config.index_dir), config.table_size)?;
    let indexer = Indexer::new(Tokenizer::new(config.stem)?, KGramIndex::new(config.kgram_k)?);
    let (index, kgram) = indexer.index_corpus(corpus, builder)?;

    println!(
        "Indexed {} documents, {} terms in {:?}",
        index.doc_count(),
        kgram.term_count(),
        start.elapsed()
    );
    Ok(())
}

fn search(
    config: &Config,
    query_type: QueryType,
    ranking: RankingType,
    limit: usize,
) -> Result<()> {
    let tokenizer = Tokenizer::new(config.stem)?;
    let pagerank = match &config.pagerank_scores {
        Some(path) => PageRankScores::load(path)?,
        None => PageRankScores::new(),
    };
    let mut engine = SearchEngine::open(&IndexPaths::new(&config.index_dir), config.kgram_k)?
        .with_pagerank(pagerank)
        .with_combined_weight(config.combined_weight)?;

    println!("Enter Search Query:");

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim() == "exit" {
            break;
        }

        let query = match line.parse::<Query>() {
            Ok(query) => query.map_terms(|term| tokenizer.normalize(term)),
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        let start = Instant::now();
        let result = engine.search(&query, query_type, ranking)?;
        let elapsed = start.elapsed();

        println!("Results for '{}':", line.trim());
        match result {
            None => println!("Empty query"),
            Some(result) => print_result(&engine, &result, limit),
        }
        println!("Time taken: {elapsed:?}");
        io::stdout().flush()?;
    }

    Ok(())
}

fn print_result(engine: &SearchEngine, result: &SearchResult, limit: usize) {
    println!("Number of results: {}", result.len());

    let name = |doc_id: DocId| {
        engine
            .index()
            .docs()
            .get(doc_id)
            .map_or_else(|| doc_id.to_string(), |meta| meta.name.clone())
    };

    match result {
        SearchResult::Postings(list) => {
            for entry in list.iter().take(limit) {
                println!("  {}", name(entry.doc_id));
            }
        }
        SearchResult::Ranked(docs) => {
            for doc in docs.iter().take(limit) {
                println!("  {:.5} {}", doc.score, name(doc.doc_id));
            }
        }
    }
}

fn pagerank(
    config: &Config,
    links: &Path,
    titles: Option<PathBuf>,
    output: Option<PathBuf>,
    top: usize,
) -> Result<()> {
    let graph = LinkGraph::load(links)?;
    let ranking = PageRank::new(config.pagerank.clone()).rank(&graph);

    let titles = titles.map(|path| load_titles(&path)).transpose()?;
    for doc in ranking.iter().take(top) {
        let name = titles
            .as_ref()
            .and_then(|titles| titles.get(&doc.name))
            .unwrap_or(&doc.name);
        println!("{name}: {:.5}", doc.probability);
    }

    if let Some(output) = output {
        PageRankScores::from_ranking(&ranking, titles.as_ref()).save(&output)?;
    }
    Ok(())
}

fn kgram(config: &Config, kgrams: &[String]) -> Result<()> {
    let engine = SearchEngine::open(&IndexPaths::new(&config.index_dir), config.kgram_k)?;

    let terms = engine.candidate_terms(kgrams)?;
    println!("Found {} candidate terms", terms.len());
    for term in terms {
        println!("  {term}");
    }
    Ok(())
}
