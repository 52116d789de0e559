use anyhow::Result;
use clap::{Parser, Subcommand};
use search_core::{CorpusFormat, Document, Highlighter, Ranking, SearchEngine, SearchOptions};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

const MATCH_START: &str = "\x1b[31m";
const MATCH_END: &str = "\x1b[39m";
const SEPARATOR: &str = "===================================================";

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Conjunctive TF-IDF search over a document corpus", long_about = None)]
struct Cli {
    /// Corpus path (file or directory)
    #[arg(long)]
    corpus: String,
    /// Corpus format: auto, jsonl or reuters
    #[arg(long, default_value_t = CorpusFormat::Auto)]
    format: CorpusFormat,
    /// Result order: first-term or combined
    #[arg(long, default_value_t = Ranking::FirstTerm)]
    ranking: Ranking,
    /// Re-read the corpus for every fetched result instead of keeping documents in memory
    #[arg(long, default_value_t = false)]
    no_cache: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read queries from stdin until EOF (default)
    Repl,
    /// Run a single query and exit
    Query {
        text: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let engine = load_engine(&cli)?;
    let options = SearchOptions { ranking: cli.ranking, limit: None };

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => repl(&engine, &options),
        Commands::Query { text } => {
            let docs = run_query(&engine, &text, &options);
            render(&mut io::stdout().lock(), &text, &docs)?;
            Ok(())
        }
    }
}

fn load_engine(cli: &Cli) -> Result<SearchEngine> {
    let engine = SearchEngine::open(&cli.corpus, cli.format, !cli.no_cache)?;
    tracing::info!(num_docs = engine.index().num_docs(), num_terms = engine.index().num_terms(), "index ready");
    Ok(engine)
}

fn run_query(engine: &SearchEngine, query: &str, options: &SearchOptions) -> Vec<Document> {
    engine.search_with(query, options).hits.into_iter().map(|hit| hit.document).collect()
}

fn repl(engine: &SearchEngine, options: &SearchOptions) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();
    loop {
        write!(out, "query> ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let query = line.trim();
        let docs = run_query(engine, query, options);
        render(&mut out, query, &docs)?;
    }
    Ok(())
}

fn render(out: &mut impl Write, query: &str, docs: &[Document]) -> io::Result<()> {
    if docs.is_empty() {
        return writeln!(out, "No Results.");
    }
    let highlighter = Highlighter::new(query);
    for doc in docs {
        writeln!(out, "{}", doc.title)?;
        writeln!(out, "{}", highlighter.highlight(doc.body.trim(), MATCH_START, MATCH_END))?;
        writeln!(out, "{SEPARATOR}")?;
    }
    Ok(())
}
