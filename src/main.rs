//! ctrlmap command-line entrypoint.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mimalloc::MiMalloc;
use tokio_util::sync::CancellationToken;

use ctrlmap::config::MapperConfig;
use ctrlmap::document::{PageRange, TextFile};
use ctrlmap::output::write_json;
use ctrlmap::pipeline::{ControlMapper, MappingRequest};
use ctrlmap::verifier::VerifierKind;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "ctrlmap")]
#[command(about = "Map a cloud service's documentation to applicable security controls")]
struct Args {
    /// CSV catalog of controls (id, description)
    #[arg(long)]
    controls: PathBuf,

    /// Cloud service name
    #[arg(long)]
    service: String,

    /// Extracted documentation text (pages separated by form feeds)
    #[arg(long)]
    doc: PathBuf,

    /// Analyst note describing the concern
    #[arg(long, default_value = "")]
    note: String,

    /// Where to write the detailed JSON results
    #[arg(long, default_value = "results/mapping_results.json")]
    output: PathBuf,

    /// Lexical candidates to keep
    #[arg(long)]
    bm25_top: Option<usize>,

    /// Candidates sent to the verifier
    #[arg(long)]
    llm_top: Option<usize>,

    /// OpenAI-compatible endpoint; implies the llm verifier unless --verifier is given
    #[arg(long)]
    llm_endpoint: Option<String>,

    /// First page to read (1-indexed)
    #[arg(long)]
    start_page: Option<usize>,

    /// Last page to read (inclusive)
    #[arg(long)]
    end_page: Option<usize>,

    /// Verifier strategy: keyword, llm or none
    #[arg(long)]
    verifier: Option<VerifierKind>,

    /// Per-call verifier timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Args {
    fn apply(&self, config: &mut MapperConfig) {
        if let Some(top) = self.bm25_top {
            config.top_n = top;
        }
        if let Some(top) = self.llm_top {
            config.verifier.verify_top_n = top;
        }
        if let Some(endpoint) = &self.llm_endpoint {
            config.verifier.llm_endpoint = Some(endpoint.clone());
            config.verifier.kind = VerifierKind::Llm;
        }
        if let Some(kind) = self.verifier {
            config.verifier.kind = kind;
        }
        if let Some(secs) = self.timeout_secs {
            config.verifier.timeout = Duration::from_secs(secs);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = MapperConfig::from_env()?;
    args.apply(&mut config);

    let mapper = ControlMapper::from_path(&args.controls, config)?;

    let pages = PageRange::new(args.start_page, args.end_page);
    let document = TextFile::new(&args.doc).with_pages(pages);
    let request = MappingRequest::new(args.service.clone(), args.note.clone(), Arc::new(document));

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing with collected verdicts");
            on_signal.cancel();
        }
    });

    let report = mapper.map_with_cancel(&request, cancel).await;

    write_json(&args.output, &report.detailed())?;

    println!("{}", report);
    println!("SIMPLIFIED RESULTS:");
    println!("{}", serde_json::to_string_pretty(&report.simple())?);
    println!("\nDetailed results saved to: {}", args.output.display());

    Ok(())
}
