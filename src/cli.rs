use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfscrub")]
#[command(about = "Delete pages from a PDF, or replace them with redaction placeholders")]
#[command(version)]
pub struct Cli {
    /// PDF file to scrub
    pub input: PathBuf,

    /// Pages to remove, 1-based (e.g., "12,15-18,22")
    pub pages: String,

    /// Replace each selected page with a same-sized "Redacted" page
    /// instead of deleting it
    #[arg(long)]
    pub redact: bool,

    /// Output file (default: input path with a `.redacted.pdf` extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
