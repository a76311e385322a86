use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::page_range::PageSet;
use crate::pdf::{PdfDocument, ScrubMode};

pub fn run(input: &Path, pages: &str, mode: ScrubMode, output: Option<PathBuf>) -> Result<()> {
    let targets = PageSet::parse(pages)?;

    let out_path = output.unwrap_or_else(|| derive_output_path(input));
    if out_path == input {
        anyhow::bail!("Output path must differ from the input: {}", input.display());
    }

    let doc = PdfDocument::open(input)?;
    let total = doc.page_count();
    let affected = targets.iter().filter(|&index| index < total).count();

    println!("Pages selected: {}", targets);

    let mut scrubbed = doc.scrub(&targets, mode)?;
    PdfDocument::save(&mut scrubbed, &out_path)?;

    match mode {
        ScrubMode::Delete => println!("Removed {} of {} page(s)", affected, total),
        ScrubMode::Redact => println!("Redacted {} of {} page(s)", affected, total),
    }
    println!("Output saved to '{}'", out_path.display());

    Ok(())
}

/// `report.pdf` becomes `report.redacted.pdf`. Only the final extension is
/// replaced, so `archive.tar.gz` becomes `archive.tar.redacted.pdf` and an
/// extensionless name gains the suffix. The result never equals the input.
fn derive_output_path(input: &Path) -> PathBuf {
    input.with_extension("redacted.pdf")
}
