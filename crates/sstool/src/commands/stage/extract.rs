use std::path::PathBuf;

use clap::Args;
use miette::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use ss_stage::extract::DEFAULT_OUTPUT_DIR;
use ss_stage::extract_stages;
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// The `DATA/files` directory of a Wii extract, or the `romfs` directory of an HD one
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        info!(
            "extracting {} into {}",
            self.input.display(),
            self.output.display()
        );

        let report = extract_stages(&self.input, &self.output)
            .context(format!("extracting {}", self.input.display()))?;

        println!(
            "{} stages extracted, {} objects",
            report.extracted.len(),
            report.objects
        );
        for stage in &report.skipped {
            println!(
                "{} {}",
                "skipped".if_supports_color(Stream::Stdout, |t| t.yellow()),
                stage
            );
        }

        Ok(())
    }
}
