use std::io::{stdout, Write};
use std::path::PathBuf;

use clap::Args;
use itertools::Itertools;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::{OwoColorize, Stream};
use ss_plc::{attribute::ATTRIBUTES, PlcFile};
use ss_stage::read_archive_file;

#[derive(Args)]
pub struct DumpArgs {
    /// An input record table
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Print the table as JSON
    #[arg(long, default_value_t = false, conflicts_with = "attributes")]
    json: bool,

    /// Print the non-zero attributes of every record
    #[arg(long, default_value_t = false)]
    attributes: bool,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_archive_file(&self.input)
            .context(format!("reading {}", self.input.display()))?;
        let plc = PlcFile::from_bytes(&data).context(format!("opening {}", self.input.display()))?;

        let mut out = stdout().lock();
        if self.json {
            writeln!(out, "{}", plc.to_json()?).into_diagnostic()?;
            return Ok(());
        }

        for (index, entry) in plc.iter().enumerate() {
            let label = format!("{index:4}:");
            writeln!(
                out,
                "{} {}",
                label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
                entry
            )
            .into_diagnostic()?;

            if self.attributes {
                let set = ATTRIBUTES
                    .iter()
                    .filter(|a| entry.get(a) != 0)
                    .map(|a| format!("{}={:#X}", a.name, entry.get(a)))
                    .join(" ");
                if !set.is_empty() {
                    writeln!(out, "      {set}").into_diagnostic()?;
                }
            }
        }

        if !plc.trailing.is_empty() {
            writeln!(out, "{} trailing bytes", plc.trailing.len()).into_diagnostic()?;
        }

        Ok(())
    }
}
