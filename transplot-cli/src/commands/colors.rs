//! `transplot colors` - build the domain color table.

use std::path::Path;

use crate::config::Config;
use crate::error::{CliError, CliResult};
use transplot_core::io::domains::read_domains;
use transplot_core::DomainPalette;

pub fn execute(
    config: &Config,
    domain_file: &Path,
    transcripts: &[String],
    database: Option<&str>,
    out: &Path,
) -> CliResult<()> {
    let database = database.unwrap_or(&config.domains.database);
    log::info!(
        "Assigning colors for {} transcripts from {} ({} domains)",
        transcripts.len(),
        domain_file.display(),
        database
    );

    let records = read_domains(domain_file, transcripts, database)?;
    if records.is_empty() {
        return Err(CliError::input(format!(
            "no {} domain rows for the requested transcripts in {}",
            database,
            domain_file.display()
        )));
    }

    let palette = DomainPalette::assign(&records);
    palette.write_csv(out)?;
    log::info!(
        "Wrote {} domain colors to {}",
        palette.len(),
        out.display()
    );
    Ok(())
}
