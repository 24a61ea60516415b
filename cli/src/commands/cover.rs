use std::io::Write;

use anyhow::{Context, Result};
use hexpop::{generate_coverage, read_regions_from_geojson};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::CoverArgs) -> Result<()> {
    let options = super::options(cli, &args.input)?;
    options.validate()?;

    if options.verbose > 0 { eprintln!("[cover] reading regions from {}", args.input.regions.display()); }
    let regions = read_regions_from_geojson(&args.input.regions, args.input.id_property.as_deref())?;

    let coverage = generate_coverage(&regions, options.resolution)?;
    for skipped in &coverage.skipped {
        eprintln!("[cover] skipped {skipped}");
    }

    let mut ids: Vec<String> = coverage.cells.iter().map(|id| id.to_string()).collect();
    ids.sort_unstable();

    let mut text = ids.join("\n");
    if !text.is_empty() { text.push('\n') }
    match &args.output {
        Some(path) => {
            if options.verbose > 0 { eprintln!("[cover] writing {} cells to {}", ids.len(), path.display()); }
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write cell list: {}", path.display()))?;
        }
        None => std::io::stdout().lock().write_all(text.as_bytes())?,
    }

    eprintln!("[cover] {} cells at resolution {} ({} regions skipped)", ids.len(), options.resolution, coverage.skipped.len());
    Ok(())
}
