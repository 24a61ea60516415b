use anyhow::Result;
use hexpop::{read_regions_from_geojson, write_scores_to_geojson, HexMap};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::DistributeArgs) -> Result<()> {
    let mut options = super::options(cli, &args.input)?;
    if let Some(method) = &args.method { options.method = method.parse()? }
    if args.sequential { options.parallel = false }
    let out_path = &args.output.clone().unwrap_or("./cells.geojson".into());

    println!("[distribute] loading regions from {}", args.input.regions.display());
    let regions = read_regions_from_geojson(&args.input.regions, args.input.id_property.as_deref())?;

    println!("[distribute] tiling {} regions at resolution {}", regions.len(), options.resolution);
    let map = HexMap::build(&regions, options)?;
    for skipped in map.coverage_skipped() {
        eprintln!("[distribute] skipped {skipped}");
    }
    println!("[distribute] {}", map.report());

    if map.options().smooth {
        eprintln!("[distribute] smoothing needs an external smoother; writing unsmoothed scores");
    }
    let evaluation = map.evaluate(map.options().method, None)?;

    println!("[distribute] writing {} scored cells to {}", evaluation.scores.len(), out_path.display());
    write_scores_to_geojson(out_path, &evaluation.scores)?;

    println!("{}", evaluation.summary);
    Ok(())
}
