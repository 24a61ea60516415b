pub mod cover;
pub mod distribute;

use anyhow::Result;
use hexpop::Options;

use crate::cli::{Cli, RegionArgs};

/// Options from the config file (or defaults) with command-line overrides applied.
fn options(cli: &Cli, args: &RegionArgs) -> Result<Options> {
    let mut options = match &cli.config {
        Some(path) => Options::read(path)?,
        None => Options::default(),
    };
    if let Some(resolution) = args.resolution { options.resolution = resolution }
    if let Some(attributes) = &args.attributes { options.attributes = attributes.clone() }
    options.verbose = options.verbose.max(cli.verbose);
    Ok(options)
}
