use std::path::PathBuf;

/// Hexagon population CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "hexpop", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON options file; flags given on the command line take precedence
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List the hexagons covering a set of regions
    Cover(CoverArgs),

    /// Redistribute region counts onto hexagons and score them
    Distribute(DistributeArgs),
}

/// Flags shared by every command that reads regions.
#[derive(clap::Args, Debug)]
pub struct RegionArgs {
    /// Input GeoJSON FeatureCollection of regions
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub regions: PathBuf,

    /// Feature property holding the region id, e.g. GEOID
    #[arg(long)]
    pub id_property: Option<String>,

    /// H3 resolution (1-15)
    #[arg(short, long)]
    pub resolution: Option<u8>,

    /// Comma-separated attribute names to redistribute
    #[arg(short, long, value_delimiter = ',')]
    pub attributes: Option<Vec<String>>,
}

#[derive(clap::Args, Debug)]
pub struct CoverArgs {
    #[command(flatten)]
    pub input: RegionArgs,

    /// Output file with one cell id per line, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DistributeArgs {
    #[command(flatten)]
    pub input: RegionArgs,

    /// Scoring method: density, normalized or percentile
    #[arg(short, long)]
    pub method: Option<String>,

    /// Output GeoJSON of scored cells, defaults to "./cells.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Tile regions and compute their allocations on one thread
    #[arg(long)]
    pub sequential: bool,
}
