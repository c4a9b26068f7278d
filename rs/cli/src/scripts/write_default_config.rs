// Script to write a clustering config with default values, as a starting point for
// `kselect --config-path`.
use anyhow::Result;
use clap::Parser;
use config::clustering::ClusteringConfig;
use config::enums::InitMethod;

#[derive(clap::ValueEnum, Clone, Debug, PartialEq)]
enum InitMethodArgs {
    RandomSample,
    RandomLabels,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long, default_value_t = String::from("/tmp/clustering_config.yaml"))]
    output_path: String,

    #[arg(long = "init-method", default_value_t = InitMethodArgs::RandomSample, value_enum)]
    init_method: InitMethodArgs,

    #[arg(long)]
    seed: Option<u64>,
}

fn generate_config(args: &Args) -> ClusteringConfig {
    let mut config = ClusteringConfig::default();
    config.init_method = match args.init_method {
        InitMethodArgs::RandomSample => InitMethod::RandomSample,
        InitMethodArgs::RandomLabels => InitMethod::RandomLabels,
    };
    config.seed = args.seed;
    config
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = generate_config(&args);
    config.to_yaml_file(&args.output_path)?;
    Ok(())
}
