use std::io::Write;

use anyhow::Result;
use clap::Parser;
use config::clustering::ClusteringConfig;
use log::info;
use selector::{
    ClusterSweep, ClusteringEntry, IntoDataset, LoggingObserver, NoopObserver, ResultTable,
};
use utils::input::text::TextReader;

#[derive(Parser, Debug)]
#[command(version, about = "Cluster a dataset for k = 1..max_clusters and report error and Davies-Bouldin index per k", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Delimited text file, one data point per line
    #[arg(long, required = true)]
    input_path: String,

    /// YAML clustering config. Command line flags override its values
    #[arg(long)]
    config_path: Option<String>,

    /// Largest k to try (default: ceil(sqrt(number of points)))
    #[arg(long)]
    max_clusters: Option<usize>,

    /// K-means trials per k
    #[arg(long)]
    num_trials: Option<usize>,

    /// Lloyd iteration cap per trial
    #[arg(long)]
    max_iteration: Option<usize>,

    /// Norm order of the Davies-Bouldin index
    #[arg(long)]
    norm_order: Option<f32>,

    #[arg(long)]
    seed: Option<u64>,

    /// Run the trials of each k in parallel
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Log per-trial and per-k progress
    #[arg(long, default_value_t = false)]
    verbose: bool,

    /// Write the per-k summary as YAML to this path
    #[arg(long)]
    output_path: Option<String>,
}

fn build_config(args: &Args) -> Result<ClusteringConfig> {
    let mut config = match &args.config_path {
        Some(path) => ClusteringConfig::from_yaml_file(path)?,
        None => ClusteringConfig::default(),
    };
    if args.max_clusters.is_some() {
        config.max_clusters = args.max_clusters;
    }
    if let Some(num_trials) = args.num_trials {
        config.num_trials = num_trials;
    }
    if let Some(max_iteration) = args.max_iteration {
        config.max_iteration = max_iteration;
    }
    if let Some(norm_order) = args.norm_order {
        config.norm_order = norm_order;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.parallel |= args.parallel;
    config.verbose |= args.verbose;
    Ok(config)
}

fn format_table(table: &ResultTable) -> String {
    let mut out = format!("{:>4} {:>14} {:>14}  {}\n", "k", "error", "davies-bouldin", "sizes");
    for entry in table.iter() {
        let line = match entry {
            ClusteringEntry::Clustered(clustering) => format!(
                "{:>4} {:>14.4} {:>14}  {:?}\n",
                clustering.num_clusters,
                clustering.error,
                clustering
                    .validity
                    .map(|v| format!("{:.4}", v))
                    .unwrap_or_else(|| "-".to_string()),
                clustering.cluster_sizes()
            ),
            ClusteringEntry::NoValidTrial {
                num_clusters,
                num_trials,
            } => format!(
                "{:>4} {:>14} {:>14}  no valid clustering in {} trials\n",
                num_clusters, "-", "-", num_trials
            ),
        };
        out.push_str(&line);
    }
    out
}

fn write_summary(table: &ResultTable, path: &str) -> Result<()> {
    let yaml = serde_yaml::to_string(&table.summary())?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(yaml.as_bytes())?;
    Ok(())
}

fn run(args: &Args) -> Result<ResultTable> {
    let config = build_config(args)?;
    let mut reader = TextReader::new(&args.input_path)?;
    let dataset = (&mut reader).into_dataset()?;
    info!(
        "Loaded {} points of dimension {} from {}",
        dataset.num_points(),
        dataset.dimension(),
        args.input_path
    );

    let sweep = ClusterSweep::new(config.clone());
    let table = if config.verbose {
        let mut observer = LoggingObserver::new(config.max_clusters_for(dataset.num_points()));
        sweep.run(&dataset, &mut observer)?
    } else {
        sweep.run(&dataset, &mut NoopObserver)?
    };

    if let Some(output_path) = &args.output_path {
        write_summary(&table, output_path)?;
        info!("Wrote summary to {}", output_path);
    }
    Ok(table)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let table = run(&args)?;
    print!("{}", format_table(&table));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &tempdir::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path.to_str()
            .expect("Failed to convert path to string")
            .to_string()
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from(
            [
                "kselect",
                "--input-path",
                "/tmp/data.csv",
                "--max-clusters",
                "4",
                "--seed",
                "11",
                "--parallel",
            ]
            .iter(),
        )
        .unwrap();
        assert_eq!(args.input_path, "/tmp/data.csv");
        assert_eq!(args.max_clusters, Some(4));
        assert_eq!(args.seed, Some(11));
        assert!(args.parallel);
        assert!(!args.verbose);

        // Input path is required
        let result = Args::try_parse_from(["kselect", "--max-clusters", "4"].iter());
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir =
            tempdir::TempDir::new("kselect_config_test").expect("Failed to create temporary directory");
        let config_path = write_file(&temp_dir, "config.yaml", "num_trials: 9\nmax_iteration: 50\n");

        let args = Args::try_parse_from(
            [
                "kselect",
                "--input-path",
                "/tmp/data.csv",
                "--config-path",
                config_path.as_str(),
                "--max-iteration",
                "20",
            ]
            .iter(),
        )
        .unwrap();
        let config = build_config(&args).unwrap();
        assert_eq!(config.num_trials, 9);
        assert_eq!(config.max_iteration, 20);
        assert_eq!(config.max_clusters, None);
    }

    #[test]
    fn test_run_end_to_end() {
        let temp_dir =
            tempdir::TempDir::new("kselect_run_test").expect("Failed to create temporary directory");
        let input_path = write_file(&temp_dir, "data.csv", "x,y\n0,0\n0,1\n10,0\n10,1\n");
        let output_path = temp_dir.path().join("summary.yaml");

        let args = Args::try_parse_from(
            [
                "kselect",
                "--input-path",
                input_path.as_str(),
                "--num-trials",
                "20",
                "--seed",
                "42",
                "--output-path",
                output_path.to_str().unwrap(),
            ]
            .iter(),
        )
        .unwrap();
        let table = run(&args).unwrap();
        assert_eq!(table.max_clusters(), 2);

        let formatted = format_table(&table);
        assert_eq!(formatted.lines().count(), 3);
        assert!(formatted.contains("[2, 2]"));

        let summary = std::fs::read_to_string(&output_path).unwrap();
        assert!(summary.contains("num_clusters: 1"));
        assert!(summary.contains("num_clusters: 2"));
    }

    #[test]
    fn test_run_missing_input() {
        let args =
            Args::try_parse_from(["kselect", "--input-path", "/nonexistent/data.csv"].iter())
                .unwrap();
        assert!(run(&args).is_err());
    }
}
