use std::path::{Path, PathBuf};

use hybridcvrp::cli::Args;
use hybridcvrp::config::Config;
use hybridcvrp::solver::driver::solve;
use hybridcvrp::solver::listener::LoggingListener;
use hybridcvrp::utils::{parse_instance_file, write_solution_file, Random};

fn solve_instance(instance_path: &Path, output_path: &Path, config: &Config) -> anyhow::Result<()> {
    log::info!("loading problem file: {}", instance_path.display());
    let problem = parse_instance_file(instance_path)?;
    log::info!("problem load complete: {} customers, capacity {}", problem.num_customers, problem.capacity);

    let random = if config.deterministic {
        Random::from_seed(config.seed)
    } else {
        Random::new()
    };
    let mut listener = LoggingListener::default();

    let (solution, objective) = solve(&problem, config, &random, &mut listener);
    log::info!("best objective: {}", objective);

    write_solution_file(output_path, &solution)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env().format_module_path(false).init();

    let args = Args::parse();

    let mut config = match &args.config_path {
        Some(path) => Config::load_yaml_file(path)?,
        None => Config::default(),
    };
    config.update_from_args(&args);

    if let Some(instance_path) = &args.instance_path {
        let instance_path = PathBuf::from(instance_path);
        let mut output_path = PathBuf::from(&config.output_path);
        if args.json && args.output_path.is_none() {
            output_path.set_extension("json");
        }
        solve_instance(&instance_path, &output_path, &config)?;
        return Ok(());
    }

    let dataset = args.dataset.as_ref().expect("instance path or dataset must be set");
    let (start, end) = args.range.expect("dataset mode requires a range");
    let output_dir = args.output_path.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    for index in start..=end {
        let extension = if args.json { "json" } else { "sol" };
        let instance_path = Path::new(dataset).join(format!("{index}.vrp"));
        let output_path = output_dir.join(format!("{index}.{extension}"));
        if let Err(error) = solve_instance(&instance_path, &output_path, &config) {
            log::error!("failed to solve {}: {error}", instance_path.display());
        }
    }

    Ok(())
}
