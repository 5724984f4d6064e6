use clap::{App, Arg};

/// Command line arguments: either a single instance file, or a dataset
/// directory plus an inclusive instance-index range (`first.txt`..`last.txt`
/// inside that directory), solved one after another.
pub struct Args {
    pub instance_path: Option<String>,
    pub dataset: Option<String>,
    pub range: Option<(u32, u32)>,
    pub output_path: Option<String>,
    pub time_limit: Option<u64>,
    pub max_iterations: Option<u64>,
    pub seed: Option<u64>,
    pub config_path: Option<String>,
    pub json: bool,
}

impl Args {
    pub fn parse() -> Self {
        let matches = App::new("hybridcvrp")
            .version("0.1")
            .author("Martin Simensen")
            .about("Split-delivery capacitated vehicle routing problem metaheuristic solver")
            .arg(Arg::with_name("instance_path").help("Path to a single problem instance"))
            .arg(
                Arg::with_name("dataset")
                    .long("dataset")
                    .takes_value(true)
                    .help("Directory of instance files, solved by index range"),
            )
            .arg(
                Arg::with_name("range")
                    .long("range")
                    .takes_value(true)
                    .help("Inclusive instance index range, e.g. 1-100 (requires --dataset)"),
            )
            .arg(
                Arg::with_name("output_path")
                    .short("o")
                    .long("output")
                    .takes_value(true)
                    .help("Path (or directory, in dataset mode) to write solutions to"),
            )
            .arg(
                Arg::with_name("iterations")
                    .short("i")
                    .long("iterations")
                    .takes_value(true)
                    .help("Maximum number of outer restarts"),
            )
            .arg(
                Arg::with_name("time_limit")
                    .short("t")
                    .long("time-limit")
                    .takes_value(true)
                    .help("Time limit in seconds, per instance"),
            )
            .arg(
                Arg::with_name("seed")
                    .short("s")
                    .long("seed")
                    .takes_value(true)
                    .help("Deterministic random seed"),
            )
            .arg(
                Arg::with_name("config")
                    .short("c")
                    .long("config")
                    .takes_value(true)
                    .help("Path to a YAML config file patching the defaults"),
            )
            .arg(
                Arg::with_name("json")
                    .long("json")
                    .help("Write solutions as JSON instead of the text format"),
            )
            .get_matches();

        let instance_path = matches.value_of("instance_path").map(String::from);
        let dataset = matches.value_of("dataset").map(String::from);
        let range = matches.value_of("range").map(|value| {
            let (start, end) = value.split_once('-').expect("range must be of the form START-END");
            (
                start.parse::<u32>().expect("invalid range start"),
                end.parse::<u32>().expect("invalid range end"),
            )
        });

        if instance_path.is_none() && dataset.is_none() {
            panic!("either an instance path or --dataset must be provided");
        }
        if dataset.is_some() && range.is_none() {
            panic!("--dataset requires --range");
        }

        let output_path = matches.value_of("output_path").map(String::from);

        let max_iterations = matches
            .value_of("iterations")
            .map(|value| value.parse::<u64>().expect("invalid iterations argument"));

        let time_limit = matches
            .value_of("time_limit")
            .map(|value| value.parse::<u64>().expect("invalid time limit argument"));

        let seed = matches
            .value_of("seed")
            .map(|value| value.parse::<u64>().expect("invalid seed argument"));

        let config_path = matches.value_of("config").map(String::from);
        let json = matches.is_present("json");

        Self {
            instance_path,
            dataset,
            range,
            output_path,
            time_limit,
            max_iterations,
            seed,
            config_path,
            json,
        }
    }
}
