//! `udbg` command-line tools

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use udbg_console::classify;
use udbg_coordinator::replay::{read_batches, replay, ReplayTarget};
use udbg_coordinator::CoordinatorConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("udbg")
        .version(udbg_coordinator::VERSION)
        .about("UDF debug coordinator tools")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("classify")
                .about("Classify debugger console lines")
                .arg(
                    Arg::new("title")
                        .num_args(0..)
                        .help("Console lines to classify; read from stdin when omitted"),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Replay recorded console batches through a coordinator")
                .arg(
                    Arg::new("operator")
                        .long("operator")
                        .required(true)
                        .help("Operator id the batches belong to"),
                )
                .arg(
                    Arg::new("operator-type")
                        .long("operator-type")
                        .default_value("PythonUDFV2")
                        .help("Operator type announced for the operator"),
                )
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .value_delimiter(',')
                        .action(ArgAction::Append)
                        .help("Worker ids of the operator, comma separated"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON-lines file of console update events"),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("classify", args)) => {
            let titles: Vec<String> = match args.get_many::<String>("title") {
                Some(values) => values.cloned().collect(),
                None => std::io::stdin()
                    .lock()
                    .lines()
                    .collect::<Result<_, _>>()
                    .context("reading stdin")?,
            };
            for title in titles {
                println!("{}", serde_json::to_string(&classify(&title))?);
            }
        }
        Some(("replay", args)) => {
            let operator = args
                .get_one::<String>("operator")
                .context("missing --operator")?;
            let operator_type = args
                .get_one::<String>("operator-type")
                .context("missing --operator-type")?;
            let workers = args
                .get_many::<String>("workers")
                .map(|values| values.cloned().collect::<Vec<_>>())
                .unwrap_or_default();
            let file = args
                .get_one::<PathBuf>("file")
                .context("missing input file")?;
            let config = match args.get_one::<PathBuf>("config") {
                Some(path) => CoordinatorConfig::load(path)?,
                None => CoordinatorConfig::new(),
            };

            let reader = File::open(file)
                .with_context(|| format!("opening {}", file.display()))?;
            let batches = read_batches(BufReader::new(reader), &file.display().to_string())?;

            let target = ReplayTarget::new(operator.as_str(), operator_type.as_str())
                .with_workers(workers);
            let output = replay(config, &target, batches)
                .await
                .with_context(|| format!("operator {operator} was not registered"))?;
            output.write_to(&mut std::io::stdout().lock())?;

            if output.summary.console_errors > 0 {
                anyhow::bail!("{} console batches failed", output.summary.console_errors);
            }
        }
        Some((other, _)) => anyhow::bail!("unknown subcommand {other}"),
        None => anyhow::bail!("a subcommand is required"),
    }

    Ok(())
}
