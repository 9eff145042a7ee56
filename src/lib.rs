pub mod accumulate;
pub mod annotate;
pub mod crossing;
pub mod error;
pub mod geodesic;
pub mod ingest;
pub mod latitude;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod window;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::info;

use latitude::{Dms, ReferenceLatitude};
use pipeline::{CrossingConfig, ExtractConfig};
use render::{vessel_list, CrossingReport, RULE};
use window::{parse_zone, TimeWindow};

pub use error::CrossingError;
pub use model::{AnnotatedRecord, CrossingEstimate, Report};

#[derive(Debug)]
pub struct Config {
    paths: Vec<String>,
    task: Task,
}

#[derive(Debug)]
pub enum Task {
    /// Report every crossing of every vessel.
    Crossings(CrossingConfig),
    /// Annotate one vessel's window and optionally export it.
    Extract {
        config: ExtractConfig,
        output: Option<PathBuf>,
    },
}

fn file_arg() -> Arg {
    Arg::new("paths")
        .short('f')
        .long("file-path")
        .action(ArgAction::Append)
        .required(true)
        .help("CSV file of position reports, in time order; repeat for more files")
}

fn reference_args() -> [Arg; 3] {
    [
        Arg::new("latitude")
            .long("latitude")
            .value_parser(clap::value_parser!(f64))
            .allow_negative_numbers(true)
            .conflicts_with("dms")
            .help("reference latitude in decimal degrees [default: 66° 33']"),
        Arg::new("dms")
            .long("dms")
            .allow_hyphen_values(true)
            .help("reference latitude as DEG,MIN,SEC"),
        Arg::new("step")
            .long("step")
            .value_parser(clap::value_parser!(i64))
            .default_value("1")
            .help("speed integration step in seconds"),
    ]
}

fn command() -> Command {
    Command::new("circle-crossing")
        .version("0.1")
        .about("time vessel crossings of a reference latitude [csv]")
        .subcommand_required(true)
        .subcommand(
            Command::new("crossings")
                .about("report every crossing of every vessel")
                .arg(file_arg())
                .args(reference_args())
                .arg(
                    Arg::new("tz")
                        .long("tz")
                        .default_value("UTC")
                        .help("time zone for displayed crossing times"),
                ),
        )
        .subcommand(
            Command::new("extract")
                .about("annotate one vessel's window with cumulative, remaining and circle distance")
                .arg(file_arg())
                .args(reference_args())
                .arg(
                    Arg::new("imo")
                        .long("imo")
                        .required(true)
                        .value_parser(clap::value_parser!(u32))
                        .help("IMO number of the vessel"),
                )
                .arg(Arg::new("tz").long("tz").required(true).help("time zone of the window"))
                .arg(
                    Arg::new("start")
                        .long("start")
                        .required(true)
                        .help("window start, YYYY-MM-DD HH:MM:SS local time"),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .required(true)
                        .help("window end, YYYY-MM-DD HH:MM:SS local time"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("write annotated records to this CSV file instead of stdout"),
                ),
        )
}

pub fn get_arg() -> Result<Config> {
    config_from(command().get_matches())
}

fn config_from(matches: ArgMatches) -> Result<Config> {
    let (name, sub) = match matches.subcommand() {
        Some(found) => found,
        None => bail!("no subcommand given"),
    };

    let paths = sub
        .get_many::<String>("paths")
        .unwrap_or_default()
        .cloned()
        .collect::<Vec<String>>();
    let reference = reference_from(sub)?;
    let step_secs = sub.get_one::<i64>("step").copied().unwrap_or(1);
    let step = Duration::try_seconds(step_secs).ok_or(CrossingError::InvalidStep(step_secs))?;
    let tz = sub.get_one::<String>("tz").map(String::as_str).unwrap_or("UTC");

    let task = match name {
        "crossings" => Task::Crossings(CrossingConfig {
            reference,
            display_zone: parse_zone(tz)?,
            step,
        }),
        "extract" => {
            let start = required(sub, "start")?;
            let end = required(sub, "end")?;
            let vessel = match sub.get_one::<u32>("imo") {
                Some(imo) => *imo,
                None => bail!("--imo is required"),
            };
            Task::Extract {
                config: ExtractConfig {
                    vessel,
                    window: TimeWindow::parse(tz, start, end)?,
                    reference,
                    step,
                },
                output: sub.get_one::<PathBuf>("output").cloned(),
            }
        }
        other => bail!("unknown subcommand {}", other),
    };

    Ok(Config { paths, task })
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("--{} is required", id))
}

fn reference_from(matches: &ArgMatches) -> Result<ReferenceLatitude> {
    if let Some(deg) = matches.get_one::<f64>("latitude") {
        return Ok(ReferenceLatitude::from_decimal(*deg)?);
    }
    if let Some(dms) = matches.get_one::<String>("dms") {
        return Ok(ReferenceLatitude::from_dms(dms.parse::<Dms>()?)?);
    }
    Ok(ReferenceLatitude::default())
}

pub fn run(config: Config) -> Result<()> {
    info!("config is {:?}", config);

    let reports = ingest::load_files(&config.paths)?;

    match config.task {
        Task::Crossings(crossing) => {
            let found = pipeline::extract_crossings(&reports, &crossing)?;

            println!();
            println!("Found vessels:");
            let vessels: Vec<_> = found.iter().map(|v| v.vessel.clone()).collect();
            println!("{}", vessel_list(&vessels));

            for vessel in &found {
                for estimate in &vessel.crossings {
                    let report = CrossingReport {
                        estimate,
                        reference: &crossing.reference,
                        zone: crossing.display_zone,
                    };
                    println!("{}", report);
                }
                println!("{}", RULE);
            }
        }
        Task::Extract { config, output } => {
            let extract = pipeline::extract_vessel(&reports, &config)?;
            eprintln!("Total distance travelled (NM): {:.1}", extract.total_nm);

            if let Some(estimate) = &extract.crossing {
                let report = CrossingReport {
                    estimate,
                    reference: &config.reference,
                    zone: config.window.zone,
                };
                eprintln!("{}", report);
            }

            match output {
                Some(path) => ingest::write_annotated_file(&path, &extract.records)?,
                None => ingest::write_annotated(std::io::stdout().lock(), &extract.records)?,
            }
        }
    }

    Ok(())
}
