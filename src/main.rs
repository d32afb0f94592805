use anyhow::{anyhow, Context, Result};
use clap::{arg, Command};
use exam_seating::data::AllocationInput;
use exam_seating::records::parse_records;
use exam_seating::solver;
use log::{info, warn};
use std::io::Read;
use std::path::Path;
use std::{fs, io};

fn cli() -> Command {
    Command::new("exam-seating")
        .about("Assigns exam-takers to hall seats, keeping similar students apart")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("allocate")
                .about("Seats a roster and prints the seating")
                .arg(
                    arg!(<FILE> "Records text, a .json allocation input, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--format [FORMAT] "Output format")
                        .value_parser(["json", "chart"])
                        .default_value("json"),
                )
                .arg(arg!(--pretty "Pretty-print JSON output")),
        )
        .subcommand(
            Command::new("check")
                .about("Validates a roster without seating it")
                .arg(
                    arg!(<FILE> "Records text, a .json allocation input, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("allocate", sub_m)) => allocate(
            sub_m.get_one::<String>("FILE").unwrap(),
            sub_m.get_one::<String>("format").unwrap(),
            sub_m.get_flag("pretty"),
        ),
        Some(("check", sub_m)) => check(sub_m.get_one::<String>("FILE").unwrap()),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_input(source: &str) -> Result<AllocationInput> {
    let text = if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        buffer
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };

    let is_json = Path::new(source)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", source));
    }

    // every record goes through, so duplicate rolls fail allocation
    let parsed = parse_records(&text);
    if !parsed.skipped.is_empty() {
        warn!("{} lines of {} were skipped.", parsed.skipped.len(), source);
    }
    Ok(parsed.into_input())
}

fn allocate(source: &str, format: &str, pretty: bool) -> Result<()> {
    let input = load_input(source)?;
    let result = solver::allocate(&input)?;

    match format {
        "chart" => {
            for grid in &result.grids {
                println!("{}", grid);
            }
            if !result.unplaced.is_empty() {
                println!("Unassigned:");
                for student in &result.unplaced {
                    println!("  {}", student);
                }
            }
            for relaxation in &result.relaxations {
                println!("{}", relaxation);
            }
            println!("{}", result.summary());
        }
        _ => {
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{}", json);
        }
    }
    Ok(())
}

fn check(source: &str) -> Result<()> {
    let input = load_input(source)?;
    info!(
        "Read {} students and {} halls.",
        input.students.len(),
        input.halls.len()
    );
    let result = solver::allocate(&input)?;
    for error in &result.configuration_errors {
        println!("{}", error);
    }
    println!("{}", result.summary());
    Ok(())
}
