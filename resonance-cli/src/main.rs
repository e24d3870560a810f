use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::Error;
use clap::{values_t, App, AppSettings, Arg, ArgMatches, SubCommand};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use resonance::config::{SolverConfig, SolverConfigUpdate};
use resonance::{Context, SatSolver};

mod graph;

/// Exit code when a solution was found.
const EXIT_FOUND: i32 = 10;
/// Exit code when the search ended without a solution.
const EXIT_UNKNOWN: i32 = 0;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("RESONANCE_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is resonance {}", env!("RESONANCE_VERSION"));
    info!(
        "  {} build - {}",
        env!("RESONANCE_PROFILE"),
        env!("RESONANCE_RUSTC_VERSION")
    );
}

fn input_arg() -> Arg<'static, 'static> {
    Arg::from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
}

fn sat_args() -> App<'static, 'static> {
    SubCommand::with_name("sat")
        .about("Search for a satisfying assignment of a DIMACS CNF formula")
        .arg(input_arg())
}

fn main_with_err() -> Result<i32, Error> {
    let mut app = App::new("resonance")
        .version(env!("RESONANCE_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .setting(AppSettings::VersionlessSubcommands)
        .arg_from_usage("[config-file] --config=[FILE] 'Read parameters from configuration file'")
        .arg(
            Arg::from_usage("[config-option] -C --config-option")
                .value_name("OPTION>=<VALUE")
                .help(
                    "Specify a single config option, see 'resonance -C help' for a list of options.",
                )
                .multiple(true)
                .number_of_values(1)
                .global(true),
        )
        .subcommand(sat_args())
        .subcommand(graph::cover_args(input_arg()))
        .subcommand(graph::path_args(input_arg()))
        .subcommand(graph::color_args(input_arg()));

    let matches = app.clone().get_matches();

    let config_options = values_t!(matches, "config-option", String).unwrap_or_default();

    if config_options.iter().any(|option| option == "help") {
        print!("{}", SolverConfig::help());
        return Ok(0);
    }

    let (name, sub_matches) = match matches.subcommand() {
        (name, Some(sub_matches)) => (name, sub_matches),
        _ => {
            app.print_help()?;
            println!();
            return Ok(1);
        }
    };

    let sub_options = values_t!(sub_matches, "config-option", String).unwrap_or_default();

    if sub_options.iter().any(|option| option == "help") {
        print!("{}", SolverConfig::help());
        return Ok(0);
    }

    init_logging();
    banner();

    let mut config_update = SolverConfigUpdate::new();

    if let Some(config_path) = matches.value_of("config-file") {
        let mut config_contents = String::new();
        fs::File::open(config_path)?.read_to_string(&mut config_contents)?;

        config_update.merge(toml::from_str(&config_contents)?);
    }

    for config_option in config_options.iter().chain(sub_options.iter()) {
        config_update.merge(toml::from_str(config_option)?);
    }

    let mut config = SolverConfig::default();
    config_update.apply(&mut config)?;

    let mut ctx = Context::new(config);

    let exit_code = match name {
        "sat" => sat_main(&mut ctx, sub_matches)?,
        "cover" => graph::cover_main(&mut ctx, sub_matches)?,
        "path" => graph::path_main(&mut ctx, sub_matches)?,
        "color" => graph::color_main(&mut ctx, sub_matches)?,
        _ => unreachable!(),
    };

    let diagnostics = ctx.dispose();
    if !diagnostics.is_empty() {
        info!("{} diagnostics reported", diagnostics.len());
    }

    Ok(exit_code)
}

/// Open the input file or stdin.
fn open_input(matches: &ArgMatches) -> Result<Box<dyn io::Read>, Error> {
    match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            Ok(Box::new(fs::File::open(path)?))
        }
        None => {
            info!("Reading from stdin");
            Ok(Box::new(io::stdin()))
        }
    }
}

fn sat_main(ctx: &mut Context, matches: &ArgMatches) -> Result<i32, Error> {
    let (formula, result) = SatSolver::new(ctx).solve_dimacs(open_input(matches)?)?;

    info!(
        "Formula has {} variables and {} clauses",
        formula.var_count(),
        formula.len()
    );

    if result.satisfiable {
        println!("s SATISFIABLE");
        print!("v");
        for lit in result.assignment.lits() {
            match lit.to_dimacs() {
                Some(number) => print!(" {}", number),
                None => print!(" {}", lit),
            }
        }
        println!(" 0");
        Ok(EXIT_FOUND)
    } else {
        info!(
            "{} of {} clauses satisfied",
            formula.len() - formula.unsatisfied_count(&result.assignment),
            formula.len()
        );
        println!("s UNKNOWN");
        Ok(EXIT_UNKNOWN)
    }
}
