//! Headless host: runs a game tick by tick from an input script.

#[macro_use]
extern crate log;

mod driver;
mod protocol;
mod render;

use clap::{crate_version, value_t, App, Arg, ArgMatches};
use driver::{Driver, Pacer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io;
use std::process;
use tetris_core::{Catalog, Game, GameConfig, Tick};

fn setup_logger(verbosity: u64) -> Result<(), fern::InitError> {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            let timestamp = time::strftime("%Y-%m-%d %H:%M:%S", &time::now())
                .unwrap_or_else(|_| String::from("?"));
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                timestamp,
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply()?;
    Ok(())
}

/// Reads a file or exits.
fn read_file(path: &str, what: &str) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            error!("could not read {} {:?}: {}", what, path, err);
            process::exit(1);
        }
    }
}

/// Builds the game configuration from the config file and command line overrides.
fn load_config(matches: &ArgMatches) -> GameConfig {
    let mut config = match matches.value_of("config") {
        Some(path) => match serde_json::from_str(&read_file(path, "config")) {
            Ok(config) => config,
            Err(err) => {
                error!("invalid config {:?}: {}", path, err);
                process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    if matches.is_present("tps") {
        config.ticks_per_second = value_t!(matches, "tps", Tick).unwrap_or_else(|e| e.exit());
    }
    if matches.is_present("sink-interval") {
        config.sink_interval =
            value_t!(matches, "sink-interval", Tick).unwrap_or_else(|e| e.exit());
    }
    if matches.is_present("reduced") {
        config.catalog = Catalog::Reduced;
    }
    config
}

fn main() {
    let matches = App::new("tetris-host")
        .version(crate_version!())
        .about("Runs a falling-block game headless, driven by an input script")
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("0")
                .help("Seed for the piece sequence"),
        )
        .arg(
            Arg::with_name("ticks")
                .long("ticks")
                .takes_value(true)
                .default_value("3600")
                .help("Number of ticks to run"),
        )
        .arg(
            Arg::with_name("script")
                .long("script")
                .takes_value(true)
                .help("JSON input script"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .help("JSON game configuration"),
        )
        .arg(
            Arg::with_name("tps")
                .long("tps")
                .takes_value(true)
                .help("Ticks per second"),
        )
        .arg(
            Arg::with_name("sink-interval")
                .long("sink-interval")
                .takes_value(true)
                .help("Ticks between gravity steps"),
        )
        .arg(
            Arg::with_name("reduced")
                .long("reduced")
                .help("Only use I pieces, without a preview"),
        )
        .arg(
            Arg::with_name("realtime")
                .long("realtime")
                .help("Run one tick per frame instead of as fast as possible"),
        )
        .arg(
            Arg::with_name("snapshots")
                .long("snapshots")
                .help("Write a JSON snapshot to stdout whenever the game changes"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Log more (repeat for more)"),
        )
        .get_matches();

    if let Err(err) = setup_logger(matches.occurrences_of("verbose")) {
        eprintln!("failed to set up logging: {}", err);
    }

    let seed = value_t!(matches, "seed", u64).unwrap_or_else(|e| e.exit());
    let ticks = value_t!(matches, "ticks", Tick).unwrap_or_else(|e| e.exit());
    let config = load_config(&matches);

    let script = match matches.value_of("script") {
        Some(path) => match protocol::parse_script(&read_file(path, "script")) {
            Ok(script) => script,
            Err(err) => {
                error!("{:?}: {}", path, err);
                process::exit(1);
            }
        },
        None => Vec::new(),
    };

    info!(
        "running {} tick(s) with seed {}, {} script entries",
        ticks,
        seed,
        script.len()
    );

    let pacer = if matches.is_present("realtime") {
        Some(Pacer::new(config.ticks_per_second))
    } else {
        None
    };
    let snapshots = if matches.is_present("snapshots") {
        Some(io::stdout())
    } else {
        None
    };

    let game = Game::new(config, StdRng::seed_from_u64(seed));
    let mut driver = Driver::new(game, script, snapshots);
    driver.run(ticks, pacer);

    let game = driver.game();
    info!(
        "stopped on tick {}: {} line(s) cleared{}",
        game.tick_count(),
        game.lines_cleared(),
        if game.is_topped_out() { ", topped out" } else { "" }
    );
    eprint!("{}", render::render_text(game));
}
