//! Station simulation binary

#![warn(missing_docs)]

use std::sync::Arc;

use train_station_core::Config;
use train_station_driver::slug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command line options
#[derive(Debug)]
struct Opts {
    /// Configuration of the simulation
    config: Config,

    /// Run against the single condition variable “slug” station 🐌
    slug: bool,
}

impl Opts {
    fn from_args() -> Self {
        let mut opts = Opts {
            config: Config::default(),
            slug: false,
        };

        let mut option: Option<String> = None;
        for arg in std::env::args().skip(1) {
            if let Some(opt) = option {
                match opt.as_str() {
                    "-passengers" => {
                        opts.config.passengers = parse_or_exit(&opt, &arg);
                    }
                    "-trains" => opts.config.trains = parse_or_exit(&opt, &arg),
                    "-max-free-seats" => {
                        opts.config.max_free_seats = parse_or_exit(&opt, &arg);
                    }
                    "-seed" => opts.config.seed = Some(parse_or_exit(&opt, &arg)),
                    "-departure-grace-ms" => {
                        opts.config.departure_grace_ms = parse_or_exit(&opt, &arg);
                    }
                    _ => {
                        eprintln!("Error: unknown option {opt}");
                        std::process::exit(1);
                    }
                }
                option = None;
            } else {
                match arg.as_str() {
                    "-slug" => opts.slug = true,
                    _ => option = Some(arg),
                }
            }
        }
        if let Some(opt) = option {
            eprintln!("Error: leftover option {opt}");
            std::process::exit(1);
        }

        opts
    }
}

fn parse_or_exit<T: std::str::FromStr>(opt: &str, arg: &str) -> T {
    match arg.parse() {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Error: {opt} takes a non-negative decimal integer, got {arg:?}");
            std::process::exit(1);
        }
    }
}

fn main() {
    let opts = Opts::from_args();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let result = if opts.slug {
        train_station_driver::run(Arc::new(slug::Station::new()), &opts.config)
    } else {
        train_station_driver::run(
            Arc::new(train_station_monitor::Station::new()),
            &opts.config,
        )
    };

    match result {
        Ok(report) if report.cleared() => {}
        Ok(report) => {
            tracing::warn!(
                waiting = report.waiting,
                boarded = report.boarded,
                "station not cleared"
            );
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
