// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runs the gallery's dataset aggregations over embedded datasets and prints one JSON line per
//! chart.
//!
//! Set `RUST_LOG=debug` to see per-pass summaries from `chartdata_transforms`.

mod charts;
mod datasets;

use std::error::Error;

use tracing_subscriber::EnvFilter;

/// Command-line options.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DemoOptions {
    /// Restrict output to one dataset; all datasets when `None`.
    pub(crate) dataset: Option<&'static str>,
    /// Bin count for fixed-count histograms, and the upper bound for "nice" ones.
    pub(crate) bins: usize,
    /// Include quartiles in summaries.
    pub(crate) quartiles: bool,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            dataset: None,
            bins: 10,
            quartiles: false,
        }
    }
}

impl DemoOptions {
    /// Parses arguments (without the program name). Returns `Ok(None)` when help was requested.
    fn from_args(args: impl IntoIterator<Item = String>) -> Result<Option<Self>, Box<dyn Error>> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dataset" => {
                    let value = args
                        .next()
                        .ok_or("--dataset requires a name (e.g. movies)")?;
                    let name = datasets::NAMES
                        .into_iter()
                        .find(|n| *n == value)
                        .ok_or_else(|| format!("unknown dataset: {value}"))?;
                    options.dataset = Some(name);
                }
                "--bins" => {
                    let value = args.next().ok_or("--bins requires a count")?;
                    options.bins = value
                        .parse()
                        .map_err(|err| format!("invalid bin count {value:?}: {err}"))?;
                }
                "--quartiles" => {
                    options.quartiles = true;
                }
                "--help" | "-h" => {
                    return Ok(None);
                }
                other => {
                    return Err(format!("unknown argument: {other}").into());
                }
            }
        }
        Ok(Some(options))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(options) = DemoOptions::from_args(std::env::args().skip(1))? else {
        print_help();
        return Ok(());
    };
    tracing::debug!(?options, "starting");

    let names: Vec<&'static str> = match options.dataset {
        Some(name) => vec![name],
        None => datasets::NAMES.to_vec(),
    };
    for name in names {
        let records = datasets::load(name)?.ok_or_else(|| format!("unknown dataset: {name}"))?;
        for chart in charts::render(name, &records, &options) {
            println!("{}", serde_json::to_string(&chart)?);
        }
    }
    Ok(())
}

fn print_help() {
    println!(
        "chartdata_demo\n\
         Usage:\n\
         \tchartdata_demo [--dataset <name>] [--bins N] [--quartiles]\n\
         Options:\n\
         \t--dataset <name>     Only run one dataset: costs, movies, penguins or trials\n\
         \t--bins <n>           Histogram bin count, or the bound for nice bins (default 10)\n\
         \t--quartiles          Add quartiles to summaries\n\
         \t-h, --help           Show this help"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<DemoOptions>, Box<dyn Error>> {
        DemoOptions::from_args(args.iter().map(|a| (*a).to_owned()))
    }

    #[test]
    fn defaults_without_arguments() {
        assert_eq!(parse(&[]).unwrap(), Some(DemoOptions::default()));
    }

    #[test]
    fn parses_every_flag() {
        let options = parse(&["--dataset", "movies", "--bins", "30", "--quartiles"])
            .unwrap()
            .unwrap();
        assert_eq!(options.dataset, Some("movies"));
        assert_eq!(options.bins, 30);
        assert!(options.quartiles);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--dataset", "weather"]).is_err());
        assert!(parse(&["--bins", "many"]).is_err());
        assert!(parse(&["--bins"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["--help"]).unwrap().is_none());
    }
}
