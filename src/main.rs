use clap::Parser;
use log::{debug, info};
use snafu::ErrorCompat;

mod args;
mod lb;

use crate::args::Args;
use crate::lb::config_reader::{build_settings, CliOverrides};
use crate::lb::LbError;

fn report(e: &LbError) {
    eprintln!("An error occured: {}", e);
    for cause in ErrorCompat::iter_chain(e).skip(1) {
        eprintln!("  caused by: {}", cause);
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    debug!("args: {:?}", args);

    let cli = CliOverrides {
        config: args.config,
        input: args.input,
        out: args.out,
        worksheet: args.worksheet,
        reader: args.reader,
        reference: args.reference,
    };

    let res = build_settings(&cli).and_then(|settings| lb::run_leaderboard(&settings));
    match res {
        Ok((csv_path, json_path)) => {
            info!("Leaderboard written");
            println!("Wrote: {} {}", csv_path.display(), json_path.display());
        }
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    }
}
