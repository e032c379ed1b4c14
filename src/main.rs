use log::{debug, info};

use clap::Parser;
use snafu::ErrorCompat;

mod args;
mod report;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("args: {:?}", args);

    let res = report::config_reader::build_settings(&args)
        .map_err(Box::new)
        .and_then(|settings| report::run_report(&settings));

    match res {
        Ok(summaries) => {
            info!("Wrote {} pages", summaries.len());
        }
        Err(e) => {
            eprintln!("An error occured: {}", e);
            for cause in ErrorCompat::iter_chain(&*e).skip(1) {
                eprintln!("  caused by: {}", cause);
            }
            if let Some(bt) = ErrorCompat::backtrace(&*e) {
                eprintln!("trace: {}", bt);
            }
            std::process::exit(1);
        }
    }
}
