use std::process::ExitCode;

use cachegroup_cli::{command, log_format, logging, run};

fn main() -> ExitCode {
    let matches = command().get_matches();

    let format = match log_format(&matches) {
        Ok(format) => format,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = logging::init(format) {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(&matches) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
