use onedev_relay_cli::{run_cli, CliError};
use tracing::error;

fn main() {
    if let Err(e) = run_cli() {
        error!("CLI error: {}", e);

        let exit_code = match e {
            CliError::Configuration(_) => 1,
            CliError::Processing(_) => 2,
            CliError::Serialization { .. } => 3,
            CliError::Io { .. } => 5,
        };

        std::process::exit(exit_code);
    }
}
