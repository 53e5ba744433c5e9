use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = rfidtap_cli::Cli::parse();
    match rfidtap_cli::run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("{error}");
            ExitCode::from(error.exit_code())
        }
    }
}
