use std::process::ExitCode;

fn main() -> ExitCode {
    energia_cli::run()
}
