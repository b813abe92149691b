use std::process::ExitCode;

fn main() -> ExitCode {
    foodie_cli::run()
}
