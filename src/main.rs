use imglens::MetadataError;
use std::process::ExitCode;

fn main() -> ExitCode {
    match imglens::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(MetadataError::Usage(message)) => {
            eprintln!("{message}");
            ExitCode::from(2)
        }
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}
