use std::process::ExitCode;

fn main() -> ExitCode {
    match bezcad::app::run(std::env::args().skip(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            if matches!(err, bezcad::app::AppError::Options(_)) {
                eprintln!("{}", bezcad::app::USAGE);
            }
            ExitCode::FAILURE
        }
    }
}
