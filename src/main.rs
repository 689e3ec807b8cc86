use std::io::Write;
use std::process::ExitCode;

fn init_logger() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    init_logger();

    match css_prune::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
