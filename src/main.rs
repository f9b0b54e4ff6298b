use projector::app;
use projector::app::formatter::OutputGenerator;

fn main() {
    if let Err(err) = app::run() {
        eprintln!("{}", OutputGenerator::new(true).error(&format!("{:#}", err)));
        std::process::exit(1);
    }
}
