use std::io;

mod cli;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let stdin = io::stdin();
    let stdout = io::stdout();

    // Logging is set up inside `run`, once `source.log_level` is known.
    if let Err(err) = cli::run(&args, &mut stdin.lock(), &mut stdout.lock()) {
        eprintln!("cogito error: {:#}", err);
        std::process::exit(1);
    }
}
