//! Prints `hello <name>` using the `name` key of the map embedded in this
//! executable. Run on its own, without a map, it prints why the map could
//! not be read instead.

use bespoke_format::{PayloadMap, ReadError};
use gumdrop::Options;

#[derive(Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "log how the embedded map is located and read")]
    verbose: bool,
}

fn greeting(map: Result<PayloadMap, ReadError>) -> String {
    match map {
        Ok(map) => format!("hello {}", map.get("name").map(String::as_str).unwrap_or("")),
        Err(e) => e.to_string(),
    }
}

fn main() {
    let args = Args::parse_args_default_or_exit();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    println!("{}", greeting(bespoke_format::read_map()));
}
