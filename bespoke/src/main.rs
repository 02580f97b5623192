use std::path::PathBuf;

use structopt::clap::AppSettings::*;
use structopt::StructOpt;

mod commands;
mod error;

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(
        name = "m",
        visible_alias = "map",
        about = "Build a bespoke binary carrying a string map"
    )]
    Map {
        #[structopt(short, long, help = "Value stored under the `name` key")]
        name: Option<String>,

        #[structopt(
            short,
            long = "entry",
            number_of_values = 1,
            parse(try_from_str = commands::map::parse_entry),
            help = "Additional KEY=VALUE pair; may be repeated"
        )]
        entries: Vec<(String, String)>,

        #[structopt(parse(from_os_str), help = "Path to the executable")]
        executable: PathBuf,

        #[structopt(parse(from_os_str), help = "Path of the bespoke binary to write")]
        output: PathBuf,
    },

    #[structopt(
        name = "f",
        visible_alias = "file",
        about = "Build a bespoke binary carrying a single file"
    )]
    File {
        #[structopt(parse(from_os_str), help = "Path to the executable")]
        executable: PathBuf,

        #[structopt(parse(from_os_str), help = "File to embed, stored under its file name")]
        source: PathBuf,

        #[structopt(parse(from_os_str), help = "Path of the bespoke binary to write")]
        output: PathBuf,
    },

    #[structopt(
        name = "l",
        visible_alias = "list",
        about = "List entries of a bespoke binary"
    )]
    List {
        #[structopt(parse(from_os_str), help = "Path to the bespoke binary")]
        image: PathBuf,
    },

    #[structopt(
        name = "x",
        visible_alias = "extract",
        about = "Extract one entry of a bespoke binary"
    )]
    Extract {
        #[structopt(parse(from_os_str), help = "Path to the bespoke binary")]
        image: PathBuf,

        #[structopt(help = "Name of the entry to extract")]
        entry: String,

        #[structopt(
            short,
            long,
            parse(from_os_str),
            help = "Write to this file instead of stdout"
        )]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "bespoke",
    about = "Build and inspect bespoke binaries: executables with a ZIP archive appended.",
    settings = &[SubcommandRequiredElseHelp, DisableHelpSubcommand, VersionlessSubcommands],
    usage = "bespoke (m|f|l|x) [FLAGS|OPTIONS] <args>..."
)]
struct CliOpts {
    #[structopt(short, long, help = "Show verbose output", global = true)]
    verbose: bool,

    #[structopt(subcommand)]
    cmd: Commands,
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let opts = CliOpts::from_iter(wild::args_os());
    init_tracing(opts.verbose);

    let result = match opts.cmd {
        Commands::Map {
            name,
            entries,
            executable,
            output,
        } => commands::map(&executable, &output, name, entries),
        Commands::File {
            executable,
            source,
            output,
        } => commands::file(&executable, &source, &output),
        Commands::List { image } => commands::list(&image),
        Commands::Extract {
            image,
            entry,
            output,
        } => commands::extract(&image, &entry, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  Caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOpts {
        CliOpts::from_iter_safe(std::iter::once("bespoke").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn map_arguments() {
        let opts = parse(&["map", "-n", "world", "-e", "a=1", "-e", "b=2", "hello", "out"]);
        match opts.cmd {
            Commands::Map {
                name,
                entries,
                executable,
                output,
            } => {
                assert_eq!(name.as_deref(), Some("world"));
                assert_eq!(
                    entries,
                    vec![("a".into(), "1".into()), ("b".into(), "2".into())]
                );
                assert_eq!(executable, PathBuf::from("hello"));
                assert_eq!(output, PathBuf::from("out"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn short_aliases() {
        assert!(matches!(parse(&["l", "img"]).cmd, Commands::List { .. }));
        assert!(matches!(
            parse(&["-v", "x", "img", "a.txt"]).cmd,
            Commands::Extract { output: None, .. }
        ));
        assert!(matches!(
            parse(&["f", "exe", "src", "out"]).cmd,
            Commands::File { .. }
        ));
    }

    #[test]
    fn rejects_bad_entry() {
        assert!(CliOpts::from_iter_safe(["bespoke", "m", "-e", "oops", "exe", "out"]).is_err());
    }
}
