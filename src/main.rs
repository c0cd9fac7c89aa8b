use clap::Parser;
use mrca::cli::commands::execute_command;
use mrca::cli::{output, Cli};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    if let Err(e) = execute_command(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    // Dependencies that are too chatty at trace level
    let noisy_modules = ["rayon", "config"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Logs go to stderr so that stdout stays pipeable
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrca::util::testing;
    use tracing::info;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        testing::init_test_setup();
        use clap::CommandFactory;
        Cli::command().debug_assert();
        info!("Debug mode: info");
    }

    #[test]
    fn given_repeated_regex_when_parsing_then_collects_all() {
        let cli =
            Cli::try_parse_from(["mrca", "find", "-t", "t.nwk", "-r", "A", "-r", "B|C"]).unwrap();
        match cli.command {
            Some(mrca::cli::Commands::Find { regex, .. }) => assert_eq!(regex, vec!["A", "B|C"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_full_match_and_match_mode_when_parsing_then_conflicts() {
        let result = Cli::try_parse_from([
            "mrca", "tips", "-t", "t.nwk", "-r", "A", "--full-match", "--match-mode", "search",
        ]);
        assert!(result.is_err());
    }
}
