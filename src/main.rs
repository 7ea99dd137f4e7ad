use clap::Parser;
use tracing_subscriber::EnvFilter;

use gvcf_panel::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("gvcf_panel=debug,info")
    } else {
        EnvFilter::new("gvcf_panel=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let result = match cli.command {
        cli::Commands::Genotype(args) => cli::genotype::run(args, cli.format, cli.verbose),
        cli::Commands::Call(args) => cli::call::run(args, cli.format, cli.verbose),
    };

    // The consumer closed the pipe; nothing useful to report
    if let Err(err) = &result {
        if cli::is_broken_pipe(err) {
            std::process::exit(1);
        }
    }

    result
}
