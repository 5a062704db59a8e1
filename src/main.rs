use clap::Parser;

use eh_metrics::cli::{Cli, Commands};
use eh_metrics::commands::{run_check, run_investigate, run_report, run_scan};

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(cli.verbose >= 2)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let exit_code = match &cli.command {
        Commands::Scan(args) => run_scan(args, &cli),
        Commands::Check(args) => run_check(args, &cli),
        Commands::Investigate(args) => run_investigate(args, &cli),
        Commands::Report(args) => run_report(args, &cli),
    };

    std::process::exit(exit_code);
}
