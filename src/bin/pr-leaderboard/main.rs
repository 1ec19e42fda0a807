mod display;

use pr_leaderboard::{
    CountingMode, GitHub, MergeTally, ReviewTally, RunConfig, collect_stats, parse_args,
};

use display::{write_merge_leaderboard, write_review_leaderboard};

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(config: RunConfig) -> anyhow::Result<()> {
    // No request is made without a token.
    let github = GitHub::from_env(&config.api)?;

    match config.mode {
        CountingMode::Merges => {
            let tallies = collect_stats(&github, &config, &MergeTally).await?;
            write_merge_leaderboard(&tallies, &mut std::io::stdout().lock())
        }
        CountingMode::Reviews(buckets) => {
            let tallies = collect_stats(&github, &config, &ReviewTally { buckets }).await?;
            write_review_leaderboard(&tallies, buckets, &mut std::io::stdout().lock())
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let config = match parse_args(std::env::args()) {
        Ok(config) => config,
        Err(err) => match err.downcast_ref::<clap::Error>() {
            Some(clap_err) => handle_clap_help_version(clap_err),
            None => {
                eprintln!("Error: {err:#}");
                std::process::exit(2);
            }
        },
    };

    if let Err(err) = run(config).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
