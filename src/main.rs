use clap::Parser;
use colored::Colorize;

use linkpulse::cli::{Cli, Commands};
use linkpulse::config::{StaticConfig, init_config_from};
use linkpulse::errors::LinkpulseError;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::ConfigGen { output } = cli.command() {
        return generate_config(output.as_deref());
    }

    init_config_from(&cli.config);
    let config = linkpulse::config::get_config();

    // guard 必须存活到进程结束，保证日志落盘
    let _guard = linkpulse::system::logging::init_logging(&config)?;

    if let Err(e) = linkpulse::runtime::modes::run_server().await {
        match e.downcast_ref::<LinkpulseError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("{} {:#}", "[ERROR]".red().bold(), e),
        }
        std::process::exit(1);
    }

    Ok(())
}

fn generate_config(output: Option<&str>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            StaticConfig::default()
                .save_to_file(path)
                .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path, e))?;
            println!("{} sample configuration written to {}", "✓".green(), path);
        }
        None => println!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}
