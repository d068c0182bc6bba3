use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use packager_cli::config::{PackagerConfig, get_config};
use packager_cli::{
    CliError, CliResult, ExitCode, PackagerArgs, PackagerOrchestrator, terminal,
};
use packager_core::{JsonSessionProvider, PluginRegistry};

fn main() {
    let args = PackagerArgs::parse();

    // Initialize logging based on debug flag
    if args.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("packager_core", log::LevelFilter::Debug)
            .filter_module("packager_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let code = match run(&args) {
        Ok(()) => ExitCode::Success,
        Err(error) => {
            eprint!("{}", error.format_for_user(args.debug));
            error.exit_code()
        }
    };

    std::process::exit(code as i32);
}

fn run(args: &PackagerArgs) -> CliResult<()> {
    // usage must print even when the configuration is broken
    let config = if args.help {
        get_config(args.config.clone()).unwrap_or_else(|error| {
            log::debug!("Using default configuration for help: {error:#}");
            PackagerConfig::default()
        })
    } else {
        get_config(args.config.clone()).context("Failed to load configuration")?
    };

    if !config.output.color_enabled {
        colored::control::set_override(false);
    }

    let mut warnings = Vec::new();
    let request = args.to_request(&mut warnings);
    for warning in &warnings {
        eprintln!("{} {warning}", "Warning:".yellow());
    }

    let store_path = config.store.store_path();
    log::debug!("Using repository store {}", store_path.display());
    let provider = JsonSessionProvider::new(&store_path)
        .with_handle_prefix(&config.store.handle_prefix)
        .with_principals(&config.store.principals);
    let registry = PluginRegistry::builtin();

    let usage = PackagerArgs::command().render_help().to_string();
    let mut orchestrator = PackagerOrchestrator::new(&provider, &registry)
        .with_usage(&usage)
        .with_color(config.output.color_enabled && terminal::supports_ansi())
        .with_progress(config.output.progress_enabled && terminal::should_show_progress())
        .with_no_user_interaction(config.interaction.no_user_interaction);

    match orchestrator.run(&request) {
        Ok(summary) => {
            log::debug!("Run finished: {:?}", summary.outcome);
            Ok(())
        }
        Err(error) => {
            let mut known_types = registry.ingester_names();
            for name in registry.disseminator_names() {
                if !known_types.contains(&name) {
                    known_types.push(name);
                }
            }
            Err(CliError::from_core_error(error, &known_types))
        }
    }
}
