use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use hostplug::lifecycle::Unconfigured;
use hostplug::plugins;
use hostplug::utils::{self, PluginOptions, PluginTable, Sink, StdoutSink};

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Run host test plugins: copy images to targets, reset devices and other auxiliary test actions.",
    long_about = "hostplug drives host test plugins the way a hardware test harness does: a plugin is selected by name, set up with key=value options, then asked to execute one of its capabilities. Exit status is 0 when the capability succeeded and 1 otherwise."
)]
struct Args {
    #[arg(short = '!', long, long_help = "Enable debug mode", default_value = "false", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Action>,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// List built-in plugins
    List,
    /// Show a plugin's descriptor
    Info {
        #[arg(help = "Plugin alias or name")]
        plugin: String,
    },
    /// Set up a plugin and execute one capability
    Exec {
        #[arg(help = "Plugin alias or name")]
        plugin: String,

        #[arg(help = "Capability to execute")]
        capability: String,

        #[arg(help = "Plugin options as key=value", last = true)]
        options: Vec<String>,
    },
    /// Start the interactive console
    Console,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.debug {
        unsafe {
            env::set_var(utils::logging::DEBUG_ENV, "1");
        }
    }

    let result = match args.command.unwrap_or(Action::Console) {
        Action::List => list(),
        Action::Info { plugin } => info(&plugin),
        Action::Exec {
            plugin,
            capability,
            options,
        } => exec(&plugin, &capability, &options),
        Action::Console => hostplug::interactive::run_interactive(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{} {}", "[-]".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn list() -> anyhow::Result<()> {
    let rows: Vec<_> = plugins::BUILTINS
        .iter()
        .map(|b| (b.alias, b.descriptor))
        .collect();
    println!("{}", PluginTable(&rows));
    Ok(())
}

fn info(name: &str) -> anyhow::Result<()> {
    let builtin = plugins::find(name).ok_or_else(|| anyhow!("Plugin not found: {}", name))?;
    println!("Alias: {}", builtin.alias);
    print!("{}", builtin.descriptor);
    Ok(())
}

fn exec(name: &str, capability: &str, raw_options: &[String]) -> anyhow::Result<()> {
    let options = PluginOptions::parse_pairs(raw_options)?;
    let sink: Arc<dyn Sink> = Arc::new(StdoutSink);
    let plugin = plugins::instantiate(name, sink).ok_or_else(|| anyhow!("Plugin not found: {}", name))?;

    if !plugin.descriptor().supports(capability) {
        utils::debug(&format!(
            "{} does not declare capability '{}'",
            plugin.descriptor().name,
            capability
        ));
    }
    if !options.is_empty() {
        utils::debug(&format!("Options: {}", options));
    }

    let ready = Unconfigured::new(plugin)
        .setup(&options)
        .map_err(|failed| anyhow!(failed.error))?;

    let bar = ProgressBar::new_spinner();
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_message(format!("Executing {}...", capability));

    match ready.execute(capability, &options) {
        Ok(()) => {
            bar.set_style(ProgressStyle::with_template("{prefix} {msg}")?);
            bar.set_prefix("[+]");
            bar.finish_with_message(format!("{} {} completed", ready.descriptor().name, capability));
            Ok(())
        }
        Err(e) => {
            bar.finish_and_clear();
            Err(anyhow!(e))
        }
    }
}
