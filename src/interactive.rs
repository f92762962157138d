//! Interactive console for driving plugins by hand

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use colored::Colorize;
use crossterm::{execute, terminal};
use homedir::my_home;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::commands::{Command, parse_command};
use crate::lifecycle::{Ready, Unconfigured};
use crate::plugin::{HostTestPlugin, PluginDescriptor};
use crate::plugins;
use crate::utils::{self, MemorySink, PluginOptions, PluginTable, Sink, debug};

type BoxedPlugin = Box<dyn HostTestPlugin>;

/// Where the selected plugin is in its lifecycle
enum Stage {
    Unconfigured(Unconfigured<BoxedPlugin>),
    Ready(Ready<BoxedPlugin>),
}

impl Stage {
    fn descriptor(&self) -> &'static PluginDescriptor {
        match self {
            Stage::Unconfigured(plugin) => plugin.descriptor(),
            Stage::Ready(plugin) => plugin.descriptor(),
        }
    }
}

struct Selected {
    alias: &'static str,
    stage: Stage,
}

/// Interactive session context
struct InteractiveContext {
    selected: Option<Selected>,
    options: PluginOptions,
    sink: Arc<MemorySink>,
}

impl InteractiveContext {
    fn new() -> Self {
        Self {
            selected: None,
            options: PluginOptions::new(),
            sink: Arc::new(MemorySink::new()),
        }
    }

    fn clear_plugin(&mut self) {
        self.selected = None;
        self.options.clear();
    }

    /// Print and drop whatever the plugin reported
    fn flush_diagnostics(&self) {
        for line in self.sink.lines() {
            println!("    {}", line.yellow());
        }
        self.sink.clear();
    }
}

/// Tab completion helper
struct CommandCompleter {
    commands: Vec<String>,
    show_subcommands: Vec<String>,
    plugins: Vec<String>,
    capabilities: Vec<String>,
}

impl CommandCompleter {
    fn new() -> Self {
        Self {
            commands: [
                "use", "show", "info", "set", "unset", "setup", "exec", "back", "clear", "help",
                "exit", "quit",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            show_subcommands: vec!["plugins".into(), "options".into()],
            plugins: plugins::builtin_names()
                .into_iter()
                .map(String::from)
                .collect(),
            capabilities: vec![],
        }
    }

    fn set_capabilities(&mut self, capabilities: &[&str]) {
        self.capabilities = capabilities.iter().map(|c| c.to_string()).collect();
    }

    fn pairs<'a>(candidates: impl Iterator<Item = &'a String>) -> Vec<Pair> {
        candidates
            .map(|c| Pair {
                display: c.clone(),
                replacement: c.clone(),
            })
            .collect()
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];
        let parts: Vec<&str> = line_to_cursor.split_whitespace().collect();
        let start = line_to_cursor.rfind(' ').map(|i| i + 1).unwrap_or(0);
        let fresh_word = line_to_cursor.ends_with(' ');

        let words = |candidates: &[String], partial: &str| {
            Self::pairs(candidates.iter().filter(|c| c.starts_with(partial)))
        };

        match parts.as_slice() {
            [] => Ok((0, words(&self.commands, ""))),
            [partial] if !fresh_word => Ok((0, words(&self.commands, *partial))),

            ["use"] if fresh_word => Ok((start, words(&self.plugins, ""))),
            ["use", partial] if !fresh_word => Ok((start, words(&self.plugins, *partial))),

            ["show"] if fresh_word => Ok((start, words(&self.show_subcommands, ""))),
            ["show", partial] if !fresh_word => {
                Ok((start, words(&self.show_subcommands, *partial)))
            }

            ["exec"] if fresh_word => Ok((start, words(&self.capabilities, ""))),
            ["exec", partial] if !fresh_word => Ok((start, words(&self.capabilities, *partial))),

            _ => Ok((pos, vec![])),
        }
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Borrowed(hint)
    }
}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}

/// Run the interactive console
pub fn run_interactive() -> Result<()> {
    utils::print_banner();
    println!("    Interactive Console - Type 'help' for commands\n");

    let mut ctx = InteractiveContext::new();

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let mut rl: Editor<CommandCompleter, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(CommandCompleter::new()));

    let history_path = my_home()
        .ok()
        .flatten()
        .map(|p| p.join(".hostplug_history"));
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = match &ctx.selected {
            Some(selected) => {
                let marker = match selected.stage {
                    Stage::Ready(_) => "",
                    Stage::Unconfigured(_) => "*",
                };
                format!("hostplug(\x1b[1;31m{}{}\x1b[0m) > ", selected.alias, marker)
            }
            None => "hostplug > ".to_string(),
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);

                match parse_command(&line) {
                    Command::Use(name) => {
                        cmd_use(&mut ctx, &name);
                        if let Some(helper) = rl.helper_mut() {
                            let capabilities = ctx
                                .selected
                                .as_ref()
                                .map(|s| s.stage.descriptor().capabilities)
                                .unwrap_or_default();
                            helper.set_capabilities(capabilities);
                        }
                    }
                    Command::ShowPlugins => cmd_show_plugins(),
                    Command::ShowOptions => cmd_show_options(&ctx),
                    Command::Info => cmd_info(&ctx),
                    Command::Set(opt, val) => cmd_set(&mut ctx, &opt, &val),
                    Command::Unset(opt) => cmd_unset(&mut ctx, &opt),
                    Command::Setup => cmd_setup(&mut ctx),
                    Command::Exec(capability) => cmd_exec(&ctx, &capability),
                    Command::Back => {
                        cmd_back(&mut ctx);
                        if let Some(helper) = rl.helper_mut() {
                            helper.set_capabilities(&[]);
                        }
                    }
                    Command::Help => cmd_help(),
                    Command::Clear => cmd_clear(),
                    Command::Exit => break,
                    Command::Empty => continue,
                    Command::Unknown(msg) => println!("[-] {}", msg),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                println!("Error: {}", e);
                break;
            }
        }
    }

    if let Some(path) = history_path {
        let _ = rl.save_history(&path);
    }

    println!("Goodbye!");
    Ok(())
}

// Command handlers

fn cmd_use(ctx: &mut InteractiveContext, name: &str) {
    let builtin = match plugins::find(name) {
        Some(builtin) => builtin,
        None => {
            println!("[-] Plugin not found: {}", name);
            return;
        }
    };

    let sink: Arc<dyn Sink> = ctx.sink.clone();
    let plugin = (builtin.create)(sink);
    debug(&format!("Selected plugin {}", builtin.descriptor.name));

    ctx.clear_plugin();
    ctx.selected = Some(Selected {
        alias: builtin.alias,
        stage: Stage::Unconfigured(Unconfigured::new(plugin)),
    });
    println!("[+] Using plugin: {}", builtin.descriptor.name);
    if !builtin.descriptor.stable {
        println!("{}", "[!] This plugin is not marked stable".yellow());
    }
}

fn cmd_show_plugins() {
    let rows: Vec<_> = plugins::BUILTINS
        .iter()
        .map(|b| (b.alias, b.descriptor))
        .collect();
    println!();
    println!("{}", PluginTable(&rows));
    println!();
}

fn cmd_show_options(ctx: &InteractiveContext) {
    let selected = match &ctx.selected {
        Some(selected) => selected,
        None => {
            println!("[-] No plugin selected. Use 'use <plugin>' first.");
            return;
        }
    };
    let descriptor = selected.stage.descriptor();

    println!();
    println!("{:<20} {:<40} {}", "Name", "Current", "Required");
    println!("{}", "-".repeat(72));

    for parameter in descriptor.required_parameters {
        let current = ctx.options.get(parameter).unwrap_or_default();
        println!("{:<20} {:<40} {}", parameter, shorten(current), "yes");
    }
    for (key, value) in ctx.options.iter() {
        if !descriptor.required_parameters.contains(&key) {
            println!("{:<20} {:<40} {}", key, shorten(value), "no");
        }
    }
    println!();
}

fn shorten(value: &str) -> String {
    if value.chars().count() > 37 {
        format!("{}...", value.chars().take(34).collect::<String>())
    } else {
        value.to_string()
    }
}

fn cmd_info(ctx: &InteractiveContext) {
    match &ctx.selected {
        Some(selected) => {
            println!();
            print!("{}", selected.stage.descriptor());
            let state = match selected.stage {
                Stage::Ready(_) => "ready".green(),
                Stage::Unconfigured(_) => "not set up".yellow(),
            };
            println!("State: {}", state);
            println!();
        }
        None => println!("[-] No plugin selected. Use 'use <plugin>' first."),
    }
}

fn cmd_set(ctx: &mut InteractiveContext, opt: &str, value: &str) {
    ctx.options.set(opt, value);
    println!("{} => {}", opt, value);
}

fn cmd_unset(ctx: &mut InteractiveContext, opt: &str) {
    if ctx.options.remove(opt).is_some() {
        println!("Unset {}", opt);
    } else {
        println!("[-] Option '{}' was not set", opt);
    }
}

fn cmd_setup(ctx: &mut InteractiveContext) {
    let selected = match ctx.selected.take() {
        Some(selected) => selected,
        None => {
            println!("[-] No plugin selected. Use 'use <plugin>' first.");
            return;
        }
    };

    let unconfigured = match selected.stage {
        Stage::Unconfigured(plugin) => plugin,
        Stage::Ready(plugin) => plugin.reset(),
    };

    let stage = match unconfigured.setup(&ctx.options) {
        Ok(ready) => {
            println!("[+] Setup complete");
            Stage::Ready(ready)
        }
        Err(failed) => {
            println!("[-] {}", failed);
            Stage::Unconfigured(failed.plugin)
        }
    };
    ctx.flush_diagnostics();
    ctx.selected = Some(Selected {
        alias: selected.alias,
        stage,
    });
}

fn cmd_exec(ctx: &InteractiveContext, capability: &str) {
    let plugin = match &ctx.selected {
        Some(Selected {
            stage: Stage::Ready(plugin),
            ..
        }) => plugin,
        Some(_) => {
            println!("[-] Plugin is not set up. Run 'setup' first.");
            return;
        }
        None => {
            println!("[-] No plugin selected. Use 'use <plugin>' first.");
            return;
        }
    };

    let bar = ProgressBar::new_spinner();
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar.set_message(format!("Executing {}...", capability));

    let start_time = Instant::now();
    let result = plugin.execute(capability, &ctx.options);
    let elapsed = start_time.elapsed();

    match result {
        Ok(()) => {
            if let Ok(style) = ProgressStyle::with_template("{prefix} {msg}") {
                bar.set_style(style);
            }
            bar.set_prefix("[+]");
            bar.finish_with_message(format!(
                "{} completed in {:.2}s",
                capability,
                elapsed.as_secs_f64()
            ));
        }
        Err(e) => {
            bar.finish_and_clear();
            println!("[-] {} failed: {}", capability, e);
        }
    }
    ctx.flush_diagnostics();
}

fn cmd_back(ctx: &mut InteractiveContext) {
    match ctx.selected.take() {
        Some(selected) => {
            ctx.clear_plugin();
            println!("[*] Unloaded plugin: {}", selected.alias);
        }
        None => println!("[-] No plugin selected"),
    }
}

fn cmd_help() {
    println!(
        r#"
Commands:
  use <plugin>         Select a plugin (e.g., use copy_shell)
  show plugins         List built-in plugins
  show options         Show options for the current plugin
  info                 Show the current plugin's descriptor
  set <opt> <value>    Set an option value
  unset <opt>          Clear an option value
  setup                Set up the plugin with the current options
  exec <capability>    Execute a capability with the current options
  back                 Unload the current plugin
  clear                Clear the screen
  help                 Show this help message
  exit                 Exit the console

Examples:
  use copy_shell
  set image_path build/blinky.bin
  set destination_disk /media/DAPLINK
  setup
  exec cp
"#
    );
}

fn cmd_clear() {
    let _ = execute!(std::io::stdout(), terminal::Clear(terminal::ClearType::All));
    let _ = execute!(std::io::stdout(), crossterm::cursor::MoveTo(0, 0));
}
