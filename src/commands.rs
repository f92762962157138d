//! Command parsing for the interactive console

/// Represents a parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Select a plugin: use copy_shell
    Use(String),
    /// Show built-in plugins: show plugins
    ShowPlugins,
    /// Show options set for the current plugin: show options
    ShowOptions,
    /// Show the current plugin's descriptor: info
    Info,
    /// Set an option value: set image_path build/blinky.bin
    Set(String, String),
    /// Clear an option value: unset image_path
    Unset(String),
    /// Run the plugin's setup with the current options: setup
    Setup,
    /// Execute a capability with the current options: exec cp
    Exec(String),
    /// Unload the current plugin: back
    Back,
    /// Show help: help or ?
    Help,
    /// Clear screen: clear
    Clear,
    /// Exit the console: exit or quit
    Exit,
    /// Empty input (just pressed enter)
    Empty,
    /// Unknown command
    Unknown(String),
}

/// Parse a line of input into a Command
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();

    match parts.as_slice() {
        ["use", plugin] => Command::Use(plugin.to_string()),
        ["use"] => Command::Unknown("use requires a plugin name".to_string()),

        ["show", "plugins"] => Command::ShowPlugins,
        ["show", "options"] => Command::ShowOptions,
        ["show", ..] => Command::Unknown("show requires 'plugins' or 'options'".to_string()),

        ["info"] => Command::Info,

        ["set", opt, value @ ..] if !value.is_empty() => {
            Command::Set(opt.to_string(), value.join(" "))
        }
        ["set", ..] => Command::Unknown("set requires option and value".to_string()),

        ["unset", opt] => Command::Unset(opt.to_string()),
        ["unset"] => Command::Unknown("unset requires option name".to_string()),

        ["setup"] => Command::Setup,

        ["exec", capability] => Command::Exec(capability.to_string()),
        ["exec", ..] => Command::Unknown("exec requires exactly one capability".to_string()),

        ["back"] => Command::Back,

        ["help"] | ["?"] => Command::Help,

        ["clear"] => Command::Clear,

        ["exit"] | ["quit"] => Command::Exit,

        _ => Command::Unknown(format!("Unknown command: {}", parts[0])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_use() {
        assert_eq!(parse_command("use copy_shell"), Command::Use("copy_shell".into()));
        assert!(matches!(parse_command("use"), Command::Unknown(_)));
    }

    #[test]
    fn test_parse_set() {
        match parse_command("set reset_cmd st-flash reset") {
            Command::Set(opt, val) => {
                assert_eq!(opt, "reset_cmd");
                assert_eq!(val, "st-flash reset");
            }
            other => panic!("Expected Set command, got {:?}", other),
        }
        assert!(matches!(parse_command("set port"), Command::Unknown(_)));
    }

    #[test]
    fn test_parse_exec() {
        assert_eq!(parse_command("  exec cp "), Command::Exec("cp".into()));
        assert!(matches!(parse_command("exec"), Command::Unknown(_)));
        assert!(matches!(parse_command("exec cp copy"), Command::Unknown(_)));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command(""), Command::Empty);
        assert_eq!(parse_command("show plugins"), Command::ShowPlugins);
        assert_eq!(parse_command("?"), Command::Help);
        assert_eq!(parse_command("quit"), Command::Exit);
        assert_eq!(parse_command("setup"), Command::Setup);
        assert!(matches!(parse_command("flash"), Command::Unknown(_)));
    }
}
