use std::fmt;
use std::io;
use std::process::{Command, ExitStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Invocation {
    /// Program plus arguments, no shell involved
    Direct,
    /// A single line the shell interprets as written
    ShellLine,
    /// Program plus arguments, each quoted before reaching the shell
    ShellArgv,
}

/// An external command, run either through the system shell or directly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    argv: Vec<String>,
    invocation: Invocation,
}

impl HostCommand {
    /// A command line interpreted by the system shell
    pub fn shell(line: impl Into<String>) -> Self {
        Self {
            argv: vec![line.into()],
            invocation: Invocation::ShellLine,
        }
    }

    /// Program and arguments, executed without a shell
    pub fn argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            invocation: Invocation::Direct,
        }
    }

    /// Program and arguments run through the system shell
    ///
    /// Every element is quoted for the shell, so each one reaches the
    /// program as a single literal argument.
    pub fn shell_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            invocation: Invocation::ShellArgv,
            ..Self::argv(argv)
        }
    }

    pub fn uses_shell(&self) -> bool {
        self.invocation != Invocation::Direct
    }

    /// The line handed to the shell
    pub fn shell_line(&self) -> String {
        match self.invocation {
            Invocation::ShellArgv => self
                .argv
                .iter()
                .map(|arg| quote(arg))
                .collect::<Vec<String>>()
                .join(" "),
            Invocation::Direct | Invocation::ShellLine => self.argv.join(" "),
        }
    }

    #[cfg(target_os = "windows")]
    fn shell_command(line: String) -> Command {
        use std::os::windows::process::CommandExt;

        // cmd does not understand the \" escaping `arg` applies
        let mut command = Command::new("cmd");
        command.arg("/C").raw_arg(line);
        command
    }

    #[cfg(not(target_os = "windows"))]
    fn shell_command(line: String) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(line);
        command
    }

    fn to_command(&self) -> io::Result<Command> {
        if self.uses_shell() {
            return Ok(Self::shell_command(self.shell_line()));
        }

        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        let mut command = Command::new(program);
        command.args(args);
        Ok(command)
    }

    /// Run to completion, inheriting stdio; blocks the calling thread
    pub fn status(&self) -> io::Result<ExitStatus> {
        self.to_command()?.status()
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

fn is_plain(arg: &str) -> bool {
    !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,+@".contains(c))
}

/// Quote one argument for `sh`: single quotes, with embedded quotes spliced as `'\''`
#[cfg(not(target_os = "windows"))]
pub fn quote(arg: &str) -> String {
    if is_plain(arg) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Quote one argument for `cmd`: double quotes make `&|<>^` literal, `"` doubles
#[cfg(target_os = "windows")]
pub fn quote(arg: &str) -> String {
    if is_plain(arg) {
        return arg.to_string();
    }
    format!("\"{}\"", arg.replace('"', "\"\""))
}
