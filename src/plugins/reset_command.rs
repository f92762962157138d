//! Resets a target by invoking an external reset tool with the target's id.

use std::env;
use std::path::Path;
use std::sync::Arc;

use crate::error::PluginResult;
use crate::plugin::{CapabilityTable, HostTestPlugin, PluginBase, PluginDescriptor};
use crate::utils::{self, HostCommand, PluginOptions, Sink};

pub const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "HostTestPluginResetMethod_Command",
    kind: "ResetMethod",
    capabilities: &["command", "shell"],
    required_parameters: &["target_id"],
    stable: false,
};

pub struct ResetCommand {
    base: PluginBase,
    capabilities: CapabilityTable<ResetCommand>,
    tool: Option<String>,
}

impl ResetCommand {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            base: PluginBase::new(&DESCRIPTOR, sink),
            capabilities: CapabilityTable::new()
                .with("command", Self::reset_direct)
                .with("shell", Self::reset_shell),
            tool: None,
        }
    }

    pub fn tool(&self) -> Option<&str> {
        self.tool.as_deref()
    }

    fn configured_tool(&self) -> PluginResult<&str> {
        match self.tool.as_deref() {
            Some(tool) => Ok(tool),
            None => Err(self.base.not_configured("Reset tool not configured, call setup first")),
        }
    }

    fn target_id<'a>(&self, capability: &str, options: &'a PluginOptions) -> PluginResult<&'a str> {
        self.check_parameters(capability, options)?;
        options
            .require("target_id")
            .ok_or_else(|| self.base.missing(capability, "target_id"))
    }

    fn reset_direct(&self, options: &PluginOptions) -> PluginResult<()> {
        let target_id = self.target_id("command", options)?;
        let tool = self.configured_tool()?;
        self.run_command(&HostCommand::argv([tool, target_id]))
    }

    fn reset_shell(&self, options: &PluginOptions) -> PluginResult<()> {
        let target_id = self.target_id("shell", options)?;
        let tool = self.configured_tool()?;
        self.run_command(&HostCommand::shell_argv([tool, target_id]))
    }
}

impl HostTestPlugin for ResetCommand {
    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn setup(&mut self, options: &PluginOptions) -> PluginResult<()> {
        let tool = options
            .require("tool")
            .ok_or_else(|| self.base.missing("setup", "tool"))?;

        if !tool_available(tool) {
            return Err(self
                .base
                .invalid("tool", format!("'{}' not found on PATH", tool)));
        }

        utils::debug(&format!("{}: using reset tool '{}'", DESCRIPTOR.name, tool));
        self.tool = Some(tool.to_string());
        Ok(())
    }

    fn execute(&self, capability: &str, options: &PluginOptions) -> PluginResult<()> {
        self.capabilities.dispatch(self, capability, options)
    }
}

pub fn create(sink: Arc<dyn Sink>) -> Box<dyn HostTestPlugin> {
    Box::new(ResetCommand::new(sink))
}

/// Whether `tool` names an existing file, directly or through `PATH`
pub fn tool_available(tool: &str) -> bool {
    let path = Path::new(tool);
    if path.is_absolute() || path.components().count() > 1 {
        return path.is_file();
    }

    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| {
        dir.join(tool).is_file()
            || (cfg!(target_os = "windows") && dir.join(format!("{}.exe", tool)).is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureKind, PluginError};
    use crate::utils::MemorySink;

    fn plugin() -> (ResetCommand, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<dyn Sink> = sink.clone();
        (ResetCommand::new(shared), sink)
    }

    #[test]
    fn test_setup_requires_tool() {
        let (mut plugin, sink) = plugin();
        match plugin.setup(&PluginOptions::new()) {
            Err(PluginError::MissingParameter { parameter, .. }) => assert_eq!(parameter, "tool"),
            other => panic!("Expected MissingParameter, got {:?}", other),
        }
        assert_eq!(
            sink.lines(),
            vec!["HostTestPluginResetMethod_Command::ResetMethod: Plugin parameter 'tool' missing!"]
        );
        assert!(plugin.tool().is_none());
    }

    #[test]
    fn test_setup_rejects_unknown_tool() {
        let (mut plugin, _) = plugin();
        let options = PluginOptions::new().with("tool", "hostplug-no-such-reset-tool");
        let err = plugin.setup(&options).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ConfigurationIncomplete);
    }

    #[test]
    fn test_execute_before_setup() {
        let (plugin, _) = plugin();
        let err = plugin
            .execute("command", &PluginOptions::new().with("target_id", "0240"))
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotConfigured);
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_runs_tool() {
        let (mut plugin, sink) = plugin();
        let options = PluginOptions::new().with("tool", "true").with("target_id", "0240");

        assert!(plugin.setup(&options).is_ok());
        assert_eq!(plugin.tool(), Some("true"));
        assert!(plugin.execute("command", &options).is_ok());
        assert!(plugin.execute("shell", &options).is_ok());
        assert!(sink.lines().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_tool_failure() {
        let (mut plugin, sink) = plugin();
        let options = PluginOptions::new().with("tool", "false").with("target_id", "0240");

        assert!(plugin.setup(&options).is_ok());
        match plugin.execute("command", &options) {
            Err(PluginError::CommandFailed { code, .. }) => assert_eq!(code, Some(1)),
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
        assert_eq!(
            sink.lines(),
            vec!["HostTestPluginResetMethod_Command::ResetMethod: [ret=1] Command: false 0240"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_reset_keeps_target_id_literal() {
        let (mut plugin, _) = plugin();
        let scratch = tempfile::tempdir().unwrap();
        let marker = scratch.path().join("marker");
        let target_id = format!("0240; touch {}", marker.display());

        // `test` with a single non-empty argument succeeds, with several it fails
        let options = PluginOptions::new().with("tool", "test").with("target_id", &target_id);
        assert!(plugin.setup(&options).is_ok());
        assert!(plugin.execute("shell", &options).is_ok());
        assert!(plugin.execute("command", &options).is_ok());
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_available() {
        assert!(tool_available("sh"));
        assert!(tool_available("/bin/sh"));
        assert!(!tool_available("hostplug-no-such-reset-tool"));
    }
}
