use std::fmt;
use std::sync::Arc;

use crate::error::{PluginError, PluginResult, display_code};
use crate::utils::{self, HostCommand, PluginOptions, Sink, StdoutSink};

/// Static description of a plugin type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginDescriptor {
    /// Plugin name, usually the plugin type's name
    pub name: &'static str,
    /// Plugin category, e.g. `ResetMethod` or `CopyMethod`
    pub kind: &'static str,
    /// Names of the capabilities this plugin can perform
    pub capabilities: &'static [&'static str],
    /// Options every capability invocation must carry, in check order
    pub required_parameters: &'static [&'static str],
    /// Whether the plugin is considered ready for use
    pub stable: bool,
}

impl PluginDescriptor {
    pub const BASE: PluginDescriptor = PluginDescriptor {
        name: "HostTestPluginBase",
        kind: "BasePlugin",
        capabilities: &[],
        required_parameters: &[],
        stable: false,
    };

    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.contains(&capability)
    }
}

impl fmt::Display for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Type: {}", self.kind)?;
        writeln!(f, "Stable: {}", if self.stable { "yes" } else { "no" })?;
        if !self.capabilities.is_empty() {
            writeln!(f, "Capabilities: {}", self.capabilities.join(", "))?;
        }
        if !self.required_parameters.is_empty() {
            writeln!(f, "Required parameters:")?;
            for parameter in self.required_parameters {
                writeln!(f, "  --{}", parameter)?;
            }
        }
        Ok(())
    }
}

/// State and helpers shared by every plugin
///
/// Concrete plugins embed a `PluginBase` and expose it through
/// [`HostTestPlugin::base`], which gives them parameter checking, command
/// execution and diagnostics prefixed with `<name>::<type>`.
pub struct PluginBase {
    descriptor: &'static PluginDescriptor,
    sink: Arc<dyn Sink>,
}

impl PluginBase {
    pub fn new(descriptor: &'static PluginDescriptor, sink: Arc<dyn Sink>) -> Self {
        Self { descriptor, sink }
    }

    pub fn descriptor(&self) -> &'static PluginDescriptor {
        self.descriptor
    }

    /// Write a diagnostic line to the sink
    pub fn report(&self, message: &str) {
        self.sink.emit(&format!(
            "{}::{}: {}",
            self.descriptor.name, self.descriptor.kind, message
        ));
    }

    pub fn check_parameters(&self, capability: &str, options: &PluginOptions) -> PluginResult<()> {
        for parameter in self.descriptor.required_parameters {
            if !options.contains(parameter) {
                return Err(self.missing(capability, parameter));
            }
        }
        Ok(())
    }

    pub fn run_command(&self, command: &HostCommand) -> PluginResult<()> {
        utils::debug(&format!(
            "{}::{}: running '{}' (shell: {})",
            self.descriptor.name,
            self.descriptor.kind,
            command,
            command.uses_shell()
        ));

        match command.status() {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => {
                let code = status.code();
                self.report(&format!("[ret={}] Command: {}", display_code(&code), command));
                Err(PluginError::CommandFailed {
                    command: command.to_string(),
                    code,
                })
            }
            Err(e) => {
                self.report(&format!("[ret={}] Command: {}", display_code(&None), command));
                self.report(&e.to_string());
                Err(PluginError::CommandFault {
                    command: command.to_string(),
                    source: e,
                })
            }
        }
    }

    pub fn missing(&self, capability: &str, parameter: &str) -> PluginError {
        self.report(&format!("Plugin parameter '{}' missing!", parameter));
        PluginError::MissingParameter {
            plugin: self.descriptor.name.to_string(),
            capability: capability.to_string(),
            parameter: parameter.to_string(),
        }
    }

    pub fn not_configured(&self, reason: &str) -> PluginError {
        self.report(reason);
        PluginError::NotConfigured {
            plugin: self.descriptor.name.to_string(),
        }
    }

    pub fn unsupported(&self, capability: &str) -> PluginError {
        self.report(&format!("Capability '{}' not supported", capability));
        PluginError::Unsupported {
            plugin: self.descriptor.name.to_string(),
            capability: capability.to_string(),
        }
    }

    pub fn invalid(&self, parameter: &str, reason: impl Into<String>) -> PluginError {
        let reason = reason.into();
        self.report(&format!("Plugin parameter '{}' invalid: {}", parameter, reason));
        PluginError::InvalidParameter {
            plugin: self.descriptor.name.to_string(),
            parameter: parameter.to_string(),
            reason,
        }
    }
}

impl Default for PluginBase {
    fn default() -> Self {
        Self::new(&PluginDescriptor::BASE, Arc::new(StdoutSink))
    }
}

impl fmt::Debug for PluginBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginBase")
            .field("descriptor", &self.descriptor.name)
            .finish()
    }
}

/// Contract every host test plugin implements
///
/// `setup` must succeed before `execute` is called; see
/// [`crate::lifecycle::Unconfigured`] for a wrapper that enforces this.
pub trait HostTestPlugin: Send + Sync {
    fn base(&self) -> &PluginBase;

    fn descriptor(&self) -> &'static PluginDescriptor {
        self.base().descriptor()
    }

    /// Prepare the plugin for use
    fn setup(&mut self, _options: &PluginOptions) -> PluginResult<()> {
        Err(self.base().not_configured("Plugin setup not implemented"))
    }

    /// Perform the named capability
    fn execute(&self, capability: &str, _options: &PluginOptions) -> PluginResult<()> {
        Err(self.base().unsupported(capability))
    }

    /// Fails on the first required parameter missing from `options`
    fn check_parameters(&self, capability: &str, options: &PluginOptions) -> PluginResult<()> {
        self.base().check_parameters(capability, options)
    }

    /// Run an external command; succeeds only on exit status 0
    fn run_command(&self, command: &HostCommand) -> PluginResult<()> {
        self.base().run_command(command)
    }
}

impl<P: HostTestPlugin + ?Sized> HostTestPlugin for Box<P> {
    fn base(&self) -> &PluginBase {
        (**self).base()
    }

    fn descriptor(&self) -> &'static PluginDescriptor {
        (**self).descriptor()
    }

    fn setup(&mut self, options: &PluginOptions) -> PluginResult<()> {
        (**self).setup(options)
    }

    fn execute(&self, capability: &str, options: &PluginOptions) -> PluginResult<()> {
        (**self).execute(capability, options)
    }

    fn check_parameters(&self, capability: &str, options: &PluginOptions) -> PluginResult<()> {
        (**self).check_parameters(capability, options)
    }

    fn run_command(&self, command: &HostCommand) -> PluginResult<()> {
        (**self).run_command(command)
    }
}

pub type CapabilityHandler<P> = fn(&P, &PluginOptions) -> PluginResult<()>;

/// Capability name to handler mapping, built once when a plugin is constructed
pub struct CapabilityTable<P> {
    entries: Vec<(&'static str, CapabilityHandler<P>)>,
}

impl<P: HostTestPlugin> CapabilityTable<P> {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    pub fn with(mut self, capability: &'static str, handler: CapabilityHandler<P>) -> Self {
        self.entries.push((capability, handler));
        self
    }

    pub fn resolve(&self, capability: &str) -> Option<CapabilityHandler<P>> {
        self.entries
            .iter()
            .find(|(name, _)| *name == capability)
            .map(|(_, handler)| *handler)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    pub fn dispatch(&self, plugin: &P, capability: &str, options: &PluginOptions) -> PluginResult<()> {
        match self.resolve(capability) {
            Some(handler) => handler(plugin, options),
            None => Err(plugin.base().unsupported(capability)),
        }
    }
}
