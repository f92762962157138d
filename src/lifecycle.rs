//! Typed plugin lifecycle: a plugin can only be executed once `setup` succeeded.

use std::fmt;

use crate::error::{PluginError, PluginResult};
use crate::plugin::{HostTestPlugin, PluginDescriptor};
use crate::utils::{self, PluginOptions};

/// A plugin that has not been set up yet
pub struct Unconfigured<P> {
    plugin: P,
}

/// A plugin whose `setup` succeeded
pub struct Ready<P> {
    plugin: P,
}

/// A failed `setup`, handing the plugin back so the caller can retry or fall back
pub struct SetupError<P> {
    pub plugin: Unconfigured<P>,
    pub error: PluginError,
}

impl<P: HostTestPlugin> Unconfigured<P> {
    pub fn new(plugin: P) -> Self {
        Self { plugin }
    }

    pub fn descriptor(&self) -> &'static PluginDescriptor {
        self.plugin.descriptor()
    }

    pub fn setup(mut self, options: &PluginOptions) -> Result<Ready<P>, SetupError<P>> {
        match self.plugin.setup(options) {
            Ok(()) => {
                utils::debug(&format!("{}: setup complete", self.descriptor().name));
                Ok(Ready {
                    plugin: self.plugin,
                })
            }
            Err(error) => Err(SetupError {
                plugin: self,
                error,
            }),
        }
    }
}

impl<P: HostTestPlugin> Ready<P> {
    pub fn descriptor(&self) -> &'static PluginDescriptor {
        self.plugin.descriptor()
    }

    pub fn execute(&self, capability: &str, options: &PluginOptions) -> PluginResult<()> {
        self.plugin.execute(capability, options)
    }

    /// Drop back to the unconfigured state, e.g. before re-running setup with new options
    pub fn reset(self) -> Unconfigured<P> {
        Unconfigured {
            plugin: self.plugin,
        }
    }

    pub fn into_inner(self) -> P {
        self.plugin
    }
}

impl<P> fmt::Debug for SetupError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupError")
            .field("error", &self.error)
            .finish()
    }
}

impl<P> fmt::Display for SetupError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "setup failed: {}", self.error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::FailureKind;
    use crate::plugin::PluginBase;
    use crate::utils::MemorySink;

    const PICKY: PluginDescriptor = PluginDescriptor {
        name: "Picky",
        kind: "ResetMethod",
        capabilities: &["poke"],
        required_parameters: &[],
        stable: false,
    };

    struct Picky {
        base: PluginBase,
        pokes: AtomicUsize,
    }

    impl HostTestPlugin for Picky {
        fn base(&self) -> &PluginBase {
            &self.base
        }

        fn setup(&mut self, options: &PluginOptions) -> PluginResult<()> {
            self.check_parameters("setup", options)?;
            match options.get("ready") {
                Some("yes") => Ok(()),
                _ => Err(self.base.not_configured("Option 'ready' is not 'yes'")),
            }
        }

        fn execute(&self, capability: &str, _options: &PluginOptions) -> PluginResult<()> {
            if capability != "poke" {
                return Err(self.base.unsupported(capability));
            }
            self.pokes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn picky() -> Unconfigured<Picky> {
        Unconfigured::new(Picky {
            base: PluginBase::new(&PICKY, Arc::new(MemorySink::new())),
            pokes: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_failed_setup_returns_plugin() {
        let failed = match picky().setup(&PluginOptions::new()) {
            Ok(_) => panic!("Expected setup to fail"),
            Err(failed) => failed,
        };
        assert_eq!(failed.error.kind(), FailureKind::NotConfigured);
        assert_eq!(failed.plugin.descriptor().name, "Picky");

        let ready = match failed.plugin.setup(&PluginOptions::new().with("ready", "yes")) {
            Ok(ready) => ready,
            Err(e) => panic!("Expected setup to succeed: {}", e),
        };
        assert!(ready.execute("poke", &PluginOptions::new()).is_ok());
    }

    #[test]
    fn test_ready_executes_and_resets() {
        let ready = match picky().setup(&PluginOptions::new().with("ready", "yes")) {
            Ok(ready) => ready,
            Err(e) => panic!("Expected setup to succeed: {}", e),
        };
        assert!(ready.execute("poke", &PluginOptions::new()).is_ok());
        assert!(ready.execute("poke", &PluginOptions::new()).is_ok());
        assert!(ready.execute("prod", &PluginOptions::new()).is_err());

        let plugin = ready.reset().plugin;
        assert_eq!(plugin.pokes.load(Ordering::SeqCst), 2);
    }
}
