pub mod commands;
pub mod error;
pub mod interactive;
pub mod lifecycle;
pub mod plugin;
pub mod plugins;
pub mod utils;

pub use error::{FailureKind, PluginError, PluginResult};
pub use lifecycle::{Ready, SetupError, Unconfigured};
pub use plugin::{CapabilityTable, HostTestPlugin, PluginBase, PluginDescriptor};
