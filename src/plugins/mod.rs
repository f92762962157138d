//! Plugins shipped with the harness.

pub mod copy_shell;
pub mod reset_command;

use std::sync::Arc;

use crate::plugin::{HostTestPlugin, PluginDescriptor};
use crate::utils::Sink;

pub use copy_shell::CopyShell;
pub use reset_command::ResetCommand;

/// Entry in the fixed list of built-in plugins
pub struct Builtin {
    /// Short name accepted on the command line
    pub alias: &'static str,
    pub descriptor: &'static PluginDescriptor,
    pub create: fn(Arc<dyn Sink>) -> Box<dyn HostTestPlugin>,
}

pub static BUILTINS: &[Builtin] = &[
    Builtin {
        alias: "copy_shell",
        descriptor: &copy_shell::DESCRIPTOR,
        create: copy_shell::create,
    },
    Builtin {
        alias: "reset_command",
        descriptor: &reset_command::DESCRIPTOR,
        create: reset_command::create,
    },
];

/// Look up a built-in plugin by alias or full name
pub fn find(name: &str) -> Option<&'static Builtin> {
    BUILTINS
        .iter()
        .find(|b| b.alias == name || b.descriptor.name.eq_ignore_ascii_case(name))
}

pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.iter().map(|b| b.alias).collect()
}

pub fn descriptors() -> Vec<&'static PluginDescriptor> {
    BUILTINS.iter().map(|b| b.descriptor).collect()
}

pub fn instantiate(name: &str, sink: Arc<dyn Sink>) -> Option<Box<dyn HostTestPlugin>> {
    find(name).map(|builtin| (builtin.create)(sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemorySink;

    #[test]
    fn test_find_by_alias_and_name() {
        assert_eq!(find("copy_shell").unwrap().descriptor.kind, "CopyMethod");
        assert_eq!(
            find("hosttestpluginresetmethod_command").unwrap().alias,
            "reset_command"
        );
        assert!(find("reset_mbed").is_none());
    }

    #[test]
    fn test_instantiate() {
        let plugin = instantiate("reset_command", Arc::new(MemorySink::new())).unwrap();
        assert_eq!(plugin.descriptor().name, "HostTestPluginResetMethod_Command");
        assert_eq!(builtin_names(), vec!["copy_shell", "reset_command"]);
        assert_eq!(descriptors().len(), 2);
    }
}
