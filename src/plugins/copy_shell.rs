//! Copies a binary image onto a target's mass-storage disk with a shell copy tool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PluginResult;
use crate::plugin::{CapabilityTable, HostTestPlugin, PluginBase, PluginDescriptor};
use crate::utils::{HostCommand, PluginOptions, Sink};

pub const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "HostTestPluginCopyMethod_Shell",
    kind: "CopyMethod",
    capabilities: &["shell", "cp", "copy", "xcopy"],
    required_parameters: &["image_path", "destination_disk"],
    stable: true,
};

/// Typed form of a copy invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub image_path: PathBuf,
    pub destination_disk: PathBuf,
}

impl CopyRequest {
    /// Where the image lands: the disk root plus the image's file name
    pub fn destination(&self) -> Option<PathBuf> {
        self.image_path
            .file_name()
            .map(|name| self.destination_disk.join(name))
    }
}

pub struct CopyShell {
    base: PluginBase,
    capabilities: CapabilityTable<CopyShell>,
}

impl CopyShell {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            base: PluginBase::new(&DESCRIPTOR, sink),
            capabilities: CapabilityTable::new()
                .with("shell", Self::copy_default)
                .with("cp", Self::copy_cp)
                .with("copy", Self::copy_copy)
                .with("xcopy", Self::copy_xcopy),
        }
    }

    fn request(&self, capability: &str, options: &PluginOptions) -> PluginResult<CopyRequest> {
        self.check_parameters(capability, options)?;

        let required = |parameter: &str| {
            options
                .require(parameter)
                .map(PathBuf::from)
                .ok_or_else(|| self.base.missing(capability, parameter))
        };
        let image_path = required("image_path")?;
        let destination_disk = required("destination_disk")?;

        if !image_path.is_file() {
            return Err(self.base.invalid(
                "image_path",
                format!("no such file: {}", image_path.display()),
            ));
        }
        if !destination_disk.is_dir() {
            return Err(self.base.invalid(
                "destination_disk",
                format!("not a directory: {}", destination_disk.display()),
            ));
        }

        Ok(CopyRequest {
            image_path,
            destination_disk,
        })
    }

    fn copy_with(&self, capability: &str, tool: Tool, options: &PluginOptions) -> PluginResult<()> {
        let request = self.request(capability, options)?;
        let destination = match request.destination() {
            Some(destination) => destination,
            None => return Err(self.base.invalid("image_path", "path has no file name")),
        };

        let argv = [
            tool.program().to_string(),
            path_arg(&request.image_path),
            path_arg(&destination),
        ];
        // copy and xcopy are cmd builtins
        let command = match tool {
            Tool::Cp => HostCommand::argv(argv),
            Tool::Copy | Tool::Xcopy => HostCommand::shell_argv(argv),
        };
        self.run_command(&command)
    }

    fn copy_default(&self, options: &PluginOptions) -> PluginResult<()> {
        let tool = if cfg!(target_os = "windows") {
            Tool::Copy
        } else {
            Tool::Cp
        };
        self.copy_with("shell", tool, options)
    }

    fn copy_cp(&self, options: &PluginOptions) -> PluginResult<()> {
        self.copy_with("cp", Tool::Cp, options)
    }

    fn copy_copy(&self, options: &PluginOptions) -> PluginResult<()> {
        self.copy_with("copy", Tool::Copy, options)
    }

    fn copy_xcopy(&self, options: &PluginOptions) -> PluginResult<()> {
        self.copy_with("xcopy", Tool::Xcopy, options)
    }
}

impl HostTestPlugin for CopyShell {
    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn setup(&mut self, _options: &PluginOptions) -> PluginResult<()> {
        Ok(())
    }

    fn execute(&self, capability: &str, options: &PluginOptions) -> PluginResult<()> {
        self.capabilities.dispatch(self, capability, options)
    }
}

pub fn create(sink: Arc<dyn Sink>) -> Box<dyn HostTestPlugin> {
    Box::new(CopyShell::new(sink))
}

#[derive(Debug, Clone, Copy)]
enum Tool {
    Cp,
    Copy,
    Xcopy,
}

impl Tool {
    fn program(self) -> &'static str {
        match self {
            Tool::Cp => "cp",
            Tool::Copy => "copy",
            Tool::Xcopy => "xcopy",
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::{FailureKind, PluginError};
    use crate::utils::MemorySink;

    fn plugin() -> (CopyShell, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<dyn Sink> = sink.clone();
        (CopyShell::new(shared), sink)
    }

    #[test]
    fn test_capability_table_matches_descriptor() {
        let (plugin, _) = plugin();
        assert_eq!(plugin.capabilities.names(), DESCRIPTOR.capabilities.to_vec());
    }

    #[test]
    fn test_destination_uses_image_file_name() {
        let request = CopyRequest {
            image_path: PathBuf::from("build/blinky.bin"),
            destination_disk: PathBuf::from("/media/MBED"),
        };
        assert_eq!(
            request.destination(),
            Some(PathBuf::from("/media/MBED/blinky.bin"))
        );
    }

    #[test]
    fn test_missing_destination_disk() {
        let (plugin, sink) = plugin();
        let options = PluginOptions::new().with("image_path", "blinky.bin");

        match plugin.execute("cp", &options) {
            Err(PluginError::MissingParameter { parameter, .. }) => {
                assert_eq!(parameter, "destination_disk")
            }
            other => panic!("Expected MissingParameter, got {:?}", other),
        }
        assert_eq!(
            sink.lines(),
            vec!["HostTestPluginCopyMethod_Shell::CopyMethod: Plugin parameter 'destination_disk' missing!"]
        );
    }

    #[test]
    fn test_missing_image_is_invalid() {
        let (plugin, _) = plugin();
        let disk = tempfile::tempdir().unwrap();
        let options = PluginOptions::new()
            .with("image_path", disk.path().join("absent.bin").display())
            .with("destination_disk", disk.path().display());

        let err = plugin.execute("cp", &options).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ConfigurationIncomplete);
    }

    #[test]
    fn test_unknown_capability() {
        let (plugin, _) = plugin();
        let err = plugin.execute("scp", &PluginOptions::new()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::UnsupportedCapability);
    }

    #[test]
    fn test_blank_image_path_is_missing() {
        let (plugin, sink) = plugin();
        let options = PluginOptions::new()
            .with("image_path", "  ")
            .with("destination_disk", "/media/MBED");

        match plugin.execute("cp", &options) {
            Err(PluginError::MissingParameter { parameter, .. }) => assert_eq!(parameter, "image_path"),
            other => panic!("Expected MissingParameter, got {:?}", other),
        }
        assert_eq!(
            sink.lines(),
            vec!["HostTestPluginCopyMethod_Shell::CopyMethod: Plugin parameter 'image_path' missing!"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_with_cp() {
        let (mut plugin, sink) = plugin();
        let build = tempfile::tempdir().unwrap();
        let disk = tempfile::tempdir().unwrap();
        let image = build.path().join("blinky.bin");
        fs::write(&image, b"\x7fELF").unwrap();

        let options = PluginOptions::new()
            .with("image_path", image.display())
            .with("destination_disk", disk.path().display());

        assert!(plugin.setup(&options).is_ok());
        assert!(plugin.execute("shell", &options).is_ok());
        assert_eq!(fs::read(disk.path().join("blinky.bin")).unwrap(), b"\x7fELF");
        assert!(sink.lines().is_empty());
    }
}
