use std::collections::BTreeMap;

use crate::package::PackageRef;

/// Package implementing the `init` command.
pub const INIT_PACKAGE: &str = "@imooc-cli/init";

/// Maps logical command names to the packages that implement them.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, PackageRef>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The commands this CLI ships with.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("init", PackageRef::latest(INIT_PACKAGE));
        registry
    }

    pub fn register(&mut self, command: &str, package: PackageRef) {
        self.commands.insert(command.to_string(), package);
    }

    pub fn get(&self, command: &str) -> Option<&PackageRef> {
        self.commands.get(command)
    }
}
