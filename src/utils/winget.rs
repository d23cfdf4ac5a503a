// src/utils/winget.rs

use anyhow::Result;

use crate::adapters::{PackageManager, ProcessRunner};

/// Package install/removal through `winget`. The exit code is passed through
/// unchanged; the step layer decides what a nonzero code means.
pub struct WingetPackageManager<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> WingetPackageManager<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }
}

impl PackageManager for WingetPackageManager<'_> {
    fn install(&self, id: &str) -> Result<i32> {
        let args = vec![
            "install".to_string(),
            "-e".to_string(),
            "--id".to_string(),
            id.to_string(),
            "--accept-package-agreements".to_string(),
            "--accept-source-agreements".to_string(),
        ];
        self.runner.run("winget", &args)
    }

    fn remove(&self, id: &str) -> Result<i32> {
        let args = vec![
            "uninstall".to_string(),
            "-e".to_string(),
            "--id".to_string(),
            id.to_string(),
        ];
        self.runner.run("winget", &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockSystem;

    #[test]
    fn install_shells_out_to_winget_with_the_exact_id() {
        let system = MockSystem::new();
        let manager = WingetPackageManager::new(&system);
        assert_eq!(manager.install("7zip.7zip").unwrap(), 0);

        let commands = system.commands.lock().unwrap();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].starts_with("winget install -e --id 7zip.7zip"));
    }

    #[test]
    fn nonzero_exit_codes_are_returned_not_raised() {
        let system = MockSystem::new().with_command_exit("winget", 3);
        let manager = WingetPackageManager::new(&system);
        assert_eq!(manager.remove("Spotify.Spotify").unwrap(), 3);
    }
}
