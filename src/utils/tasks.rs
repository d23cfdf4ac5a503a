// src/utils/tasks.rs

use anyhow::{bail, Result};

use crate::adapters::{Lookup, ProcessRunner, TaskScheduler};

/// Scheduled-task control through `schtasks.exe`. Exit code 0 means the
/// change took; exit code 1 is what schtasks reports when the task path does
/// not exist, which the step layer surfaces as a missing target.
pub struct SchtasksScheduler<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> SchtasksScheduler<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    fn change(&self, path: &str, flag: &str) -> Result<Lookup> {
        let args = vec![
            "/Change".to_string(),
            "/TN".to_string(),
            path.to_string(),
            flag.to_string(),
        ];
        match self.runner.run("schtasks", &args)? {
            0 => Ok(Lookup::Found),
            1 => Ok(Lookup::Missing),
            code => bail!("schtasks exited with code {} for task `{}`", code, path),
        }
    }
}

impl TaskScheduler for SchtasksScheduler<'_> {
    fn enable(&self, path: &str) -> Result<Lookup> {
        self.change(path, "/ENABLE")
    }

    fn disable(&self, path: &str) -> Result<Lookup> {
        self.change(path, "/DISABLE")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockSystem;

    #[test]
    fn exit_codes_map_to_lookup_results() {
        let found = MockSystem::new();
        let scheduler = SchtasksScheduler::new(&found);
        assert_eq!(scheduler.disable("\\Foo\\Bar").unwrap(), Lookup::Found);

        let missing = MockSystem::new().with_command_exit("schtasks", 1);
        let scheduler = SchtasksScheduler::new(&missing);
        assert_eq!(scheduler.disable("\\Foo\\Bar").unwrap(), Lookup::Missing);

        let broken = MockSystem::new().with_command_exit("schtasks", 2);
        let scheduler = SchtasksScheduler::new(&broken);
        assert!(scheduler.enable("\\Foo\\Bar").is_err());
    }

    #[test]
    fn commands_carry_the_task_path() {
        let system = MockSystem::new();
        let scheduler = SchtasksScheduler::new(&system);
        scheduler
            .disable("\\Microsoft\\Windows\\Autochk\\Proxy")
            .unwrap();
        assert_eq!(
            *system.commands.lock().unwrap(),
            vec!["schtasks /Change /TN \\Microsoft\\Windows\\Autochk\\Proxy /DISABLE"]
        );
    }
}
