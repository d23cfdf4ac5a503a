// src/utils/process.rs

use std::process::Command;

use anyhow::Context;

use crate::adapters::ProcessRunner;

/// Runs external commands to completion through `std::process`, suppressing
/// the console window the child would otherwise flash on Windows.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> anyhow::Result<i32> {
        let mut command = Command::new(program);
        command.args(args);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            use windows::Win32::System::Threading::CREATE_NO_WINDOW;
            command.creation_flags(CREATE_NO_WINDOW.0);
        }

        tracing::debug!("Running `{}` with args {:?}.", program, args);
        let status = command
            .status()
            .with_context(|| format!("Failed to launch `{}`", program))?;
        // A missing exit code means the child was killed by a signal.
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn captures_the_exit_code() {
        let runner = SystemProcessRunner;
        assert_eq!(runner.run("true", &[]).unwrap(), 0);
        assert_eq!(runner.run("false", &[]).unwrap(), 1);
    }

    #[test]
    fn launching_a_missing_program_is_an_error() {
        let runner = SystemProcessRunner;
        assert!(runner.run("definitely-not-a-real-program", &[]).is_err());
    }
}
