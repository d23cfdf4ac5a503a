// src/tweaks/step.rs

use std::{fmt, sync::Arc};

use anyhow::anyhow;

use crate::{
    adapters::{Adapters, Lookup, RegistryValue, StartupMode},
    errors::StepError,
    programs::ProgramEntry,
};

/// What executing a step did. A tolerated absence (a service not present on
/// this Windows edition) is `Skipped`, never a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    Skipped,
}

type RawAction = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Kind-specific payload of a step. Payloads are plain values so an apply
/// batch and its paired undo batch can share step construction with only the
/// target values flipped.
#[derive(Clone)]
pub enum StepKind {
    RegistryWrite {
        path: String,
        name: String,
        value: RegistryValue,
    },
    RegistryDelete {
        path: String,
        name: String,
    },
    ServiceStart {
        service: String,
    },
    ServiceStop {
        service: String,
    },
    ServiceStartupMode {
        service: String,
        mode: StartupMode,
    },
    TaskEnable {
        task: String,
    },
    TaskDisable {
        task: String,
    },
    PackageInstall {
        program: ProgramEntry,
    },
    PackageRemove {
        program: ProgramEntry,
    },
    RunCommand {
        program: String,
        args: Vec<String>,
    },
    Raw {
        action: RawAction,
    },
}

impl fmt::Debug for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::RegistryWrite { path, name, value } => f
                .debug_struct("RegistryWrite")
                .field("path", path)
                .field("name", name)
                .field("value", value)
                .finish(),
            StepKind::RegistryDelete { path, name } => f
                .debug_struct("RegistryDelete")
                .field("path", path)
                .field("name", name)
                .finish(),
            StepKind::ServiceStart { service } => {
                f.debug_struct("ServiceStart").field("service", service).finish()
            }
            StepKind::ServiceStop { service } => {
                f.debug_struct("ServiceStop").field("service", service).finish()
            }
            StepKind::ServiceStartupMode { service, mode } => f
                .debug_struct("ServiceStartupMode")
                .field("service", service)
                .field("mode", mode)
                .finish(),
            StepKind::TaskEnable { task } => {
                f.debug_struct("TaskEnable").field("task", task).finish()
            }
            StepKind::TaskDisable { task } => {
                f.debug_struct("TaskDisable").field("task", task).finish()
            }
            StepKind::PackageInstall { program } => f
                .debug_struct("PackageInstall")
                .field("program", program)
                .finish(),
            StepKind::PackageRemove { program } => f
                .debug_struct("PackageRemove")
                .field("program", program)
                .finish(),
            StepKind::RunCommand { program, args } => f
                .debug_struct("RunCommand")
                .field("program", program)
                .field("args", args)
                .finish(),
            StepKind::Raw { .. } => f.debug_struct("Raw").finish_non_exhaustive(),
        }
    }
}

/// The smallest unit of change: a human-readable name (used verbatim as the
/// progress line) plus the description of one mutation. Steps carry no
/// mutable state and can be executed any number of times.
#[derive(Clone, Debug)]
pub struct Step {
    name: String,
    kind: StepKind,
}

impl Step {
    pub fn new(name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn registry_write(
        name: impl Into<String>,
        path: impl Into<String>,
        value_name: impl Into<String>,
        value: RegistryValue,
    ) -> Self {
        Self::new(
            name,
            StepKind::RegistryWrite {
                path: path.into(),
                name: value_name.into(),
                value,
            },
        )
    }

    pub fn registry_dword(
        name: impl Into<String>,
        path: impl Into<String>,
        value_name: impl Into<String>,
        value: u32,
    ) -> Self {
        Self::registry_write(name, path, value_name, RegistryValue::Dword(value))
    }

    pub fn registry_delete(
        name: impl Into<String>,
        path: impl Into<String>,
        value_name: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            StepKind::RegistryDelete {
                path: path.into(),
                name: value_name.into(),
            },
        )
    }

    pub fn service_start(name: impl Into<String>, service: impl Into<String>) -> Self {
        Self::new(
            name,
            StepKind::ServiceStart {
                service: service.into(),
            },
        )
    }

    pub fn service_stop(name: impl Into<String>, service: impl Into<String>) -> Self {
        Self::new(
            name,
            StepKind::ServiceStop {
                service: service.into(),
            },
        )
    }

    pub fn service_startup_mode(
        name: impl Into<String>,
        service: impl Into<String>,
        mode: StartupMode,
    ) -> Self {
        Self::new(
            name,
            StepKind::ServiceStartupMode {
                service: service.into(),
                mode,
            },
        )
    }

    pub fn task_enable(name: impl Into<String>, task: impl Into<String>) -> Self {
        Self::new(name, StepKind::TaskEnable { task: task.into() })
    }

    pub fn task_disable(name: impl Into<String>, task: impl Into<String>) -> Self {
        Self::new(name, StepKind::TaskDisable { task: task.into() })
    }

    pub fn package_install(program: ProgramEntry) -> Self {
        Self::new(
            format!("Installing {}.", program.display_name()),
            StepKind::PackageInstall { program },
        )
    }

    pub fn package_remove(program: ProgramEntry) -> Self {
        Self::new(
            format!("Uninstalling {}.", program.display_name()),
            StepKind::PackageRemove { program },
        )
    }

    pub fn run_command(
        name: impl Into<String>,
        program: impl Into<String>,
        args: &[&str],
    ) -> Self {
        Self::new(
            name,
            StepKind::RunCommand {
                program: program.into(),
                args: args.iter().map(|a| a.to_string()).collect(),
            },
        )
    }

    pub fn raw(
        name: impl Into<String>,
        action: impl Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            name,
            StepKind::Raw {
                action: Arc::new(action),
            },
        )
    }

    /// Performs the mutation this step describes, dispatching on its kind to
    /// the matching adapter call.
    pub fn execute(&self, adapters: &Adapters<'_>) -> Result<StepOutcome, StepError> {
        match &self.kind {
            StepKind::RegistryWrite { path, name, value } => {
                adapters.registry.write(path, name, value)?;
                Ok(StepOutcome::Applied)
            }
            StepKind::RegistryDelete { path, name } => {
                adapters.registry.delete(path, name)?;
                Ok(StepOutcome::Applied)
            }
            StepKind::ServiceStart { service } => {
                match adapters.services.start(service)? {
                    Lookup::Found => Ok(StepOutcome::Applied),
                    Lookup::Missing => {
                        tracing::debug!("Service '{}' not present, nothing to start.", service);
                        Ok(StepOutcome::Skipped)
                    }
                }
            }
            StepKind::ServiceStop { service } => {
                match adapters.services.stop(service)? {
                    Lookup::Found => Ok(StepOutcome::Applied),
                    Lookup::Missing => {
                        tracing::debug!("Service '{}' not present, nothing to stop.", service);
                        Ok(StepOutcome::Skipped)
                    }
                }
            }
            StepKind::ServiceStartupMode { service, mode } => {
                // Best-effort stop before reconfiguring; a service that
                // refuses to stop can still have its startup type changed.
                if let Err(e) = adapters.services.stop(service) {
                    tracing::debug!("Ignoring stop failure for '{}': {:#}", service, e);
                }
                match adapters.services.set_startup_mode(service, *mode)? {
                    Lookup::Found => Ok(StepOutcome::Applied),
                    Lookup::Missing => {
                        tracing::debug!(
                            "Service '{}' not present, startup mode left alone.",
                            service
                        );
                        Ok(StepOutcome::Skipped)
                    }
                }
            }
            StepKind::TaskEnable { task } => match adapters.tasks.enable(task)? {
                Lookup::Found => Ok(StepOutcome::Applied),
                Lookup::Missing => Err(StepError::TargetMissing {
                    target: format!("scheduled task `{}`", task),
                }),
            },
            StepKind::TaskDisable { task } => match adapters.tasks.disable(task)? {
                Lookup::Found => Ok(StepOutcome::Applied),
                Lookup::Missing => Err(StepError::TargetMissing {
                    target: format!("scheduled task `{}`", task),
                }),
            },
            StepKind::PackageInstall { program } => {
                package_pass(adapters, program, PackagePass::Install)
            }
            StepKind::PackageRemove { program } => {
                package_pass(adapters, program, PackagePass::Remove)
            }
            StepKind::RunCommand { program, args } => {
                let code = adapters.processes.run(program, args)?;
                if code == 0 {
                    Ok(StepOutcome::Applied)
                } else {
                    Err(StepError::CommandFailed {
                        program: program.clone(),
                        code,
                    })
                }
            }
            StepKind::Raw { action } => {
                action().map_err(StepError::Adapter)?;
                Ok(StepOutcome::Applied)
            }
        }
    }
}

#[derive(Clone, Copy)]
enum PackagePass {
    Install,
    Remove,
}

/// Walks the entry's identifiers strictly in list order, awaiting each call
/// before the next: installers for the same logical program must not race
/// each other. Every failing identifier is collected; one failure does not
/// skip the rest.
fn package_pass(
    adapters: &Adapters<'_>,
    program: &ProgramEntry,
    pass: PackagePass,
) -> Result<StepOutcome, StepError> {
    let verb = match pass {
        PackagePass::Install => "install",
        PackagePass::Remove => "removal",
    };
    let mut failed = Vec::new();
    for id in program.ids() {
        let result = match pass {
            PackagePass::Install => adapters.packages.install(id),
            PackagePass::Remove => adapters.packages.remove(id),
        };
        match result {
            Ok(0) => {
                tracing::debug!("Package {} succeeded for '{}'.", verb, id);
            }
            Ok(code) => {
                tracing::error!("Package manager exited with code {} for '{}'.", code, id);
                failed.push(format!("{} (exit code {})", id, code));
            }
            Err(e) => {
                tracing::error!("Package manager call failed for '{}': {:#}", id, e);
                failed.push(format!("{} ({:#})", id, e));
            }
        }
    }
    if failed.is_empty() {
        Ok(StepOutcome::Applied)
    } else {
        Err(StepError::Adapter(anyhow!(
            "{} of {} failed for: {}",
            verb,
            program.display_name(),
            failed.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockSystem;

    const EXPLORER: &str =
        "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer";

    #[test]
    fn registry_write_overwrites_and_is_idempotent() {
        let system = MockSystem::new().with_registry_value(
            EXPLORER,
            "EnableAutoTray",
            RegistryValue::Dword(0),
        );
        let step =
            Step::registry_dword("Hiding tray icons.", EXPLORER, "EnableAutoTray", 1);

        for _ in 0..2 {
            let outcome = step.execute(&system.adapters()).unwrap();
            assert_eq!(outcome, StepOutcome::Applied);
        }
        assert_eq!(
            system.registry_value(EXPLORER, "EnableAutoTray"),
            Some(RegistryValue::Dword(1))
        );
    }

    #[test]
    fn registry_delete_of_absent_value_succeeds() {
        let system = MockSystem::new();
        let step = Step::registry_delete("Clearing policy.", EXPLORER, "NoSuchValue");

        for _ in 0..2 {
            assert_eq!(step.execute(&system.adapters()).unwrap(), StepOutcome::Applied);
        }
        assert_eq!(system.registry_value(EXPLORER, "NoSuchValue"), None);
    }

    #[test]
    fn missing_service_stop_is_skipped_not_failed() {
        let system = MockSystem::new();
        let step = Step::service_stop("Stopping HomeGroupListener.", "HomeGroupListener");

        let outcome = step.execute(&system.adapters()).unwrap();
        assert_eq!(outcome, StepOutcome::Skipped);
        assert!(system.services.lock().unwrap().is_empty());
    }

    #[test]
    fn service_lookup_is_case_insensitive() {
        let system = MockSystem::new().with_service("DiagTrack", true, StartupMode::Automatic);
        let step = Step::service_stop("Stopping diagtrack.", "DIAGTRACK");

        assert_eq!(step.execute(&system.adapters()).unwrap(), StepOutcome::Applied);
        assert!(!system.service("DiagTrack").unwrap().running);
    }

    #[test]
    fn stopping_a_stopped_service_is_a_no_op_success() {
        let system = MockSystem::new().with_service("SysMain", false, StartupMode::Automatic);
        let step = Step::service_stop("Stopping SysMain.", "SysMain");

        for _ in 0..2 {
            assert_eq!(step.execute(&system.adapters()).unwrap(), StepOutcome::Applied);
        }
        assert!(!system.service("SysMain").unwrap().running);
    }

    #[test]
    fn startup_mode_stops_the_service_then_reconfigures_it() {
        let system = MockSystem::new().with_service("DiagTrack", true, StartupMode::Automatic);
        let step = Step::service_startup_mode(
            "Disabling DiagTrack.",
            "DiagTrack",
            StartupMode::Disabled,
        );

        assert_eq!(step.execute(&system.adapters()).unwrap(), StepOutcome::Applied);
        let service = system.service("DiagTrack").unwrap();
        assert!(!service.running);
        assert_eq!(service.mode, StartupMode::Disabled);
    }

    #[test]
    fn startup_mode_for_missing_service_is_skipped() {
        let system = MockSystem::new();
        let step =
            Step::service_startup_mode("Setting `Fax` to Manual.", "Fax", StartupMode::Manual);

        assert_eq!(step.execute(&system.adapters()).unwrap(), StepOutcome::Skipped);
    }

    #[test]
    fn missing_task_is_a_recorded_failure() {
        let system = MockSystem::new();
        let step = Step::task_disable(
            "Disabling telemetry task.",
            "\\Microsoft\\Windows\\Autochk\\Proxy",
        );

        let err = step.execute(&system.adapters()).unwrap_err();
        assert!(matches!(err, StepError::TargetMissing { .. }));
    }

    #[test]
    fn task_disable_flips_the_task_state() {
        let path = "\\Microsoft\\Windows\\Feedback\\Siuf\\DmClient";
        let system = MockSystem::new().with_task(path);
        let step = Step::task_disable("Disabling feedback task.", path);

        for _ in 0..2 {
            assert_eq!(step.execute(&system.adapters()).unwrap(), StepOutcome::Applied);
        }
        assert_eq!(system.task_enabled(path), Some(false));
    }

    #[test]
    fn package_install_walks_ids_in_order_and_collects_failures() {
        let program = ProgramEntry::new(
            "Python 3",
            &["Python.Python.3.12", "Python.Broken", "Python.Launcher"],
        )
        .unwrap();
        let system = MockSystem::new().with_failing_package("Python.Broken");
        let step = Step::package_install(program);

        let err = step.execute(&system.adapters()).unwrap_err();
        assert!(err.to_string().contains("Python.Broken"));

        // The failing identifier did not stop the rest of the list, and the
        // list ran in declaration order.
        assert_eq!(
            *system.install_calls.lock().unwrap(),
            vec!["Python.Python.3.12", "Python.Broken", "Python.Launcher"]
        );
        assert!(system.installed.lock().unwrap().contains("Python.Launcher"));
    }

    #[test]
    fn package_install_twice_leaves_the_same_state() {
        let program = ProgramEntry::new("7-Zip", &["7zip.7zip"]).unwrap();
        let system = MockSystem::new();
        let step = Step::package_install(program);

        for _ in 0..2 {
            assert_eq!(step.execute(&system.adapters()).unwrap(), StepOutcome::Applied);
        }
        assert_eq!(system.installed.lock().unwrap().len(), 1);
    }

    #[test]
    fn nonzero_command_exit_is_a_failure_but_not_a_panic() {
        let system = MockSystem::new().with_command_exit("bcdedit", 1);
        let step = Step::run_command(
            "Enabling F8 boot menu.",
            "bcdedit",
            &["/set", "{current}", "bootmenupolicy", "legacy"],
        );

        let err = step.execute(&system.adapters()).unwrap_err();
        assert!(
            matches!(err, StepError::CommandFailed { ref program, code: 1 } if program == "bcdedit")
        );
        assert_eq!(system.commands.lock().unwrap().len(), 1);
    }

    #[test]
    fn raw_action_faults_become_step_errors() {
        let system = MockSystem::new();
        let ok = Step::raw("Doing nothing.", || Ok(()));
        let bad = Step::raw("Failing on purpose.", || Err(anyhow!("boom")));

        assert_eq!(ok.execute(&system.adapters()).unwrap(), StepOutcome::Applied);
        let err = bad.execute(&system.adapters()).unwrap_err();
        assert!(matches!(err, StepError::Adapter(_)));
    }
}
