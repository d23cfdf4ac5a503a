// src/adapters.rs

use std::fmt;

/// Enumeration of supported registry value types.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RegistryValue {
    Dword(u32),
    Binary(Vec<u8>),
    Text(String),
}

impl fmt::Display for RegistryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryValue::Dword(v) => write!(f, "Dword({})", v),
            RegistryValue::Binary(v) => write!(f, "Binary({:?})", v),
            RegistryValue::Text(v) => write!(f, "Text({})", v),
        }
    }
}

/// Startup configuration of a background service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupMode {
    Automatic,
    Manual,
    Disabled,
}

impl fmt::Display for StartupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupMode::Automatic => write!(f, "Automatic"),
            StartupMode::Manual => write!(f, "Manual"),
            StartupMode::Disabled => write!(f, "Disabled"),
        }
    }
}

/// Result of an adapter call whose target may legitimately be absent.
/// `Missing` is not an error; the step layer decides whether absence is
/// tolerated (services) or reported (scheduled tasks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found,
    Missing,
}

/// Typed read/write access to a hierarchical key-value store (the registry).
///
/// `write` creates intermediate keys as needed and overwrites an existing
/// value. `delete` succeeds when the value, or its whole parent path, does
/// not exist.
pub trait KeyValueStore: Send + Sync {
    fn write(&self, path: &str, name: &str, value: &RegistryValue) -> anyhow::Result<()>;
    fn delete(&self, path: &str, name: &str) -> anyhow::Result<()>;
}

/// Control over named background services. Lookup is case-insensitive.
/// Starting a running service and stopping a stopped one are no-ops.
pub trait ServiceControl: Send + Sync {
    fn start(&self, name: &str) -> anyhow::Result<Lookup>;
    fn stop(&self, name: &str) -> anyhow::Result<Lookup>;
    fn set_startup_mode(&self, name: &str, mode: StartupMode) -> anyhow::Result<Lookup>;
}

/// Control over scheduled tasks, addressed by their full task path.
pub trait TaskScheduler: Send + Sync {
    fn enable(&self, path: &str) -> anyhow::Result<Lookup>;
    fn disable(&self, path: &str) -> anyhow::Result<Lookup>;
}

/// Installs or removes packages by identifier, returning the installer's
/// exit code. A nonzero code is a result, not an `Err`; the step layer
/// turns it into a recorded failure.
pub trait PackageManager: Send + Sync {
    fn install(&self, id: &str) -> anyhow::Result<i32>;
    fn remove(&self, id: &str) -> anyhow::Result<i32>;
}

/// Runs an external command to completion and returns its exit code.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> anyhow::Result<i32>;
}

/// One reference per capability, borrowed for the duration of a run.
/// Adapters must be safe for concurrent use on distinct targets; the
/// catalog author guarantees no two concurrently-scheduled steps touch
/// the same target.
#[derive(Clone, Copy)]
pub struct Adapters<'a> {
    pub registry: &'a dyn KeyValueStore,
    pub services: &'a dyn ServiceControl,
    pub tasks: &'a dyn TaskScheduler,
    pub packages: &'a dyn PackageManager,
    pub processes: &'a dyn ProcessRunner,
}
