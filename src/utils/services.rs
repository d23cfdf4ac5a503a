// src/utils/services.rs

use anyhow::{anyhow, Context, Result};
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{
            ERROR_SERVICE_ALREADY_RUNNING, ERROR_SERVICE_DOES_NOT_EXIST, ERROR_SERVICE_NOT_ACTIVE,
        },
        System::Services::{
            ChangeServiceConfigW, CloseServiceHandle, ControlService, OpenSCManagerW, OpenServiceW,
            StartServiceW, ENUM_SERVICE_TYPE, SC_HANDLE, SC_MANAGER_CONNECT, SERVICE_AUTO_START,
            SERVICE_CHANGE_CONFIG, SERVICE_CONTROL_STOP, SERVICE_DEMAND_START, SERVICE_DISABLED,
            SERVICE_ERROR, SERVICE_NO_CHANGE, SERVICE_START, SERVICE_START_TYPE, SERVICE_STATUS,
            SERVICE_STOP,
        },
    },
};

use crate::adapters::{Lookup, ServiceControl, StartupMode};

/// Live service control through the Service Control Manager. SCM lookup is
/// case-insensitive; a service absent on this Windows edition maps to
/// `Lookup::Missing` rather than an error.
pub struct WindowsServiceControl;

/// Closes the wrapped handle when dropped; close failures are not actionable.
struct ScHandle(SC_HANDLE);

impl Drop for ScHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseServiceHandle(self.0);
        }
    }
}

impl WindowsServiceControl {
    /// Opens the named service with the requested access rights. Returns the
    /// manager handle alongside the service handle so both stay alive for
    /// the duration of the call.
    fn open_service(&self, name: &str, access: u32) -> Result<Option<(ScHandle, ScHandle)>> {
        unsafe {
            let manager = ScHandle(
                OpenSCManagerW(PCWSTR::null(), PCWSTR::null(), SC_MANAGER_CONNECT)
                    .context("Failed to open the Service Control Manager")?,
            );

            let wide_name = widestring::U16CString::from_str(name)
                .with_context(|| format!("Service name '{}' contains a NUL byte", name))?;

            match OpenServiceW(manager.0, PCWSTR::from_raw(wide_name.as_ptr()), access) {
                Ok(handle) => Ok(Some((manager, ScHandle(handle)))),
                Err(e) if e.code() == ERROR_SERVICE_DOES_NOT_EXIST.to_hresult() => Ok(None),
                Err(e) => Err(anyhow!("Failed to open service '{}': {:?}", name, e)),
            }
        }
    }
}

impl ServiceControl for WindowsServiceControl {
    fn start(&self, name: &str) -> Result<Lookup> {
        let Some((_manager, service)) = self.open_service(name, SERVICE_START)? else {
            return Ok(Lookup::Missing);
        };

        unsafe {
            match StartServiceW(service.0, None) {
                Ok(()) => Ok(Lookup::Found),
                Err(e) if e.code() == ERROR_SERVICE_ALREADY_RUNNING.to_hresult() => {
                    Ok(Lookup::Found)
                }
                Err(e) => Err(anyhow!("Failed to start service '{}': {:?}", name, e)),
            }
        }
    }

    fn stop(&self, name: &str) -> Result<Lookup> {
        let Some((_manager, service)) = self.open_service(name, SERVICE_STOP)? else {
            return Ok(Lookup::Missing);
        };

        unsafe {
            let mut status = SERVICE_STATUS::default();
            match ControlService(service.0, SERVICE_CONTROL_STOP, &mut status) {
                Ok(()) => Ok(Lookup::Found),
                // Stopping a stopped service is a no-op, not a failure.
                Err(e) if e.code() == ERROR_SERVICE_NOT_ACTIVE.to_hresult() => Ok(Lookup::Found),
                Err(e) => Err(anyhow!("Failed to stop service '{}': {:?}", name, e)),
            }
        }
    }

    fn set_startup_mode(&self, name: &str, mode: StartupMode) -> Result<Lookup> {
        let Some((_manager, service)) = self.open_service(name, SERVICE_CHANGE_CONFIG)? else {
            return Ok(Lookup::Missing);
        };

        let start_type: SERVICE_START_TYPE = match mode {
            StartupMode::Automatic => SERVICE_AUTO_START,
            StartupMode::Manual => SERVICE_DEMAND_START,
            StartupMode::Disabled => SERVICE_DISABLED,
        };

        unsafe {
            ChangeServiceConfigW(
                service.0,
                ENUM_SERVICE_TYPE(SERVICE_NO_CHANGE),
                start_type,
                SERVICE_ERROR(SERVICE_NO_CHANGE),
                PCWSTR::null(), // binary path
                PCWSTR::null(), // load order group
                None,           // tag id
                PCWSTR::null(), // dependencies
                PCWSTR::null(), // service start name
                PCWSTR::null(), // password
                PCWSTR::null(), // display name
            )
            .map_err(|e| {
                anyhow!(
                    "Failed to set startup mode {} for service '{}': {:?}",
                    mode,
                    name,
                    e
                )
            })?;
        }
        Ok(Lookup::Found)
    }
}
