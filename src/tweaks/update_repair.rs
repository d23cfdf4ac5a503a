// src/tweaks/update_repair.rs
//
// The "Reset Windows Update" repair batch: stop the update services, clear
// the transfer queue and caches, re-register the update libraries, reset the
// network stack, then bring the services back.

use std::path::Path;

use super::{Batch, Step};

const UPDATE_SERVICES: &[&str] = &["BITS", "wuauserv", "appidsvc", "cryptsvc"];

const WINDOWS_UPDATE: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\WindowsUpdate";

const UPDATE_DLLS: &[&str] = &[
    "atl.dll",
    "urlmon.dll",
    "mshtml.dll",
    "shdocvw.dll",
    "browseui.dll",
    "jscript.dll",
    "vbscript.dll",
    "scrrun.dll",
    "msxml.dll",
    "msxml3.dll",
    "msxml6.dll",
    "actxprxy.dll",
    "softpub.dll",
    "wintrust.dll",
    "dssenh.dll",
    "rsaenh.dll",
    "gpkcsp.dll",
    "sccbase.dll",
    "slbcsp.dll",
    "cryptdlg.dll",
    "oleaut32.dll",
    "ole32.dll",
    "shell32.dll",
    "initpki.dll",
    "wuapi.dll",
    "wuaueng.dll",
    "wuaueng1.dll",
    "wucltui.dll",
    "wups.dll",
    "wups2.dll",
    "wuweb.dll",
    "qmgr.dll",
    "qmgrprxy.dll",
    "wucltux.dll",
    "muweb.dll",
];

// Default security descriptors for the transfer and update services.
const BITS_SDDL: &str = "D:(A;;CCLCSWRPWPDTLOCRRC;;;SY)(A;;CCDCLCSWRPWPDTLOCRSDRCWDWO;;;BA)(A;;CCLCSWLOCRRC;;;AU)(A;;CCLCSWRPWPDTLOCRRC;;;PU)";
const WUAUSERV_SDDL: &str = "D:(A;;CCLCSWRPWPDTLOCRRC;;;SY)(A;;CCDCLCSWRPWPDTLOCRSDRCWDWO;;;BA)(A;;CCLCSWLOCRRC;;;AU)(A;;CCLCSWRPWPDTLOCRRC;;;PU)";

fn system_root() -> String {
    std::env::var("SystemRoot").unwrap_or_else(|_| "C:\\Windows".to_string())
}

fn program_data_dir() -> String {
    std::env::var("ProgramData").unwrap_or_else(|_| "C:\\ProgramData".to_string())
}

fn register_update_dlls() -> Batch {
    UPDATE_DLLS.iter().fold(
        Batch::new("Update Libraries"),
        |batch, dll| {
            let dll_path = format!("{}\\System32\\{}", system_root(), dll);
            batch.step(Step::run_command(
                format!("Registering `{}`.", dll),
                "regsvr32.exe",
                &["/s", &dll_path],
            ))
        },
    )
}

pub fn reset_windows_update() -> Batch {
    let mut batch = Batch::new("Reset Windows Update");

    for service in UPDATE_SERVICES {
        batch = batch.step(Step::service_stop(
            format!("Stopping `{}`.", service),
            *service,
        ));
    }

    batch = batch
        .step(Step::raw("Deleting QMGR data files.", || {
            let downloader = Path::new(&program_data_dir())
                .join("Microsoft")
                .join("Network")
                .join("Downloader");
            if !downloader.is_dir() {
                return Ok(());
            }
            for entry in std::fs::read_dir(&downloader)? {
                let entry = entry?;
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();
                if file_name.starts_with("qmgr") && file_name.ends_with(".dat") {
                    std::fs::remove_file(entry.path())?;
                }
            }
            Ok(())
        }))
        .step(Step::raw(
            "Backing up SoftwareDistribution and catroot2.",
            || {
                let root = system_root();
                for dir in ["SoftwareDistribution", "System32\\catroot2"] {
                    let path = Path::new(&root).join(dir);
                    if path.is_dir() {
                        let mut backup = path.clone().into_os_string();
                        backup.push(".bak");
                        std::fs::rename(&path, backup)?;
                    }
                }
                Ok(())
            },
        ))
        .step(Step::raw("Removing old Windows Update logs.", || {
            let log = Path::new(&system_root()).join("WindowsUpdate.log");
            if log.is_file() {
                std::fs::remove_file(&log)?;
            }
            Ok(())
        }));

    batch = batch
        .step(Step::run_command(
            "Resetting the BITS service security descriptor.",
            "sc.exe",
            &["sdset", "bits", BITS_SDDL],
        ))
        .step(Step::run_command(
            "Resetting the Windows Update service security descriptor.",
            "sc.exe",
            &["sdset", "wuauserv", WUAUSERV_SDDL],
        ));

    batch = batch.nested(register_update_dlls());

    batch = batch
        .step(Step::registry_delete(
            "Removing the WSUS account domain id.",
            WINDOWS_UPDATE,
            "AccountDomainSid",
        ))
        .step(Step::registry_delete(
            "Removing the WSUS ping id.",
            WINDOWS_UPDATE,
            "PingID",
        ))
        .step(Step::registry_delete(
            "Removing the WSUS client id.",
            WINDOWS_UPDATE,
            "SusClientId",
        ));

    batch = batch
        .step(Step::run_command(
            "Resetting the WinSock catalog.",
            "netsh",
            &["winsock", "reset"],
        ))
        .step(Step::run_command(
            "Resetting the WinHTTP proxy.",
            "netsh",
            &["winhttp", "reset", "proxy"],
        ))
        .step(Step::run_command(
            "Cancelling queued BITS transfers.",
            "powershell",
            &[
                "-NoProfile",
                "-Command",
                "Get-BitsTransfer -AllUsers | Remove-BitsTransfer",
            ],
        ));

    for service in UPDATE_SERVICES {
        batch = batch.step(Step::service_start(
            format!("Starting `{}`.", service),
            *service,
        ));
    }

    batch.step(Step::run_command(
        "Forcing update discovery.",
        "wuauclt",
        &["/resetauthorization", "/detectnow"],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockSystem;
    use crate::adapters::StartupMode;
    use crate::orchestrator::{CancelToken, Orchestrator};

    #[test]
    fn services_are_stopped_then_restarted() {
        let mut system = MockSystem::new();
        for service in UPDATE_SERVICES {
            system = system.with_service(service, true, StartupMode::Automatic);
        }

        let mut sink = |_: &str| {};
        let report = Orchestrator::with_parallelism(2).execute(
            &reset_windows_update(),
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );

        assert!(
            report.failures.is_empty(),
            "unexpected failures: {:?}",
            report.failures
        );
        for service in UPDATE_SERVICES {
            assert!(system.service(service).unwrap().running);
        }
        let commands = system.commands.lock().unwrap();
        assert!(commands.iter().any(|c| c == "netsh winsock reset"));
        assert_eq!(
            commands
                .iter()
                .filter(|c| c.starts_with("regsvr32.exe"))
                .count(),
            UPDATE_DLLS.len()
        );
    }

    #[test]
    fn repair_tolerates_a_system_without_the_services() {
        let system = MockSystem::new();
        let mut sink = |_: &str| {};
        let report = Orchestrator::new().execute(
            &reset_windows_update(),
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );
        assert!(report.failures.is_empty());
    }
}
