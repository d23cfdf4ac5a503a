// src/tweaks/essential.rs
//
// The "Essential Tweaks" batch and its hand-authored undo. The undo mirrors
// the apply batch's step ordering with inverted payload values; it is not a
// derived inverse, and pairing correctness is this file's responsibility.

use std::path::Path;

use super::{Batch, Step};
use crate::adapters::{RegistryValue, StartupMode};

// Current user locations.
const CONTENT_DELIVERY_MANAGER: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\ContentDeliveryManager";
const FEEDBACK_RULES: &str = "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Siuf\\Rules";
const TAILORED_EXPERIENCES: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Policies\\Microsoft\\Windows\\CloudContent";
const FILE_OPERATIONS: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer\\OperationStatusManager";
const EXPLORER_ADVANCED: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer\\Advanced";
const PEOPLE_BAND: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer\\Advanced\\People";
const EXPLORER: &str = "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer";
const WINDOWS_FEEDS: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Policies\\Microsoft\\Windows\\Windows Feeds";
const EXPLORER_POLICIES: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Policies\\Explorer";

// Local machine locations.
const CLOUD_CONTENT_POLICY: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\CloudContent";
const ACTIVITY_HISTORY: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\System";
const MAPS: &str = "HKEY_LOCAL_MACHINE\\SYSTEM\\Maps";
const DATA_COLLECTION_POLICY: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\DataCollection";
const ADVERTISING_INFO: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\AdvertisingInfo";
const WIFI_HOTSPOT_REPORTING: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\PolicyManager\\default\\WiFi\\AllowWiFiHotSpotReporting";
const WIFI_AUTO_CONNECT: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\PolicyManager\\default\\WiFi\\AllowAutoConnectToWiFiSenseHotspots";
const ERROR_REPORTING: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\Windows Error Reporting";
const DELIVERY_OPTIMIZATION: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\DeliveryOptimization\\Config";
const REMOTE_ASSISTANCE: &str =
    "HKEY_LOCAL_MACHINE\\SYSTEM\\CurrentControlSet\\Control\\Remote Assistance";
const IRP_STACK: &str =
    "HKEY_LOCAL_MACHINE\\SYSTEM\\CurrentControlSet\\Services\\LanmanServer\\Parameters";
const LOCATION_CONSENT: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\CapabilityAccessManager\\ConsentStore\\location";
const SENSOR_OVERRIDES: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion\\Sensor\\Overrides\\{BFA794E4-F964-4FDB-90F6-51056BFE4B44}";
const LFSVC_CONFIG: &str =
    "HKEY_LOCAL_MACHINE\\SYSTEM\\CurrentControlSet\\Services\\lfsvc\\Service\\Configuration";
const SESSION_POWER: &str =
    "HKEY_LOCAL_MACHINE\\SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Power";
const FLYOUT_MENU: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer\\FlyoutMenuSettings";

// Users hive.
const DEFAULT_KEYBOARD: &str = "HKEY_USERS\\.DEFAULT\\Control Panel\\Keyboard";

// Subtrees handled through PowerShell (whole-key removal/creation is outside
// the value-level key-value store interface).
const STORAGE_SENSE_PS: &str =
    "HKLM:\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\StorageSense\\Parameters\\StoragePolicy";
const THREE_D_OBJECTS_PS: &str =
    "HKLM:\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer\\MyComputer\\NameSpace\\{0DB7E03F-FC29-4DC6-9020-FF41B59E513A}";

const CLOUD_CONTENT_KEYS: &[&str] = &[
    "ContentDeliveryAllowed",
    "OemPreInstalledAppsEnabled",
    "PreInstalledAppsEnabled",
    "PreInstalledAppsEverEnabled",
    "SilentInstalledAppsEnabled",
    "SubscribedContent-338387Enabled",
    "SubscribedContent-338388Enabled",
    "SubscribedContent-338389Enabled",
    "SubscribedContent-353698Enabled",
    "SystemPaneSuggestionsEnabled",
];

const ACTIVITY_HISTORY_KEYS: &[&str] = &[
    "EnableActivityFeed",
    "PublishUserActivities",
    "UploadUserActivities",
];

const TELEMETRY_POLICIES: &[&str] = &[
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Policies\\DataCollection",
    DATA_COLLECTION_POLICY,
];

const TELEMETRY_TASKS: &[&str] = &[
    "\\Microsoft\\Windows\\Application Experience\\Microsoft Compatibility Appraiser",
    "\\Microsoft\\Windows\\Application Experience\\ProgramDataUpdater",
    "\\Microsoft\\Windows\\Autochk\\Proxy",
    "\\Microsoft\\Windows\\Customer Experience Improvement Program\\Consolidator",
    "\\Microsoft\\Windows\\Customer Experience Improvement Program\\UsbCeip",
    "\\Microsoft\\Windows\\DiskDiagnostic\\Microsoft-Windows-DiskDiagnosticDataCollector",
];

const FEEDBACK_TASKS: &[&str] = &[
    "\\Microsoft\\Windows\\Feedback\\Siuf\\DmClient",
    "\\Microsoft\\Windows\\Feedback\\Siuf\\DmClientOnScenarioDownload",
];

const ERROR_REPORTING_TASK: &str =
    "\\Microsoft\\Windows\\Windows Error Reporting\\QueueReporting";

/// Services whose startup gets bulk-switched to Manual. Entries must be
/// mutually independent: the whole list runs as one parallel group.
const SERVICES_SET_TO_MANUAL: &[&str] = &[
    "diagnosticshub.standardcollector.service", // Diagnostics Hub Standard Collector
    "DiagTrack",                                // Diagnostics Tracking Service
    "dmwappushservice",                         // WAP Push Message Routing Service
    "lfsvc",                                    // Geolocation Service
    "MapsBroker",                               // Downloaded Maps Manager
    "NetTcpPortSharing",                        // Net.Tcp Port Sharing Service
    "RemoteAccess",                             // Routing and Remote Access
    "RemoteRegistry",                           // Remote Registry
    "SharedAccess",                             // Internet Connection Sharing
    "TrkWks",                                   // Distributed Link Tracking Client
    "WMPNetworkSvc",                            // WMP Network Sharing Service
    "WSearch",                                  // Windows Search
    "XblAuthManager",                           // Xbox Live Auth Manager
    "XblGameSave",                              // Xbox Live Game Save Service
    "XboxNetApiSvc",                            // Xbox Live Networking Service
    "XboxGipSvc",                               // Xbox Accessory Management
    "ndu",                                      // Windows Network Data Usage Monitor
    "WerSvc",                                   // Windows Error Reporting
    "Fax",
    "fhsvc",                                    // Fax history
    "gupdate",                                  // Google Update
    "gupdatem",
    "stisvc",                                   // Windows Image Acquisition
    "AJRouter",                                 // AllJoyn Router Service
    "MSDTC",                                    // Distributed Transaction Coordinator
    "WpcMonSvc",                                // Parental Controls
    "PhoneSvc",                                 // Phone Service
    "PrintNotify",                              // Printer notifications
    "PcaSvc",                                   // Program Compatibility Assistant
    "WPDBusEnum",                               // Portable Device Enumerator
    "seclogon",                                 // Secondary Logon
    "SysMain",                                  // Superfetch
    "lmhosts",                                  // TCP/IP NetBIOS Helper
    "wisvc",                                    // Windows Insider program
    "FontCache",                                // Windows font cache
    "RetailDemo",
    "ALG",                                      // Application Layer Gateway
    "SCardSvr",                                 // Smart card
    "EntAppSvc",                                // Enterprise application management
    "BthAvctpSvc",                              // AVCTP (Bluetooth audio)
    "Browser",                                  // Computer Browser
    "edgeupdate",
    "MicrosoftEdgeElevationService",
    "edgeupdatem",
    "SEMgrSvc",                                 // Payments and NFC/SE Manager
    "PerfHost",
    "BcastDVRUserService_48486de",              // GameDVR and Broadcast
    "CaptureService_48486de",
    "cbdhsvc_48486de",                          // Clipboard user service
    "WpnService",                               // Push notifications
    "RtkBtManServ",                             // Realtek Bluetooth Device Manager
    "QWAVE",                                    // Quality Windows Audio Video Experience
    "DPS",
    "HvHost",
    "vmickvpexchange",
    "vmicguestinterface",
    "vmicshutdown",
    "vmicheartbeat",
    "vmicvmsession",
    "vmicrdv",
    "vmictimesync",
];

fn program_data_dir() -> String {
    std::env::var("ProgramData").unwrap_or_else(|_| "C:\\ProgramData".to_string())
}

fn auto_logger_dir() -> String {
    format!("{}\\Microsoft\\Diagnosis\\ETLLogs\\AutoLogger", program_data_dir())
}

fn remove_registry_tree(name: &str, ps_path: &str) -> Step {
    Step::run_command(
        name,
        "powershell",
        &[
            "-NoProfile",
            "-Command",
            &format!(
                "Remove-Item -Path '{}' -Recurse -Force -ErrorAction SilentlyContinue",
                ps_path
            ),
        ],
    )
}

fn create_registry_key(name: &str, ps_path: &str) -> Step {
    Step::run_command(
        name,
        "powershell",
        &[
            "-NoProfile",
            "-Command",
            &format!("New-Item -Path '{}' -Force | Out-Null", ps_path),
        ],
    )
}

fn restore_point(description: &str) -> Step {
    Step::run_command(
        "Creating a restore point.",
        "powershell",
        &[
            "-NoProfile",
            "-Command",
            &format!(
                "Checkpoint-Computer -Description '{}' -RestorePointType MODIFY_SETTINGS",
                description
            ),
        ],
    )
}

fn set_services_to_manual() -> Batch {
    Batch::new("Services to Manual").parallel(SERVICES_SET_TO_MANUAL.iter().map(|service| {
        Step::service_startup_mode(
            format!("Setting `{}` to Manual.", service),
            *service,
            StartupMode::Manual,
        )
    }))
}

pub fn essential_tweaks() -> Batch {
    let mut batch = Batch::new("Essential Tweaks").step(restore_point("Essential Tweaks"));

    // Telemetry.
    for path in TELEMETRY_POLICIES {
        batch = batch.step(Step::registry_dword(
            "Disabling Telemetry.",
            *path,
            "AllowTelemetry",
            0,
        ));
    }
    batch = batch.nested(
        TELEMETRY_TASKS.iter().fold(
            Batch::new("Telemetry Tasks"),
            |tasks, task| {
                tasks.step(Step::task_disable(
                    format!("Disabling telemetry task `{}`.", task),
                    *task,
                ))
            },
        ),
    );

    // Wi-Fi Sense.
    batch = batch
        .step(Step::registry_dword(
            "Disabling Wi-Fi Sense hotspot reporting.",
            WIFI_HOTSPOT_REPORTING,
            "Value",
            0,
        ))
        .step(Step::registry_dword(
            "Disabling Wi-Fi Sense auto-connect.",
            WIFI_AUTO_CONNECT,
            "Value",
            0,
        ));

    // Application suggestions.
    for key in CLOUD_CONTENT_KEYS {
        batch = batch.step(Step::registry_dword(
            "Disabling application suggestions.",
            CONTENT_DELIVERY_MANAGER,
            *key,
            0,
        ));
    }
    batch = batch.step(Step::registry_dword(
        "Disabling consumer features.",
        CLOUD_CONTENT_POLICY,
        "DisableWindowsConsumerFeatures",
        1,
    ));

    // Activity history.
    for key in ACTIVITY_HISTORY_KEYS {
        batch = batch.step(Step::registry_dword(
            "Disabling activity history.",
            ACTIVITY_HISTORY,
            *key,
            0,
        ));
    }

    // Location tracking.
    batch = batch
        .step(Step::registry_write(
            "Disabling location tracking.",
            LOCATION_CONSENT,
            "Value",
            RegistryValue::Text("Deny".to_string()),
        ))
        .step(Step::registry_dword(
            "Denying sensor permissions.",
            SENSOR_OVERRIDES,
            "SensorPermissionState",
            0,
        ))
        .step(Step::registry_dword(
            "Disabling the geolocation service configuration.",
            LFSVC_CONFIG,
            "Status",
            0,
        ));

    // Maps, feedback, tailored experiences, advertising.
    batch = batch
        .step(Step::registry_dword(
            "Disabling automatic Maps updates.",
            MAPS,
            "AutoUpdateEnabled",
            0,
        ))
        .step(Step::registry_dword(
            "Disabling Feedback.",
            FEEDBACK_RULES,
            "NumberOfSIUFInPeriod",
            0,
        ))
        .step(Step::registry_dword(
            "Hiding feedback notifications.",
            DATA_COLLECTION_POLICY,
            "DoNotShowFeedbackNotification",
            1,
        ));
    batch = batch.nested(FEEDBACK_TASKS.iter().fold(
        Batch::new("Feedback Tasks"),
        |tasks, task| {
            tasks.step(Step::task_disable(
                format!("Disabling feedback task `{}`.", task),
                *task,
            ))
        },
    ));
    batch = batch
        .step(Step::registry_dword(
            "Disabling Tailored Experiences.",
            TAILORED_EXPERIENCES,
            "DisableTailoredExperiencesWithDiagnosticData",
            1,
        ))
        .step(Step::registry_dword(
            "Disabling the Advertising ID.",
            ADVERTISING_INFO,
            "DisabledByGroupPolicy",
            1,
        ));

    // Error reporting.
    batch = batch
        .step(Step::registry_dword(
            "Disabling Error Reporting.",
            ERROR_REPORTING,
            "Disabled",
            1,
        ))
        .step(Step::task_disable(
            "Disabling the error reporting queue task.",
            ERROR_REPORTING_TASK,
        ));

    // Windows Update delivery.
    batch = batch.step(Step::registry_dword(
        "Restricting update delivery to the local network.",
        DELIVERY_OPTIMIZATION,
        "DODownloadMode",
        1,
    ));

    // Services.
    batch = batch
        .step(Step::service_startup_mode(
            "Stopping and disabling the Diagnostics Tracking service.",
            "DiagTrack",
            StartupMode::Disabled,
        ))
        .step(Step::service_startup_mode(
            "Stopping and disabling the WAP Push service.",
            "dmwappushservice",
            StartupMode::Disabled,
        ));

    // F8 boot menu.
    batch = batch.step(Step::run_command(
        "Enabling the F8 boot menu option.",
        "bcdedit",
        &["/set", "{current}", "bootmenupolicy", "legacy"],
    ));

    // Home Groups.
    batch = batch
        .step(Step::service_startup_mode(
            "Disabling the HomeGroup listener.",
            "HomeGroupListener",
            StartupMode::Disabled,
        ))
        .step(Step::service_startup_mode(
            "Disabling the HomeGroup provider.",
            "HomeGroupProvider",
            StartupMode::Disabled,
        ));

    // Remote assistance, storage sense, Superfetch, hibernation.
    batch = batch
        .step(Step::registry_dword(
            "Disabling Remote Assistance.",
            REMOTE_ASSISTANCE,
            "fAllowToGetHelp",
            0,
        ))
        .step(remove_registry_tree("Disabling Storage Sense.", STORAGE_SENSE_PS))
        .step(Step::service_startup_mode(
            "Disabling Superfetch.",
            "SysMain",
            StartupMode::Disabled,
        ))
        .step(Step::registry_dword(
            "Disabling Hibernation.",
            SESSION_POWER,
            "HibernateEnabled",
            0,
        ))
        .step(Step::registry_dword(
            "Hiding the Hibernate option.",
            FLYOUT_MENU,
            "ShowHibernateOption",
            0,
        ));

    // Explorer behavior.
    batch = batch
        .step(Step::registry_dword(
            "Showing file operation details.",
            FILE_OPERATIONS,
            "EnthusiastMode",
            1,
        ))
        .step(Step::registry_dword(
            "Hiding the Task View button.",
            EXPLORER_ADVANCED,
            "ShowTaskViewButton",
            0,
        ))
        .step(Step::registry_dword(
            "Hiding the People icon.",
            PEOPLE_BAND,
            "PeopleBand",
            0,
        ))
        .step(Step::registry_dword(
            "Hiding inactive tray icons.",
            EXPLORER,
            "EnableAutoTray",
            1,
        ))
        .step(Step::registry_dword(
            "Enabling NumLock after startup.",
            DEFAULT_KEYBOARD,
            "InitialKeyboardIndicators",
            2147483650,
        ))
        .step(Step::registry_dword(
            "Changing the default Explorer view to This PC.",
            EXPLORER,
            "LaunchTo",
            1,
        ))
        .step(remove_registry_tree(
            "Hiding the 3D Objects icon from This PC.",
            THREE_D_OBJECTS_PS,
        ))
        .step(Step::registry_dword(
            "Raising the IRP stack size.",
            IRP_STACK,
            "IRPStackSize",
            20,
        ));

    // News and Interests, Meet Now.
    batch = batch
        .step(Step::registry_dword(
            "Disabling News and Interests.",
            WINDOWS_FEEDS,
            "EnableFeeds",
            0,
        ))
        .step(Step::registry_dword(
            "Collapsing the feeds taskbar view.",
            WINDOWS_FEEDS,
            "ShellFeedsTaskbarViewMode",
            2,
        ))
        .step(Step::registry_dword(
            "Removing the Meet Now button.",
            EXPLORER_POLICIES,
            "HideSCAMeetNow",
            1,
        ));

    // AutoLogger.
    batch = batch
        .step(Step::raw("Removing the AutoLogger session file.", || {
            let file = Path::new(&auto_logger_dir()).join("AutoLogger-Diagtrack-Listener.etl");
            if file.is_file() {
                std::fs::remove_file(&file)?;
            }
            Ok(())
        }))
        .step(Step::run_command(
            "Restricting the AutoLogger directory.",
            "icacls",
            &[auto_logger_dir().as_str(), "/deny", "SYSTEM:(OI)(CI)F"],
        ));

    // File extensions.
    batch = batch.step(Step::registry_dword(
        "Showing known file extensions.",
        EXPLORER_ADVANCED,
        "HideFileExt",
        0,
    ));

    batch.nested(set_services_to_manual())
}

pub fn undo_essential_tweaks() -> Batch {
    let mut batch =
        Batch::new("Undo Essential Tweaks").step(restore_point("Undoing Essential Tweaks"));

    // Telemetry.
    for path in TELEMETRY_POLICIES {
        batch = batch.step(Step::registry_dword(
            "Enabling Telemetry.",
            *path,
            "AllowTelemetry",
            1,
        ));
    }
    batch = batch.nested(
        TELEMETRY_TASKS.iter().fold(
            Batch::new("Telemetry Tasks"),
            |tasks, task| {
                tasks.step(Step::task_enable(
                    format!("Enabling telemetry task `{}`.", task),
                    *task,
                ))
            },
        ),
    );

    // Wi-Fi Sense.
    batch = batch
        .step(Step::registry_dword(
            "Enabling Wi-Fi Sense hotspot reporting.",
            WIFI_HOTSPOT_REPORTING,
            "Value",
            1,
        ))
        .step(Step::registry_dword(
            "Enabling Wi-Fi Sense auto-connect.",
            WIFI_AUTO_CONNECT,
            "Value",
            1,
        ));

    // Application suggestions.
    for key in CLOUD_CONTENT_KEYS {
        batch = batch.step(Step::registry_dword(
            "Enabling application suggestions.",
            CONTENT_DELIVERY_MANAGER,
            *key,
            1,
        ));
    }
    batch = batch.step(Step::registry_dword(
        "Enabling consumer features.",
        CLOUD_CONTENT_POLICY,
        "DisableWindowsConsumerFeatures",
        0,
    ));

    // Activity history.
    for key in ACTIVITY_HISTORY_KEYS {
        batch = batch.step(Step::registry_dword(
            "Enabling activity history.",
            ACTIVITY_HISTORY,
            *key,
            1,
        ));
    }

    // Location tracking.
    batch = batch
        .step(Step::registry_write(
            "Enabling location tracking.",
            LOCATION_CONSENT,
            "Value",
            RegistryValue::Text("Allow".to_string()),
        ))
        .step(Step::registry_dword(
            "Restoring sensor permissions.",
            SENSOR_OVERRIDES,
            "SensorPermissionState",
            1,
        ))
        .step(Step::registry_dword(
            "Enabling the geolocation service configuration.",
            LFSVC_CONFIG,
            "Status",
            1,
        ));

    // Maps, feedback, tailored experiences, advertising.
    batch = batch
        .step(Step::registry_dword(
            "Enabling automatic Maps updates.",
            MAPS,
            "AutoUpdateEnabled",
            1,
        ))
        .step(Step::registry_dword(
            "Enabling Feedback.",
            FEEDBACK_RULES,
            "NumberOfSIUFInPeriod",
            1,
        ))
        .step(Step::registry_dword(
            "Showing feedback notifications.",
            DATA_COLLECTION_POLICY,
            "DoNotShowFeedbackNotification",
            0,
        ));
    batch = batch.nested(FEEDBACK_TASKS.iter().fold(
        Batch::new("Feedback Tasks"),
        |tasks, task| {
            tasks.step(Step::task_enable(
                format!("Enabling feedback task `{}`.", task),
                *task,
            ))
        },
    ));
    batch = batch
        .step(Step::registry_dword(
            "Enabling Tailored Experiences.",
            TAILORED_EXPERIENCES,
            "DisableTailoredExperiencesWithDiagnosticData",
            0,
        ))
        .step(Step::registry_dword(
            "Enabling the Advertising ID.",
            ADVERTISING_INFO,
            "DisabledByGroupPolicy",
            0,
        ));

    // Error reporting.
    batch = batch
        .step(Step::registry_dword(
            "Enabling Error Reporting.",
            ERROR_REPORTING,
            "Disabled",
            0,
        ))
        .step(Step::task_enable(
            "Enabling the error reporting queue task.",
            ERROR_REPORTING_TASK,
        ));

    // Windows Update delivery.
    batch = batch.step(Step::registry_delete(
        "Restoring default update delivery.",
        DELIVERY_OPTIMIZATION,
        "DODownloadMode",
    ));

    // Services: start-and-set-manual pairs with stop-and-disable.
    batch = batch
        .step(Step::service_startup_mode(
            "Setting the Diagnostics Tracking service to Manual.",
            "DiagTrack",
            StartupMode::Manual,
        ))
        .step(Step::service_start(
            "Starting the Diagnostics Tracking service.",
            "DiagTrack",
        ))
        .step(Step::service_startup_mode(
            "Setting the WAP Push service to Manual.",
            "dmwappushservice",
            StartupMode::Manual,
        ))
        .step(Step::service_start(
            "Starting the WAP Push service.",
            "dmwappushservice",
        ));

    // F8 boot menu.
    batch = batch.step(Step::run_command(
        "Restoring the standard boot menu policy.",
        "bcdedit",
        &["/set", "{current}", "bootmenupolicy", "standard"],
    ));

    // Home Groups.
    batch = batch
        .step(Step::service_startup_mode(
            "Setting the HomeGroup listener to Manual.",
            "HomeGroupListener",
            StartupMode::Manual,
        ))
        .step(Step::service_start(
            "Starting the HomeGroup listener.",
            "HomeGroupListener",
        ))
        .step(Step::service_startup_mode(
            "Setting the HomeGroup provider to Manual.",
            "HomeGroupProvider",
            StartupMode::Manual,
        ))
        .step(Step::service_start(
            "Starting the HomeGroup provider.",
            "HomeGroupProvider",
        ));

    // Remote assistance, storage sense, Superfetch, hibernation.
    batch = batch
        .step(Step::registry_dword(
            "Enabling Remote Assistance.",
            REMOTE_ASSISTANCE,
            "fAllowToGetHelp",
            1,
        ))
        .step(create_registry_key("Enabling Storage Sense.", STORAGE_SENSE_PS))
        .step(Step::service_startup_mode(
            "Setting Superfetch to Manual.",
            "SysMain",
            StartupMode::Manual,
        ))
        .step(Step::service_start("Starting Superfetch.", "SysMain"))
        .step(Step::registry_dword(
            "Enabling Hibernation.",
            SESSION_POWER,
            "HibernateEnabled",
            1,
        ))
        .step(Step::registry_dword(
            "Showing the Hibernate option.",
            FLYOUT_MENU,
            "ShowHibernateOption",
            1,
        ));

    // Explorer behavior.
    batch = batch
        .step(Step::registry_delete(
            "Hiding file operation details.",
            FILE_OPERATIONS,
            "EnthusiastMode",
        ))
        .step(Step::registry_dword(
            "Showing the Task View button.",
            EXPLORER_ADVANCED,
            "ShowTaskViewButton",
            1,
        ))
        .step(Step::registry_dword(
            "Showing the People icon.",
            PEOPLE_BAND,
            "PeopleBand",
            1,
        ))
        .step(Step::registry_dword(
            "Showing all tray icons.",
            EXPLORER,
            "EnableAutoTray",
            0,
        ))
        .step(Step::registry_dword(
            "Restoring the default NumLock state.",
            DEFAULT_KEYBOARD,
            "InitialKeyboardIndicators",
            2147483648,
        ))
        .step(Step::registry_delete(
            "Restoring the default Explorer view.",
            EXPLORER,
            "LaunchTo",
        ))
        .step(create_registry_key(
            "Showing the 3D Objects icon in This PC.",
            THREE_D_OBJECTS_PS,
        ))
        .step(Step::registry_delete(
            "Restoring the default IRP stack size.",
            IRP_STACK,
            "IRPStackSize",
        ));

    // News and Interests, Meet Now.
    batch = batch
        .step(Step::registry_delete(
            "Enabling News and Interests.",
            WINDOWS_FEEDS,
            "EnableFeeds",
        ))
        .step(Step::registry_delete(
            "Restoring the feeds taskbar view.",
            WINDOWS_FEEDS,
            "ShellFeedsTaskbarViewMode",
        ))
        .step(Step::registry_dword(
            "Restoring the Meet Now button.",
            EXPLORER_POLICIES,
            "HideSCAMeetNow",
            0,
        ));

    // AutoLogger.
    batch = batch.step(Step::run_command(
        "Restoring AutoLogger directory permissions.",
        "icacls",
        &[auto_logger_dir().as_str(), "/grant:r", "SYSTEM:(OI)(CI)F"],
    ));

    // File extensions.
    batch = batch.step(Step::registry_dword(
        "Hiding known file extensions.",
        EXPLORER_ADVANCED,
        "HideFileExt",
        1,
    ));

    // Group policy reset. The bulk services-to-manual group has no recorded
    // prior state to restore, so the undo leaves startup modes untouched.
    batch
        .step(Step::raw("Resetting local group policies.", || {
            let system_root =
                std::env::var("SystemRoot").unwrap_or_else(|_| "C:\\Windows".to_string());
            for dir in ["GroupPolicy", "GroupPolicyUsers"] {
                let path = Path::new(&system_root).join("System32").join(dir);
                if path.is_dir() {
                    std::fs::remove_dir_all(&path)?;
                }
            }
            Ok(())
        }))
        .step(Step::run_command(
            "Refreshing group policy.",
            "gpupdate",
            &["/force"],
        ))
}
