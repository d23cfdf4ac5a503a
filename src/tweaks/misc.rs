// src/tweaks/misc.rs
//
// Small paired toggles. Each function builds both directions of one toggle
// from the same locations so the apply/undo pairing stays value-for-value.

use super::{Batch, Step};
use crate::adapters::RegistryValue;

const EXPLORER: &str = "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer";
const EXPLORER_ADVANCED: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer\\Advanced";
const PUSH_NOTIFICATIONS: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\PushNotifications";
const PERSONALIZE: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize";
const DESKTOP: &str = "HKEY_CURRENT_USER\\Control Panel\\Desktop";
const WINDOW_METRICS: &str = "HKEY_CURRENT_USER\\Control Panel\\Desktop\\WindowMetrics";
const KEYBOARD: &str = "HKEY_CURRENT_USER\\Control Panel\\Keyboard";
const VISUAL_EFFECTS: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer\\VisualEffects";
const DWM: &str = "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\DWM";

const PERSONALIZATION_SETTINGS: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Personalization\\Settings";
const INPUT_PERSONALIZATION: &str = "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\InputPersonalization";
const TRAINED_DATA_STORE: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\InputPersonalization\\TrainedDataStore";
const WINDOWS_SEARCH_POLICY: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\Windows Search";

const CLIPBOARD: &str = "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Clipboard";
const SYSTEM_POLICY: &str = "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\System";

const LOCATION_AND_SENSORS: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\LocationAndSensors";
const SENSOR_OVERRIDES: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion\\Sensor\\Overrides\\{BFA794E4-F964-4FDB-90F6-51056BFE4B44}";
const DEVICE_ACCESS: &str =
    "HKEY_CURRENT_USER\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\DeviceAccess\\Global\\{BFA794E4-F964-4FDB-90F6-51056BFE4B44}";
const LOCATION_CONSENT: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\CapabilityAccessManager\\ConsentStore\\location";
const APP_PRIVACY: &str = "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\AppPrivacy";
const LFSVC_CONFIG: &str =
    "HKEY_LOCAL_MACHINE\\SYSTEM\\CurrentControlSet\\Services\\lfsvc\\Service\\Configuration";

const SESSION_POWER: &str =
    "HKEY_LOCAL_MACHINE\\SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Power";
const FLYOUT_MENU: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Explorer\\FlyoutMenuSettings";
const TIME_ZONE_INFORMATION: &str =
    "HKEY_LOCAL_MACHINE\\SYSTEM\\CurrentControlSet\\Control\\TimeZoneInformation";

const DEVICE_METADATA: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\Device Metadata";
const DRIVER_SEARCHING: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\DriverSearching";
const WINDOWS_UPDATE_POLICY: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\WindowsUpdate";
const WINDOWS_UPDATE_AU: &str =
    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\Microsoft\\Windows\\WindowsUpdate\\AU";

// UserPreferencesMask values Windows uses for "best performance" and
// "best appearance".
const PERFORMANCE_PREFERENCES_MASK: [u8; 8] = [144, 18, 3, 128, 16, 0, 0, 0];
const APPEARANCE_PREFERENCES_MASK: [u8; 8] = [158, 30, 7, 128, 18, 0, 0, 0];

pub fn action_center(enable: bool) -> Batch {
    let title = if enable {
        "Enable Action Center"
    } else {
        "Disable Action Center"
    };
    Batch::new(title)
        .step(Step::registry_dword(
            if enable {
                "Showing the notification center."
            } else {
                "Hiding the notification center."
            },
            EXPLORER,
            "DisableNotificationCenter",
            if enable { 0 } else { 1 },
        ))
        .step(Step::registry_dword(
            if enable {
                "Enabling toast notifications."
            } else {
                "Disabling toast notifications."
            },
            PUSH_NOTIFICATIONS,
            "ToastEnabled",
            if enable { 1 } else { 0 },
        ))
}

pub fn tray_icons(hide: bool) -> Batch {
    let title = if hide { "Hide Tray Icons" } else { "Show Tray Icons" };
    Batch::new(title).step(Step::registry_dword(
        if hide {
            "Hiding inactive tray icons."
        } else {
            "Showing all tray icons."
        },
        EXPLORER,
        "EnableAutoTray",
        if hide { 1 } else { 0 },
    ))
}

pub fn theme_mode(dark: bool) -> Batch {
    let title = if dark { "Dark Mode" } else { "Light Mode" };
    let value = if dark { 0 } else { 1 };
    Batch::new(title)
        .step(Step::registry_dword(
            if dark {
                "Switching apps to dark mode."
            } else {
                "Switching apps to light mode."
            },
            PERSONALIZE,
            "AppsUseLightTheme",
            value,
        ))
        .step(Step::registry_dword(
            if dark {
                "Switching the system theme to dark mode."
            } else {
                "Switching the system theme to light mode."
            },
            PERSONALIZE,
            "SystemUsesLightTheme",
            value,
        ))
}

pub fn visual_effects(performance: bool) -> Batch {
    let title = if performance {
        "Performance Visual Effects"
    } else {
        "Appearance Visual Effects"
    };
    let toggles: &[(&str, &str, u32)] = if performance {
        &[
            (DESKTOP, "DragFullWindows", 0),
            (DESKTOP, "MenuShowDelay", 200),
            (WINDOW_METRICS, "MinAnimate", 0),
            (KEYBOARD, "KeyboardDelay", 0),
            (EXPLORER_ADVANCED, "ListviewAlphaSelect", 0),
            (EXPLORER_ADVANCED, "ListviewShadow", 0),
            (EXPLORER_ADVANCED, "TaskbarAnimations", 0),
            (DWM, "EnableAeroPeek", 0),
        ]
    } else {
        &[
            (DESKTOP, "DragFullWindows", 1),
            (DESKTOP, "MenuShowDelay", 400),
            (WINDOW_METRICS, "MinAnimate", 1),
            (KEYBOARD, "KeyboardDelay", 1),
            (EXPLORER_ADVANCED, "ListviewAlphaSelect", 1),
            (EXPLORER_ADVANCED, "ListviewShadow", 1),
            (EXPLORER_ADVANCED, "TaskbarAnimations", 1),
            (DWM, "EnableAeroPeek", 1),
        ]
    };
    let mask = if performance {
        PERFORMANCE_PREFERENCES_MASK
    } else {
        APPEARANCE_PREFERENCES_MASK
    };

    let mut batch = Batch::new(title).step(Step::registry_dword(
        "Selecting custom visual effects.",
        VISUAL_EFFECTS,
        "VisualFXSetting",
        3,
    ));
    for (path, name, value) in toggles {
        batch = batch.step(Step::registry_dword(
            format!("Setting {} to {}.", name, value),
            *path,
            *name,
            *value,
        ));
    }
    batch.step(Step::registry_write(
        "Applying the desktop preferences mask.",
        DESKTOP,
        "UserPreferencesMask",
        RegistryValue::Binary(mask.to_vec()),
    ))
}

pub fn cortana(enable: bool) -> Batch {
    let title = if enable { "Enable Cortana" } else { "Disable Cortana" };
    let on = |v: bool| if v { 1 } else { 0 };
    Batch::new(title)
        .step(Step::registry_dword(
            "Updating the privacy policy acceptance.",
            PERSONALIZATION_SETTINGS,
            "AcceptedPrivacyPolicy",
            on(enable),
        ))
        .step(Step::registry_dword(
            "Configuring implicit text collection.",
            INPUT_PERSONALIZATION,
            "RestrictImplicitTextCollection",
            on(!enable),
        ))
        .step(Step::registry_dword(
            "Configuring implicit ink collection.",
            INPUT_PERSONALIZATION,
            "RestrictImplicitInkCollection",
            on(!enable),
        ))
        .step(Step::registry_dword(
            "Configuring contact harvesting.",
            TRAINED_DATA_STORE,
            "HarvestContacts",
            on(enable),
        ))
        .step(Step::registry_dword(
            if enable {
                "Allowing Cortana in search."
            } else {
                "Removing Cortana from search."
            },
            WINDOWS_SEARCH_POLICY,
            "AllowCortana",
            on(enable),
        ))
}

/// Clears the policy values that block clipboard history.
pub fn enable_clipboard_history() -> Batch {
    Batch::new("Enable Clipboard History")
        .step(Step::registry_delete(
            "Clearing the clipboard history block.",
            CLIPBOARD,
            "EnableClipboardHistory",
        ))
        .step(Step::registry_delete(
            "Clearing the clipboard history policy.",
            SYSTEM_POLICY,
            "AllowClipboardHistory",
        ))
}

pub fn enable_location() -> Batch {
    Batch::new("Enable Location Services")
        .step(Step::registry_delete(
            "Clearing the location provider block.",
            LOCATION_AND_SENSORS,
            "DisableWindowsLocationProvider",
        ))
        .step(Step::registry_delete(
            "Clearing the location scripting block.",
            LOCATION_AND_SENSORS,
            "DisableLocationScripting",
        ))
        .step(Step::registry_delete(
            "Clearing the location block.",
            LOCATION_AND_SENSORS,
            "DisableLocation",
        ))
        .step(Step::registry_delete(
            "Clearing sensor permission overrides.",
            SENSOR_OVERRIDES,
            "SensorPermissionState",
        ))
        .step(Step::registry_write(
            "Allowing device location access.",
            DEVICE_ACCESS,
            "Value",
            RegistryValue::Text("Allow".to_string()),
        ))
        .step(Step::registry_write(
            "Allowing location consent.",
            LOCATION_CONSENT,
            "Value",
            RegistryValue::Text("Allow".to_string()),
        ))
        .step(Step::registry_delete(
            "Clearing the app location policy.",
            APP_PRIVACY,
            "LetAppsAccessLocation",
        ))
        .step(Step::registry_delete(
            "Clearing the user-controlled location list.",
            APP_PRIVACY,
            "LetAppsAccessLocation_UserInControlOfTheseApps",
        ))
        .step(Step::registry_delete(
            "Clearing the force-allow location list.",
            APP_PRIVACY,
            "LetAppsAccessLocation_ForceAllowTheseApps",
        ))
        .step(Step::registry_delete(
            "Clearing the force-deny location list.",
            APP_PRIVACY,
            "LetAppsAccessLocation_ForceDenyTheseApps",
        ))
        .step(Step::registry_dword(
            "Enabling the geolocation service configuration.",
            LFSVC_CONFIG,
            "Status",
            1,
        ))
}

pub fn enable_hibernation() -> Batch {
    Batch::new("Enable Hibernation")
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
        ))
}

pub fn set_time_to_utc() -> Batch {
    Batch::new("Set Time to UTC").step(Step::registry_dword(
        "Storing hardware clock time as UTC.",
        TIME_ZONE_INFORMATION,
        "RealTimeIsUniversal",
        1,
    ))
}

/// Security-only updates write the restriction policies; the default
/// configuration deletes them again.
pub fn windows_update_type(security_only: bool) -> Batch {
    let policies: &[(&str, &str, u32)] = &[
        (DEVICE_METADATA, "PreventDeviceMetadataFromNetwork", 1),
        (DRIVER_SEARCHING, "DontPromptForWindowsUpdate", 1),
        (DRIVER_SEARCHING, "DontSearchWindowsUpdate", 1),
        (DRIVER_SEARCHING, "DriverUpdateWizardWuSearchEnabled", 0),
        (WINDOWS_UPDATE_POLICY, "ExcludeWUDriversInQualityUpdate", 1),
        (WINDOWS_UPDATE_AU, "NoAutoRebootWithLoggedOnUsers", 0),
        (WINDOWS_UPDATE_AU, "AUPowerManagement", 0),
    ];

    if security_only {
        let mut batch = Batch::new("Security-Only Updates");
        for (path, name, value) in policies {
            batch = batch.step(Step::registry_dword(
                format!("Restricting updates: setting {}.", name),
                *path,
                *name,
                *value,
            ));
        }
        batch
    } else {
        let mut batch = Batch::new("Default Update Settings");
        for (path, name, _) in policies {
            batch = batch.step(Step::registry_delete(
                format!("Restoring updates: clearing {}.", name),
                *path,
                *name,
            ));
        }
        batch
    }
}
