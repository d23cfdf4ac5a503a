// src/tweaks/bloatware.rs
//
// Preinstalled-app purge and reinstall. Every app is independent of every
// other, so both batches are one parallel group each; the PowerShell pair
// for a single app stays inside one step.

use super::{Batch, Step};

/// AppX package names (and sponsored-app wildcards) considered bloatware.
const BLOATWARE_APPS: &[&str] = &[
    // Preinstalled Windows AppX apps.
    "Microsoft.3DBuilder",
    "Microsoft.Microsoft3DViewer",
    "Microsoft.AppConnector",
    "Microsoft.BingFinance",
    "Microsoft.BingNews",
    "Microsoft.BingSports",
    "Microsoft.BingTranslator",
    "Microsoft.BingWeather",
    "Microsoft.BingFoodAndDrink",
    "Microsoft.BingHealthAndFitness",
    "Microsoft.BingTravel",
    "Microsoft.MinecraftUWP",
    "Microsoft.GamingServices",
    "Microsoft.GetHelp",
    "Microsoft.Getstarted",
    "Microsoft.Messaging",
    "Microsoft.MicrosoftSolitaireCollection",
    "Microsoft.NetworkSpeedTest",
    "Microsoft.News",
    "Microsoft.Office.Lens",
    "Microsoft.Office.Sway",
    "Microsoft.Office.OneNote",
    "Microsoft.OneConnect",
    "Microsoft.People",
    "Microsoft.Print3D",
    "Microsoft.SkypeApp",
    "Microsoft.Wallet",
    "Microsoft.Whiteboard",
    "Microsoft.WindowsAlarms",
    "microsoft.windowscommunicationsapps",
    "Microsoft.WindowsFeedbackHub",
    "Microsoft.WindowsMaps",
    "Microsoft.WindowsPhone",
    "Microsoft.WindowsSoundRecorder",
    "Microsoft.XboxApp",
    "Microsoft.ConnectivityStore",
    "Microsoft.CommsPhone",
    "Microsoft.ScreenSketch",
    "Microsoft.Xbox.TCUI",
    "Microsoft.XboxGameOverlay",
    "Microsoft.XboxGameCallableUI",
    "Microsoft.XboxSpeechToTextOverlay",
    "Microsoft.MixedReality.Portal",
    "Microsoft.XboxIdentityProvider",
    "Microsoft.ZuneMusic",
    "Microsoft.ZuneVideo",
    "Microsoft.YourPhone",
    "Microsoft.MicrosoftOfficeHub",
    // Sponsored apps, matched by wildcard.
    "*EclipseManager*",
    "*ActiproSoftwareLLC*",
    "*AdobeSystemsIncorporated.AdobePhotoshopExpress*",
    "*Duolingo-LearnLanguagesforFree*",
    "*PandoraMediaInc*",
    "*CandyCrush*",
    "*BubbleWitch3Saga*",
    "*Wunderlist*",
    "*Flipboard*",
    "*Twitter*",
    "*Facebook*",
    "*Royal Revolt*",
    "*Sway*",
    "*Speed Test*",
    "*Dolby*",
    "*Viber*",
    "*ACGMediaPlayer*",
    "*Netflix*",
    "*OneCalendar*",
    "*LinkedInforWindows*",
    "*HiddenCityMysteryofShadows*",
    "*Hulu*",
    "*AdobePhotoshopExpress*",
    "*HotspotShieldFreeVPN*",
    "*Microsoft.Advertising.Xaml*",
];

fn remove_app_step(app: &str) -> Step {
    let script = format!(
        "Get-AppxPackage -Name '{0}' | Remove-AppxPackage; \
         Get-AppxProvisionedPackage -Online | Where-Object DisplayName -like '{0}' | \
         Remove-AppxProvisionedPackage -Online",
        app
    );
    Step::run_command(
        format!("Removing `{}`.", app),
        "powershell",
        &["-NoProfile", "-Command", &script],
    )
}

fn reinstall_app_step(app: &str) -> Step {
    let script = format!(
        "Add-AppxPackage -DisableDevelopmentMode -Register \
         \"$($(Get-AppxPackage -AllUsers {}).InstallLocation)\\AppXManifest.xml\"",
        app
    );
    Step::run_command(
        format!("Reinstalling `{}`.", app),
        "powershell",
        &["-NoProfile", "-Command", &script],
    )
}

pub fn purge() -> Batch {
    Batch::new("Remove Preinstalled Apps")
        .parallel(BLOATWARE_APPS.iter().map(|app| remove_app_step(app)))
}

pub fn reinstall() -> Batch {
    Batch::new("Reinstall Preinstalled Apps")
        .parallel(BLOATWARE_APPS.iter().map(|app| reinstall_app_step(app)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockSystem;
    use crate::orchestrator::{CancelToken, Orchestrator};
    use crate::tweaks::BatchItem;

    #[test]
    fn purge_is_one_parallel_group_covering_every_app() {
        let batch = purge();
        assert!(matches!(
            batch.items(),
            [BatchItem::Group(steps)] if steps.len() == BLOATWARE_APPS.len()
        ));
    }

    #[test]
    fn purge_issues_one_command_per_app() {
        let system = MockSystem::new();
        let mut lines: Vec<String> = Vec::new();
        let mut sink = |line: &str| lines.push(line.to_string());
        let report = Orchestrator::with_parallelism(4).execute(
            &purge(),
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );

        assert!(report.success());
        assert_eq!(system.commands.lock().unwrap().len(), BLOATWARE_APPS.len());
        assert_eq!(lines.len(), BLOATWARE_APPS.len());
    }

    #[test]
    fn reinstall_matches_the_purge_list() {
        assert_eq!(reinstall().step_count(), purge().step_count());
    }
}
