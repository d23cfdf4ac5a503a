// src/tweaks/mod.rs

pub mod batch;
pub mod bloatware;
pub mod essential;
pub mod misc;
pub mod step;
pub mod update_repair;

use indexmap::IndexMap;
use strum_macros::{Display, EnumIter, EnumString};

pub use batch::{Batch, BatchItem};
pub use step::{Step, StepKind, StepOutcome};

/// Every named operation the application can run. A front-end resolves its
/// request to one of these and looks the batch up in `operations`; adding an
/// operation means registering a batch there, not extending a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum OperationId {
    EssentialTweaks,
    UndoEssentialTweaks,
    DisableActionCenter,
    EnableActionCenter,
    HideTrayIcons,
    ShowTrayIcons,
    DarkMode,
    LightMode,
    PerformanceVisuals,
    AppearanceVisuals,
    DisableCortana,
    EnableCortana,
    EnableClipboardHistory,
    EnableLocation,
    EnableHibernation,
    SetTimeToUtc,
    PurgeBloatware,
    ReinstallBloatware,
    SecurityOnlyUpdates,
    DefaultUpdateSettings,
    ResetWindowsUpdate,
}

impl OperationId {
    /// The hand-authored inverse of this operation, where one exists.
    /// Pairing is a catalog-authoring contract: the undo batch mirrors the
    /// apply batch's step ordering with inverted payload values, and is
    /// never derived at runtime.
    pub fn undo_pair(self) -> Option<OperationId> {
        use OperationId::*;
        match self {
            EssentialTweaks => Some(UndoEssentialTweaks),
            DisableActionCenter => Some(EnableActionCenter),
            HideTrayIcons => Some(ShowTrayIcons),
            DarkMode => Some(LightMode),
            PerformanceVisuals => Some(AppearanceVisuals),
            DisableCortana => Some(EnableCortana),
            PurgeBloatware => Some(ReinstallBloatware),
            SecurityOnlyUpdates => Some(DefaultUpdateSettings),
            _ => None,
        }
    }
}

/// Builds the full operation table, constructed once at startup and
/// consulted by name thereafter.
pub fn operations() -> IndexMap<OperationId, Batch> {
    use OperationId::*;
    IndexMap::from_iter([
        (EssentialTweaks, essential::essential_tweaks()),
        (UndoEssentialTweaks, essential::undo_essential_tweaks()),
        (DisableActionCenter, misc::action_center(false)),
        (EnableActionCenter, misc::action_center(true)),
        (HideTrayIcons, misc::tray_icons(true)),
        (ShowTrayIcons, misc::tray_icons(false)),
        (DarkMode, misc::theme_mode(true)),
        (LightMode, misc::theme_mode(false)),
        (PerformanceVisuals, misc::visual_effects(true)),
        (AppearanceVisuals, misc::visual_effects(false)),
        (DisableCortana, misc::cortana(false)),
        (EnableCortana, misc::cortana(true)),
        (EnableClipboardHistory, misc::enable_clipboard_history()),
        (EnableLocation, misc::enable_location()),
        (EnableHibernation, misc::enable_hibernation()),
        (SetTimeToUtc, misc::set_time_to_utc()),
        (PurgeBloatware, bloatware::purge()),
        (ReinstallBloatware, bloatware::reinstall()),
        (SecurityOnlyUpdates, misc::windows_update_type(true)),
        (DefaultUpdateSettings, misc::windows_update_type(false)),
        (ResetWindowsUpdate, update_repair::reset_windows_update()),
    ])
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_operation_has_a_registered_batch() {
        let table = operations();
        for id in OperationId::iter() {
            let batch = table
                .get(&id)
                .unwrap_or_else(|| panic!("operation {} has no batch", id));
            assert!(!batch.is_empty(), "operation {} is empty", id);
        }
    }

    #[test]
    fn undo_pairs_point_at_registered_inverses() {
        let table = operations();
        for id in OperationId::iter() {
            if let Some(undo) = id.undo_pair() {
                assert_ne!(id, undo);
                assert!(table.contains_key(&undo), "missing undo batch for {}", id);
                // Undo batches are the inverse direction, not paired again.
                assert_eq!(undo.undo_pair(), None);
            }
        }
    }

    #[test]
    fn operation_names_parse_back() {
        use std::str::FromStr;
        for id in OperationId::iter() {
            assert_eq!(OperationId::from_str(&id.to_string()), Ok(id));
        }
    }
}
