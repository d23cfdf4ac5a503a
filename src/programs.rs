// src/programs.rs

use anyhow::{ensure, Result};
use indexmap::IndexMap;
use strum_macros::{Display, EnumIter, EnumString};

use crate::tweaks::{Batch, Step};

/// One installable program: a display name plus the ordered package
/// identifiers that together constitute it (e.g. a runtime and its
/// companion launcher under one logical entry).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramEntry {
    display_name: String,
    ids: Vec<String>,
}

impl ProgramEntry {
    /// Fails if `ids` is empty: an entry must name at least one package.
    pub fn new(display_name: impl Into<String>, ids: &[&str]) -> Result<Self> {
        let display_name = display_name.into();
        ensure!(
            !display_name.trim().is_empty(),
            "a program entry needs a display name"
        );
        ensure!(
            !ids.is_empty(),
            "program entry '{}' has no package identifiers",
            display_name
        );
        Ok(Self {
            display_name,
            ids: ids.iter().map(|id| id.to_string()).collect(),
        })
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum ProgramCategory {
    Utilities,
    Browsers,
    Multimedia,
    Documents,
}

/// Load-once table of known programs, grouped by category. Constructed
/// explicitly at startup and passed to whoever builds install batches;
/// read-only thereafter.
#[derive(Clone, Debug)]
pub struct ProgramCatalog {
    categories: IndexMap<ProgramCategory, Vec<ProgramEntry>>,
}

impl ProgramCatalog {
    /// The built-in catalog. Identifiers are winget package ids.
    pub fn builtin() -> Result<Self> {
        let mut categories = IndexMap::new();
        categories.insert(
            ProgramCategory::Utilities,
            entries(&[
                ("7-Zip", &["7zip.7zip"]),
                ("Everything", &["voidtools.Everything"]),
                ("PowerToys", &["Microsoft.PowerToys"]),
                ("Notepad++", &["Notepad++.Notepad++"]),
                ("ShareX", &["ShareX.ShareX"]),
                ("WinDirStat", &["WinDirStat.WinDirStat"]),
                ("Windows Terminal", &["Microsoft.WindowsTerminal"]),
                ("Python 3", &["Python.Python.3.12", "Python.Launcher"]),
                ("Etcher", &["Balena.Etcher"]),
            ])?,
        );
        categories.insert(
            ProgramCategory::Browsers,
            entries(&[
                ("Firefox", &["Mozilla.Firefox"]),
                ("Chrome", &["Google.Chrome"]),
                ("Brave", &["Brave.Brave"]),
                ("Vivaldi", &["VivaldiTechnologies.Vivaldi"]),
            ])?,
        );
        categories.insert(
            ProgramCategory::Multimedia,
            entries(&[
                ("VLC", &["VideoLAN.VLC"]),
                ("Spotify", &["Spotify.Spotify"]),
                ("Audacity", &["Audacity.Audacity"]),
                ("OBS Studio", &["OBSProject.OBSStudio"]),
                ("GIMP", &["GIMP.GIMP"]),
                ("HandBrake", &["HandBrake.HandBrake"]),
            ])?,
        );
        categories.insert(
            ProgramCategory::Documents,
            entries(&[
                ("LibreOffice", &["TheDocumentFoundation.LibreOffice"]),
                ("Adobe Acrobat Reader", &["Adobe.Acrobat.Reader.64-bit"]),
                ("SumatraPDF", &["SumatraPDF.SumatraPDF"]),
                ("Obsidian", &["Obsidian.Obsidian"]),
            ])?,
        );
        Ok(Self { categories })
    }

    pub fn category(&self, category: ProgramCategory) -> &[ProgramEntry] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProgramCategory, &[ProgramEntry])> {
        self.categories
            .iter()
            .map(|(category, entries)| (*category, entries.as_slice()))
    }

    /// Case-insensitive display-name lookup across all categories.
    pub fn find(&self, display_name: &str) -> Option<&ProgramEntry> {
        self.categories.values().flatten().find(|entry| {
            entry.display_name.eq_ignore_ascii_case(display_name)
        })
    }
}

fn entries(table: &[(&str, &[&str])]) -> Result<Vec<ProgramEntry>> {
    table
        .iter()
        .map(|(display_name, ids)| ProgramEntry::new(*display_name, ids))
        .collect()
}

/// Batch installing `programs`, fanned out as one parallel group. Entries
/// are mutually independent; the identifiers within one entry are not and
/// stay sequential inside their step.
pub fn install_batch(programs: &[ProgramEntry]) -> Batch {
    Batch::new("Install Programs").parallel(programs.iter().cloned().map(Step::package_install))
}

/// Batch uninstalling `programs`, fanned out as one parallel group.
pub fn remove_batch(programs: &[ProgramEntry]) -> Batch {
    Batch::new("Uninstall Programs").parallel(programs.iter().cloned().map(Step::package_remove))
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::adapters::mock::MockSystem;
    use crate::orchestrator::{CancelToken, Orchestrator};
    use crate::tweaks::BatchItem;

    #[test]
    fn entry_requires_at_least_one_identifier() {
        assert!(ProgramEntry::new("Empty", &[]).is_err());
        assert!(ProgramEntry::new("  ", &["some.id"]).is_err());
        assert!(ProgramEntry::new("Real", &["some.id"]).is_ok());
    }

    #[test]
    fn builtin_catalog_covers_every_category() {
        let catalog = ProgramCatalog::builtin().unwrap();
        for category in ProgramCategory::iter() {
            assert!(
                !catalog.category(category).is_empty(),
                "category {} is empty",
                category
            );
        }
    }

    #[test]
    fn find_is_case_insensitive() {
        let catalog = ProgramCatalog::builtin().unwrap();
        let entry = catalog.find("firefox").unwrap();
        assert_eq!(entry.display_name(), "Firefox");
        assert!(catalog.find("no such program").is_none());
    }

    #[test]
    fn install_batch_is_one_parallel_group() {
        let catalog = ProgramCatalog::builtin().unwrap();
        let programs: Vec<ProgramEntry> =
            catalog.category(ProgramCategory::Browsers).to_vec();
        let batch = install_batch(&programs);

        assert_eq!(batch.items().len(), 1);
        assert!(
            matches!(batch.items()[0], BatchItem::Group(ref steps) if steps.len() == programs.len())
        );
    }

    #[test]
    fn installing_then_removing_restores_the_mock() {
        let catalog = ProgramCatalog::builtin().unwrap();
        let programs: Vec<ProgramEntry> =
            catalog.category(ProgramCategory::Multimedia).to_vec();
        let system = MockSystem::new();
        let orchestrator = Orchestrator::with_parallelism(3);

        let mut sink = |_: &str| {};
        let report = orchestrator.execute(
            &install_batch(&programs),
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );
        assert!(report.success());
        let installed = system.installed.lock().unwrap().len();
        assert_eq!(
            installed,
            programs.iter().map(|p| p.ids().len()).sum::<usize>()
        );

        let report = orchestrator.execute(
            &remove_batch(&programs),
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );
        assert!(report.success());
        assert!(system.installed.lock().unwrap().is_empty());
    }
}
