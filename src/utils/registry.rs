// src/utils/registry.rs

use anyhow::{Context, Result};
use winreg::{
    enums::{
        RegType::REG_SZ, HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER,
        HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_READ, KEY_WRITE,
    },
    RegKey, RegValue,
};

use crate::adapters::{KeyValueStore, RegistryValue};

/// Live Windows registry access through `winreg`. Paths carry the hive as
/// their first component (e.g. `HKEY_LOCAL_MACHINE\\Software\\...`).
pub struct WindowsRegistry;

impl KeyValueStore for WindowsRegistry {
    fn write(&self, path: &str, name: &str, value: &RegistryValue) -> Result<()> {
        let (hive, subkey_path) = parse_registry_path(path)?;

        // create_subkey creates all intermediate subkeys that don't exist yet
        let (key, _) = hive
            .create_subkey(&subkey_path)
            .with_context(|| format!("Failed to create or open subkey '{}'", subkey_path))?;

        set_registry_key_value(&key, name, value)
            .with_context(|| format!("Failed to set registry value '{}' in '{}'", name, path))
    }

    fn delete(&self, path: &str, name: &str) -> Result<()> {
        let (hive, subkey_path) = parse_registry_path(path)?;

        let subkey = match hive.open_subkey_with_flags(&subkey_path, KEY_WRITE) {
            Ok(key) => key,
            // A missing parent path means there is nothing to delete.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to open subkey '{}'", subkey_path))
            }
        };

        match subkey.delete_value(name) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to delete registry value '{}' in '{}': {}",
                name,
                subkey_path,
                e
            )),
        }
    }
}

/// Reads a registry value, mapping absence to `Ok(None)`.
pub fn read_registry_value(path: &str, name: &str) -> Result<Option<RegistryValue>> {
    let (hive, subkey_path) = parse_registry_path(path)?;

    let subkey = match hive.open_subkey_with_flags(&subkey_path, KEY_READ) {
        Ok(key) => key,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to open subkey '{}'", subkey_path))
        }
    };

    match subkey.get_raw_value(name) {
        Ok(value) => match value.vtype {
            winreg::enums::RegType::REG_DWORD => {
                if value.bytes.len() >= 4 {
                    let dword = u32::from_le_bytes([
                        value.bytes[0],
                        value.bytes[1],
                        value.bytes[2],
                        value.bytes[3],
                    ]);
                    Ok(Some(RegistryValue::Dword(dword)))
                } else {
                    anyhow::bail!("REG_DWORD data too small for value '{}'", name);
                }
            }
            winreg::enums::RegType::REG_BINARY => {
                Ok(Some(RegistryValue::Binary(value.bytes.clone())))
            }
            REG_SZ => Ok(Some(RegistryValue::Text(String::from_utf16_lossy(
                &value
                    .bytes
                    .chunks_exact(2)
                    .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
                    .collect::<Vec<u16>>(),
            )))),
            other => anyhow::bail!("Unsupported registry value type: {:?}", other),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::anyhow!("Failed to read value '{}': {}", name, e)),
    }
}

/// Parses the full registry path into hive and subkey path.
fn parse_registry_path(path: &str) -> Result<(RegKey, String)> {
    let components: Vec<&str> = path.split('\\').collect();
    if components.len() < 2 {
        anyhow::bail!(
            "Invalid registry path: '{}'. Expected format 'HKEY_*\\Subkey\\...'",
            path
        );
    }
    let hive = match components[0].to_uppercase().as_str() {
        "HKEY_LOCAL_MACHINE" => HKEY_LOCAL_MACHINE,
        "HKEY_CURRENT_USER" => HKEY_CURRENT_USER,
        "HKEY_CLASSES_ROOT" => HKEY_CLASSES_ROOT,
        "HKEY_USERS" => HKEY_USERS,
        "HKEY_CURRENT_CONFIG" => HKEY_CURRENT_CONFIG,
        other => anyhow::bail!("Unsupported registry hive: '{}'", other),
    };
    let key = components[1..].join("\\");
    Ok((RegKey::predef(hive), key))
}

fn set_registry_key_value(key: &RegKey, name: &str, value: &RegistryValue) -> Result<()> {
    match value {
        RegistryValue::Dword(v) => key
            .set_value(name, v)
            .with_context(|| format!("Failed to set DWORD value '{}' to '{}'", name, v)),
        RegistryValue::Binary(data) => key
            .set_raw_value(
                name,
                &RegValue {
                    bytes: data.clone(),
                    vtype: winreg::enums::RegType::REG_BINARY,
                },
            )
            .with_context(|| format!("Failed to set Binary value '{}' to '{:?}'", name, data)),
        RegistryValue::Text(s) => key
            .set_raw_value(
                name,
                &RegValue {
                    bytes: s.encode_utf16().flat_map(|c| c.to_le_bytes()).collect(),
                    vtype: REG_SZ,
                },
            )
            .with_context(|| format!("Failed to set String value '{}' to '{}'", name, s)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use lazy_static::lazy_static;

    use super::*;

    lazy_static! {
        static ref TEST_MUTEX: Mutex<()> = Mutex::new(());
    }

    const TEST_SUBKEY: &str = "Software\\DebloatRegistryTest";

    fn get_test_path() -> String {
        format!("HKEY_CURRENT_USER\\{}", TEST_SUBKEY)
    }

    #[test]
    fn write_read_delete_dword() {
        let _lock = TEST_MUTEX.lock().unwrap(); // Ensure tests run serially

        let store = WindowsRegistry;
        let path = get_test_path();
        let name = "TestDword";
        let value = RegistryValue::Dword(42);

        store.delete(&path, name).expect("Failed to clear value");
        store.write(&path, name, &value).expect("Failed to set DWORD value");
        assert_eq!(
            read_registry_value(&path, name).expect("Failed to read DWORD value"),
            Some(value)
        );

        store.delete(&path, name).expect("Failed to delete DWORD value");
        assert_eq!(
            read_registry_value(&path, name).expect("Failed to read deleted value"),
            None
        );
    }

    #[test]
    fn write_overwrites_existing_values() {
        let _lock = TEST_MUTEX.lock().unwrap();

        let store = WindowsRegistry;
        let path = get_test_path();
        let name = "TestOverwrite";

        store
            .write(&path, name, &RegistryValue::Dword(1))
            .expect("Failed to set initial value");
        store
            .write(&path, name, &RegistryValue::Dword(2))
            .expect("Failed to overwrite value");
        assert_eq!(
            read_registry_value(&path, name).expect("Failed to read value"),
            Some(RegistryValue::Dword(2))
        );

        store.delete(&path, name).expect("Failed to clean up");
    }

    #[test]
    fn delete_under_a_missing_path_succeeds() {
        let _lock = TEST_MUTEX.lock().unwrap();

        let store = WindowsRegistry;
        let path = "HKEY_CURRENT_USER\\Software\\DebloatRegistryTest\\DoesNotExist";
        store
            .delete(path, "Anything")
            .expect("Deleting under a missing path should succeed");
    }

    #[test]
    fn invalid_registry_paths_are_rejected() {
        let _lock = TEST_MUTEX.lock().unwrap();

        let invalid_paths = vec![
            "",
            "INVALID_HIVE\\Software",
            "HKEY_UNKNOWN\\Software",
            "HKEY_CURRENT_USER", // Missing subkey
        ];

        for path in invalid_paths {
            assert!(
                parse_registry_path(path).is_err(),
                "Path '{}' should be invalid",
                path
            );
        }
    }
}
