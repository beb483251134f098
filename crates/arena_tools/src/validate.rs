//! Data validation utilities.

use std::fs;
use std::path::Path;

use arena_core::config::ArenaConfig;
use arena_core::data::ContentTables;

use crate::{Result, ToolError};

/// File names looked up in a data directory, with their loaders.
const TABLE_FILES: [(&str, fn(&mut ContentTables, &str) -> arena_core::error::Result<()>); 5] = [
    ("weapons.ron", ContentTables::load_weapons),
    ("enemies.ron", ContentTables::load_enemies),
    ("bosses.ron", ContentTables::load_bosses),
    ("structures.ron", ContentTables::load_structures),
    ("drop_tables.ron", ContentTables::load_drop_tables),
];

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every content table present in `dir`.
///
/// Missing files leave their table empty.
///
/// # Errors
///
/// Returns an error if a present file cannot be read or parsed.
pub fn load_content(dir: &Path) -> Result<ContentTables> {
    let mut content = ContentTables::default();
    for (file, load) in TABLE_FILES {
        let path = dir.join(file);
        if !path.exists() {
            tracing::warn!(file, "Table file missing, leaving it empty");
            continue;
        }
        load(&mut content, &read(&path)?)?;
        tracing::debug!(file, "Loaded table");
    }
    Ok(content)
}

/// Load `arena.ron` from `dir`, or defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_arena_config(dir: &Path) -> Result<ArenaConfig> {
    let path = dir.join("arena.ron");
    if !path.exists() {
        return Ok(ArenaConfig::default());
    }
    Ok(ArenaConfig::from_ron_str(&read(&path)?)?)
}

/// Validate all RON data files in a directory.
///
/// Every problem is logged before returning.
///
/// # Errors
///
/// Returns an error if any data file fails to load or validate.
pub fn validate_data_directory(dir: &Path) -> Result<()> {
    load_arena_config(dir)?;
    let content = load_content(dir)?;
    let problems = content.validate();
    for problem in &problems {
        tracing::error!("{problem}");
    }
    if problems.is_empty() {
        tracing::info!(
            weapons = content.weapons.len(),
            enemies = content.enemies.len(),
            bosses = content.bosses.len(),
            structures = content.structures.len(),
            drop_tables = content.drop_tables.len(),
            "Content is valid"
        );
        Ok(())
    } else {
        Err(ToolError::Invalid(problems.len()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn shipped_data() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/data")
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arena-tools-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_shipped_data_validates() {
        validate_data_directory(&shipped_data()).unwrap();
    }

    #[test]
    fn test_shipped_data_matches_fixtures() {
        let loaded = load_content(&shipped_data()).unwrap();
        let canned = arena_test_utils::fixtures::canned_content();
        assert_eq!(loaded.weapons.len(), canned.weapons.len());
        assert_eq!(loaded.drop_tables.len(), canned.drop_tables.len());
    }

    #[test]
    fn test_dangling_base_enemy_reported() {
        let dir = scratch_dir("dangling");
        fs::write(dir.join("bosses.ron"), r#"[(key: "boss_x", base_enemy: "nobody")]"#).unwrap();
        let result = validate_data_directory(&dir);
        assert!(matches!(result, Err(ToolError::Invalid(1))));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_parse_error_surfaces() {
        let dir = scratch_dir("broken");
        fs::write(dir.join("weapons.ron"), "[(key: ").unwrap();
        let result = load_content(&dir);
        assert!(matches!(result, Err(ToolError::Arena(_))));
        fs::remove_dir_all(&dir).unwrap();
    }
}
