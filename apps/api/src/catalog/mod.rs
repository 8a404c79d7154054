//! Passenger catalog: the seed file plus seeded synthetic passengers.
//!
//! Built once at startup and shared read-only (`Arc<Catalog>` in `AppState`).
//! Any problem with the seed file is fatal; the service never starts with a
//! partial catalog.

pub mod seed;
pub mod synthetic;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::passenger::PassengerRecord;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("seed file {path} is not a valid passenger list: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate passenger id {0} in seed data")]
    DuplicateId(u32),

    #[error("passenger {0} has no recognised music genre")]
    MissingMusic(u32),

    #[error("passenger ids overflow counting up from {0}")]
    IdOverflow(u32),
}

#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub seed_path: PathBuf,
    pub synthetic_count: usize,
    pub rng_seed: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    passengers: Vec<PassengerRecord>,
}

impl Catalog {
    /// Reads and normalizes the seed file, then appends synthetic passengers.
    pub fn load(options: &CatalogOptions) -> Result<Self, CatalogError> {
        let raw = read_seed(&options.seed_path)?;
        let seeded = seed::normalize(raw)?;
        let seeded_count = seeded.len();

        let mut passengers = seeded;
        if options.synthetic_count > 0 {
            let last_seeded = passengers.iter().map(|p| p.id).max().unwrap_or(0);
            let first_synthetic_id = last_seeded
                .checked_add(1)
                .ok_or(CatalogError::IdOverflow(last_seeded))?;
            passengers.extend(synthetic::generate(
                options.synthetic_count,
                options.rng_seed,
                first_synthetic_id,
            )?);
        }

        info!(
            "Catalog loaded: {} seeded + {} synthetic passengers (seed {})",
            seeded_count, options.synthetic_count, options.rng_seed
        );

        Ok(Self { passengers })
    }

    pub fn from_records(passengers: Vec<PassengerRecord>) -> Self {
        Self { passengers }
    }

    pub fn passengers(&self) -> &[PassengerRecord] {
        &self.passengers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PassengerRecord> {
        self.passengers.iter()
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&PassengerRecord> {
        self.passengers.iter().find(|p| p.id == id)
    }

    /// Looks a passenger up by numeric id, falling back to an exact name match.
    pub fn find(&self, key: &str) -> Option<&PassengerRecord> {
        let key = key.trim();
        match key.parse::<u32>() {
            Ok(id) => self.get(id),
            Err(_) => self.passengers.iter().find(|p| p.name == key),
        }
    }
}

fn read_seed(path: &Path) -> Result<Vec<seed::RawPassenger>, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    seed::parse_seed(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options_for(path: &Path, synthetic_count: usize) -> CatalogOptions {
        CatalogOptions {
            seed_path: path.to_path_buf(),
            synthetic_count,
            rng_seed: 42,
        }
    }

    fn write_seed(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const SEED: &str = r#"[
        {"id": 7, "name": "Noah", "music": ["Jazz"], "purpose": ["Studying Abroad"]},
        {"id": 3, "name": "Ava", "music": "Pop", "interests": ["Food"]}
    ]"#;

    #[test]
    fn test_load_appends_synthetic_after_seed_ids() {
        let file = write_seed(SEED);
        let catalog = Catalog::load(&options_for(file.path(), 10)).unwrap();

        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.passengers()[0].name, "Noah");
        let synthetic_ids: Vec<u32> = catalog.iter().skip(2).map(|p| p.id).collect();
        assert_eq!(synthetic_ids, (8..18).collect::<Vec<_>>());
    }

    #[test]
    fn test_repeated_loads_are_identical() {
        let file = write_seed(SEED);
        let first = Catalog::load(&options_for(file.path(), 30)).unwrap();
        let second = Catalog::load(&options_for(file.path(), 30)).unwrap();
        assert_eq!(first.passengers(), second.passengers());
    }

    #[test]
    fn test_missing_seed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(&options_for(&dir.path().join("people.json"), 5)).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }

    #[test]
    fn test_malformed_seed_file_is_fatal() {
        let file = write_seed("[{\"id\": 1, \"name\": ");
        let err = Catalog::load(&options_for(file.path(), 5)).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
        assert!(err.to_string().contains("not a valid passenger list"));
    }

    #[test]
    fn test_top_seed_id_leaves_no_room_for_synthetic() {
        let file = write_seed(&format!(
            r#"[{{"id": {}, "name": "Noah", "music": "Jazz"}}]"#,
            u32::MAX
        ));
        let err = Catalog::load(&options_for(file.path(), 3)).unwrap_err();
        assert!(matches!(err, CatalogError::IdOverflow(_)));

        let catalog = Catalog::load(&options_for(file.path(), 0)).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_find_by_id_or_name() {
        let file = write_seed(SEED);
        let catalog = Catalog::load(&options_for(file.path(), 0)).unwrap();
        assert_eq!(catalog.find("7").map(|p| p.name.as_str()), Some("Noah"));
        assert_eq!(catalog.find("Ava").map(|p| p.id), Some(3));
        assert!(catalog.find("999").is_none());
        assert!(catalog.find("Nobody").is_none());
    }
}
