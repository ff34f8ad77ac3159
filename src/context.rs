use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::models::{FieldAliases, SiteTag};
use crate::offers::SiteStyle;
use crate::opt::*;
use crate::suggest::{RankerOptions, MAX_SUGGESTIONS};

const APP_NAME: &str = "card-offers";
const APP_AUTHOR: &str = "dineout";
const APP_QUALIFIER: &str = "com";

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_PATH_ENV: &str = "CARD_OFFERS_CONFIG";
const DATA_DIR_ENV: &str = "CARD_OFFERS_DATA";
const DEFAULT_DATA_DIR: &str = "./public";

const SWIGGY_LOGO: &str = "https://restaurantindia.s3.ap-south-1.amazonaws.com/s3fs-public/2020-02/Swiggy.jpg";
const ZOMATO_LOGO: &str = "https://c.ndtvimg.com/2024-06/mr51ho8o_zomato-logo-stock-image_625x300_03_June_24.jpg?im=FeatureCrop,algorithm=dnn,width=545,height=307";
const EAZYDINER_LOGO: &str = "https://pbs.twimg.com/profile_images/1559453938390294530/zvZbaruY_400x400.jpg";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub site: SiteTag,
    pub file: String,
    #[serde(default = "variant_note_default")]
    pub variant_note: bool,
    #[serde(default)]
    pub fallback_image: Option<String>,
}

fn variant_note_default() -> bool {
    true
}

impl SourceConfig {
    fn new(site: SiteTag, file: &str, fallback_image: Option<&str>) -> Self {
        SourceConfig {
            site,
            file: file.to_string(),
            variant_note: true,
            fallback_image: fallback_image.map(str::to_string),
        }
    }

    pub fn style(&self) -> SiteStyle {
        SiteStyle {
            variant_note: self.variant_note,
            fallback_image: self.fallback_image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
    pub reference_file: String,
    pub sources: Vec<SourceConfig>,
    pub aliases: FieldAliases,
    pub max_suggestions: usize,
    pub synthesize_unmatched: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: None,
            reference_file: "allCards.csv".to_string(),
            sources: vec![
                SourceConfig::new(SiteTag::Permanent, "permanent.csv", None),
                SourceConfig::new(SiteTag::Swiggy, "Swiggy.csv", Some(SWIGGY_LOGO)),
                SourceConfig::new(SiteTag::Zomato, "Zomato.csv", Some(ZOMATO_LOGO)),
                SourceConfig::new(SiteTag::EazyDiner, "Eazydiner.csv", Some(EAZYDINER_LOGO)),
            ],
            aliases: FieldAliases::default(),
            max_suggestions: MAX_SUGGESTIONS,
            synthesize_unmatched: false,
        }
    }
}

impl AppConfig {
    pub fn ranker_options(&self) -> RankerOptions {
        RankerOptions {
            limit: self.max_suggestions,
            synthesize_unmatched: self.synthesize_unmatched,
        }
    }

    pub fn source(&self, site: SiteTag) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.site == site)
    }

    pub fn style(&self, site: SiteTag) -> SiteStyle {
        self.source(site).map(SourceConfig::style).unwrap_or_default()
    }

    /// Each site may back at most one offer table.
    pub fn validate(&self) -> Res<()> {
        match self.sources.iter().map(|s| s.site).duplicates().next() {
            Some(site) => Err(format!("Site {} is configured more than once", site)),
            None => Ok(()),
        }
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        project_dirs()
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .filter(|dir| dir.exists())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_AUTHOR, APP_NAME)
}

pub fn config_path() -> Option<PathBuf> {
    env::var(CONFIG_PATH_ENV)
        .ok()
        .map(PathBuf::from)
        .or_else(|| project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME)))
}

pub fn load_config() -> Res<AppConfig> {
    match config_path() {
        Some(path) => load_config_from_file(&path),
        None => Ok(AppConfig::default()),
    }
}

/// Defaults when the file does not exist; missing keys take their defaults.
pub fn load_config_from_file(path: &Path) -> Res<AppConfig> {
    if !path.exists() {
        log_if(
            &format!("No config at {:?}, using defaults", path),
            DbgFlg::Load,
        );
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(path).err_to_str()?;
    let config: AppConfig =
        serde_json::from_str(&contents).map_err(|err| format!("Invalid config {:?}: {}", path, err))?;
    config
        .validate()
        .map_err(|err| format!("Invalid config {:?}: {}", path, err))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create a temp dir");
        let config = load_config_from_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.sources[0].site, SiteTag::Permanent);
        assert!(!config.synthesize_unmatched);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().expect("Failed to create a temp file");
        write!(
            file,
            r#"{{
                "data_dir": "/srv/offers",
                "synthesize_unmatched": true,
                "sources": [{{ "site": "Zomato", "file": "zomato_v2.csv" }}],
                "aliases": {{ "credit": ["Cards"] }}
            }}"#
        )
        .unwrap();

        let config = load_config_from_file(file.path()).unwrap();
        assert_eq!(config.resolve_data_dir(), PathBuf::from("/srv/offers"));
        assert!(config.ranker_options().synthesize_unmatched);
        assert_eq!(config.max_suggestions, MAX_SUGGESTIONS);
        assert_eq!(config.sources.len(), 1);
        assert!(config.style(SiteTag::Zomato).variant_note);
        assert_eq!(config.style(SiteTag::Swiggy), SiteStyle::default());
        assert_eq!(config.aliases.credit, vec!["Cards"]);
        assert_eq!(config.aliases.debit, FieldAliases::default().debit);
    }

    #[test]
    fn test_duplicate_site_is_an_error() {
        let mut file = NamedTempFile::new().expect("Failed to create a temp file");
        write!(
            file,
            r#"{{ "sources": [
                {{ "site": "Swiggy", "file": "a.csv" }},
                {{ "site": "Zomato", "file": "b.csv" }},
                {{ "site": "Swiggy", "file": "c.csv" }}
            ] }}"#
        )
        .unwrap();

        let err = load_config_from_file(file.path()).unwrap_err();
        assert!(err.contains("Site Swiggy is configured more than once"));
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = NamedTempFile::new().expect("Failed to create a temp file");
        write!(file, "{{ not json").unwrap();
        assert!(load_config_from_file(file.path()).is_err());
    }
}
