use std::fs;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::Category;
use crate::error::EpgError;

pub const CREDENTIAL_FILE: &str = "api_info.json";
pub const SERIES_LIST_FILE: &str = "tv_shows.json";
pub const MOVIE_LIST_FILE: &str = "movies.json";
pub const CACHE_FILE: &str = "cache.db";
pub const LOG_FILE: &str = "loop-epg.log";

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_SOURCE_INFO_NAME: &str = "loop-epg";
pub const GUIDE_WINDOW_HOURS: u32 = 48;

/// On-disk shape of `api_info.json`.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb_api_key: Option<String>,
    #[serde(default)]
    pub tmdb_base_url: Option<String>,
    #[serde(default)]
    pub slot_duration_hours: Option<u32>,
    #[serde(default)]
    pub prompt_timeout_secs: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub source_info_name: Option<String>,
    #[serde(default)]
    pub output_owner: Option<OutputOwner>,
    #[serde(default)]
    pub output_mode: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputOwner {
    pub uid: u32,
    pub gid: u32,
}

/// File locations, all relative to one base directory.
#[derive(Debug, Clone)]
pub struct Paths {
    base_dir: Utf8PathBuf,
}

impl Paths {
    pub fn new(base_dir: Utf8PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn credential_file(&self) -> Utf8PathBuf {
        self.base_dir.join(CREDENTIAL_FILE)
    }

    pub fn cache_db(&self) -> Utf8PathBuf {
        self.base_dir.join(CACHE_FILE)
    }

    pub fn log_file(&self) -> Utf8PathBuf {
        self.base_dir.join(LOG_FILE)
    }

    pub fn title_list(&self, category: Category) -> Utf8PathBuf {
        match category {
            Category::Series => self.base_dir.join(SERIES_LIST_FILE),
            Category::Movie => self.base_dir.join(MOVIE_LIST_FILE),
        }
    }

    pub fn guide(&self, category: Category) -> Utf8PathBuf {
        self.base_dir.join(category.guide_file_name())
    }
}

/// Everything a run needs, resolved once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Settings {
    pub paths: Paths,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub slot_duration_hours: u32,
    pub prompt_timeout: Duration,
    pub request_timeout: Duration,
    pub source_info_name: String,
    pub output_owner: Option<OutputOwner>,
    pub output_mode: Option<u32>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(paths: Paths) -> Result<Settings, EpgError> {
        let config_path = paths.credential_file();
        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| EpgError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| EpgError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config, paths)
    }

    pub fn resolve_config(config: Config, paths: Paths) -> Result<Settings, EpgError> {
        let tmdb_api_key = config
            .tmdb_api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| EpgError::MissingCredential(paths.credential_file()))?;

        let slot_duration_hours = config.slot_duration_hours.unwrap_or(1);
        if slot_duration_hours == 0 || slot_duration_hours > GUIDE_WINDOW_HOURS {
            return Err(EpgError::InvalidSetting(format!(
                "slot_duration_hours must be between 1 and {GUIDE_WINDOW_HOURS}, got {slot_duration_hours}"
            )));
        }

        if let Some(mode) = config.output_mode
            && mode > 0o7777
        {
            return Err(EpgError::InvalidSetting(format!(
                "output_mode {mode:o} is not a valid permission mode"
            )));
        }

        Ok(Settings {
            paths,
            tmdb_api_key,
            tmdb_base_url: config
                .tmdb_base_url
                .unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            slot_duration_hours,
            prompt_timeout: Duration::from_secs(config.prompt_timeout_secs.unwrap_or(3)),
            request_timeout: Duration::from_secs(config.request_timeout_secs.unwrap_or(30)),
            source_info_name: config
                .source_info_name
                .unwrap_or_else(|| DEFAULT_SOURCE_INFO_NAME.to_string()),
            output_owner: config.output_owner,
            output_mode: Some(config.output_mode.unwrap_or(0o775)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SeriesListFile {
    shows: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MovieListFile {
    movies: Vec<String>,
}

/// The two curated title lists.
#[derive(Debug, Clone, Default)]
pub struct TitleLists {
    pub series: Vec<String>,
    pub movies: Vec<String>,
}

impl TitleLists {
    pub fn load(paths: &Paths) -> Result<Self, EpgError> {
        let series = load_title_list(&paths.title_list(Category::Series), Category::Series)?;
        let movies = load_title_list(&paths.title_list(Category::Movie), Category::Movie)?;
        Ok(Self { series, movies })
    }

    pub fn for_category(&self, category: Category) -> &[String] {
        match category {
            Category::Series => &self.series,
            Category::Movie => &self.movies,
        }
    }
}

pub fn load_title_list(path: &Utf8Path, category: Category) -> Result<Vec<String>, EpgError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|_| EpgError::TitleListRead(path.to_path_buf()))?;
    parse_title_list(&content, category).map_err(|message| EpgError::TitleListParse {
        path: path.to_path_buf(),
        message,
    })
}

pub fn parse_title_list(content: &str, category: Category) -> Result<Vec<String>, String> {
    let names = match category {
        Category::Series => serde_json::from_str::<SeriesListFile>(content)
            .map(|file| file.shows)
            .map_err(|err| err.to_string())?,
        Category::Movie => serde_json::from_str::<MovieListFile>(content)
            .map(|file| file.movies)
            .map_err(|err| err.to_string())?,
    };
    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_series_list_trims_and_drops_blanks() {
        let names =
            parse_title_list(r#"{"shows": [" Friends ", "", "Frasier"]}"#, Category::Series)
                .unwrap();
        assert_eq!(names, vec!["Friends".to_string(), "Frasier".to_string()]);
    }

    #[test]
    fn movie_list_requires_movies_key() {
        assert!(parse_title_list(r#"{"shows": []}"#, Category::Movie).is_err());
    }
}
