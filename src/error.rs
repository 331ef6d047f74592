use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EpgError {
    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse config file: {0}")]
    ConfigParse(String),

    #[error("tmdb_api_key is missing or empty in {0}")]
    #[diagnostic(help("add {{\"tmdb_api_key\": \"...\"}} to the credential file"))]
    MissingCredential(Utf8PathBuf),

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("failed to read title list at {0}")]
    TitleListRead(Utf8PathBuf),

    #[error("failed to parse title list {path}: {message}")]
    TitleListParse { path: Utf8PathBuf, message: String },

    #[error("TMDB request failed: {0}")]
    TmdbHttp(String),

    #[error("TMDB returned status {status}: {message}")]
    TmdbStatus { status: u16, message: String },

    #[error("TMDB response could not be decoded: {0}")]
    TmdbDecode(String),

    #[error("cache database error: {0}")]
    Database(String),

    #[error("failed to render XMLTV document: {0}")]
    Xml(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("console error: {0}")]
    Console(String),
}

impl EpgError {
    /// Errors that stop the run before any work is attempted.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EpgError::ConfigRead(_)
                | EpgError::ConfigParse(_)
                | EpgError::MissingCredential(_)
                | EpgError::InvalidSetting(_)
                | EpgError::TitleListRead(_)
                | EpgError::TitleListParse { .. }
        )
    }
}

impl From<rusqlite::Error> for EpgError {
    fn from(err: rusqlite::Error) -> Self {
        EpgError::Database(err.to_string())
    }
}
