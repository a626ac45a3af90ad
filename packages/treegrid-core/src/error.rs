use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("record not found: {entity}({id})")]
    NotFound { entity: String, id: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("record is missing attribute: {0}")]
    MissingAttribute(String),
    #[error("rendering collaborator not ready after {attempts} attempts")]
    RenderingNotReady { attempts: u32 },
    #[error("a tree build is already active for this control")]
    BuildInProgress,
}

impl Error {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}
