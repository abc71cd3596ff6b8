//! More Recipes client
//!
//! HTTP implementations of the `recipes-forms` ports, session handling and
//! the configuration used by the `recipes` command line tool.

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod telemetry;

pub use api::{ApiClient, HttpAvailabilityChecker, HttpSubmissionSink};
pub use config::ClientConfig;
pub use error::ApiError;
pub use session::{authenticate_user, logout, FileTokenStore, SessionUser};
pub use storage::HttpImageStorage;

use recipes_forms::{FormsError, TokenStoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("cannot find home directory")]
    NoHomeDir,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Forms(#[from] FormsError),

    #[error(transparent)]
    Session(#[from] TokenStoreError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
