pub mod auth;
pub mod config;
pub mod http;
pub mod metrics;
pub mod pipeline;
pub mod resolver;
pub mod submitter;
pub mod testing;

pub use auth::{AuthError, Credential, CredentialCache};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, MagnetSelection,
    SanitizedConfig,
};
pub use http::{HttpTransport, ReqwestTransport, TransportError};
pub use pipeline::{Outcome, Pipeline};
pub use resolver::{MagnetUri, NotFoundError, Resolver};
pub use submitter::{SubmitError, Submitter};
