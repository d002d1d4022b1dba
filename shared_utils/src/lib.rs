//! Small helpers shared by the sync engine and the API client.
//!
//! Currently this is limited to environment-variable access with typed
//! errors, used for credential indirection and runtime configuration.

pub mod env;

pub use env::{MissingEnvVarError, get_env_var, get_env_var_or};
