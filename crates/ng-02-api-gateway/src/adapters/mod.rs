//! Adapters: the secret file, the upstream HTTP proxy and the settings files.

pub mod reverse_proxy;
pub mod settings;
pub mod token;

pub use reverse_proxy::ReverseProxy;
pub use settings::{DefaultSettingsCatalog, FileSettingsStore};
pub use token::FileTokenProvider;
