//! Translate text with Google Translate without letting the service touch
//! markup, placeholders or format specifiers.
//!
//! ```ignore
//! use gtrans::{Config, Query};
//!
//! let config = Config::default();
//! let provider = config.google_provider()?;
//! let translated = config
//!     .pipeline()?
//!     .run(&provider, &Query::new("Hello <b>%s</b>", "en", "de"))
//!     .await?;
//! ```

pub mod cli;
pub mod config;
pub mod logging;
pub mod mt;

pub use config::Config;
pub use mt::{MachineTranslator, MtError, MtResult, Pipeline, Query};
