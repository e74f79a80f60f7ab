//! Machine Translation Module
//!
//! Sends text to a machine translation service while keeping the parts that
//! must not be translated (markup, placeholders, format specifiers, qualified
//! name prefixes) out of the service's reach.
//!
//! # Overview
//!
//! 1. **Island Detector** - Delimits non-translatable spans with ordered pattern passes
//! 2. **Island Extractor** - Collects the delimited spans in order
//! 3. **Masker** - Replaces each span with a marker token
//! 4. **MT Trait & Providers** - Generic trait with Google Translate and mock implementations
//! 5. **Restorer** - Puts the spans back into the translated text
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gtrans::mt::{CommandTokenProvider, GoogleTranslateProvider, Pipeline, Query};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::new(Arc::new(CommandTokenProvider::gcloud()))?;
//!     let query = Query::new("Hello <b>%s</b>!", "en", "fr");
//!     let translated = Pipeline::default().run(&provider, &query).await?;
//!     println!("{}", translated); // "Bonjour <b>%s</b> !"
//!     Ok(())
//! }
//! ```

pub mod anchor;
pub mod credentials;
pub mod error;
pub mod google_translate;
pub mod islands;
pub mod masking;
pub mod mock;
pub mod pipeline;
pub mod translator;


pub use anchor::{
    ANCHOR_PREFIX, AnchorToken, generate_anchor_tokens, mask_with_anchors, restore_from_anchors,
};
pub use credentials::{CommandTokenProvider, CredentialProvider, StaticTokenProvider};
pub use error::{MtError, MtResult};
pub use google_translate::GoogleTranslateProvider;
pub use islands::{
    DelimitedText, Delimiters, Island, IslandDetector, PatternClass, Segment, extract_islands,
};
pub use masking::{DEFAULT_MARKER, MAX_MARKER_ATTEMPTS, MarkerStrategy, MaskedText, mask, restore};
pub use mock::{MockMode, MockTranslator};
pub use pipeline::{Pipeline, Query};
pub use translator::MachineTranslator;
