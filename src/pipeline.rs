use crate::config::Config;
use crate::inject::{InjectError, InjectReport, inject_file};

/// Rewrites the site's index page with the configured key.
///
/// In strict mode a missing key is reported before the document is touched.
pub fn inject_site(config: &Config) -> Result<InjectReport, InjectError> {
    if config.strict && config.api_key.is_fallback() {
        return Err(InjectError::MissingKey);
    }
    inject_file(&config.document_path(), &config.api_key)
}
