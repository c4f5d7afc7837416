use crate::{UrlError, UrlResult};
use url::Url;

/// Placeholder replaced by the candidate identifier
pub const ID_PLACEHOLDER: &str = "{id}";

/// A profile URL template such as `https://host/profile/?id={id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTemplate {
    template: String,
}

impl TargetTemplate {
    /// Validates a template
    ///
    /// The template must contain `{id}` and, once an identifier is substituted, parse as an
    /// http or https URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use firm_harvest::url::TargetTemplate;
    ///
    /// let template = TargetTemplate::new("https://example.com/firm/?id={id}").unwrap();
    /// assert_eq!(template.build(42).unwrap().as_str(), "https://example.com/firm/?id=42");
    /// ```
    pub fn new(template: &str) -> UrlResult<Self> {
        if !template.contains(ID_PLACEHOLDER) {
            return Err(UrlError::MissingPlaceholder(template.to_string()));
        }

        let template = Self {
            template: template.to_string(),
        };

        let probe = template.build(0)?;
        if probe.scheme() != "http" && probe.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                probe.scheme()
            )));
        }

        Ok(template)
    }

    /// Builds the URL for one identifier
    pub fn build(&self, id: u64) -> UrlResult<Url> {
        let raw = self.template.replace(ID_PLACEHOLDER, &id.to_string());
        Url::parse(&raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}
