//! Expression-context entry point
//!
//! Template engines call the converter as a plain function and cannot handle
//! a `Result`. [`PlaintextHelper`] is that boundary: options arrive as a
//! loose JSON-like map, failures are logged and degrade to an empty string,
//! and a panic inside a pass never unwinds into the host.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use serde_json::Value;

use crate::converter::PlaintextConverter;
use crate::error::ConversionError;
use crate::options::ConversionOptions;
use crate::security::InputLimits;

/// Callable conversion helper for template and expression contexts
///
/// ```rust
/// use plaintext_converter::helper::PlaintextHelper;
/// use serde_json::json;
///
/// let helper = PlaintextHelper::new();
/// let options = json!({ "links": "nextline", "width": 0 });
/// assert_eq!(
///     helper.convert("<a href=\"https://x.test/\">Shop</a>", Some(&options), Some("newsletter-42")),
///     "Shop\n[https://x.test/]"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlaintextHelper {
    limits: InputLimits,
    timeout: Duration,
}

impl PlaintextHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: InputLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Convert `html` to plaintext
    ///
    /// `options` is merged over the defaults; `label` only tags log events.
    /// Returns an empty string when the options are invalid or the
    /// conversion fails.
    pub fn convert(&self, html: &str, options: Option<&Value>, label: Option<&str>) -> String {
        self.try_convert(html, options, label).unwrap_or_default()
    }

    fn try_convert(
        &self,
        html: &str,
        options: Option<&Value>,
        label: Option<&str>,
    ) -> Result<String, ConversionError> {
        let options = match options {
            Some(value) => ConversionOptions::from_value(value).inspect_err(|e| {
                tracing::error!(label = label.unwrap_or_default(), error = %e, "Convert HTML to plaintext failed");
            })?,
            None => ConversionOptions::default(),
        };

        let converter = PlaintextConverter::with_options(options)
            .with_limits(self.limits)
            .with_timeout(self.timeout);

        catch_unwind(AssertUnwindSafe(|| converter.convert_labeled(html, label))).unwrap_or_else(
            |panic| {
                let message = panic_message(panic.as_ref());
                tracing::error!(label = label.unwrap_or_default(), panic = %message, "Convert HTML to plaintext failed");
                Err(ConversionError::InternalError(format!("Panic during conversion: {}", message)))
            },
        )
    }

    /// Every method of the helper may be called from an expression context
    pub fn allows_call_of_method(&self, _method_name: &str) -> bool {
        true
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
