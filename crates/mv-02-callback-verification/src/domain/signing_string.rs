//! Reconstruction of the string the provider signed.

use crate::domain::envelope::CallbackEnvelope;
use crate::domain::errors::CallbackError;
use crate::domain::params::SignatureParams;

/// Build the signing string: one `name: value` line per signed header,
/// joined by `\n`, in the order the signature lists them.
///
/// # Errors
/// * `CallbackError::MalformedSignature` - a listed header is missing from
///   the request, or a pseudo-header has no corresponding parameter
pub fn build(envelope: &CallbackEnvelope, params: &SignatureParams) -> Result<String, CallbackError> {
    let mut lines = Vec::with_capacity(params.headers.len());

    for name in &params.headers {
        let value = match name.as_str() {
            "(request-target)" => format!(
                "{} {}",
                envelope.method.to_ascii_lowercase(),
                envelope.path_and_query
            ),
            "(created)" => params
                .created
                .ok_or_else(|| missing("(created)"))?
                .to_string(),
            "(expires)" => params
                .expires
                .ok_or_else(|| missing("(expires)"))?
                .to_string(),
            header => envelope.header(header).ok_or_else(|| missing(header))?,
        };
        lines.push(format!("{name}: {value}"));
    }

    Ok(lines.join("\n"))
}

fn missing(name: &str) -> CallbackError {
    CallbackError::MalformedSignature(format!("signed header {name} not present"))
}
