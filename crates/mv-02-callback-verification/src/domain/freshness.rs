//! Replay window checks on `Date`, `(created)` and `(expires)`.

use crate::domain::envelope::CallbackEnvelope;
use crate::domain::errors::CallbackError;
use crate::domain::params::SignatureParams;
use chrono::DateTime;

/// Reject requests whose signed timestamps fall outside the window.
///
/// Only signed values are checked; an unsigned `Date` header could be
/// rewritten by anyone and proves nothing.
///
/// # Arguments
/// * `now` - current time, seconds since the Unix epoch
/// * `max_skew_secs` - tolerated clock difference either side of `now`
pub fn check_freshness(
    envelope: &CallbackEnvelope,
    params: &SignatureParams,
    now: i64,
    max_skew_secs: i64,
) -> Result<(), CallbackError> {
    let stale = || CallbackError::StaleRequest {
        skew_secs: max_skew_secs,
    };

    if params.signs("date") {
        let raw = envelope
            .header("date")
            .ok_or_else(|| CallbackError::MalformedSignature("date not present".to_string()))?;
        let sent = DateTime::parse_from_rfc2822(raw.trim())
            .map_err(|_| CallbackError::MalformedSignature("unparsable date".to_string()))?
            .timestamp();
        if (now - sent).abs() > max_skew_secs {
            return Err(stale());
        }
    }

    if let Some(created) = params.created {
        if created > now + max_skew_secs {
            return Err(stale());
        }
    }

    if let Some(expires) = params.expires {
        if expires < now {
            return Err(stale());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000; // Tue, 14 Nov 2023 22:13:20 GMT

    fn params(headers: &[&str], created: Option<i64>, expires: Option<i64>) -> SignatureParams {
        SignatureParams {
            key_id: "k1".into(),
            algorithm: None,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            signature: vec![1],
            created,
            expires,
        }
    }

    fn dated(date: &str) -> CallbackEnvelope {
        CallbackEnvelope::new("POST", "/callback").with_header("Date", date)
    }

    #[test]
    fn test_date_within_window() {
        let envelope = dated("Tue, 14 Nov 2023 22:15:00 GMT");
        assert!(check_freshness(&envelope, &params(&["date"], None, None), NOW, 300).is_ok());
    }

    #[test]
    fn test_old_date_rejected() {
        let envelope = dated("Tue, 14 Nov 2023 21:00:00 GMT");
        assert_eq!(
            check_freshness(&envelope, &params(&["date"], None, None), NOW, 300),
            Err(CallbackError::StaleRequest { skew_secs: 300 })
        );
    }

    #[test]
    fn test_unsigned_date_ignored() {
        let envelope = dated("Mon, 01 Jan 2001 00:00:00 GMT");
        assert!(check_freshness(&envelope, &params(&["host"], None, None), NOW, 300).is_ok());
    }

    #[test]
    fn test_unparsable_date_malformed() {
        let envelope = dated("yesterday");
        assert!(matches!(
            check_freshness(&envelope, &params(&["date"], None, None), NOW, 300),
            Err(CallbackError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_created_and_expires() {
        let envelope = CallbackEnvelope::new("POST", "/callback");
        assert!(check_freshness(&envelope, &params(&[], Some(NOW - 10), Some(NOW + 60)), NOW, 300).is_ok());
        assert!(check_freshness(&envelope, &params(&[], Some(NOW + 3600), None), NOW, 300).is_err());
        assert!(check_freshness(&envelope, &params(&[], None, Some(NOW - 1)), NOW, 300).is_err());
    }
}
