//! Search responses and hit count extraction

use serde::Deserialize;

/// Raw HTTP response from a search endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    /// HTTP status code
    pub status_code: u16,

    /// Response body, only read for 200 responses
    pub body: Vec<u8>,
}

impl SearchResponse {
    /// Create a response
    pub fn new(status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// Whether the status code is 200 OK
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }

    /// Extract `hits.total` from the body
    pub fn total_hits(&self) -> Result<u64, serde_json::Error> {
        parse_total_hits(&self.body)
    }
}

#[derive(Deserialize)]
struct SearchBody {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    total: u64,
}

/// Parse the total hit count out of a search response body
///
/// A missing `hits.total`, or one that is not a non-negative integer, is an
/// error.
pub fn parse_total_hits(body: &[u8]) -> Result<u64, serde_json::Error> {
    let parsed: SearchBody = serde_json::from_slice(body)?;
    Ok(parsed.hits.total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_total_hits() {
        let body = br#"{"took": 3, "hits": {"total": 42, "hits": []}}"#;
        assert_eq!(parse_total_hits(body).unwrap(), 42);
    }

    #[test]
    fn test_parse_total_hits_missing_field() {
        assert!(parse_total_hits(br#"{"hits": {}}"#).is_err());
        assert!(parse_total_hits(br#"{"took": 1}"#).is_err());
    }

    #[test]
    fn test_parse_total_hits_type_mismatch() {
        let body = br#"{"hits": {"total": {"value": 10, "relation": "eq"}}}"#;
        assert!(parse_total_hits(body).is_err());
        assert!(parse_total_hits(br#"{"hits": {"total": "10"}}"#).is_err());
    }

    #[test]
    fn test_parse_total_hits_not_json() {
        assert!(parse_total_hits(b"<html>oops</html>").is_err());
    }

    #[test]
    fn test_response_is_ok() {
        assert!(SearchResponse::new(200, Vec::new()).is_ok());
        assert!(!SearchResponse::new(404, Vec::new()).is_ok());
    }
}
