//! Response body decoding.

use crate::errors::Result;
use serde::de::DeserializeOwned;

/// Decodes a JSON response body.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AzflowError;
    use crate::models::User;
    use crate::pipeline::Page;

    #[test]
    fn test_decode_page() {
        let body = br#"{"value": [{"id": "u1"}], "@odata.nextLink": "https://next"}"#;
        let page: Page<User> = decode(body).unwrap();
        assert_eq!(page.items[0].id, "u1");
        assert_eq!(page.cursor(), Some("https://next"));
    }

    #[test]
    fn test_decode_error() {
        let err = decode::<Page<User>>(b"<html>").unwrap_err();
        assert!(matches!(err, AzflowError::Decode(_)));
    }
}
