use axum::{
    extract::{FromRequest, Request},
    http::{StatusCode, header::HeaderMap},
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Shared webhook secret for HMAC verification
#[derive(Clone)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    pub fn new(secret: String) -> Self {
        Self(secret)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// Verified webhook payload extractor
///
/// Validates the HMAC-SHA256 signature GitHub sends in the
/// `X-Hub-Signature-256` header against the raw request body before any
/// parsing happens. Handlers receiving a `VerifiedWebhook` can trust the
/// bytes came from the configured webhook.
#[derive(Debug)]
pub struct VerifiedWebhook(pub Vec<u8>);

impl<S> FromRequest<S> for VerifiedWebhook
where
    S: Send + Sync,
    WebhookSecret: axum::extract::FromRef<S>,
{
    type Rejection = WebhookRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let secret = <WebhookSecret as axum::extract::FromRef<S>>::from_ref(state);
        let (parts, body) = req.into_parts();

        let signature = signature_from_headers(&parts.headers)?;

        let body_bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| WebhookRejection::BodyRead(e.to_string()))?
            .to_vec();

        verify_signature(&body_bytes, &signature, secret.expose())?;

        Ok(VerifiedWebhook(body_bytes))
    }
}

/// Decode the `sha256=<hex>` signature header into raw bytes
fn signature_from_headers(headers: &HeaderMap) -> Result<Vec<u8>, WebhookRejection> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .ok_or_else(|| WebhookRejection::MissingHeader(SIGNATURE_HEADER.to_string()))?
        .to_str()
        .map_err(|e| WebhookRejection::MalformedSignature(format!("header encoding: {}", e)))?;

    let hex_digest = header.strip_prefix("sha256=").ok_or_else(|| {
        WebhookRejection::MalformedSignature("expected 'sha256=' prefix".to_string())
    })?;

    hex::decode(hex_digest)
        .map_err(|e| WebhookRejection::MalformedSignature(format!("hex decoding: {}", e)))
}

/// Verify HMAC-SHA256 over the raw body using constant-time comparison
fn verify_signature(body: &[u8], signature: &[u8], secret: &str) -> Result<(), WebhookRejection> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| WebhookRejection::Hmac(e.to_string()))?;

    mac.update(body);
    let expected = mac.finalize().into_bytes();

    // Constant-time comparison to prevent timing attacks
    if expected.ct_eq(signature).into() {
        Ok(())
    } else {
        Err(WebhookRejection::SignatureMismatch)
    }
}

/// Webhook verification rejection
#[derive(Debug)]
pub enum WebhookRejection {
    MissingHeader(String),
    MalformedSignature(String),
    Hmac(String),
    SignatureMismatch,
    BodyRead(String),
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebhookRejection::MissingHeader(header) => {
                (StatusCode::BAD_REQUEST, format!("missing header: {}", header))
            }
            WebhookRejection::MalformedSignature(msg) => {
                (StatusCode::BAD_REQUEST, format!("malformed signature: {}", msg))
            }
            WebhookRejection::Hmac(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("hmac failure: {}", msg),
            ),
            WebhookRejection::SignatureMismatch => {
                (StatusCode::UNAUTHORIZED, "signature mismatch".to_string())
            }
            WebhookRejection::BodyRead(msg) => {
                (StatusCode::BAD_REQUEST, format!("body read failed: {}", msg))
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};

    fn compute_signature(body: &[u8], secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn secret() -> WebhookSecret {
        WebhookSecret::new("test-secret".to_string())
    }

    #[tokio::test]
    async fn test_valid_signature() {
        let body = b"test body";
        let signature = compute_signature(body, "test-secret");

        let req = Request::builder()
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.to_vec()))
            .unwrap();

        let verified = VerifiedWebhook::from_request(req, &secret())
            .await
            .expect("verification should succeed");
        assert_eq!(verified.0, body);
    }

    #[tokio::test]
    async fn test_wrong_signature_rejected() {
        let body = b"test body";
        let wrong =
            "sha256=0000000000000000000000000000000000000000000000000000000000000000";

        let req = Request::builder()
            .header(SIGNATURE_HEADER, wrong)
            .body(Body::from(body.to_vec()))
            .unwrap();

        let err = VerifiedWebhook::from_request(req, &secret())
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookRejection::SignatureMismatch));
    }

    #[tokio::test]
    async fn test_signature_for_other_secret_rejected() {
        let body = b"test body";
        let signature = compute_signature(body, "other-secret");

        let req = Request::builder()
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.to_vec()))
            .unwrap();

        let err = VerifiedWebhook::from_request(req, &secret())
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookRejection::SignatureMismatch));
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let req = Request::builder()
            .body(Body::from(b"test body".to_vec()))
            .unwrap();

        let err = VerifiedWebhook::from_request(req, &secret())
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookRejection::MissingHeader(_)));
    }

    #[tokio::test]
    async fn test_prefixless_signature_rejected() {
        let req = Request::builder()
            .header(SIGNATURE_HEADER, "0123456789abcdef")
            .body(Body::from(b"test body".to_vec()))
            .unwrap();

        let err = VerifiedWebhook::from_request(req, &secret())
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookRejection::MalformedSignature(_)));
    }

    #[tokio::test]
    async fn test_non_hex_signature_rejected() {
        let req = Request::builder()
            .header(SIGNATURE_HEADER, "sha256=not-hex-at-all")
            .body(Body::from(b"test body".to_vec()))
            .unwrap();

        let err = VerifiedWebhook::from_request(req, &secret())
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookRejection::MalformedSignature(_)));
    }

    #[tokio::test]
    async fn test_empty_body_verifies() {
        let body = b"";
        let signature = compute_signature(body, "test-secret");

        let req = Request::builder()
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.to_vec()))
            .unwrap();

        let verified = VerifiedWebhook::from_request(req, &secret())
            .await
            .expect("verification should succeed");
        assert_eq!(verified.0, body);
    }
}
