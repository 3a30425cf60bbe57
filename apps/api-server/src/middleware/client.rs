//! Client identity extractor used as the rate-limit key.

use std::future::{Ready, ready};
use std::net::SocketAddr;

use actix_web::{FromRequest, HttpRequest, dev::Payload};

/// How the caller's address is resolved. Registered with `App::app_data`;
/// when absent, proxy headers are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientTokenConfig {
    /// Honour `Forwarded` / `X-Forwarded-For`. Only safe behind a proxy that
    /// overwrites them.
    pub trust_proxy_headers: bool,
}

impl ClientTokenConfig {
    pub fn new(trust_proxy_headers: bool) -> Self {
        Self {
            trust_proxy_headers,
        }
    }
}

/// Identity of the caller, derived from the connection.
///
/// Keyed on the socket peer address unless [`ClientTokenConfig`] trusts proxy
/// headers. The port is dropped so that every connection from one host shares
/// a quota.
/// ```ignore
/// async fn handler(client: ClientToken) -> impl Responder {
///     format!("Hello, {}!", client.as_str())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientToken(String);

impl ClientToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_address(addr: Option<&str>) -> Self {
        let token = match addr.map(str::trim).filter(|a| !a.is_empty()) {
            Some(addr) => match addr.parse::<SocketAddr>() {
                Ok(socket) => socket.ip().to_string(),
                Err(_) => addr.to_string(),
            },
            None => "unknown".to_string(),
        };
        Self(token)
    }

    fn from_peer(peer: Option<SocketAddr>) -> Self {
        Self(
            peer.map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        )
    }
}

impl FromRequest for ClientToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let config = req
            .app_data::<ClientTokenConfig>()
            .copied()
            .unwrap_or_default();

        let token = if config.trust_proxy_headers {
            ClientToken::from_address(req.connection_info().realip_remote_addr())
        } else {
            ClientToken::from_peer(req.peer_addr())
        };
        ready(Ok(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    async fn extract(req: TestRequest) -> ClientToken {
        let (req, mut payload) = req.to_http_parts();
        ClientToken::from_request(&req, &mut payload).await.unwrap()
    }

    fn forwarded() -> TestRequest {
        TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.7, 10.0.0.1"))
            .peer_addr("10.0.0.1:40000".parse().unwrap())
    }

    #[actix_web::test]
    async fn test_forwarded_for_ignored_by_default() {
        let token = extract(forwarded()).await;
        assert_eq!(token.as_str(), "10.0.0.1");
    }

    #[actix_web::test]
    async fn test_forwarded_for_wins_when_trusted() {
        let token = extract(forwarded().app_data(ClientTokenConfig::new(true))).await;
        assert_eq!(token.as_str(), "203.0.113.7");
    }

    #[actix_web::test]
    async fn test_trusted_without_header_uses_peer() {
        let req = TestRequest::default()
            .app_data(ClientTokenConfig::new(true))
            .peer_addr("192.0.2.20:5000".parse().unwrap());
        assert_eq!(extract(req).await.as_str(), "192.0.2.20");
    }

    #[actix_web::test]
    async fn test_peer_port_is_dropped() {
        let token =
            extract(TestRequest::default().peer_addr("192.0.2.10:51234".parse().unwrap())).await;
        assert_eq!(token.as_str(), "192.0.2.10");

        let token = extract(TestRequest::default().peer_addr("[2001:db8::1]:443".parse().unwrap()))
            .await;
        assert_eq!(token.as_str(), "2001:db8::1");
    }

    #[actix_web::test]
    async fn test_unknown_without_address() {
        assert_eq!(extract(TestRequest::default()).await.as_str(), "unknown");
        assert_eq!(
            extract(TestRequest::default().app_data(ClientTokenConfig::new(true)))
                .await
                .as_str(),
            "unknown"
        );
    }
}
