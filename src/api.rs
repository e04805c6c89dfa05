// API client module: a small blocking HTTP session that talks to the
// gophermart accrual service. Each remote operation is one method that
// returns the raw `Reply`. Status codes are reported to the caller and
// never checked here, so a 401 or 500 is an `Ok` value.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;
use tracing::debug;

pub const REGISTER_PATH: &str = "/api/user/register";
pub const LOGIN_PATH: &str = "/api/user/login";
pub const ORDERS_PATH: &str = "/api/user/orders";
pub const BALANCE_PATH: &str = "/api/user/balance";
pub const WITHDRAW_PATH: &str = "/api/user/balance/withdraw";
pub const WITHDRAWALS_PATH: &str = "/api/user/withdrawals";

/// Blocking API client. One `Client` is shared by every call, so the
/// connection pool and the cookie jar live for the whole run.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// Body of the register and login requests.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Body of the withdrawal request.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WithdrawRequest {
    pub order: String,
    pub sum: f64,
}

/// Opaque credential captured from the login response. The header
/// bytes are kept as received and sent back unchanged; the default value
/// is the empty token sent before (or without) a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(HeaderValue);

impl Token {
    pub fn new(value: HeaderValue) -> Self {
        Token(value)
    }

    pub fn from_static(value: &'static str) -> Self {
        Token(HeaderValue::from_static(value))
    }

    /// Read the `Authorization` header of a response. Only a missing
    /// header yields the empty token.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(AUTHORIZATION)
            .cloned()
            .map(Token)
            .unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn header_value(&self) -> HeaderValue {
        self.0.clone()
    }
}

impl Default for Token {
    fn default() -> Self {
        Token(HeaderValue::from_static(""))
    }
}

// Latin-1, so every header byte maps to exactly one char.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0
            .as_bytes()
            .iter()
            .try_for_each(|&b| fmt::Write::write_char(f, char::from(b)))
    }
}

/// What the service answered: the status code and, for calls that
/// report it, the response body as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Option<String>,
}

impl Reply {
    fn status_only(res: Response) -> Self {
        Reply {
            status: res.status(),
            body: None,
        }
    }

    fn with_body(res: Response) -> Result<Self> {
        let status = res.status();
        let body = res.text().context("Failed to read response body")?;
        Ok(Reply {
            status,
            body: Some(body),
        })
    }
}

/// Login reply together with the token taken from its headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReply {
    pub reply: Reply,
    pub token: Token,
}

/// The service calls made by the driver. `ApiClient` is the HTTP
/// implementation; tests plug in their own to inject failures.
pub trait AccrualApi {
    /// Where the service lives, for logging.
    fn base_url(&self) -> &str;
    fn register(&self, credentials: &Credentials) -> Result<Reply>;
    fn login(&self, credentials: &Credentials) -> Result<LoginReply>;
    fn add_order(&self, token: &Token, number: &str) -> Result<Reply>;
    fn orders(&self, token: &Token) -> Result<Reply>;
    fn balance(&self, token: &Token) -> Result<Reply>;
    fn withdraw(&self, token: &Token, request: &WithdrawRequest) -> Result<Reply>;
    fn withdrawals(&self, token: &Token) -> Result<Reply>;
}

impl ApiClient {
    /// Build a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Attach the token as the `Authorization` header. An empty token is
    /// still sent as an empty header.
    fn authorized(&self, req: RequestBuilder, token: &Token) -> RequestBuilder {
        req.header(AUTHORIZATION, token.header_value())
    }
}

impl AccrualApi for ApiClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST the credentials to the registration endpoint.
    fn register(&self, credentials: &Credentials) -> Result<Reply> {
        let url = self.url(REGISTER_PATH);
        debug!(%url, "sending register request");
        let res = self
            .client
            .post(&url)
            .json(credentials)
            .send()
            .context("Failed to send register request")?;
        Ok(Reply::status_only(res))
    }

    /// POST the credentials to the login endpoint and capture the
    /// `Authorization` response header, whatever the status code.
    fn login(&self, credentials: &Credentials) -> Result<LoginReply> {
        let url = self.url(LOGIN_PATH);
        debug!(%url, "sending login request");
        let res = self
            .client
            .post(&url)
            .json(credentials)
            .send()
            .context("Failed to send login request")?;
        let token = Token::from_headers(res.headers());
        Ok(LoginReply {
            reply: Reply::status_only(res),
            token,
        })
    }

    /// POST an order number as a raw text body.
    fn add_order(&self, token: &Token, number: &str) -> Result<Reply> {
        let url = self.url(ORDERS_PATH);
        debug!(%url, number, "sending add order request");
        let req = self.authorized(self.client.post(&url), token);
        let res = req
            .body(number.to_string())
            .send()
            .context("Failed to send add order request")?;
        Ok(Reply::status_only(res))
    }

    /// GET the user's orders.
    fn orders(&self, token: &Token) -> Result<Reply> {
        let url = self.url(ORDERS_PATH);
        debug!(%url, "sending get orders request");
        let res = self
            .authorized(self.client.get(&url), token)
            .send()
            .context("Failed to send get orders request")?;
        Reply::with_body(res)
    }

    /// GET the user's balance.
    fn balance(&self, token: &Token) -> Result<Reply> {
        let url = self.url(BALANCE_PATH);
        debug!(%url, "sending get balance request");
        let res = self
            .authorized(self.client.get(&url), token)
            .send()
            .context("Failed to send get balance request")?;
        Reply::with_body(res)
    }

    /// POST a withdrawal request as JSON.
    fn withdraw(&self, token: &Token, request: &WithdrawRequest) -> Result<Reply> {
        let url = self.url(WITHDRAW_PATH);
        debug!(%url, order = %request.order, sum = request.sum, "sending withdraw request");
        let res = self
            .authorized(self.client.post(&url), token)
            .json(request)
            .send()
            .context("Failed to send withdraw request")?;
        Reply::with_body(res)
    }

    /// GET the user's withdrawals.
    fn withdrawals(&self, token: &Token) -> Result<Reply> {
        let url = self.url(WITHDRAWALS_PATH);
        debug!(%url, "sending get withdrawals request");
        let res = self
            .authorized(self.client.get(&url), token)
            .send()
            .context("Failed to send get withdrawals request")?;
        Reply::with_body(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_read_from_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("tok123"));
        assert_eq!(Token::from_headers(&headers), Token::from_static("tok123"));
    }

    #[test]
    fn missing_header_gives_empty_token() {
        let token = Token::from_headers(&HeaderMap::new());
        assert!(token.is_empty());
        assert_eq!(token, Token::default());
        assert_eq!(token.to_string(), "");
    }

    #[test]
    fn opaque_header_bytes_are_kept_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer t\xe9k").unwrap());

        let token = Token::from_headers(&headers);

        assert!(!token.is_empty());
        assert_eq!(token.as_bytes(), b"Bearer t\xe9k");
        assert_eq!(token.header_value().as_bytes(), b"Bearer t\xe9k");
        assert_eq!(token.to_string(), "Bearer t\u{e9}k");
    }

    #[test]
    fn empty_token_is_sent_as_empty_header() {
        assert_eq!(Token::default().header_value().as_bytes(), b"");
    }

    #[test]
    fn url_joins_base_and_path() {
        let api = ApiClient::new("http://localhost:8080/").unwrap();
        assert_eq!(api.url(LOGIN_PATH), "http://localhost:8080/api/user/login");
        assert_eq!(api.base_url(), "http://localhost:8080/");
    }

    #[test]
    fn withdraw_request_serializes_order_and_sum() {
        let req = WithdrawRequest {
            order: "2377225624".into(),
            sum: 100.1,
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"order":"2377225624","sum":100.1}"#
        );
    }
}
