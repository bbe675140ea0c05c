use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::fmt;
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Bad credentials (vendor error code `502`)
    LoginError,
    /// Any other non-empty vendor error code
    ApiError(String),
    /// Non-200 HTTP status, carrying the status text
    HttpError(String),
    /// Date string passed to a plant energy query has no recognized shape
    DateFormatError(String),
    /// Malformed JSON or missing envelope fields
    DecodeError(String),
    /// Request could not be sent or the body could not be read
    TransportError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LoginError => write!(f, "API error: login failed"),
            Error::ApiError(code) => write!(f, "API error {}", code),
            Error::HttpError(status) => write!(f, "API HTTP error: {}", status),
            Error::DateFormatError(date) => write!(f, "could not parse timespan {:?}", date),
            Error::DecodeError(msg) => write!(f, "could not decode API response: {}", msg),
            Error::TransportError(msg) => write!(f, "request failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::TransportError(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::DecodeError(e.to_string())
    }
}

fn html(status: Status, error: String) -> response::Result<'static> {
    Response::build()
        .status(status)
        .sized_body(error.len(), Cursor::new(error))
        .header(ContentType::new("text", "html"))
        .ok()
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        match self {
            Error::LoginError => html(
                Status::Forbidden,
                format!("<html><body><h3>403 Forbidden</h3>Error while authenticating to downstream API: <code>{}</code></body></html>", self),
            ),
            Error::HttpError(_) | Error::TransportError(_) => html(
                Status::BadGateway,
                format!("<html><body><h3>502 Bad Gateway</h3>Downstream API unavailable: <code>{}</code></body></html>", self),
            ),
            _ => html(
                Status::InternalServerError,
                format!("<html><body><h3>Unknown exception</h3><code>{:?}</code></body></html>", self),
            ),
        }
    }
}
