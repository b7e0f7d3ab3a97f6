//! Audit records for handled requests.
//!
//! Each record is emitted as an `info!` event on the [`AUDIT_TARGET`] target and reaches
//! both the console and the log file through the subscriber built in [`crate::logging`].

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use tracing::info;

pub const AUDIT_TARGET: &str = "dirshare::audit";

/// Kind of action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    ListFolder,
    DownloadFile,
    UploadFile,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ListFolder => "List folder contents",
            AuditAction::DownloadFile => "Download file",
            AuditAction::UploadFile => "Upload file",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit line: `IP: <addr> - Action: <action>[ - Path: <path>]`.
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub client: &'a str,
    pub action: AuditAction,
    pub path: Option<&'a str>,
}

impl fmt::Display for AuditEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IP: {} - Action: {}", self.client, self.action)?;
        match self.path {
            Some(path) if !path.is_empty() => write!(f, " - Path: {}", path),
            _ => Ok(()),
        }
    }
}

/// Record a handled action.
pub fn record(client: &ClientAddr, action: AuditAction, path: Option<&str>) {
    let entry = AuditEntry {
        client: client.as_str(),
        action,
        path,
    };
    info!(target: AUDIT_TARGET, "{}", entry);
}

/// Address of the peer that sent the request.
///
/// Falls back to `unknown` when the server was not started with connect info,
/// which is the case when the router is driven in-process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(String);

impl ClientAddr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<SocketAddr> for ClientAddr {
    fn from(addr: SocketAddr) -> Self {
        Self(addr.ip().to_string())
    }
}

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| ClientAddr::from(*addr))
            .unwrap_or_else(|| ClientAddr("unknown".to_string())))
    }
}
