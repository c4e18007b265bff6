// caseflow-ingress/src/serve.rs
// ============================================================================
// Module: Caseflow Ingress Server Bootstrap
// Description: Binds the ingress router to a TLS or plain-HTTP listener.
// Purpose: Give `caseflow-cli serve` a single entry point that starts serving
//          without embedding transport details in the CLI.
// Dependencies: axum, axum-server (tls-rustls), tokio
// ============================================================================

//! ## Overview
//! Production deployments terminate TLS at the ingress process itself, since
//! the chat-platform webhook callers reach it directly rather than through a
//! shared front door. Certificate material is loaded via
//! [`axum_server::tls_rustls::RustlsConfig::from_pem_file`], which parses the
//! PEM chain and key internally; callers only provide file paths.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while starting the ingress server.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The TLS certificate or key file could not be loaded.
    #[error("failed to load tls material: {0}")]
    TlsConfig(String),
    /// The listener could not be bound or the server exited with an error.
    #[error("server error: {0}")]
    Server(String),
}

// ============================================================================
// SECTION: Serve
// ============================================================================

/// Serves `router` over TLS on `addr` using the given certificate chain and
/// private key files, running until the process is terminated.
///
/// # Errors
///
/// Returns [`ServeError::TlsConfig`] when the certificate material fails to
/// load, or [`ServeError::Server`] when the listener fails.
pub async fn serve_tls(
    router: Router,
    addr: SocketAddr,
    cert_path: &Path,
    key_path: &Path,
) -> Result<(), ServeError> {
    let config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|err| ServeError::TlsConfig(err.to_string()))?;
    axum_server::bind_rustls(addr, config)
        .serve(router.into_make_service())
        .await
        .map_err(|err| ServeError::Server(err.to_string()))
}

/// Serves `router` over plain HTTP on `addr`, running until the process is
/// terminated. Intended for local development and system tests only; see
/// [`serve_tls`] for the production path.
///
/// # Errors
///
/// Returns [`ServeError::Server`] when the listener fails to bind or serve.
pub async fn serve_plain(router: Router, addr: SocketAddr) -> Result<(), ServeError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ServeError::Server(err.to_string()))?;
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| ServeError::Server(err.to_string()))
}
