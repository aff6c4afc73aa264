//! Server configuration, read from flags with environment fallbacks.

use clap::Parser;

use crate::config::{
    auth::AuthConfig,
    db::DatabaseConfig,
    server::ServerRuntimeConfig,
    telemetry::{LoggingConfig, TelemetryConfig},
};

pub(crate) mod auth;
pub(crate) mod db;
pub(crate) mod server;
pub(crate) mod telemetry;

/// Rigforge JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "rigforge-json", about = "Rigforge JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Trace export settings.
    #[command(flatten)]
    pub telemetry: TelemetryConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Bearer token settings.
    #[command(flatten)]
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from CLI flags, the environment and an optional `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error when a required value is missing or does not parse.
    pub fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
