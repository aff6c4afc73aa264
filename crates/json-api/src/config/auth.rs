//! Auth Config

use clap::Args;
use rigforge_app::auth::{JwtConfig, TokenError};

/// Bearer token settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens (at least 32 characters)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Token lifetime in minutes
    #[arg(long, env = "JWT_TTL_MINUTES", default_value_t = 1440_i64)]
    pub jwt_ttl_minutes: i64,

    /// Token issuer claim
    #[arg(long, env = "JWT_ISSUER", default_value = "rigforge")]
    pub jwt_issuer: String,
}

impl AuthConfig {
    /// Validate the settings into token signing configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the secret is too short or the lifetime is not positive.
    pub fn jwt_config(&self) -> Result<JwtConfig, TokenError> {
        JwtConfig::new(
            self.jwt_secret.clone(),
            self.jwt_ttl_minutes,
            self.jwt_issuer.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, ttl: i64) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            jwt_ttl_minutes: ttl,
            jwt_issuer: "rigforge".to_string(),
        }
    }

    #[test]
    fn short_secret_is_rejected() {
        let result = config("too-short", 60).jwt_config();

        assert!(
            matches!(result, Err(TokenError::WeakSecret)),
            "expected WeakSecret, got {result:?}"
        );
    }

    #[test]
    fn valid_settings_build_jwt_config() {
        let result = config("0123456789abcdef0123456789abcdef", 60).jwt_config();

        assert!(result.is_ok(), "expected valid config, got {result:?}");
    }
}
