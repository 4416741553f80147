// crates/pythia-test-config/src/settings.rs
// ============================================================================
// Module: Setting Keys
// Description: Recognized credential keys and fixed service constants.
// Purpose: Give every lookup a typed key instead of a free-form string.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Integration tests read a small, closed set of settings. Current secrets
//! files carry `BASE_SERVICE_URL`, `APP_ID`, and `APP_KEY`; older suites used
//! the legacy account/API key names, which are still recognized.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Property naming the secrets document partition to select.
pub const ENVIRONMENT_PROPERTY: &str = "environment";

/// Service URL used when no base URL is configured.
pub const DEFAULT_PYTHIA_SERVICE_URL: &str = "https://api.virgilsecurity.com/pythia/v1";

/// Path appended to a configured base URL.
pub const PYTHIA_SERVICE_PATH: &str = "/pythia/v1";

/// Number of hex characters kept from the public key digest.
pub const PUBLIC_KEY_ID_HEX_LEN: usize = 32;

// ============================================================================
// SECTION: Setting Keys
// ============================================================================

/// Settings recognized by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    /// Base URL of the Virgil service, without the Pythia path.
    BaseServiceUrl,
    /// Application identifier.
    AppId,
    /// Base64 application private key.
    AppKey,
    /// Full Pythia service URL (legacy).
    PythiaServiceUrl,
    /// Account identifier (legacy).
    AccountId,
    /// Base64 API private key (legacy).
    ApiPrivateKey,
    /// Base64 API public key (legacy).
    ApiPublicKey,
    /// API public key identifier (legacy).
    ApiPublicKeyId,
    /// Pythia proof key (legacy).
    ProofKey,
}

impl SettingKey {
    /// Every recognized key, current keys first.
    pub const ALL: [Self; 9] = [
        Self::BaseServiceUrl,
        Self::AppId,
        Self::AppKey,
        Self::PythiaServiceUrl,
        Self::AccountId,
        Self::ApiPrivateKey,
        Self::ApiPublicKey,
        Self::ApiPublicKeyId,
        Self::ProofKey,
    ];

    /// Returns the canonical key name used in documents, properties, and env.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseServiceUrl => "BASE_SERVICE_URL",
            Self::AppId => "APP_ID",
            Self::AppKey => "APP_KEY",
            Self::PythiaServiceUrl => "PYTHIA_SERVICE_URL",
            Self::AccountId => "ACCOUNT_ID",
            Self::ApiPrivateKey => "API_PRIVATE_KEY",
            Self::ApiPublicKey => "API_PUBLIC_KEY",
            Self::ApiPublicKeyId => "API_PUBLIC_KEY_ID",
            Self::ProofKey => "PROOF_KEY",
        }
    }

    /// Returns true for keys that only older suites use.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        !matches!(self, Self::BaseServiceUrl | Self::AppId | Self::AppKey)
    }

    /// Returns true when the value is private key material.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::AppKey | Self::ApiPrivateKey | Self::ProofKey)
    }
}

/// Returns true when a value is absent for resolution purposes.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Drops blank values.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !is_blank(value))
}
