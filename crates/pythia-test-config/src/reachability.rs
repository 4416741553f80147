// crates/pythia-test-config/src/reachability.rs
// ============================================================================
// Module: Service Reachability
// Description: Host extraction and name resolution for the Pythia service URL.
// Purpose: Skip integration tests when the service host cannot be resolved.
// Dependencies: url
// ============================================================================

//! ## Overview
//! The reachability gate only resolves the service host name; it never opens
//! a connection and imposes no timeout beyond the system resolver's own.
//! Resolution is behind [`HostLookup`] so tests can run without a network.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::net::ToSocketAddrs;

use url::Host;
use url::Url;

use crate::settings::is_blank;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Port used when the URL scheme has no known default.
const FALLBACK_PORT: u16 = 443;

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Resolves host names.
pub trait HostLookup {
    /// Resolves `host`; `Err` carries a short reason.
    ///
    /// # Errors
    ///
    /// Returns an error when the host has no addresses.
    fn lookup(&self, host: &str, port: u16) -> Result<(), String>;
}

/// Host lookup through the operating system resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostLookup;

impl HostLookup for SystemHostLookup {
    fn lookup(&self, host: &str, port: u16) -> Result<(), String> {
        let mut addresses = (host, port).to_socket_addrs().map_err(|err| err.to_string())?;
        if addresses.next().is_some() {
            Ok(())
        } else {
            Err("no addresses returned".to_string())
        }
    }
}

/// Host lookup against a fixed set of names.
#[derive(Debug, Clone, Default)]
pub struct StaticHostLookup {
    /// Names that resolve; `None` resolves everything.
    known: Option<BTreeSet<String>>,
}

impl StaticHostLookup {
    /// Resolves every host.
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            known: None,
        }
    }

    /// Resolves only the listed hosts.
    #[must_use]
    pub fn with_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: Some(hosts.into_iter().map(Into::into).collect()),
        }
    }
}

impl HostLookup for StaticHostLookup {
    fn lookup(&self, host: &str, _port: u16) -> Result<(), String> {
        match &self.known {
            None => Ok(()),
            Some(known) if known.contains(host) => Ok(()),
            Some(_) => Err("unknown host".to_string()),
        }
    }
}

// ============================================================================
// SECTION: Targets
// ============================================================================

/// Host and port taken from a service URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    /// Host name or IP literal, without brackets.
    pub host: String,
    /// Explicit port or the scheme default.
    pub port: u16,
}

/// Extracts the host and port from `url`, if it has a host.
#[must_use]
pub fn service_target(url: &str) -> Option<ServiceTarget> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = match parsed.host()? {
        Host::Domain(domain) => domain.to_string(),
        Host::Ipv4(address) => address.to_string(),
        Host::Ipv6(address) => address.to_string(),
    };
    if is_blank(&host) {
        return None;
    }
    let port = parsed.port_or_known_default().unwrap_or(FALLBACK_PORT);
    Some(ServiceTarget {
        host,
        port,
    })
}

// ============================================================================
// SECTION: Reachability
// ============================================================================

/// Outcome of the reachability gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    /// The host resolved.
    Reachable(ServiceTarget),
    /// No service URL was configured.
    MissingUrl,
    /// The URL has no host.
    MissingHost {
        /// The offending URL.
        url: String,
    },
    /// The host did not resolve.
    Unresolvable {
        /// Host that failed to resolve.
        host: String,
        /// Resolver failure reason.
        reason: String,
    },
}

impl Reachability {
    /// Returns true when tests may proceed.
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable(_))
    }

    /// Returns the skip message, `None` when reachable.
    #[must_use]
    pub fn skip_message(&self) -> Option<String> {
        match self {
            Self::Reachable(_) => None,
            Self::MissingUrl => Some("No Pythia service URL configured".to_string()),
            Self::MissingHost {
                url,
            } => Some(format!("No service host extracted from url={url}")),
            Self::Unresolvable {
                host, ..
            } => Some(format!("Unable to resolve host {host}; skipping integration tests")),
        }
    }
}

/// Runs the reachability gate for `url`.
#[must_use]
pub fn check_service(url: &str, lookup: &dyn HostLookup) -> Reachability {
    if is_blank(url) {
        return Reachability::MissingUrl;
    }
    let Some(target) = service_target(url) else {
        return Reachability::MissingHost {
            url: url.to_string(),
        };
    };
    match lookup.lookup(&target.host, target.port) {
        Ok(()) => Reachability::Reachable(target),
        Err(reason) => Reachability::Unresolvable {
            host: target.host,
            reason,
        },
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
