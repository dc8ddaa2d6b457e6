//! # Admin Check
//!
//! Gatekeeper for restricted commands such as `.close`.
//! Authorized issuers are listed under `system.admin`; an empty list admits everyone.

use crate::domain::config::AppConfig;
use crate::domain::types::AuctionError;

pub fn authorize(config: &AppConfig, issuer_id: &str) -> Result<(), AuctionError> {
    if config.system.is_admin(issuer_id) {
        Ok(())
    } else {
        tracing::warn!("Rejected restricted command from {}", issuer_id);
        Err(AuctionError::Unauthorized(issuer_id.to_string()))
    }
}
