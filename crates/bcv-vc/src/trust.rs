//! # Trust Resolver
//!
//! Lookups over an issuer's key rotation schedule.
//!
//! An entry is authoritative for the half-open window
//! `[effective_from, revoked_at.or(expires_at))`, unbounded when neither is
//! set. Windows are assumed not to overlap; when they do, the earliest
//! matching entry wins.

use bcv_core::{BlockchainAddress, Timestamp};

use crate::issuer::KeyRotationEntry;

/// Whether `instant` falls inside the entry's validity window.
pub fn window_contains(entry: &KeyRotationEntry, instant: Timestamp) -> bool {
    if instant < entry.effective_from {
        return false;
    }
    match entry.revoked_at.or(entry.expires_at) {
        Some(end) => instant < end,
        None => true,
    }
}

/// The schedule entry authoritative at `instant`.
pub fn key_valid_at(schedule: &[KeyRotationEntry], instant: Timestamp) -> Option<&KeyRotationEntry> {
    schedule.iter().find(|entry| window_contains(entry, instant))
}

/// The schedule entry whose key is `address`, regardless of time.
pub fn is_authorized_address<'a>(
    schedule: &'a [KeyRotationEntry],
    address: &BlockchainAddress,
) -> Option<&'a KeyRotationEntry> {
    schedule.iter().find(|entry| entry.key == *address)
}
