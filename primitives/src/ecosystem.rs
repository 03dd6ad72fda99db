//! Ecosystem Constants for Range Order Ejection
//!
//! Centralizes the pallet identifiers and the fundamental parameters shared by the
//! pallet, its runtime configuration and the keeper-facing runtime API.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// These IDs are used by Polkadot SDK's `PalletId::into_account_truncating()`
/// to deterministically generate accounts for pallet-specific operations.
pub mod pallet_ids {
  /// Range order pallet ID (fee escrow and position custody)
  pub const RANGE_ORDER_PALLET_ID: &[u8; 8] = b"py/rngor";
}

/// Ecosystem parameters defining constants and thresholds.
pub mod params {
  use super::Balance;

  /// Precision scalar for all mathematical calculations (10^12).
  ///
  /// One unit of the native token in base units.
  pub const PRECISION: Balance = 1_000_000_000_000;

  /// Window after which an expiring order becomes ejectable regardless of price (90 days).
  ///
  /// Compared strictly: an order submitted at `t` is ejectable at `t + EJECTION_MATURITY + 1`.
  pub const EJECTION_MATURITY_SECS: u64 = 90 * 24 * 60 * 60;

  /// Upper bound on the opaque execution payload a keeper may submit, in bytes.
  ///
  /// Must cover the encoded committed order for the runtime's account type.
  pub const MAX_EXECUTION_PAYLOAD_LEN: u32 = 256;
}
