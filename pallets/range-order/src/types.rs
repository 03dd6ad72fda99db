use frame::prelude::*;
use primitives::{AssetKind, PoolId, Tick};

/// Snapshot of a concentrated liquidity pool as reported by the adapter.
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, PartialEq)]
pub struct PoolState {
  pub tick: Tick,
  pub tick_spacing: Tick,
  pub token0: AssetKind,
  pub token1: AssetKind,
}

impl PoolState {
  /// Asset deposited by an order of the given direction.
  pub fn input_asset(&self, zero_for_one: bool) -> AssetKind {
    if zero_for_one { self.token0 } else { self.token1 }
  }

  /// Asset an order of the given direction converts into.
  pub fn output_asset(&self, zero_for_one: bool) -> AssetKind {
    if zero_for_one { self.token1 } else { self.token0 }
  }
}

/// Ownership and placement of a single position.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq)]
pub struct PositionInfo<AccountId> {
  pub pool: PoolId,
  pub owner: AccountId,
  pub tick_lower: Tick,
  pub tick_upper: Tick,
}

/// Coarse classification of dispatch failures, used by clients deciding whether a
/// rejected call is worth retrying.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub enum ErrorClass {
  /// Malformed or out-of-policy input. Never succeeds on retry.
  Validation,
  /// Caller lacks the right to perform the call.
  Authorization,
  /// The order is unknown or already terminal.
  Replay,
  /// Ejection condition does not hold yet. May succeed later.
  ConditionNotMet,
  /// Funds missing at the time of the call.
  InsufficientBalance,
}
