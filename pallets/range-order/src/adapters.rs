//! Adapter trait for the concentrated liquidity AMM.
//!
//! Pricing and liquidity math live behind this seam. Every call is atomic and
//! synchronous from the pallet's point of view.

use crate::types::{PoolState, PositionInfo};
use frame::prelude::*;
use primitives::{AssetKind, Balance, PoolId, PositionId, Tick};

pub trait ConcentratedLiquidity<AccountId> {
  fn pool_state(pool: PoolId) -> Option<PoolState>;

  fn position(position_id: PositionId) -> Option<PositionInfo<AccountId>>;

  /// `(amount0, amount1)` a full withdrawal would return at the current price.
  fn position_amounts(position_id: PositionId) -> Option<(Balance, Balance)>;

  /// Deposit `amount` of `asset` from `owner` into `[tick_lower, tick_upper]`.
  fn mint_position(
    owner: &AccountId,
    pool: PoolId,
    tick_lower: Tick,
    tick_upper: Tick,
    asset: AssetKind,
    amount: Balance,
  ) -> Result<PositionId, DispatchError>;

  fn transfer_position(
    position_id: PositionId,
    from: &AccountId,
    to: &AccountId,
  ) -> Result<(), DispatchError>;

  /// Burn all liquidity and collect both tokens to `owner`, failing below the minimums.
  fn withdraw(
    owner: &AccountId,
    position_id: PositionId,
    amount0_min: Balance,
    amount1_min: Balance,
  ) -> Result<(Balance, Balance), DispatchError>;
}

/// No-op adapter: knows no pools and rejects every mutation.
impl<AccountId> ConcentratedLiquidity<AccountId> for () {
  fn pool_state(_: PoolId) -> Option<PoolState> {
    None
  }

  fn position(_: PositionId) -> Option<PositionInfo<AccountId>> {
    None
  }

  fn position_amounts(_: PositionId) -> Option<(Balance, Balance)> {
    None
  }

  fn mint_position(
    _: &AccountId,
    _: PoolId,
    _: Tick,
    _: Tick,
    _: AssetKind,
    _: Balance,
  ) -> Result<PositionId, DispatchError> {
    Err(DispatchError::Other("Concentrated liquidity not configured"))
  }

  fn transfer_position(_: PositionId, _: &AccountId, _: &AccountId) -> Result<(), DispatchError> {
    Err(DispatchError::Other("Concentrated liquidity not configured"))
  }

  fn withdraw(
    _: &AccountId,
    _: PositionId,
    _: Balance,
    _: Balance,
  ) -> Result<(Balance, Balance), DispatchError> {
    Err(DispatchError::Other("Concentrated liquidity not configured"))
  }
}
