//! Ejection condition evaluation.
//!
//! Keepers poll [`Pallet::checker`] off-chain through the runtime API and submit the
//! returned payload to `execute`, which re-evaluates the same condition on-chain.

use crate::{Config, Pallet, adapters::ConcentratedLiquidity, types::PoolState};
use frame::deps::frame_support::traits::Get;
use alloc::vec::Vec;
use codec::Encode;
use frame::deps::frame_support::traits::UnixTime;
use primitives::{AssetKind, Balance, CommittedOrder, Moment, Order, PositionId, Tick};

/// Price has moved past the threshold in the ejection direction.
pub fn price_crossed(tick: Tick, threshold: Tick, eject_above: bool) -> bool {
  if eject_above {
    tick > threshold
  } else {
    tick < threshold
  }
}

/// Strictly more than `maturity` seconds have passed since submission.
pub fn matured(submitted_at: Moment, now: Moment, maturity: Moment) -> bool {
  now.saturating_sub(submitted_at) > maturity
}

/// Whether `committed` may be ejected given the current tick and time.
///
/// `output_value` is what the position would yield in the output asset right now and
/// is only consulted for dust orders.
pub fn is_ejectable<AccountId>(
  committed: &CommittedOrder<AccountId>,
  tick: Tick,
  now: Moment,
  maturity: Moment,
  output_value: Option<Balance>,
) -> bool {
  let order = &committed.order;
  let crossed = price_crossed(tick, order.tick_threshold, order.eject_above());

  if let Some(min_amount_out) = order.kind.min_amount_out() {
    return crossed && output_value.is_some_and(|value| value >= min_amount_out);
  }

  crossed || (order.kind.ejects_at_expiry() && matured(committed.submitted_at, now, maturity))
}

impl<T: Config> Pallet<T> {
  /// Asset the keeper is compensated in for this order.
  pub fn fee_asset(order: &Order<T::AccountId>, pool: &PoolState) -> AssetKind {
    if order.kind.pays_fee_from_proceeds() {
      pool.output_asset(order.zero_for_one)
    } else {
      AssetKind::Native
    }
  }

  pub(crate) fn condition_met(
    position_id: PositionId,
    committed: &CommittedOrder<T::AccountId>,
    pool: &PoolState,
  ) -> bool {
    let output_value = if committed.order.kind.pays_fee_from_proceeds() {
      T::Pools::position_amounts(position_id).map(|(amount0, amount1)| {
        if committed.order.zero_for_one {
          amount1
        } else {
          amount0
        }
      })
    } else {
      None
    };

    is_ejectable(
      committed,
      pool.tick,
      T::Time::now().as_secs(),
      T::EjectionMaturity::get(),
      output_value,
    )
  }

  /// Off-chain resolver entry point.
  ///
  /// Returns `(true, payload)` when `execute` would succeed with `payload`. Unknown,
  /// terminal or tampered orders, and a fee asset the order does not pay in, all yield
  /// `(false, [])`.
  pub fn checker(
    position_id: PositionId,
    committed: CommittedOrder<T::AccountId>,
    fee_asset: AssetKind,
  ) -> (bool, Vec<u8>) {
    if !Self::is_committed(position_id, &committed) {
      return (false, Vec::new());
    }
    let Some(pool) = T::Pools::pool_state(committed.order.pool) else {
      return (false, Vec::new());
    };
    if Self::fee_asset(&committed.order, &pool) != fee_asset {
      return (false, Vec::new());
    }
    if !Self::condition_met(position_id, &committed, &pool) {
      return (false, Vec::new());
    }

    (true, committed.encode())
  }
}
