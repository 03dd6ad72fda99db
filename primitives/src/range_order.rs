//! Range order value types.
//!
//! Orders are never persisted in full. The pallet keeps only a digest of the
//! [`CommittedOrder`], and every caller that wants to mutate an order resupplies it.
//! Keeping the types here gives the pallet and the runtime API one SCALE encoding.

use crate::Balance;
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;

/// Pool reference understood by the concentrated liquidity adapter.
pub type PoolId = u32;
/// Identifier of a concentrated liquidity position.
pub type PositionId = u64;
/// Discrete price index of a concentrated liquidity pool.
pub type Tick = i32;
/// Unix time in seconds.
pub type Moment = u64;

/// Behaviour variant of an order.
#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub enum OrderKind {
  /// Ejectable once price crosses the threshold. Fee bonded in native currency.
  #[default]
  Limit,
  /// Like `Limit`, and also ejectable once the maturity window has elapsed.
  Expiring,
  /// No native bond. The keeper fee is carved out of the output asset, and the order
  /// is only ejectable when the position is worth at least `min_amount_out`.
  Dust { min_amount_out: Balance },
}

impl OrderKind {
  pub fn ejects_at_expiry(&self) -> bool {
    matches!(self, OrderKind::Expiring)
  }

  /// Whether the keeper fee is taken from withdrawal proceeds instead of a native bond.
  pub fn pays_fee_from_proceeds(&self) -> bool {
    matches!(self, OrderKind::Dust { .. })
  }

  pub fn min_amount_out(&self) -> Option<Balance> {
    match self {
      OrderKind::Dust { min_amount_out } => Some(*min_amount_out),
      _ => None,
    }
  }
}

/// A conditional, all-or-nothing exit from a single concentrated liquidity position.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct Order<AccountId> {
  pub pool: PoolId,
  /// `true` sells token0 for token1.
  pub zero_for_one: bool,
  /// Must sit on the pool's tick spacing grid.
  pub tick_threshold: Tick,
  /// Input deposited on submission. Zero when scheduling a pre-existing position.
  pub amount_in: Balance,
  /// Receives proceeds. Cancels deposit orders.
  pub receiver: AccountId,
  /// Holder that handed over a pre-existing position. `None` for deposits.
  pub owner: Option<AccountId>,
  /// Ceiling on what a keeper can be paid.
  pub max_fee_amount: Balance,
  pub kind: OrderKind,
}

impl<AccountId> Order<AccountId> {
  /// Direction of the price cross that triggers ejection.
  pub fn eject_above(&self) -> bool {
    self.zero_for_one
  }

  /// Account allowed to cancel, which is also where an unspent bond returns. A handed
  /// over position stays under its holder's control.
  pub fn controller(&self) -> &AccountId {
    self.owner.as_ref().unwrap_or(&self.receiver)
  }

  /// Native amount escrowed for the keeper at submission.
  pub fn bond(&self) -> Balance {
    if self.kind.pays_fee_from_proceeds() {
      0
    } else {
      self.max_fee_amount
    }
  }
}

/// An order together with its submission time.
///
/// The commitment digest is taken over this value, and its encoding is the opaque
/// payload a keeper submits for execution.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct CommittedOrder<AccountId> {
  pub order: Order<AccountId>,
  pub submitted_at: Moment,
}

impl<AccountId> CommittedOrder<AccountId> {
  pub fn new(order: Order<AccountId>, submitted_at: Moment) -> Self {
    Self {
      order,
      submitted_at,
    }
  }
}
