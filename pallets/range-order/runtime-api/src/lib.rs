//! Runtime API for keepers polling range order ejection conditions.
//!
//! Keepers learn orders from `OrderSubmitted` events, call `checker` every block, and
//! submit the returned payload to `execute` through the keeper gateway once it
//! reports `true`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use codec::Codec;
use primitives::{AssetKind, CommittedOrder, PositionId};

polkadot_sdk::sp_api::decl_runtime_apis! {
  pub trait RangeOrderApi<AccountId, Hash>
  where
    AccountId: Codec,
    Hash: Codec,
  {
    /// `(executable, payload)` for a pending order and the asset the keeper expects
    /// to be paid in. The payload is empty unless executable.
    fn checker(
      position_id: PositionId,
      committed: CommittedOrder<AccountId>,
      fee_asset: AssetKind,
    ) -> (bool, Vec<u8>);

    /// Digest of the pending order on `position_id`, if any.
    fn commitment_of(position_id: PositionId) -> Option<Hash>;
  }
}
