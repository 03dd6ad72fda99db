//! Range Order Pallet
//!
//! Conditional, keeper-triggered exits from concentrated liquidity positions.
//!
//! A depositor places single-sided liquidity one tick spacing beyond the current price,
//! or hands over an existing position, and pre-commits to withdrawing it once price
//! crosses a threshold (or, for expiring orders, once a maturity window elapses). Any
//! keeper reaching the chain through the gateway origin may trigger the exit and is
//! paid from an escrowed native bond, capped by the depositor's `max_fee_amount`.
//!
//! ## State
//! Only a digest of each pending order is kept, keyed by position id. Every caller that
//! mutates an order resupplies the full order and submission time. Execution and
//! cancellation both clear the digest before touching any funds, so whichever of
//! racing keepers or the order's controller lands first wins and every later attempt
//! fails with `InvalidCommitment`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub use adapters::ConcentratedLiquidity;

pub mod escrow;
pub mod range;
pub mod resolver;
pub mod types;
pub use types::{ErrorClass, PoolState, PositionInfo};

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

const LOG_TARGET: &str = "runtime::range-order";

#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  /// Create a pool whose token1 is native and whose token0 can be minted to accounts.
  fn create_pool() -> primitives::PoolId;

  fn set_tick(pool: primitives::PoolId, tick: primitives::Tick);

  /// Position in `pool` owned by `owner`, outside the active interval on the upper side.
  fn create_position(
    owner: &AccountId,
    pool: primitives::PoolId,
  ) -> Result<primitives::PositionId, polkadot_sdk::sp_runtime::DispatchError>;
}

#[frame::pallet]
pub mod pallet {
  use super::{ConcentratedLiquidity, ErrorClass, LOG_TARGET, WeightInfo, escrow, range};
  use codec::DecodeAll;
  use frame::deps::{
    frame_support::{
      PalletId,
      traits::{
        EnsureOrigin, UnixTime,
        fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
        fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
        tokens::Preservation,
      },
    },
    sp_runtime::traits::{AccountIdConversion, Hash},
  };
  use frame::prelude::*;
  use primitives::{AssetInspector, AssetKind, Balance, CommittedOrder, Moment, Order, PositionId};

  #[pallet::config]
  pub trait Config: frame_system::Config {
    /// Native currency holding fee bonds
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;
    /// Fungible tokens deposited into and withdrawn from positions
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;
    /// Concentrated liquidity AMM adapter
    type Pools: ConcentratedLiquidity<Self::AccountId>;
    /// Wall clock for submission times and expiry
    type Time: UnixTime;
    /// Keeper gateway. Its success value is the account compensated for an execution.
    type KeeperOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;
    /// Origin allowed to pause and resume submissions
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;
    /// Pallet ID for the escrow and custody account
    #[pallet::constant]
    type PalletId: Get<PalletId>;
    /// Seconds after submission at which an expiring order becomes ejectable
    #[pallet::constant]
    type EjectionMaturity: Get<Moment>;
    /// Maximum size of an execution payload in bytes
    #[pallet::constant]
    type MaxPayloadLength: Get<u32>;
    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  /// Digest of each pending order, keyed by the position it ejects.
  ///
  /// Present while the order can be executed or cancelled, removed on either terminal
  /// transition.
  #[pallet::storage]
  #[pallet::getter(fn commitment_of)]
  pub type Commitments<T: Config> =
    StorageMap<_, Blake2_128Concat, PositionId, T::Hash, OptionQuery>;

  /// Sum of native bonds held for pending orders
  #[pallet::storage]
  #[pallet::getter(fn total_bonded)]
  pub type TotalBonded<T> = StorageValue<_, Balance, ValueQuery>;

  /// New submissions are rejected while set. Execution and cancellation stay open.
  #[pallet::storage]
  #[pallet::getter(fn submissions_paused)]
  pub type SubmissionsPaused<T> = StorageValue<_, bool, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Order accepted. `committed` is what keepers poll with and later execute.
    OrderSubmitted {
      position_id: PositionId,
      who: T::AccountId,
      committed: CommittedOrder<T::AccountId>,
    },
    /// Position withdrawn by a keeper and proceeds delivered
    OrderExecuted {
      position_id: PositionId,
      keeper: T::AccountId,
      receiver: T::AccountId,
      fee_paid: Balance,
      fee_refunded: Balance,
      amount0: Balance,
      amount1: Balance,
    },
    /// Order withdrawn by its controller. Amounts are zero when the position was handed
    /// back intact.
    OrderCancelled {
      position_id: PositionId,
      beneficiary: T::AccountId,
      refunded: Balance,
      amount0: Balance,
      amount1: Balance,
    },
    SubmissionsPausedSet { paused: bool },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Threshold is not a multiple of the pool's tick spacing
    ThresholdNotInitializable,
    /// Threshold lies inside or on the wrong side of the active tick interval
    ThresholdInRange,
    /// Pool reports a non-positive tick spacing
    InvalidTickSpacing,
    /// Attached native value does not cover the input amount, or no input was given
    InvalidAmountIn,
    /// Attached native value does not match the required fee bond
    InvalidMaxFeeAmount,
    /// Fee bond is non-zero but below the native existential deposit
    BondBelowMinimum,
    /// Order owner must name the signer for handed over positions and be empty otherwise
    OwnerMismatch,
    /// Pool not known to the liquidity adapter
    UnknownPool,
    /// Position not known to the liquidity adapter
    UnknownPosition,
    /// Position belongs to a different pool than the order
    PoolMismatch,
    /// Position already has a pending order
    PositionAlreadyCommitted,
    /// Submissions are paused
    SubmissionsPaused,
    /// Arithmetic overflow in calculation
    ArithmeticOverflow,
    /// Only the receiver may cancel a deposit order
    OnlyReceiver,
    /// Execution must come through the keeper gateway
    OnlyKeeperGateway,
    /// Caller does not own the position or the order handing it over
    NotPositionOwner,
    /// Supplied order does not match a pending commitment
    InvalidCommitment,
    /// Execution payload is not an encoded committed order
    MalformedPayload,
    /// Ejection condition does not hold
    ConditionNotMet,
    /// Account balance insufficient for operation
    InsufficientBalance,
    /// Keeper fee exceeds the output proceeds of a dust order
    FeeExceedsProceeds,
  }

  impl<T> Error<T> {
    pub fn class(&self) -> ErrorClass {
      match self {
        Self::OnlyReceiver | Self::OnlyKeeperGateway | Self::NotPositionOwner => {
          ErrorClass::Authorization
        }
        Self::InvalidCommitment | Self::MalformedPayload => ErrorClass::Replay,
        Self::ConditionNotMet => ErrorClass::ConditionNotMet,
        Self::InsufficientBalance | Self::FeeExceedsProceeds => ErrorClass::InsufficientBalance,
        _ => ErrorClass::Validation,
      }
    }
  }

  impl<T> From<range::RangeError> for Error<T> {
    fn from(err: range::RangeError) -> Self {
      match err {
        range::RangeError::NotInitializable => Self::ThresholdNotInitializable,
        range::RangeError::InRange => Self::ThresholdInRange,
        range::RangeError::InvalidSpacing => Self::InvalidTickSpacing,
        range::RangeError::Overflow => Self::ArithmeticOverflow,
      }
    }
  }

  impl<T> From<escrow::EscrowError> for Error<T> {
    fn from(err: escrow::EscrowError) -> Self {
      match err {
        escrow::EscrowError::InvalidAmountIn => Self::InvalidAmountIn,
        escrow::EscrowError::InvalidMaxFeeAmount => Self::InvalidMaxFeeAmount,
        escrow::EscrowError::FeeExceedsProceeds => Self::FeeExceedsProceeds,
      }
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Deposit single-sided liquidity and commit to ejecting it past `tick_threshold`.
    ///
    /// `native_value` is the native amount the caller hands over: the fee bond, plus
    /// `amount_in` when the input token is native. The position is minted to the pallet
    /// account and its id keys the commitment.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::submit_order())]
    pub fn submit_order(
      origin: OriginFor<T>,
      order: Order<T::AccountId>,
      native_value: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(!SubmissionsPaused::<T>::get(), Error::<T>::SubmissionsPaused);
      ensure!(order.owner.is_none(), Error::<T>::OwnerMismatch);

      let pool = T::Pools::pool_state(order.pool).ok_or(Error::<T>::UnknownPool)?;
      range::validate_threshold(
        pool.tick,
        pool.tick_spacing,
        order.tick_threshold,
        order.zero_for_one,
      )
      .map_err(Error::<T>::from)?;

      let input = pool.input_asset(order.zero_for_one);
      let bond = order.bond();
      escrow::check_deposit(input.is_native(), order.amount_in, bond, native_value)
        .map_err(Error::<T>::from)?;
      Self::ensure_bond_refundable(bond)?;

      let custody = Self::account_id();
      Self::collect_native(&who, native_value)?;
      if let Some(asset_id) = input.local_id() {
        T::Assets::transfer(
          asset_id,
          &who,
          &custody,
          order.amount_in,
          Preservation::Expendable,
        )
        .map_err(|_| Error::<T>::InsufficientBalance)?;
      }

      let (tick_lower, tick_upper) =
        range::position_range(order.tick_threshold, pool.tick_spacing, order.zero_for_one)
          .map_err(Error::<T>::from)?;
      let position_id = T::Pools::mint_position(
        &custody,
        order.pool,
        tick_lower,
        tick_upper,
        input,
        order.amount_in,
      )?;

      Self::commit(who, position_id, order, bond)
    }

    /// Commit an existing position to ejection past `tick_threshold`.
    ///
    /// The caller must own the position and name themselves as `order.owner`. Custody
    /// moves to the pallet account until the order is executed or cancelled, and only
    /// the owner may cancel. `native_value` must equal the fee bond.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::schedule_ejection())]
    pub fn schedule_ejection(
      origin: OriginFor<T>,
      position_id: PositionId,
      order: Order<T::AccountId>,
      native_value: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(!SubmissionsPaused::<T>::get(), Error::<T>::SubmissionsPaused);
      ensure!(order.amount_in == 0, Error::<T>::InvalidAmountIn);

      let position = T::Pools::position(position_id).ok_or(Error::<T>::UnknownPosition)?;
      ensure!(position.owner == who, Error::<T>::NotPositionOwner);
      ensure!(order.owner.as_ref() == Some(&who), Error::<T>::OwnerMismatch);
      ensure!(position.pool == order.pool, Error::<T>::PoolMismatch);

      let pool = T::Pools::pool_state(order.pool).ok_or(Error::<T>::UnknownPool)?;
      range::validate_threshold(
        pool.tick,
        pool.tick_spacing,
        order.tick_threshold,
        order.zero_for_one,
      )
      .map_err(Error::<T>::from)?;

      let bond = order.bond();
      escrow::check_bond(bond, native_value).map_err(Error::<T>::from)?;
      Self::ensure_bond_refundable(bond)?;

      Self::collect_native(&who, native_value)?;
      T::Pools::transfer_position(position_id, &who, &Self::account_id())?;

      Self::commit(who, position_id, order, bond)
    }

    /// Eject a position whose condition holds.
    ///
    /// Callable only through the keeper gateway. `payload` is the encoded committed
    /// order returned by the checker, `fee` the keeper's reported cost, paid up to the
    /// order's `max_fee_amount`.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::execute())]
    pub fn execute(
      origin: OriginFor<T>,
      position_id: PositionId,
      payload: BoundedVec<u8, T::MaxPayloadLength>,
      fee: Balance,
    ) -> DispatchResult {
      let keeper =
        T::KeeperOrigin::ensure_origin(origin).map_err(|_| Error::<T>::OnlyKeeperGateway)?;
      let committed = CommittedOrder::<T::AccountId>::decode_all(&mut &payload[..])
        .map_err(|_| Error::<T>::MalformedPayload)?;
      Self::ensure_committed(position_id, &committed)?;

      let pool = T::Pools::pool_state(committed.order.pool).ok_or(Error::<T>::UnknownPool)?;
      if !Self::condition_met(position_id, &committed, &pool) {
        log::trace!(
          target: LOG_TARGET,
          "execution of position {} rejected: condition not met at tick {}",
          position_id,
          pool.tick,
        );
        return Err(Error::<T>::ConditionNotMet.into());
      }

      let order = committed.order;
      Self::release(position_id, order.bond());

      let (amount0_min, amount1_min) = Self::withdrawal_minimums(&order);
      let (amount0, amount1) =
        T::Pools::withdraw(&Self::account_id(), position_id, amount0_min, amount1_min)?;
      let (input_proceeds, output_proceeds) = if order.zero_for_one {
        (amount0, amount1)
      } else {
        (amount1, amount0)
      };

      let settlement =
        escrow::settle_execution(&order.kind, order.max_fee_amount, fee, output_proceeds)
          .map_err(Error::<T>::from)?;

      Self::pay_out(Self::fee_asset(&order, &pool), &keeper, settlement.paid)?;
      Self::pay_out(AssetKind::Native, order.controller(), settlement.refunded)?;
      Self::pay_out(
        pool.input_asset(order.zero_for_one),
        &order.receiver,
        input_proceeds,
      )?;
      Self::pay_out(
        pool.output_asset(order.zero_for_one),
        &order.receiver,
        settlement.output_to_receiver,
      )?;

      log::debug!(
        target: LOG_TARGET,
        "position {} executed, keeper fee {}",
        position_id,
        settlement.paid,
      );

      Self::deposit_event(Event::OrderExecuted {
        position_id,
        keeper,
        receiver: order.receiver,
        fee_paid: settlement.paid,
        fee_refunded: settlement.refunded,
        amount0,
        amount1,
      });

      Ok(())
    }

    /// Withdraw a pending order at any time before it is executed.
    ///
    /// Deposits are cancelled by their receiver, withdrawn and paid out with the whole
    /// bond. Positions handed over through `schedule_ejection` are cancelled by their
    /// owner and returned to them intact, together with the bond.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::cancel_order())]
    pub fn cancel_order(
      origin: OriginFor<T>,
      position_id: PositionId,
      order: Order<T::AccountId>,
      submitted_at: Moment,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      let committed = CommittedOrder::new(order, submitted_at);
      Self::ensure_committed(position_id, &committed)?;
      let order = committed.order;
      if order.owner.is_some() {
        ensure!(who == *order.controller(), Error::<T>::NotPositionOwner);
      } else {
        ensure!(who == order.receiver, Error::<T>::OnlyReceiver);
      }

      let bond = order.bond();
      Self::release(position_id, bond);

      let custody = Self::account_id();
      let (amount0, amount1) = match &order.owner {
        Some(owner) => {
          T::Pools::transfer_position(position_id, &custody, owner)?;
          (0, 0)
        }
        None => T::Pools::withdraw(&custody, position_id, 0, 0)?,
      };

      let pool = T::Pools::pool_state(order.pool).ok_or(Error::<T>::UnknownPool)?;
      let output_proceeds = if order.zero_for_one { amount1 } else { amount0 };
      let input_proceeds = if order.zero_for_one { amount0 } else { amount1 };
      let settlement = escrow::settle_cancellation(bond, output_proceeds);

      let beneficiary = order.controller().clone();
      Self::pay_out(AssetKind::Native, &beneficiary, settlement.refunded)?;
      Self::pay_out(
        pool.input_asset(order.zero_for_one),
        &beneficiary,
        input_proceeds,
      )?;
      Self::pay_out(
        pool.output_asset(order.zero_for_one),
        &beneficiary,
        settlement.output_to_receiver,
      )?;

      log::debug!(target: LOG_TARGET, "position {} cancelled", position_id);

      Self::deposit_event(Event::OrderCancelled {
        position_id,
        beneficiary,
        refunded: settlement.refunded,
        amount0,
        amount1,
      });

      Ok(())
    }

    /// Pause or resume new submissions
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::set_submissions_paused())]
    pub fn set_submissions_paused(origin: OriginFor<T>, paused: bool) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      SubmissionsPaused::<T>::put(paused);
      Self::deposit_event(Event::SubmissionsPausedSet { paused });
      Ok(())
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn integrity_test() {
      assert!(
        T::EjectionMaturity::get() > 0,
        "EjectionMaturity must be non-zero"
      );
      assert!(
        CommittedOrder::<T::AccountId>::max_encoded_len() <= T::MaxPayloadLength::get() as usize,
        "MaxPayloadLength must fit an encoded committed order"
      );
    }

    #[cfg(feature = "try-runtime")]
    fn try_state(_n: BlockNumberFor<T>) -> Result<(), frame::deps::sp_runtime::TryRuntimeError> {
      Self::do_try_state()
    }
  }

  impl<T: Config> Pallet<T> {
    /// Get the pallet's account ID (derived from PalletId)
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn commitment_digest(committed: &CommittedOrder<T::AccountId>) -> T::Hash {
      T::Hashing::hash_of(committed)
    }

    /// Whether `committed` matches the pending commitment of `position_id`.
    pub fn is_committed(position_id: PositionId, committed: &CommittedOrder<T::AccountId>) -> bool {
      Commitments::<T>::get(position_id)
        .is_some_and(|digest| digest == Self::commitment_digest(committed))
    }

    fn ensure_committed(
      position_id: PositionId,
      committed: &CommittedOrder<T::AccountId>,
    ) -> DispatchResult {
      ensure!(
        Self::is_committed(position_id, committed),
        Error::<T>::InvalidCommitment
      );
      Ok(())
    }

    fn commit(
      who: T::AccountId,
      position_id: PositionId,
      order: Order<T::AccountId>,
      bond: Balance,
    ) -> DispatchResult {
      ensure!(
        !Commitments::<T>::contains_key(position_id),
        Error::<T>::PositionAlreadyCommitted
      );

      let committed = CommittedOrder::new(order, T::Time::now().as_secs());
      TotalBonded::<T>::try_mutate(|total| -> DispatchResult {
        *total = total
          .checked_add(bond)
          .ok_or(Error::<T>::ArithmeticOverflow)?;
        Ok(())
      })?;
      Commitments::<T>::insert(position_id, Self::commitment_digest(&committed));

      log::debug!(
        target: LOG_TARGET,
        "position {} committed at {} with bond {}",
        position_id,
        committed.submitted_at,
        bond,
      );

      Self::deposit_event(Event::OrderSubmitted {
        position_id,
        who,
        committed,
      });

      Ok(())
    }

    /// Clear the commitment ahead of any transfer so the order cannot be re-entered.
    fn release(position_id: PositionId, bond: Balance) {
      Commitments::<T>::remove(position_id);
      TotalBonded::<T>::mutate(|total| *total = total.saturating_sub(bond));
    }

    /// A bond must be able to open the account it is refunded to.
    fn ensure_bond_refundable(bond: Balance) -> DispatchResult {
      let minimum = <T::Currency as NativeInspect<T::AccountId>>::minimum_balance();
      ensure!(
        bond.is_zero() || bond >= minimum,
        Error::<T>::BondBelowMinimum
      );
      Ok(())
    }

    fn collect_native(who: &T::AccountId, amount: Balance) -> DispatchResult {
      if amount.is_zero() {
        return Ok(());
      }
      <T::Currency as NativeMutate<T::AccountId>>::transfer(
        who,
        &Self::account_id(),
        amount,
        Preservation::Preserve,
      )
      .map_err(|_| Error::<T>::InsufficientBalance)?;
      Ok(())
    }

    /// Transfer `amount` of `asset` out of the pallet account.
    fn pay_out(asset: AssetKind, to: &T::AccountId, amount: Balance) -> DispatchResult {
      if amount.is_zero() {
        return Ok(());
      }
      let custody = Self::account_id();
      match asset {
        AssetKind::Native => {
          <T::Currency as NativeMutate<T::AccountId>>::transfer(
            &custody,
            to,
            amount,
            Preservation::Expendable,
          )?;
        }
        AssetKind::Local(id) | AssetKind::Foreign(id) => {
          T::Assets::transfer(id, &custody, to, amount, Preservation::Expendable)?;
        }
      }
      Ok(())
    }

    /// Dust orders refuse to withdraw below their minimum output.
    fn withdrawal_minimums(order: &Order<T::AccountId>) -> (Balance, Balance) {
      match order.kind.min_amount_out() {
        Some(min) if order.zero_for_one => (0, min),
        Some(min) => (min, 0),
        None => (0, 0),
      }
    }

    #[cfg(any(test, feature = "try-runtime"))]
    pub fn do_try_state() -> Result<(), DispatchError> {
      let held = <T::Currency as NativeInspect<T::AccountId>>::balance(&Self::account_id());
      ensure!(
        TotalBonded::<T>::get() <= held,
        DispatchError::Other("pallet account holds less than the bonded total")
      );
      if Commitments::<T>::iter_keys().next().is_none() {
        ensure!(
          TotalBonded::<T>::get().is_zero(),
          DispatchError::Other("bonds outstanding without pending orders")
        );
      }
      Ok(())
    }
  }

  /// Keeps the pallet account alive without an existential deposit
  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      // Pallet account survives zero native balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
