extern crate alloc;

use crate::*;
use codec::Encode;
use frame::deps::frame_benchmarking::{account, v2::*};
use frame::deps::frame_support::traits::{
  EnsureOrigin, UnixTime, fungible::Mutate as NativeMutate, fungibles::Mutate as FungiblesMutate,
};
use frame::deps::frame_system::RawOrigin;
use primitives::{
  AssetInspector, Balance, CommittedOrder, Order, OrderKind, PoolId, PositionId, params::PRECISION,
};

const AMOUNT_IN: Balance = 1_000 * PRECISION;
const MAX_FEE: Balance = PRECISION / 5;

fn funded_caller<T: Config>(pool: PoolId) -> T::AccountId {
  let caller: T::AccountId = account("caller", 0, 0);
  let state = T::Pools::pool_state(pool).expect("helper creates the pool");
  let token0 = state.token0.local_id().expect("token0 is a fungible token");
  T::Assets::mint_into(token0, &caller, AMOUNT_IN * 2).expect("token0 can be minted");
  T::Currency::mint_into(&caller, 100 * PRECISION).expect("native can be minted");
  caller
}

fn limit_order<T: Config>(pool: PoolId, receiver: T::AccountId) -> Order<T::AccountId> {
  let state = T::Pools::pool_state(pool).expect("helper creates the pool");
  let floor = range::floor_to_spacing(state.tick, state.tick_spacing).expect("valid spacing");
  Order {
    pool,
    zero_for_one: true,
    tick_threshold: floor + 2 * state.tick_spacing,
    amount_in: AMOUNT_IN,
    receiver,
    owner: None,
    max_fee_amount: MAX_FEE,
    kind: OrderKind::Limit,
  }
}

fn submitted<T: Config>() -> (T::AccountId, PositionId, CommittedOrder<T::AccountId>) {
  let pool = T::BenchmarkHelper::create_pool();
  let caller = funded_caller::<T>(pool);
  let order = limit_order::<T>(pool, caller.clone());
  Pallet::<T>::submit_order(RawOrigin::Signed(caller.clone()).into(), order.clone(), MAX_FEE)
    .expect("order is valid");
  let position_id = Commitments::<T>::iter_keys()
    .next()
    .expect("order was committed");
  let committed = CommittedOrder::new(order, T::Time::now().as_secs());
  (caller, position_id, committed)
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn submit_order() {
    let pool = T::BenchmarkHelper::create_pool();
    let caller = funded_caller::<T>(pool);
    let order = limit_order::<T>(pool, caller.clone());

    #[extrinsic_call]
    submit_order(RawOrigin::Signed(caller), order, MAX_FEE);

    assert_eq!(TotalBonded::<T>::get(), MAX_FEE);
  }

  #[benchmark]
  fn schedule_ejection() {
    let pool = T::BenchmarkHelper::create_pool();
    let caller = funded_caller::<T>(pool);
    let position_id =
      T::BenchmarkHelper::create_position(&caller, pool).expect("helper creates the position");
    let position = T::Pools::position(position_id).expect("position exists");
    let order = Order {
      tick_threshold: position.tick_lower,
      amount_in: 0,
      owner: Some(caller.clone()),
      ..limit_order::<T>(pool, caller.clone())
    };

    #[extrinsic_call]
    schedule_ejection(RawOrigin::Signed(caller), position_id, order, MAX_FEE);

    assert!(Commitments::<T>::contains_key(position_id));
  }

  #[benchmark]
  fn execute() {
    let (_, position_id, committed) = submitted::<T>();
    let spacing = T::Pools::pool_state(committed.order.pool)
      .expect("pool exists")
      .tick_spacing;
    T::BenchmarkHelper::set_tick(
      committed.order.pool,
      committed.order.tick_threshold + 2 * spacing,
    );
    let payload: BoundedVec<u8, T::MaxPayloadLength> = committed
      .encode()
      .try_into()
      .expect("payload fits the bound");
    let origin =
      T::KeeperOrigin::try_successful_origin().expect("KeeperOrigin must have a successful origin");

    #[extrinsic_call]
    execute(origin as T::RuntimeOrigin, position_id, payload, MAX_FEE);

    assert!(!Commitments::<T>::contains_key(position_id));
  }

  #[benchmark]
  fn cancel_order() {
    let (caller, position_id, committed) = submitted::<T>();

    #[extrinsic_call]
    cancel_order(
      RawOrigin::Signed(caller),
      position_id,
      committed.order,
      committed.submitted_at,
    );

    assert!(!Commitments::<T>::contains_key(position_id));
  }

  #[benchmark]
  fn set_submissions_paused() {
    let origin =
      T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin");

    #[extrinsic_call]
    set_submissions_paused(origin as T::RuntimeOrigin, true);

    assert!(SubmissionsPaused::<T>::get());
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
