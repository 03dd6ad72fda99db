use crate as pallet_range_order;
use crate::{ConcentratedLiquidity, PoolState, PositionInfo};
use codec::{Decode, Encode};
use polkadot_sdk::frame_support::traits::tokens::{Fortitude, Precision, Preservation};
use polkadot_sdk::frame_support::traits::{fungible, fungibles};
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl, ord_parameter_types, parameter_types,
  storage::unhashed,
  traits::{ConstU32, ConstU64, ConstU128, Get, UnixTime},
};
use polkadot_sdk::frame_system::{self, EnsureRoot, EnsureSignedBy};
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{AssetKind, Balance, PoolId, PositionId, Tick, params};
use std::cell::RefCell;

pub type AccountId = u64;

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CHARLIE: AccountId = 3;
pub const KEEPER: AccountId = 9;

pub const UNIT: Balance = params::PRECISION;

pub const DAI: u32 = 1;
pub const USDC: u32 = 2;

/// DAI (token0) against the native token (token1), 2000 DAI per native unit.
pub const DAI_POOL: PoolId = 1;
/// DAI (token0) against USDC (token1) at parity.
pub const TOKEN_POOL: PoolId = 2;

pub const TICK_SPACING: Tick = 60;
pub const INITIAL_TICK: Tick = 1_234;
pub const FIRST_POSITION_ID: PositionId = 145_227;
pub const GENESIS_TIME: u64 = 1_700_000_000;

#[derive(Clone, Debug, Decode, Encode)]
pub struct MockPosition {
  pub info: PositionInfo<AccountId>,
  pub deposit0: Balance,
  pub deposit1: Balance,
}

#[derive(Clone, Copy, Debug, Decode, Encode)]
struct MockPool {
  state: PoolState,
  /// token1 per token0 as (numerator, denominator)
  rate: (u128, u128),
}

// Pools and positions live in unhashed storage so a failed dispatch rolls them back
// together with the pallet's own state.
const POOL_PREFIX: &[u8] = b":mock:range-order:pool";
const POSITION_PREFIX: &[u8] = b":mock:range-order:position";
const NEXT_POSITION_KEY: &[u8] = b":mock:range-order:next-position";

fn storage_key(prefix: &[u8], id: impl Encode) -> Vec<u8> {
  (prefix, id).encode()
}

fn mock_pool(pool: PoolId) -> Option<MockPool> {
  unhashed::get(&storage_key(POOL_PREFIX, pool))
}

thread_local! {
    pub static NOW: RefCell<u64> = const { RefCell::new(GENESIS_TIME) };
}

parameter_types! {
  pub static ExistentialDeposit: Balance = 1;
}

pub fn create_pool(pool: PoolId, token0: AssetKind, token1: AssetKind, rate: (u128, u128)) {
  let state = PoolState {
    tick: INITIAL_TICK,
    tick_spacing: TICK_SPACING,
    token0,
    token1,
  };
  unhashed::put(&storage_key(POOL_PREFIX, pool), &MockPool { state, rate });
}

pub fn pool_state(pool: PoolId) -> PoolState {
  mock_pool(pool).expect("pool exists in mock").state
}

/// Move the pool price, as a swap against it would.
pub fn set_tick(pool: PoolId, tick: Tick) {
  if let Some(mut entry) = mock_pool(pool) {
    entry.state.tick = tick;
    unhashed::put(&storage_key(POOL_PREFIX, pool), &entry);
  }
}

pub fn position(position_id: PositionId) -> Option<MockPosition> {
  unhashed::get(&storage_key(POSITION_PREFIX, position_id))
}

fn put_position(position_id: PositionId, position: &MockPosition) {
  unhashed::put(&storage_key(POSITION_PREFIX, position_id), position);
}

pub fn next_position_id() -> PositionId {
  unhashed::get(NEXT_POSITION_KEY).unwrap_or(FIRST_POSITION_ID)
}

/// Register a position that already exists outside the pallet, without moving funds.
pub fn seed_position(
  owner: AccountId,
  pool: PoolId,
  tick_lower: Tick,
  tick_upper: Tick,
  deposit0: Balance,
  deposit1: Balance,
) -> PositionId {
  let position_id = next_position_id();
  unhashed::put(NEXT_POSITION_KEY, &(position_id + 1));
  put_position(
    position_id,
    &MockPosition {
      info: PositionInfo {
        pool,
        owner,
        tick_lower,
        tick_upper,
      },
      deposit0,
      deposit1,
    },
  );
  position_id
}

pub fn now() -> u64 {
  NOW.with(|n| *n.borrow())
}

pub fn advance_time(secs: u64) {
  NOW.with(|n| *n.borrow_mut() += secs);
}

/// Linear stand-in for concentrated liquidity: the share of the range price has
/// moved through is converted at the pool's fixed rate.
fn position_value(position: &MockPosition, tick: Tick, (num, den): (u128, u128)) -> (Balance, Balance) {
  let lower = position.info.tick_lower;
  let upper = position.info.tick_upper;
  let width = (upper - lower).max(1) as u128;
  let crossed = (tick.clamp(lower, upper) - lower) as u128;

  let converted0 = position.deposit0 * crossed / width;
  let converted1 = position.deposit1 * (width - crossed) / width;

  let amount0 = position.deposit0 - converted0 + converted1 * den / num;
  let amount1 = position.deposit1 - converted1 + converted0 * num / den;
  (amount0, amount1)
}

fn burn_asset(asset: AssetKind, who: &AccountId, amount: Balance) -> Result<(), DispatchError> {
  match asset {
    AssetKind::Native => {
      <Balances as fungible::Mutate<AccountId>>::burn_from(
        who,
        amount,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;
    }
    AssetKind::Local(id) | AssetKind::Foreign(id) => {
      <Assets as fungibles::Mutate<AccountId>>::burn_from(
        id,
        who,
        amount,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;
    }
  }
  Ok(())
}

fn mint_asset(asset: AssetKind, who: &AccountId, amount: Balance) -> Result<(), DispatchError> {
  if amount == 0 {
    return Ok(());
  }
  match asset {
    AssetKind::Native => {
      <Balances as fungible::Mutate<AccountId>>::mint_into(who, amount)?;
    }
    AssetKind::Local(id) | AssetKind::Foreign(id) => {
      <Assets as fungibles::Mutate<AccountId>>::mint_into(id, who, amount)?;
    }
  }
  Ok(())
}

pub struct MockPools;
impl ConcentratedLiquidity<AccountId> for MockPools {
  fn pool_state(pool: PoolId) -> Option<PoolState> {
    mock_pool(pool).map(|entry| entry.state)
  }

  fn position(position_id: PositionId) -> Option<PositionInfo<AccountId>> {
    position(position_id).map(|p| p.info)
  }

  fn position_amounts(position_id: PositionId) -> Option<(Balance, Balance)> {
    let position = position(position_id)?;
    let entry = mock_pool(position.info.pool)?;
    Some(position_value(&position, entry.state.tick, entry.rate))
  }

  fn mint_position(
    owner: &AccountId,
    pool: PoolId,
    tick_lower: Tick,
    tick_upper: Tick,
    asset: AssetKind,
    amount: Balance,
  ) -> Result<PositionId, DispatchError> {
    let state = Self::pool_state(pool).ok_or(DispatchError::Other("Pool not found"))?;
    if tick_lower >= tick_upper {
      return Err(DispatchError::Other("Invalid range"));
    }
    let (deposit0, deposit1) = if asset == state.token0 {
      (amount, 0)
    } else if asset == state.token1 {
      (0, amount)
    } else {
      return Err(DispatchError::Other("Asset not in pool"));
    };

    burn_asset(asset, owner, amount)?;
    Ok(seed_position(
      *owner, pool, tick_lower, tick_upper, deposit0, deposit1,
    ))
  }

  fn transfer_position(
    position_id: PositionId,
    from: &AccountId,
    to: &AccountId,
  ) -> Result<(), DispatchError> {
    let mut position = position(position_id).ok_or(DispatchError::Other("Position not found"))?;
    if position.info.owner != *from {
      return Err(DispatchError::Other("Not position owner"));
    }
    position.info.owner = *to;
    put_position(position_id, &position);
    Ok(())
  }

  fn withdraw(
    owner: &AccountId,
    position_id: PositionId,
    amount0_min: Balance,
    amount1_min: Balance,
  ) -> Result<(Balance, Balance), DispatchError> {
    let position = position(position_id).ok_or(DispatchError::Other("Position not found"))?;
    if position.info.owner != *owner {
      return Err(DispatchError::Other("Not position owner"));
    }
    let (amount0, amount1) =
      Self::position_amounts(position_id).ok_or(DispatchError::Other("Pool not found"))?;
    if amount0 < amount0_min || amount1 < amount1_min {
      return Err(DispatchError::Other("Price slippage check"));
    }

    let state = Self::pool_state(position.info.pool).ok_or(DispatchError::Other("Pool not found"))?;
    unhashed::kill(&storage_key(POSITION_PREFIX, position_id));
    mint_asset(state.token0, owner, amount0)?;
    mint_asset(state.token1, owner, amount1)?;
    Ok((amount0, amount1))
  }
}

pub struct MockTime;
impl UnixTime for MockTime {
  fn now() -> core::time::Duration {
    core::time::Duration::from_secs(now())
  }
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    RangeOrder: pallet_range_order,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<Balance>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = Balance;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ExistentialDeposit;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = Balance;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  type ReserveData = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = ();
}

pub struct RangeOrderPalletId;
impl Get<PalletId> for RangeOrderPalletId {
  fn get() -> PalletId {
    PalletId(*primitives::pallet_ids::RANGE_ORDER_PALLET_ID)
  }
}

ord_parameter_types! {
  pub const KeeperGateway: AccountId = KEEPER;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct MockBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<AccountId> for MockBenchmarkHelper {
  fn create_pool() -> PoolId {
    create_pool(DAI_POOL, AssetKind::Local(DAI), AssetKind::Native, (1, 2_000));
    DAI_POOL
  }

  fn set_tick(pool: PoolId, tick: Tick) {
    set_tick(pool, tick);
  }

  fn create_position(owner: &AccountId, pool: PoolId) -> Result<PositionId, DispatchError> {
    let state = MockPools::pool_state(pool).ok_or(DispatchError::Other("Pool not found"))?;
    let lower = state.tick - state.tick.rem_euclid(state.tick_spacing) + 2 * state.tick_spacing;
    Ok(seed_position(
      *owner,
      pool,
      lower,
      lower + state.tick_spacing,
      1_000 * UNIT,
      0,
    ))
  }
}

impl pallet_range_order::Config for Test {
  type Currency = Balances;
  type Assets = Assets;
  type Pools = MockPools;
  type Time = MockTime;
  type KeeperOrigin = EnsureSignedBy<KeeperGateway, AccountId>;
  type AdminOrigin = EnsureRoot<AccountId>;
  type PalletId = RangeOrderPalletId;
  type EjectionMaturity = ConstU64<{ params::EJECTION_MATURITY_SECS }>;
  type MaxPayloadLength = ConstU32<{ params::MAX_EXECUTION_PAYLOAD_LEN }>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockBenchmarkHelper;
}

pub const INITIAL_NATIVE: Balance = 100 * UNIT;
pub const INITIAL_DAI: Balance = 50_000 * UNIT;

pub fn seed_mock_adapters() {
  NOW.with(|n| *n.borrow_mut() = GENESIS_TIME);

  create_pool(DAI_POOL, AssetKind::Local(DAI), AssetKind::Native, (1, 2_000));
  create_pool(TOKEN_POOL, AssetKind::Local(DAI), AssetKind::Local(USDC), (1, 1));
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: vec![
      (ALICE, INITIAL_NATIVE),
      (BOB, INITIAL_NATIVE),
      (CHARLIE, INITIAL_NATIVE),
      (KEEPER, INITIAL_NATIVE),
    ],
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    assets: vec![(DAI, ALICE, true, 1), (USDC, ALICE, true, 1)],
    metadata: vec![],
    accounts: vec![(DAI, ALICE, INITIAL_DAI), (DAI, BOB, INITIAL_DAI)],
    reserves: vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  // Pallet account gets a provider reference so it can hold bonds at any balance
  pallet_range_order::GenesisConfig::<Test>::default()
    .assimilate_storage(&mut t)
    .unwrap();

  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| {
    seed_mock_adapters();
    System::set_block_number(1);
  });
  ext
}
