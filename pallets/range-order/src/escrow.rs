//! Keeper fee escrow arithmetic.
//!
//! Bonded orders lock `max_fee_amount` of native currency at submission. At execution
//! the keeper is paid its reported cost capped at that amount and the remainder goes
//! back to the order's controller, so `paid + refunded` always equals the bond. Dust
//! orders lock nothing and pay the keeper out of the output proceeds instead.

use primitives::{Balance, OrderKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EscrowError {
  InvalidAmountIn,
  InvalidMaxFeeAmount,
  FeeExceedsProceeds,
}

/// How a terminal transition splits the bond and the output proceeds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Settlement {
  /// Paid to the keeper. Native for bonded orders, output asset for dust orders.
  pub paid: Balance,
  /// Native bond returned to whoever controls the order.
  pub refunded: Balance,
  /// Output asset forwarded to the receiver.
  pub output_to_receiver: Balance,
}

/// Check the native value attached to a fresh deposit.
///
/// With a native input the value carries both the deposit and the bond, otherwise it
/// is the bond alone.
pub fn check_deposit(
  input_is_native: bool,
  amount_in: Balance,
  bond: Balance,
  native_value: Balance,
) -> Result<(), EscrowError> {
  if amount_in == 0 {
    return Err(EscrowError::InvalidAmountIn);
  }

  if input_is_native {
    let covers_input = if bond > 0 {
      native_value > amount_in
    } else {
      native_value >= amount_in
    };
    if !covers_input {
      return Err(EscrowError::InvalidAmountIn);
    }
    if native_value - amount_in != bond {
      return Err(EscrowError::InvalidMaxFeeAmount);
    }
    Ok(())
  } else {
    check_bond(bond, native_value)
  }
}

/// Check the native value attached when no input is deposited.
pub fn check_bond(bond: Balance, native_value: Balance) -> Result<(), EscrowError> {
  if native_value == bond {
    Ok(())
  } else {
    Err(EscrowError::InvalidMaxFeeAmount)
  }
}

pub fn settle_execution(
  kind: &OrderKind,
  max_fee_amount: Balance,
  reported_cost: Balance,
  output_proceeds: Balance,
) -> Result<Settlement, EscrowError> {
  let paid = reported_cost.min(max_fee_amount);

  if kind.pays_fee_from_proceeds() {
    let output_to_receiver = output_proceeds
      .checked_sub(paid)
      .ok_or(EscrowError::FeeExceedsProceeds)?;
    Ok(Settlement {
      paid,
      refunded: 0,
      output_to_receiver,
    })
  } else {
    Ok(Settlement {
      paid,
      refunded: max_fee_amount - paid,
      output_to_receiver: output_proceeds,
    })
  }
}

pub fn settle_cancellation(bond: Balance, output_proceeds: Balance) -> Settlement {
  Settlement {
    paid: 0,
    refunded: bond,
    output_to_receiver: output_proceeds,
  }
}
