//! Tick arithmetic for range orders.
//!
//! A range order is a single-sided deposit one tick spacing wide, placed entirely on
//! the far side of the current price so it holds only the input token until price
//! crosses it.

use primitives::Tick;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RangeError {
  /// Threshold does not sit on the pool's spacing grid.
  NotInitializable,
  /// Threshold is on the wrong side of, or inside, the active spacing interval.
  InRange,
  /// Pool reports a non-positive tick spacing.
  InvalidSpacing,
  Overflow,
}

/// Round `tick` down to the spacing grid, toward negative infinity.
pub fn floor_to_spacing(tick: Tick, spacing: Tick) -> Result<Tick, RangeError> {
  if spacing <= 0 {
    return Err(RangeError::InvalidSpacing);
  }
  tick
    .div_euclid(spacing)
    .checked_mul(spacing)
    .ok_or(RangeError::Overflow)
}

/// Accept `threshold` only if a deposit placed at it is entirely out of range.
///
/// Selling token0 requires the threshold strictly above the rounded current tick,
/// selling token1 strictly below it.
pub fn validate_threshold(
  tick: Tick,
  spacing: Tick,
  threshold: Tick,
  zero_for_one: bool,
) -> Result<(), RangeError> {
  if spacing <= 0 {
    return Err(RangeError::InvalidSpacing);
  }
  if threshold.rem_euclid(spacing) != 0 {
    return Err(RangeError::NotInitializable);
  }

  let rounded = floor_to_spacing(tick, spacing)?;
  let out_of_range = if zero_for_one {
    threshold > rounded
  } else {
    threshold < rounded
  };

  if out_of_range {
    Ok(())
  } else {
    Err(RangeError::InRange)
  }
}

/// Lower and upper tick of the resting position for a validated threshold.
pub fn position_range(
  threshold: Tick,
  spacing: Tick,
  zero_for_one: bool,
) -> Result<(Tick, Tick), RangeError> {
  if zero_for_one {
    let upper = threshold
      .checked_add(spacing)
      .ok_or(RangeError::Overflow)?;
    Ok((threshold, upper))
  } else {
    let lower = threshold
      .checked_sub(spacing)
      .ok_or(RangeError::Overflow)?;
    Ok((lower, threshold))
  }
}
