//! Time unit helpers.
//!
//! All controller timing (tick durations, lock durations, remaining lock
//! time) is carried as [`Seconds`]. Hosts that step their simulation in
//! another time unit convert once at the boundary with [`to_seconds`].

use qtty::{Quantity, Second, Unit};

/// Seconds, the unit every lock timer runs in.
pub type Seconds = Quantity<Second>;

/// Remaining lock time at or below this many seconds counts as elapsed.
///
/// Repeated `f64` subtraction of a tick duration leaves residues such as
/// `2.8e-17` where the exact result is zero.
pub const TIMER_EPSILON: f64 = 1e-9;

/// Marker trait for units that share the same physical dimension.
///
/// This trait is automatically implemented for any pair of units where
/// `From::Dim == To::Dim`, enabling compile-time checked conversions.
pub trait SameDim<To: Unit>: Unit<Dim = To::Dim> {}

impl<From, To> SameDim<To> for From
where
    From: Unit,
    To: Unit<Dim = From::Dim>,
{
}

/// Converts a quantity from one unit to another unit of the same dimension.
#[inline]
pub const fn convert<From, To>(q: Quantity<From>) -> Quantity<To>
where
    From: SameDim<To>,
    To: Unit,
{
    q.to_const::<To>()
}

/// Converts any time quantity into [`Seconds`].
///
/// ```ignore
/// use qtty::{Minute, Quantity};
/// use skirmish::units::to_seconds;
///
/// let tick = to_seconds(Quantity::<Minute>::new(0.5));
/// assert!((tick.value() - 30.0).abs() < 1e-12);
/// ```
#[inline]
pub const fn to_seconds<U>(q: Quantity<U>) -> Seconds
where
    U: SameDim<Second>,
{
    convert(q)
}

/// Shorthand for building a [`Seconds`] value.
#[inline]
pub const fn secs(value: f64) -> Seconds {
    Quantity::<Second>::new(value)
}

/// Subtracts `dt` from `remaining`, clamping at zero and snapping
/// sub-[`TIMER_EPSILON`] residues to exactly zero.
///
/// A negative or non-finite `dt` subtracts nothing.
pub fn saturating_decrement(remaining: Seconds, dt: Seconds) -> Seconds {
    let left = remaining.value() - sanitize_dt(dt).value();
    if left <= TIMER_EPSILON {
        secs(0.0)
    } else {
        secs(left)
    }
}

/// Maps a negative, NaN or infinite tick duration to zero.
pub fn sanitize_dt(dt: Seconds) -> Seconds {
    let v = dt.value();
    if v.is_finite() && v >= 0.0 {
        dt
    } else {
        secs(0.0)
    }
}
