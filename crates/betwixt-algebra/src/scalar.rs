use std::fmt::Debug;

/// Element types a [`Matrix`](crate::Matrix) can hold.
///
/// Arithmetic is carried out in `f64`; boolean pattern matrices read as
/// `1.0` wherever an entry is present.
pub trait Scalar: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

impl Scalar for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

impl Scalar for bool {
    #[inline]
    fn to_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value != 0.0
    }
}
