//! Sample type abstraction shared by the transform and the crossfade engine.
//!
//! Both layers are generic over [`Float`] so a single implementation serves
//! `f32` and `f64` streams. `no_std` builds route trigonometry through
//! [`libm`]; `std` builds use the inherent float methods.

#[cfg(not(feature = "std"))]
use libm::{cos, cosf, sin, sinf};

// Minimal float trait for the generic transform (no_std, no num-traits)
pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + core::fmt::Debug
    + core::ops::Add<Output = Self>
    + core::ops::Sub<Output = Self>
    + core::ops::Mul<Output = Self>
    + core::ops::Div<Output = Self>
    + core::ops::Neg<Output = Self>
    + core::ops::AddAssign
    + core::ops::SubAssign
    + core::ops::DivAssign
    + 'static
{
    fn zero() -> Self;
    /// Convert a sample count into the float type.
    ///
    /// Window sizes are capped well below `2^24`, so every count the engine
    /// converts is exactly representable in both `f32` and `f64`.
    fn from_usize(x: usize) -> Self;
    fn cos(self) -> Self;
    fn sin(self) -> Self;
    fn sin_cos(self) -> (Self, Self) {
        (self.sin(), self.cos())
    }
    fn pi() -> Self;
}

/// `f32` samples, for streams where memory matters more than precision.
///
/// # Note
/// `#[allow(unconditional_recursion)]` silences a false positive: `f32::cos(self)`
/// resolves to the inherent method, not to the trait method of the same name.
#[allow(unconditional_recursion)]
impl Float for f32 {
    fn zero() -> Self {
        0.0
    }
    fn from_usize(x: usize) -> Self {
        x as f32
    }
    #[cfg(feature = "std")]
    fn cos(self) -> Self {
        f32::cos(self)
    }
    #[cfg(not(feature = "std"))]
    fn cos(self) -> Self {
        cosf(self)
    }
    #[cfg(feature = "std")]
    fn sin(self) -> Self {
        f32::sin(self)
    }
    #[cfg(not(feature = "std"))]
    fn sin(self) -> Self {
        sinf(self)
    }
    #[cfg(feature = "std")]
    fn sin_cos(self) -> (Self, Self) {
        f32::sin_cos(self)
    }
    fn pi() -> Self {
        core::f32::consts::PI
    }
}

/// `f64` samples, the precision the crossfade engine is tuned for.
///
/// # Note
/// Same false-positive suppression as the `f32` implementation.
#[allow(unconditional_recursion)]
impl Float for f64 {
    fn zero() -> Self {
        0.0
    }
    fn from_usize(x: usize) -> Self {
        x as f64
    }
    #[cfg(feature = "std")]
    fn cos(self) -> Self {
        f64::cos(self)
    }
    #[cfg(not(feature = "std"))]
    fn cos(self) -> Self {
        cos(self)
    }
    #[cfg(feature = "std")]
    fn sin(self) -> Self {
        f64::sin(self)
    }
    #[cfg(not(feature = "std"))]
    fn sin(self) -> Self {
        sin(self)
    }
    #[cfg(feature = "std")]
    fn sin_cos(self) -> (Self, Self) {
        f64::sin_cos(self)
    }
    fn pi() -> Self {
        core::f64::consts::PI
    }
}
