//! Geometric primitives.

use core::ops::{Add, Mul, Neg};
use serde::{Deserialize, Serialize};

macro_rules! impl_ty {
    ($t:tt, ($($dim:ident: $dty:ty, $dti:tt),+)) => {
        impl<T> $t<T> {
            pub const fn new($($dim: $dty,)+) -> Self {
                Self { $($dim,)+ }
            }
        }

        impl<T> Add<Self> for $t<T> where T: Add<T, Output = T> {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self {
                    $($dim: self.$dim + rhs.$dim,)+
                }
            }
        }

        impl<T> From<($($dty,)+)> for $t<T> {
            fn from(this: ($($dty,)+)) -> Self {
                Self::new($(this.$dti,)+)
            }
        }

        impl<T> From<$t<T>> for ($($dty,)+) {
            fn from(this: $t<T>) -> Self {
                ($(this.$dim,)+)
            }
        }
    }
}

/// A point (or offset) on the playfield grid. `y` grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point2<T> {
    pub x: T,
    pub y: T,
}

impl_ty!(Point2, (x: T, 0, y: T, 1));

impl<T> Point2<T>
where
    T: Mul<T, Output = T> + Add<T, Output = T>,
{
    fn dot(self, rhs: Self) -> T {
        self.x * rhs.x + self.y * rhs.y
    }
}

/// A 2×2 matrix, stored as its two columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Matrix2<T> {
    pub x: Point2<T>,
    pub y: Point2<T>,
}

impl_ty!(Matrix2, (x: Point2<T>, 0, y: Point2<T>, 1));

impl<T> Matrix2<T> {
    fn transpose(self) -> Self {
        Matrix2 {
            x: (self.x.x, self.y.x).into(),
            y: (self.x.y, self.y.y).into(),
        }
    }
}

pub trait MulIdentity {
    fn one() -> Self;
}
pub trait AddIdentity {
    fn zero() -> Self;
}

macro_rules! impl_mul_add_ident {
    ($t:ty, $one:expr, $zero:expr) => {
        impl MulIdentity for $t {
            fn one() -> Self {
                $one
            }
        }
        impl AddIdentity for $t {
            fn zero() -> Self {
                $zero
            }
        }
    };
}

impl_mul_add_ident!(isize, 1, 0);

impl<T> Matrix2<T>
where
    T: MulIdentity + AddIdentity + Neg<Output = T>,
{
    /// The clockwise quarter turn: maps `(x, y)` to `(y, -x)`.
    pub fn cw() -> Self {
        ((T::zero(), -T::one()).into(), (T::one(), T::zero()).into()).into()
    }
}

impl<T> Mul<Point2<T>> for Matrix2<T>
where
    T: Add<T, Output = T> + Mul<T, Output = T> + Copy,
{
    type Output = Point2<T>;
    fn mul(self, rhs: Point2<T>) -> Point2<T> {
        let lhs = self.transpose();
        Point2 {
            x: lhs.x.dot(rhs),
            y: lhs.y.dot(rhs),
        }
    }
}

#[test]
fn matrix_vector_multiplication() {
    let a: Matrix2<isize> = ((-1, 2).into(), (4, 5).into()).into();
    let a_t: Matrix2<isize> = ((-1, 4).into(), (2, 5).into()).into();
    let c: Point2<isize> = (1, -4).into();
    let ac: Point2<isize> = (-17, -18).into();

    assert_eq!(a.transpose(), a_t, "transposed matrix is wrong");
    assert_eq!(c.dot(c), 17, "inner product is wrong");
    assert_eq!(a * c, ac, "matrix vector mult is wrong");
}

#[test]
fn clockwise_quarter_turn() {
    let cw = Matrix2::<isize>::cw();
    assert_eq!(cw * Point2::new(1, 0), Point2::new(0, -1));
    assert_eq!(cw * Point2::new(0, 1), Point2::new(1, 0));
    assert_eq!(cw * Point2::new(-1, 1), Point2::new(1, 1));

    let p = Point2::new(2, -1);
    assert_eq!(cw * (cw * (cw * (cw * p))), p);
}
