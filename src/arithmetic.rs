// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{NonZero, Uint};
use subtle::{ConstantTimeEq, CtOption};

use crate::{AsNaturalNumber, AsRingElement};

/// Euclid's algorithm.
///
/// Runs in variable time, so it is only applied to public values and to key-generation candidates.
pub(crate) fn gcd<const LIMBS: usize>(a: &Uint<LIMBS>, b: &Uint<LIMBS>) -> Uint<LIMBS> {
    let (mut a, mut b) = (*a, *b);

    while let Some(divisor) = Option::<NonZero<Uint<LIMBS>>>::from(NonZero::new(b)) {
        (a, b) = (b, a % divisor);
    }

    a
}

/// $ lcm(a, b) = \frac{a}{gcd(a, b)} \cdot b $, or `None` if either is zero.
///
/// The product must fit in `LIMBS`; callers widen their operands beforehand.
pub(crate) fn lcm<const LIMBS: usize>(a: &Uint<LIMBS>, b: &Uint<LIMBS>) -> Option<Uint<LIMBS>> {
    if *a == Uint::ZERO || *b == Uint::ZERO {
        return None;
    }

    let divisor = Option::<NonZero<Uint<LIMBS>>>::from(NonZero::new(gcd(a, b)))?;

    Some((*a / divisor).wrapping_mul(b))
}

/// The inverse of `x` in the ring described by `params`.
///
/// `DynResidue::invert()` returns an unspecified value for non-units, so the candidate inverse is
/// multiplied back and compared against one in constant time.
pub(crate) fn invert<const LIMBS: usize>(
    x: &Uint<LIMBS>,
    params: &DynResidueParams<LIMBS>,
) -> CtOption<Uint<LIMBS>> {
    let element = x.as_ring_element(params);
    let (inverse, _) = element.invert();

    let is_unit = (element * inverse)
        .as_natural_number()
        .ct_eq(&DynResidue::one(*params).as_natural_number());

    CtOption::new(inverse.as_natural_number(), is_unit)
}

#[cfg(test)]
mod tests {
    use crypto_bigint::U64;
    use rstest::rstest;

    use super::*;
    use crate::test_exports::{MU, N, LAMBDA};
    use crate::PlaintextRingParams;

    #[rstest]
    #[case(12, 18, 6)]
    #[case(17, 5, 1)]
    #[case(0, 9, 9)]
    #[case(9, 0, 9)]
    #[case(1 << 40, 1 << 12, 1 << 12)]
    fn computes_gcd(#[case] a: u64, #[case] b: u64, #[case] expected: u64) {
        assert_eq!(
            gcd(&U64::from(a), &U64::from(b)),
            U64::from(expected)
        );
    }

    #[rstest]
    #[case(4, 6, Some(12))]
    #[case(7, 3, Some(21))]
    #[case(10, 10, Some(10))]
    #[case(0, 10, None)]
    fn computes_lcm(#[case] a: u64, #[case] b: u64, #[case] expected: Option<u64>) {
        assert_eq!(
            lcm(&U64::from(a), &U64::from(b)),
            expected.map(U64::from)
        );
    }

    #[test]
    fn inverts_units() {
        let params = PlaintextRingParams::new(&N);

        let inverse: Option<_> = invert(&LAMBDA, &params).into();

        assert_eq!(inverse, Some(MU));
    }

    #[test]
    fn refuses_to_invert_non_units() {
        let params = PlaintextRingParams::new(&U64::from(15u8).resize());

        assert!(bool::from(invert(&U64::from(6u8).resize(), &params).is_none()));
        assert!(bool::from(invert(&U64::ZERO.resize(), &params).is_none()));
        assert!(bool::from(invert(&U64::from(7u8).resize(), &params).is_some()));
    }
}
