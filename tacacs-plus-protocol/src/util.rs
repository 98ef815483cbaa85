//! Small helpers shared across packet body implementations.

use core::iter::zip;

/// XORs `pad` into `output` in place, stopping at the shorter of the two slices.
pub(crate) fn xor_slices(output: &mut [u8], pad: &[u8]) {
    for (out, pad) in zip(output, pad) {
        *out ^= pad;
    }
}
