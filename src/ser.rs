//! This file implements the bit-packing routines behind ByteEncode and ByteDecode. Bits are
//! packed least-significant first, both within an element and across byte boundaries

// Algorithm 6, ByteDecode (without the final reduction mod q)
/// Unpacks the given bitstring into a u16 array. Every element of the array gets `bits_per_elem`
/// bits (must be ≤ 12), placed in the lower bits of the word.
pub(crate) fn byte_decode<const N: usize>(bytes: &[u8], bits_per_elem: usize) -> [u16; N] {
    debug_assert!(0 < bits_per_elem && bits_per_elem <= 12);
    debug_assert_eq!(bytes.len(), bits_per_elem * N / 8);

    // We only want the lower bits_per_elem bits to be set in any elem of our output
    let bitmask = (1u16 << bits_per_elem) - 1;

    let mut out = [0u16; N];
    let mut bit_idx = 0;
    while bit_idx < bits_per_elem * N {
        let byte_idx = bit_idx / 8;
        let elem_idx = bit_idx / bits_per_elem;
        let bit_in_byte = bit_idx % 8;
        let bit_in_elem = bit_idx % bits_per_elem;

        // Shift the byte so the first unread bit is the lowest bit, then line it up with the
        // first unwritten bit of the element
        let chunk = (bytes[byte_idx] as u16) >> bit_in_byte;
        out[elem_idx] |= chunk << bit_in_elem;
        out[elem_idx] &= bitmask;

        // We consumed whichever ran out first: the rest of the byte, or the rest of the element
        bit_idx += core::cmp::min(8 - bit_in_byte, bits_per_elem - bit_in_elem);
    }

    out
}

// Algorithm 5, ByteEncode
/// Packs the given u16 array into a bitstring. Only the lower `bits_per_elem` bits (must be ≤ 12)
/// of every element are written.
pub(crate) fn byte_encode(data: &[u16], out_buf: &mut [u8], bits_per_elem: usize) {
    debug_assert!(0 < bits_per_elem && bits_per_elem <= 12);
    debug_assert_eq!(out_buf.len(), bits_per_elem * data.len() / 8);

    // Since we use OR to set the output bits, we must clear the buffer at the beginning
    out_buf.fill(0);

    let bitmask = (1u16 << bits_per_elem) - 1;

    let mut bit_idx = 0;
    while bit_idx < bits_per_elem * data.len() {
        let byte_idx = bit_idx / 8;
        let elem_idx = bit_idx / bits_per_elem;
        let bit_in_byte = bit_idx % 8;
        let bit_in_elem = bit_idx % bits_per_elem;

        // Drop the bits of the element that were already written, then line the rest up with the
        // first unused bit of the byte. Anything shifted past bit 7 is written on a later pass
        let chunk = ((data[elem_idx] & bitmask) >> bit_in_elem) as u8;
        out_buf[byte_idx] |= chunk << bit_in_byte;

        bit_idx += core::cmp::min(8 - bit_in_byte, bits_per_elem - bit_in_elem);
    }
}
