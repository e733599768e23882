//! Inverse discrete cosine transform

/// Given a dequantized coefficient block, transform it to the spatial domain.
///
/// Both `block` and `scale_table` are 8x8 row-major (x + y*8). The scale
/// table holds the transform's basis functions in signed 1.15 fixed point,
/// one frequency per row. The transform is applied as two separable passes
/// in 64-bit precision; the result is rounded, wrapped to 9 bits and then
/// saturated to the signed 8-bit sample range, replacing `block` in place.
pub fn idct_block(block: &mut [i16; 64], scale_table: &[i16; 64]) {
    let mut columns = [0i64; 64];

    for x in 0..8 {
        for y in 0..8 {
            columns[x + y * 8] = (0..8)
                .map(|u| i64::from(block[u * 8 + x]) * i64::from(scale_table[u * 8 + y]))
                .sum();
        }
    }

    for x in 0..8 {
        for y in 0..8 {
            let sum: i64 = (0..8)
                .map(|u| columns[u + y * 8] * i64::from(scale_table[u * 8 + x]))
                .sum();

            let rounded = ((sum >> 32) + ((sum >> 31) & 1)) as i32;
            let wrapped = (rounded << 23) >> 23;

            block[x + y * 8] = wrapped.clamp(-128, 127) as i16;
        }
    }
}
