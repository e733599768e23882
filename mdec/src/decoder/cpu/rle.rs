//! Run-length token dequantization

/// Zig-zag scan order as `(x, y)` frequency positions, indexed by scan index.
const DEZIGZAG_MAPPING: [(u8, u8); 64] = [
    (0, 0),
    (1, 0),
    (0, 1),
    (0, 2),
    (1, 1),
    (2, 0),
    (3, 0),
    (2, 1),
    (1, 2),
    (0, 3),
    (0, 4),
    (1, 3),
    (2, 2),
    (3, 1),
    (4, 0),
    (5, 0),
    (4, 1),
    (3, 2),
    (2, 3),
    (1, 4),
    (0, 5),
    (0, 6),
    (1, 5),
    (2, 4),
    (3, 3),
    (4, 2),
    (5, 1),
    (6, 0),
    (7, 0),
    (6, 1),
    (5, 2),
    (4, 3),
    (3, 4),
    (2, 5),
    (1, 6),
    (0, 7),
    (1, 7),
    (2, 6),
    (3, 5),
    (4, 4),
    (5, 3),
    (6, 2),
    (7, 1),
    (7, 2),
    (6, 3),
    (5, 4),
    (4, 5),
    (3, 6),
    (2, 7),
    (3, 7),
    (4, 6),
    (5, 5),
    (6, 4),
    (7, 3),
    (7, 4),
    (6, 5),
    (5, 6),
    (4, 7),
    (5, 7),
    (6, 6),
    (7, 5),
    (7, 6),
    (6, 7),
    (7, 7),
];

lazy_static! {
    /// Row-major (x + y*8) block position of each scan index.
    pub static ref ZIGZAG_SCAN: [usize; 64] =
        DEZIGZAG_MAPPING.map(|(x, y)| x as usize + y as usize * 8);
}

/// Smallest and largest coefficient the dequantizer can produce.
const COEFFICIENT_RANGE: (i32, i32) = (-0x400, 0x3FF);

/// Interpret the low 10 bits of a token as a signed amplitude.
pub fn sign_extend_10(token: u16) -> i32 {
    i32::from(((token << 6) as i16) >> 6)
}

/// Dequantize the leading (DC) amplitude of a block.
///
/// The DC term is only scaled by its quant table entry; a quantization
/// scale of zero switches the whole block to a fixed gain of two.
pub fn dequantize_dc(amplitude: i32, quant: u8, q_scale: u16) -> i16 {
    let value = if q_scale == 0 {
        amplitude * 2
    } else {
        amplitude * i32::from(quant)
    };

    value.clamp(COEFFICIENT_RANGE.0, COEFFICIENT_RANGE.1) as i16
}

/// Dequantize an AC amplitude at a given scan position.
pub fn dequantize_ac(amplitude: i32, quant: u8, q_scale: u16) -> i16 {
    let value = if q_scale == 0 {
        amplitude * 2
    } else {
        (amplitude * i32::from(quant) * i32::from(q_scale) + 4) / 8
    };

    value.clamp(COEFFICIENT_RANGE.0, COEFFICIENT_RANGE.1) as i16
}
