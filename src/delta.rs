use nom::sequence::tuple;

use crate::cursor::read_u32_le;
use crate::errors::ParseResult;
use crate::uvarint::read_uvarint;

pub use crate::encoder::delta_encoder::write_delta_stream;

/// Upper bound on `metrics * samples`, checked before the delta matrix is
/// allocated. Real chunks hold a few hundred metrics over 300 samples.
pub const MAX_MATRIX_VALUES: u64 = 1_000_000;

/// Reads the metric and sample counts from the start of the chunk tail.
pub fn read_delta_counts(input: &[u8]) -> ParseResult<(u32, u32)> {
    tuple((read_u32_le, read_u32_le))(input)
}

/// Expands a zero-run-compressed varint stream into exactly `count`
/// deltas.
///
/// A zero varint always consumes its follower as the number of additional
/// zeros, so the pair `0, k` stands for `k + 1` zero deltas. A run may
/// overshoot `count`; the surplus zeros are dropped.
pub fn read_delta_stream(input: &[u8], count: usize) -> ParseResult<Vec<i64>> {
    let mut deltas: Vec<i64> = Vec::with_capacity(count);
    let mut remaining_input = input;
    let mut zeros_pending: u64 = 0;

    while deltas.len() < count {
        if zeros_pending > 0 {
            zeros_pending -= 1;
            deltas.push(0);
            continue;
        }

        let (rest, raw) = read_uvarint(remaining_input)?;
        remaining_input = rest;
        if raw == 0 {
            let (rest, run) = read_uvarint(remaining_input)?;
            remaining_input = rest;
            zeros_pending = run;
        }
        // Negative deltas arrive as large unsigned values; the i64
        // reinterpretation restores the sign.
        deltas.push(raw as i64);
    }

    Ok((remaining_input, deltas))
}

/// Turns the metric-major delta matrix into restored cumulative values,
/// in place.
///
/// Column `m` occupies `deltas[m * num_samples ..][.. num_samples]`. Its
/// first delta applies to `bases[m]`; every later sample adds its delta
/// to the previous restored value. Arithmetic wraps, matching the
/// producer's unsigned bit-pattern encoding.
pub fn restore_columns(deltas: &mut [i64], bases: &[i64], num_samples: usize) {
    if num_samples == 0 {
        return;
    }
    for (metric, base) in bases.iter().enumerate() {
        let start = metric * num_samples;
        deltas[start] = deltas[start].wrapping_add(*base);
        for sample in 1..num_samples {
            deltas[start + sample] =
                deltas[start + sample].wrapping_add(deltas[start + sample - 1]);
        }
    }
}
