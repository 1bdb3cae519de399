use super::uvarint_encoder::write_uvarint;

/// Writes a delta slice as a zero-run-compressed varint stream.
///
/// Every zero varint must carry a follower count, so a run of `r` zeros
/// becomes the two varints `0, r - 1`. Non-zero deltas are written as the
/// u64 bit pattern of the signed value.
pub fn write_delta_stream<W: std::io::Write>(deltas: &[i64], writer: &mut W) -> std::io::Result<()> {
    let mut index = 0;
    while index < deltas.len() {
        let delta = deltas[index];
        if delta == 0 {
            let mut run = 1;
            while index + run < deltas.len() && deltas[index + run] == 0 {
                run += 1;
            }
            write_uvarint(0, writer)?;
            write_uvarint(run as u64 - 1, writer)?;
            index += run;
        } else {
            write_uvarint(delta as u64, writer)?;
            index += 1;
        }
    }

    Ok(())
}
