/// Writes a u64 as an unsigned LEB128 varint.
pub fn write_uvarint<W: std::io::Write>(value: u64, writer: &mut W) -> std::io::Result<()> {
    let mut remaining = value;
    while remaining >= 0x80 {
        writer.write_all(&[(remaining as u8) | 0x80])?;
        remaining >>= 7;
    }
    writer.write_all(&[remaining as u8])?;

    Ok(())
}
