//! Lectura de enteros y firmas en buffers binarios sin pánicos por rango.

pub fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

pub fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset.checked_add(2)?)
        .map(|bytes| u16::from_be_bytes([bytes[0], bytes[1]]))
}

pub fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset.checked_add(2)?)
        .map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]]))
}

pub fn read_u24_le(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset.checked_add(3)?)
        .map(|bytes| u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
}

pub fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset.checked_add(4)?)
        .map(|bytes| u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset.checked_add(4)?)
        .map(|bytes| u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

pub fn read_i32_le(data: &[u8], offset: usize) -> Option<i32> {
    read_u32_le(data, offset).map(|value| value as i32)
}

pub fn read_u64_be(data: &[u8], offset: usize) -> Option<u64> {
    data.get(offset..offset.checked_add(8)?).map(|bytes| {
        u64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ])
    })
}

/// Código de cuatro caracteres (`ftyp`, `VP8X`, ...), sin espacios de relleno.
pub fn read_fourcc(data: &[u8], offset: usize) -> Option<String> {
    let slice = data.get(offset..offset.checked_add(4)?)?;
    Some(String::from_utf8_lossy(slice).trim().to_string())
}

/// Texto Latin-1/ASCII terminado en NUL.
pub fn read_c_string(data: &[u8]) -> String {
    let end = data.iter().position(|&byte| byte == 0).unwrap_or(data.len());
    data[..end].iter().map(|&byte| char::from(byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_bounds_checked() {
        let data = [0x01, 0x02, 0x03];
        assert_eq!(read_u16_be(&data, 1), Some(0x0203));
        assert_eq!(read_u16_le(&data, 1), Some(0x0302));
        assert_eq!(read_u32_be(&data, 0), None);
        assert_eq!(read_u24_le(&data, 0), Some(0x030201));
        assert_eq!(read_u16_be(&data, usize::MAX), None);
    }

    #[test]
    fn fourcc_and_c_strings() {
        assert_eq!(read_fourcc(b"VP8 ....", 0).as_deref(), Some("VP8"));
        assert_eq!(read_c_string(b"Title\0rest"), "Title");
        assert_eq!(read_c_string(b"caf\xe9"), "café");
    }
}
