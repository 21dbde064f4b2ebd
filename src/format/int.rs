//! Integer formatter: spec.md §4.1, ported from `writeInteger()` in
//! `examples/original_source/src/fwrite.c`.

/// Writes a signed 64-bit integer in decimal ASCII into `buf[*pos..]` and advances
/// `*pos` past it. `0` writes exactly `"0"`; negative values get a leading `-`.
/// No missing-value handling -- callers check for sentinels before calling this.
///
/// # Panics
/// Debug builds assert the caller reserved enough room; this mirrors spec.md §9's
/// guidance to assert the `L`-bound invariant in debug builds rather than bounds-check
/// every byte in release.
pub fn write_int(buf: &mut [u8], pos: &mut usize, mut x: i64) {
    let start = *pos;
    if x == 0 {
        buf[*pos] = b'0';
        *pos += 1;
        return;
    }
    if x < 0 {
        buf[*pos] = b'-';
        *pos += 1;
        // i64::MIN negates to itself; the only caller-visible int64 that can hit this
        // is already filtered out as the NA sentinel before reaching here.
        x = -x;
    }
    let digits_start = *pos;
    while x > 0 {
        buf[*pos] = b'0' + (x % 10) as u8;
        x /= 10;
        *pos += 1;
    }
    buf[digits_start..*pos].reverse();
    debug_assert!(*pos > start);
}

/// Platform-formatted fallback used when `turbo = false`: decimal, no thousands
/// separators, equivalent to `%d`/`%lld`.
pub fn write_int_fallback(buf: &mut [u8], pos: &mut usize, x: i64) {
    let s = x.to_string();
    buf[*pos..*pos + s.len()].copy_from_slice(s.as_bytes());
    *pos += s.len();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(x: i64) -> String {
        let mut buf = vec![0u8; 32];
        let mut pos = 0;
        write_int(&mut buf, &mut pos, x);
        String::from_utf8(buf[..pos].to_vec()).unwrap()
    }

    #[test]
    fn zero_is_exactly_zero() {
        assert_eq!(format(0), "0");
    }

    #[test]
    fn positive_and_negative() {
        assert_eq!(format(1), "1");
        assert_eq!(format(-7), "-7");
        assert_eq!(format(30460), "30460");
        assert_eq!(format(-30460), "-30460");
    }

    #[test]
    fn extremes() {
        assert_eq!(format(i64::MAX), i64::MAX.to_string());
        assert_eq!(format(-(i64::MAX)), format!("-{}", i64::MAX));
    }

    #[test]
    fn fallback_matches_turbo() {
        for x in [0i64, 1, -1, 30460, -30460, i64::MAX] {
            let mut a = vec![0u8; 32];
            let mut pa = 0;
            write_int(&mut a, &mut pa, x);

            let mut b = vec![0u8; 32];
            let mut pb = 0;
            write_int_fallback(&mut b, &mut pb, x);

            assert_eq!(a[..pa], b[..pb]);
        }
    }
}
