//! Float formatter: spec.md §4.2, ported from `writeNumeric()` in
//! `examples/original_source/src/fwrite.c`. This is the hardest subcomponent --
//! bit-exact IEEE-754 decimal rendering with no `log`/`pow`/`ldexp`/`sprintf` calls.

const NUM_SF: i32 = 15;
const SIZE_SF: f64 = 1_000_000_000_000_000.0; // 10^NUM_SF

/// `sigparts[i] = 2^-i` for `i` in `1..=52`, `sigparts[0] = 0.0` to let the
/// mantissa-reconstruction loop add unconditionally without a branch on bit value.
/// Every entry is an exact power of two, so unlike `EXPSIG`/`EXPPOW` these don't need
/// a big-integer build step -- they're exact in `f64` by construction.
const fn build_sigparts() -> [f64; 53] {
    let mut arr = [0.0f64; 53];
    let mut i = 1usize;
    while i <= 52 {
        arr[i] = 1.0 / (1u64 << i) as f64;
        i += 1;
    }
    arr
}
static SIGPARTS: [f64; 53] = build_sigparts();

// Generated at build time by `build.rs` using exact big-integer arithmetic:
// `EXPSIG[e]` (decimal significand in [1, 10)) and `EXPPOW[e]` (base-10 exponent)
// of `2^(e - 1023)`, for every biased double exponent `e` in `0..2048`.
include!(concat!(env!("OUT_DIR"), "/fwrite_exp_tables.rs"));

/// Writes a finite or non-finite `f64` into `buf[*pos..]`, advancing `*pos`.
///
/// `NaN` emits `na_str`. `+Inf`/`-Inf` emit `"Inf"`/`"-Inf"`. `0.0` and `-0.0` both
/// emit `"0"`. Otherwise emits decimal or scientific form, whichever is shorter,
/// rounded to 15 significant figures, with `dec_sep` as the decimal point.
pub fn write_float(buf: &mut [u8], pos: &mut usize, x: f64, dec_sep: u8, na_str: &[u8]) {
    if x.is_nan() {
        buf[*pos..*pos + na_str.len()].copy_from_slice(na_str);
        *pos += na_str.len();
        return;
    }
    if x.is_infinite() {
        let s: &[u8] = if x > 0.0 { b"Inf" } else { b"-Inf" };
        buf[*pos..*pos + s.len()].copy_from_slice(s);
        *pos += s.len();
        return;
    }
    if x == 0.0 {
        // catches both +0.0 and -0.0
        buf[*pos] = b'0';
        *pos += 1;
        return;
    }

    let mut x = x;
    if x < 0.0 {
        buf[*pos] = b'-';
        *pos += 1;
        x = -x;
    }

    let bits = x.to_bits();
    let mut fraction = bits & 0xF_FFFF_FFFF_FFFF; // low 52 bits
    let exponent = ((bits >> 52) & 0x7FF) as usize; // [0, 2047]

    // Reconstruct 1 + sum(f_i * 2^-i), smallest term first for accuracy, skipping
    // whole zero bytes of the mantissa up front.
    let mut acc = 0.0f64;
    if fraction != 0 {
        let mut i: i32 = 52;
        while fraction & 0xFF == 0 {
            fraction >>= 8;
            i -= 8;
        }
        while fraction != 0 {
            if fraction & 1 != 0 {
                acc += SIGPARTS[i as usize];
            }
            i -= 1;
            fraction >>= 1;
        }
    }

    let sig = EXPSIG[exponent];
    let mut exp = EXPPOW[exponent];
    let mut y = (1.0 + acc) * sig;
    if y >= 10.0 {
        y /= 10.0;
        exp += 1;
    }

    // 16-digit integer: 15 significant figures plus one rounding digit.
    let mut l: u64 = (y * SIZE_SF) as u64;
    if l % 10 >= 5 {
        l += 10;
    }
    l /= 10;

    let base = *pos;
    if l == 0 {
        // Defensive: unreachable in practice since y is always in [1, 10), kept to
        // mirror the original's handling exactly.
        if base > 0 && buf[base - 1] == b'-' {
            *pos -= 1;
        }
        buf[*pos] = b'0';
        *pos += 1;
        return;
    }

    let mut trail_zero = 0i32;
    while l % 10 == 0 {
        l /= 10;
        trail_zero += 1;
    }
    let mut sf = NUM_SF - trail_zero;
    if sf == 0 {
        // l rounded all the way up to 10^NUM_SF, e.g. 99999995 -> 100000000.
        sf = 1;
        exp += 1;
    }

    let write = |buf: &mut [u8], rel: isize, byte: u8| {
        buf[(base as isize + rel) as usize] = byte;
    };

    let dr_init = sf - exp - 1;
    let width;
    let mut dr;
    let mut dl0;
    if dr_init <= 0 {
        dl0 = -dr_init;
        dr = 0;
        width = sf + dl0;
    } else {
        dr = dr_init;
        if sf > dr {
            dl0 = 0;
            width = sf + 1;
        } else {
            dl0 = 1;
            width = dr + 1 + dl0;
        }
    }

    let sci_cost = sf + i32::from(sf > 1) + 2 + if exp.abs() > 99 { 3 } else { 2 };

    if width <= sci_cost {
        // Decimal format: e.g. 3.1416, 30460, 0.0072.
        let mut rel: isize = (width - 1) as isize;
        if dr > 0 {
            while dr > 0 && sf > 0 {
                write(buf, rel, b'0' + (l % 10) as u8);
                l /= 10;
                rel -= 1;
                dr -= 1;
                sf -= 1;
            }
            while dr > 0 {
                write(buf, rel, b'0');
                rel -= 1;
                dr -= 1;
            }
            write(buf, rel, dec_sep);
            rel -= 1;
        }
        while dl0 > 0 {
            write(buf, rel, b'0');
            rel -= 1;
            dl0 -= 1;
        }
        while sf > 0 {
            write(buf, rel, b'0' + (l % 10) as u8);
            l /= 10;
            rel -= 1;
            sf -= 1;
        }
        *pos = base + width as usize;
    } else {
        // Scientific format: e.g. 1e-300, 1.234e+56.
        let mut rel: isize = sf as isize;
        let mut i = sf;
        while i > 1 {
            write(buf, rel, b'0' + (l % 10) as u8);
            l /= 10;
            rel -= 1;
            i -= 1;
        }
        if sf == 1 {
            rel -= 1;
        } else {
            write(buf, rel, dec_sep);
            rel -= 1;
        }
        write(buf, rel, b'0' + (l % 10) as u8);
        rel += sf as isize + i32::from(sf > 1) as isize;
        write(buf, rel, b'e');
        rel += 1;
        if exp < 0 {
            write(buf, rel, b'-');
            exp = -exp;
        } else {
            write(buf, rel, b'+');
        }
        rel += 1;
        if exp < 100 {
            write(buf, rel, b'0' + (exp / 10) as u8);
            write(buf, rel + 1, b'0' + (exp % 10) as u8);
            rel += 2;
        } else {
            write(buf, rel, b'0' + (exp / 100) as u8);
            write(buf, rel + 1, b'0' + ((exp / 10) % 10) as u8);
            write(buf, rel + 2, b'0' + (exp % 10) as u8);
            rel += 3;
        }
        *pos = (base as isize + rel) as usize;
    }
}

/// Platform-formatted fallback used when `turbo = false`: `NaN` still emits `na_str`;
/// otherwise equivalent to `%.15g`. Unlike [`write_float`], this path is free to use
/// `log10`/`pow` since it stands in for the C library's own formatter.
pub fn write_float_fallback(buf: &mut [u8], pos: &mut usize, x: f64, na_str: &[u8]) {
    if x.is_nan() {
        buf[*pos..*pos + na_str.len()].copy_from_slice(na_str);
        *pos += na_str.len();
        return;
    }
    let s = format_g15(x);
    buf[*pos..*pos + s.len()].copy_from_slice(s.as_bytes());
    *pos += s.len();
}

fn format_g15(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let exp = x.abs().log10().floor() as i32;
    if (-4..15).contains(&exp) {
        let decimals = (14 - exp).max(0) as usize;
        let s = format!("{:.*}", decimals, x);
        let s = if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s
        };
        if s.is_empty() || s == "-" {
            "0".to_string()
        } else {
            s
        }
    } else {
        let s = format!("{:.14e}", x);
        let (mantissa, exponent) = s.split_once('e').unwrap();
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        let exp_val: i32 = exponent.parse().unwrap();
        format!(
            "{}e{}{:02}",
            mantissa,
            if exp_val < 0 { "-" } else { "+" },
            exp_val.abs()
        )
    }
}
