// Generates the `EXPSIG`/`EXPPOW` lookup tables consumed by `src/format/float.rs`.
//
// For each biased IEEE-754 double exponent `e` in `0..2048`, computes the decimal
// significand and base-10 exponent of `2^(e-1023)`. Every power of two has a finite,
// exact decimal expansion (2^n is an integer for n >= 0; 2^-n == 5^n / 10^n for n > 0),
// so this is done with exact big-integer arithmetic rather than the `long double`
// arithmetic the original C generator used. The resulting significands are written
// out as full-precision decimal literals and left for rustc to parse into `f64` at
// compile time, which rounds each one to the nearest representable double exactly
// once -- no runtime dependency on extended precision.

use num_bigint::BigUint;
use std::env;
use std::fmt::Write as _;
use std::path::Path;

fn decimal_digits(n: &BigUint) -> String {
    n.to_str_radix(10)
}

/// Splits an exact decimal digit string `d_1 d_2 ... d_l` (no leading zero) into
/// (significand string in `[1, 10)`, power-of-ten exponent such that
/// `value == sig * 10^pw`).
fn normalize(digits: &str, extra_pw: i32) -> (String, i32) {
    let l = digits.len() as i32;
    let pw = l - 1 + extra_pw;
    let sig = if digits.len() == 1 {
        digits.to_string()
    } else {
        format!("{}.{}", &digits[0..1], &digits[1..])
    };
    (sig, pw)
}

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest = Path::new(&out_dir).join("fwrite_exp_tables.rs");

    let mut out = String::new();
    writeln!(out, "pub(crate) static EXPSIG: [f64; 2048] = [").unwrap();
    let mut pows = Vec::with_capacity(2048);
    for e in 0u32..2048 {
        let exp = e as i64 - 1023;
        let (sig, pw) = if exp >= 0 {
            let value = BigUint::from(2u32).pow(exp as u32);
            normalize(&decimal_digits(&value), 0)
        } else {
            let k = (-exp) as u32;
            let value = BigUint::from(5u32).pow(k);
            normalize(&decimal_digits(&value), -(k as i32))
        };
        writeln!(out, "    {}_f64,", sig).unwrap();
        pows.push(pw);
    }
    writeln!(out, "];").unwrap();

    writeln!(out, "pub(crate) static EXPPOW: [i32; 2048] = [").unwrap();
    for pw in pows {
        writeln!(out, "    {},", pw).unwrap();
    }
    writeln!(out, "];").unwrap();

    std::fs::write(&dest, out).expect("failed to write generated exponent tables");
    println!("cargo:rerun-if-changed=build.rs");
}
