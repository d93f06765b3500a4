//! printf-style template formatting.
//!
//! Templates are filled at runtime, so a directive without a matching argument,
//! or an argument of the wrong kind, cannot be rejected by the compiler. Instead of
//! failing, the output carries an inline marker and formatting carries on:
//!
//! | problem               | output                       |
//! |-----------------------|------------------------------|
//! | too few arguments     | `%!d(MISSING)`               |
//! | wrong type / verb     | `%!d(string=hello)`          |
//! | too many arguments    | `%!(EXTRA int=3, string=x)`  |
//! | `%` at end of input   | `%!(NOVERB)`                 |

use std::{borrow::Cow, fmt};

// Upper bound for width and precision, keeps a hostile template from allocating gigabytes.
const MAX_WIDTH: usize = 1 << 16;

/// A value substituted into a template.
#[derive(Clone)]
pub enum Arg<'a> {
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(Cow<'a, str>),
    Bool(bool),
    Char(char),
    Display(&'a dyn fmt::Display),
}

impl Arg<'_> {
    /// Name used for this argument inside mismatch markers.
    pub fn type_name(&self) -> &'static str {
        match self {
            Arg::Int(_) => "int",
            Arg::Uint(_) => "uint",
            Arg::Float(_) => "float64",
            Arg::Str(_) => "string",
            Arg::Bool(_) => "bool",
            Arg::Char(_) => "char",
            Arg::Display(_) => "value",
        }
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arg({}={})", self.type_name(), natural(self))
    }
}

macro_rules! impl_from {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Arg<'_> {
                fn from(value: $source) -> Self {
                    Arg::$variant(value as $target)
                }
            }
        )*
    };
}

impl_from!(Int as i64: i8, i16, i32, i64, isize);
impl_from!(Uint as u64: u8, u16, u32, u64, usize);
impl_from!(Float as f64: f32, f64);

impl From<bool> for Arg<'_> {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<char> for Arg<'_> {
    fn from(value: char) -> Self {
        Arg::Char(value)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Str(Cow::Borrowed(value))
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(value: &'a String) -> Self {
        Arg::Str(Cow::Borrowed(value.as_str()))
    }
}

impl From<String> for Arg<'_> {
    fn from(value: String) -> Self {
        Arg::Str(Cow::Owned(value))
    }
}

/// Formats `template` with `args`, consuming one argument per directive.
pub fn sprintf(template: &str, args: &[Arg<'_>]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.minus = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                '#' => spec.sharp = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = take_number(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }

        match args.get(next_arg) {
            Some(arg) => {
                next_arg += 1;
                format_arg(&mut out, verb, &spec, arg);
            }
            None => out.push_str(&format!("%!{}(MISSING)", verb)),
        }
    }

    if let Some(extra) = args.get(next_arg..).filter(|extra| !extra.is_empty()) {
        let listed: Vec<String> = extra
            .iter()
            .map(|arg| format!("{}={}", arg.type_name(), natural(arg)))
            .collect();
        out.push_str(&format!("%!(EXTRA {})", listed.join(", ")));
    }

    out
}

/// Shorthand for [`sprintf`] converting every argument with `Arg::from`.
#[macro_export]
macro_rules! sprintf {
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::sprintf($template, &[$($crate::Arg::from($arg)),*])
    };
}

#[derive(Default, Debug)]
struct Spec {
    minus: bool,
    plus: bool,
    space: bool,
    zero: bool,
    sharp: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

struct Piece {
    prefix: String,
    body: String,
    zero_pad: bool,
}

impl Piece {
    fn text(body: String) -> Self {
        Self {
            prefix: String::new(),
            body,
            zero_pad: false,
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        let value = number
            .unwrap_or(0)
            .saturating_mul(10)
            .saturating_add(digit as usize);
        number = Some(value.min(MAX_WIDTH));
    }
    number
}

fn format_arg(out: &mut String, verb: char, spec: &Spec, arg: &Arg<'_>) {
    let piece = match (verb, arg) {
        ('v' | 'd', Arg::Int(v)) => integer(spec, *v < 0, v.unsigned_abs(), 'd'),
        ('v' | 'd', Arg::Uint(v)) => integer(spec, false, *v, 'd'),
        ('b' | 'o' | 'x' | 'X', Arg::Int(v)) => integer(spec, *v < 0, v.unsigned_abs(), verb),
        ('b' | 'o' | 'x' | 'X', Arg::Uint(v)) => integer(spec, false, *v, verb),
        ('d' | 'b' | 'o' | 'x' | 'X', Arg::Char(c)) => integer(spec, false, u64::from(*c), verb),
        ('v' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G', Arg::Float(v)) => float(spec, *v, verb),
        ('v' | 's', Arg::Str(s)) => Piece::text(truncate(s, spec.precision)),
        ('v' | 's', Arg::Display(d)) => Piece::text(truncate(&d.to_string(), spec.precision)),
        ('x' | 'X', Arg::Str(s)) => hex_bytes(spec, s.as_bytes(), verb),
        ('q', Arg::Str(s)) => Piece::text(format!("{:?}", s)),
        ('q', Arg::Char(c)) => Piece::text(format!("{:?}", c)),
        ('q', Arg::Int(v)) => Piece::text(format!("{:?}", signed_code_point(*v))),
        ('q', Arg::Uint(v)) => Piece::text(format!("{:?}", code_point(*v))),
        ('v' | 'c', Arg::Char(c)) => Piece::text(c.to_string()),
        ('c', Arg::Int(v)) => Piece::text(signed_code_point(*v).to_string()),
        ('c', Arg::Uint(v)) => Piece::text(code_point(*v).to_string()),
        ('v' | 't', Arg::Bool(b)) => Piece::text(b.to_string()),
        _ => {
            out.push_str(&format!("%!{}({}={})", verb, arg.type_name(), natural(arg)));
            return;
        }
    };

    pad(out, spec, piece);
}

fn pad(out: &mut String, spec: &Spec, piece: Piece) {
    let len = piece.prefix.chars().count() + piece.body.chars().count();
    let fill = spec.width.unwrap_or(0).saturating_sub(len);

    if fill == 0 {
        out.push_str(&piece.prefix);
        out.push_str(&piece.body);
    } else if spec.minus {
        out.push_str(&piece.prefix);
        out.push_str(&piece.body);
        out.push_str(&" ".repeat(fill));
    } else if piece.zero_pad {
        out.push_str(&piece.prefix);
        out.push_str(&"0".repeat(fill));
        out.push_str(&piece.body);
    } else {
        out.push_str(&" ".repeat(fill));
        out.push_str(&piece.prefix);
        out.push_str(&piece.body);
    }
}

fn sign(spec: &Spec, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

fn integer(spec: &Spec, negative: bool, magnitude: u64, verb: char) -> Piece {
    let mut digits = match verb {
        'b' => format!("{:b}", magnitude),
        'o' => format!("{:o}", magnitude),
        'x' => format!("{:x}", magnitude),
        'X' => format!("{:X}", magnitude),
        _ => magnitude.to_string(),
    };
    if let Some(precision) = spec.precision {
        if digits.len() < precision {
            digits.insert_str(0, &"0".repeat(precision - digits.len()));
        }
    }

    let mut prefix = sign(spec, negative).to_string();
    if spec.sharp {
        prefix.push_str(match verb {
            'b' => "0b",
            'o' => "0",
            'x' => "0x",
            'X' => "0X",
            _ => "",
        });
    }

    Piece {
        prefix,
        body: digits,
        zero_pad: spec.zero && spec.precision.is_none(),
    }
}

fn float(spec: &Spec, value: f64, verb: char) -> Piece {
    if value.is_nan() {
        return Piece::text("NaN".to_string());
    }

    let negative = value.is_sign_negative();
    let abs = value.abs();
    if abs.is_infinite() {
        let prefix = if negative { "-" } else { "+" };
        return Piece {
            prefix: prefix.to_string(),
            body: "Inf".to_string(),
            zero_pad: false,
        };
    }

    let body = match verb {
        'f' | 'F' => format!("{:.*}", spec.precision.unwrap_or(6), abs),
        'e' | 'E' => exponent(&format!("{:.*e}", spec.precision.unwrap_or(6), abs)),
        _ => general(abs, spec.precision),
    };
    let body = if matches!(verb, 'E' | 'G') {
        body.to_uppercase()
    } else {
        body
    };

    Piece {
        prefix: sign(spec, negative).to_string(),
        body,
        zero_pad: spec.zero,
    }
}

// Rewrites Rust's `1.5e-7` exponent notation as `1.5e-07`.
fn exponent(scientific: &str) -> String {
    match scientific.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or_default();
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
        }
        None => scientific.to_string(),
    }
}

// Shortest representation, switching to exponent form for very large or small values.
fn general(abs: f64, precision: Option<usize>) -> String {
    let Some(precision) = precision else {
        if abs != 0.0 && !(1e-4..1e21).contains(&abs) {
            return exponent(&format!("{:e}", abs));
        }
        return abs.to_string();
    };

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, abs);
    let (mantissa, exp) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or_default();

    if exp < -4 || exp >= precision as i32 {
        exponent(&format!("{}e{}", trim_zeros(mantissa), exp))
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, abs)).to_string()
    }
}

fn trim_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn hex_bytes(spec: &Spec, bytes: &[u8], verb: char) -> Piece {
    let body: String = bytes
        .iter()
        .map(|b| {
            if verb == 'X' {
                format!("{:02X}", b)
            } else {
                format!("{:02x}", b)
            }
        })
        .collect();
    let prefix = match (spec.sharp, verb) {
        (true, 'X') => "0X",
        (true, _) => "0x",
        _ => "",
    };

    Piece {
        prefix: prefix.to_string(),
        body,
        zero_pad: false,
    }
}

// Negative values are never valid code points.
fn signed_code_point(value: i64) -> char {
    u64::try_from(value)
        .map(code_point)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn code_point(value: u64) -> char {
    u32::try_from(value)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn truncate(s: &str, precision: Option<usize>) -> String {
    match precision {
        Some(precision) => s.chars().take(precision).collect(),
        None => s.to_string(),
    }
}

fn natural(arg: &Arg<'_>) -> String {
    match arg {
        Arg::Int(v) => v.to_string(),
        Arg::Uint(v) => v.to_string(),
        Arg::Float(v) if v.is_nan() => "NaN".to_string(),
        Arg::Float(v) if v.is_infinite() => {
            let inf = if *v < 0.0 { "-Inf" } else { "+Inf" };
            inf.to_string()
        }
        Arg::Float(v) => {
            let sign = if v.is_sign_negative() { "-" } else { "" };
            format!("{}{}", sign, general(v.abs(), None))
        }
        Arg::Str(s) => s.to_string(),
        Arg::Bool(b) => b.to_string(),
        Arg::Char(c) => c.to_string(),
        Arg::Display(d) => d.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_in_order() {
        assert_eq!(sprintf!("value=%d", 42), "value=42");
        assert_eq!(
            sprintf!("%s has %d items, ok=%t", "cart", 3u8, true),
            "cart has 3 items, ok=true"
        );
        assert_eq!(sprintf!("plain text"), "plain text");
    }

    #[test]
    fn literal_percent() {
        assert_eq!(sprintf!("100%% done"), "100% done");
        assert_eq!(sprintf!("%d%%", 5), "5%");
    }

    #[test]
    fn missing_argument_leaves_marker() {
        assert_eq!(sprintf!("a=%d b=%s", 1), "a=1 b=%!s(MISSING)");
    }

    #[test]
    fn extra_arguments_are_listed() {
        assert_eq!(sprintf!("x", 3, "y"), "x%!(EXTRA int=3, string=y)");
        assert_eq!(sprintf!("%d", 1, 2.5), "1%!(EXTRA float64=2.5)");
    }

    #[test]
    fn wrong_type_leaves_marker() {
        assert_eq!(sprintf!("%d", "hello"), "%!d(string=hello)");
        assert_eq!(sprintf!("%s", 5), "%!s(int=5)");
        assert_eq!(sprintf!("%t", 1.5), "%!t(float64=1.5)");
        assert_eq!(sprintf!("%f", 2), "%!f(int=2)");
    }

    #[test]
    fn unknown_verb_and_noverb() {
        assert_eq!(sprintf!("%z", 3), "%!z(int=3)");
        assert_eq!(sprintf!("tail %"), "tail %!(NOVERB)");
    }

    #[test]
    fn width_and_flags() {
        assert_eq!(sprintf!("[%5d]", 42), "[   42]");
        assert_eq!(sprintf!("[%-5d]", 42), "[42   ]");
        assert_eq!(sprintf!("[%05d]", -42), "[-0042]");
        assert_eq!(sprintf!("[%+d]", 7), "[+7]");
        assert_eq!(sprintf!("[%6s]", "ab"), "[    ab]");
        assert_eq!(sprintf!("[%.2s]", "abcdef"), "[ab]");
        assert_eq!(sprintf!("%02d:%02d", 7, 5), "07:05");
    }

    #[test]
    fn radix_verbs() {
        assert_eq!(sprintf!("%x %X %o %b", 255, 255, 8, 5), "ff FF 10 101");
        assert_eq!(sprintf!("%#x %#o %#b", 255, 8, 5), "0xff 010 0b101");
        assert_eq!(sprintf!("%x", "hi"), "6869");
        assert_eq!(sprintf!("%d", u64::MAX), "18446744073709551615");
        assert_eq!(sprintf!("%d", i64::MIN), "-9223372036854775808");
    }

    #[test]
    fn floats() {
        assert_eq!(sprintf!("%f", 3.5), "3.500000");
        assert_eq!(sprintf!("%.2f", 3.14159), "3.14");
        assert_eq!(sprintf!("%8.3f", -1.5), "  -1.500");
        assert_eq!(sprintf!("%e", 1234.5678), "1.234568e+03");
        assert_eq!(sprintf!("%E", 0.00012), "1.200000E-04");
        assert_eq!(sprintf!("%v", 3.0), "3");
        assert_eq!(sprintf!("%g", 0.00001), "1e-05");
        assert_eq!(sprintf!("%.3g", 3.14159), "3.14");
        assert_eq!(sprintf!("%.2g", 12345.0), "1.2e+04");
        assert_eq!(sprintf!("%f %f", f64::NAN, f64::NEG_INFINITY), "NaN -Inf");
    }

    #[test]
    fn chars_and_quotes() {
        assert_eq!(sprintf!("%c%c", 'o', 107), "ok");
        assert_eq!(sprintf!("%q", "say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(sprintf!("%q", 'x'), "'x'");
        assert_eq!(sprintf!("%d", 'A'), "65");
        assert_eq!(sprintf!("%c", -65), "\u{FFFD}");
        assert_eq!(sprintf!("%q", -65), "'\u{FFFD}'");
        assert_eq!(sprintf!("%c", 0x11_0000), "\u{FFFD}");
    }

    #[test]
    fn display_values() {
        let addr = std::net::Ipv4Addr::LOCALHOST;
        assert_eq!(
            sprintf("peer %v", &[Arg::Display(&addr)]),
            "peer 127.0.0.1"
        );
        assert_eq!(sprintf("%d", &[Arg::Display(&addr)]), "%!d(value=127.0.0.1)");
    }

    #[test]
    fn owned_and_borrowed_strings() {
        let name = String::from("disk0");
        assert_eq!(sprintf!("%s/%s", &name, name.clone()), "disk0/disk0");
    }

    #[test]
    fn huge_width_is_capped() {
        let out = sprintf!("%99999999999d", 1);
        assert_eq!(out.len(), MAX_WIDTH);
    }
}
