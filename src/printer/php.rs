//! PHP literal syntax for scalar values, matching `var_export` output.

use crate::source::Value;

pub fn export_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Int(n) => export_int(*n),
        Value::Float(f) => export_float(*f),
        Value::Str(s) => export_string(s),
        Value::Bytes(b) => format!("hex2bin('{}')", hex::encode(b)),
    }
}

fn export_int(n: i64) -> String {
    // PHP has no literal for the smallest integer
    if n == i64::MIN {
        return format!("{}-1", i64::MIN + 1);
    }
    n.to_string()
}

/// Format a float the way PHP prints doubles with `serialize_precision = -1`.
pub fn export_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let sci = format!("{:e}", f);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if !(-4..15).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        if mantissa.contains('.') {
            format!("{}E{}{}", mantissa, sign, exp.abs())
        } else {
            format!("{}.0E{}{}", mantissa, sign, exp.abs())
        }
    } else {
        let plain = f.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    }
}

/// Single-quoted PHP string literal.
pub fn export_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("' . \"\\0\" . '"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(export_value(&Value::Null), "NULL");
        assert_eq!(export_value(&Value::Bool(true)), "true");
        assert_eq!(export_value(&Value::Int(-42)), "-42");
        assert_eq!(export_value(&Value::Int(i64::MIN)), "-9223372036854775807-1");
    }

    #[test]
    fn test_floats() {
        assert_eq!(export_float(1.0), "1.0");
        assert_eq!(export_float(1.5), "1.5");
        assert_eq!(export_float(-0.25), "-0.25");
        assert_eq!(export_float(0.0001), "0.0001");
        assert_eq!(export_float(0.00001), "1.0E-5");
        assert_eq!(export_float(1e14), "100000000000000.0");
        assert_eq!(export_float(1e15), "1.0E+15");
        assert_eq!(export_float(1.25e20), "1.25E+20");
        assert_eq!(export_float(f64::INFINITY), "INF");
        assert_eq!(export_float(f64::NAN), "NAN");
    }

    #[test]
    fn test_strings_escape_quotes_and_backslashes() {
        assert_eq!(export_string("O'Brien"), "'O\\'Brien'");
        assert_eq!(export_string("C:\\tmp"), "'C:\\\\tmp'");
        assert_eq!(export_string("a\0b"), "'a' . \"\\0\" . 'b'");
    }

    #[test]
    fn test_bytes_use_hex2bin() {
        assert_eq!(
            export_value(&Value::Bytes(vec![0xde, 0xad, 0x27])),
            "hex2bin('dead27')"
        );
    }
}
