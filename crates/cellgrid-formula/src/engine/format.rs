use super::Dynamic;

/// Format a Dynamic value for display.
pub fn format_dynamic(value: &Dynamic) -> String {
    if value.is_unit() {
        String::new()
    } else if let Ok(n) = value.as_float() {
        format_number(n)
    } else if let Ok(n) = value.as_int() {
        n.to_string()
    } else if let Ok(b) = value.as_bool() {
        if b { "TRUE" } else { "FALSE" }.to_string()
    } else if value.is_array() {
        match value.clone().into_array() {
            Ok(items) => items
                .iter()
                .map(format_dynamic)
                .collect::<Vec<_>>()
                .join(", "),
            Err(_) => String::new(),
        }
    } else if let Ok(s) = value.clone().into_string() {
        s
    } else {
        format!("{:?}", value)
    }
}

/// Format a number for display: integers as-is, otherwise at most two
/// decimals with trailing zeros dropped.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#DIV/0!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        let fixed = format!("{:.2}", n);
        let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(1.0 / 3.0), "0.33");
        assert_eq!(format_number(-0.001), "0");
        assert_eq!(format_number(f64::INFINITY), "#DIV/0!");
    }

    #[test]
    fn dynamics() {
        assert_eq!(format_dynamic(&Dynamic::UNIT), "");
        assert_eq!(format_dynamic(&Dynamic::TRUE), "TRUE");
        assert_eq!(format_dynamic(&Dynamic::from("hi".to_string())), "hi");
        assert_eq!(format_dynamic(&Dynamic::from_int(3)), "3");
    }
}
