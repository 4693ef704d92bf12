// bracket checks and numeric helpers shared by the symbolic module

/// Outcome of a bracket scan over an input string.
#[derive(Debug, Clone, PartialEq)]
pub enum BracketBalance {
    Balanced,
    /// closing bracket at this char index has no opening pair
    UnexpectedClosing(usize),
    /// number of brackets left open at the end of the input
    Unclosed(usize),
}

/// scan round brackets only, the expression grammar knows no other kind
pub fn bracket_balance(s: &str) -> BracketBalance {
    let mut depth: usize = 0;
    for (i, c) in s.chars().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return BracketBalance::UnexpectedClosing(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    if depth == 0 {
        BracketBalance::Balanced
    } else {
        BracketBalance::Unclosed(depth)
    }
}

/// `num_values` evenly spaced points from `start` to `end`, both ends included
pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    match num_values {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num_values as f64 - 1.0);
            (0..num_values)
                .map(|i| {
                    if i == num_values - 1 {
                        end
                    } else {
                        start + i as f64 * step
                    }
                })
                .collect()
        }
    }
}

/// true if `value` is within `tol` of an integer
pub fn is_integer(value: f64, tol: f64) -> bool {
    value.is_finite() && (value - value.round()).abs() <= tol
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bracket_balance() {
        assert_eq!(bracket_balance("sin(x)*(y+1)"), BracketBalance::Balanced);
        assert_eq!(bracket_balance("(x+1"), BracketBalance::Unclosed(1));
        assert_eq!(bracket_balance("x)+(1"), BracketBalance::UnexpectedClosing(1));
        assert_eq!(bracket_balance("sin((x+1)*y)+2"), BracketBalance::Balanced);
    }

    #[test]
    fn test_linspace() {
        let v = linspace(-2.0, 2.0, 5);
        assert_eq!(v.len(), 5);
        assert_relative_eq!(v[1], -1.0);
        assert_relative_eq!(v[4], 2.0);
        assert_eq!(linspace(1.0, 3.0, 1), vec![1.0]);
        assert!(linspace(1.0, 3.0, 0).is_empty());
    }
}
