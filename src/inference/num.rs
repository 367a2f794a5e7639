#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumC {
    pub saw_int: bool,
    pub saw_float: bool,
}

impl NumC {
    /// Integral doubles count as integers; JSON `1.0` and `1` are the same number.
    pub fn observe(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 {
            NumC { saw_int: true, saw_float: false }
        } else {
            NumC { saw_int: false, saw_float: true }
        }
    }

    pub(super) fn join(a: &Self, b: &Self) -> Self {
        NumC {
            saw_int: a.saw_int || b.saw_int,
            saw_float: a.saw_float || b.saw_float,
        }
    }

    /// Integer + Integer = Integer, anything with a fraction widens to Float.
    pub fn is_integer(&self) -> bool {
        !self.saw_float
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening() {
        let i = NumC::observe(3.0);
        let f = NumC::observe(0.5);
        assert!(i.is_integer());
        assert!(!f.is_integer());
        assert!(!NumC::join(&i, &f).is_integer());
        assert!(NumC::join(&i, &i).is_integer());
        assert!(!NumC::observe(f64::INFINITY).is_integer());
    }
}
