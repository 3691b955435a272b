use serde::{Deserialize, Serialize};

pub const FLOAT_DISPLAY_PRECISION: usize = 2;
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

// Measure parameters
pub const M_ESTIMATE_M: f64 = 2.0;
pub const F_MEASURE_BETA: f64 = 2.0;
pub const G_MEASURE_G: f64 = 2.0;
pub const KLOSGEN_OMEGA: f64 = 0.43;

/// Tables whose point probability is within this relative distance of the
/// observed one count as "at least as extreme" in Fisher's exact test.
pub const FISHER_RELATIVE_TOLERANCE: f64 = 1e-7;

/// Display settings threaded through `to_string` calls of conditions and rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Render numeric intervals with one infinite bound as `attr >= 1.00`
    /// instead of `attr = <1.00, inf)`.
    pub concise_numerical_conditions: bool,
    pub float_display_precision: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            concise_numerical_conditions: true,
            float_display_precision: FLOAT_DISPLAY_PRECISION,
        }
    }
}

impl FormatOptions {
    pub fn full_intervals() -> Self {
        Self {
            concise_numerical_conditions: false,
            ..Self::default()
        }
    }

    /// Fixed-point rendering with thousands separators, e.g. `1,234.50`.
    pub fn format_float(&self, value: f64) -> String {
        if value.is_nan() {
            return "nan".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "inf" } else { "-inf" }.to_string();
        }
        let raw = format!("{:.*}", self.float_display_precision, value.abs());
        let (int_part, frac_part) = match raw.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (raw.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (pos, ch) in int_part.chars().enumerate() {
            if pos > 0 && (int_part.len() - pos) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if value.is_sign_negative() && raw.chars().any(|c| c != '0' && c != '.') {
            "-"
        } else {
            ""
        };
        match frac_part {
            Some(f) => format!("{sign}{grouped}.{f}"),
            None => format!("{sign}{grouped}"),
        }
    }
}
