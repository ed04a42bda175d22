//! Display and parsing of plain parameter values.
//!
//! ```ignore
//! assert_eq!(Formatter::Decibel { precision: 1 }.format(-6.0), "-6.0 dB");
//! assert_eq!(Formatter::Frequency.format(1500.0), "1.50 kHz");
//! assert_eq!(Formatter::Frequency.parse("2 kHz"), Some(2000.0));
//! ```

/// How a plain value is shown to the user and read back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Formatter {
    /// Unitless number, e.g. "1.23".
    Float { precision: usize },

    /// Value already in decibels, e.g. "+6.0 dB", "-60.0 dB".
    Decibel { precision: usize },

    /// Frequency with Hz/kHz scaling, e.g. "400 Hz", "2.00 kHz".
    Frequency,

    /// Time in milliseconds, e.g. "50.0 ms".
    Milliseconds { precision: usize },

    /// "On" / "Off".
    Boolean,
}

impl Formatter {
    /// Format a plain value for display.
    pub fn format(&self, value: f64) -> String {
        match self {
            Formatter::Float { precision } => format!("{:.prec$}", value, prec = *precision),

            Formatter::Decibel { precision } => {
                if value >= 0.0 {
                    format!("+{:.prec$} dB", value, prec = *precision)
                } else {
                    format!("{:.prec$} dB", value, prec = *precision)
                }
            }

            Formatter::Frequency => {
                if value >= 1000.0 {
                    format!("{:.2} kHz", value / 1000.0)
                } else if value >= 100.0 {
                    format!("{:.0} Hz", value)
                } else {
                    format!("{:.1} Hz", value)
                }
            }

            Formatter::Milliseconds { precision } => {
                format!("{:.prec$} ms", value, prec = *precision)
            }

            Formatter::Boolean => {
                if value > 0.5 { "On" } else { "Off" }.to_string()
            }
        }
    }

    /// Parse user input into a plain value.
    ///
    /// Units are optional. Returns `None` if the text is not a number in
    /// this formatter's unit.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let s = text.trim();

        match self {
            Formatter::Float { .. } => s.parse().ok(),

            Formatter::Decibel { .. } => strip_unit(s, &["dB", "db"]).parse().ok(),

            Formatter::Frequency => {
                let lower = s.to_ascii_lowercase();
                if let Some(khz) = lower.strip_suffix("khz") {
                    return khz.trim().parse::<f64>().ok().map(|v| v * 1000.0);
                }
                strip_unit(&lower, &["hz"]).parse().ok()
            }

            Formatter::Milliseconds { .. } => strip_unit(s, &["ms"]).parse().ok(),

            Formatter::Boolean => match s.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" | "1" => Some(1.0),
                "off" | "false" | "no" | "0" => Some(0.0),
                _ => None,
            },
        }
    }

    /// Unit label shown next to the value.
    pub fn units(&self) -> &'static str {
        match self {
            Formatter::Float { .. } | Formatter::Boolean => "",
            Formatter::Decibel { .. } => "dB",
            Formatter::Frequency => "Hz",
            Formatter::Milliseconds { .. } => "ms",
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::Float { precision: 2 }
    }
}

fn strip_unit<'a>(s: &'a str, units: &[&str]) -> &'a str {
    units
        .iter()
        .find_map(|unit| s.strip_suffix(unit))
        .unwrap_or(s)
        .trim()
}
