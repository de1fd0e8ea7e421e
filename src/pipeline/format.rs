//! Euro amount formatting shared by bucket labels and summary figures.

/// One magnitude tier: values below `below` are divided by `divisor` and
/// printed with `decimals` fractional digits and `suffix`.
struct Scale {
    below: f64,
    divisor: f64,
    suffix: &'static str,
    decimals: usize,
}

/// Evaluated in order; the last tier catches everything else.
const COST_SCALES: [Scale; 3] = [
    Scale {
        below: 1e3,
        divisor: 1.0,
        suffix: "",
        decimals: 0,
    },
    Scale {
        below: 1e6,
        divisor: 1e3,
        suffix: "K",
        decimals: 0,
    },
    Scale {
        below: f64::INFINITY,
        divisor: 1e6,
        suffix: "M",
        decimals: 1,
    },
];

/// Compact magnitude-adaptive rendering: `€850`, `€12K`, `€3.4M`.
pub fn format_cost(value: f64) -> String {
    let scale = COST_SCALES
        .iter()
        .find(|scale| value < scale.below)
        .unwrap_or(&COST_SCALES[COST_SCALES.len() - 1]);

    format!(
        "€{:.*}{}",
        scale.decimals,
        value / scale.divisor,
        scale.suffix
    )
}

/// Exact whole-euro rendering with thousands separators: `€1,234,567`.
pub fn format_cost_full(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let rounded = value.round();
    let digits = group_thousands(&format!("{:.0}", rounded.abs()));
    if rounded < 0.0 {
        format!("-€{digits}")
    } else {
        format!("€{digits}")
    }
}

/// Record counts as shown in the dashboard header: `12,345`.
pub fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
