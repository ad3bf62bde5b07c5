//! Discrepancy assessment
//!
//! Pure comparison of submitted against collected garment counts and the
//! human-readable explanation stored on the student audit.

/// Result of comparing one student's counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    /// collected - submitted
    pub dark_delta: i64,
    pub light_delta: i64,
    pub has_discrepancy: bool,
    /// Present only when there is a discrepancy
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Garment {
    Dark,
    Light,
}

impl Garment {
    fn lower(self) -> &'static str {
        match self {
            Garment::Dark => "dark",
            Garment::Light => "light",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Garment::Dark => "Dark",
            Garment::Light => "Light",
        }
    }

    /// Phrase for one garment type, `None` when the counts agree
    fn describe(self, submitted: i64, collected: i64) -> Option<String> {
        if collected == submitted {
            return None;
        }
        let phrase = if collected == 0 {
            format!("No {} garments collected ({} submitted)", self.lower(), submitted)
        } else if collected > submitted {
            format!(
                "{} garments collected ({}) exceed submitted ({})",
                self.title(),
                collected,
                submitted
            )
        } else {
            format!(
                "Fewer {} garments collected ({}) than submitted ({})",
                self.lower(),
                collected,
                submitted
            )
        };
        Some(phrase)
    }
}

pub fn assess(
    submitted_dark: i64,
    submitted_light: i64,
    collected_dark: i64,
    collected_light: i64,
) -> Assessment {
    let dark_delta = collected_dark.saturating_sub(submitted_dark);
    let light_delta = collected_light.saturating_sub(submitted_light);
    let has_discrepancy = collected_dark != submitted_dark || collected_light != submitted_light;

    let explanation = has_discrepancy.then(|| {
        let submitted_total = submitted_dark.saturating_add(submitted_light);
        if collected_dark == 0 && collected_light == 0 && submitted_total > 0 {
            return "No garments collected at all".to_string();
        }
        [
            Garment::Dark.describe(submitted_dark, collected_dark),
            Garment::Light.describe(submitted_light, collected_light),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("; ")
    });

    Assessment {
        dark_delta,
        light_delta,
        has_discrepancy,
        explanation,
    }
}

/// Append auditor notes after the generated explanation
pub fn discrepancy_reason(explanation: Option<&str>, notes: Option<&str>) -> Option<String> {
    let notes = notes.map(str::trim).filter(|n| !n.is_empty());
    match (explanation, notes) {
        (Some(text), Some(notes)) => Some(format!("{text}. Notes: {notes}")),
        (Some(text), None) => Some(text.to_string()),
        (None, _) => None,
    }
}
