//! Type A / Type B threshold classification of loss events
//!
//! Two tests run over the banded events:
//! - **Type A** (reference level): net loss summed per (band, reference). A pair
//!   strictly above the threshold flags the reference in every band.
//! - **Type B** (category level): gross loss of the remaining events summed per
//!   (risk category, band). A group at or above the threshold is flagged.
//!
//! The provisional A/B split only decides which rows feed the Type B sums. The
//! final label of every row is assigned afterwards with A > B > N/A priority.

use super::banding::BandAssigner;
use super::recovery::EnrichedEvent;
use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Level-2 operational risk classes, grouped under seven level-1 classes
static RISK_CATEGORIES: [(u32, &str); 29] = [
    (11, "1.1 Actividades no Autorizadas"),
    (12, "1.2 Hurto y Fraude Interno"),
    (13, "1.3 Seguridad de los sistemas"),
    (14, "1.4 Otros"),
    (21, "2.1 Hurto y Fraude Externo"),
    (22, "2.2 Seguridad de los sistemas"),
    (23, "2.3 Otros"),
    (31, "3.1 Relaciones Laborales"),
    (32, "3.2 Higiene y Seguridad laboral"),
    (33, "3.3 Desigualdad y Discriminación"),
    (34, "3.4 Otros"),
    (41, "4.1 Indebida Divulgación de Información y Abuso de Confianza"),
    (42, "4.2 Prácticas Empresariales o de Mercado Improcedentes"),
    (43, "4.3 Productos inadecuados"),
    (44, "4.4 Actividades de Asesoramiento"),
    (45, "4.5 Otros"),
    (51, "5.1 Desastres naturales"),
    (52, "5.2 Otros acontecimientos"),
    (53, "5.3 Otras causas externas"),
    (61, "6.1 Sistemas"),
    (62, "6.2 Otros"),
    (71, "7.1 Recepción, Ejecución y Mantenimiento de Operaciones"),
    (72, "7.2 Seguimiento y Presentación de Informes"),
    (73, "7.3 Aceptación de Clientes y Documentación"),
    (74, "7.4 Gestión de Cuentas de Clientes"),
    (75, "7.5 Incumplimiento de la regulación vigente"),
    (76, "7.6 Acuerdos y Convenios Comerciales"),
    (77, "7.7 Proveedores"),
    (78, "7.8 Otros"),
];

/// Human-readable label of a level-2 risk class code
pub fn risk_category_label(code: u32) -> Option<&'static str> {
    RISK_CATEGORIES
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|idx| RISK_CATEGORIES[idx].1)
}

/// Threshold classification of a single event row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ThresholdClass {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl ThresholdClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdClass::A => "A",
            ThresholdClass::B => "B",
            ThresholdClass::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for ThresholdClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Net loss of one reference within one band, above the threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceBandLoss {
    pub band: u32,
    pub reference: String,
    pub net_loss: f64,
}

/// Gross loss of one risk category within one band, at or above the threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBandLoss {
    pub risk_category: &'static str,
    pub band: u32,
    pub gross_loss: f64,
}

/// Enriched event with its band, category label and final classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedEvent {
    #[serde(flatten)]
    pub event: EnrichedEvent,
    pub band: u32,
    pub risk_category: Option<&'static str>,
    pub threshold_class: ThresholdClass,
}

/// Output of the classification stage
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Every input event, in input order
    pub events: Vec<ClassifiedEvent>,

    /// (band, reference) pairs that triggered Type A, ordered by band then reference
    pub type_a_pairs: Vec<ReferenceBandLoss>,

    /// References flagged Type A in any band
    pub type_a_references: BTreeSet<String>,

    /// (category, band) groups that triggered Type B, ordered by category then band
    pub type_b_groups: Vec<CategoryBandLoss>,
}

impl Classification {
    /// Type A total per band
    pub fn type_a_by_band(&self) -> BTreeMap<u32, f64> {
        let mut totals = BTreeMap::new();
        for pair in &self.type_a_pairs {
            *totals.entry(pair.band).or_insert(0.0) += pair.net_loss;
        }
        totals
    }

    /// Type B total per band
    pub fn type_b_by_band(&self) -> BTreeMap<u32, f64> {
        let mut totals = BTreeMap::new();
        for group in &self.type_b_groups {
            *totals.entry(group.band).or_insert(0.0) += group.gross_loss;
        }
        totals
    }

    pub fn count(&self, class: ThresholdClass) -> usize {
        self.events.iter().filter(|e| e.threshold_class == class).count()
    }
}

/// Final label of one row, A taking priority over B
pub fn classify_row(
    reference: &str,
    risk_category: Option<&'static str>,
    band: u32,
    type_a_references: &BTreeSet<String>,
    type_b_flags: &BTreeSet<(&'static str, u32)>,
) -> ThresholdClass {
    if type_a_references.contains(reference) {
        ThresholdClass::A
    } else if risk_category.is_some_and(|cat| type_b_flags.contains(&(cat, band))) {
        ThresholdClass::B
    } else {
        ThresholdClass::NotApplicable
    }
}

/// Sum net loss per (band, reference) and keep pairs strictly above the threshold
fn type_a_test(events: &[EnrichedEvent], bands: &[u32], threshold: f64) -> Vec<ReferenceBandLoss> {
    let mut sums: BTreeMap<(u32, &str), f64> = BTreeMap::new();
    for (event, &band) in events.iter().zip(bands) {
        *sums.entry((band, event.reference.as_str())).or_insert(0.0) += event.net_loss;
    }

    sums.into_iter()
        .filter(|(_, net_loss)| *net_loss > threshold)
        .map(|((band, reference), net_loss)| ReferenceBandLoss {
            band,
            reference: reference.to_string(),
            net_loss,
        })
        .collect()
}

/// Sum gross loss per (category, band) over non-Type-A rows and keep groups at or above the threshold
fn type_b_test(
    events: &[EnrichedEvent],
    bands: &[u32],
    categories: &[Option<&'static str>],
    type_a_references: &BTreeSet<String>,
    threshold: f64,
) -> Vec<CategoryBandLoss> {
    let mut sums: BTreeMap<(&'static str, u32), f64> = BTreeMap::new();
    for ((event, &band), category) in events.iter().zip(bands).zip(categories) {
        if type_a_references.contains(&event.reference) {
            continue;
        }
        // Rows without a category label cannot form a group
        let Some(category) = *category else { continue };
        *sums.entry((category, band)).or_insert(0.0) += event.gross_loss;
    }

    sums.into_iter()
        .filter(|(_, gross_loss)| *gross_loss >= threshold)
        .map(|((risk_category, band), gross_loss)| CategoryBandLoss {
            risk_category,
            band,
            gross_loss,
        })
        .collect()
}

/// Band and classify the enriched events against `threshold`
pub fn classify(events: Vec<EnrichedEvent>, threshold: f64) -> Classification {
    let Some(assigner) = BandAssigner::from_dates(events.iter().map(|e| e.registration_date)) else {
        return Classification::default();
    };

    let bands: Vec<u32> = events.iter().map(|e| assigner.band(e.registration_date)).collect();
    let categories: Vec<Option<&'static str>> = events
        .iter()
        .map(|e| e.risk_class_code.and_then(risk_category_label))
        .collect();

    let type_a_pairs = type_a_test(&events, &bands, threshold);
    let type_a_references: BTreeSet<String> =
        type_a_pairs.iter().map(|p| p.reference.clone()).collect();
    debug!(
        "Type A: {} (band, reference) pairs above {:.2}, {} references",
        type_a_pairs.len(),
        threshold,
        type_a_references.len()
    );

    let type_b_groups = type_b_test(&events, &bands, &categories, &type_a_references, threshold);
    let type_b_flags: BTreeSet<(&'static str, u32)> =
        type_b_groups.iter().map(|g| (g.risk_category, g.band)).collect();
    debug!("Type B: {} (category, band) groups at or above {:.2}", type_b_groups.len(), threshold);

    let events: Vec<ClassifiedEvent> = events
        .into_iter()
        .zip(bands)
        .zip(categories)
        .map(|((event, band), risk_category)| {
            let threshold_class = classify_row(
                &event.reference,
                risk_category,
                band,
                &type_a_references,
                &type_b_flags,
            );
            ClassifiedEvent {
                event,
                band,
                risk_category,
                threshold_class,
            }
        })
        .collect();

    let classification = Classification {
        events,
        type_a_pairs,
        type_a_references,
        type_b_groups,
    };

    info!(
        "Classified {} events: {} A, {} B, {} N/A",
        classification.events.len(),
        classification.count(ThresholdClass::A),
        classification.count(ThresholdClass::B),
        classification.count(ThresholdClass::NotApplicable)
    );

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn enriched(reference: &str, date: (i32, u32, u32), gross: f64, recovered: f64, code: Option<u32>) -> EnrichedEvent {
        EnrichedEvent {
            reference: reference.to_string(),
            registration_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            recovery_date: None,
            gross_loss: gross,
            recovered,
            net_loss: gross - recovered,
            risk_class_code: code,
            account_category: String::new(),
            recovery_account_category: String::new(),
        }
    }

    fn class_of(result: &Classification, reference: &str) -> Vec<ThresholdClass> {
        result
            .events
            .iter()
            .filter(|e| e.event.reference == reference)
            .map(|e| e.threshold_class)
            .collect()
    }

    #[test]
    fn test_risk_category_table() {
        assert_eq!(risk_category_label(11), Some("1.1 Actividades no Autorizadas"));
        assert_eq!(risk_category_label(45), Some("4.5 Otros"));
        assert_eq!(risk_category_label(78), Some("7.8 Otros"));
        assert_eq!(risk_category_label(15), None);
        assert_eq!(risk_category_label(0), None);

        // Table must stay sorted for binary search
        assert!(RISK_CATEGORIES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_type_a_flags_reference_in_every_band() {
        let events = vec![
            // Band 1: R1 sums to 120 > 100
            enriched("R1", (2020, 1, 10), 70.0, 0.0, Some(11)),
            enriched("R1", (2020, 5, 10), 50.0, 0.0, Some(11)),
            // Band 3: small R1 row, still A
            enriched("R1", (2022, 3, 1), 5.0, 0.0, Some(21)),
            enriched("R2", (2022, 3, 1), 5.0, 0.0, Some(21)),
        ];

        let result = classify(events, 100.0);
        assert_eq!(class_of(&result, "R1"), vec![ThresholdClass::A; 3]);
        assert_eq!(class_of(&result, "R2"), vec![ThresholdClass::NotApplicable]);

        assert_eq!(result.type_a_pairs.len(), 1);
        assert_eq!(result.type_a_pairs[0].band, 1);
        assert_relative_eq!(result.type_a_pairs[0].net_loss, 120.0);
    }

    #[test]
    fn test_type_a_wins_inside_a_type_b_group() {
        let events = vec![
            // BIG is Type A through band 1
            enriched("BIG", (2020, 1, 10), 200.0, 0.0, Some(11)),
            // Band 2, category 2.1: BIG is excluded, X + Y = 110 >= 100
            enriched("BIG", (2021, 1, 10), 1.0, 0.0, Some(21)),
            enriched("X", (2021, 2, 1), 90.0, 0.0, Some(21)),
            enriched("Y", (2021, 3, 1), 20.0, 0.0, Some(21)),
        ];

        let result = classify(events, 100.0);
        assert_eq!(result.type_b_groups.len(), 1);
        assert_eq!(result.type_b_groups[0].band, 2);
        assert_relative_eq!(result.type_b_groups[0].gross_loss, 110.0);

        let big_band_2 = result
            .events
            .iter()
            .find(|e| e.event.reference == "BIG" && e.band == 2)
            .unwrap();
        assert_eq!(big_band_2.risk_category, risk_category_label(21));
        assert_eq!(big_band_2.threshold_class, ThresholdClass::A);
        assert_eq!(class_of(&result, "X"), vec![ThresholdClass::B]);
        assert_eq!(class_of(&result, "Y"), vec![ThresholdClass::B]);
    }

    #[test]
    fn test_threshold_strictness_asymmetry() {
        let events = vec![
            // Net exactly at threshold: not Type A
            enriched("EXACT", (2021, 12, 1), 100.0, 0.0, Some(72)),
            // Another reference in the same category and band, gross 0
            enriched("OTHER", (2021, 12, 2), 0.0, 0.0, Some(72)),
        ];

        let result = classify(events, 100.0);
        assert!(result.type_a_references.is_empty());

        // Category gross exactly at threshold: Type B
        assert_eq!(result.type_b_groups.len(), 1);
        assert_eq!(result.type_b_groups[0].risk_category, "7.2 Seguimiento y Presentación de Informes");
        assert_eq!(class_of(&result, "EXACT"), vec![ThresholdClass::B]);
        assert_eq!(class_of(&result, "OTHER"), vec![ThresholdClass::B]);
    }

    #[test]
    fn test_type_a_uses_net_and_type_b_uses_gross() {
        let events = vec![
            // Gross 150 but recovered 80 -> net 70, not A at 100
            enriched("R1", (2021, 1, 1), 150.0, 80.0, Some(31)),
        ];

        let result = classify(events, 100.0);
        assert!(result.type_a_references.is_empty());
        assert_eq!(result.type_b_groups.len(), 1);
        assert_relative_eq!(result.type_b_groups[0].gross_loss, 150.0);
        assert_eq!(class_of(&result, "R1"), vec![ThresholdClass::B]);
    }

    #[test]
    fn test_type_a_rows_excluded_from_type_b_sums() {
        let events = vec![
            enriched("BIG", (2021, 1, 1), 200.0, 0.0, Some(41)),
            enriched("SMALL", (2021, 2, 1), 60.0, 0.0, Some(41)),
        ];

        let result = classify(events, 100.0);
        // Without BIG the category sums to 60 < 100
        assert!(result.type_b_groups.is_empty());
        assert_eq!(class_of(&result, "BIG"), vec![ThresholdClass::A]);
        assert_eq!(class_of(&result, "SMALL"), vec![ThresholdClass::NotApplicable]);
    }

    #[test]
    fn test_type_b_is_band_local() {
        let events = vec![
            enriched("X1", (2020, 12, 1), 60.0, 0.0, Some(61)),
            enriched("X2", (2021, 6, 1), 60.0, 0.0, Some(61)),
            // Next band, same category, below threshold on its own
            enriched("X3", (2021, 12, 1), 60.0, 0.0, Some(61)),
        ];

        let result = classify(events, 100.0);
        assert_eq!(result.type_b_groups.len(), 1);
        assert_eq!(result.type_b_groups[0].band, 1);
        assert_eq!(class_of(&result, "X1"), vec![ThresholdClass::B]);
        assert_eq!(class_of(&result, "X3"), vec![ThresholdClass::NotApplicable]);
    }

    #[test]
    fn test_unmapped_codes_never_form_type_b() {
        let events = vec![
            enriched("U1", (2021, 1, 1), 80.0, 0.0, Some(99)),
            enriched("U2", (2021, 1, 2), 80.0, 0.0, None),
        ];

        let result = classify(events, 100.0);
        assert!(result.type_b_groups.is_empty());
        assert!(result.events.iter().all(|e| e.risk_category.is_none()));
        assert_eq!(result.count(ThresholdClass::NotApplicable), 2);
    }

    #[test]
    fn test_totals_by_band() {
        let events = vec![
            enriched("A1", (2020, 1, 1), 150.0, 0.0, Some(11)),
            enriched("A1", (2021, 1, 1), 130.0, 0.0, Some(11)),
            enriched("A2", (2021, 2, 1), 110.0, 0.0, Some(12)),
            enriched("B1", (2021, 3, 1), 70.0, 0.0, Some(22)),
            enriched("B2", (2021, 4, 1), 40.0, 0.0, Some(22)),
        ];

        let result = classify(events, 100.0);
        let a = result.type_a_by_band();
        assert_relative_eq!(a[&1], 150.0);
        assert_relative_eq!(a[&2], 240.0);

        let b = result.type_b_by_band();
        assert_eq!(b.len(), 1);
        assert_relative_eq!(b[&2], 110.0);
    }

    #[test]
    fn test_empty_input() {
        let result = classify(Vec::new(), 100.0);
        assert!(result.events.is_empty());
        assert!(result.type_a_by_band().is_empty());
    }
}
