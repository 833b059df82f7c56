//! Sample patients for the reference scenarios.
//!
//! All data in this module is hardcoded and fictional. No external systems
//! are contacted. Treatment lines are looked up in the reference treatment
//! catalog so that their categories and drug types stay consistent with what
//! the resolver produces for trial parameters.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use eligibility_contracts::{
    domain::{Cyp, IcdCode, Intent, Treatment, TumorStage},
    error::{MatchError, MatchResult},
    patient::{
        Comorbidity, CypInteraction, Gender, InteractionKind, LabMeasure, LabValue, Medication, MolecularRecord,
        PatientRecord, Toxicity, TreatmentHistoryEntry, TumorDetails, Variant,
    },
};
use eligibility_core::traits::TreatmentDatabase;

use crate::knowledge::ReferenceKnowledge;

/// The date every sample evaluation is run against.
pub fn reference_date() -> NaiveDate {
    ymd(2024, 6, 1)
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn treatment(knowledge: &ReferenceKnowledge, name: &str) -> MatchResult<Treatment> {
    knowledge
        .treatments
        .find_treatment_by_name(name)
        .ok_or_else(|| MatchError::Config { reason: format!("sample treatment '{name}' is not in the catalog") })
}

fn line(
    treatment: Treatment,
    start: NaiveDate,
    stop: Option<NaiveDate>,
    progression: Option<bool>,
) -> TreatmentHistoryEntry {
    TreatmentHistoryEntry {
        treatment,
        start_date: Some(start),
        stop_date: stop,
        intent: Some(Intent::Palliative),
        stopped_for_progression: progression,
    }
}

fn lab(measure: LabMeasure, date: NaiveDate, value: f64, unit: &str, uln: Option<f64>) -> LabValue {
    LabValue { measure, date, value, unit: unit.to_string(), ref_limit_up: uln }
}

fn variant(gene: &str, protein_impact: &str, exon: i32) -> Variant {
    Variant {
        gene: gene.to_string(),
        protein_impact: protein_impact.to_string(),
        exon: Some(exon),
        is_activating: true,
        is_reportable: true,
    }
}

fn medication(name: &str, atc_code: &str, start: NaiveDate) -> Medication {
    Medication {
        name: name.to_string(),
        atc_code: Some(atc_code.to_string()),
        start_date: Some(start),
        stop_date: None,
        cyp_interactions: vec![],
        transporter_interactions: vec![],
    }
}

fn genes(symbols: &[&str]) -> BTreeSet<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

/// P-001: metastatic KRAS G12C colorectal adenocarcinoma after two lines.
pub fn colorectal_patient(knowledge: &ReferenceKnowledge) -> MatchResult<PatientRecord> {
    Ok(PatientRecord {
        patient_id: "P-001".to_string(),
        birth_year: 1962,
        gender: Gender::Female,
        who_status: Some(1),
        tumor: TumorDetails {
            doids: BTreeSet::from(["DOID:0050861".to_string()]),
            stage: Some(TumorStage::Stage4),
            has_measurable_disease: Some(true),
            has_brain_lesions: Some(false),
            has_active_brain_lesions: Some(false),
            has_cns_lesions: Some(false),
            has_active_cns_lesions: Some(false),
            has_liver_lesions: Some(true),
            has_bone_lesions: Some(false),
            has_lung_lesions: Some(false),
            has_lymph_node_lesions: Some(true),
        },
        oncological_history: vec![
            line(treatment(knowledge, "CAPOX")?, ymd(2023, 1, 10), Some(ymd(2023, 7, 1)), Some(true)),
            line(treatment(knowledge, "FOLFIRI")?, ymd(2023, 8, 1), Some(ymd(2024, 3, 15)), Some(true)),
        ],
        molecular: Some(MolecularRecord {
            test_date: Some(ymd(2023, 1, 5)),
            tested_genes: genes(&["BRAF", "KRAS", "NRAS"]),
            variants: vec![variant("KRAS", "G12C", 2)],
            amplifications: vec![],
            fusions: vec![],
            is_microsatellite_unstable: Some(false),
            tumor_mutational_burden: Some(4.0),
        }),
        lab_values: vec![
            lab(LabMeasure::NeutrophilsAbs, ymd(2024, 5, 20), 2.1, "10^9/L", None),
            lab(LabMeasure::Asat, ymd(2024, 5, 20), 150.0, "U/L", Some(40.0)),
        ],
        comorbidities: vec![],
        toxicities: vec![],
        medications: Some(vec![medication("Omeprazole", "A02BC01", ymd(2023, 2, 1))]),
        is_pregnant: Some(false),
        is_breastfeeding: Some(false),
    })
}

/// P-002: EGFR-mutant lung adenocarcinoma progressing on osimertinib.
pub fn lung_patient(knowledge: &ReferenceKnowledge) -> MatchResult<PatientRecord> {
    let mut clarithromycin = medication("Clarithromycin", "J01FA09", ymd(2024, 5, 20));
    clarithromycin.cyp_interactions = vec![CypInteraction { cyp: Cyp::Cyp3a4, kind: InteractionKind::Inhibitor }];

    Ok(PatientRecord {
        patient_id: "P-002".to_string(),
        birth_year: 1955,
        gender: Gender::Male,
        who_status: Some(1),
        tumor: TumorDetails {
            doids: BTreeSet::from(["DOID:3910".to_string()]),
            stage: Some(TumorStage::Stage4),
            has_measurable_disease: Some(true),
            has_brain_lesions: Some(false),
            has_active_brain_lesions: Some(false),
            ..TumorDetails::default()
        },
        oncological_history: vec![line(
            treatment(knowledge, "OSIMERTINIB")?,
            ymd(2022, 3, 1),
            Some(ymd(2024, 2, 1)),
            Some(true),
        )],
        molecular: Some(MolecularRecord {
            test_date: Some(ymd(2022, 2, 10)),
            tested_genes: genes(&["ALK", "EGFR", "KRAS", "ROS1"]),
            variants: vec![variant("EGFR", "L858R", 21)],
            ..MolecularRecord::default()
        }),
        lab_values: vec![
            lab(LabMeasure::NeutrophilsAbs, ymd(2024, 5, 25), 1.1, "10^9/L", None),
            lab(LabMeasure::ThrombocytesAbs, ymd(2024, 5, 25), 180.0, "10^9/L", None),
        ],
        comorbidities: vec![Comorbidity { name: "Heart failure".to_string(), icd: IcdCode::new("BD1"), year: Some(2019) }],
        toxicities: vec![Toxicity {
            name: "Peripheral neuropathy".to_string(),
            icd: IcdCode::new("8C0Z"),
            grade: Some(2),
            evaluated_date: ymd(2024, 3, 1),
        }],
        medications: Some(vec![medication("Warfarin", "B01AA03", ymd(2023, 6, 1)), clarithromycin]),
        is_pregnant: None,
        is_breastfeeding: None,
    })
}

/// P-003: a lung cancer referral with almost nothing recorded yet.
pub fn sparse_patient() -> PatientRecord {
    PatientRecord {
        patient_id: "P-003".to_string(),
        birth_year: 1980,
        gender: Gender::Female,
        who_status: None,
        tumor: TumorDetails { doids: BTreeSet::from(["DOID:1324".to_string()]), ..TumorDetails::default() },
        oncological_history: vec![],
        molecular: None,
        lab_values: vec![],
        comorbidities: vec![],
        toxicities: vec![],
        medications: None,
        is_pregnant: None,
        is_breastfeeding: None,
    }
}

/// P-004: a record with a WHO status outside the 0-5 scale.
pub fn corrupt_patient() -> PatientRecord {
    PatientRecord {
        patient_id: "P-004".to_string(),
        birth_year: 1970,
        gender: Gender::Male,
        who_status: Some(7),
        tumor: TumorDetails {
            doids: BTreeSet::from(["DOID:9256".to_string()]),
            stage: Some(TumorStage::Stage3),
            ..TumorDetails::default()
        },
        oncological_history: vec![],
        molecular: None,
        lab_values: vec![],
        comorbidities: vec![],
        toxicities: vec![],
        medications: Some(vec![]),
        is_pregnant: Some(false),
        is_breastfeeding: Some(false),
    }
}

/// All sample patients, in id order.
pub fn sample_patients(knowledge: &ReferenceKnowledge) -> MatchResult<Vec<PatientRecord>> {
    Ok(vec![colorectal_patient(knowledge)?, lung_patient(knowledge)?, sparse_patient(), corrupt_patient()])
}
