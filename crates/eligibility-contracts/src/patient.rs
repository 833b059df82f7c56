//! The clinical snapshot of a patient that leaf evaluators read.
//!
//! Every field that may be unknown is an `Option` or an empty collection.
//! Leaf evaluators turn unknown data into UNDETERMINED evaluations; they
//! never fail on it.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{BodyLocation, Cyp, IcdCode, Intent, Transporter, Treatment, TumorStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub birth_year: i32,
    pub gender: Gender,
    pub who_status: Option<u8>,
    pub tumor: TumorDetails,
    #[serde(default)]
    pub oncological_history: Vec<TreatmentHistoryEntry>,
    /// `None` when no molecular test has been performed.
    pub molecular: Option<MolecularRecord>,
    #[serde(default)]
    pub lab_values: Vec<LabValue>,
    #[serde(default)]
    pub comorbidities: Vec<Comorbidity>,
    #[serde(default)]
    pub toxicities: Vec<Toxicity>,
    /// `None` when the medication list is not available at all.
    pub medications: Option<Vec<Medication>>,
    pub is_pregnant: Option<bool>,
    pub is_breastfeeding: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TumorDetails {
    #[serde(default)]
    pub doids: BTreeSet<String>,
    pub stage: Option<TumorStage>,
    pub has_measurable_disease: Option<bool>,
    pub has_brain_lesions: Option<bool>,
    pub has_active_brain_lesions: Option<bool>,
    pub has_cns_lesions: Option<bool>,
    pub has_active_cns_lesions: Option<bool>,
    pub has_liver_lesions: Option<bool>,
    pub has_bone_lesions: Option<bool>,
    pub has_lung_lesions: Option<bool>,
    pub has_lymph_node_lesions: Option<bool>,
}

impl TumorDetails {
    /// Known presence of lesions at a location; `None` when not recorded.
    pub fn has_lesions_in(&self, location: BodyLocation) -> Option<bool> {
        match location {
            BodyLocation::Brain => self.has_brain_lesions,
            BodyLocation::Cns => self.has_cns_lesions.or(self.has_brain_lesions),
            BodyLocation::Liver => self.has_liver_lesions,
            BodyLocation::Bone => self.has_bone_lesions,
            BodyLocation::Lung => self.has_lung_lesions,
            BodyLocation::LymphNode => self.has_lymph_node_lesions,
            BodyLocation::AdrenalGland | BodyLocation::Peritoneum | BodyLocation::Skin => None,
        }
    }
}

/// One line of prior oncological treatment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentHistoryEntry {
    pub treatment: Treatment,
    pub start_date: Option<NaiveDate>,
    pub stop_date: Option<NaiveDate>,
    pub intent: Option<Intent>,
    pub stopped_for_progression: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MolecularRecord {
    pub test_date: Option<NaiveDate>,
    #[serde(default)]
    pub tested_genes: BTreeSet<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub amplifications: Vec<Amplification>,
    #[serde(default)]
    pub fusions: Vec<Fusion>,
    pub is_microsatellite_unstable: Option<bool>,
    pub tumor_mutational_burden: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub gene: String,
    /// Protein impact in HGVS short form, e.g. `G12C`.
    pub protein_impact: String,
    pub exon: Option<i32>,
    pub is_activating: bool,
    pub is_reportable: bool,
}

impl Variant {
    /// The codon part of the protein impact, e.g. `G12` for `G12C`.
    pub fn codon(&self) -> &str {
        let end = self
            .protein_impact
            .char_indices()
            .skip(1)
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(self.protein_impact.len());
        &self.protein_impact[..end]
    }

    pub fn event(&self) -> String {
        format!("{} {}", self.gene, self.protein_impact)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amplification {
    pub gene: String,
    pub copies: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fusion {
    pub gene_start: String,
    pub gene_end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabMeasure {
    LeukocytesAbs,
    NeutrophilsAbs,
    LymphocytesAbs,
    ThrombocytesAbs,
    Hemoglobin,
    Creatinine,
    TotalBilirubin,
    DirectBilirubin,
    Asat,
    Alat,
    AlkalinePhosphatase,
    Albumin,
    Ldh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabValue {
    pub measure: LabMeasure,
    pub date: NaiveDate,
    pub value: f64,
    pub unit: String,
    /// Upper limit of normal, when the lab reported one.
    pub ref_limit_up: Option<f64>,
}

impl LabValue {
    /// Value as a multiple of the upper limit of normal.
    pub fn uln_multiple(&self) -> Option<f64> {
        self.ref_limit_up.filter(|uln| *uln > 0.0).map(|uln| self.value / uln)
    }
}

impl PatientRecord {
    /// The most recent lab value of a measure on or before `reference_date`.
    pub fn latest_lab(&self, measure: LabMeasure, reference_date: NaiveDate) -> Option<&LabValue> {
        self.lab_values
            .iter()
            .filter(|lab| lab.measure == measure && lab.date <= reference_date)
            .max_by_key(|lab| lab.date)
    }

    /// Number of systemic treatment lines.
    pub fn systemic_line_count(&self) -> usize {
        self.oncological_history.iter().filter(|entry| entry.treatment.is_systemic).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comorbidity {
    pub name: String,
    pub icd: IcdCode,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toxicity {
    pub name: String,
    pub icd: IcdCode,
    pub grade: Option<u8>,
    pub evaluated_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionKind {
    Inhibitor,
    Inducer,
    Substrate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CypInteraction {
    pub cyp: Cyp,
    pub kind: InteractionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransporterInteraction {
    pub transporter: Transporter,
    pub kind: InteractionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub atc_code: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub stop_date: Option<NaiveDate>,
    #[serde(default)]
    pub cyp_interactions: Vec<CypInteraction>,
    #[serde(default)]
    pub transporter_interactions: Vec<TransporterInteraction>,
}

impl Medication {
    /// Active on `reference_date`: started on or before it and not yet stopped.
    pub fn is_active_on(&self, reference_date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| start <= reference_date)
            && self.stop_date.map_or(true, |stop| stop >= reference_date)
    }
}
