//! Resolved leaf parameters.
//!
//! The resolver turns the raw tokens of a leaf function into a
//! `ResolvedInput`: one `ResolvedParam` per position, in shape order. Leaf
//! evaluators read their parameters through the typed accessors. Asking for
//! a position with the wrong type means the evaluator and the shape disagree,
//! which is a `Defect`, never a patient-data problem.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::{
    BodyLocation, Cyp, Drug, DrugType, Haplotype, HlaAllele, IcdCode, Intent, MedicationCategory,
    NyhaClass, ReceptorType, Transporter, Treatment, TreatmentCategory, TreatmentCategoryOrType,
    TumorStage, TumorTypeInput, VariantTypeInput,
};
use crate::error::{MatchError, MatchResult};
use crate::input::FunctionInput;
use crate::rule::EligibilityRule;

/// A single parameter after resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResolvedParam {
    Integer(i32),
    Double(f64),
    Text(String),
    Texts(BTreeSet<String>),
    TreatmentCategory(TreatmentCategory),
    TreatmentCategoryOrType(TreatmentCategoryOrType),
    TreatmentCategories(BTreeSet<TreatmentCategory>),
    TreatmentTypes(BTreeSet<DrugType>),
    Intents(BTreeSet<Intent>),
    Treatment(Treatment),
    Treatments(BTreeSet<Treatment>),
    Drugs(BTreeSet<Drug>),
    TumorType(TumorTypeInput),
    TumorStages(BTreeSet<TumorStage>),
    BodyLocation(BodyLocation),
    BodyLocations(BTreeSet<BodyLocation>),
    ReceptorType(ReceptorType),
    /// A DOID id, e.g. `DOID:1324`.
    Doid(String),
    Doids(BTreeSet<String>),
    Icd(IcdCode),
    Icds(BTreeSet<IcdCode>),
    Nyha(NyhaClass),
    Gene(String),
    Genes(BTreeSet<String>),
    Codons(BTreeSet<String>),
    ProteinImpacts(BTreeSet<String>),
    VariantType(VariantTypeInput),
    Protein(String),
    HlaAllele(HlaAllele),
    Haplotype(Haplotype),
    MedicationCategory(MedicationCategory),
    MedicationCategories(BTreeSet<MedicationCategory>),
    Cyp(Cyp),
    Transporter(Transporter),
}

impl ResolvedParam {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResolvedParam::Integer(_) => "Integer",
            ResolvedParam::Double(_) => "Double",
            ResolvedParam::Text(_) => "Text",
            ResolvedParam::Texts(_) => "Texts",
            ResolvedParam::TreatmentCategory(_) => "TreatmentCategory",
            ResolvedParam::TreatmentCategoryOrType(_) => "TreatmentCategoryOrType",
            ResolvedParam::TreatmentCategories(_) => "TreatmentCategories",
            ResolvedParam::TreatmentTypes(_) => "TreatmentTypes",
            ResolvedParam::Intents(_) => "Intents",
            ResolvedParam::Treatment(_) => "Treatment",
            ResolvedParam::Treatments(_) => "Treatments",
            ResolvedParam::Drugs(_) => "Drugs",
            ResolvedParam::TumorType(_) => "TumorType",
            ResolvedParam::TumorStages(_) => "TumorStages",
            ResolvedParam::BodyLocation(_) => "BodyLocation",
            ResolvedParam::BodyLocations(_) => "BodyLocations",
            ResolvedParam::ReceptorType(_) => "ReceptorType",
            ResolvedParam::Doid(_) => "Doid",
            ResolvedParam::Doids(_) => "Doids",
            ResolvedParam::Icd(_) => "Icd",
            ResolvedParam::Icds(_) => "Icds",
            ResolvedParam::Nyha(_) => "Nyha",
            ResolvedParam::Gene(_) => "Gene",
            ResolvedParam::Genes(_) => "Genes",
            ResolvedParam::Codons(_) => "Codons",
            ResolvedParam::ProteinImpacts(_) => "ProteinImpacts",
            ResolvedParam::VariantType(_) => "VariantType",
            ResolvedParam::Protein(_) => "Protein",
            ResolvedParam::HlaAllele(_) => "HlaAllele",
            ResolvedParam::Haplotype(_) => "Haplotype",
            ResolvedParam::MedicationCategory(_) => "MedicationCategory",
            ResolvedParam::MedicationCategories(_) => "MedicationCategories",
            ResolvedParam::Cyp(_) => "Cyp",
            ResolvedParam::Transporter(_) => "Transporter",
        }
    }
}

/// All parameters of one leaf function, resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedInput {
    pub rule: EligibilityRule,
    pub shape: FunctionInput,
    pub params: Vec<ResolvedParam>,
}

impl ResolvedInput {
    pub fn new(rule: EligibilityRule, shape: FunctionInput, params: Vec<ResolvedParam>) -> Self {
        Self { rule, shape, params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn param(&self, index: usize) -> MatchResult<&ResolvedParam> {
        self.params.get(index).ok_or_else(|| MatchError::Defect {
            rule: self.rule.name().to_string(),
            reason: format!("no parameter at position {index} of shape {}", self.shape),
        })
    }

    fn mismatch(&self, index: usize, expected: &str, found: &ResolvedParam) -> MatchError {
        MatchError::Defect {
            rule: self.rule.name().to_string(),
            reason: format!(
                "parameter {index} of shape {} requested as {expected} but holds {}",
                self.shape,
                found.kind_name()
            ),
        }
    }
}

macro_rules! typed_accessors {
    ( $( $accessor:ident => $variant:ident -> $ret:ty { |$value:ident| $convert:expr } )+ ) => {
        impl ResolvedInput {
            $(
                pub fn $accessor(&self, index: usize) -> MatchResult<$ret> {
                    match self.param(index)? {
                        ResolvedParam::$variant($value) => Ok($convert),
                        other => Err(self.mismatch(index, stringify!($variant), other)),
                    }
                }
            )+
        }
    };
}

typed_accessors! {
    integer => Integer -> i32 { |v| *v }
    double => Double -> f64 { |v| *v }
    text => Text -> &str { |v| v.as_str() }
    texts => Texts -> &BTreeSet<String> { |v| v }
    treatment_category => TreatmentCategory -> TreatmentCategory { |v| *v }
    treatment_category_or_type => TreatmentCategoryOrType -> TreatmentCategoryOrType { |v| *v }
    treatment_categories => TreatmentCategories -> &BTreeSet<TreatmentCategory> { |v| v }
    treatment_types => TreatmentTypes -> &BTreeSet<DrugType> { |v| v }
    intents => Intents -> &BTreeSet<Intent> { |v| v }
    treatment => Treatment -> &Treatment { |v| v }
    treatments => Treatments -> &BTreeSet<Treatment> { |v| v }
    drugs => Drugs -> &BTreeSet<Drug> { |v| v }
    tumor_type => TumorType -> TumorTypeInput { |v| *v }
    tumor_stages => TumorStages -> &BTreeSet<TumorStage> { |v| v }
    body_location => BodyLocation -> BodyLocation { |v| *v }
    body_locations => BodyLocations -> &BTreeSet<BodyLocation> { |v| v }
    receptor_type => ReceptorType -> ReceptorType { |v| *v }
    doid => Doid -> &str { |v| v.as_str() }
    doids => Doids -> &BTreeSet<String> { |v| v }
    icd_code => Icd -> &IcdCode { |v| v }
    icd_codes => Icds -> &BTreeSet<IcdCode> { |v| v }
    nyha_class => Nyha -> NyhaClass { |v| *v }
    gene => Gene -> &str { |v| v.as_str() }
    genes => Genes -> &BTreeSet<String> { |v| v }
    codons => Codons -> &BTreeSet<String> { |v| v }
    protein_impacts => ProteinImpacts -> &BTreeSet<String> { |v| v }
    variant_type => VariantType -> VariantTypeInput { |v| *v }
    protein => Protein -> &str { |v| v.as_str() }
    hla_allele => HlaAllele -> &HlaAllele { |v| v }
    haplotype => Haplotype -> &Haplotype { |v| v }
    medication_category => MedicationCategory -> &MedicationCategory { |v| v }
    medication_categories => MedicationCategories -> &BTreeSet<MedicationCategory> { |v| v }
    cyp => Cyp -> Cyp { |v| *v }
    transporter => Transporter -> Transporter { |v| *v }
}
