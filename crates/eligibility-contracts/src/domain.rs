//! Clinical domain values that eligibility parameters resolve into.
//!
//! Fixed vocabularies (treatment categories, drug types, intents, CYP enzymes,
//! transporters, ...) are closed enums matched against normalized tokens.
//! Open vocabularies (drugs, treatments, ICD codes, medication categories)
//! are plain value types produced by external collaborators.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalize an enum-valued token the way trial authors are allowed to vary it:
/// trim, uppercase, spaces to underscores.
pub fn normalize_token(token: &str) -> String {
    token.trim().to_uppercase().replace(' ', "_")
}

/// Declare a closed vocabulary with its canonical token for each variant.
macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        $vis enum $name {
            $( #[serde(rename = $token)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// The canonical token.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $token ),+
                }
            }

            /// Match `token` after normalization. Returns `None` for unknown tokens.
            pub fn from_token(token: &str) -> Option<Self> {
                let normalized = normalize_token(token);
                Self::ALL.iter().copied().find(|v| v.as_str() == normalized)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ── Treatments ────────────────────────────────────────────────────────────────

token_enum! {
    /// Broad category of an oncological treatment.
    pub enum TreatmentCategory {
        Chemotherapy => "CHEMOTHERAPY",
        TargetedTherapy => "TARGETED_THERAPY",
        Immunotherapy => "IMMUNOTHERAPY",
        HormoneTherapy => "HORMONE_THERAPY",
        Radiotherapy => "RADIOTHERAPY",
        Surgery => "SURGERY",
        Transplantation => "TRANSPLANTATION",
        AntiviralTherapy => "ANTIVIRAL_THERAPY",
        SupportiveTreatment => "SUPPORTIVE_TREATMENT",
        CarT => "CAR_T",
        TcrT => "TCR_T",
        GeneTherapy => "GENE_THERAPY",
        Ablation => "ABLATION",
    }
}

token_enum! {
    /// Mechanism-level treatment type. Every type belongs to exactly one category.
    pub enum DrugType {
        AlkylatingAgent => "ALKYLATING_AGENT",
        Anthracycline => "ANTHRACYCLINE",
        Antimetabolite => "ANTIMETABOLITE",
        PlatinumCompound => "PLATINUM_COMPOUND",
        Taxane => "TAXANE",
        Topo1Inhibitor => "TOPO1_INHIBITOR",
        Topo2Inhibitor => "TOPO2_INHIBITOR",
        VincaAlkaloid => "VINCA_ALKALOID",
        AlkTki => "ALK_TKI",
        EgfrTki => "EGFR_TKI",
        EgfrAntibody => "EGFR_ANTIBODY",
        Her2Antibody => "HER2_ANTIBODY",
        Her2Tki => "HER2_TKI",
        BrafInhibitor => "BRAF_INHIBITOR",
        MekInhibitor => "MEK_INHIBITOR",
        KrasG12cInhibitor => "KRAS_G12C_INHIBITOR",
        ParpInhibitor => "PARP_INHIBITOR",
        Cdk46Inhibitor => "CDK4_6_INHIBITOR",
        VegfAntibody => "VEGF_ANTIBODY",
        VegfrTki => "VEGFR_TKI",
        MtorInhibitor => "MTOR_INHIBITOR",
        Pi3kInhibitor => "PI3K_INHIBITOR",
        AntibodyDrugConjugate => "ANTIBODY_DRUG_CONJUGATE",
        AntiPd1 => "ANTI_PD_1",
        AntiPdL1 => "ANTI_PD_L1",
        AntiCtla4 => "ANTI_CTLA_4",
        AntiLag3 => "ANTI_LAG_3",
        AntiAndrogen => "ANTI_ANDROGEN",
        AromataseInhibitor => "AROMATASE_INHIBITOR",
        SelectiveEstrogenReceptorModulator => "SELECTIVE_ESTROGEN_RECEPTOR_MODULATOR",
        SelectiveEstrogenReceptorDegrader => "SELECTIVE_ESTROGEN_RECEPTOR_DEGRADER",
        GonadotropinReleasingHormone => "GONADOTROPIN_RELEASING_HORMONE",
        Brachytherapy => "BRACHYTHERAPY",
        RadioligandTherapy => "RADIOLIGAND_THERAPY",
        StereotacticRadiotherapy => "STEREOTACTIC_RADIOTHERAPY",
    }
}

impl DrugType {
    /// The category this type belongs to.
    pub fn category(&self) -> TreatmentCategory {
        use DrugType::*;
        match self {
            AlkylatingAgent | Anthracycline | Antimetabolite | PlatinumCompound | Taxane
            | Topo1Inhibitor | Topo2Inhibitor | VincaAlkaloid => TreatmentCategory::Chemotherapy,
            AlkTki | EgfrTki | EgfrAntibody | Her2Antibody | Her2Tki | BrafInhibitor
            | MekInhibitor | KrasG12cInhibitor | ParpInhibitor | Cdk46Inhibitor | VegfAntibody
            | VegfrTki | MtorInhibitor | Pi3kInhibitor | AntibodyDrugConjugate => {
                TreatmentCategory::TargetedTherapy
            }
            AntiPd1 | AntiPdL1 | AntiCtla4 | AntiLag3 => TreatmentCategory::Immunotherapy,
            AntiAndrogen
            | AromataseInhibitor
            | SelectiveEstrogenReceptorModulator
            | SelectiveEstrogenReceptorDegrader
            | GonadotropinReleasingHormone => TreatmentCategory::HormoneTherapy,
            Brachytherapy | RadioligandTherapy | StereotacticRadiotherapy => {
                TreatmentCategory::Radiotherapy
            }
        }
    }
}

/// A position that accepts either a whole category or a single type within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TreatmentCategoryOrType {
    Category(TreatmentCategory),
    Type(DrugType),
}

impl TreatmentCategoryOrType {
    /// Categories win over types when a token is both (no such token exists today).
    pub fn from_token(token: &str) -> Option<Self> {
        TreatmentCategory::from_token(token)
            .map(Self::Category)
            .or_else(|| DrugType::from_token(token).map(Self::Type))
    }

    pub fn category(&self) -> TreatmentCategory {
        match self {
            Self::Category(category) => *category,
            Self::Type(drug_type) => drug_type.category(),
        }
    }
}

impl fmt::Display for TreatmentCategoryOrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(category) => category.fmt(f),
            Self::Type(drug_type) => drug_type.fmt(f),
        }
    }
}

token_enum! {
    /// Why a treatment line was given.
    pub enum Intent {
        Adjuvant => "ADJUVANT",
        Neoadjuvant => "NEOADJUVANT",
        Induction => "INDUCTION",
        Consolidation => "CONSOLIDATION",
        Maintenance => "MAINTENANCE",
        Palliative => "PALLIATIVE",
        Curative => "CURATIVE",
        Chemoradiation => "CHEMORADIATION",
    }
}

/// A single drug from the treatment database.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Drug {
    pub name: String,
    pub category: TreatmentCategory,
    pub drug_types: BTreeSet<DrugType>,
}

/// A named treatment (single drug, combination, radiotherapy, surgery, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Treatment {
    pub name: String,
    pub categories: BTreeSet<TreatmentCategory>,
    pub types: BTreeSet<DrugType>,
    pub drugs: BTreeSet<Drug>,
    pub is_systemic: bool,
}

// ── Tumor ─────────────────────────────────────────────────────────────────────

token_enum! {
    pub enum TumorStage {
        Stage1 => "I",
        Stage2 => "II",
        Stage2A => "IIA",
        Stage2B => "IIB",
        Stage2C => "IIC",
        Stage3 => "III",
        Stage3A => "IIIA",
        Stage3B => "IIIB",
        Stage3C => "IIIC",
        Stage4 => "IV",
    }
}

impl TumorStage {
    /// The top-level stage a sub-stage belongs to, e.g. IIIB → III.
    pub fn category(&self) -> TumorStage {
        use TumorStage::*;
        match self {
            Stage1 => Stage1,
            Stage2 | Stage2A | Stage2B | Stage2C => Stage2,
            Stage3 | Stage3A | Stage3B | Stage3C => Stage3,
            Stage4 => Stage4,
        }
    }
}

token_enum! {
    pub enum BodyLocation {
        Bone => "BONE",
        Brain => "BRAIN",
        Cns => "CNS",
        Liver => "LIVER",
        Lung => "LUNG",
        LymphNode => "LYMPH_NODE",
        AdrenalGland => "ADRENAL_GLAND",
        Peritoneum => "PERITONEUM",
        Skin => "SKIN",
    }
}

token_enum! {
    pub enum ReceptorType {
        Er => "ER",
        Pr => "PR",
        Her2 => "HER2",
    }
}

token_enum! {
    /// Histological tumor type, used for cancers of unknown primary.
    pub enum TumorTypeInput {
        Carcinoma => "CARCINOMA",
        Adenocarcinoma => "ADENOCARCINOMA",
        SquamousCellCarcinoma => "SQUAMOUS_CELL_CARCINOMA",
        Melanoma => "MELANOMA",
        Neuroendocrine => "NEUROENDOCRINE",
        Sarcoma => "SARCOMA",
    }
}

// ── Conditions ────────────────────────────────────────────────────────────────

token_enum! {
    /// New York Heart Association heart-failure class.
    pub enum NyhaClass {
        Class1 => "I",
        Class2 => "II",
        Class3 => "III",
        Class4 => "IV",
    }
}

/// An ICD code, optionally refined by an extension code (`main&extension`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IcdCode {
    pub main_code: String,
    pub extension_code: Option<String>,
}

impl IcdCode {
    pub fn new(main_code: impl Into<String>) -> Self {
        Self { main_code: main_code.into(), extension_code: None }
    }

    pub fn with_extension(main_code: impl Into<String>, extension_code: impl Into<String>) -> Self {
        Self { main_code: main_code.into(), extension_code: Some(extension_code.into()) }
    }
}

impl fmt::Display for IcdCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.extension_code {
            Some(extension) => write!(f, "{}&{}", self.main_code, extension),
            None => f.write_str(&self.main_code),
        }
    }
}

// ── Molecular ─────────────────────────────────────────────────────────────────

token_enum! {
    pub enum VariantTypeInput {
        Snv => "SNV",
        Mnv => "MNV",
        Insert => "INSERT",
        Delete => "DELETE",
        Indel => "INDEL",
        Duplication => "DUPLICATION",
    }
}

/// A validated HLA allele or allele group, e.g. `A*02:01` or `A*02`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HlaAllele {
    pub gene: String,
    pub allele_group: String,
    pub hla_protein: Option<String>,
}

impl fmt::Display for HlaAllele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hla_protein {
            Some(protein) => write!(f, "{}*{}:{}", self.gene, self.allele_group, protein),
            None => write!(f, "{}*{}", self.gene, self.allele_group),
        }
    }
}

/// A pharmacogenomic haplotype call, e.g. `*28_HOM`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Haplotype {
    pub allele: String,
    pub homozygous: bool,
}

impl fmt::Display for Haplotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.allele, if self.homozygous { "HOM" } else { "HET" })
    }
}

// ── Medication ────────────────────────────────────────────────────────────────

/// A named medication category and the ATC levels it covers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MedicationCategory {
    pub name: String,
    pub atc_levels: BTreeSet<String>,
}

token_enum! {
    pub enum Cyp {
        Cyp1a2 => "CYP1A2",
        Cyp2b6 => "CYP2B6",
        Cyp2c8 => "CYP2C8",
        Cyp2c9 => "CYP2C9",
        Cyp2c19 => "CYP2C19",
        Cyp2d6 => "CYP2D6",
        Cyp3a => "CYP3A",
        Cyp3a4 => "CYP3A4",
        Cyp3a4_5 => "CYP3A4_5",
    }
}

token_enum! {
    pub enum Transporter {
        Bcrp => "BCRP",
        PGp => "P_GP",
        Oatp1b1 => "OATP1B1",
        Oatp1b3 => "OATP1B3",
        Oat1 => "OAT1",
        Oat3 => "OAT3",
        Oct2 => "OCT2",
        Mate1 => "MATE1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_normalized_before_matching() {
        assert_eq!(TreatmentCategory::from_token(" targeted therapy "), Some(TreatmentCategory::TargetedTherapy));
        assert_eq!(Transporter::from_token("p gp"), Some(Transporter::PGp));
        assert_eq!(Cyp::from_token("cyp3a4_5"), Some(Cyp::Cyp3a4_5));
        assert_eq!(Intent::from_token("palliative"), Some(Intent::Palliative));
        assert_eq!(Intent::from_token("sometimes"), None);
    }

    #[test]
    fn category_or_type_accepts_both() {
        assert_eq!(
            TreatmentCategoryOrType::from_token("IMMUNOTHERAPY"),
            Some(TreatmentCategoryOrType::Category(TreatmentCategory::Immunotherapy))
        );
        let anti_pd1 = TreatmentCategoryOrType::from_token("anti pd 1").unwrap();
        assert_eq!(anti_pd1, TreatmentCategoryOrType::Type(DrugType::AntiPd1));
        assert_eq!(anti_pd1.category(), TreatmentCategory::Immunotherapy);
    }

    #[test]
    fn every_drug_type_has_a_category() {
        for drug_type in DrugType::ALL {
            // Exhaustive by construction; this guards the grouping itself.
            let category = drug_type.category();
            assert!(TreatmentCategory::ALL.contains(&category));
        }
        assert_eq!(DrugType::PlatinumCompound.category(), TreatmentCategory::Chemotherapy);
        assert_eq!(DrugType::AromataseInhibitor.category(), TreatmentCategory::HormoneTherapy);
    }

    #[test]
    fn stages_roll_up_to_their_category() {
        assert_eq!(TumorStage::Stage3B.category(), TumorStage::Stage3);
        assert_eq!(TumorStage::from_token("iiia"), Some(TumorStage::Stage3A));
    }

    #[test]
    fn icd_code_display_joins_extension() {
        assert_eq!(IcdCode::with_extension("2C25", "XH0EW2").to_string(), "2C25&XH0EW2");
        assert_eq!(IcdCode::new("BA41").to_string(), "BA41");
    }
}
