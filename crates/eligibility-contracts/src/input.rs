//! Parameter shapes of leaf rules.
//!
//! A `FunctionInput` names the number of parameters a leaf rule takes and the
//! domain type of every position. Shapes are declared as a table of
//! `ParamKind`s; the resolver owns one conversion routine per kind, so adding
//! a shape only means listing its positions here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The domain type expected at one parameter position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    Integer,
    Double,
    String,
    ManyStrings,
    TreatmentCategory,
    TreatmentCategoryOrType,
    ManyTreatmentCategories,
    /// `;`-separated drug types that must all belong to the category resolved
    /// at the preceding position.
    ManyTreatmentTypes,
    ManyIntents,
    SpecificTreatment,
    ManySpecificTreatments,
    ManyDrugs,
    TumorType,
    ManyTumorStages,
    BodyLocation,
    ManyBodyLocations,
    ReceptorType,
    DoidTerm,
    ManyDoidTerms,
    IcdTitle,
    ManyIcdTitles,
    NyhaClass,
    Gene,
    ManyGenes,
    ManyCodons,
    ManyProteinImpacts,
    VariantType,
    Protein,
    HlaAllele,
    HlaGroup,
    Haplotype,
    MedicationCategory,
    ManyMedicationCategories,
    Cyp,
    Transporter,
}

impl ParamKind {
    /// True for positions holding a `;`-delimited list.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            ParamKind::ManyStrings
                | ParamKind::ManyTreatmentCategories
                | ParamKind::ManyTreatmentTypes
                | ParamKind::ManyIntents
                | ParamKind::ManySpecificTreatments
                | ParamKind::ManyDrugs
                | ParamKind::ManyTumorStages
                | ParamKind::ManyBodyLocations
                | ParamKind::ManyDoidTerms
                | ParamKind::ManyIcdTitles
                | ParamKind::ManyGenes
                | ParamKind::ManyCodons
                | ParamKind::ManyProteinImpacts
                | ParamKind::ManyMedicationCategories
        )
    }

    /// Human-readable name used in rejection messages.
    pub fn describe(&self) -> &'static str {
        match self {
            ParamKind::Integer => "integer",
            ParamKind::Double => "number",
            ParamKind::String => "text",
            ParamKind::ManyStrings => "list of texts",
            ParamKind::TreatmentCategory => "treatment category",
            ParamKind::TreatmentCategoryOrType => "treatment category or type",
            ParamKind::ManyTreatmentCategories => "list of treatment categories",
            ParamKind::ManyTreatmentTypes => "list of treatment types",
            ParamKind::ManyIntents => "list of treatment intents",
            ParamKind::SpecificTreatment => "treatment name",
            ParamKind::ManySpecificTreatments => "list of treatment names",
            ParamKind::ManyDrugs => "list of drug names",
            ParamKind::TumorType => "tumor type",
            ParamKind::ManyTumorStages => "list of tumor stages",
            ParamKind::BodyLocation => "body location",
            ParamKind::ManyBodyLocations => "list of body locations",
            ParamKind::ReceptorType => "receptor type",
            ParamKind::DoidTerm => "DOID term",
            ParamKind::ManyDoidTerms => "list of DOID terms",
            ParamKind::IcdTitle => "ICD title or code",
            ParamKind::ManyIcdTitles => "list of ICD titles or codes",
            ParamKind::NyhaClass => "NYHA class",
            ParamKind::Gene => "gene",
            ParamKind::ManyGenes => "list of genes",
            ParamKind::ManyCodons => "list of codons",
            ParamKind::ManyProteinImpacts => "list of protein impacts",
            ParamKind::VariantType => "variant type",
            ParamKind::Protein => "protein",
            ParamKind::HlaAllele => "HLA allele",
            ParamKind::HlaGroup => "HLA allele group",
            ParamKind::Haplotype => "haplotype",
            ParamKind::MedicationCategory => "medication category",
            ParamKind::ManyMedicationCategories => "list of medication categories",
            ParamKind::Cyp => "CYP enzyme",
            ParamKind::Transporter => "transporter",
        }
    }
}

macro_rules! function_inputs {
    ( $( $variant:ident($token:literal) => [ $( $kind:ident ),* ] ),+ $(,)? ) => {
        /// The declared parameter shape of a leaf rule.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum FunctionInput {
            $( #[serde(rename = $token)] $variant ),+
        }

        impl FunctionInput {
            pub const ALL: &'static [FunctionInput] = &[ $( FunctionInput::$variant ),+ ];

            /// Canonical identifier, e.g. `ONE_GENE_ONE_INTEGER`.
            pub fn name(&self) -> &'static str {
                match self {
                    $( FunctionInput::$variant => $token ),+
                }
            }

            /// Domain type of every parameter position, in order.
            pub fn positions(&self) -> &'static [ParamKind] {
                match self {
                    $( FunctionInput::$variant => &[ $( ParamKind::$kind ),* ] ),+
                }
            }
        }
    };
}

function_inputs! {
    NoParameters("NONE") => [],

    // Numbers and free text
    OneInteger("ONE_INTEGER") => [Integer],
    TwoIntegers("TWO_INTEGERS") => [Integer, Integer],
    OneDouble("ONE_DOUBLE") => [Double],
    TwoDoubles("TWO_DOUBLES") => [Double, Double],
    OneString("ONE_STRING") => [String],
    TwoStrings("TWO_STRINGS") => [String, String],
    ManyStrings("MANY_STRINGS") => [ManyStrings],

    // Treatments
    OneTreatmentCategoryOrType("ONE_TREATMENT_CATEGORY_OR_TYPE") => [TreatmentCategoryOrType],
    OneTreatmentCategoryOrTypeOneInteger("ONE_TREATMENT_CATEGORY_OR_TYPE_ONE_INTEGER") => [TreatmentCategoryOrType, Integer],
    OneTreatmentCategoryOrTypeManyIntents("ONE_TREATMENT_CATEGORY_OR_TYPE_MANY_INTENTS") => [TreatmentCategoryOrType, ManyIntents],
    OneTreatmentCategoryOrTypeManyIntentsOneInteger("ONE_TREATMENT_CATEGORY_OR_TYPE_MANY_INTENTS_ONE_INTEGER") => [TreatmentCategoryOrType, ManyIntents, Integer],
    ManyTreatmentCategories("MANY_TREATMENT_CATEGORIES") => [ManyTreatmentCategories],
    OneTreatmentCategoryManyTypes("ONE_TREATMENT_CATEGORY_MANY_TYPES") => [TreatmentCategory, ManyTreatmentTypes],
    OneTreatmentCategoryManyTypesOneInteger("ONE_TREATMENT_CATEGORY_MANY_TYPES_ONE_INTEGER") => [TreatmentCategory, ManyTreatmentTypes, Integer],
    OneTreatmentCategoryManyTypesManyIntentsOneInteger("ONE_TREATMENT_CATEGORY_MANY_TYPES_MANY_INTENTS_ONE_INTEGER") => [TreatmentCategory, ManyTreatmentTypes, ManyIntents, Integer],
    OneTreatmentCategoryManyDrugs("ONE_TREATMENT_CATEGORY_MANY_DRUGS") => [TreatmentCategory, ManyDrugs],
    OneTreatmentCategoryManyTypesManyDrugs("ONE_TREATMENT_CATEGORY_MANY_TYPES_MANY_DRUGS") => [TreatmentCategory, ManyTreatmentTypes, ManyDrugs],
    ManyIntents("MANY_INTENTS") => [ManyIntents],
    ManyIntentsOneInteger("MANY_INTENTS_ONE_INTEGER") => [ManyIntents, Integer],
    OneSpecificTreatment("ONE_SPECIFIC_TREATMENT") => [SpecificTreatment],
    OneSpecificTreatmentOneInteger("ONE_SPECIFIC_TREATMENT_ONE_INTEGER") => [SpecificTreatment, Integer],
    ManySpecificTreatments("MANY_SPECIFIC_TREATMENTS") => [ManySpecificTreatments],
    ManySpecificTreatmentsOneInteger("MANY_SPECIFIC_TREATMENTS_ONE_INTEGER") => [ManySpecificTreatments, Integer],
    ManySpecificTreatmentsTwoIntegers("MANY_SPECIFIC_TREATMENTS_TWO_INTEGERS") => [ManySpecificTreatments, Integer, Integer],
    ManyDrugs("MANY_DRUGS") => [ManyDrugs],
    ManyDrugsOneInteger("MANY_DRUGS_ONE_INTEGER") => [ManyDrugs, Integer],
    ManyDrugsTwoIntegers("MANY_DRUGS_TWO_INTEGERS") => [ManyDrugs, Integer, Integer],

    // Tumor and lesions
    OneTumorType("ONE_TUMOR_TYPE") => [TumorType],
    ManyTumorStages("MANY_TUMOR_STAGES") => [ManyTumorStages],
    ManyBodyLocations("MANY_BODY_LOCATIONS") => [ManyBodyLocations],
    OneIntegerOneBodyLocation("ONE_INTEGER_ONE_BODY_LOCATION") => [Integer, BodyLocation],
    OneReceptorType("ONE_RECEPTOR_TYPE") => [ReceptorType],

    // Disease ontology and ICD
    OneDoidTerm("ONE_DOID_TERM") => [DoidTerm],
    OneDoidTermOneInteger("ONE_DOID_TERM_ONE_INTEGER") => [DoidTerm, Integer],
    ManyDoidTerms("MANY_DOID_TERMS") => [ManyDoidTerms],
    OneIntegerManyDoidTerms("ONE_INTEGER_MANY_DOID_TERMS") => [Integer, ManyDoidTerms],
    OneIcdTitle("ONE_ICD_TITLE") => [IcdTitle],
    OneIcdTitleOneInteger("ONE_ICD_TITLE_ONE_INTEGER") => [IcdTitle, Integer],
    ManyIcdTitles("MANY_ICD_TITLES") => [ManyIcdTitles],
    ManyIcdTitlesOneInteger("MANY_ICD_TITLES_ONE_INTEGER") => [ManyIcdTitles, Integer],
    OneIntegerManyIcdTitles("ONE_INTEGER_MANY_ICD_TITLES") => [Integer, ManyIcdTitles],
    OneNyhaClass("ONE_NYHA_CLASS") => [NyhaClass],

    // Molecular
    OneGene("ONE_GENE") => [Gene],
    OneGeneOneInteger("ONE_GENE_ONE_INTEGER") => [Gene, Integer],
    OneGeneOneIntegerOneVariantType("ONE_GENE_ONE_INTEGER_ONE_VARIANT_TYPE") => [Gene, Integer, VariantType],
    OneGeneTwoIntegers("ONE_GENE_TWO_INTEGERS") => [Gene, Integer, Integer],
    OneGeneOneDouble("ONE_GENE_ONE_DOUBLE") => [Gene, Double],
    OneGeneManyCodons("ONE_GENE_MANY_CODONS") => [Gene, ManyCodons],
    OneGeneManyProteinImpacts("ONE_GENE_MANY_PROTEIN_IMPACTS") => [Gene, ManyProteinImpacts],
    TwoGenes("TWO_GENES") => [Gene, Gene],
    ManyGenes("MANY_GENES") => [ManyGenes],
    OneProtein("ONE_PROTEIN") => [Protein],
    OneProteinOneInteger("ONE_PROTEIN_ONE_INTEGER") => [Protein, Integer],
    OneProteinOneString("ONE_PROTEIN_ONE_STRING") => [Protein, String],
    OneHlaAllele("ONE_HLA_ALLELE") => [HlaAllele],
    OneHlaGroup("ONE_HLA_GROUP") => [HlaGroup],
    OneHaplotype("ONE_HAPLOTYPE") => [Haplotype],

    // Medication
    OneMedicationCategory("ONE_MEDICATION_CATEGORY") => [MedicationCategory],
    OneMedicationCategoryOneInteger("ONE_MEDICATION_CATEGORY_ONE_INTEGER") => [MedicationCategory, Integer],
    ManyMedicationCategoriesOneInteger("MANY_MEDICATION_CATEGORIES_ONE_INTEGER") => [ManyMedicationCategories, Integer],
    ManyMedicationCategoriesTwoIntegers("MANY_MEDICATION_CATEGORIES_TWO_INTEGERS") => [ManyMedicationCategories, Integer, Integer],
    OneCyp("ONE_CYP") => [Cyp],
    OneCypOneInteger("ONE_CYP_ONE_INTEGER") => [Cyp, Integer],
    OneTransporter("ONE_TRANSPORTER") => [Transporter],
    OneTransporterOneInteger("ONE_TRANSPORTER_ONE_INTEGER") => [Transporter, Integer],
}

impl FunctionInput {
    pub fn arity(&self) -> usize {
        self.positions().len()
    }
}

impl fmt::Display for FunctionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arity constraint of a composite rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositeInput {
    /// `NOT`
    ExactlyOne,
    /// `AND`, `OR`
    AtLeastTwo,
    /// `WARN_IF`
    AtLeastOne,
}

impl CompositeInput {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            CompositeInput::ExactlyOne => count == 1,
            CompositeInput::AtLeastTwo => count >= 2,
            CompositeInput::AtLeastOne => count >= 1,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            CompositeInput::ExactlyOne => "exactly 1",
            CompositeInput::AtLeastTwo => "at least 2",
            CompositeInput::AtLeastOne => "at least 1",
        }
    }
}
