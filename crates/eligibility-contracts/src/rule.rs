//! The rule catalog.
//!
//! `EligibilityRule` is the closed set of rule identifiers a trial may use.
//! Every rule is declared together with its shape in one table, so the
//! identifier, the serialized name and the shape can never drift apart and a
//! rule without a shape does not compile.
//!
//! Composite rules combine nested functions; every other rule is a leaf that
//! takes raw parameter tokens matching its `FunctionInput`. The grouping
//! comments in the table follow clinical domains and carry no semantics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::input::{CompositeInput, FunctionInput};

/// Declared parameter structure of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleShape {
    /// Combines nested functions under an arity constraint.
    Composite(CompositeInput),
    /// Takes raw tokens matching the shape's position table.
    Leaf(FunctionInput),
}

macro_rules! eligibility_rules {
    (
        composite { $( $cvariant:ident($ctoken:literal) => $arity:ident ),+ $(,)? }
        leaf { $( $lvariant:ident($ltoken:literal) => $shape:ident ),+ $(,)? }
    ) => {
        /// Identifier of an eligibility rule.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum EligibilityRule {
            $( #[serde(rename = $ctoken)] $cvariant, )+
            $( #[serde(rename = $ltoken)] $lvariant, )+
        }

        impl EligibilityRule {
            pub const ALL: &'static [EligibilityRule] = &[
                $( EligibilityRule::$cvariant, )+
                $( EligibilityRule::$lvariant, )+
            ];

            /// Catalog identifier, e.g. `IS_AT_LEAST_X_YEARS_OLD`.
            pub fn name(&self) -> &'static str {
                match self {
                    $( EligibilityRule::$cvariant => $ctoken, )+
                    $( EligibilityRule::$lvariant => $ltoken, )+
                }
            }

            pub fn shape(&self) -> RuleShape {
                match self {
                    $( EligibilityRule::$cvariant => RuleShape::Composite(CompositeInput::$arity), )+
                    $( EligibilityRule::$lvariant => RuleShape::Leaf(FunctionInput::$shape), )+
                }
            }

            fn lookup(name: &str) -> Option<EligibilityRule> {
                match name {
                    $( $ctoken => Some(EligibilityRule::$cvariant), )+
                    $( $ltoken => Some(EligibilityRule::$lvariant), )+
                    _ => None,
                }
            }
        }
    };
}

eligibility_rules! {
    composite {
        And("AND") => AtLeastTwo,
        Or("OR") => AtLeastTwo,
        Not("NOT") => ExactlyOne,
        WarnIf("WARN_IF") => AtLeastOne,
    }
    leaf {
        // General
        IsAtLeastXYearsOld("IS_AT_LEAST_X_YEARS_OLD") => OneInteger,
        IsMale("IS_MALE") => NoParameters,
        IsFemale("IS_FEMALE") => NoParameters,
        HasWhoStatusOfAtMostX("HAS_WHO_STATUS_OF_AT_MOST_X") => OneInteger,
        HasWhoStatusOfAtLeastX("HAS_WHO_STATUS_OF_AT_LEAST_X") => OneInteger,
        HasKarnofskyScoreOfAtLeastX("HAS_KARNOFSKY_SCORE_OF_AT_LEAST_X") => OneInteger,
        HasLanskyScoreOfAtLeastX("HAS_LANSKY_SCORE_OF_AT_LEAST_X") => OneInteger,
        CanGiveAdequateInformedConsent("CAN_GIVE_ADEQUATE_INFORMED_CONSENT") => NoParameters,
        HasRapidlyProgressiveDisease("HAS_RAPIDLY_PROGRESSIVE_DISEASE") => NoParameters,
        HasAdequateOrganFunction("HAS_ADEQUATE_ORGAN_FUNCTION") => NoParameters,
        HasInadequateOrganFunction("HAS_INADEQUATE_ORGAN_FUNCTION") => NoParameters,
        HasLifeExpectancyOfAtLeastXWeeks("HAS_LIFE_EXPECTANCY_OF_AT_LEAST_X_WEEKS") => OneInteger,
        HasLifeExpectancyOfAtLeastXMonths("HAS_LIFE_EXPECTANCY_OF_AT_LEAST_X_MONTHS") => OneInteger,
        IsInvolvedInStudyProcedures("IS_INVOLVED_IN_STUDY_PROCEDURES") => NoParameters,
        PatientIsTreatedInHospitalX("PATIENT_IS_TREATED_IN_HOSPITAL_X") => OneString,
        PatientWillBeParticipatingInCountryX("PATIENT_WILL_BE_PARTICIPATING_IN_COUNTRY_X") => OneString,
        PatientIsLegallyIncapacitated("PATIENT_IS_LEGALLY_INCAPACITATED") => NoParameters,

        // Tumor and lesion localization
        HasSolidPrimaryTumor("HAS_SOLID_PRIMARY_TUMOR") => NoParameters,
        HasSolidPrimaryTumorIncludingLymphoma("HAS_SOLID_PRIMARY_TUMOR_INCLUDING_LYMPHOMA") => NoParameters,
        HasPrimaryTumorLocationBelongingToDoidTermX("HAS_PRIMARY_TUMOR_LOCATION_BELONGING_TO_DOID_TERM_X") => OneDoidTerm,
        HasPrimaryTumorLocationBelongingToAnyDoidTermX("HAS_PRIMARY_TUMOR_LOCATION_BELONGING_TO_ANY_DOID_TERM_X") => ManyDoidTerms,
        HasCancerOfUnknownPrimaryAndTypeX("HAS_CANCER_OF_UNKNOWN_PRIMARY_AND_TYPE_X") => OneTumorType,
        HasCancerWithNeuroendocrineComponent("HAS_CANCER_WITH_NEUROENDOCRINE_COMPONENT") => NoParameters,
        HasCancerWithSmallCellComponent("HAS_CANCER_WITH_SMALL_CELL_COMPONENT") => NoParameters,
        HasSquamousNsclc("HAS_SQUAMOUS_NSCLC") => NoParameters,
        HasNonSquamousNsclc("HAS_NON_SQUAMOUS_NSCLC") => NoParameters,
        HasLeftSidedColorectalTumor("HAS_LEFT_SIDED_COLORECTAL_TUMOR") => NoParameters,
        HasBreastCancerHormonePositiveAndHer2Negative("HAS_BREAST_CANCER_HORMONE_POSITIVE_AND_HER2_NEGATIVE") => NoParameters,
        HasBreastCancerWithPositiveReceptorOfTypeX("HAS_BREAST_CANCER_WITH_POSITIVE_RECEPTOR_OF_TYPE_X") => OneReceptorType,
        HasOvarianCancerWithMucinousHistology("HAS_OVARIAN_CANCER_WITH_MUCINOUS_HISTOLOGY") => NoParameters,
        HasOvarianBorderlineTumor("HAS_OVARIAN_BORDERLINE_TUMOR") => NoParameters,
        HasStomachUndifferentiatedTumor("HAS_STOMACH_UNDIFFERENTIATED_TUMOR") => NoParameters,
        HasSecondaryGlioblastoma("HAS_SECONDARY_GLIOBLASTOMA") => NoParameters,
        HasCytologicalDocumentationOfTumorType("HAS_CYTOLOGICAL_DOCUMENTATION_OF_TUMOR_TYPE") => NoParameters,
        HasHistologicalDocumentationOfTumorType("HAS_HISTOLOGICAL_DOCUMENTATION_OF_TUMOR_TYPE") => NoParameters,
        HasStageX("HAS_STAGE_X") => ManyTumorStages,
        HasLocallyAdvancedCancer("HAS_LOCALLY_ADVANCED_CANCER") => NoParameters,
        HasMetastaticCancer("HAS_METASTATIC_CANCER") => NoParameters,
        HasUnresectableCancer("HAS_UNRESECTABLE_CANCER") => NoParameters,
        HasUnresectableStageIiiCancer("HAS_UNRESECTABLE_STAGE_III_CANCER") => NoParameters,
        HasRecurrentCancer("HAS_RECURRENT_CANCER") => NoParameters,
        HasIncurableCancer("HAS_INCURABLE_CANCER") => NoParameters,
        HasAnyLesion("HAS_ANY_LESION") => NoParameters,
        HasLiverMetastases("HAS_LIVER_METASTASES") => NoParameters,
        HasLiverMetastasesOnly("HAS_LIVER_METASTASES_ONLY") => NoParameters,
        HasKnownCnsMetastases("HAS_KNOWN_CNS_METASTASES") => NoParameters,
        HasKnownActiveCnsMetastases("HAS_KNOWN_ACTIVE_CNS_METASTASES") => NoParameters,
        HasKnownBrainMetastases("HAS_KNOWN_BRAIN_METASTASES") => NoParameters,
        HasKnownActiveBrainMetastases("HAS_KNOWN_ACTIVE_BRAIN_METASTASES") => NoParameters,
        HasBoneMetastases("HAS_BONE_METASTASES") => NoParameters,
        HasBoneMetastasesOnly("HAS_BONE_METASTASES_ONLY") => NoParameters,
        HasLungMetastases("HAS_LUNG_METASTASES") => NoParameters,
        HasLymphNodeMetastases("HAS_LYMPH_NODE_METASTASES") => NoParameters,
        HasVisceralMetastases("HAS_VISCERAL_METASTASES") => NoParameters,
        HasLesionsInAnyBodyLocationX("HAS_LESIONS_IN_ANY_BODY_LOCATION_X") => ManyBodyLocations,
        HasAtLeastXLesionsInBodyLocationY("HAS_AT_LEAST_X_LESIONS_IN_BODY_LOCATION_Y") => OneIntegerOneBodyLocation,
        HasMinimumSitesWithLesions("HAS_MINIMUM_SITES_WITH_LESIONS") => OneInteger,
        HasExtensiveSystemicMetastasesPredominantlyDeterminingPrognosis("HAS_EXTENSIVE_SYSTEMIC_METASTASES_PREDOMINANTLY_DETERMINING_PROGNOSIS") => NoParameters,
        HasBiopsyAmenableLesion("HAS_BIOPSY_AMENABLE_LESION") => NoParameters,
        HasIrradiationAmenableLesion("HAS_IRRADIATION_AMENABLE_LESION") => NoParameters,
        HasInjectionAmenableLesion("HAS_INJECTION_AMENABLE_LESION") => NoParameters,
        HasMriVolumeMeasurementAmenableLesion("HAS_MRI_VOLUME_MEASUREMENT_AMENABLE_LESION") => NoParameters,
        HasMeasurableDisease("HAS_MEASURABLE_DISEASE") => NoParameters,
        HasMeasurableDiseaseRecist("HAS_MEASURABLE_DISEASE_RECIST") => NoParameters,
        HasMeasurableDiseaseRano("HAS_MEASURABLE_DISEASE_RANO") => NoParameters,
        HasEvaluableDisease("HAS_EVALUABLE_DISEASE") => NoParameters,
        HasProgressiveDiseaseAccordingToSpecificCriteria("HAS_PROGRESSIVE_DISEASE_ACCORDING_TO_SPECIFIC_CRITERIA") => NoParameters,
        HasEvidenceOfCnsHemorrhageByMri("HAS_EVIDENCE_OF_CNS_HEMORRHAGE_BY_MRI") => NoParameters,
        HasIntratumoralHemorrhageByMri("HAS_INTRATUMORAL_HEMORRHAGE_BY_MRI") => NoParameters,
        HasLowRiskOfHemorrhageUponTreatment("HAS_LOW_RISK_OF_HEMORRHAGE_UPON_TREATMENT") => NoParameters,
        HasSuperscanBoneScan("HAS_SUPERSCAN_BONE_SCAN") => NoParameters,
        HasPsmaPositivePetScan("HAS_PSMA_POSITIVE_PET_SCAN") => NoParameters,
        MeetsSpecificCriteriaRegardingLiverMetastases("MEETS_SPECIFIC_CRITERIA_REGARDING_LIVER_METASTASES") => NoParameters,
        MeetsSpecificCriteriaRegardingBrainMetastases("MEETS_SPECIFIC_CRITERIA_REGARDING_BRAIN_METASTASES") => NoParameters,
        CanProvideFreshSampleForFurtherAnalysis("CAN_PROVIDE_FRESH_SAMPLE_FOR_FURTHER_ANALYSIS") => NoParameters,
        CanProvideArchivalSampleForFurtherAnalysis("CAN_PROVIDE_ARCHIVAL_SAMPLE_FOR_FURTHER_ANALYSIS") => NoParameters,

        // Prior treatment
        IsNotEligibleForTreatmentWithCurativeIntent("IS_NOT_ELIGIBLE_FOR_TREATMENT_WITH_CURATIVE_INTENT") => NoParameters,
        IsEligibleForOnLabelTreatmentX("IS_ELIGIBLE_FOR_ON_LABEL_TREATMENT_X") => OneSpecificTreatment,
        IsEligibleForPalliativeRadiotherapy("IS_ELIGIBLE_FOR_PALLIATIVE_RADIOTHERAPY") => NoParameters,
        IsEligibleForLocalLiverTreatment("IS_ELIGIBLE_FOR_LOCAL_LIVER_TREATMENT") => NoParameters,
        IsEligibleForIntensiveTreatment("IS_ELIGIBLE_FOR_INTENSIVE_TREATMENT") => NoParameters,
        HasExhaustedSocTreatments("HAS_EXHAUSTED_SOC_TREATMENTS") => NoParameters,
        HasHadAtLeastXApprovedTreatmentLines("HAS_HAD_AT_LEAST_X_APPROVED_TREATMENT_LINES") => OneInteger,
        HasHadAtLeastXSystemicTreatmentLines("HAS_HAD_AT_LEAST_X_SYSTEMIC_TREATMENT_LINES") => OneInteger,
        HasHadAtMostXSystemicTreatmentLines("HAS_HAD_AT_MOST_X_SYSTEMIC_TREATMENT_LINES") => OneInteger,
        HasHadTreatmentNameX("HAS_HAD_TREATMENT_NAME_X") => OneSpecificTreatment,
        HasHadTreatmentNameXWithinYWeeks("HAS_HAD_TREATMENT_NAME_X_WITHIN_Y_WEEKS") => OneSpecificTreatmentOneInteger,
        HasHadCombinedTreatmentNamesX("HAS_HAD_COMBINED_TREATMENT_NAMES_X") => ManySpecificTreatments,
        HasHadCombinedTreatmentNamesXWithinYWeeks("HAS_HAD_COMBINED_TREATMENT_NAMES_X_WITHIN_Y_WEEKS") => ManySpecificTreatmentsOneInteger,
        HasHadCombinedTreatmentNamesXForAtLeastYCyclesWithinZWeeks("HAS_HAD_COMBINED_TREATMENT_NAMES_X_FOR_AT_LEAST_Y_CYCLES_WITHIN_Z_WEEKS") => ManySpecificTreatmentsTwoIntegers,
        HasHadTreatmentWithAnyDrugX("HAS_HAD_TREATMENT_WITH_ANY_DRUG_X") => ManyDrugs,
        HasHadTreatmentWithAnyDrugXWithinYWeeks("HAS_HAD_TREATMENT_WITH_ANY_DRUG_X_WITHIN_Y_WEEKS") => ManyDrugsOneInteger,
        HasHadTreatmentWithAnyDrugXAsMostRecentLine("HAS_HAD_TREATMENT_WITH_ANY_DRUG_X_AS_MOST_RECENT_LINE") => ManyDrugs,
        HasHadTreatmentWithAnyDrugXForBetweenYAndZCycles("HAS_HAD_TREATMENT_WITH_ANY_DRUG_X_FOR_BETWEEN_Y_AND_Z_CYCLES") => ManyDrugsTwoIntegers,
        HasHadPdFollowingTreatmentWithAnyDrugX("HAS_HAD_PD_FOLLOWING_TREATMENT_WITH_ANY_DRUG_X") => ManyDrugs,
        HasHadTreatmentWithAnyCategoryX("HAS_HAD_TREATMENT_WITH_ANY_CATEGORY_X") => ManyTreatmentCategories,
        HasHadCategoryXTreatment("HAS_HAD_CATEGORY_X_TREATMENT") => OneTreatmentCategoryOrType,
        HasHadCategoryXTreatmentWithinYWeeks("HAS_HAD_CATEGORY_X_TREATMENT_WITHIN_Y_WEEKS") => OneTreatmentCategoryOrTypeOneInteger,
        HasHadCategoryXTreatmentAndAtLeastYLines("HAS_HAD_CATEGORY_X_TREATMENT_AND_AT_LEAST_Y_LINES") => OneTreatmentCategoryOrTypeOneInteger,
        HasHadCategoryXTreatmentAndAtMostYLines("HAS_HAD_CATEGORY_X_TREATMENT_AND_AT_MOST_Y_LINES") => OneTreatmentCategoryOrTypeOneInteger,
        HasHadCategoryXTreatmentWithAnyIntentY("HAS_HAD_CATEGORY_X_TREATMENT_WITH_ANY_INTENT_Y") => OneTreatmentCategoryOrTypeManyIntents,
        HasHadCategoryXTreatmentWithAnyIntentYWithinZWeeks("HAS_HAD_CATEGORY_X_TREATMENT_WITH_ANY_INTENT_Y_WITHIN_Z_WEEKS") => OneTreatmentCategoryOrTypeManyIntentsOneInteger,
        HasHadCategoryXTreatmentOfTypesY("HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y") => OneTreatmentCategoryManyTypes,
        HasHadCategoryXTreatmentOfTypesYWithinZWeeks("HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y_WITHIN_Z_WEEKS") => OneTreatmentCategoryManyTypesOneInteger,
        HasHadCategoryXTreatmentOfTypesYAndAtLeastZLines("HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y_AND_AT_LEAST_Z_LINES") => OneTreatmentCategoryManyTypesOneInteger,
        HasHadCategoryXTreatmentOfTypesYAndAtMostZLines("HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y_AND_AT_MOST_Z_LINES") => OneTreatmentCategoryManyTypesOneInteger,
        HasHadCategoryXTreatmentOfTypesYAsMostRecentLine("HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y_AS_MOST_RECENT_LINE") => OneTreatmentCategoryManyTypes,
        HasHadCategoryXTreatmentOfTypesYWithAnyIntentZWithinWWeeks("HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y_WITH_ANY_INTENT_Z_WITHIN_W_WEEKS") => OneTreatmentCategoryManyTypesManyIntentsOneInteger,
        HasHadCategoryXTreatmentOfTypesYWithDrugsZ("HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y_WITH_DRUGS_Z") => OneTreatmentCategoryManyTypesManyDrugs,
        HasHadCategoryXTreatmentIgnoringTypesY("HAS_HAD_CATEGORY_X_TREATMENT_IGNORING_TYPES_Y") => OneTreatmentCategoryManyTypes,
        HasHadCategoryXTreatmentIgnoringDrugsY("HAS_HAD_CATEGORY_X_TREATMENT_IGNORING_DRUGS_Y") => OneTreatmentCategoryManyDrugs,
        HasHadCategoryXTreatmentWithAnyDrugY("HAS_HAD_CATEGORY_X_TREATMENT_WITH_ANY_DRUG_Y") => OneTreatmentCategoryManyDrugs,
        HasHadPdFollowingCategoryXTreatment("HAS_HAD_PD_FOLLOWING_CATEGORY_X_TREATMENT") => OneTreatmentCategoryOrType,
        HasHadPdFollowingCategoryXTreatmentOfTypesY("HAS_HAD_PD_FOLLOWING_CATEGORY_X_TREATMENT_OF_TYPES_Y") => OneTreatmentCategoryManyTypes,
        HasHadPdFollowingCategoryXTreatmentOfTypesYAndAtLeastZCycles("HAS_HAD_PD_FOLLOWING_CATEGORY_X_TREATMENT_OF_TYPES_Y_AND_AT_LEAST_Z_CYCLES") => OneTreatmentCategoryManyTypesOneInteger,
        HasHadAdjuvantCategoryXTreatment("HAS_HAD_ADJUVANT_CATEGORY_X_TREATMENT") => OneTreatmentCategoryOrType,
        HasHadAdjuvantCategoryXTreatmentWithinYWeeks("HAS_HAD_ADJUVANT_CATEGORY_X_TREATMENT_WITHIN_Y_WEEKS") => OneTreatmentCategoryOrTypeOneInteger,
        HasHadSystemicTherapyWithAnyIntentX("HAS_HAD_SYSTEMIC_THERAPY_WITH_ANY_INTENT_X") => ManyIntents,
        HasHadSystemicTherapyWithAnyIntentXWithinYWeeks("HAS_HAD_SYSTEMIC_THERAPY_WITH_ANY_INTENT_X_WITHIN_Y_WEEKS") => ManyIntentsOneInteger,
        HasHadTargetedTherapyInterferingWithAnyGeneX("HAS_HAD_TARGETED_THERAPY_INTERFERING_WITH_ANY_GENE_X") => ManyGenes,
        HasHadRadiotherapyToAnyBodyLocationX("HAS_HAD_RADIOTHERAPY_TO_ANY_BODY_LOCATION_X") => ManyBodyLocations,
        HasHadPartialResection("HAS_HAD_PARTIAL_RESECTION") => NoParameters,
        HasHadResectionWithinXWeeks("HAS_HAD_RESECTION_WITHIN_X_WEEKS") => OneInteger,
        HasHadLocalHepaticTherapyWithinXWeeks("HAS_HAD_LOCAL_HEPATIC_THERAPY_WITHIN_X_WEEKS") => OneInteger,
        HasHadIntratumoralInjectionTreatment("HAS_HAD_INTRATUMORAL_INJECTION_TREATMENT") => NoParameters,
        HasCumulativeAnthracyclineExposureOfAtMostXMgPerM2DoxorubicinOrEquivalents("HAS_CUMULATIVE_ANTHRACYCLINE_EXPOSURE_OF_AT_MOST_X_MG_PER_M2_DOXORUBICIN_OR_EQUIVALENTS") => OneDouble,
        HasParticipatedInCurrentTrial("HAS_PARTICIPATED_IN_CURRENT_TRIAL") => NoParameters,
        IsParticipatingInAnotherTrial("IS_PARTICIPATING_IN_ANOTHER_TRIAL") => NoParameters,
        HasPreviouslyParticipatedInTrial("HAS_PREVIOUSLY_PARTICIPATED_IN_TRIAL") => NoParameters,
        HasPreviouslyParticipatedInTrialWithAcronymX("HAS_PREVIOUSLY_PARTICIPATED_IN_TRIAL_WITH_ACRONYM_X") => OneString,

        // Molecular
        MolecularResultsMustBeAvailable("MOLECULAR_RESULTS_MUST_BE_AVAILABLE") => NoParameters,
        MolecularTestMustHaveBeenDoneForGeneX("MOLECULAR_TEST_MUST_HAVE_BEEN_DONE_FOR_GENE_X") => OneGene,
        MolecularTestMustHaveBeenDoneForProteinX("MOLECULAR_TEST_MUST_HAVE_BEEN_DONE_FOR_PROTEIN_X") => OneProtein,
        ActivationOrAmplificationOfGeneX("ACTIVATION_OR_AMPLIFICATION_OF_GENE_X") => OneGene,
        InactivationOfGeneX("INACTIVATION_OF_GENE_X") => OneGene,
        ActivatingMutationInGeneX("ACTIVATING_MUTATION_IN_GENE_X") => OneGene,
        ActivatingMutationInAnyGenesX("ACTIVATING_MUTATION_IN_ANY_GENES_X") => ManyGenes,
        MutationInGeneXOfAnyProteinImpactsY("MUTATION_IN_GENE_X_OF_ANY_PROTEIN_IMPACTS_Y") => OneGeneManyProteinImpacts,
        MutationInGeneXInAnyCodonsY("MUTATION_IN_GENE_X_IN_ANY_CODONS_Y") => OneGeneManyCodons,
        MutationInGeneXInExonY("MUTATION_IN_GENE_X_IN_EXON_Y") => OneGeneOneInteger,
        MutationInGeneXInExonYOfTypeZ("MUTATION_IN_GENE_X_IN_EXON_Y_OF_TYPE_Z") => OneGeneOneIntegerOneVariantType,
        MutationInGeneXInExonsYToZ("MUTATION_IN_GENE_X_IN_EXONS_Y_TO_Z") => OneGeneTwoIntegers,
        MutationInGeneXWithVafOfAtLeastY("MUTATION_IN_GENE_X_WITH_VAF_OF_AT_LEAST_Y") => OneGeneOneDouble,
        ExonSkippingGeneXExonY("EXON_SKIPPING_GENE_X_EXON_Y") => OneGeneOneInteger,
        AmplificationOfGeneX("AMPLIFICATION_OF_GENE_X") => OneGene,
        AmplificationOfGeneXOfAtLeastYCopies("AMPLIFICATION_OF_GENE_X_OF_AT_LEAST_Y_COPIES") => OneGeneOneInteger,
        DeletionOfGeneX("DELETION_OF_GENE_X") => OneGene,
        FusionInGeneX("FUSION_IN_GENE_X") => OneGene,
        SpecificFusionOfGeneXToGeneY("SPECIFIC_FUSION_OF_GENE_X_TO_GENE_Y") => TwoGenes,
        WildtypeOfGeneX("WILDTYPE_OF_GENE_X") => OneGene,
        WildtypeOfGenesX("WILDTYPE_OF_GENES_X") => ManyGenes,
        HasMolecularDriverEventInNsclc("HAS_MOLECULAR_DRIVER_EVENT_IN_NSCLC") => NoParameters,
        HasMolecularDriverEventInNsclcExcludingGenesX("HAS_MOLECULAR_DRIVER_EVENT_IN_NSCLC_EXCLUDING_GENES_X") => ManyGenes,
        HasEgfrPaccMutation("HAS_EGFR_PACC_MUTATION") => NoParameters,
        HasCodeletionOfChromosomeArmsXAndY("HAS_CODELETION_OF_CHROMOSOME_ARMS_X_AND_Y") => TwoStrings,
        ProteinIsExpressedByIhc("PROTEIN_IS_EXPRESSED_BY_IHC") => OneProtein,
        ProteinIsNotExpressedByIhc("PROTEIN_IS_NOT_EXPRESSED_BY_IHC") => OneProtein,
        ProteinIsWildTypeByIhc("PROTEIN_IS_WILD_TYPE_BY_IHC") => OneProtein,
        ExpressionOfProteinXByIhcOfExactlyY("EXPRESSION_OF_PROTEIN_X_BY_IHC_OF_EXACTLY_Y") => OneProteinOneInteger,
        ExpressionOfProteinXByIhcOfAtLeastY("EXPRESSION_OF_PROTEIN_X_BY_IHC_OF_AT_LEAST_Y") => OneProteinOneInteger,
        ExpressionOfProteinXByIhcOfAtMostY("EXPRESSION_OF_PROTEIN_X_BY_IHC_OF_AT_MOST_Y") => OneProteinOneInteger,
        ExpressionOfProteinXByIhcOfLevelY("EXPRESSION_OF_PROTEIN_X_BY_IHC_OF_LEVEL_Y") => OneProteinOneString,
        PdL1ScoreOfAtLeastX("PD_L1_SCORE_OF_AT_LEAST_X") => OneDouble,
        PdL1ScoreOfAtMostX("PD_L1_SCORE_OF_AT_MOST_X") => OneDouble,
        PdL1ScoreCpsOfAtLeastX("PD_L1_SCORE_CPS_OF_AT_LEAST_X") => OneInteger,
        PdL1ScoreCpsOfAtMostX("PD_L1_SCORE_CPS_OF_AT_MOST_X") => OneInteger,
        PdL1ScoreTpsOfAtLeastX("PD_L1_SCORE_TPS_OF_AT_LEAST_X") => OneDouble,
        PdL1ScoreTpsOfAtMostX("PD_L1_SCORE_TPS_OF_AT_MOST_X") => OneDouble,
        MsiSignature("MSI_SIGNATURE") => NoParameters,
        HrdSignature("HRD_SIGNATURE") => NoParameters,
        TmbOfAtLeastX("TMB_OF_AT_LEAST_X") => OneDouble,
        TmlOfAtLeastX("TML_OF_AT_LEAST_X") => OneInteger,
        TmlOfAtMostX("TML_OF_AT_MOST_X") => OneInteger,
        HasHlaTypeX("HAS_HLA_TYPE_X") => OneHlaAllele,
        HasHlaGroupX("HAS_HLA_GROUP_X") => OneHlaGroup,
        HasUgt1a1HaplotypeX("HAS_UGT1A1_HAPLOTYPE_X") => OneHaplotype,
        HasHomozygousDpydDeficiency("HAS_HOMOZYGOUS_DPYD_DEFICIENCY") => NoParameters,
        HasHeterozygousDpydDeficiency("HAS_HETEROZYGOUS_DPYD_DEFICIENCY") => NoParameters,
        HasKnownHpvStatus("HAS_KNOWN_HPV_STATUS") => NoParameters,

        // Laboratory
        HasLeukocytesAbsOfAtLeastX("HAS_LEUKOCYTES_ABS_OF_AT_LEAST_X") => OneDouble,
        HasLeukocytesAbsLlnOfAtLeastX("HAS_LEUKOCYTES_ABS_LLN_OF_AT_LEAST_X") => OneDouble,
        HasNeutrophilsAbsOfAtLeastX("HAS_NEUTROPHILS_ABS_OF_AT_LEAST_X") => OneDouble,
        HasNeutrophilsAbsBetweenXAndY("HAS_NEUTROPHILS_ABS_BETWEEN_X_AND_Y") => TwoDoubles,
        HasLymphocytesAbsOfAtLeastX("HAS_LYMPHOCYTES_ABS_OF_AT_LEAST_X") => OneDouble,
        HasThrombocytesAbsOfAtLeastX("HAS_THROMBOCYTES_ABS_OF_AT_LEAST_X") => OneDouble,
        HasHemoglobinGPerDlOfAtLeastX("HAS_HEMOGLOBIN_G_PER_DL_OF_AT_LEAST_X") => OneDouble,
        HasHemoglobinMmolPerLOfAtLeastX("HAS_HEMOGLOBIN_MMOL_PER_L_OF_AT_LEAST_X") => OneDouble,
        HasCreatinineUlnOfAtMostX("HAS_CREATININE_ULN_OF_AT_MOST_X") => OneDouble,
        HasCreatinineMgPerDlOfAtMostX("HAS_CREATININE_MG_PER_DL_OF_AT_MOST_X") => OneDouble,
        HasCreatinineUmolPerLOfAtMostX("HAS_CREATININE_UMOL_PER_L_OF_AT_MOST_X") => OneDouble,
        HasEgfrCkdEpiOfAtLeastX("HAS_EGFR_CKD_EPI_OF_AT_LEAST_X") => OneDouble,
        HasEgfrMdrdOfAtLeastX("HAS_EGFR_MDRD_OF_AT_LEAST_X") => OneDouble,
        HasCreatinineClearanceCgOfAtLeastX("HAS_CREATININE_CLEARANCE_CG_OF_AT_LEAST_X") => OneDouble,
        HasCreatinineClearanceBetweenXAndY("HAS_CREATININE_CLEARANCE_BETWEEN_X_AND_Y") => TwoDoubles,
        HasTotalBilirubinUlnOfAtMostX("HAS_TOTAL_BILIRUBIN_ULN_OF_AT_MOST_X") => OneDouble,
        HasTotalBilirubinUmolPerLOfAtMostX("HAS_TOTAL_BILIRUBIN_UMOL_PER_L_OF_AT_MOST_X") => OneDouble,
        HasTotalBilirubinUlnOfAtMostXOrYIfGilbertDisease("HAS_TOTAL_BILIRUBIN_ULN_OF_AT_MOST_X_OR_Y_IF_GILBERT_DISEASE") => TwoDoubles,
        HasDirectBilirubinUlnOfAtMostX("HAS_DIRECT_BILIRUBIN_ULN_OF_AT_MOST_X") => OneDouble,
        HasAsatUlnOfAtMostX("HAS_ASAT_ULN_OF_AT_MOST_X") => OneDouble,
        HasAlatUlnOfAtMostX("HAS_ALAT_ULN_OF_AT_MOST_X") => OneDouble,
        HasAsatAndAlatUlnOfAtMostXOrAtMostYWhenLiverMetastasesPresent("HAS_ASAT_AND_ALAT_ULN_OF_AT_MOST_X_OR_AT_MOST_Y_WHEN_LIVER_METASTASES_PRESENT") => TwoDoubles,
        HasAlpUlnOfAtMostX("HAS_ALP_ULN_OF_AT_MOST_X") => OneDouble,
        HasAlbuminGPerDlOfAtLeastX("HAS_ALBUMIN_G_PER_DL_OF_AT_LEAST_X") => OneDouble,
        HasInrUlnOfAtMostX("HAS_INR_ULN_OF_AT_MOST_X") => OneDouble,
        HasPtUlnOfAtMostX("HAS_PT_ULN_OF_AT_MOST_X") => OneDouble,
        HasApttUlnOfAtMostX("HAS_APTT_ULN_OF_AT_MOST_X") => OneDouble,
        HasLdhUlnOfAtMostX("HAS_LDH_ULN_OF_AT_MOST_X") => OneDouble,
        HasLipaseUlnOfAtMostX("HAS_LIPASE_ULN_OF_AT_MOST_X") => OneDouble,
        HasAmylaseUlnOfAtMostX("HAS_AMYLASE_ULN_OF_AT_MOST_X") => OneDouble,
        HasTroponinITUlnOfAtMostX("HAS_TROPONIN_I_T_ULN_OF_AT_MOST_X") => OneDouble,
        HasBnpUlnOfAtMostX("HAS_BNP_ULN_OF_AT_MOST_X") => OneDouble,
        HasTestosteroneNgPerDlOfAtMostX("HAS_TESTOSTERONE_NG_PER_DL_OF_AT_MOST_X") => OneDouble,
        HasGlucoseFastingPlasmaMmolPerLOfAtMostX("HAS_GLUCOSE_FASTING_PLASMA_MMOL_PER_L_OF_AT_MOST_X") => OneDouble,
        HasHba1cPercentageOfAtMostX("HAS_HBA1C_PERCENTAGE_OF_AT_MOST_X") => OneDouble,
        HasPotassiumWithinInstitutionalNormalLimits("HAS_POTASSIUM_WITHIN_INSTITUTIONAL_NORMAL_LIMITS") => NoParameters,
        HasMagnesiumWithinInstitutionalNormalLimits("HAS_MAGNESIUM_WITHIN_INSTITUTIONAL_NORMAL_LIMITS") => NoParameters,
        HasPhosphateWithinInstitutionalNormalLimits("HAS_PHOSPHATE_WITHIN_INSTITUTIONAL_NORMAL_LIMITS") => NoParameters,
        HasCorrectedCalciumWithinInstitutionalNormalLimits("HAS_CORRECTED_CALCIUM_WITHIN_INSTITUTIONAL_NORMAL_LIMITS") => NoParameters,
        HasSodiumWithinInstitutionalNormalLimits("HAS_SODIUM_WITHIN_INSTITUTIONAL_NORMAL_LIMITS") => NoParameters,
        HasThyroidFunctionWithinInstitutionalNormalLimits("HAS_THYROID_FUNCTION_WITHIN_INSTITUTIONAL_NORMAL_LIMITS") => NoParameters,
        HasAntiHlaAntibodiesAgainstPdcLine("HAS_ANTI_HLA_ANTIBODIES_AGAINST_PDC_LINE") => NoParameters,
        HasAdequateHematologicalFunction("HAS_ADEQUATE_HEMATOLOGICAL_FUNCTION") => NoParameters,

        // Other conditions
        HasHadOtherConditionWithIcdTitleX("HAS_HAD_OTHER_CONDITION_WITH_ICD_TITLE_X") => OneIcdTitle,
        HasHadOtherConditionWithIcdTitleXWithinYMonths("HAS_HAD_OTHER_CONDITION_WITH_ICD_TITLE_X_WITHIN_Y_MONTHS") => OneIcdTitleOneInteger,
        HasHadOtherConditionWithIcdCodeFromSetX("HAS_HAD_OTHER_CONDITION_WITH_ICD_CODE_FROM_SET_X") => ManyIcdTitles,
        HasHadOtherConditionWithIcdCodeFromSetXWithinYMonths("HAS_HAD_OTHER_CONDITION_WITH_ICD_CODE_FROM_SET_X_WITHIN_Y_MONTHS") => ManyIcdTitlesOneInteger,
        HasHadOtherConditionBelongingToDoidTermX("HAS_HAD_OTHER_CONDITION_BELONGING_TO_DOID_TERM_X") => OneDoidTerm,
        HasHistoryOfSecondMalignancy("HAS_HISTORY_OF_SECOND_MALIGNANCY") => NoParameters,
        HasHistoryOfSecondMalignancyWithinXYears("HAS_HISTORY_OF_SECOND_MALIGNANCY_WITHIN_X_YEARS") => OneInteger,
        HasHistoryOfSecondMalignancyBelongingToDoidTermX("HAS_HISTORY_OF_SECOND_MALIGNANCY_BELONGING_TO_DOID_TERM_X") => OneDoidTerm,
        HasHistoryOfSecondMalignancyBelongingToDoidTermXWithinYYears("HAS_HISTORY_OF_SECOND_MALIGNANCY_BELONGING_TO_DOID_TERM_X_WITHIN_Y_YEARS") => OneDoidTermOneInteger,
        HasHistoryOfSecondMalignancyIgnoringDoidTermsX("HAS_HISTORY_OF_SECOND_MALIGNANCY_IGNORING_DOID_TERMS_X") => ManyDoidTerms,
        HasHistoryOfSecondMalignancyWithinXYearsIgnoringDoidTermsY("HAS_HISTORY_OF_SECOND_MALIGNANCY_WITHIN_X_YEARS_IGNORING_DOID_TERMS_Y") => OneIntegerManyDoidTerms,
        HasHistoryOfAutoimmuneDisease("HAS_HISTORY_OF_AUTOIMMUNE_DISEASE") => NoParameters,
        HasHistoryOfCardiacDisease("HAS_HISTORY_OF_CARDIAC_DISEASE") => NoParameters,
        HasHistoryOfCardiovascularDisease("HAS_HISTORY_OF_CARDIOVASCULAR_DISEASE") => NoParameters,
        HasHistoryOfCongestiveHeartFailureWithAtLeastNyhaClassX("HAS_HISTORY_OF_CONGESTIVE_HEART_FAILURE_WITH_AT_LEAST_NYHA_CLASS_X") => OneNyhaClass,
        HasHistoryOfCentralNervousSystemDisease("HAS_HISTORY_OF_CENTRAL_NERVOUS_SYSTEM_DISEASE") => NoParameters,
        HasHistoryOfGastrointestinalDisease("HAS_HISTORY_OF_GASTROINTESTINAL_DISEASE") => NoParameters,
        HasHistoryOfImmuneSystemDisease("HAS_HISTORY_OF_IMMUNE_SYSTEM_DISEASE") => NoParameters,
        HasHistoryOfInterstitialLungDisease("HAS_HISTORY_OF_INTERSTITIAL_LUNG_DISEASE") => NoParameters,
        HasHistoryOfLiverDisease("HAS_HISTORY_OF_LIVER_DISEASE") => NoParameters,
        HasHistoryOfLungDisease("HAS_HISTORY_OF_LUNG_DISEASE") => NoParameters,
        HasHistoryOfMyocardialInfarct("HAS_HISTORY_OF_MYOCARDIAL_INFARCT") => NoParameters,
        HasHistoryOfMyocardialInfarctWithinXMonths("HAS_HISTORY_OF_MYOCARDIAL_INFARCT_WITHIN_X_MONTHS") => OneInteger,
        HasHistoryOfPneumonitis("HAS_HISTORY_OF_PNEUMONITIS") => NoParameters,
        HasHistoryOfStroke("HAS_HISTORY_OF_STROKE") => NoParameters,
        HasHistoryOfStrokeWithinXMonths("HAS_HISTORY_OF_STROKE_WITHIN_X_MONTHS") => OneInteger,
        HasHistoryOfThromboembolicEvent("HAS_HISTORY_OF_THROMBOEMBOLIC_EVENT") => NoParameters,
        HasHistoryOfVascularDisease("HAS_HISTORY_OF_VASCULAR_DISEASE") => NoParameters,
        HasHistoryOfEyeDisease("HAS_HISTORY_OF_EYE_DISEASE") => NoParameters,
        HasSevereConcomitantCondition("HAS_SEVERE_CONCOMITANT_CONDITION") => NoParameters,
        HasHadOrganTransplant("HAS_HAD_ORGAN_TRANSPLANT") => NoParameters,
        HasHadOrganTransplantWithinXYears("HAS_HAD_ORGAN_TRANSPLANT_WITHIN_X_YEARS") => OneInteger,
        HasGilbertDisease("HAS_GILBERT_DISEASE") => NoParameters,
        HasHypertension("HAS_HYPERTENSION") => NoParameters,
        HasDiabetes("HAS_DIABETES") => NoParameters,
        HasPotentialAbsorptionDifficulties("HAS_POTENTIAL_ABSORPTION_DIFFICULTIES") => NoParameters,
        HasOralMedicationDifficulties("HAS_ORAL_MEDICATION_DIFFICULTIES") => NoParameters,
        HasPotentialContraindicationForStereotacticRadiosurgery("HAS_POTENTIAL_CONTRAINDICATION_FOR_STEREOTACTIC_RADIOSURGERY") => NoParameters,
        HasPotentialContraindicationToMri("HAS_POTENTIAL_CONTRAINDICATION_TO_MRI") => NoParameters,
        HasMriScanDocumentingStableDisease("HAS_MRI_SCAN_DOCUMENTING_STABLE_DISEASE") => NoParameters,
        IsInDialysis("IS_IN_DIALYSIS") => NoParameters,
        HasAdequateVenousAccess("HAS_ADEQUATE_VENOUS_ACCESS") => NoParameters,

        // Complications
        HasAnyComplication("HAS_ANY_COMPLICATION") => NoParameters,
        HasComplicationWithAnyIcdTitleX("HAS_COMPLICATION_WITH_ANY_ICD_TITLE_X") => ManyIcdTitles,
        HasUncontrolledTumorRelatedPain("HAS_UNCONTROLLED_TUMOR_RELATED_PAIN") => NoParameters,
        HasLeptomeningealDisease("HAS_LEPTOMENINGEAL_DISEASE") => NoParameters,
        HasSpinalCordCompression("HAS_SPINAL_CORD_COMPRESSION") => NoParameters,
        HasUrinaryIncontinence("HAS_URINARY_INCONTINENCE") => NoParameters,
        HasBladderOutflowObstruction("HAS_BLADDER_OUTFLOW_OBSTRUCTION") => NoParameters,

        // Toxicity and intolerance
        HasToxicityCtcaeOfAtLeastGradeX("HAS_TOXICITY_CTCAE_OF_AT_LEAST_GRADE_X") => OneInteger,
        HasToxicityCtcaeOfAtLeastGradeXWithAnyIcdTitleY("HAS_TOXICITY_CTCAE_OF_AT_LEAST_GRADE_X_WITH_ANY_ICD_TITLE_Y") => OneIntegerManyIcdTitles,
        HasToxicityCtcaeOfAtLeastGradeXIgnoringIcdTitlesY("HAS_TOXICITY_CTCAE_OF_AT_LEAST_GRADE_X_IGNORING_ICD_TITLES_Y") => OneIntegerManyIcdTitles,
        HasToxicityAstctOfAtLeastGradeXWithAnyIcdTitleY("HAS_TOXICITY_ASTCT_OF_AT_LEAST_GRADE_X_WITH_ANY_ICD_TITLE_Y") => OneIntegerManyIcdTitles,
        HasToxicityWithIcdTitleXOfAtLeastGradeY("HAS_TOXICITY_WITH_ICD_TITLE_X_OF_AT_LEAST_GRADE_Y") => OneIcdTitleOneInteger,
        HasIntoleranceToNameX("HAS_INTOLERANCE_TO_NAME_X") => OneString,
        HasIntoleranceWithIcdTitleX("HAS_INTOLERANCE_WITH_ICD_TITLE_X") => OneIcdTitle,
        HasIntoleranceBelongingToDoidTermX("HAS_INTOLERANCE_BELONGING_TO_DOID_TERM_X") => OneDoidTerm,
        HasIntoleranceToPlatinumCompounds("HAS_INTOLERANCE_TO_PLATINUM_COMPOUNDS") => NoParameters,
        HasIntoleranceToTaxane("HAS_INTOLERANCE_TO_TAXANE") => NoParameters,
        HasIntoleranceForPd1OrPdL1Inhibitors("HAS_INTOLERANCE_FOR_PD_1_OR_PD_L1_INHIBITORS") => NoParameters,
        HasIntoleranceRelatedToStudyMedication("HAS_INTOLERANCE_RELATED_TO_STUDY_MEDICATION") => NoParameters,
        HasHistoryOfAnaphylaxis("HAS_HISTORY_OF_ANAPHYLAXIS") => NoParameters,
        HasExperiencedImmunotherapyRelatedAdverseEvents("HAS_EXPERIENCED_IMMUNOTHERAPY_RELATED_ADVERSE_EVENTS") => NoParameters,

        // Reproduction
        IsBreastfeeding("IS_BREASTFEEDING") => NoParameters,
        IsPregnant("IS_PREGNANT") => NoParameters,
        UsesAdequateAnticonception("USES_ADEQUATE_ANTICONCEPTION") => NoParameters,
        AdheresToSpermOrEggDonationPrescriptions("ADHERES_TO_SPERM_OR_EGG_DONATION_PRESCRIPTIONS") => NoParameters,

        // Infection
        HasActiveInfection("HAS_ACTIVE_INFECTION") => NoParameters,
        HasKnownEbvInfection("HAS_KNOWN_EBV_INFECTION") => NoParameters,
        HasKnownHepatitisAInfection("HAS_KNOWN_HEPATITIS_A_INFECTION") => NoParameters,
        HasKnownHepatitisBInfection("HAS_KNOWN_HEPATITIS_B_INFECTION") => NoParameters,
        HasKnownHepatitisCInfection("HAS_KNOWN_HEPATITIS_C_INFECTION") => NoParameters,
        HasKnownHivInfection("HAS_KNOWN_HIV_INFECTION") => NoParameters,
        HasKnownCytomegalovirusInfection("HAS_KNOWN_CYTOMEGALOVIRUS_INFECTION") => NoParameters,
        HasKnownTuberculosisInfection("HAS_KNOWN_TUBERCULOSIS_INFECTION") => NoParameters,
        MeetsCovid19InfectionRequirements("MEETS_COVID_19_INFECTION_REQUIREMENTS") => NoParameters,
        HasReceivedLiveVaccineWithinXMonths("HAS_RECEIVED_LIVE_VACCINE_WITHIN_X_MONTHS") => OneInteger,
        AdheresToAttenuatedVaccineUsePrescriptions("ADHERES_TO_ATTENUATED_VACCINE_USE_PRESCRIPTIONS") => NoParameters,

        // Medication
        CurrentlyGetsNameXMedication("CURRENTLY_GETS_NAME_X_MEDICATION") => OneString,
        CurrentlyGetsCategoryXMedication("CURRENTLY_GETS_CATEGORY_X_MEDICATION") => OneMedicationCategory,
        HasReceivedCategoryXMedicationWithinYWeeks("HAS_RECEIVED_CATEGORY_X_MEDICATION_WITHIN_Y_WEEKS") => OneMedicationCategoryOneInteger,
        HasStableAnticoagulantMedicationDosing("HAS_STABLE_ANTICOAGULANT_MEDICATION_DOSING") => NoParameters,
        CurrentlyGetsMedicationInhibitingCypX("CURRENTLY_GETS_MEDICATION_INHIBITING_CYP_X") => OneCyp,
        CurrentlyGetsMedicationInducingCypX("CURRENTLY_GETS_MEDICATION_INDUCING_CYP_X") => OneCyp,
        CurrentlyGetsMedicationSubstrateOfCypX("CURRENTLY_GETS_MEDICATION_SUBSTRATE_OF_CYP_X") => OneCyp,
        HasReceivedMedicationInhibitingCypXWithinYWeeks("HAS_RECEIVED_MEDICATION_INHIBITING_CYP_X_WITHIN_Y_WEEKS") => OneCypOneInteger,
        HasReceivedMedicationInducingCypXWithinYWeeks("HAS_RECEIVED_MEDICATION_INDUCING_CYP_X_WITHIN_Y_WEEKS") => OneCypOneInteger,
        CurrentlyGetsMedicationInhibitingOrInducingAnyCyp("CURRENTLY_GETS_MEDICATION_INHIBITING_OR_INDUCING_ANY_CYP") => NoParameters,
        CurrentlyGetsMedicationInhibitingTransporterX("CURRENTLY_GETS_MEDICATION_INHIBITING_TRANSPORTER_X") => OneTransporter,
        CurrentlyGetsMedicationInducingTransporterX("CURRENTLY_GETS_MEDICATION_INDUCING_TRANSPORTER_X") => OneTransporter,
        CurrentlyGetsMedicationSubstrateOfTransporterX("CURRENTLY_GETS_MEDICATION_SUBSTRATE_OF_TRANSPORTER_X") => OneTransporter,
        HasReceivedMedicationInhibitingTransporterXWithinYWeeks("HAS_RECEIVED_MEDICATION_INHIBITING_TRANSPORTER_X_WITHIN_Y_WEEKS") => OneTransporterOneInteger,
        CurrentlyGetsQtProlongatingMedication("CURRENTLY_GETS_QT_PROLONGATING_MEDICATION") => NoParameters,
        CurrentlyGetsMedicationCausingTorsadesDePointes("CURRENTLY_GETS_MEDICATION_CAUSING_TORSADES_DE_POINTES") => NoParameters,
        HasReceivedHerbalMedication("HAS_RECEIVED_HERBAL_MEDICATION") => NoParameters,

        // Washout
        HasReceivedAnyAntiCancerTherapyWithinXWeeks("HAS_RECEIVED_ANY_ANTI_CANCER_THERAPY_WITHIN_X_WEEKS") => OneInteger,
        HasReceivedAnyAntiCancerTherapyWithinXWeeksYHalfLives("HAS_RECEIVED_ANY_ANTI_CANCER_THERAPY_WITHIN_X_WEEKS_Y_HALF_LIVES") => TwoIntegers,
        HasReceivedAnyAntiCancerTherapyExclCategoriesXWithinYWeeks("HAS_RECEIVED_ANY_ANTI_CANCER_THERAPY_EXCL_CATEGORIES_X_WITHIN_Y_WEEKS") => ManyMedicationCategoriesOneInteger,
        HasReceivedCategoriesXCancerTherapyWithinYWeeksZHalfLives("HAS_RECEIVED_CATEGORIES_X_CANCER_THERAPY_WITHIN_Y_WEEKS_Z_HALF_LIVES") => ManyMedicationCategoriesTwoIntegers,
        HasReceivedDrugsXCancerTherapyWithinYWeeks("HAS_RECEIVED_DRUGS_X_CANCER_THERAPY_WITHIN_Y_WEEKS") => ManyDrugsOneInteger,
        HasReceivedDrugsXCancerTherapyWithinYWeeksZHalfLives("HAS_RECEIVED_DRUGS_X_CANCER_THERAPY_WITHIN_Y_WEEKS_Z_HALF_LIVES") => ManyDrugsTwoIntegers,
        HasReceivedRadiotherapyWithinXWeeks("HAS_RECEIVED_RADIOTHERAPY_WITHIN_X_WEEKS") => OneInteger,
        HasReceivedTrialMedicationWithinXWeeks("HAS_RECEIVED_TRIAL_MEDICATION_WITHIN_X_WEEKS") => OneInteger,

        // Surgery
        HasHadRecentSurgery("HAS_HAD_RECENT_SURGERY") => NoParameters,
        HasHadSurgeryWithinLastXWeeks("HAS_HAD_SURGERY_WITHIN_LAST_X_WEEKS") => OneInteger,
        HasHadSurgeryWithinLastXMonths("HAS_HAD_SURGERY_WITHIN_LAST_X_MONTHS") => OneInteger,

        // Cardiac function
        HasCardiacArrhythmia("HAS_CARDIAC_ARRHYTHMIA") => NoParameters,
        HasCardiacArrhythmiaOfAnyTypeX("HAS_CARDIAC_ARRHYTHMIA_OF_ANY_TYPE_X") => ManyStrings,
        HasLvefOfAtLeastX("HAS_LVEF_OF_AT_LEAST_X") => OneDouble,
        HasLvefOfAtLeastXIfKnown("HAS_LVEF_OF_AT_LEAST_X_IF_KNOWN") => OneDouble,
        HasQtcOfAtMostX("HAS_QTC_OF_AT_MOST_X") => OneDouble,
        HasQtcfOfAtMostX("HAS_QTCF_OF_AT_MOST_X") => OneDouble,
        HasQtcfOfAtLeastX("HAS_QTCF_OF_AT_LEAST_X") => OneDouble,
        HasJtcOfAtLeastX("HAS_JTC_OF_AT_LEAST_X") => OneDouble,
        HasLongQtSyndrome("HAS_LONG_QT_SYNDROME") => NoParameters,
        HasNormalCardiacFunctionByMugaOrTte("HAS_NORMAL_CARDIAC_FUNCTION_BY_MUGA_OR_TTE") => NoParameters,
        HasFamilyHistoryOfIdiopathicSuddenDeath("HAS_FAMILY_HISTORY_OF_IDIOPATHIC_SUDDEN_DEATH") => NoParameters,
        HasRestingHeartRateBetweenXAndY("HAS_RESTING_HEART_RATE_BETWEEN_X_AND_Y") => TwoDoubles,

        // Vital function and body weight
        HasSbpMmhgOfAtLeastX("HAS_SBP_MMHG_OF_AT_LEAST_X") => OneInteger,
        HasSbpMmhgOfAtMostX("HAS_SBP_MMHG_OF_AT_MOST_X") => OneInteger,
        HasDbpMmhgOfAtLeastX("HAS_DBP_MMHG_OF_AT_LEAST_X") => OneInteger,
        HasDbpMmhgOfAtMostX("HAS_DBP_MMHG_OF_AT_MOST_X") => OneInteger,
        HasPulseOximetryOfAtLeastX("HAS_PULSE_OXIMETRY_OF_AT_LEAST_X") => OneDouble,
        HasBodyWeightOfAtLeastX("HAS_BODY_WEIGHT_OF_AT_LEAST_X") => OneDouble,
        HasBodyWeightOfAtMostX("HAS_BODY_WEIGHT_OF_AT_MOST_X") => OneDouble,
        HasBmiOfAtMostX("HAS_BMI_OF_AT_MOST_X") => OneInteger,
        HasFev1OfAtLeastXPercent("HAS_FEV1_OF_AT_LEAST_X_PERCENT") => OneDouble,

        // Blood transfusion
        RequiresRegularHematopoieticSupport("REQUIRES_REGULAR_HEMATOPOIETIC_SUPPORT") => NoParameters,
        HasHadErythrocyteTransfusionWithinLastXWeeks("HAS_HAD_ERYTHROCYTE_TRANSFUSION_WITHIN_LAST_X_WEEKS") => OneInteger,
        HasHadThrombocyteTransfusionWithinLastXWeeks("HAS_HAD_THROMBOCYTE_TRANSFUSION_WITHIN_LAST_X_WEEKS") => OneInteger,
    }
}

impl EligibilityRule {
    pub fn is_composite(&self) -> bool {
        matches!(self.shape(), RuleShape::Composite(_))
    }

    /// The leaf shape, or `None` for composite rules.
    pub fn function_input(&self) -> Option<FunctionInput> {
        match self.shape() {
            RuleShape::Leaf(input) => Some(input),
            RuleShape::Composite(_) => None,
        }
    }
}

/// Shorthand for `rule.shape()`.
pub fn shape_of(rule: EligibilityRule) -> RuleShape {
    rule.shape()
}

impl FromStr for EligibilityRule {
    type Err = MatchError;

    /// Case-sensitive match against the catalog identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EligibilityRule::lookup(s).ok_or_else(|| MatchError::Parse {
            reason: format!("unknown eligibility rule '{s}'"),
        })
    }
}

impl fmt::Display for EligibilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
