//! The input resolver.
//!
//! Turns the raw tokens of an `EligibilityFunction` into typed parameters.
//!
//! Resolution algorithm for a leaf function:
//!
//! 1. Look up the rule's `FunctionInput` and its position table.
//! 2. Reject when the parameter count differs or any parameter is a nested
//!    function (`Shape`).
//! 3. For every position, check the token syntax for the position's
//!    `ParamKind` (`Shape`), then resolve it through the injected
//!    collaborators (`Lookup`).
//! 4. Succeed only when every position resolved; nothing partial is returned.
//!
//! Composite functions are checked structurally: every parameter must be a
//! nested function and the count must satisfy the rule's `CompositeInput`.
//! `is_well_formed` and `resolve` look at one node only; `validate_tree` and
//! `compile` walk the whole tree.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use eligibility_contracts::{
    domain::{
        BodyLocation, Cyp, DrugType, IcdCode, Intent, MedicationCategory, NyhaClass, ReceptorType,
        Transporter, Treatment, TreatmentCategory, TreatmentCategoryOrType, TumorStage, TumorTypeInput, VariantTypeInput,
    },
    error::{MatchError, MatchResult},
    function::{Eligibility, EligibilityFunction, FunctionParameter},
    input::{CompositeInput, FunctionInput, ParamKind},
    resolved::{ResolvedInput, ResolvedParam},
    rule::{EligibilityRule, RuleShape},
    trial::{Cohort, Trial},
};
use eligibility_core::{
    compiled::{CompiledCohort, CompiledEligibility, CompiledFunction, CompiledTrial},
    traits::{DoidModel, GeneChecker, IcdModel, MedicationCategories, TreatmentDatabase},
};

use crate::syntax;

/// Result of resolving a single function node.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A structurally valid composite; its children are not inspected.
    Composite(CompositeInput),
    Leaf(ResolvedInput),
}

/// Why one position failed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParamError {
    Syntax(String),
    Lookup(String),
}

impl From<String> for ParamError {
    fn from(reason: String) -> Self {
        ParamError::Syntax(reason)
    }
}

/// Resolves function parameters against the clinical knowledge bases.
///
/// The collaborators are borrowed, never owned, and only read.
pub struct InputResolver<'a> {
    doid_model: &'a dyn DoidModel,
    icd_model: &'a dyn IcdModel,
    treatment_database: &'a dyn TreatmentDatabase,
    gene_checker: &'a dyn GeneChecker,
    medication_categories: &'a dyn MedicationCategories,
}

impl<'a> InputResolver<'a> {
    pub fn new(
        doid_model: &'a dyn DoidModel,
        icd_model: &'a dyn IcdModel,
        treatment_database: &'a dyn TreatmentDatabase,
        gene_checker: &'a dyn GeneChecker,
        medication_categories: &'a dyn MedicationCategories,
    ) -> Self {
        Self { doid_model, icd_model, treatment_database, gene_checker, medication_categories }
    }

    // ── Single node ──────────────────────────────────────────────────────────

    /// Arity and token syntax only, without collaborator lookups.
    ///
    /// Nested functions of a composite are not inspected.
    pub fn is_well_formed(&self, function: &EligibilityFunction) -> bool {
        match function.rule.shape() {
            RuleShape::Composite(arity) => check_composite(function, arity).is_ok(),
            RuleShape::Leaf(shape) => tokens_for(function, shape)
                .and_then(|tokens| check_syntax(function.rule, shape, &tokens))
                .is_ok(),
        }
    }

    /// Full resolution of one node, including collaborator lookups.
    ///
    /// # Errors
    ///
    /// `MatchError::Shape` for count, nesting or syntax problems and
    /// `MatchError::Lookup` when a collaborator does not know a token.
    pub fn resolve(&self, function: &EligibilityFunction) -> MatchResult<Resolved> {
        match function.rule.shape() {
            RuleShape::Composite(arity) => {
                check_composite(function, arity)?;
                Ok(Resolved::Composite(arity))
            }
            RuleShape::Leaf(shape) => {
                let tokens = tokens_for(function, shape)?;
                check_syntax(function.rule, shape, &tokens)?;
                let mut params: Vec<ResolvedParam> = Vec::with_capacity(tokens.len());
                for (index, (kind, token)) in shape.positions().iter().zip(&tokens).enumerate() {
                    let param = self
                        .resolve_param(*kind, token, params.last())
                        .map_err(|e| position_error(function.rule, index, *kind, e))?;
                    params.push(param);
                }
                debug!(rule = %function.rule, shape = %shape, "resolved leaf parameters");
                Ok(Resolved::Leaf(ResolvedInput::new(function.rule, shape, params)))
            }
        }
    }

    // ── Whole tree ───────────────────────────────────────────────────────────

    /// Every shape and lookup problem in the tree, in depth-first order.
    pub fn validate_tree(&self, function: &EligibilityFunction) -> Vec<MatchError> {
        let mut problems = Vec::new();
        function.walk(&mut |node| {
            if let Err(e) = self.resolve(node) {
                problems.push(e);
            }
        });
        problems
    }

    /// Resolve a whole tree into its executable form.
    pub fn compile(&self, function: &EligibilityFunction) -> MatchResult<CompiledFunction> {
        match self.resolve(function)? {
            Resolved::Leaf(input) => Ok(CompiledFunction::Leaf { rule: function.rule, input }),
            Resolved::Composite(_) => {
                let children = function
                    .parameters
                    .iter()
                    .filter_map(FunctionParameter::as_function)
                    .map(|child| self.compile(child))
                    .collect::<MatchResult<Vec<_>>>()?;
                Ok(CompiledFunction::Composite { rule: function.rule, children })
            }
        }
    }

    /// All problems of every function in a trial.
    pub fn validate_trial(&self, trial: &Trial) -> Vec<MatchError> {
        trial.all_eligibility().flat_map(|e| self.validate_tree(&e.function)).collect()
    }

    /// Validate and compile a trial. Any invalid function rejects the whole trial.
    pub fn compile_trial(&self, trial: &Trial) -> MatchResult<CompiledTrial> {
        let trial_id = &trial.identification.trial_id;
        let problems = self.validate_trial(trial);
        if !problems.is_empty() {
            for problem in &problems {
                warn!(trial_id = %trial_id, problem = %problem, "rejected eligibility function");
            }
            return Err(MatchError::Config {
                reason: format!(
                    "trial '{}' has {} invalid eligibility function(s): {}",
                    trial_id,
                    problems.len(),
                    problems.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
                ),
            });
        }

        let general_eligibility = self.compile_eligibility(&trial.general_eligibility)?;
        let cohorts = trial
            .cohorts
            .iter()
            .map(|Cohort { metadata, eligibility }| {
                Ok(CompiledCohort { metadata: metadata.clone(), eligibility: self.compile_eligibility(eligibility)? })
            })
            .collect::<MatchResult<Vec<_>>>()?;

        debug!(trial_id = %trial_id, cohorts = cohorts.len(), "compiled trial");
        Ok(CompiledTrial { identification: trial.identification.clone(), general_eligibility, cohorts })
    }

    fn compile_eligibility(&self, list: &[Eligibility]) -> MatchResult<Vec<CompiledEligibility>> {
        list.iter()
            .map(|eligibility| {
                Ok(CompiledEligibility {
                    eligibility: eligibility.clone(),
                    function: self.compile(&eligibility.function)?,
                })
            })
            .collect()
    }

    // ── Positions ────────────────────────────────────────────────────────────

    /// One resolver per `ParamKind`. `previous` is the already resolved
    /// parameter at the preceding position.
    fn resolve_param(
        &self,
        kind: ParamKind,
        token: &str,
        previous: Option<&ResolvedParam>,
    ) -> Result<ResolvedParam, ParamError> {
        let param = match kind {
            ParamKind::Integer => ResolvedParam::Integer(syntax::parse_integer(token)?),
            ParamKind::Double => ResolvedParam::Double(syntax::parse_double(token)?),
            ParamKind::String => ResolvedParam::Text(syntax::parse_text(token)?),
            ParamKind::ManyStrings => ResolvedParam::Texts(
                syntax::split_list(token)?.into_iter().map(str::to_string).collect(),
            ),
            ParamKind::TreatmentCategory => ResolvedParam::TreatmentCategory(syntax::parse_enum(
                token,
                TreatmentCategory::from_token,
                "treatment category",
            )?),
            ParamKind::TreatmentCategoryOrType => ResolvedParam::TreatmentCategoryOrType(syntax::parse_enum(
                token,
                TreatmentCategoryOrType::from_token,
                "treatment category or type",
            )?),
            ParamKind::ManyTreatmentCategories => ResolvedParam::TreatmentCategories(syntax::parse_enum_list(
                token,
                TreatmentCategory::from_token,
                "treatment category",
            )?),
            ParamKind::ManyTreatmentTypes => {
                let types = syntax::parse_enum_list(token, DrugType::from_token, "treatment type")?;
                if let Some(ResolvedParam::TreatmentCategory(category)) = previous {
                    check_types_belong_to(*category, &types)?;
                }
                ResolvedParam::TreatmentTypes(types)
            }
            ParamKind::ManyIntents => {
                ResolvedParam::Intents(syntax::parse_enum_list(token, Intent::from_token, "intent")?)
            }
            ParamKind::SpecificTreatment => ResolvedParam::Treatment(self.treatment(token)?),
            ParamKind::ManySpecificTreatments => ResolvedParam::Treatments(
                syntax::split_list(token)?
                    .into_iter()
                    .map(|name| self.treatment(name))
                    .collect::<Result<_, _>>()?,
            ),
            ParamKind::ManyDrugs => ResolvedParam::Drugs(
                syntax::split_list(token)?
                    .into_iter()
                    .map(|name| {
                        self.treatment_database
                            .find_drug_by_name(name)
                            .ok_or_else(|| ParamError::Lookup(format!("unknown drug '{name}'")))
                    })
                    .collect::<Result<_, _>>()?,
            ),
            ParamKind::TumorType => {
                ResolvedParam::TumorType(syntax::parse_enum(token, TumorTypeInput::from_token, "tumor type")?)
            }
            ParamKind::ManyTumorStages => {
                ResolvedParam::TumorStages(syntax::parse_enum_list(token, TumorStage::from_token, "tumor stage")?)
            }
            ParamKind::BodyLocation => ResolvedParam::BodyLocation(syntax::parse_enum(
                token,
                BodyLocation::from_token,
                "body location",
            )?),
            ParamKind::ManyBodyLocations => ResolvedParam::BodyLocations(syntax::parse_enum_list(
                token,
                BodyLocation::from_token,
                "body location",
            )?),
            ParamKind::ReceptorType => {
                ResolvedParam::ReceptorType(syntax::parse_enum(token, ReceptorType::from_token, "receptor type")?)
            }
            ParamKind::DoidTerm => ResolvedParam::Doid(self.doid(token)?),
            ParamKind::ManyDoidTerms => ResolvedParam::Doids(
                syntax::split_list(token)?.into_iter().map(|term| self.doid(term)).collect::<Result<_, _>>()?,
            ),
            ParamKind::IcdTitle => ResolvedParam::Icd(self.icd_code(token)?),
            ParamKind::ManyIcdTitles => ResolvedParam::Icds(
                syntax::split_list(token)?
                    .into_iter()
                    .map(|title| self.icd_code(title))
                    .collect::<Result<_, _>>()?,
            ),
            ParamKind::NyhaClass => {
                ResolvedParam::Nyha(syntax::parse_enum(token, NyhaClass::from_token, "NYHA class")?)
            }
            ParamKind::Gene => ResolvedParam::Gene(self.gene(token)?),
            ParamKind::ManyGenes => ResolvedParam::Genes(
                syntax::split_list(token)?.into_iter().map(|gene| self.gene(gene)).collect::<Result<_, _>>()?,
            ),
            ParamKind::ManyCodons => ResolvedParam::Codons(
                syntax::split_list(token)?.into_iter().map(syntax::parse_codon).collect::<Result<_, _>>()?,
            ),
            ParamKind::ManyProteinImpacts => ResolvedParam::ProteinImpacts(
                syntax::split_list(token)?
                    .into_iter()
                    .map(syntax::parse_protein_impact)
                    .collect::<Result<_, _>>()?,
            ),
            ParamKind::VariantType => ResolvedParam::VariantType(syntax::parse_enum(
                token,
                VariantTypeInput::from_token,
                "variant type",
            )?),
            ParamKind::Protein => ResolvedParam::Protein(syntax::parse_protein_name(token)?),
            ParamKind::HlaAllele => ResolvedParam::HlaAllele(syntax::parse_hla_allele(token)?),
            ParamKind::HlaGroup => ResolvedParam::HlaAllele(syntax::parse_hla_group(token)?),
            ParamKind::Haplotype => ResolvedParam::Haplotype(syntax::parse_haplotype(token)?),
            ParamKind::MedicationCategory => ResolvedParam::MedicationCategory(self.medication_category(token)?),
            ParamKind::ManyMedicationCategories => ResolvedParam::MedicationCategories(
                syntax::split_list(token)?
                    .into_iter()
                    .map(|name| self.medication_category(name))
                    .collect::<Result<_, _>>()?,
            ),
            ParamKind::Cyp => ResolvedParam::Cyp(syntax::parse_enum(token, Cyp::from_token, "CYP")?),
            ParamKind::Transporter => {
                ResolvedParam::Transporter(syntax::parse_enum(token, Transporter::from_token, "transporter")?)
            }
        };
        Ok(param)
    }

    fn treatment(&self, name: &str) -> Result<Treatment, ParamError> {
        let name = syntax::parse_text(name)?;
        self.treatment_database
            .find_treatment_by_name(&name)
            .ok_or_else(|| ParamError::Lookup(format!("unknown treatment '{name}'")))
    }

    fn doid(&self, term: &str) -> Result<String, ParamError> {
        let term = syntax::parse_text(term)?;
        let doids = self.doid_model.resolve_terms_to_doids(&[term.as_str()]);
        let mut iter = doids.into_iter();
        match (iter.next(), iter.next()) {
            (Some(doid), None) => Ok(doid),
            (None, _) => Err(ParamError::Lookup(format!("unknown DOID term '{term}'"))),
            (Some(_), Some(_)) => Err(ParamError::Lookup(format!("ambiguous DOID term '{term}'"))),
        }
    }

    /// A title or code, optionally joined with an extension by `&`. The
    /// extension must resolve to the main concept or one of its descendants.
    fn icd_code(&self, token: &str) -> Result<IcdCode, ParamError> {
        let (main, extension) = syntax::split_icd(token)?;
        let main_code = self.icd_code_for(main)?;
        let Some(extension) = extension else { return Ok(IcdCode::new(main_code)) };

        let extension_code = self.icd_code_for(extension)?;
        if !self.icd_model.is_same_or_descendant(&extension_code, &main_code) {
            return Err(ParamError::Lookup(format!(
                "ICD extension '{extension}' ({extension_code}) is not the same as or a descendant of '{main}' ({main_code})"
            )));
        }
        Ok(IcdCode::with_extension(main_code, extension_code))
    }

    fn icd_code_for(&self, title_or_code: &str) -> Result<String, ParamError> {
        if self.icd_model.is_valid_code(title_or_code) {
            return Ok(title_or_code.to_string());
        }
        self.icd_model
            .resolve_code_for_title(title_or_code)
            .ok_or_else(|| ParamError::Lookup(format!("unknown ICD title or code '{title_or_code}'")))
    }

    fn gene(&self, symbol: &str) -> Result<String, ParamError> {
        let symbol = syntax::parse_gene_symbol(symbol)?;
        if self.gene_checker.is_valid_gene(&symbol) {
            Ok(symbol)
        } else {
            Err(ParamError::Lookup(format!("unknown gene '{symbol}'")))
        }
    }

    fn medication_category(&self, name: &str) -> Result<MedicationCategory, ParamError> {
        let name = syntax::parse_text(name)?;
        self.medication_categories
            .resolve_category(&name)
            .ok_or_else(|| ParamError::Lookup(format!("unknown medication category '{name}'")))
    }
}

// ── Structural checks ────────────────────────────────────────────────────────

fn shape_error(rule: EligibilityRule, reason: String) -> MatchError {
    MatchError::Shape { rule: rule.name().to_string(), reason }
}

fn position_error(rule: EligibilityRule, index: usize, kind: ParamKind, error: ParamError) -> MatchError {
    match error {
        ParamError::Syntax(reason) => {
            shape_error(rule, format!("parameter {} ({}): {}", index + 1, kind.describe(), reason))
        }
        ParamError::Lookup(reason) => MatchError::Lookup {
            rule: rule.name().to_string(),
            reason: format!("parameter {} ({}): {}", index + 1, kind.describe(), reason),
        },
    }
}

fn check_composite(function: &EligibilityFunction, arity: CompositeInput) -> MatchResult<()> {
    if let Some(index) = function.parameters.iter().position(|p| p.as_function().is_none()) {
        return Err(shape_error(
            function.rule,
            format!("parameter {} is a raw token; composite rules take nested functions only", index + 1),
        ));
    }
    let count = function.parameters.len();
    if !arity.accepts(count) {
        return Err(shape_error(
            function.rule,
            format!("expected {} nested function(s), got {}", arity.describe(), count),
        ));
    }
    Ok(())
}

fn tokens_for(function: &EligibilityFunction, shape: FunctionInput) -> MatchResult<Vec<&str>> {
    let expected = shape.arity();
    if function.parameters.len() != expected {
        return Err(shape_error(
            function.rule,
            format!("{} expects {} parameter(s), got {}", shape, expected, function.parameters.len()),
        ));
    }
    function
        .parameters
        .iter()
        .enumerate()
        .map(|(index, parameter)| {
            parameter.as_token().ok_or_else(|| {
                shape_error(function.rule, format!("parameter {} is a nested function; expected a raw token", index + 1))
            })
        })
        .collect()
}

/// Syntax of every position without collaborator lookups.
fn check_syntax(rule: EligibilityRule, shape: FunctionInput, tokens: &[&str]) -> MatchResult<()> {
    let mut previous_category: Option<TreatmentCategory> = None;
    for (index, (kind, token)) in shape.positions().iter().zip(tokens).enumerate() {
        check_token(*kind, token, previous_category)
            .map_err(|reason| position_error(rule, index, *kind, ParamError::Syntax(reason)))?;
        previous_category = match kind {
            ParamKind::TreatmentCategory => TreatmentCategory::from_token(token),
            _ => None,
        };
    }
    Ok(())
}

fn check_token(kind: ParamKind, token: &str, previous_category: Option<TreatmentCategory>) -> Result<(), String> {
    match kind {
        ParamKind::Integer => syntax::parse_integer(token).map(drop),
        ParamKind::Double => syntax::parse_double(token).map(drop),
        ParamKind::String
        | ParamKind::SpecificTreatment
        | ParamKind::DoidTerm
        | ParamKind::MedicationCategory => syntax::parse_text(token).map(drop),
        ParamKind::ManyStrings
        | ParamKind::ManySpecificTreatments
        | ParamKind::ManyDrugs
        | ParamKind::ManyDoidTerms
        | ParamKind::ManyMedicationCategories => syntax::split_list(token).map(drop),
        ParamKind::TreatmentCategory => {
            syntax::parse_enum(token, TreatmentCategory::from_token, "treatment category").map(drop)
        }
        ParamKind::TreatmentCategoryOrType => {
            syntax::parse_enum(token, TreatmentCategoryOrType::from_token, "treatment category or type").map(drop)
        }
        ParamKind::ManyTreatmentCategories => {
            syntax::parse_enum_list(token, TreatmentCategory::from_token, "treatment category").map(drop)
        }
        ParamKind::ManyTreatmentTypes => {
            let types = syntax::parse_enum_list(token, DrugType::from_token, "treatment type")?;
            match previous_category {
                Some(category) => check_types_belong_to(category, &types),
                None => Ok(()),
            }
        }
        ParamKind::ManyIntents => syntax::parse_enum_list(token, Intent::from_token, "intent").map(drop),
        ParamKind::TumorType => syntax::parse_enum(token, TumorTypeInput::from_token, "tumor type").map(drop),
        ParamKind::ManyTumorStages => {
            syntax::parse_enum_list(token, TumorStage::from_token, "tumor stage").map(drop)
        }
        ParamKind::BodyLocation => syntax::parse_enum(token, BodyLocation::from_token, "body location").map(drop),
        ParamKind::ManyBodyLocations => {
            syntax::parse_enum_list(token, BodyLocation::from_token, "body location").map(drop)
        }
        ParamKind::ReceptorType => syntax::parse_enum(token, ReceptorType::from_token, "receptor type").map(drop),
        ParamKind::IcdTitle => syntax::split_icd(token).map(drop),
        ParamKind::ManyIcdTitles => syntax::split_list(token)?
            .into_iter()
            .try_for_each(|element| syntax::split_icd(element).map(drop)),
        ParamKind::NyhaClass => syntax::parse_enum(token, NyhaClass::from_token, "NYHA class").map(drop),
        ParamKind::Gene => syntax::parse_gene_symbol(token).map(drop),
        ParamKind::ManyGenes => syntax::split_list(token)?
            .into_iter()
            .try_for_each(|gene| syntax::parse_gene_symbol(gene).map(drop)),
        ParamKind::ManyCodons => syntax::split_list(token)?
            .into_iter()
            .try_for_each(|codon| syntax::parse_codon(codon).map(drop)),
        ParamKind::ManyProteinImpacts => syntax::split_list(token)?
            .into_iter()
            .try_for_each(|impact| syntax::parse_protein_impact(impact).map(drop)),
        ParamKind::VariantType => syntax::parse_enum(token, VariantTypeInput::from_token, "variant type").map(drop),
        ParamKind::Protein => syntax::parse_protein_name(token).map(drop),
        ParamKind::HlaAllele => syntax::parse_hla_allele(token).map(drop),
        ParamKind::HlaGroup => syntax::parse_hla_group(token).map(drop),
        ParamKind::Haplotype => syntax::parse_haplotype(token).map(drop),
        ParamKind::Cyp => syntax::parse_enum(token, Cyp::from_token, "CYP").map(drop),
        ParamKind::Transporter => syntax::parse_enum(token, Transporter::from_token, "transporter").map(drop),
    }
}

fn check_types_belong_to(category: TreatmentCategory, types: &BTreeSet<DrugType>) -> Result<(), String> {
    match types.iter().find(|t| t.category() != category) {
        Some(stray) => Err(format!("treatment type {stray} does not belong to category {category}")),
        None => Ok(()),
    }
}
