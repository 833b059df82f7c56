//! Molecular events: driver mutations, amplifications, wild-type status, MSI and TMB.
//!
//! Every evaluator returns UNDETERMINED when the patient has no molecular
//! record. A gene that the test did not cover is likewise undetermined
//! rather than wild-type.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use eligibility_contracts::{
    error::MatchResult,
    evaluation::Evaluation,
    patient::{MolecularRecord, PatientRecord, Variant},
    resolved::ResolvedInput,
    rule::EligibilityRule,
};
use eligibility_core::registry::LeafEvaluatorRegistry;

use super::listing;

pub fn register(registry: &mut LeafEvaluatorRegistry) -> MatchResult<()> {
    registry.register(EligibilityRule::ActivatingMutationInGeneX, activating_mutation_in_gene)?;
    registry.register(EligibilityRule::ActivatingMutationInAnyGenesX, activating_mutation_in_any_genes)?;
    registry.register(EligibilityRule::MutationInGeneXOfAnyProteinImpactsY, mutation_with_any_protein_impact)?;
    registry.register(EligibilityRule::MutationInGeneXInAnyCodonsY, mutation_in_any_codon)?;
    registry.register(EligibilityRule::AmplificationOfGeneX, amplification_of_gene)?;
    registry.register(EligibilityRule::AmplificationOfGeneXOfAtLeastYCopies, amplification_of_gene_with_copies)?;
    registry.register(EligibilityRule::WildtypeOfGeneX, wildtype_of_gene)?;
    registry.register(EligibilityRule::MsiSignature, msi_signature)?;
    registry.register(EligibilityRule::TmbOfAtLeastX, tmb_of_at_least)?;
    Ok(())
}

fn no_molecular_data() -> Evaluation {
    Evaluation::undetermined("No molecular data", "No molecular data")
}

/// A gene counts as tested when the record lists it or reports an event in it.
fn is_tested(molecular: &MolecularRecord, gene: &str) -> bool {
    molecular.tested_genes.contains(gene)
        || molecular.variants.iter().any(|v| v.gene == gene)
        || molecular.amplifications.iter().any(|a| a.gene == gene)
}

fn reportable_variants<'a>(molecular: &'a MolecularRecord, gene: &'a str) -> impl Iterator<Item = &'a Variant> + 'a {
    molecular.variants.iter().filter(move |v| v.gene == gene && v.is_reportable)
}

/// Shared tail of the variant evaluators: PASS with inclusion events when
/// `found` is non-empty, else FAIL for tested genes and UNDETERMINED otherwise.
fn variant_outcome(molecular: &MolecularRecord, gene: &str, found: Vec<&Variant>, what: &str) -> Evaluation {
    if !found.is_empty() {
        let events: BTreeSet<String> = found.iter().map(|v| v.event()).collect();
        let mut evaluation = Evaluation::pass(
            format!("{what} in {gene} detected: {}", listing(events.iter().map(String::as_str))),
            format!("{what} in {gene}"),
        );
        evaluation.inclusion_molecular_events.extend(events);
        return evaluation;
    }
    if is_tested(molecular, gene) {
        Evaluation::fail(format!("No {what} in {gene} detected"), format!("No {what} in {gene}"))
    } else {
        Evaluation::undetermined(format!("{gene} has not been tested"), format!("{gene} untested"))
    }
}

fn activating_mutation_in_gene(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let gene = input.gene(0)?;
    let Some(molecular) = &patient.molecular else { return Ok(no_molecular_data()) };
    let found: Vec<&Variant> = reportable_variants(molecular, gene).filter(|v| v.is_activating).collect();
    Ok(variant_outcome(molecular, gene, found, "Activating mutation"))
}

/// PASS on the first gene with an activating mutation; otherwise the worst
/// per-gene outcome wins, so one untested gene keeps the result open.
fn activating_mutation_in_any_genes(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let genes = input.genes(0)?;
    let Some(molecular) = &patient.molecular else { return Ok(no_molecular_data()) };
    let mut outcomes: Vec<Evaluation> = genes
        .iter()
        .map(|gene| {
            let found: Vec<&Variant> = reportable_variants(molecular, gene).filter(|v| v.is_activating).collect();
            variant_outcome(molecular, gene, found, "Activating mutation")
        })
        .collect();
    outcomes.sort_by_key(|evaluation| evaluation.result.disjunction_rank());
    Ok(outcomes.into_iter().next().unwrap_or_else(no_molecular_data))
}

fn mutation_with_any_protein_impact(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let gene = input.gene(0)?;
    let impacts = input.protein_impacts(1)?;
    let Some(molecular) = &patient.molecular else { return Ok(no_molecular_data()) };
    let found: Vec<&Variant> =
        reportable_variants(molecular, gene).filter(|v| impacts.contains(&v.protein_impact)).collect();
    Ok(variant_outcome(molecular, gene, found, &format!("Mutation {}", listing(impacts.iter().map(String::as_str)))))
}

fn mutation_in_any_codon(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let gene = input.gene(0)?;
    let codons = input.codons(1)?;
    let Some(molecular) = &patient.molecular else { return Ok(no_molecular_data()) };
    let found: Vec<&Variant> = reportable_variants(molecular, gene).filter(|v| codons.contains(v.codon())).collect();
    Ok(variant_outcome(
        molecular,
        gene,
        found,
        &format!("Mutation in codon {}", listing(codons.iter().map(String::as_str))),
    ))
}

fn amplification_outcome(molecular: &MolecularRecord, gene: &str, min_copies: Option<i32>) -> Evaluation {
    let amplified = molecular
        .amplifications
        .iter()
        .find(|a| a.gene == gene && min_copies.map_or(true, |min| a.copies >= min));
    match amplified {
        Some(amplification) => {
            let event = format!("{gene} amp");
            Evaluation::pass(
                format!("{gene} is amplified ({} copies)", amplification.copies),
                format!("{gene} amplification"),
            )
            .with_inclusion_event(event)
        }
        None if is_tested(molecular, gene) => {
            Evaluation::fail(format!("No sufficient amplification of {gene}"), format!("No {gene} amplification"))
        }
        None => Evaluation::undetermined(format!("{gene} has not been tested"), format!("{gene} untested")),
    }
}

fn amplification_of_gene(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let gene = input.gene(0)?;
    Ok(match &patient.molecular {
        Some(molecular) => amplification_outcome(molecular, gene, None),
        None => no_molecular_data(),
    })
}

fn amplification_of_gene_with_copies(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let gene = input.gene(0)?;
    let copies = input.integer(1)?;
    Ok(match &patient.molecular {
        Some(molecular) => amplification_outcome(molecular, gene, Some(copies)),
        None => no_molecular_data(),
    })
}

/// Wild-type means tested with no reportable variant, amplification or fusion.
fn wildtype_of_gene(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let gene = input.gene(0)?;
    let Some(molecular) = &patient.molecular else { return Ok(no_molecular_data()) };
    if !is_tested(molecular, gene) {
        return Ok(Evaluation::undetermined(format!("{gene} has not been tested"), format!("{gene} untested")));
    }
    let events: BTreeSet<String> = reportable_variants(molecular, gene)
        .map(Variant::event)
        .chain(molecular.amplifications.iter().filter(|a| a.gene == gene).map(|_| format!("{gene} amp")))
        .chain(
            molecular
                .fusions
                .iter()
                .filter(|f| f.gene_start == gene || f.gene_end == gene)
                .map(|f| format!("{}::{} fusion", f.gene_start, f.gene_end)),
        )
        .collect();
    Ok(if events.is_empty() {
        Evaluation::pass(format!("{gene} is wild-type"), format!("{gene} wild-type"))
            .with_inclusion_event(format!("{gene} wild-type"))
    } else {
        let mut evaluation = Evaluation::fail(
            format!("{gene} is not wild-type: {}", listing(events.iter().map(String::as_str))),
            format!("{gene} not wild-type"),
        );
        evaluation.exclusion_molecular_events.extend(events);
        evaluation
    })
}

fn msi_signature(patient: &PatientRecord, _: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let Some(molecular) = &patient.molecular else { return Ok(no_molecular_data()) };
    Ok(match molecular.is_microsatellite_unstable {
        Some(true) => Evaluation::pass("Tumor is microsatellite unstable", "MSI").with_inclusion_event("MSI high"),
        Some(false) => Evaluation::fail("Tumor is microsatellite stable", "No MSI"),
        None => Evaluation::undetermined("Microsatellite status unknown", "MSI unknown"),
    })
}

fn tmb_of_at_least(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let min = input.double(0)?;
    let Some(molecular) = &patient.molecular else { return Ok(no_molecular_data()) };
    Ok(match molecular.tumor_mutational_burden {
        Some(tmb) if tmb >= min => {
            Evaluation::pass(format!("TMB {tmb} is at least {min}"), "Adequate TMB").with_inclusion_event(format!("TMB high ({tmb})"))
        }
        Some(tmb) => Evaluation::fail(format!("TMB {tmb} is below {min}"), "Inadequate TMB"),
        None => Evaluation::undetermined("TMB unknown", "TMB unknown"),
    })
}
