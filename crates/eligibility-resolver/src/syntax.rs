//! Token syntax.
//!
//! Pure parsers for single parameter tokens. None of these consult an
//! external collaborator; they are shared by the syntax-only well-formedness
//! check and by full resolution. Errors are plain reasons, the resolver
//! attaches the rule and position.

use once_cell::sync::Lazy;
use regex::Regex;

use eligibility_contracts::domain::{normalize_token, Haplotype, HlaAllele};

/// Separator of list-valued positions.
pub const LIST_DELIMITER: char = ';';

/// Joins an ICD main code (or title) with its extension.
pub const ICD_EXTENSION_DELIMITER: char = '&';

static HLA_ALLELE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+[0-9]?)\*([0-9]{2,3}):([0-9]{2,3})$").expect("HLA allele pattern"));

static HLA_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+[0-9]?)\*([0-9]{2,3})$").expect("HLA group pattern"));

static HAPLOTYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\*[0-9]+)_(HOM|HET)$").expect("haplotype pattern"));

static CODON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][0-9]+$").expect("codon pattern"));

static PROTEIN_IMPACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][0-9]+(_[A-Z][0-9]+)?([A-Z*]|fs|del|dup|ins[A-Z]+|delins[A-Z]+)$")
        .expect("protein impact pattern")
});

static GENE_SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("gene symbol pattern"));

static PROTEIN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ._/-]*$").expect("protein name pattern"));

pub fn parse_integer(token: &str) -> Result<i32, String> {
    token.trim().parse::<i32>().map_err(|_| format!("'{token}' is not an integer"))
}

pub fn parse_double(token: &str) -> Result<f64, String> {
    match token.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("'{token}' is not a number")),
    }
}

pub fn parse_text(token: &str) -> Result<String, String> {
    let text = token.trim();
    if text.is_empty() {
        Err("empty text".to_string())
    } else {
        Ok(text.to_string())
    }
}

/// Split a `;`-delimited list. Elements are trimmed; an empty element rejects
/// the whole list.
pub fn split_list(token: &str) -> Result<Vec<&str>, String> {
    let elements: Vec<&str> = token.split(LIST_DELIMITER).map(str::trim).collect();
    if elements.iter().any(|e| e.is_empty()) {
        return Err(format!("'{token}' contains an empty list element"));
    }
    Ok(elements)
}

/// Match a token against a closed vocabulary after normalization.
pub fn parse_enum<T>(token: &str, from_token: fn(&str) -> Option<T>, what: &str) -> Result<T, String> {
    from_token(token).ok_or_else(|| format!("'{}' is not a valid {what}", normalize_token(token)))
}

pub fn parse_enum_list<T: Ord>(
    token: &str,
    from_token: fn(&str) -> Option<T>,
    what: &str,
) -> Result<std::collections::BTreeSet<T>, String> {
    split_list(token)?.into_iter().map(|element| parse_enum(element, from_token, what)).collect()
}

pub fn parse_hla_allele(token: &str) -> Result<HlaAllele, String> {
    let token = token.trim();
    let captures = HLA_ALLELE
        .captures(token)
        .ok_or_else(|| format!("'{token}' is not an HLA allele like A*02:01"))?;
    Ok(HlaAllele {
        gene: captures[1].to_string(),
        allele_group: captures[2].to_string(),
        hla_protein: Some(captures[3].to_string()),
    })
}

pub fn parse_hla_group(token: &str) -> Result<HlaAllele, String> {
    let token = token.trim();
    let captures = HLA_GROUP
        .captures(token)
        .ok_or_else(|| format!("'{token}' is not an HLA allele group like A*02"))?;
    Ok(HlaAllele { gene: captures[1].to_string(), allele_group: captures[2].to_string(), hla_protein: None })
}

pub fn parse_haplotype(token: &str) -> Result<Haplotype, String> {
    let token = token.trim();
    let captures = HAPLOTYPE
        .captures(token)
        .ok_or_else(|| format!("'{token}' is not a haplotype like *28_HOM"))?;
    Ok(Haplotype { allele: captures[1].to_string(), homozygous: &captures[2] == "HOM" })
}

pub fn parse_codon(token: &str) -> Result<String, String> {
    let token = token.trim();
    if CODON.is_match(token) {
        Ok(token.to_string())
    } else {
        Err(format!("'{token}' is not a codon like G12"))
    }
}

pub fn parse_protein_impact(token: &str) -> Result<String, String> {
    let token = token.trim();
    if PROTEIN_IMPACT.is_match(token) {
        Ok(token.to_string())
    } else {
        Err(format!("'{token}' is not a protein impact like V600E"))
    }
}

pub fn parse_gene_symbol(token: &str) -> Result<String, String> {
    let token = token.trim();
    if GENE_SYMBOL.is_match(token) {
        Ok(token.to_string())
    } else {
        Err(format!("'{token}' is not a gene symbol"))
    }
}

pub fn parse_protein_name(token: &str) -> Result<String, String> {
    let token = token.trim();
    if PROTEIN_NAME.is_match(token) {
        Ok(token.to_string())
    } else {
        Err(format!("'{token}' is not a protein name"))
    }
}

/// Split `main&extension`. Each half may be an ICD title or code.
pub fn split_icd(token: &str) -> Result<(&str, Option<&str>), String> {
    let mut halves = token.split(ICD_EXTENSION_DELIMITER).map(str::trim);
    let main = halves.next().unwrap_or_default();
    let extension = halves.next();
    if halves.next().is_some() {
        return Err(format!("'{token}' has more than one '{ICD_EXTENSION_DELIMITER}'"));
    }
    if main.is_empty() || extension.is_some_and(str::is_empty) {
        return Err(format!("'{token}' has an empty ICD title or code"));
    }
    Ok((main, extension))
}

#[cfg(test)]
mod tests {
    use eligibility_contracts::domain::Intent;

    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_integer("2"), Ok(2));
        assert_eq!(parse_integer(" -3 "), Ok(-3));
        assert!(parse_integer("two").is_err());
        assert!(parse_integer("2.5").is_err());
    }

    #[test]
    fn doubles_must_be_finite() {
        assert_eq!(parse_double("1.5"), Ok(1.5));
        assert!(parse_double("NaN").is_err());
        assert!(parse_double("inf").is_err());
    }

    #[test]
    fn lists_reject_empty_elements() {
        assert_eq!(split_list("CAPECITABINE; OXALIPLATIN").unwrap(), vec!["CAPECITABINE", "OXALIPLATIN"]);
        assert!(split_list("A;;B").is_err());
        assert!(split_list("").is_err());
        assert!(split_list("A;").is_err());
    }

    #[test]
    fn enum_lists_normalize_elements() {
        let intents = parse_enum_list("adjuvant;palliative", Intent::from_token, "intent").unwrap();
        assert!(intents.contains(&Intent::Adjuvant) && intents.contains(&Intent::Palliative));
        let err = parse_enum_list("adjuvant;sometimes", Intent::from_token, "intent").unwrap_err();
        assert!(err.contains("SOMETIMES"), "{err}");
    }

    #[test]
    fn hla_tokens() {
        let allele = parse_hla_allele("A*02:01").unwrap();
        assert_eq!(allele.to_string(), "A*02:01");
        assert!(parse_hla_allele("A*02").is_err());
        assert_eq!(parse_hla_group("B*07").unwrap().hla_protein, None);
        assert!(parse_hla_group("B07").is_err());
    }

    #[test]
    fn molecular_tokens() {
        assert!(parse_codon("G12").is_ok());
        assert!(parse_codon("G12C").is_err());
        assert!(parse_protein_impact("V600E").is_ok());
        assert!(parse_protein_impact("E746_A750del").is_ok());
        assert!(parse_protein_impact("V600").is_err());
        assert!(parse_haplotype("*28_HOM").unwrap().homozygous);
        assert!(parse_haplotype("*28").is_err());
    }

    #[test]
    fn icd_extension_split() {
        assert_eq!(split_icd("2C25&XH0EW2"), Ok(("2C25", Some("XH0EW2"))));
        assert_eq!(split_icd("Pneumonitis"), Ok(("Pneumonitis", None)));
        assert!(split_icd("A&B&C").is_err());
        assert!(split_icd("A&").is_err());
    }
}
