//! Parser for the textual form of eligibility functions.
//!
//! The grammar is the one `EligibilityFunction`'s `Display` produces:
//!
//! ```text
//! function := RULE_NAME [ "(" [ param { "," param } ] ")" ]
//! param    := function          (when the enclosing rule is composite)
//!           | token             (when the enclosing rule is a leaf)
//! token    := unquoted | '"' { char | '""' } '"'
//! ```
//!
//! Whether the parameters of a node are nested functions or raw tokens is
//! decided by the rule name. Unquoted tokens are trimmed and may not contain
//! `(`, `)` or `,`. Parsing checks syntax only; counts and types are the
//! resolver's business.

use std::str::FromStr;

use winnow::ascii::multispace0;
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, separated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{none_of, take_till, take_while};

use eligibility_contracts::{
    error::{MatchError, MatchResult},
    function::{EligibilityFunction, FunctionParameter},
    rule::EligibilityRule,
};

type Input<'s> = &'s str;

/// Parse a complete function string. Trailing input is an error.
pub fn parse_function(input: &str) -> MatchResult<EligibilityFunction> {
    delimited(multispace0, function, multispace0).parse(input).map_err(|e| {
        let detail = e.inner().to_string().replace('\n', "; ");
        let detail = if detail.is_empty() { String::new() } else { format!(": {detail}") };
        MatchError::Parse { reason: format!("invalid function at offset {} in '{input}'{detail}", e.offset()) }
    })
}

fn function(input: &mut Input<'_>) -> ModalResult<EligibilityFunction> {
    let rule = rule_name.parse_next(input)?;
    if opt(preceded(multispace0, '(')).parse_next(input)?.is_none() {
        return Ok(EligibilityFunction::new(rule, vec![]));
    }
    if opt(preceded(multispace0, ')')).parse_next(input)?.is_some() {
        return Ok(EligibilityFunction::new(rule, vec![]));
    }

    let parameters: Vec<FunctionParameter> = if rule.is_composite() {
        separated(1.., preceded(multispace0, function).map(FunctionParameter::Function), comma).parse_next(input)?
    } else {
        separated(1.., token.map(FunctionParameter::Token), comma).parse_next(input)?
    };
    cut_err(preceded(multispace0, ')'))
        .context(StrContext::Expected(StrContextValue::CharLiteral(',')))
        .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
        .parse_next(input)?;
    Ok(EligibilityFunction::new(rule, parameters))
}

fn comma(input: &mut Input<'_>) -> ModalResult<char> {
    preceded(multispace0, ',').parse_next(input)
}

fn rule_name(input: &mut Input<'_>) -> ModalResult<EligibilityRule> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_')
        .try_map(|name: &str| EligibilityRule::from_str(name))
        .context(StrContext::Label("eligibility rule"))
        .parse_next(input)
}

fn token(input: &mut Input<'_>) -> ModalResult<String> {
    preceded(multispace0, alt((quoted_token, unquoted_token))).parse_next(input)
}

/// `"..."` with `""` standing for one quote.
fn quoted_token(input: &mut Input<'_>) -> ModalResult<String> {
    let body = repeat(0.., alt(("\"\"".value('"'), none_of('"'))));
    delimited(
        '"',
        body,
        cut_err('"')
            .context(StrContext::Label("quoted token"))
            .context(StrContext::Expected(StrContextValue::CharLiteral('"'))),
    )
    .parse_next(input)
}

/// Runs up to the next `,` or `)`; `(` and `"` end it early, which the
/// caller then rejects.
fn unquoted_token(input: &mut Input<'_>) -> ModalResult<String> {
    take_till(0.., [',', ')', '(', '"']).map(|raw: &str| raw.trim().to_string()).parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leaf_without_parameters() {
        let f = parse_function("IS_MALE").unwrap();
        assert_eq!(f, EligibilityFunction::leaf(EligibilityRule::IsMale, Vec::<String>::new()));
    }

    #[test]
    fn parses_leaf_tokens() {
        let f = parse_function("HAS_HAD_TREATMENT_WITH_ANY_DRUG_X( CAPECITABINE;OXALIPLATIN )").unwrap();
        assert_eq!(f.rule, EligibilityRule::HasHadTreatmentWithAnyDrugX);
        assert_eq!(f.parameters[0].as_token(), Some("CAPECITABINE;OXALIPLATIN"));
    }

    #[test]
    fn parses_nested_composites() {
        let f = parse_function("AND(IS_AT_LEAST_X_YEARS_OLD(18), NOT(IS_PREGNANT))").unwrap();
        assert_eq!(f.rule, EligibilityRule::And);
        assert_eq!(f.parameters.len(), 2);
        let not = f.parameters[1].as_function().unwrap();
        assert_eq!(not.rule, EligibilityRule::Not);
        assert_eq!(not.parameters[0].as_function().unwrap().rule, EligibilityRule::IsPregnant);
    }

    #[test]
    fn quoted_tokens_keep_delimiters() {
        let f = parse_function(r#"HAS_INTOLERANCE_TO_NAME_X("Penicillin (""G""), oral")"#).unwrap();
        assert_eq!(f.parameters[0].as_token(), Some(r#"Penicillin ("G"), oral"#));
    }

    #[test]
    fn whitespace_around_separators_is_ignored() {
        let f = parse_function(r#" AND ( IS_MALE , HAS_INTOLERANCE_TO_NAME_X( "Latex" ) ) "#).unwrap();
        assert_eq!(f.parameters.len(), 2);
        let intolerance = f.parameters[1].as_function().unwrap();
        assert_eq!(intolerance.parameters[0].as_token(), Some("Latex"));
    }

    #[test]
    fn empty_parentheses_mean_no_parameters() {
        assert!(parse_function("IS_MALE()").unwrap().parameters.is_empty());
    }

    #[test]
    fn errors_report_the_offset() {
        match parse_function("IS_AT_LEAST_X_YEARS_OLD(18") {
            Err(MatchError::Parse { reason }) => assert!(reason.contains("at offset"), "{reason}"),
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn display_output_parses_back() {
        let original = EligibilityFunction::composite(
            EligibilityRule::Or,
            vec![
                EligibilityFunction::leaf(EligibilityRule::HasIntoleranceToNameX, [" padded, odd \"name\""]),
                EligibilityFunction::composite(
                    EligibilityRule::WarnIf,
                    vec![EligibilityFunction::leaf(EligibilityRule::HasStageX, ["IIIA;IV"])],
                ),
            ],
        );
        assert_eq!(parse_function(&original.to_string()).unwrap(), original);
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "",
            "NOT_A_RULE(1)",
            "is_male",
            "IS_AT_LEAST_X_YEARS_OLD(18",
            "IS_AT_LEAST_X_YEARS_OLD(18) extra",
            "HAS_INTOLERANCE_TO_NAME_X(\"open)",
            "AND(IS_MALE, 18)",
        ] {
            match parse_function(input) {
                Err(MatchError::Parse { .. }) => {}
                other => panic!("expected Parse error for '{input}', got {:?}", other),
            }
        }
    }
}
