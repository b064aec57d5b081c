use dynafinder::error::FinderError;
use dynafinder::family::{FinderFamily, COUNT_BY, FIND_ALL_BOOLEAN, FIND_ALL_BY, FIND_BY};
use dynafinder::tokenizer::{split_on_operator, tokenize, BooleanClause, Operator};

fn operators() -> Vec<Operator> {
    vec![Operator::new("And").expect("And"), Operator::new("Or").expect("Or")]
}

#[test]
fn bare_boolean_property() {
    let family = FinderFamily::built_in(FIND_ALL_BOOLEAN).expect("family");
    let tokens = tokenize(family.pattern(), "findAllEnabled").expect("tokens");
    assert_eq!(tokens.boolean, Some(BooleanClause { property: "Enabled", value: true }));
    assert_eq!(tokens.sequence, None);
}

#[test]
fn negated_boolean_property() {
    let family = FinderFamily::built_in(FIND_ALL_BOOLEAN).expect("family");
    let tokens = tokenize(family.pattern(), "findAllNotEnabled").expect("tokens");
    assert_eq!(tokens.boolean, Some(BooleanClause { property: "Enabled", value: false }));
}

// "Nothing" starts with "Not" but is not a negation
#[test]
fn not_prefix_needs_a_following_capital() {
    let family = FinderFamily::built_in(FIND_ALL_BOOLEAN).expect("family");
    let tokens = tokenize(family.pattern(), "findAllNothing").expect("tokens");
    assert_eq!(tokens.boolean, Some(BooleanClause { property: "Nothing", value: true }));
}

#[test]
fn boolean_property_with_sequence() {
    let family = FinderFamily::built_in(FIND_ALL_BOOLEAN).expect("family");
    let tokens = tokenize(family.pattern(), "findAllEnabledByLastNameAndAge").expect("tokens");
    assert_eq!(tokens.boolean, Some(BooleanClause { property: "Enabled", value: true }));
    assert_eq!(tokens.sequence, Some("LastNameAndAge"));
}

#[test]
fn plain_family_yields_sequence() {
    let family = FinderFamily::built_in(FIND_ALL_BY).expect("family");
    let tokens = tokenize(family.pattern(), "findAllByLastNameAndAgeGreaterThan").expect("tokens");
    assert_eq!(tokens.boolean, None);
    assert_eq!(tokens.sequence, Some("LastNameAndAgeGreaterThan"));
}

#[test]
fn non_matching_method_is_malformed() {
    let family = FinderFamily::built_in(FIND_BY).expect("family");
    let error = tokenize(family.pattern(), "countByName").expect_err("should not tokenize");
    assert!(matches!(error, FinderError::MalformedMethodName { ref method, .. } if method == "countByName"));
}

#[test]
fn family_matching() {
    let find_by = FinderFamily::built_in(FIND_BY).expect("family");
    let count_by = FinderFamily::built_in(COUNT_BY).expect("family");
    assert!(find_by.is_method_match("findByName"));
    assert!(!find_by.is_method_match("findAllByName"));
    assert!(!find_by.is_method_match("findBy"));
    assert!(count_by.is_method_match("countByAgeGreaterThan"));
    assert!(!count_by.is_method_match("countAll"));
    assert!(FinderFamily::built_in("findEverything").is_err());
}

#[test]
fn split_on_and() {
    let operators = operators();
    let (operator, clauses) = split_on_operator(&operators, "LastNameAndAgeGreaterThan").expect("split");
    assert_eq!(operator.name(), "And");
    assert_eq!(clauses, vec!["LastName", "AgeGreaterThan"]);
}

#[test]
fn split_on_every_occurrence() {
    let operators = operators();
    let (operator, clauses) = split_on_operator(&operators, "FirstNameOrLastNameOrAge").expect("split");
    assert_eq!(operator.name(), "Or");
    assert_eq!(clauses, vec!["FirstName", "LastName", "Age"]);
}

#[test]
fn single_clause_is_not_split() {
    let operators = operators();
    assert!(split_on_operator(&operators, "AgeGreaterThan").is_none());
    // "Or" in "Order" is followed by a lower-case letter
    assert!(split_on_operator(&operators, "ColorOrder").is_none());
}

#[test]
fn mixed_operators_split_on_the_first_listed() {
    let operators = operators();
    let (operator, clauses) = split_on_operator(&operators, "NameOrAgeAndEnabled").expect("split");
    assert_eq!(operator.name(), "And");
    assert_eq!(clauses, vec!["NameOrAge", "Enabled"]);
}
