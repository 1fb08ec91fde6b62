use super::*;
use crate::model::{Direction, FieldRole, FieldSpec};

fn city() -> Vec<FieldSpec> {
    vec![FieldSpec::new("city")]
}

#[test]
fn test_tokens_are_and_joined_per_field() {
    let descriptor = build("ro ma", &city(), "Customer", &[]);
    assert_eq!(
        descriptor.filter.as_deref(),
        Some("Customer.city LIKE '%ro%' AND Customer.city LIKE '%ma%'")
    );
    assert_eq!(descriptor.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(descriptor.continuation, None);
    assert_eq!(descriptor.direction, Direction::Forward);
}

#[test]
fn test_empty_text_yields_no_predicate() {
    assert_eq!(build("", &city(), "Customer", &[]).filter, None);
    assert_eq!(build("   \t ", &city(), "Customer", &[]).filter, None);
}

#[test]
fn test_repeated_whitespace_is_ignored() {
    let descriptor = build("  ro   ma ", &city(), "Customer", &[]);
    assert_eq!(
        descriptor.filter,
        build("ro ma", &city(), "Customer", &[]).filter
    );
}

#[test]
fn test_fields_are_or_joined() {
    let fields = vec![
        FieldSpec::with_role("code", FieldRole::Primary),
        FieldSpec::new("name"),
    ];
    let descriptor = build("ro", &fields, "Supplier", &[]);
    assert_eq!(
        descriptor.filter.as_deref(),
        Some("(Supplier.code LIKE '%ro%') OR (Supplier.name LIKE '%ro%')")
    );
}

#[test]
fn test_hidden_and_blank_fields_are_skipped() {
    let fields = vec![
        FieldSpec::new("name"),
        FieldSpec::new("internal_id").hidden(),
        FieldSpec::new(" "),
    ];
    let descriptor = build("x", &fields, "Item", &[]);
    assert_eq!(descriptor.filter.as_deref(), Some("Item.name LIKE '%x%'"));
}

#[test]
fn test_qualified_fields_are_kept() {
    let fields = vec![FieldSpec::new("City.name")];
    let descriptor = build("ro", &fields, "Customer", &[]);
    assert_eq!(descriptor.filter.as_deref(), Some("City.name LIKE '%ro%'"));
}

#[test]
fn test_quotes_are_escaped() {
    let descriptor = build("d'angelo", &city(), "Customer", &[]);
    assert_eq!(
        descriptor.filter.as_deref(),
        Some("Customer.city LIKE '%d''angelo%'")
    );
}

#[test]
fn test_malformed_configuration_matches_everything() {
    assert_eq!(build("ro", &[], "Customer", &[]).filter, None);
    assert_eq!(diagnose(&[], "Customer"), Some(Degenerate::NoSearchableFields));
    assert_eq!(diagnose(&city(), ""), Some(Degenerate::MissingTable));
    assert_eq!(diagnose(&city(), "Customer"), None);

    // Missing table leaves the column unqualified rather than failing.
    assert_eq!(
        build("ro", &city(), "", &[]).filter.as_deref(),
        Some("city LIKE '%ro%'")
    );
}

#[test]
fn test_static_fragment_is_anded_with_search() {
    let fragments = vec!["Supplier.active = 1".to_string()];
    let fields = vec![FieldSpec::new("name")];

    let descriptor = build("acme", &fields, "Supplier", &fragments);
    assert_eq!(
        descriptor.filter.as_deref(),
        Some("(Supplier.active = 1) AND (Supplier.name LIKE '%acme%')")
    );

    // Without search text the static condition stands alone.
    let descriptor = build("", &fields, "Supplier", &fragments);
    assert_eq!(descriptor.filter.as_deref(), Some("Supplier.active = 1"));
}

#[test]
fn test_placeholder_is_substituted() {
    let fragments = vec!["Supplier.active = 1 AND $value".to_string()];
    let fields = vec![FieldSpec::new("name")];

    let descriptor = build("acme", &fields, "Supplier", &fragments);
    assert_eq!(
        descriptor.filter.as_deref(),
        Some("Supplier.active = 1 AND Supplier.name LIKE '%acme%'")
    );

    let descriptor = build("acme corp", &fields, "Supplier", &fragments);
    assert_eq!(
        descriptor.filter.as_deref(),
        Some(
            "Supplier.active = 1 AND (Supplier.name LIKE '%acme%' AND Supplier.name LIKE '%corp%')"
        )
    );
}

#[test]
fn test_placeholder_fragment_dropped_without_search_text() {
    let fragments = vec![
        "Supplier.active = 1".to_string(),
        "$value OR Supplier.pinned = 1".to_string(),
    ];
    let fields = vec![FieldSpec::new("name")];
    let descriptor = build("", &fields, "Supplier", &fragments);
    assert_eq!(descriptor.filter.as_deref(), Some("Supplier.active = 1"));
}

#[test]
fn test_multiple_static_fragments_are_parenthesized() {
    let fragments = vec![
        "Supplier.active = 1".to_string(),
        String::new(),
        "Supplier.country = 'IT'".to_string(),
    ];
    let descriptor = build("", &[FieldSpec::new("name")], "Supplier", &fragments);
    assert_eq!(
        descriptor.filter.as_deref(),
        Some("(Supplier.active = 1) AND (Supplier.country = 'IT')")
    );
}

#[test]
fn test_additional_where_is_ored() {
    let fields = vec![FieldSpec::new("name")];
    let descriptor = PredicateInput::new("acme", &fields, "Supplier")
        .additional_where(Some("Supplier.id = 7"))
        .build();
    assert_eq!(
        descriptor.filter.as_deref(),
        Some("(Supplier.name LIKE '%acme%') OR (Supplier.id = 7)")
    );

    let descriptor = PredicateInput::new("", &fields, "Supplier")
        .additional_where(Some("Supplier.id = 7"))
        .build();
    assert_eq!(descriptor.filter.as_deref(), Some("Supplier.id = 7"));

    let descriptor = PredicateInput::new("acme", &fields, "Supplier")
        .additional_where(Some("  "))
        .build();
    assert_eq!(descriptor.filter.as_deref(), Some("Supplier.name LIKE '%acme%'"));
}

#[test]
fn test_paging_options_are_carried() {
    let fields = city();
    let descriptor = PredicateInput::new("ro", &fields, "Customer")
        .order_by(Some("Customer.city ASC"))
        .page_size(20)
        .direction(Direction::Backward)
        .build();
    assert_eq!(descriptor.order_by.as_deref(), Some("Customer.city ASC"));
    assert_eq!(descriptor.page_size, 20);
    assert_eq!(descriptor.direction, Direction::Backward);

    let descriptor = PredicateInput::new("ro", &fields, "Customer").page_size(0).build();
    assert_eq!(descriptor.page_size, 1);
}

#[test]
fn test_same_input_builds_equal_descriptors() {
    let a = build("ro ma", &city(), "Customer", &[]);
    let b = build("ro  ma", &city(), "Customer", &[]);
    let c = build("ro mar", &city(), "Customer", &[]);
    assert_eq!(a, b);
    assert_ne!(a, c);
}
