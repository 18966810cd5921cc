use template_store_api::{
    cart::{Cart, MAX_LINE_QUANTITY},
    services::admin_service::MAX_PRICE,
    pricing::{CartLine, PromoTable, apply_promo_code, compute_totals, grand_total},
};
use uuid::Uuid;

fn line(title: &str, unit_price: i64, discounted: Option<i64>, quantity: i32) -> CartLine {
    CartLine {
        id: Uuid::new_v4(),
        title: title.into(),
        unit_price,
        discounted_unit_price: discounted,
        quantity,
        product_type: Some("website".into()),
        is_bundle: Some(false),
    }
}

#[test]
fn item_count_sums_quantities_not_lines() {
    let lines = vec![line("A", 1000, None, 2), line("B", 500, None, 3)];
    let totals = compute_totals(&lines);
    assert_eq!(totals.item_count, 5);
    assert_eq!(totals.subtotal, 2000 + 1500);
    assert_eq!(totals.line_discount, 0);
}

#[test]
fn discounted_lines_use_discounted_price_and_report_savings() {
    let lines = vec![line("A", 4900, Some(3900), 2), line("B", 2500, None, 1)];
    let totals = compute_totals(&lines);
    assert_eq!(totals.subtotal, 3900 * 2 + 2500);
    assert_eq!(totals.line_discount, 1000 * 2);
}

#[test]
fn empty_cart_totals_are_zero() {
    let totals = compute_totals(&[]);
    assert_eq!(totals.item_count, 0);
    assert_eq!(totals.subtotal, 0);
    assert_eq!(totals.line_discount, 0);
}

#[test]
fn known_and_unknown_promo_codes() {
    let save = apply_promo_code("SAVE20", 10_000);
    assert!(save.is_valid);
    assert_eq!(save.discount_amount, 2_000);

    let bogus = apply_promo_code("BOGUS", 10_000);
    assert!(!bogus.is_valid);
    assert_eq!(bogus.discount_amount, 0);
}

#[test]
fn promo_lookup_is_case_sensitive() {
    assert!(!apply_promo_code("save20", 10_000).is_valid);
    assert!(!apply_promo_code(" SAVE20", 10_000).is_valid);
}

#[test]
fn promo_discount_rounds_half_up_to_the_cent() {
    // 10% of 10.05 is 1.005
    assert_eq!(apply_promo_code("WELCOME10", 1_005).discount_amount, 101);
    assert_eq!(apply_promo_code("WELCOME10", 1_004).discount_amount, 100);
    assert_eq!(apply_promo_code("TEMPLATE50", 999).discount_amount, 500);
}

#[test]
fn configured_codes_extend_and_override_builtins() {
    let table = PromoTable::with_codes([("LAUNCH5".to_string(), 5), ("SAVE20".to_string(), 25)]);
    assert_eq!(table.percentage("LAUNCH5"), Some(5));
    assert_eq!(table.percentage("SAVE20"), Some(25));
    assert_eq!(table.percentage("WELCOME10"), Some(10));
}

#[test]
fn grand_total_subtracts_promo_and_never_goes_negative() {
    assert_eq!(grand_total(10_000, 2_000), 8_000);
    assert_eq!(grand_total(500, 900), 0);
}

#[test]
fn cart_summary_applies_active_promo_to_current_subtotal() {
    let table = PromoTable::default();
    let mut cart = Cart::new(vec![line("A", 5000, None, 1)], None);

    let application = cart.apply_promo("SAVE20", &table);
    assert!(application.is_valid);
    assert_eq!(application.discount_amount, 1000);

    let first = cart.add(line("B", 5000, None, 7));
    assert_eq!(first, 1);

    let summary = cart.summary(&table);
    assert_eq!(summary.subtotal, 10_000);
    assert_eq!(summary.promo_code.as_deref(), Some("SAVE20"));
    assert_eq!(summary.promo_discount, 2_000);
    assert_eq!(summary.grand_total, summary.subtotal - summary.promo_discount);
}

#[test]
fn invalid_promo_leaves_active_code_untouched() {
    let table = PromoTable::default();
    let mut cart = Cart::new(vec![line("A", 5000, None, 1)], None);
    cart.apply_promo("WELCOME10", &table);

    let application = cart.apply_promo("NOPE", &table);
    assert!(!application.is_valid);
    assert_eq!(cart.promo_code(), Some("WELCOME10"));
}

#[test]
fn stale_promo_code_yields_no_discount() {
    let cart = Cart::new(vec![line("A", 5000, None, 1)], Some("RETIRED".into()));
    let summary = cart.summary(&PromoTable::default());
    assert_eq!(summary.promo_code, None);
    assert_eq!(summary.promo_discount, 0);
    assert_eq!(summary.grand_total, 5000);
}

#[test]
fn totals_at_the_price_and_quantity_ceilings_stay_in_range() {
    let lines: Vec<CartLine> = (0..100)
        .map(|_| line("Max", MAX_PRICE, Some(MAX_PRICE - 1), MAX_LINE_QUANTITY))
        .collect();
    let totals = compute_totals(&lines);
    assert_eq!(totals.subtotal, (MAX_PRICE - 1) * i64::from(MAX_LINE_QUANTITY) * 100);
    assert!(apply_promo_code("TEMPLATE50", totals.subtotal).discount_amount > 0);
}
