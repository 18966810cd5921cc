use chrono::NaiveDate;
use template_store_api::{
    config::parse_promo_codes,
    dto::purchases::CheckoutRequest,
    error::AppError,
    services::{
        admin_service::{MAX_PRICE, validate_pricing},
        blog_service::slugify,
        purchase_service::{luhn_valid, validate_payment},
    },
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn form() -> CheckoutRequest {
    CheckoutRequest {
        full_name: "  Ada Lovelace ".into(),
        email: "Ada@Example.com".into(),
        card_number: "4242 4242 4242 4242".into(),
        expiry: "12/27".into(),
        cvc: "123".into(),
    }
}

#[test]
fn valid_form_keeps_only_last_four_digits() -> anyhow::Result<()> {
    let payment = validate_payment(&form(), today())?;
    assert_eq!(payment.payer_name, "Ada Lovelace");
    assert_eq!(payment.payer_email, "ada@example.com");
    assert_eq!(payment.card_last4, "4242");
    Ok(())
}

#[test]
fn luhn_checksum() {
    assert!(luhn_valid("4242424242424242"));
    assert!(luhn_valid("79927398713"));
    assert!(!luhn_valid("4242424242424241"));
    assert!(!luhn_valid(""));
}

#[test]
fn rejects_bad_card_numbers() {
    for card in ["4242 4242 4242 4241", "4242", "4242-4242-4242-abcd"] {
        let request = CheckoutRequest {
            card_number: card.into(),
            ..form()
        };
        assert!(
            matches!(validate_payment(&request, today()), Err(AppError::BadRequest(_))),
            "{card} should be rejected"
        );
    }
}

#[test]
fn dashes_in_card_number_are_ignored() {
    let request = CheckoutRequest {
        card_number: "4242-4242-4242-4242".into(),
        ..form()
    };
    assert!(validate_payment(&request, today()).is_ok());
}

#[test]
fn expiry_month_is_inclusive() {
    let this_month = CheckoutRequest {
        expiry: "06/25".into(),
        ..form()
    };
    assert!(validate_payment(&this_month, today()).is_ok());

    let last_month = CheckoutRequest {
        expiry: "05/25".into(),
        ..form()
    };
    assert!(validate_payment(&last_month, today()).is_err());

    for malformed in ["13/27", "1227", "12/2027", ""] {
        let request = CheckoutRequest {
            expiry: malformed.into(),
            ..form()
        };
        assert!(validate_payment(&request, today()).is_err(), "{malformed}");
    }
}

#[test]
fn cvc_must_be_three_or_four_digits() {
    for (cvc, ok) in [("123", true), ("1234", true), ("12", false), ("12a", false)] {
        let request = CheckoutRequest {
            cvc: cvc.into(),
            ..form()
        };
        assert_eq!(validate_payment(&request, today()).is_ok(), ok, "{cvc}");
    }
}

#[test]
fn missing_name_or_email_is_rejected() {
    let no_name = CheckoutRequest {
        full_name: "   ".into(),
        ..form()
    };
    assert!(validate_payment(&no_name, today()).is_err());

    let no_email = CheckoutRequest {
        email: "not-an-email".into(),
        ..form()
    };
    assert!(validate_payment(&no_email, today()).is_err());
}

#[test]
fn slugs_are_lowercase_dash_joined() {
    assert_eq!(slugify("Hello, World!"), "hello-world");
    assert_eq!(slugify("  5 Tips -- for  Landing Pages "), "5-tips-for-landing-pages");
    assert_eq!(slugify("???"), "");
}

#[test]
fn discounted_price_must_be_below_list_price() {
    assert!(validate_pricing(4900, None).is_ok());
    assert!(validate_pricing(4900, Some(3900)).is_ok());
    assert!(validate_pricing(4900, Some(4900)).is_err());
    assert!(validate_pricing(-1, None).is_err());
    assert!(validate_pricing(4900, Some(-5)).is_err());
}

#[test]
fn prices_above_the_ceiling_are_rejected() {
    assert!(validate_pricing(MAX_PRICE, Some(MAX_PRICE - 1)).is_ok());
    assert!(matches!(
        validate_pricing(MAX_PRICE + 1, None),
        Err(AppError::BadRequest(_))
    ));
    assert!(validate_pricing(10_000_000_000_000_000, None).is_err());
}

#[test]
fn promo_code_config_parsing() -> anyhow::Result<()> {
    let parsed = parse_promo_codes(" LAUNCH5:5 , VIP:100,")?;
    assert_eq!(
        parsed,
        vec![("LAUNCH5".to_string(), 5), ("VIP".to_string(), 100)]
    );
    assert!(parse_promo_codes("ZERO:0").is_err());
    assert!(parse_promo_codes("NOPERCENT").is_err());
    assert!(parse_promo_codes("BIG:250").is_err());
    Ok(())
}
