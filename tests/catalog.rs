use chrono::{Duration, TimeZone, Utc};
use template_store_api::{
    catalog::{CatalogFilter, SortKey, categories, filter_and_sort, sample_catalog},
    models::Template,
};
use uuid::Uuid;

fn template(title: &str, category: &str, price: i64, discounted: Option<i64>, day: i64) -> Template {
    let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::days(day);
    Template {
        id: Uuid::new_v4(),
        title: title.into(),
        description: Some(format!("{title} template")),
        category: category.into(),
        price,
        discounted_price: discounted,
        product_type: Some("website".into()),
        is_bundle: false,
        is_featured: false,
        image_url: None,
        download_url: None,
        created_at,
        updated_at: created_at,
    }
}

fn titles(items: &[Template]) -> Vec<&str> {
    items.iter().map(|t| t.title.as_str()).collect()
}

#[test]
fn business_filter_excludes_other_categories() {
    let filter = CatalogFilter {
        category: Some("Business".into()),
        ..Default::default()
    };
    let visible = filter_and_sort(sample_catalog(), &filter);

    assert!(!visible.is_empty());
    assert!(visible.iter().all(|t| t.category == "Business"));
    assert_eq!(
        visible.len(),
        sample_catalog()
            .iter()
            .filter(|t| t.category == "Business")
            .count()
    );
}

#[test]
fn all_category_matches_everything() {
    let filter = CatalogFilter {
        category: Some("All".into()),
        ..Default::default()
    };
    assert_eq!(
        filter_and_sort(sample_catalog(), &filter).len(),
        sample_catalog().len()
    );
}

#[test]
fn price_range_is_inclusive_on_effective_price() {
    let entries = vec![
        template("Cheap", "Blog", 1000, None, 0),
        template("Marked Down", "Blog", 9000, Some(2000), 1),
        template("Pricey", "Blog", 9000, None, 2),
    ];
    let filter = CatalogFilter {
        min_price: Some(1000),
        max_price: Some(2000),
        ..Default::default()
    };
    let visible = filter_and_sort(entries, &filter);
    assert_eq!(titles(&visible), vec!["Cheap", "Marked Down"]);
}

#[test]
fn search_is_case_insensitive_over_title_and_description() {
    let filter = CatalogFilter {
        search: Some("PORTFOLIO".into()),
        ..Default::default()
    };
    let visible = filter_and_sort(sample_catalog(), &filter);
    assert!(!visible.is_empty());
    assert!(visible.iter().all(|t| {
        t.title.to_lowercase().contains("portfolio")
            || t
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains("portfolio"))
    }));
}

#[test]
fn price_sorts_are_stable() {
    let entries = vec![
        template("B", "Blog", 3000, None, 0),
        template("A", "Blog", 1000, None, 1),
        template("C", "Blog", 3000, None, 2),
        template("D", "Blog", 5000, Some(2000), 3),
    ];

    let low = filter_and_sort(
        entries.clone(),
        &CatalogFilter {
            sort: SortKey::PriceLow,
            ..Default::default()
        },
    );
    assert_eq!(titles(&low), vec!["A", "D", "B", "C"]);

    let high = filter_and_sort(
        entries,
        &CatalogFilter {
            sort: SortKey::PriceHigh,
            ..Default::default()
        },
    );
    assert_eq!(titles(&high), vec!["B", "C", "D", "A"]);
}

#[test]
fn newest_orders_by_creation_time_descending() {
    let entries = vec![
        template("Old", "Blog", 1000, None, 0),
        template("Newest", "Blog", 1000, None, 5),
        template("Middle", "Blog", 1000, None, 2),
    ];
    let visible = filter_and_sort(
        entries,
        &CatalogFilter {
            sort: SortKey::Newest,
            ..Default::default()
        },
    );
    assert_eq!(titles(&visible), vec!["Newest", "Middle", "Old"]);
}

#[test]
fn featured_entries_come_first_keeping_catalog_order() {
    let mut entries = vec![
        template("Plain One", "Blog", 1000, None, 0),
        template("Star", "Blog", 1000, None, 1),
        template("Plain Two", "Blog", 1000, None, 2),
    ];
    entries[1].is_featured = true;

    let visible = filter_and_sort(entries, &CatalogFilter::default());
    assert_eq!(titles(&visible), vec!["Star", "Plain One", "Plain Two"]);
}

#[test]
fn categories_are_distinct_in_first_seen_order() {
    let entries = vec![
        template("A", "Business", 1000, None, 0),
        template("B", "Blog", 1000, None, 1),
        template("C", "Business", 1000, None, 2),
    ];
    assert_eq!(categories(&entries), vec!["Business", "Blog"]);
}

#[test]
fn sort_keys_parse_from_kebab_case() {
    let key: SortKey = serde_json::from_str("\"price-low\"").unwrap();
    assert_eq!(key, SortKey::PriceLow);
    assert_eq!(SortKey::default(), SortKey::Featured);
}
