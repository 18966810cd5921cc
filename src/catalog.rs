//! In-memory catalog filtering and ordering.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Template;

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

pub trait CatalogEntry {
    fn title(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn category(&self) -> &str;
    fn list_price(&self) -> i64;
    fn discounted_price(&self) -> Option<i64>;
    fn is_featured(&self) -> bool;
    fn created_at(&self) -> DateTime<Utc>;

    /// Discounted price if set, otherwise list price.
    fn effective_price(&self) -> i64 {
        self.discounted_price().unwrap_or(self.list_price())
    }
}

impl<T: CatalogEntry + ?Sized> CatalogEntry for &T {
    fn title(&self) -> &str {
        (**self).title()
    }
    fn description(&self) -> Option<&str> {
        (**self).description()
    }
    fn category(&self) -> &str {
        (**self).category()
    }
    fn list_price(&self) -> i64 {
        (**self).list_price()
    }
    fn discounted_price(&self) -> Option<i64> {
        (**self).discounted_price()
    }
    fn is_featured(&self) -> bool {
        (**self).is_featured()
    }
    fn created_at(&self) -> DateTime<Utc> {
        (**self).created_at()
    }
}

impl CatalogEntry for Template {
    fn title(&self) -> &str {
        &self.title
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn list_price(&self) -> i64 {
        self.price
    }
    fn discounted_price(&self) -> Option<i64> {
        self.discounted_price
    }
    fn is_featured(&self) -> bool {
        self.is_featured
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Newest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    pub sort: SortKey,
}

impl CatalogFilter {
    /// Conjunction of category, inclusive price range and search text.
    pub fn matches<T: CatalogEntry>(&self, entry: &T) -> bool {
        let category_ok = match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) | Some("") => true,
            Some(category) => entry.category() == category,
        };
        let price = entry.effective_price();
        let min_ok = self.min_price.is_none_or(|min| price >= min);
        let max_ok = self.max_price.is_none_or(|max| price <= max);
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                entry.title().to_lowercase().contains(&needle)
                    || entry
                        .description()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
        };
        category_ok && min_ok && max_ok && search_ok
    }
}

/// Visible subset in display order. Every ordering is stable.
pub fn filter_and_sort<T: CatalogEntry>(
    entries: impl IntoIterator<Item = T>,
    filter: &CatalogFilter,
) -> Vec<T> {
    let mut visible: Vec<T> = entries
        .into_iter()
        .filter(|entry| filter.matches(entry))
        .collect();

    match filter.sort {
        SortKey::Featured => visible.sort_by_key(|entry| !entry.is_featured()),
        SortKey::PriceLow => visible.sort_by_key(|entry| entry.effective_price()),
        SortKey::PriceHigh => {
            visible.sort_by(|a, b| b.effective_price().cmp(&a.effective_price()))
        }
        SortKey::Newest => visible.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
    }

    visible
}

/// Distinct categories in first-seen order.
pub fn categories<T: CatalogEntry>(entries: &[T]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for entry in entries {
        if !seen.iter().any(|c| c == entry.category()) {
            seen.push(entry.category().to_string());
        }
    }
    seen
}

struct SampleEntry {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    price: i64,
    discounted_price: Option<i64>,
    product_type: &'static str,
    is_bundle: bool,
    is_featured: bool,
}

const SAMPLE_ENTRIES: &[SampleEntry] = &[
    SampleEntry {
        title: "Corporate Pro",
        description: "Multi-page site for consulting firms and agencies",
        category: "Business",
        price: 4900,
        discounted_price: Some(3900),
        product_type: "website",
        is_bundle: false,
        is_featured: true,
    },
    SampleEntry {
        title: "Startup Launch",
        description: "Pitch-ready landing page with pricing tables",
        category: "Landing Page",
        price: 2900,
        discounted_price: None,
        product_type: "landing-page",
        is_bundle: false,
        is_featured: true,
    },
    SampleEntry {
        title: "Creative Folio",
        description: "Gallery-first portfolio for designers and photographers",
        category: "Portfolio",
        price: 3500,
        discounted_price: None,
        product_type: "website",
        is_bundle: false,
        is_featured: false,
    },
    SampleEntry {
        title: "ShopFront",
        description: "Storefront with product grid, cart drawer and checkout pages",
        category: "E-commerce",
        price: 6900,
        discounted_price: Some(5900),
        product_type: "website",
        is_bundle: false,
        is_featured: true,
    },
    SampleEntry {
        title: "Minimal Journal",
        description: "Typography-focused blog theme",
        category: "Blog",
        price: 1900,
        discounted_price: None,
        product_type: "theme",
        is_bundle: false,
        is_featured: false,
    },
    SampleEntry {
        title: "Law Firm Classic",
        description: "Trust-building layout for legal practices",
        category: "Business",
        price: 3900,
        discounted_price: None,
        product_type: "website",
        is_bundle: false,
        is_featured: false,
    },
    SampleEntry {
        title: "Finance Dashboard",
        description: "Admin dashboard for accounting and invoicing teams",
        category: "Business",
        price: 5900,
        discounted_price: Some(4500),
        product_type: "dashboard",
        is_bundle: false,
        is_featured: false,
    },
    SampleEntry {
        title: "App Teaser",
        description: "Mobile app landing page with waitlist form",
        category: "Landing Page",
        price: 1500,
        discounted_price: Some(900),
        product_type: "landing-page",
        is_bundle: false,
        is_featured: false,
    },
    SampleEntry {
        title: "Boutique",
        description: "Fashion store theme with lookbook sections",
        category: "E-commerce",
        price: 7900,
        discounted_price: None,
        product_type: "website",
        is_bundle: false,
        is_featured: false,
    },
    SampleEntry {
        title: "Developer Portfolio",
        description: "Project showcase with case-study pages",
        category: "Portfolio",
        price: 2500,
        discounted_price: Some(1900),
        product_type: "website",
        is_bundle: false,
        is_featured: false,
    },
    SampleEntry {
        title: "Business Starter Pack",
        description: "Corporate Pro, Law Firm Classic and Finance Dashboard in one bundle",
        category: "Bundles",
        price: 14700,
        discounted_price: Some(9900),
        product_type: "bundle",
        is_bundle: true,
        is_featured: true,
    },
    SampleEntry {
        title: "Creator Pack",
        description: "Every portfolio and blog template",
        category: "Bundles",
        price: 7900,
        discounted_price: Some(4900),
        product_type: "bundle",
        is_bundle: true,
        is_featured: false,
    },
];

/// The fixed sample catalog. Entries are spaced one day apart, oldest first.
pub fn sample_catalog() -> Vec<Template> {
    let epoch = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default();

    SAMPLE_ENTRIES
        .iter()
        .zip(0_i64..)
        .map(|(entry, day)| {
            let created_at = epoch + Duration::days(day);
            Template {
                id: Uuid::new_v4(),
                title: entry.title.to_string(),
                description: Some(entry.description.to_string()),
                category: entry.category.to_string(),
                price: entry.price,
                discounted_price: entry.discounted_price,
                product_type: Some(entry.product_type.to_string()),
                is_bundle: entry.is_bundle,
                is_featured: entry.is_featured,
                image_url: None,
                download_url: None,
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}
