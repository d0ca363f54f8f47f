//! Built-in tag table.

use super::{Domain, SpotCheck, TagConfig};

type Row = (&'static str, &'static str, &'static [&'static str]);

const SEO_CATEGORY: &str = "/v1/seo/category?categorySlug=trucks&langCode=en&countryCode=in";
const DEALERS_TATA: &str =
    "/v1/dealers?categorySlug=trucks&langCode=en&brandSlug=tata&citySlug=new-delhi&page=1&per-page=10";
const FAQ_CATEGORY: &str = "/v1/faqs?categorySlug=trucks&langCode=en&page=category";

const TABLE: &[(&str, &[Row])] = &[
    ("bank", &[("Bank - full list", "bank", &["/v1/bank/index", "/v1/bank/detail?slug=hdfc-bank"])]),
    (
        "banner",
        &[(
            "Banner - construction-equipments",
            "banner:construction-equipments",
            &["/v1/banners?_format=json&categorySlug=construction-equipments"],
        )],
    ),
    (
        "brand",
        &[
            (
                "Brand - trucks-tata",
                "brand:trucks-tata",
                &["/v1/brand/detail?langCode=en&categorySlug=trucks&slug=tata"],
            ),
            ("Brand - trucks (all)", "brand:trucks", &["/v1/brands?categorySlug=trucks&langCode=en"]),
            ("Brand - category-dealer", "brand-category-dealer:8-in", &["/v1/brands?categorySlug=trucks&langCode=en"]),
        ],
    ),
    (
        "category",
        &[
            ("Category - all", "category", &["/v1/categories?domain=91trucks.com"]),
            ("Category - trucks", "category:trucks", &["/v1/category/detail?langCode=en&slug=trucks"]),
            (
                "Category - domain 91trucks.com",
                "category-domain:91trucks.com",
                &["/v1/categories?domain=91trucks.com"],
            ),
        ],
    ),
    (
        "city",
        &[
            ("City - all", "city", &["/v1/cities?_format=json&langCode=en", "/v1/cities?is_popular=1"]),
            ("City - datia", "city:datia", &["/v1/city/detail?slug=datia&langCode=en"]),
            ("City - state 2", "city-state:2", &["/v1/city/cities-by-state?stateId=2"]),
            (
                "City - EV charging jaipur",
                "ev_charging_station:jaipur",
                &["/v1/city/electric-charging-station?slug=jaipur"],
            ),
        ],
    ),
    (
        "dealer",
        &[
            ("Dealer - category-brand-city trucks", "dealer-category-brand-city:trucks", &[DEALERS_TATA]),
            ("Dealer - brand-city trucks", "dealer-brand-city:trucks", &[DEALERS_TATA]),
            (
                "Dealer - city trucks-ashok-leyland",
                "dealer-city:trucks-ashok-leyland",
                &["/v1/dealers?categorySlug=trucks&langCode=en&brandSlug=ashok-leyland&citySlug=new-delhi&page=1&per-page=10"],
            ),
        ],
    ),
    (
        "faq",
        &[
            ("FAQ - category trucks", "faq-category:trucks", &[FAQ_CATEGORY]),
            ("FAQ - model 7-1178", "faq-model:7-1178", &[FAQ_CATEGORY]),
        ],
    ),
    (
        "seo",
        &[
            ("SEO - home 91infra.com", "seo-home:91infra.com", &[SEO_CATEGORY]),
            ("SEO - category trucks", "seo-category:trucks", &[SEO_CATEGORY]),
            ("SEO - variant trucks-ashok-leyland-dost-ls", "seo-variant:trucks-ashok-leyland-dost-ls", &[SEO_CATEGORY]),
            ("SEO - model 1510", "seo-model:1510", &[SEO_CATEGORY]),
            ("SEO - dealer trucks", "seo-dealer:trucks", &[SEO_CATEGORY]),
            ("SEO - static-page privacy-policy", "seo-static-page:91trucks.com-privacy-policy", &[SEO_CATEGORY]),
            ("SEO - filter", "seo-filter", &[SEO_CATEGORY]),
        ],
    ),
    (
        "news",
        &[
            ("News - wp_users 16", "news-wp_users-wp_usermeta:16", &[]),
            ("News - wp_postmeta CE 30", "news-wp_postmeta:construction-equipments-30", &[]),
            ("News - wp_posts ashok-leyland-saathi", "news-wp_posts:91trucks.com-ashok-leyland-saathi", &[]),
            ("News - wp_posts-wp_postmeta truck", "news-wp_posts-wp_postmeta:91trucks.com-truck", &[]),
        ],
    ),
    ("store", &[("Store - inventory all", "store-inventory:all", &[])]),
    ("navigation", &[("Navigation - site menu", "navigation", &["/v1/site/site-navigation-menu?slug=91trucks.com"])]),
    (
        "rating",
        &[(
            "Rating - types trucks",
            "rating",
            &["/v1/rating/types?categorySlug=trucks", "/v1/rating/index?&categorySlug=trucks&_format=json"],
        )],
    ),
    (
        "qna",
        &[(
            "QnA - category trucks",
            "qna",
            &["/v1/question/qna-by-category-and-search-keys?categorySlug=trucks&langCode=en&searchKey=trucks|model"],
        )],
    ),
    (
        "careers",
        &[(
            "Careers - departments",
            "careers",
            &["/v1/departments?_format=json", "/v1/department/role?_format=json&countryCode=in&departmentId=5"],
        )],
    ),
    ("auto-expo", &[("Auto-Expo - updates", "auto-expo", &["/v1/site/autoexpo-updates"])]),
    ("state", &[("State - list", "state", &["/v1/state/list?langCode=en", "/v1/state/ev-state-wise-unit-price"])]),
];

/// Spot-check candidates, in selection order.
const SPOT_CHECKS: &[(&str, &str, &str)] = &[
    ("bank", "/v1/bank/index", "Bank list"),
    ("category", "/v1/categories?domain=91trucks.com", "Category list"),
    ("brand", "/v1/brands?categorySlug=trucks&langCode=en&limit=0&countryCode=in", "Brand list"),
    ("city", "/v1/cities?is_popular=1&countryCode=in", "Popular cities"),
    (
        "banner",
        "/v1/banners?_format=json&categorySlug=construction-equipments&countryCode=in",
        "Banner construction",
    ),
    ("faq", "/v1/faqs?categorySlug=trucks&langCode=en&page=category&countryCode=in", "FAQ trucks"),
    ("navigation", "/v1/site/site-navigation-menu?slug=91trucks.com", "Navigation"),
];

pub(super) fn domains() -> Vec<Domain> {
    TABLE
        .iter()
        .map(|(name, rows)| Domain {
            name: (*name).to_string(),
            tags: rows
                .iter()
                .map(|(label, tag, endpoints)| TagConfig {
                    label: (*label).to_string(),
                    tag: (*tag).to_string(),
                    endpoints: endpoints.iter().map(|e| (*e).to_string()).collect(),
                })
                .collect(),
        })
        .collect()
}

pub(super) fn spot_checks() -> Vec<SpotCheck> {
    SPOT_CHECKS
        .iter()
        .map(|(domain, path, label)| SpotCheck {
            domain: (*domain).to_string(),
            path: (*path).to_string(),
            label: (*label).to_string(),
        })
        .collect()
}
