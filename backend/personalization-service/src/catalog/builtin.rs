// Built-in content registry. Weights are set by catalog authors: higher for
// content that is intrinsically more urgent.

use super::ContentCatalog;
use crate::models::{
    Banner, BannerVariant, ContentAction, ContentCard, EligibilityCondition as Cond, Suggestion,
};
use std::collections::BTreeMap;

pub const CATALOG_VERSION: &str = "2025.10.1";
pub const DEFAULT_ROLE: &str = "customer";

fn card(
    id: &str,
    title: &str,
    description: &str,
    icon: &str,
    weight: f64,
    conditions: Cond,
) -> ContentCard {
    ContentCard {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        icon: Some(icon.to_string()),
        badge: None,
        action: None,
        conditions,
        base_weight: weight,
    }
}

fn with_action(mut card: ContentCard, label: &str, url: &str) -> ContentCard {
    card.action = Some(ContentAction::new(label, url));
    card
}

fn with_badge(mut card: ContentCard, badge: &str) -> ContentCard {
    card.badge = Some(badge.to_string());
    card
}

fn banner(
    id: &str,
    title: &str,
    message: &str,
    variant: BannerVariant,
    weight: f64,
    conditions: Cond,
) -> Banner {
    Banner {
        id: id.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        variant,
        action: None,
        conditions,
        weight,
    }
}

fn suggestion(
    id: &str,
    title: &str,
    description: &str,
    url: &str,
    category: &str,
    weight: f64,
    conditions: Cond,
) -> Suggestion {
    Suggestion {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        url: url.to_string(),
        category: category.to_string(),
        conditions,
        weight,
    }
}

fn customer_cards() -> Vec<ContentCard> {
    let role = || Cond::for_roles(&["customer"]);
    vec![
        with_badge(
            with_action(
                card(
                    "customer-order-tracking",
                    "Track your orders",
                    "Some of your orders are on the way or need your confirmation.",
                    "truck",
                    90.0,
                    role().with_pending_tasks(),
                ),
                "View orders",
                "/my-account/orders",
            ),
            "Action needed",
        ),
        card(
            "customer-welcome",
            "Welcome back",
            "Pick up where you left off or explore what is new today.",
            "hand-wave",
            80.0,
            role().with_first_visit(),
        ),
        with_action(
            card(
                "customer-getting-started",
                "Getting started",
                "Set up your address book and payment methods for faster checkout.",
                "compass",
                70.0,
                role().with_max_days_since_signup(14),
            ),
            "Start setup",
            "/my-account/setup",
        ),
        card(
            "customer-recommended-products",
            "Recommended for you",
            "Products picked from the categories you browse most.",
            "sparkles",
            50.0,
            role(),
        ),
        card(
            "customer-coupons",
            "Your coupons",
            "Check coupons that are about to expire.",
            "ticket",
            45.0,
            role(),
        ),
        card(
            "customer-wishlist",
            "Wishlist",
            "Items you saved for later.",
            "heart",
            40.0,
            role(),
        ),
        card(
            "customer-support",
            "Need help?",
            "Contact support or browse frequently asked questions.",
            "life-buoy",
            30.0,
            Cond::default(),
        ),
    ]
}

fn seller_cards() -> Vec<ContentCard> {
    let role = || Cond::for_roles(&["seller"]);
    vec![
        with_badge(
            with_action(
                card(
                    "seller-pending-orders",
                    "Orders waiting for you",
                    "New orders need to be confirmed and shipped.",
                    "package",
                    100.0,
                    role().with_pending_tasks(),
                ),
                "Process orders",
                "/seller/orders?status=pending",
            ),
            "Urgent",
        ),
        with_action(
            card(
                "seller-onboarding-guide",
                "Seller onboarding guide",
                "Finish your store profile and list your first products.",
                "map",
                85.0,
                role().with_max_days_since_signup(7),
            ),
            "Open guide",
            "/seller/onboarding",
        ),
        card(
            "seller-welcome",
            "Welcome to your store dashboard",
            "Here is a summary of what changed since your last visit.",
            "store",
            80.0,
            role().with_first_visit(),
        ),
        card(
            "seller-sales-summary",
            "Sales summary",
            "Revenue and order volume for the last 7 days.",
            "bar-chart",
            60.0,
            role(),
        ),
        card(
            "seller-product-management",
            "Manage products",
            "Update prices, stock and product details.",
            "boxes",
            55.0,
            role(),
        ),
        card(
            "seller-settlement",
            "Settlements",
            "Upcoming payouts and settlement history.",
            "wallet",
            50.0,
            role(),
        ),
        card(
            "seller-marketing-tools",
            "Marketing tools",
            "Coupons and promotions for your store.",
            "megaphone",
            35.0,
            role(),
        ),
    ]
}

fn supplier_cards() -> Vec<ContentCard> {
    let role = || Cond::for_roles(&["supplier"]);
    vec![
        with_badge(
            card(
                "supplier-pending-approvals",
                "Approval requests",
                "Sellers are waiting for approval to carry your products.",
                "clipboard-check",
                100.0,
                role().with_pending_tasks(),
            ),
            "Urgent",
        ),
        card(
            "supplier-inventory-alerts",
            "Inventory alerts",
            "Products running low on stock.",
            "alert-triangle",
            95.0,
            role().with_pending_tasks(),
        ),
        card(
            "supplier-onboarding",
            "Supplier onboarding",
            "Register your catalog and shipping policies.",
            "map",
            85.0,
            role().with_max_days_since_signup(14),
        ),
        card(
            "supplier-inventory-overview",
            "Inventory overview",
            "Stock levels across all products.",
            "warehouse",
            60.0,
            role(),
        ),
        card(
            "supplier-catalog-sync",
            "Catalog sync",
            "Push product updates to connected sellers.",
            "refresh-cw",
            50.0,
            role(),
        ),
        card(
            "supplier-partner-network",
            "Seller network",
            "Sellers currently carrying your products.",
            "network",
            45.0,
            role(),
        ),
    ]
}

fn partner_cards() -> Vec<ContentCard> {
    let role = || Cond::for_roles(&["partner"]);
    vec![
        card(
            "partner-pending-payouts",
            "Payout confirmation",
            "Confirm your payout account to receive pending commissions.",
            "banknote",
            95.0,
            role().with_pending_tasks(),
        ),
        card(
            "partner-onboarding",
            "Partner onboarding",
            "Learn how referral links and commissions work.",
            "map",
            80.0,
            role().with_max_days_since_signup(7),
        ),
        card(
            "partner-referral-links",
            "Referral links",
            "Create and share links to earn commission.",
            "link",
            60.0,
            role(),
        ),
        card(
            "partner-commission-report",
            "Commission report",
            "Clicks, conversions and earned commission.",
            "line-chart",
            55.0,
            role(),
        ),
        card(
            "partner-campaigns",
            "Active campaigns",
            "Campaigns with boosted commission rates.",
            "flag",
            40.0,
            role(),
        ),
    ]
}

fn common_banners() -> Vec<Banner> {
    vec![
        banner(
            "banner-maintenance-notice",
            "Scheduled maintenance",
            "Some services may be briefly unavailable during the maintenance window.",
            BannerVariant::Warning,
            90.0,
            Cond::default()
                .with_priority(10)
                .with_window("2025-10-28", "2025-11-01"),
        ),
        banner(
            "banner-welcome-first-visit",
            "Good to see you",
            "Take a quick tour of what changed since your last visit.",
            BannerVariant::Info,
            70.0,
            Cond::default().with_priority(5).with_first_visit(),
        ),
        banner(
            "banner-privacy-update",
            "Privacy policy update",
            "We updated how personalization data is handled. You can opt out at any time.",
            BannerVariant::Info,
            40.0,
            Cond::default().with_priority(1),
        ),
    ]
}

fn role_banners() -> BTreeMap<String, Vec<Banner>> {
    let mut banners = BTreeMap::new();
    banners.insert(
        "customer".to_string(),
        vec![banner(
            "banner-customer-free-shipping",
            "Free shipping week",
            "Orders over the threshold ship free this week.",
            BannerVariant::Promo,
            55.0,
            Cond::for_roles(&["customer"]).with_priority(3),
        )],
    );
    banners.insert(
        "seller".to_string(),
        vec![
            banner(
                "banner-seller-settlement-schedule",
                "Settlement schedule",
                "Settlements for this month are paid on the 15th.",
                BannerVariant::Info,
                60.0,
                Cond::for_roles(&["seller"]).with_priority(2),
            ),
            banner(
                "banner-seller-new-policy",
                "Updated seller policy",
                "Review the updated return and refund policy.",
                BannerVariant::Warning,
                50.0,
                Cond::for_roles(&["seller"])
                    .with_priority(4)
                    .with_window("2025-01-01", "2099-12-31"),
            ),
        ],
    );
    banners.insert(
        "supplier".to_string(),
        vec![banner(
            "banner-supplier-onboarding",
            "Finish supplier registration",
            "Complete registration to appear in the seller marketplace.",
            BannerVariant::Success,
            65.0,
            Cond::for_roles(&["supplier"]).with_max_days_since_signup(14),
        )],
    );
    banners.insert(
        "partner".to_string(),
        vec![banner(
            "banner-partner-commission-boost",
            "Commission boost",
            "Selected campaigns pay double commission this month.",
            BannerVariant::Promo,
            50.0,
            Cond::for_roles(&["partner"]),
        )],
    );
    banners
}

fn role_suggestions() -> BTreeMap<String, Vec<Suggestion>> {
    let mut suggestions = BTreeMap::new();
    suggestions.insert(
        "customer".to_string(),
        vec![
            suggestion(
                "suggestion-customer-review-orders",
                "Review delivered orders",
                "Share feedback on recent purchases.",
                "/my-account/reviews",
                "orders",
                70.0,
                Cond::default().with_pending_tasks(),
            ),
            suggestion(
                "suggestion-customer-complete-profile",
                "Complete your profile",
                "Add a shipping address to check out faster.",
                "/my-account/profile",
                "account",
                60.0,
                Cond::default().with_max_days_since_signup(7),
            ),
            suggestion(
                "suggestion-customer-browse-deals",
                "Today's deals",
                "Limited-time discounts across categories.",
                "/deals",
                "shopping",
                50.0,
                Cond::default(),
            ),
        ],
    );
    suggestions.insert(
        "seller".to_string(),
        vec![
            suggestion(
                "suggestion-seller-ship-orders",
                "Ship pending orders",
                "Print labels for confirmed orders.",
                "/seller/orders?status=confirmed",
                "orders",
                80.0,
                Cond::default().with_pending_tasks(),
            ),
            suggestion(
                "suggestion-seller-add-products",
                "Add your first products",
                "Import products from a supplier catalog.",
                "/seller/products/new",
                "products",
                70.0,
                Cond::default().with_max_days_since_signup(14),
            ),
            suggestion(
                "suggestion-seller-pricing-guide",
                "Pricing guide",
                "How margin and supplier prices are calculated.",
                "/help/seller/pricing",
                "help",
                30.0,
                Cond::default(),
            ),
        ],
    );
    suggestions.insert(
        "supplier".to_string(),
        vec![
            suggestion(
                "suggestion-supplier-sync-inventory",
                "Sync inventory",
                "Keep seller listings accurate.",
                "/supplier/inventory/sync",
                "inventory",
                50.0,
                Cond::default(),
            ),
            suggestion(
                "suggestion-supplier-find-sellers",
                "Find sellers",
                "Invite sellers to carry your products.",
                "/supplier/sellers",
                "network",
                40.0,
                Cond::default(),
            ),
        ],
    );
    suggestions.insert(
        "partner".to_string(),
        vec![
            suggestion(
                "suggestion-partner-share-links",
                "Share your links",
                "Post referral links on your channels.",
                "/partner/links",
                "growth",
                50.0,
                Cond::default(),
            ),
            suggestion(
                "suggestion-partner-payout-settings",
                "Payout settings",
                "Register the account commissions are paid to.",
                "/partner/settings/payout",
                "account",
                45.0,
                Cond::default().with_max_days_since_signup(30),
            ),
        ],
    );
    suggestions
}

fn common_suggestions() -> Vec<Suggestion> {
    vec![
        suggestion(
            "suggestion-help-center",
            "Help center",
            "Guides and answers to common questions.",
            "/help",
            "help",
            30.0,
            Cond::default(),
        ),
        suggestion(
            "suggestion-community-forum",
            "Community forum",
            "Ask questions and share tips with other members.",
            "/forum",
            "community",
            25.0,
            Cond::default(),
        ),
        suggestion(
            "suggestion-notification-settings",
            "Notification settings",
            "Choose which updates reach you.",
            "/my-account/notifications",
            "settings",
            20.0,
            Cond::default(),
        ),
    ]
}

fn default_card_ids() -> BTreeMap<String, Vec<String>> {
    let ids = |list: &[&str]| list.iter().map(|id| id.to_string()).collect::<Vec<_>>();

    let mut defaults = BTreeMap::new();
    defaults.insert(
        "customer".to_string(),
        ids(&[
            "customer-recommended-products",
            "customer-coupons",
            "customer-support",
        ]),
    );
    defaults.insert(
        "seller".to_string(),
        ids(&[
            "seller-sales-summary",
            "seller-product-management",
            "seller-settlement",
        ]),
    );
    defaults.insert(
        "supplier".to_string(),
        ids(&[
            "supplier-inventory-overview",
            "supplier-catalog-sync",
            "supplier-partner-network",
        ]),
    );
    defaults.insert(
        "partner".to_string(),
        ids(&["partner-referral-links", "partner-commission-report"]),
    );
    defaults
}

pub(super) fn catalog() -> ContentCatalog {
    let mut cards = BTreeMap::new();
    cards.insert("customer".to_string(), customer_cards());
    cards.insert("seller".to_string(), seller_cards());
    cards.insert("supplier".to_string(), supplier_cards());
    cards.insert("partner".to_string(), partner_cards());

    ContentCatalog {
        version: CATALOG_VERSION.to_string(),
        default_role: DEFAULT_ROLE.to_string(),
        cards,
        common_banners: common_banners(),
        role_banners: role_banners(),
        role_suggestions: role_suggestions(),
        common_suggestions: common_suggestions(),
        default_card_ids: default_card_ids(),
    }
}
