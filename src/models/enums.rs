use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scent families the catalog is organized by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Floral,
    Amadeirado,
    #[serde(rename = "Cítrico")]
    Citrico,
    Doce,
    Fresco,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Floral,
        Category::Amadeirado,
        Category::Citrico,
        Category::Doce,
        Category::Fresco,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Floral => "Floral",
            Category::Amadeirado => "Amadeirado",
            Category::Citrico => "Cítrico",
            Category::Doce => "Doce",
            Category::Fresco => "Fresco",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "floral" => Ok(Category::Floral),
            "amadeirado" => Ok(Category::Amadeirado),
            "cítrico" | "citrico" => Ok(Category::Citrico),
            "doce" => Ok(Category::Doce),
            "fresco" => Ok(Category::Fresco),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

/// Candle sizes offered by the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleSize {
    Pequena,
    #[serde(rename = "Média")]
    Media,
    Grande,
}

impl CandleSize {
    pub fn label(&self) -> &'static str {
        match self {
            CandleSize::Pequena => "Pequena",
            CandleSize::Media => "Média",
            CandleSize::Grande => "Grande",
        }
    }
}

impl fmt::Display for CandleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for CandleSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pequena" => Ok(CandleSize::Pequena),
            "média" | "media" => Ok(CandleSize::Media),
            "grande" => Ok(CandleSize::Grande),
            _ => Err(format!("Invalid candle size: {}", s)),
        }
    }
}

/// Label of the catch-all category filter
pub const ALL_CATEGORIES_LABEL: &str = "Todos";

/// Category filter applied to the shop listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Every selectable filter label, in display order
    pub fn labels() -> Vec<String> {
        std::iter::once(ALL_CATEGORIES_LABEL.to_string())
            .chain(Category::ALL.iter().map(|c| c.label().to_string()))
            .collect()
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => *selected == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "{}", ALL_CATEGORIES_LABEL),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_CATEGORIES_LABEL) {
            return Ok(CategoryFilter::All);
        }
        s.parse::<Category>().map(CategoryFilter::Only)
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        filter.to_string()
    }
}

/// Pages of the storefront a visitor can be on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    #[default]
    Home,
    Shop,
    ProductDetail,
    Profile,
    About,
    Checkout,
    Shipping,
    Privacy,
    AdminInbox,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Home => write!(f, "home"),
            Page::Shop => write!(f, "shop"),
            Page::ProductDetail => write!(f, "product-detail"),
            Page::Profile => write!(f, "profile"),
            Page::About => write!(f, "about"),
            Page::Checkout => write!(f, "checkout"),
            Page::Shipping => write!(f, "shipping"),
            Page::Privacy => write!(f, "privacy"),
            Page::AdminInbox => write!(f, "admin-inbox"),
        }
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(Page::Home),
            "shop" => Ok(Page::Shop),
            "product-detail" => Ok(Page::ProductDetail),
            "profile" => Ok(Page::Profile),
            "about" => Ok(Page::About),
            "checkout" => Ok(Page::Checkout),
            "shipping" => Ok(Page::Shipping),
            "privacy" => Ok(Page::Privacy),
            "admin-inbox" => Ok(Page::AdminInbox),
            _ => Err(format!("Invalid page: {}", s)),
        }
    }
}
