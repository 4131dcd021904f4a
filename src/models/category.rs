use serde::{Deserialize, Serialize};

use super::TxnKind;
use crate::error::LedgerError;

/// Fallback category. Always present, never removable.
pub const OTHER: &str = "Other";

/// Savings destinations. Users cannot remove these.
pub const SAVINGS_DESTINATIONS: &[&str] = &["Savings", "Emergency Fund", "Investments"];

pub const INCOME_MENU: &[&str] = &["Salary", "Freelance", "Gift", OTHER];

pub const DEBT_MENU: &[&str] = &["Loan", "Credit Card", "Friends & Family"];

const MAX_NAME_LEN: usize = 32;

const DEFAULT_EXPENSE_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Food",
        &["lunch", "dinner", "breakfast", "cafe", "restaurant", "coffee", "pizza", "burger", "snack"],
    ),
    ("Groceries", &["grocery", "groceries", "supermarket", "market", "milk", "bread"]),
    ("Transport", &["taxi", "uber", "bus", "metro", "fuel", "gas", "train", "parking"]),
    ("Housing", &["rent", "mortgage", "apartment"]),
    ("Utilities", &["electricity", "water", "internet", "phone", "utility", "utilities"]),
    ("Health", &["pharmacy", "doctor", "medicine", "dentist", "hospital", "gym"]),
    ("Entertainment", &["cinema", "movie", "concert", "game", "netflix", "spotify", "party"]),
    ("Shopping", &["clothes", "shoes", "shop", "amazon", "gift"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            name,
            keywords: Vec::new(),
        }
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Whether `name` is `Other` or a savings destination.
pub fn is_protected(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    lower == OTHER.to_lowercase()
        || SAVINGS_DESTINATIONS
            .iter()
            .any(|s| s.to_lowercase() == lower)
}

/// Fixed button menu for kinds whose category is chosen, not guessed.
/// Returns `None` for expenses, whose menu comes from the user's table.
pub fn fixed_menu(kind: TxnKind) -> Option<&'static [&'static str]> {
    match kind {
        TxnKind::Income => Some(INCOME_MENU),
        TxnKind::Savings | TxnKind::SavingsWithdraw => Some(SAVINGS_DESTINATIONS),
        TxnKind::Debt | TxnKind::DebtReturn => Some(DEBT_MENU),
        TxnKind::Expense => None,
    }
}

/// Per-user category name to keyword list. Order is significant: the
/// classifier takes the first category with a keyword hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        let mut categories: Vec<Category> = DEFAULT_EXPENSE_CATEGORIES
            .iter()
            .map(|(name, keywords)| Category {
                name: (*name).to_string(),
                keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            })
            .collect();
        categories.extend(SAVINGS_DESTINATIONS.iter().map(|s| Category::new((*s).to_string())));
        categories.push(Category::new(OTHER.to_string()));
        Self { categories }
    }
}

impl CategoryTable {
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn find(&self, name: &str) -> Option<&Category> {
        Category::find_by_name(&self.categories, name.trim())
    }

    /// Restore the invariants after loading from storage: `Other` is last
    /// and every savings destination exists.
    pub fn normalize(&mut self) {
        for dest in SAVINGS_DESTINATIONS {
            if self.find(dest).is_none() {
                self.insert_before_other(Category::new((*dest).to_string()));
            }
        }
        let lower = OTHER.to_lowercase();
        self.categories.retain(|c| c.name.to_lowercase() != lower);
        self.categories.push(Category::new(OTHER.to_string()));
    }

    /// Add a category, or merge keywords into an existing one.
    /// Returns true when a new category was created.
    pub fn add(&mut self, name: &str, keywords: &[String]) -> Result<bool, LedgerError> {
        let name = validate_name(name)?;
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let lower = name.to_lowercase();
        if let Some(existing) = self
            .categories
            .iter_mut()
            .find(|c| c.name.to_lowercase() == lower)
        {
            if keywords.is_empty() {
                return Err(LedgerError::DuplicateCategory(existing.name.clone()));
            }
            // `Other` is the fallback and never matches by keyword.
            if existing.name == OTHER {
                return Err(LedgerError::ProtectedCategory(OTHER.to_string()));
            }
            for k in keywords {
                if !existing.keywords.contains(&k) {
                    existing.keywords.push(k);
                }
            }
            return Ok(false);
        }

        let mut deduped: Vec<String> = Vec::new();
        for k in keywords {
            if !deduped.contains(&k) {
                deduped.push(k);
            }
        }
        self.insert_before_other(Category {
            name: name.to_string(),
            keywords: deduped,
        });
        Ok(true)
    }

    /// Make sure a confirmed category name exists in the table.
    pub fn ensure(&mut self, name: &str) -> Result<bool, LedgerError> {
        if self.find(name).is_some() {
            return Ok(false);
        }
        self.add(name, &[])
    }

    pub fn remove(&mut self, name: &str) -> Result<Category, LedgerError> {
        if is_protected(name) {
            return Err(LedgerError::ProtectedCategory(name.trim().to_string()));
        }
        let lower = name.trim().to_lowercase();
        let idx = self
            .categories
            .iter()
            .position(|c| c.name.to_lowercase() == lower)
            .ok_or_else(|| LedgerError::UnknownCategory(name.trim().to_string()))?;
        Ok(self.categories.remove(idx))
    }

    fn insert_before_other(&mut self, category: Category) {
        let idx = self
            .categories
            .iter()
            .position(|c| c.name == OTHER)
            .unwrap_or(self.categories.len());
        self.categories.insert(idx, category);
    }
}

fn validate_name(name: &str) -> Result<&str, LedgerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::InvalidCategoryName(trimmed.to_string()));
    }
    Ok(trimmed)
}
