//! Core category domain types and the resolution fallback logic.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

use super::{
    builtin::{DEFAULT_COLOR, DEFAULT_ICON, find_builtin},
    db::CustomCategory,
};

/// Whether a category (and the transactions in it) counts as money spent or
/// money earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Money spent.
    Expense,
    /// Money earned.
    Income,
}

impl CategoryKind {
    /// The string stored in the database and used in form values.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(Error::InvalidCategory(other.to_string())),
        }
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The display form of a category after resolving a transaction's stored
/// category id.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCategory {
    /// The id the transaction stored.
    pub id: String,
    /// The display name, or the raw id when resolution failed.
    pub name: String,
    /// The icon, or [DEFAULT_ICON] when resolution failed.
    pub icon: String,
    /// The color class, or [DEFAULT_COLOR] when resolution failed.
    pub color: String,
}

/// Resolve a transaction's stored category id to its display form.
///
/// Built-in categories are matched by slug first, then custom categories by
/// their decimal row id. An id that matches neither falls back to the raw
/// id with a default icon and color; the computation never fails, so a
/// transaction left orphaned by a deleted category still renders.
pub fn resolve_category(category_id: &str, custom: &[CustomCategory]) -> ResolvedCategory {
    if let Some(builtin) = find_builtin(category_id) {
        return ResolvedCategory {
            id: category_id.to_string(),
            name: builtin.name.to_string(),
            icon: builtin.icon.to_string(),
            color: builtin.color.to_string(),
        };
    }

    let custom_match = category_id
        .parse::<i64>()
        .ok()
        .and_then(|id| custom.iter().find(|category| category.id == id));

    match custom_match {
        Some(category) => ResolvedCategory {
            id: category_id.to_string(),
            name: category.name.to_string(),
            icon: category.icon.clone(),
            // Custom categories have no configurable color.
            color: "bg-gray-400".to_string(),
        },
        None => ResolvedCategory {
            id: category_id.to_string(),
            name: category_id.to_string(),
            icon: DEFAULT_ICON.to_string(),
            color: DEFAULT_COLOR.to_string(),
        },
    }
}

#[cfg(test)]
mod category_kind_tests {
    use std::str::FromStr;

    use crate::Error;

    use super::CategoryKind;

    #[test]
    fn round_trips_through_string() {
        assert_eq!(
            CategoryKind::from_str(CategoryKind::Expense.as_str()),
            Ok(CategoryKind::Expense)
        );
        assert_eq!(
            CategoryKind::from_str(CategoryKind::Income.as_str()),
            Ok(CategoryKind::Income)
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        assert_eq!(
            CategoryKind::from_str("transfer"),
            Err(Error::InvalidCategory("transfer".to_string()))
        );
    }
}

#[cfg(test)]
mod category_name_tests {
    use crate::Error;

    use super::CategoryName;

    #[test]
    fn new_fails_on_empty_string() {
        let name = CategoryName::new("");

        assert_eq!(name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let name = CategoryName::new("\n\t \r");

        assert_eq!(name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let name = CategoryName::new("Momo");

        assert!(name.is_ok())
    }
}

#[cfg(test)]
mod resolve_category_tests {
    use time::OffsetDateTime;

    use crate::{
        auth::UserID,
        category::{CategoryKind, CategoryName, CustomCategory, DEFAULT_COLOR, DEFAULT_ICON},
    };

    use super::resolve_category;

    fn custom_categories() -> Vec<CustomCategory> {
        vec![CustomCategory {
            id: 42,
            name: CategoryName::new_unchecked("Momo"),
            icon: "🥟".to_string(),
            kind: CategoryKind::Expense,
            user_id: UserID::new(1),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }]
    }

    #[test]
    fn resolves_builtin_by_slug() {
        let resolved = resolve_category("food", &custom_categories());

        assert_eq!(resolved.name, "Food");
        assert_eq!(resolved.icon, "🍽️");
    }

    #[test]
    fn resolves_custom_by_row_id() {
        let resolved = resolve_category("42", &custom_categories());

        assert_eq!(resolved.name, "Momo");
        assert_eq!(resolved.icon, "🥟");
    }

    #[test]
    fn falls_back_to_raw_id() {
        let resolved = resolve_category("no-longer-exists", &custom_categories());

        assert_eq!(resolved.name, "no-longer-exists");
        assert_eq!(resolved.icon, DEFAULT_ICON);
        assert_eq!(resolved.color, DEFAULT_COLOR);
    }

    #[test]
    fn deleted_custom_category_falls_back_to_raw_id() {
        let resolved = resolve_category("43", &custom_categories());

        assert_eq!(resolved.name, "43");
        assert_eq!(resolved.icon, DEFAULT_ICON);
    }
}
