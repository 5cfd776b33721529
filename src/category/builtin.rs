//! The fixed set of categories every user gets out of the box.

use super::domain::CategoryKind;

/// A category known at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltinCategory {
    /// The stable slug stored on transactions.
    pub id: &'static str,
    /// The display name.
    pub name: &'static str,
    /// The emoji shown next to the name.
    pub icon: &'static str,
    /// The Tailwind background class used for the category dot.
    pub color: &'static str,
    /// Whether the category is for expenses or income.
    pub kind: CategoryKind,
}

/// The icon used when a category id no longer resolves.
pub const DEFAULT_ICON: &str = "📦";
/// The color used when a category id no longer resolves.
pub const DEFAULT_COLOR: &str = "bg-gray-500";

/// The built-in expense categories.
pub const EXPENSE_CATEGORIES: [BuiltinCategory; 8] = [
    BuiltinCategory {
        id: "food",
        name: "Food",
        icon: "🍽️",
        color: "bg-red-500",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: "transport",
        name: "Transport",
        icon: "🚗",
        color: "bg-blue-500",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: "entertainment",
        name: "Entertainment",
        icon: "🎬",
        color: "bg-purple-500",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: "bills",
        name: "Bills",
        icon: "📄",
        color: "bg-yellow-500",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: "rent",
        name: "Rent Expense",
        icon: "🏠",
        color: "bg-teal-500",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: "shopping",
        name: "Shopping",
        icon: "🛍️",
        color: "bg-pink-500",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: "health",
        name: "Health",
        icon: "🏥",
        color: "bg-green-500",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: "other",
        name: "Other Expense",
        icon: "📦",
        color: "bg-gray-500",
        kind: CategoryKind::Expense,
    },
];

/// The built-in income categories.
pub const INCOME_CATEGORIES: [BuiltinCategory; 4] = [
    BuiltinCategory {
        id: "salary",
        name: "Salary",
        icon: "💼",
        color: "bg-emerald-500",
        kind: CategoryKind::Income,
    },
    BuiltinCategory {
        id: "rent-income",
        name: "Rent Income",
        icon: "🏠",
        color: "bg-blue-500",
        kind: CategoryKind::Income,
    },
    BuiltinCategory {
        id: "investment",
        name: "Investment",
        icon: "📈",
        color: "bg-green-500",
        kind: CategoryKind::Income,
    },
    BuiltinCategory {
        id: "other-income",
        name: "Other Income",
        icon: "💰",
        color: "bg-yellow-500",
        kind: CategoryKind::Income,
    },
];

/// Look up a built-in category by its slug.
pub fn find_builtin(id: &str) -> Option<&'static BuiltinCategory> {
    EXPENSE_CATEGORIES
        .iter()
        .chain(INCOME_CATEGORIES.iter())
        .find(|category| category.id == id)
}
