//! Column names shared by the cleaner and the aggregator.

pub const DATE: &str = "date";
pub const STORE: &str = "store";
pub const CATEGORY: &str = "category";
pub const PRODUCT: &str = "product";
pub const QUANTITY: &str = "quantity";
pub const UNIT_PRICE: &str = "unit_price";
pub const REVENUE: &str = "revenue";

pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const MONTH_NAME: &str = "month_name";
pub const DAY_OF_WEEK: &str = "day_of_week";
pub const CALCULATED_REVENUE: &str = "calculated_revenue";
pub const REVENUE_MISMATCH_FLAG: &str = "revenue_mismatch_flag";

/// Columns every input file must carry, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    DATE, STORE, CATEGORY, PRODUCT, QUANTITY, UNIT_PRICE, REVENUE,
];

/// Columns appended by the cleaner, in derivation order.
pub const DERIVED_COLUMNS: [&str; 6] = [
    YEAR,
    MONTH,
    MONTH_NAME,
    DAY_OF_WEEK,
    CALCULATED_REVENUE,
    REVENUE_MISMATCH_FLAG,
];

pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_column_name(" Unit_Price "), "unit_price");
        assert_eq!(normalize_column_name("DATE\t"), "date");
        assert_eq!(normalize_column_name("store"), "store");
    }
}
