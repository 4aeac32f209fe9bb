//! Fixed cuisine/category taxonomy and provider category mappings.
//!
//! The keyword provider reports a category group code plus a `>`-separated
//! Korean category path (e.g. `음식점 > 한식 > 육류,고기`). Mapping checks the
//! group code first, then walks an ordered keyword table over the path; the
//! first hit wins.

use serde::{Deserialize, Serialize};

/// Cafe category group code.
pub const CAFE_GROUP: &str = "CE7";
/// Restaurant category group code.
pub const FOOD_GROUP: &str = "FD6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Cafe,
    Chinese,
    Japanese,
    Western,
    Korean,
    Snack,
    Chicken,
    FastFood,
    MeatGrill,
    Bar,
    Other,
}

/// Ordered keyword table for restaurant category paths.
const PATH_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Chinese, &["중식"]),
    (Category::Japanese, &["일식"]),
    (Category::Western, &["양식"]),
    (Category::Korean, &["한식"]),
    (Category::Snack, &["분식"]),
    (Category::Chicken, &["치킨"]),
    (Category::FastFood, &["패스트푸드"]),
    (Category::MeatGrill, &["고기", "육류"]),
    (Category::Bar, &["술집", "포장마차", "바"]),
];

/// Rich provider primary types, matched by substring.
const PRIMARY_TYPES: &[(Category, &[&str])] = &[
    (Category::Cafe, &["cafe", "coffee"]),
    (Category::Chinese, &["chinese"]),
    (Category::Japanese, &["japanese", "sushi", "ramen"]),
    (Category::Korean, &["korean"]),
    (Category::Western, &["italian", "french", "american", "steak", "pizza"]),
    (Category::Chicken, &["chicken"]),
    (Category::FastFood, &["fast_food", "hamburger", "sandwich"]),
    (Category::MeatGrill, &["barbecue"]),
    (Category::Bar, &["bar", "pub", "wine"]),
];

impl Category {
    /// Label written to the record's `category` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cafe => "Cafe",
            Self::Chinese => "Chinese",
            Self::Japanese => "Japanese",
            Self::Western => "Western",
            Self::Korean => "Korean",
            Self::Snack => "Snack",
            Self::Chicken => "Chicken",
            Self::FastFood => "Fast Food",
            Self::MeatGrill => "Meat/Grill",
            Self::Bar => "Bar",
            Self::Other => "Other",
        }
    }

    /// Map a keyword-search category path and group code.
    pub fn from_keyword_category(category_name: &str, group_code: &str) -> Self {
        if group_code == CAFE_GROUP {
            return Self::Cafe;
        }
        if !group_code.is_empty() && group_code != FOOD_GROUP {
            return Self::Other;
        }
        PATH_KEYWORDS
            .iter()
            .find(|(_, keys)| keys.iter().any(|k| category_name.contains(k)))
            .map(|(cat, _)| *cat)
            .unwrap_or(Self::Other)
    }

    /// Map a rich-provider primary type such as `korean_restaurant`.
    pub fn from_primary_type(primary_type: &str) -> Option<Self> {
        let t = primary_type.to_ascii_lowercase();
        if t.is_empty() {
            return None;
        }
        let hit = PRIMARY_TYPES
            .iter()
            .find(|(_, keys)| keys.iter().any(|k| t.contains(k)))
            .map(|(cat, _)| *cat);
        Some(hit.unwrap_or(Self::Other))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cafe_group_wins_over_path() {
        assert_eq!(
            Category::from_keyword_category("음식점 > 한식", CAFE_GROUP),
            Category::Cafe
        );
    }

    #[test]
    fn non_food_group_is_other() {
        assert_eq!(
            Category::from_keyword_category("음식점 > 중식", "MT1"),
            Category::Other
        );
    }

    #[test]
    fn path_keywords_in_order() {
        assert_eq!(
            Category::from_keyword_category("음식점 > 중식 > 중국요리", FOOD_GROUP),
            Category::Chinese
        );
        assert_eq!(
            Category::from_keyword_category("음식점 > 일식 > 초밥,롤", FOOD_GROUP),
            Category::Japanese
        );
        // 한식 is checked before 육류 so Korean BBQ paths resolve to Korean.
        assert_eq!(
            Category::from_keyword_category("음식점 > 한식 > 육류,고기", FOOD_GROUP),
            Category::Korean
        );
        assert_eq!(
            Category::from_keyword_category("음식점 > 육류,고기", ""),
            Category::MeatGrill
        );
        assert_eq!(
            Category::from_keyword_category("음식점 > 술집 > 호프,요리주점", FOOD_GROUP),
            Category::Bar
        );
    }

    #[test]
    fn unknown_path_is_other() {
        assert_eq!(
            Category::from_keyword_category("음식점 > 뷔페", FOOD_GROUP),
            Category::Other
        );
        assert_eq!(Category::from_keyword_category("", ""), Category::Other);
    }

    #[test]
    fn primary_type_mapping() {
        assert_eq!(
            Category::from_primary_type("korean_restaurant"),
            Some(Category::Korean)
        );
        assert_eq!(Category::from_primary_type("coffee_shop"), Some(Category::Cafe));
        assert_eq!(Category::from_primary_type("museum"), Some(Category::Other));
        assert_eq!(Category::from_primary_type(""), None);
    }
}
