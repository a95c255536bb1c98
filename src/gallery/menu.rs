use serde::Serialize;

use super::model::{sort_years_desc, Flattened};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub value: String,
    pub label: String,
}

/// Dropdown entries for the location and year facets.
///
/// The "all" entry is part of the static page and is not listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterMenus {
    pub locations: Vec<MenuEntry>,
    pub years: Vec<MenuEntry>,
}

impl FilterMenus {
    pub fn from_flattened(flat: &Flattened) -> Self {
        Self::new(flat.locations.iter().cloned(), flat.years.iter().cloned())
    }

    /// Locations keep first-seen order; years are always sorted newest first.
    pub fn new(
        locations: impl IntoIterator<Item = String>,
        years: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut seen_locations: Vec<String> = Vec::new();
        for location in locations {
            if !seen_locations.contains(&location) {
                seen_locations.push(location);
            }
        }

        let mut seen_years: Vec<String> = Vec::new();
        for year in years {
            if !seen_years.contains(&year) {
                seen_years.push(year);
            }
        }
        sort_years_desc(&mut seen_years);

        Self {
            locations: seen_locations.into_iter().map(|v| MenuEntry { label: v.clone(), value: v }).collect(),
            years: seen_years.into_iter().map(|v| MenuEntry { label: v.clone(), value: v }).collect(),
        }
    }

    pub fn has_location(&self, value: &str) -> bool {
        self.locations.iter().any(|e| e.value == value)
    }

    pub fn has_year(&self, value: &str) -> bool {
        self.years.iter().any(|e| e.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_years_rendered_descending_regardless_of_input_order() {
        let menus = FilterMenus::new(
            Vec::<String>::new(),
            vec!["2021".to_string(), "2023".to_string(), "2022".to_string()],
        );
        let years: Vec<&str> = menus.years.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(years, vec!["2023", "2022", "2021"]);
    }

    #[test]
    fn test_locations_deduplicated_in_first_seen_order() {
        let menus = FilterMenus::new(
            ["Goa", "Ooty", "Goa", "Hampi"].map(String::from),
            Vec::<String>::new(),
        );
        let locations: Vec<&str> = menus.locations.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(locations, vec!["Goa", "Ooty", "Hampi"]);
        assert!(menus.has_location("Ooty"));
        assert!(!menus.has_location("all"));
    }
}
