//! Fixed item template schema
//!
//! Every manifest mapping and the created-manifest table share this schema.
//! Field order is significant: it is the column order of generated CSVs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A named column of the item template
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateField {
    ItemNumber,
    Upc,
    Description,
    CasePack,
    Cases,
    MardensCost,
    MardensPrice,
    CompRetail,
    Department,
    Category,
    SubCategory,
    Season,
    Notes,
}

impl TemplateField {
    /// All fields in template order
    pub const ALL: [TemplateField; 13] = [
        TemplateField::ItemNumber,
        TemplateField::Upc,
        TemplateField::Description,
        TemplateField::CasePack,
        TemplateField::Cases,
        TemplateField::MardensCost,
        TemplateField::MardensPrice,
        TemplateField::CompRetail,
        TemplateField::Department,
        TemplateField::Category,
        TemplateField::SubCategory,
        TemplateField::Season,
        TemplateField::Notes,
    ];

    /// Fields that must be mapped before a manifest is usable
    pub const REQUIRED: [TemplateField; 3] = [
        TemplateField::ItemNumber,
        TemplateField::Description,
        TemplateField::Department,
    ];

    /// Stable snake_case key, as stored in archives
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            TemplateField::ItemNumber => "item_number",
            TemplateField::Upc => "upc",
            TemplateField::Description => "description",
            TemplateField::CasePack => "case_pack",
            TemplateField::Cases => "cases",
            TemplateField::MardensCost => "mardens_cost",
            TemplateField::MardensPrice => "mardens_price",
            TemplateField::CompRetail => "comp_retail",
            TemplateField::Department => "department",
            TemplateField::Category => "category",
            TemplateField::SubCategory => "sub_category",
            TemplateField::Season => "season",
            TemplateField::Notes => "notes",
        }
    }

    /// Human label, also the header of generated CSV columns
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TemplateField::ItemNumber => "Item Number",
            TemplateField::Upc => "UPC",
            TemplateField::Description => "Description",
            TemplateField::CasePack => "Case Pack",
            TemplateField::Cases => "Cases",
            TemplateField::MardensCost => "Mardens Cost",
            TemplateField::MardensPrice => "Mardens Price",
            TemplateField::CompRetail => "Comp Retail",
            TemplateField::Department => "Department",
            TemplateField::Category => "Category",
            TemplateField::SubCategory => "Sub Category",
            TemplateField::Season => "Season",
            TemplateField::Notes => "Notes",
        }
    }

    #[inline]
    #[must_use]
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    /// Mapping where every field points at its own label
    ///
    /// A table authored in-app is already in template order, so its
    /// exported CSV maps onto the template one-to-one.
    #[must_use]
    pub fn identity_mapping() -> BTreeMap<TemplateField, String> {
        Self::ALL
            .iter()
            .map(|field| (*field, field.label().to_string()))
            .collect()
    }
}

impl Display for TemplateField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unknown template field key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown template field: '{0}'")]
pub struct UnknownFieldError(pub String);

impl FromStr for TemplateField {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.key() == s)
            .ok_or_else(|| UnknownFieldError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for field in TemplateField::ALL {
            assert_eq!(TemplateField::from_str(field.key()), Ok(field));
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = TemplateField::from_str("sku").unwrap_err();
        assert_eq!(err.to_string(), "unknown template field: 'sku'");
    }

    #[test]
    fn required_subset() {
        assert!(TemplateField::ItemNumber.is_required());
        assert!(TemplateField::Description.is_required());
        assert!(TemplateField::Department.is_required());
        assert!(!TemplateField::Upc.is_required());
    }

    #[test]
    fn identity_mapping_covers_every_field() {
        let mapping = TemplateField::identity_mapping();
        assert_eq!(mapping.len(), TemplateField::ALL.len());
        assert_eq!(mapping[&TemplateField::MardensCost], "Mardens Cost");
        assert_eq!(mapping[&TemplateField::Upc], "UPC");
    }

    #[test]
    fn serde_uses_snake_case_keys() {
        let json = serde_json::to_string(&TemplateField::SubCategory).unwrap();
        assert_eq!(json, "\"sub_category\"");
    }
}
