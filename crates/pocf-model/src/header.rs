//! Purchase order header fields

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Freight-on-board arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FobType {
    #[default]
    Pickup,
    Delivered,
}

/// Header of the purchase order being edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderHeader {
    /// Sequential PO number for this buyer
    pub po_number: u32,
    /// Buyer identifier
    pub buyer_id: String,
    /// Vendor display name
    pub vendor_name: String,
    /// Order (creation) date
    pub order_date: NaiveDate,
    /// Expected ship / delivery date
    pub ship_date: Option<NaiveDate>,
    /// Cancel-if-not-shipped-by date
    pub cancel_date: Option<NaiveDate>,
    pub description: String,
    pub terms: String,
    pub ship_to_address: String,
    pub notes: String,
    pub shipping_notes: String,
    pub fob_type: FobType,
    pub fob_point: String,
}

impl PurchaseOrderHeader {
    /// Create a header for a new order dated `order_date`
    #[must_use]
    pub fn new(order_date: NaiveDate) -> Self {
        Self {
            po_number: 1,
            buyer_id: "01".to_string(),
            vendor_name: String::new(),
            order_date,
            ship_date: None,
            cancel_date: None,
            description: String::new(),
            terms: String::new(),
            ship_to_address: String::new(),
            notes: String::new(),
            shipping_notes: String::new(),
            fob_type: FobType::default(),
            fob_point: String::new(),
        }
    }

    /// With PO number
    #[inline]
    #[must_use]
    pub fn with_po_number(mut self, po_number: u32) -> Self {
        self.po_number = po_number;
        self
    }

    /// With buyer id
    #[inline]
    #[must_use]
    pub fn with_buyer_id(mut self, buyer_id: impl Into<String>) -> Self {
        self.buyer_id = buyer_id.into();
        self
    }

    /// With vendor
    #[inline]
    #[must_use]
    pub fn with_vendor(mut self, vendor_name: impl Into<String>) -> Self {
        self.vendor_name = vendor_name.into();
        self
    }

    /// Display form of the PO number: buyer id padded to two digits
    /// followed by the number padded to four (`07` + `0042`).
    #[must_use]
    pub fn formatted_po_number(&self) -> String {
        format!("{:0>2}{:04}", self.buyer_id, self.po_number)
    }
}

impl Default for PurchaseOrderHeader {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}
