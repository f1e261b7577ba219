use crate::domain::error::ValidationError;
use crate::domain::transaction::Transaction;

#[derive(Debug, Clone)]
pub struct ChargeItem {
    pub transaction: Transaction,
    pub is_main_purchase: bool,
}

/// Line items of one purchase: the main item plus any cross-sales.
#[derive(Debug, Clone)]
pub struct ChargeBatch {
    items: Vec<ChargeItem>,
}

impl ChargeBatch {
    pub fn new(items: Vec<ChargeItem>) -> Result<Self, ValidationError> {
        let mains = items.iter().filter(|i| i.is_main_purchase).count();
        if mains > 1 {
            return Err(ValidationError::MultipleMainPurchases(mains));
        }
        Ok(Self { items })
    }

    pub fn main_purchase(&self) -> Option<&ChargeItem> {
        self.items.iter().find(|i| i.is_main_purchase)
    }

    pub fn cross_sales(&self) -> impl Iterator<Item = &ChargeItem> {
        self.items.iter().filter(|i| !i.is_main_purchase)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<ChargeItem> {
        self.items
    }
}
