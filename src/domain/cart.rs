use super::menu::MenuItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One menu item plus a quantity of at least 1.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: MenuItem,
    pub quantity: u32,
}

/// Session-scoped, in-memory collection of cart lines.
///
/// Invariants after any operation sequence: at most one line per item id,
/// every quantity >= 1, and the total is always recomputed from the lines.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from externally supplied lines. Lines sharing an item
    /// id are merged by summing quantities, so the one-line-per-id
    /// invariant holds even for wire-supplied snapshots.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
        for line in lines {
            if let Some(existing) = merged.iter_mut().find(|l| l.item.id == line.item.id) {
                existing.quantity += line.quantity;
            } else {
                merged.push(line);
            }
        }
        Self { lines: merged }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one unit of `item`: increments the existing line, or appends a
    /// new line with quantity 1. Line order is preserved.
    pub fn add(&mut self, item: &MenuItem) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.item.id == item.id) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                item: item.clone(),
                quantity: 1,
            });
        }
    }

    /// Removes one unit of the item: decrements the line, or deletes it
    /// when the quantity would drop to 0. Absent ids are a no-op.
    pub fn remove(&mut self, item_id: u64) {
        if let Some(pos) = self.lines.iter().position(|line| line.item.id == item_id) {
            if self.lines[pos].quantity > 1 {
                self.lines[pos].quantity -= 1;
            } else {
                self.lines.remove(pos);
            }
        }
    }

    /// Sum of price x quantity over all lines; 0 for an empty cart.
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.item.price * Decimal::from(line.quantity))
            .sum()
    }

    /// Sum of quantities, used for the cart badge.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Consumes the cart into its frozen lines for an order snapshot.
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }
}
