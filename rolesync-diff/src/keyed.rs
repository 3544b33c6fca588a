//! Identity keys for set-valued relationship items.

/// An item that can be reduced to a comparable identity key.
///
/// Two items with equal keys are the same member of a relationship, even if
/// their other fields differ. Keys should be tuples or structs of owned
/// fields rather than delimited strings: `("A|B", "C")` and `("A", "B|C")`
/// must stay distinct.
pub trait KeyedItem {
    /// The identity key type.
    type Key: Ord + Clone;

    /// Returns this item's identity key.
    fn key(&self) -> Self::Key;
}

impl KeyedItem for String {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.clone()
    }
}
