//! Free-text filtering over the loaded owner tree. Pure and allocation-light;
//! runs on every keystroke of the dashboard search box.

use super::types::Owner;

/// Owners whose name, phone, or any pet's name contains `query`,
/// case-insensitively. An empty query matches everything. Input order is
/// preserved.
pub fn filter_owners<'a>(owners: &'a [Owner], query: &str) -> Vec<&'a Owner> {
    let query = query.to_lowercase();
    owners
        .iter()
        .filter(|owner| {
            owner.name.to_lowercase().contains(&query)
                || owner.phone.to_lowercase().contains(&query)
                || owner.pets.iter().any(|pet| pet.name.to_lowercase().contains(&query))
        })
        .collect()
}
