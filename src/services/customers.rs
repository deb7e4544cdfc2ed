//! Customer lookup.

use serde::{Deserialize, Serialize};

/// Wire shape: `{"FirstName": .., "LastName": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
}

pub trait CustomerRepository: Send + Sync + 'static {
    fn get(&self, id: i32) -> Customer;
}

/// Returns the same customer for every id.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeCustomerRepository;

impl CustomerRepository for FakeCustomerRepository {
    fn get(&self, _id: i32) -> Customer {
        Customer {
            first_name: "Marcin".to_string(),
            last_name: "Sulecki".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(FakeCustomerRepository.get(1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"FirstName": "Marcin", "LastName": "Sulecki"})
        );
    }
}
