use std::collections::HashMap;

use async_trait::async_trait;

use super::repository::RepositoryError;
use crate::models::EmployeeProfile;

/// Lookup of employee-specific tax overrides, owned by the HR layer.
#[async_trait]
pub trait EmployeeProfiles: Send + Sync {
    /// `Ok(None)` when the employee has no stored profile.
    async fn profile(&self, employee_id: &str) -> Result<Option<EmployeeProfile>, RepositoryError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryEmployeeProfiles {
    profiles: HashMap<String, EmployeeProfile>,
}

impl InMemoryEmployeeProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(
        mut self,
        employee_id: impl Into<String>,
        profile: EmployeeProfile,
    ) -> Self {
        self.profiles.insert(employee_id.into(), profile);
        self
    }
}

#[async_trait]
impl EmployeeProfiles for InMemoryEmployeeProfiles {
    async fn profile(&self, employee_id: &str) -> Result<Option<EmployeeProfile>, RepositoryError> {
        Ok(self.profiles.get(employee_id).cloned())
    }
}
