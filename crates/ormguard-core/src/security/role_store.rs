//! Persistent role storage.
//!
//! Persists resource and row-level roles using sled. Row-level predicate
//! policies cannot be serialized and are rejected on write.

use super::error::{SecurityError, SecurityResult};
use super::roles::{validate_code, ResourceRole, RoleRepository, RowLevelRole};
use serde::de::DeserializeOwned;
use serde::Serialize;

const ROLE_TREE_NAME: &[u8] = b"security:roles";
const RESOURCE_PREFIX: &[u8] = b"resource:";
const ROW_LEVEL_PREFIX: &[u8] = b"row_level:";

/// Role store for persisting role definitions.
pub struct SledRoleStore {
    tree: sled::Tree,
}

impl SledRoleStore {
    /// Open the role store.
    pub fn open(db: &sled::Db) -> SecurityResult<Self> {
        let tree = db.open_tree(ROLE_TREE_NAME)?;
        Ok(Self { tree })
    }

    /// Get a resource role by code.
    pub fn get_resource_role(&self, code: &str) -> SecurityResult<Option<ResourceRole>> {
        self.get(RESOURCE_PREFIX, code)
    }

    /// Get a row-level role by code.
    pub fn get_row_level_role(&self, code: &str) -> SecurityResult<Option<RowLevelRole>> {
        self.get(ROW_LEVEL_PREFIX, code)
    }

    /// Save a resource role.
    pub fn put_resource_role(&self, role: &ResourceRole) -> SecurityResult<()> {
        validate_code(&role.code)?;
        self.put(RESOURCE_PREFIX, &role.code, role)
    }

    /// Save a row-level role.
    pub fn put_row_level_role(&self, role: &RowLevelRole) -> SecurityResult<()> {
        validate_code(&role.code)?;
        if role.policies.iter().any(|p| !p.is_jpql()) {
            return Err(SecurityError::InvalidRole(format!(
                "role '{}' contains predicate policies, which cannot be persisted",
                role.code
            )));
        }
        self.put(ROW_LEVEL_PREFIX, &role.code, role)
    }

    /// Remove a resource role.
    pub fn remove_resource_role(&self, code: &str) -> SecurityResult<bool> {
        let removed = self.tree.remove(Self::key(RESOURCE_PREFIX, code))?;
        Ok(removed.is_some())
    }

    /// Remove a row-level role.
    pub fn remove_row_level_role(&self, code: &str) -> SecurityResult<bool> {
        let removed = self.tree.remove(Self::key(ROW_LEVEL_PREFIX, code))?;
        Ok(removed.is_some())
    }

    /// List all resource roles.
    pub fn list_resource_roles(&self) -> SecurityResult<Vec<ResourceRole>> {
        self.list(RESOURCE_PREFIX)
    }

    /// List all row-level roles.
    pub fn list_row_level_roles(&self) -> SecurityResult<Vec<RowLevelRole>> {
        self.list(ROW_LEVEL_PREFIX)
    }

    /// Clear all roles.
    pub fn clear(&self) -> SecurityResult<()> {
        self.tree.clear()?;
        Ok(())
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> SecurityResult<()> {
        self.tree.flush()?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, prefix: &[u8], code: &str) -> SecurityResult<Option<T>> {
        match self.tree.get(Self::key(prefix, code))? {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, prefix: &[u8], code: &str, role: &T) -> SecurityResult<()> {
        let value = Self::serialize(role)?;
        self.tree.insert(Self::key(prefix, code), value)?;
        Ok(())
    }

    fn list<T: DeserializeOwned>(&self, prefix: &[u8]) -> SecurityResult<Vec<T>> {
        let mut roles = Vec::new();
        for result in self.tree.scan_prefix(prefix) {
            let (_, value) = result?;
            roles.push(Self::deserialize(&value)?);
        }
        Ok(roles)
    }

    fn key(prefix: &[u8], code: &str) -> Vec<u8> {
        let mut key = prefix.to_vec();
        key.extend_from_slice(code.as_bytes());
        key
    }

    fn serialize<T: Serialize>(role: &T) -> SecurityResult<Vec<u8>> {
        serde_json::to_vec(role)
            .map_err(|e| SecurityError::PolicySerialization(format!("serialization error: {}", e)))
    }

    fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> SecurityResult<T> {
        serde_json::from_slice(bytes).map_err(|e| {
            SecurityError::PolicySerialization(format!("deserialization error: {}", e))
        })
    }
}

impl RoleRepository for SledRoleStore {
    fn resource_role(&self, code: &str) -> SecurityResult<Option<ResourceRole>> {
        self.get_resource_role(code)
    }

    fn row_level_role(&self, code: &str) -> SecurityResult<Option<RowLevelRole>> {
        self.get_row_level_role(code)
    }
}
