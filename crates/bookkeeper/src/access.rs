//! Permission gate: role membership and owner-delegated consent

use crate::error::{LedgerError, Permission, Result};
use crate::state::LedgerState;
use crate::types::{Address, Role};

impl LedgerState {
    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.get(&role).map_or(false, |members| members.contains(account))
    }

    pub fn require_role(&self, role: Role, caller: &Address) -> Result<()> {
        if self.has_role(role, caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(Permission::Role(role)))
        }
    }

    pub fn require_any_role(&self, a: Role, b: Role, caller: &Address) -> Result<()> {
        if self.has_role(a, caller) || self.has_role(b, caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(Permission::AnyOf(a, b)))
        }
    }

    /// True iff `caller` is `principal` or was whitelisted by it
    pub fn wish(&self, principal: &Address, caller: &Address) -> bool {
        principal == caller || self.consents.contains(&(*principal, *caller))
    }

    pub fn require_consent(&self, principal: &Address, caller: &Address) -> Result<()> {
        if self.wish(principal, caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(Permission::Consent(*principal)))
        }
    }

    /// Returns false if the account already held the role
    pub(crate) fn insert_role(&mut self, role: Role, account: Address) -> bool {
        self.roles.entry(role).or_default().insert(account)
    }

    /// Returns false if the account did not hold the role
    pub(crate) fn remove_role(&mut self, role: Role, account: &Address) -> bool {
        let Some(members) = self.roles.get_mut(&role) else {
            return false;
        };
        let removed = members.remove(account);
        if members.is_empty() {
            self.roles.remove(&role);
        }
        removed
    }
}
