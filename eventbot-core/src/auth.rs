//! Role-based authorisation for mutating commands.

use crate::error::{CommandError, CommandResult};

/// Whoever sent a command, with the roles the chat platform reports for them.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub name: String,
    pub roles: Vec<String>,
}

impl Caller {
    pub fn new(name: impl Into<String>, roles: Vec<String>) -> Self {
        Caller {
            name: name.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Gate that runs a handler only for callers holding `role`.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    role: String,
}

impl RoleGuard {
    pub fn new(role: impl Into<String>) -> Self {
        RoleGuard { role: role.into() }
    }

    pub fn check(&self, caller: &Caller) -> CommandResult<()> {
        if caller.has_role(&self.role) {
            return Ok(());
        }

        tracing::warn!("{} lacks the '{}' role", caller.name, self.role);
        Err(CommandError::Unauthorized {
            role: self.role.clone(),
        })
    }

    /// Run `handler` if the caller is authorised, else fail with `Unauthorized`.
    pub fn guard<T>(
        &self,
        caller: &Caller,
        handler: impl FnOnce() -> CommandResult<T>,
    ) -> CommandResult<T> {
        self.check(caller)?;
        handler()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_runs_handler_for_role_holder() {
        let guard = RoleGuard::new("Events Manager");
        let caller = Caller::new("ana", vec!["Events Manager".to_string()]);

        assert_eq!(guard.guard(&caller, || Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_guard_skips_handler_without_role() {
        let guard = RoleGuard::new("Events Manager");
        let caller = Caller::new("bo", vec!["Member".to_string()]);
        let mut ran = false;

        let result = guard.guard(&caller, || {
            ran = true;
            Ok(())
        });

        assert!(!ran);
        match result {
            Err(CommandError::Unauthorized { role }) => assert_eq!(role, "Events Manager"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }
}
