/// Session facts available to a permission check. The token is opaque at this
/// layer; nothing decodes or verifies claims from it yet, so policies key on
/// the path and on token presence alone.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: String,
}

/// Per-request permission predicate, keyed on the requested path and the
/// session context. Pluggable so a claims-aware policy can replace the
/// default without touching the gate.
pub trait PermissionPolicy: Send + Sync {
    fn allow(&self, path: &str, session: &SessionContext) -> bool;
}

/// Path-prefix policy: denies the configured prefixes, allows everything
/// else. With no denied prefixes this is the historical always-allow
/// behavior.
#[derive(Debug, Default)]
pub struct PrefixPolicy {
    denied_prefixes: Vec<String>,
}

impl PrefixPolicy {
    pub fn new(denied_prefixes: Vec<String>) -> Self {
        Self { denied_prefixes }
    }
}

impl PermissionPolicy for PrefixPolicy {
    fn allow(&self, path: &str, _session: &SessionContext) -> bool {
        !self.denied_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionContext {
        SessionContext { token: "tok".into() }
    }

    #[test]
    fn default_policy_allows_everything() {
        let policy = PrefixPolicy::default();
        assert!(policy.allow("/configuracoes", &session()));
        assert!(policy.allow("/visitas", &session()));
    }

    #[test]
    fn denied_prefix_blocks_subtree() {
        let policy = PrefixPolicy::new(vec!["/configuracoes".into()]);
        assert!(!policy.allow("/configuracoes", &session()));
        assert!(policy.allow("/visitas", &session()));
    }
}
