use std::collections::HashMap;

use thiserror::Error;

/// Prefix under which the framework-resolved module pages live. Paths below
/// this prefix must never be user-visible; the gate redirects them to their
/// public alias.
pub const MODULE_PREFIX: &str = "/mods";

/// One line of the static internal<->public mapping. `record_pages` marks
/// modules that also expose `edit/:id` and `details/:id` record pages.
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub internal: &'static str,
    pub public: &'static str,
    pub record_pages: bool,
}

/// The full vanity-URL set. Public aliases are the Portuguese URLs shown in
/// the address bar; internal paths are the module pages that actually serve
/// them.
pub const ROUTE_ENTRIES: &[RouteEntry] = &[
    RouteEntry { internal: "/mods/home", public: "/home", record_pages: false },
    RouteEntry { internal: "/mods/visits/home", public: "/visitas", record_pages: true },
    RouteEntry { internal: "/mods/visits/agenda", public: "/agenda", record_pages: false },
    RouteEntry { internal: "/mods/visits/list", public: "/lista-de-visitas", record_pages: false },
    RouteEntry { internal: "/mods/visits/locations", public: "/locais-de-visitas", record_pages: true },
    RouteEntry { internal: "/mods/prescribers", public: "/prescritores", record_pages: true },
    RouteEntry { internal: "/mods/vehicles", public: "/veiculos", record_pages: true },
    RouteEntry { internal: "/mods/config", public: "/configuracoes", record_pages: false },
    RouteEntry { internal: "/mods/reports", public: "/relatorios", record_pages: false },
];

#[derive(Debug, Error, PartialEq)]
pub enum RouteTableError {
    #[error("duplicate internal path in route table: {0}")]
    DuplicateInternal(String),

    #[error("duplicate public alias in route table: {0}")]
    DuplicatePublic(String),

    #[error("internal path outside the module tree: {0}")]
    InternalOutsideModuleTree(String),

    #[error("public alias inside the module tree: {0}")]
    PublicInsideModuleTree(String),
}

/// Bidirectional lookup built once from [`ROUTE_ENTRIES`] at startup and
/// never mutated afterwards. Building both directions from a single literal
/// table keeps them from drifting apart.
#[derive(Debug)]
pub struct RouteTable {
    /// internal landing path -> public alias
    forward: HashMap<String, String>,
    /// public alias -> internal landing path
    reverse: HashMap<String, String>,
    /// (internal base, public base) pairs for modules with record pages
    record_bases: Vec<(String, String)>,
}

impl RouteTable {
    /// Build and validate the table. Internal paths must live under
    /// [`MODULE_PREFIX`] and public aliases must not; aliases that shadowed
    /// the module tree would make a second rewrite pass match again.
    pub fn new(entries: &[RouteEntry]) -> Result<Self, RouteTableError> {
        let mut forward = HashMap::new();
        let mut reverse = HashMap::new();
        let mut record_bases = Vec::new();

        for entry in entries {
            if !entry.internal.starts_with(MODULE_PREFIX) {
                return Err(RouteTableError::InternalOutsideModuleTree(entry.internal.into()));
            }
            if entry.public.starts_with(MODULE_PREFIX) {
                return Err(RouteTableError::PublicInsideModuleTree(entry.public.into()));
            }
            if forward
                .insert(entry.internal.to_string(), entry.public.to_string())
                .is_some()
            {
                return Err(RouteTableError::DuplicateInternal(entry.internal.into()));
            }
            if reverse
                .insert(entry.public.to_string(), entry.internal.to_string())
                .is_some()
            {
                return Err(RouteTableError::DuplicatePublic(entry.public.into()));
            }
            if entry.record_pages {
                // The landing page is conventionally named `home`; record
                // pages hang off the module directory above it.
                let base = entry
                    .internal
                    .strip_suffix("/home")
                    .unwrap_or(entry.internal);
                record_bases.push((base.to_string(), entry.public.to_string()));
            }
        }

        Ok(Self { forward, reverse, record_bases })
    }

    /// Default table from the literal entry set.
    pub fn standard() -> Result<Self, RouteTableError> {
        Self::new(ROUTE_ENTRIES)
    }

    /// Public alias to redirect an internal-path request to, if any.
    /// Dynamic record pages are checked before the static table; a trailing
    /// slash on a static match is tolerated.
    pub fn redirect_for_internal(&self, path: &str) -> Option<String> {
        for (base, public) in &self.record_bases {
            if let Some(rest) = path.strip_prefix(base.as_str()) {
                if let Some(id) = trailing_id(rest, "/edit/") {
                    return Some(format!("{}/editar/{}", public, id));
                }
                if let Some(id) = trailing_id(rest, "/details/") {
                    return Some(format!("{}/detalhes/{}", public, id));
                }
            }
        }

        let trimmed = trim_trailing_slash(path);
        self.forward.get(trimmed).cloned()
    }

    /// Internal path to serve a public alias from, if any. The visible URL is
    /// left untouched by callers; this only picks the handler path.
    pub fn rewrite_for_public(&self, path: &str) -> Option<String> {
        if let Some(internal) = self.reverse.get(path) {
            return Some(internal.clone());
        }

        for (base, public) in &self.record_bases {
            if let Some(rest) = path.strip_prefix(public.as_str()) {
                if let Some(id) = trailing_id(rest, "/editar/") {
                    return Some(format!("{}/edit/{}", base, id));
                }
                if let Some(id) = trailing_id(rest, "/detalhes/") {
                    return Some(format!("{}/details/{}", base, id));
                }
            }
        }

        None
    }
}

/// Extract the identifier from `rest` if it has exactly the shape
/// `<marker><single-segment>`. The identifier is opaque; a missing or
/// multi-segment remainder simply does not match.
fn trailing_id<'a>(rest: &'a str, marker: &str) -> Option<&'a str> {
    let id = rest.strip_prefix(marker)?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(id)
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_standard_table() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(
            table.redirect_for_internal("/mods/visits/home").as_deref(),
            Some("/visitas")
        );
        assert_eq!(
            table.rewrite_for_public("/visitas").as_deref(),
            Some("/mods/visits/home")
        );
    }

    #[test]
    fn static_redirect_tolerates_trailing_slash() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(
            table.redirect_for_internal("/mods/prescribers/").as_deref(),
            Some("/prescritores")
        );
    }

    #[test]
    fn dynamic_redirect_preserves_identifier() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(
            table
                .redirect_for_internal("/mods/visits/locations/edit/42")
                .as_deref(),
            Some("/locais-de-visitas/editar/42")
        );
        assert_eq!(
            table
                .redirect_for_internal("/mods/vehicles/details/ABC-1234")
                .as_deref(),
            Some("/veiculos/detalhes/ABC-1234")
        );
    }

    #[test]
    fn dynamic_rewrite_round_trips_identifier() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(
            table
                .rewrite_for_public("/locais-de-visitas/editar/42")
                .as_deref(),
            Some("/mods/visits/locations/edit/42")
        );
        assert_eq!(
            table.rewrite_for_public("/prescritores/detalhes/7").as_deref(),
            Some("/mods/prescribers/details/7")
        );
    }

    #[test]
    fn malformed_identifier_segments_do_not_match() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(table.redirect_for_internal("/mods/visits/edit/"), None);
        assert_eq!(table.redirect_for_internal("/mods/visits/edit/1/2"), None);
        assert_eq!(table.rewrite_for_public("/veiculos/editar/"), None);
    }

    #[test]
    fn rewrite_never_matches_internal_paths() {
        // An already-rewritten path must not match an alias rule again.
        let table = RouteTable::standard().unwrap();
        assert_eq!(table.rewrite_for_public("/mods/visits/home"), None);
        assert_eq!(table.rewrite_for_public("/mods/visits/agenda"), None);
    }

    #[test]
    fn rejects_duplicate_internal_path() {
        let entries = [
            RouteEntry { internal: "/mods/a", public: "/a", record_pages: false },
            RouteEntry { internal: "/mods/a", public: "/b", record_pages: false },
        ];
        assert_eq!(
            RouteTable::new(&entries).unwrap_err(),
            RouteTableError::DuplicateInternal("/mods/a".into())
        );
    }

    #[test]
    fn rejects_colliding_public_alias() {
        let entries = [
            RouteEntry { internal: "/mods/a", public: "/x", record_pages: false },
            RouteEntry { internal: "/mods/b", public: "/x", record_pages: false },
        ];
        assert_eq!(
            RouteTable::new(&entries).unwrap_err(),
            RouteTableError::DuplicatePublic("/x".into())
        );
    }

    #[test]
    fn rejects_alias_inside_module_tree() {
        let entries = [RouteEntry {
            internal: "/mods/a",
            public: "/mods/b",
            record_pages: false,
        }];
        assert_eq!(
            RouteTable::new(&entries).unwrap_err(),
            RouteTableError::PublicInsideModuleTree("/mods/b".into())
        );
    }
}
