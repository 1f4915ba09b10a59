//! The Registry (§4.1): discovery, indexing and name resolution of
//! exposable members.
//!
//! Rust has no object-container framework walking a live object graph, so
//! "scan" here is not a single reflective pass — it is the sum of explicit
//! `register_container` calls, one per container instance, made by
//! generated code (`exposer-macros`) at process start. Each call is the
//! Rust analogue of §4.1 steps 2–6 for a single container: the macro
//! already collected the container's own `#[expose_impl]`/`#[derive(Exposed)]`
//! members at compile time (there is no supertype chain to walk — see
//! SPEC_FULL.md's "Rust-specific adaptations" section), so `register_container`
//! only needs to perform the insertion and aliasing steps.
//!
//! Once [`Registry::freeze`] is called the maps are read-only: all
//! `resolve` calls thereafter take no locks (§5 "Shared state & mutation
//! discipline").

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;

use crate::error::DispatchError;
use crate::member::{ExposableMember, MemberKind};

/// A successful lookup result (§4.1 "Lookup").
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A single, unambiguous member.
    Found(ExposableMember),
    /// More than one CALLABLE overload matched a base-name-only lookup.
    /// The dispatcher performs shape-based narrowing on this set (§4.2).
    Ambiguous(Vec<ExposableMember>),
}

/// One container's compile-time-collected members, ready for registration.
///
/// Produced by `exposer-macros`-generated code; not constructed by hand in
/// application code.
pub struct ContainerDescriptor {
    pub container_name: &'static str,
    pub members: Vec<ExposableMember>,
    /// Names of user-defined traits ("interfaces", §3) this container
    /// implements, for which alias entries should be created.
    pub aliases: Vec<&'static str>,
}

/// Reserved prefixes that may never be used as alias (interface) names
/// (§3 invariant 5 — "platform abstract types").
const RESERVED_ALIAS_PREFIXES: &[&str] = &["std::", "core::", "alloc::", "exposer_core::", "exposer::"];

fn is_reserved_alias(name: &str) -> bool {
    RESERVED_ALIAS_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// The registry itself (§3, §4.1).
pub struct Registry {
    canonical: DashMap<String, ExposableMember>,
    canonical_by_base_name: DashMap<String, Vec<String>>,
    aliases: DashMap<String, ExposableMember>,
    aliases_by_base_name: DashMap<String, Vec<String>>,
    /// Scan order, used for introspection ordering (§5 "Ordering guarantees")
    /// and as the tie-break for alias installation (§4.1 step 6).
    scan_order: Mutex<Vec<String>>,
    frozen: AtomicBool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            canonical: DashMap::new(),
            canonical_by_base_name: DashMap::new(),
            aliases: DashMap::new(),
            aliases_by_base_name: DashMap::new(),
            scan_order: Mutex::new(Vec::new()),
            frozen: AtomicBool::new(false),
        }
    }

    /// Register one container's members (§4.1 steps 4–6).
    ///
    /// # Panics
    ///
    /// Panics if called after [`Registry::freeze`] — registration is a
    /// startup-only operation (§5 "populated once... after scanned = true,
    /// they are read-only").
    pub fn register_container(&self, descriptor: ContainerDescriptor) {
        assert!(
            !self.frozen.load(Ordering::Acquire),
            "Registry::register_container called after freeze() for container '{}'",
            descriptor.container_name
        );

        for member in descriptor.members {
            let full_key = member.full_key();
            let base_key = member.base_key();
            let kind = member.kind;

            // First-writer-wins (§4.1 step 4) — `entry().or_insert` keeps the
            // first registration and reports whether this call actually won.
            let inserted = match self.canonical.entry(full_key.clone()) {
                dashmap::mapref::entry::Entry::Occupied(_) => false,
                dashmap::mapref::entry::Entry::Vacant(v) => {
                    v.insert(member.clone());
                    true
                }
            };

            if inserted {
                self.scan_order.lock().unwrap().push(full_key.clone());
                tracing::debug!(container = descriptor.container_name, member = member.member_name, %full_key, "registered exposable member");

                if kind == MemberKind::Callable {
                    self.canonical_by_base_name
                        .entry(base_key.clone())
                        .or_default()
                        .push(full_key.clone());
                }

                // §4.1 step 6: alias every user-defined interface this
                // container declares, re-keyed by the interface name.
                for alias_name in &descriptor.aliases {
                    if is_reserved_alias(alias_name) {
                        continue;
                    }
                    let alias_base_key = format!("{alias_name}.{}", member.member_name);
                    let alias_full_key = match kind {
                        MemberKind::Datum => alias_base_key.clone(),
                        MemberKind::Callable => {
                            let params = member
                                .parameters
                                .iter()
                                .map(|p| p.type_name)
                                .collect::<Vec<_>>()
                                .join(",");
                            format!("{alias_base_key}({params})")
                        }
                    };

                    // Ties broken by scan order: first container wins (§4.1 step 6).
                    if let dashmap::mapref::entry::Entry::Vacant(v) =
                        self.aliases.entry(alias_full_key.clone())
                    {
                        v.insert(member.clone());
                        if kind == MemberKind::Callable {
                            self.aliases_by_base_name
                                .entry(alias_base_key)
                                .or_default()
                                .push(alias_full_key);
                        }
                    }
                }
            }
        }
    }

    /// Freeze the registry after startup registration completes.
    ///
    /// Idempotent — calling it twice is a no-op, supporting §8 P4
    /// ("idempotent scan").
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// `resolve` (§4.1 "Lookup").
    pub fn resolve(
        &self,
        container_name: &str,
        member_name: &str,
        parameter_type_names: &[&str],
    ) -> Result<Resolution, DispatchError> {
        let base_key = format!("{container_name}.{member_name}");

        // Step 2: direct base-key lookup is the DATUM path (also matches a
        // zero-arg CALLABLE registered without an explicit full key — but
        // CALLABLEs are always keyed with parens, so a base-key hit here is
        // necessarily a DATUM).
        if let Some(member) = self.canonical.get(&base_key) {
            return Ok(Resolution::Found(member.clone()));
        }
        if let Some(member) = self.aliases.get(&base_key) {
            return Ok(Resolution::Found(member.clone()));
        }

        // Step 3: explicit parameter-type pinning.
        if !parameter_type_names.is_empty() {
            let full_key = format!("{base_key}({})", parameter_type_names.join(","));
            if let Some(member) = self.canonical.get(&full_key) {
                return Ok(Resolution::Found(member.clone()));
            }
            if let Some(member) = self.aliases.get(&full_key) {
                return Ok(Resolution::Found(member.clone()));
            }
            return Err(DispatchError::NotFound(full_key));
        }

        // Step 4: overload set by base name.
        let set = self
            .canonical_by_base_name
            .get(&base_key)
            .map(|keys| {
                keys.iter()
                    .filter_map(|k| self.canonical.get(k).map(|m| m.clone()))
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty())
            .or_else(|| {
                self.aliases_by_base_name.get(&base_key).map(|keys| {
                    keys.iter()
                        .filter_map(|k| self.aliases.get(k).map(|m| m.clone()))
                        .collect::<Vec<_>>()
                })
            });

        match set {
            None => Err(DispatchError::NotFound(base_key)),
            Some(candidates) if candidates.is_empty() => Err(DispatchError::NotFound(base_key)),
            Some(candidates) if candidates.len() == 1 => {
                Ok(Resolution::Found(candidates.into_iter().next().unwrap()))
            }
            Some(candidates) => Ok(Resolution::Ambiguous(candidates)),
        }
    }

    /// All canonical members in scan order, for introspection (§4.5) and
    /// §8 P2 ("no duplicates") / P4 ("idempotent scan") tests. Aliases are
    /// excluded, matching §4.5 ("aliases excluded").
    pub fn canonical_members(&self) -> Vec<ExposableMember> {
        let order = self.scan_order.lock().unwrap();
        order
            .iter()
            .filter_map(|k| self.canonical.get(k).map(|m| m.clone()))
            .collect()
    }

    /// Number of canonical entries — used by §8 P2's duplicate-freedom check
    /// (a `HashMap` can never contain duplicate keys by construction, so
    /// this simply exposes the count for tests to compare against the
    /// number of registration attempts).
    pub fn canonical_len(&self) -> usize {
        self.canonical.len()
    }

    /// Snapshot the canonical map as a plain `HashMap` for equality-based
    /// idempotency assertions (§8 P4).
    pub fn canonical_snapshot(&self) -> HashMap<String, String> {
        self.canonical
            .iter()
            .map(|e| (e.key().clone(), e.value().full_key()))
            .collect()
    }
}
