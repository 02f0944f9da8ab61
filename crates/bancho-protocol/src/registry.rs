// registry.rs — the version (cohort) registry
//
// Grounded on spec.md §4.1/§9: "each cohort owns an override map plus a
// pointer to its parent cohort; encoders/decoders resolve by walking the
// chain. Do not replicate the full table per cohort in memory." There is
// no teacher precedent for multi-version tables (Quake II has one fixed
// protocol family); the shape below is new, grounded directly on the
// spec's own design note.

use std::collections::HashMap;

use bancho_common::packets::{RequestKind, ResponseKind};

use crate::decode::DecodeFn;
use crate::encode::EncodeFn;

/// Cohort-specific behavior that isn't a per-packet shape difference but
/// changes which packets get sent at all, or how framing works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// `USER_PRESENCE`/`USER_STATS` exist as distinct packets (>= b1700).
    pub split_presence: bool,
    /// `USER_PRESENCE_SINGLE`/`USER_PRESENCE_BUNDLE` exist (> b20121223).
    pub presence_bundle: bool,
    /// The combined stats+presence packet carries an extra "update" bool
    /// (<= b319).
    pub combined_has_update_flag: bool,
    /// `INVITE` packet exists (> b1710); otherwise invites degrade to a
    /// private message.
    pub invite_packet: bool,
    /// IRC_JOIN/IRC_QUIT represent bot-like entities instead of ordinary
    /// quit/presence packets (<= b1710).
    pub irc_bot_packets: bool,
    /// Every outbound frame is gzip-compressed and the frame header omits
    /// the explicit compressed-flag byte (<= b323).
    pub legacy_compressed_framing: bool,
    /// `LOGIN_REPLY` error codes below -2 are clamped to -1 (b590, b558).
    pub clamp_login_errors: bool,
    /// Match packets carry 8 slots (modern) vs. fewer (legacy).
    pub match_slot_count: usize,
    /// Per-slot mods / freemod / seed fields exist in `bMatch` (> b323).
    pub match_has_freemod_fields: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            split_presence: true,
            presence_bundle: true,
            combined_has_update_flag: false,
            invite_packet: true,
            irc_bot_packets: false,
            legacy_compressed_framing: false,
            clamp_login_errors: false,
            match_slot_count: 8,
            match_has_freemod_fields: true,
        }
    }
}

#[derive(Default)]
pub struct Cohort {
    pub key: i32,
    pub parent: Option<i32>,
    pub capabilities: Capabilities,
    request_id_overrides: HashMap<RequestKind, u16>,
    response_id_overrides: HashMap<ResponseKind, u16>,
    decoder_overrides: HashMap<RequestKind, DecodeFn>,
    encoder_overrides: HashMap<ResponseKind, EncodeFn>,
}

impl Cohort {
    pub fn new(key: i32, parent: Option<i32>) -> Self {
        Cohort {
            key,
            parent,
            ..Default::default()
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn override_request_id(mut self, kind: RequestKind, id: u16) -> Self {
        self.request_id_overrides.insert(kind, id);
        self
    }

    pub fn override_response_id(mut self, kind: ResponseKind, id: u16) -> Self {
        self.response_id_overrides.insert(kind, id);
        self
    }

    pub fn override_decoder(mut self, kind: RequestKind, f: DecodeFn) -> Self {
        self.decoder_overrides.insert(kind, f);
        self
    }

    pub fn override_encoder(mut self, kind: ResponseKind, f: EncodeFn) -> Self {
        self.encoder_overrides.insert(kind, f);
        self
    }
}

/// The full set of registered cohorts. Tables are resolved on demand by
/// walking the parent chain — never flattened into a full per-cohort
/// copy.
pub struct Registry {
    cohorts: HashMap<i32, Cohort>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            cohorts: HashMap::new(),
        }
    }

    pub fn register(&mut self, cohort: Cohort) {
        self.cohorts.insert(cohort.key, cohort);
    }

    pub fn get(&self, key: i32) -> Option<&Cohort> {
        self.cohorts.get(&key)
    }

    /// Version negotiation (spec §4.1, §8): the registry key closest in
    /// absolute numeric distance to `requested` is selected; ties break
    /// toward the older (numerically smaller) cohort (Open Question
    /// decision, see DESIGN.md).
    pub fn nearest(&self, requested: i32) -> i32 {
        let mut best_key = *self
            .cohorts
            .keys()
            .next()
            .expect("registry must have at least one cohort registered");
        let mut best_distance = (requested - best_key).unsigned_abs();

        for &key in self.cohorts.keys() {
            let distance = (requested - key).unsigned_abs();
            if distance < best_distance
                || (distance == best_distance && key < best_key)
            {
                best_distance = distance;
                best_key = key;
            }
        }
        best_key
    }

    pub fn capabilities(&self, key: i32) -> Capabilities {
        self.get(key).map(|c| c.capabilities).unwrap_or_default()
    }

    fn walk<T: Copy>(
        &self,
        mut key: i32,
        pick: impl Fn(&Cohort) -> Option<T>,
    ) -> Option<T> {
        loop {
            let cohort = self.cohorts.get(&key)?;
            if let Some(value) = pick(cohort) {
                return Some(value);
            }
            key = cohort.parent?;
        }
    }

    pub fn request_id(&self, cohort_key: i32, kind: RequestKind) -> Option<u16> {
        self.walk(cohort_key, |c| c.request_id_overrides.get(&kind).copied())
    }

    pub fn response_id(&self, cohort_key: i32, kind: ResponseKind) -> Option<u16> {
        self.walk(cohort_key, |c| c.response_id_overrides.get(&kind).copied())
    }

    pub fn decoder(&self, cohort_key: i32, kind: RequestKind) -> Option<DecodeFn> {
        self.walk(cohort_key, |c| c.decoder_overrides.get(&kind).copied())
    }

    pub fn encoder(&self, cohort_key: i32, kind: ResponseKind) -> Option<EncodeFn> {
        self.walk(cohort_key, |c| c.encoder_overrides.get(&kind).copied())
    }

    /// Flattens the chain once into a bidirectional id<->kind lookup for
    /// a negotiated cohort. Called once at login (spec §4.2 "chosen
    /// version tables"), not per packet, so the O(table size) walk cost
    /// is paid a single time per session rather than per frame.
    pub fn resolve(&self, cohort_key: i32) -> ResolvedTable {
        let mut request_by_id = HashMap::new();
        let mut id_by_request = HashMap::new();
        let mut response_by_id = HashMap::new();
        let mut id_by_response = HashMap::new();

        let mut key = Some(cohort_key);
        // Walk parent-most first so a closer override wins when both set
        // the same kind (child overrides are applied last = stick).
        let mut chain = Vec::new();
        while let Some(k) = key {
            let cohort = match self.cohorts.get(&k) {
                Some(c) => c,
                None => break,
            };
            chain.push(cohort);
            key = cohort.parent;
        }
        for cohort in chain.into_iter().rev() {
            for (&kind, &id) in &cohort.request_id_overrides {
                request_by_id.insert(id, kind);
                id_by_request.insert(kind, id);
            }
            for (&kind, &id) in &cohort.response_id_overrides {
                response_by_id.insert(id, kind);
                id_by_response.insert(kind, id);
            }
        }

        ResolvedTable {
            cohort_key,
            request_by_id,
            id_by_request,
            response_by_id,
            id_by_response,
            capabilities: self.capabilities(cohort_key),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// A flattened, session-owned view over one cohort's id<->kind mapping.
pub struct ResolvedTable {
    pub cohort_key: i32,
    pub request_by_id: HashMap<u16, RequestKind>,
    pub id_by_request: HashMap<RequestKind, u16>,
    pub response_by_id: HashMap<u16, ResponseKind>,
    pub id_by_response: HashMap<ResponseKind, u16>,
    pub capabilities: Capabilities,
}

impl ResolvedTable {
    pub fn kind_for_request_id(&self, id: u16) -> Option<RequestKind> {
        self.request_by_id.get(&id).copied()
    }

    pub fn id_for_response(&self, kind: ResponseKind) -> Option<u16> {
        self.id_by_response.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_test_registry() -> Registry {
        let mut reg = Registry::new();
        reg.register(Cohort::new(20130815, None));
        reg.register(Cohort::new(1700, Some(20130815)).with_capabilities(Capabilities {
            split_presence: false,
            ..Default::default()
        }));
        reg.register(Cohort::new(323, Some(1700)).with_capabilities(Capabilities {
            split_presence: false,
            legacy_compressed_framing: true,
            match_has_freemod_fields: false,
            ..Default::default()
        }));
        reg
    }

    #[test]
    fn nearest_picks_minimal_distance_older_on_tie() {
        let reg = build_test_registry();
        assert_eq!(reg.nearest(20130815), 20130815);
        assert_eq!(reg.nearest(20130816), 20130815);
        // Exactly between 323 and 1700 -> tie, break toward older (323).
        let midpoint = (323 + 1700) / 2;
        let dist_to_323 = (midpoint - 323).abs();
        let dist_to_1700 = (midpoint - 1700).abs();
        assert_eq!(dist_to_323, dist_to_1700);
        assert_eq!(reg.nearest(midpoint), 323);
    }

    #[test]
    fn capabilities_inherit_through_chain() {
        let reg = build_test_registry();
        // 323 explicitly sets legacy framing.
        assert!(reg.capabilities(323).legacy_compressed_framing);
        // 1700 does not set it and has no parent capability inheritance
        // mechanism for capabilities (they're resolved directly per
        // cohort, not chained) -- this documents that contract.
        assert!(!reg.capabilities(1700).legacy_compressed_framing);
    }

    #[test]
    fn resolve_inherits_unoverridden_entries_from_parent() {
        let mut reg = Registry::new();
        reg.register(
            Cohort::new(20130815, None)
                .override_request_id(RequestKind::Logout, 2)
                .override_request_id(RequestKind::SendPublicMessage, 1),
        );
        reg.register(
            Cohort::new(1700, Some(20130815))
                .override_request_id(RequestKind::Logout, 99),
        );

        let resolved = reg.resolve(1700);
        assert_eq!(resolved.kind_for_request_id(99), Some(RequestKind::Logout));
        assert_eq!(
            resolved.id_by_request.get(&RequestKind::SendPublicMessage),
            Some(&1)
        );
    }
}
