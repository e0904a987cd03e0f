use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use parking_lot::RwLock;
use base64::Engine;
use crate::tprintln;

use super::role::Role;

pub type SessionToken = String;

/// Ephemeral server-side record identified by an opaque bearer token.
/// Not persisted: a process restart invalidates all sessions.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: i64,
    pub organization_id: String,
    pub role: Role,
    pub issued_at: Instant,
    pub expires_at: Instant,
}

fn gen_token() -> String {
    // 256-bit random token base64url without padding. A dead entropy source
    // must not degrade into predictable tokens, so it aborts token issuance.
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).expect("OS entropy source unavailable for session tokens");
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

/// Process-lifetime token registry. Injected into request handlers behind an
/// `Arc`; all maps sit behind their own `RwLock` and every operation takes a
/// lock for the duration of one call only.
pub struct SessionRegistry {
    ttl: Duration,
    sessions: RwLock<HashMap<SessionToken, Session>>,
    user_index: RwLock<HashMap<i64, HashSet<SessionToken>>>,
}

impl Default for SessionRegistry {
    fn default() -> Self { Self::with_ttl(Duration::from_secs(7 * 24 * 60 * 60)) }
}

impl SessionRegistry {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, sessions: RwLock::new(HashMap::new()), user_index: RwLock::new(HashMap::new()) }
    }

    /// Issue a fresh token scoped to (user, organization, role).
    /// No collision handling; token entropy is assumed sufficient.
    pub fn issue(&self, user_id: i64, organization_id: &str, role: Role) -> Session {
        let now = Instant::now();
        let token = gen_token();
        let sess = Session {
            token: token.clone(),
            user_id,
            organization_id: organization_id.to_string(),
            role,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        {
            let mut m = self.sessions.write();
            m.insert(token.clone(), sess.clone());
        }
        {
            let mut uidx = self.user_index.write();
            uidx.entry(user_id).or_insert_with(HashSet::new).insert(token);
        }
        tprintln!("session.issue user={} org={} ttl_secs={}", user_id, organization_id, self.ttl.as_secs());
        sess
    }

    /// Return the live session for a token, evicting it lazily when expired.
    /// Eviction is permanent: a later validate with the same token is None.
    pub fn validate(&self, token: &str) -> Option<Session> {
        let now = Instant::now();
        let mut drop_key: Option<String> = None;
        let out = {
            let map = self.sessions.read();
            if let Some(sess) = map.get(token) {
                if sess.expires_at > now {
                    Some(sess.clone())
                } else {
                    drop_key = Some(token.to_string());
                    None
                }
            } else { None }
        };
        if let Some(k) = drop_key {
            self.remove(&k);
        }
        out
    }

    /// Remove a token unconditionally; no-op when absent.
    pub fn invalidate(&self, token: &str) -> bool {
        self.remove(token)
    }

    /// Remove every live session for a user (account deletion). Returns the
    /// number of sessions removed.
    pub fn invalidate_user(&self, user_id: i64) -> usize {
        let tokens: Vec<String> = match self.user_index.write().remove(&user_id) {
            Some(set) => set.into_iter().collect(),
            None => return 0,
        };
        let mut count = 0usize;
        let mut map = self.sessions.write();
        for t in &tokens {
            if map.remove(t).is_some() { count += 1; }
        }
        tprintln!("session.invalidate_user user={} count={}", user_id, count);
        count
    }

    /// Re-scope every live session of a user to a new organization and role,
    /// in place. Expiry is untouched.
    pub fn switch_active_organization(&self, user_id: i64, organization_id: &str, role: Role) -> usize {
        let tokens: Vec<String> = match self.user_index.read().get(&user_id) {
            Some(set) => set.iter().cloned().collect(),
            None => return 0,
        };
        let mut count = 0usize;
        let mut map = self.sessions.write();
        for t in &tokens {
            if let Some(sess) = map.get_mut(t) {
                sess.organization_id = organization_id.to_string();
                sess.role = role;
                count += 1;
            }
        }
        tprintln!("session.switch user={} org={} sessions={}", user_id, organization_id, count);
        count
    }

    fn remove(&self, token: &str) -> bool {
        let removed = self.sessions.write().remove(token);
        if let Some(sess) = removed {
            let mut idx = self.user_index.write();
            if let Some(set) = idx.get_mut(&sess.user_id) {
                set.remove(token);
                if set.is_empty() { idx.remove(&sess.user_id); }
            }
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_validate_round_trips_fields() {
        let reg = SessionRegistry::default();
        let issued = reg.issue(7, "org-a", Role::Admin);
        let got = reg.validate(&issued.token).expect("live session");
        assert_eq!(got.user_id, 7);
        assert_eq!(got.organization_id, "org-a");
        assert_eq!(got.role, Role::Admin);
        assert_eq!(got.token, issued.token);
    }

    #[test]
    fn expired_session_is_evicted_permanently() {
        let reg = SessionRegistry::with_ttl(Duration::ZERO);
        let issued = reg.issue(1, "org-a", Role::Viewer);
        assert!(reg.validate(&issued.token).is_none());
        // second validate with the same token is also None
        assert!(reg.validate(&issued.token).is_none());
        // and the user index no longer references the token
        assert_eq!(reg.invalidate_user(1), 0);
    }

    #[test]
    fn tokens_are_distinct_and_url_safe() {
        let reg = SessionRegistry::default();
        let a = reg.issue(1, "org-a", Role::Viewer).token;
        let b = reg.issue(1, "org-a", Role::Viewer).token;
        assert_ne!(a, b);
        // 32 bytes -> 43 base64url chars, no padding
        assert_eq!(a.len(), 43);
        assert!(a.bytes().all(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_'));
    }

    #[test]
    fn invalidate_is_noop_for_unknown_tokens() {
        let reg = SessionRegistry::default();
        assert!(!reg.invalidate("no-such-token"));
        let issued = reg.issue(2, "org-b", Role::Viewer);
        assert!(reg.invalidate(&issued.token));
        assert!(reg.validate(&issued.token).is_none());
    }

    #[test]
    fn switch_rescopes_every_live_session_of_the_user() {
        let reg = SessionRegistry::default();
        let a = reg.issue(3, "org-a", Role::Viewer);
        let b = reg.issue(3, "org-a", Role::Viewer);
        let other = reg.issue(4, "org-a", Role::Admin);

        assert_eq!(reg.switch_active_organization(3, "org-b", Role::Admin), 2);
        for t in [&a.token, &b.token] {
            let s = reg.validate(t).unwrap();
            assert_eq!(s.organization_id, "org-b");
            assert_eq!(s.role, Role::Admin);
        }
        // unrelated user untouched
        let s = reg.validate(&other.token).unwrap();
        assert_eq!(s.organization_id, "org-a");
    }

    #[test]
    fn invalidate_user_removes_all_sessions() {
        let reg = SessionRegistry::default();
        let a = reg.issue(5, "org-a", Role::Admin);
        let b = reg.issue(5, "org-a", Role::Admin);
        assert_eq!(reg.invalidate_user(5), 2);
        assert!(reg.validate(&a.token).is_none());
        assert!(reg.validate(&b.token).is_none());
    }
}
