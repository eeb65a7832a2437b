use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stockpick_core::domain::preferences::InvestmentPreferences;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "stockpick_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashCategory {
    Error,
    Warning,
}

impl FlashCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashCategory::Error => "error",
            FlashCategory::Warning => "warning",
        }
    }
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

#[derive(Debug)]
struct SessionData {
    preferences: Option<InvestmentPreferences>,
    flashes: Vec<Flash>,
    last_seen: Instant,
}

impl SessionData {
    fn new() -> Self {
        Self {
            preferences: None,
            flashes: Vec::new(),
            last_seen: Instant::now(),
        }
    }

    fn is_empty(&self) -> bool {
        self.preferences.is_none() && self.flashes.is_empty()
    }
}

/// In-process session state keyed by the session cookie.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<Uuid, SessionData>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn preferences(&self, id: Uuid) -> Option<InvestmentPreferences> {
        self.inner.get_mut(&id).and_then(|mut s| {
            s.last_seen = Instant::now();
            s.preferences.clone()
        })
    }

    pub fn set_preferences(&self, id: Uuid, prefs: InvestmentPreferences) {
        let mut s = self.inner.entry(id).or_insert_with(SessionData::new);
        s.preferences = Some(prefs);
        s.last_seen = Instant::now();
    }

    pub fn flash(&self, id: Uuid, category: FlashCategory, message: impl Into<String>) {
        let mut s = self.inner.entry(id).or_insert_with(SessionData::new);
        s.flashes.push(Flash {
            category,
            message: message.into(),
        });
        s.last_seen = Instant::now();
    }

    /// Drains pending flashes, oldest first. A session left with nothing in
    /// it is dropped.
    pub fn take_flashes(&self, id: Uuid) -> Vec<Flash> {
        let flashes = self
            .inner
            .get_mut(&id)
            .map(|mut s| std::mem::take(&mut s.flashes))
            .unwrap_or_default();
        self.inner.remove_if(&id, |_, s| s.is_empty());
        flashes
    }

    /// Removes sessions idle for at least `ttl`. Returns how many were removed.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        self.sweep_idle_at(Instant::now(), ttl)
    }

    fn sweep_idle_at(&self, now: Instant, ttl: Duration) -> usize {
        let before = self.inner.len();
        self.inner
            .retain(|_, s| now.saturating_duration_since(s.last_seen) < ttl);
        before.saturating_sub(self.inner.len())
    }

    /// Runs [`SessionStore::sweep_idle`] every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, ttl: Duration, every: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let removed = store.sweep_idle(ttl);
                if removed > 0 {
                    tracing::debug!(removed, remaining = store.len(), "evicted idle sessions");
                }
            }
        })
    }
}

/// Session id from the cookie jar, minting a new cookie when absent or malformed.
pub fn session_id(jar: CookieJar) -> (CookieJar, Uuid) {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        return (jar, id);
    }

    let id = Uuid::new_v4();
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpick_core::domain::preferences::{DividendPriority, RiskLevel, Sector};

    fn prefs() -> InvestmentPreferences {
        InvestmentPreferences {
            risk_level: RiskLevel::Medium,
            desired_return: 8.0,
            duration: 5,
            sectors: vec![Sector::Utilities],
            budget: 10_000.0,
            dividend_priority: DividendPriority::NotImportant,
            ethical_considerations: Vec::new(),
            investment_types: Vec::new(),
        }
    }

    #[test]
    fn flashes_are_drained_once() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        store.flash(id, FlashCategory::Error, "first");
        store.flash(id, FlashCategory::Warning, "second");

        let flashes = store.take_flashes(id);
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].message, "first");
        assert_eq!(flashes[1].category, FlashCategory::Warning);
        assert!(store.take_flashes(id).is_empty());
    }

    #[test]
    fn drained_flash_only_sessions_are_dropped() {
        let store = SessionStore::new();
        for _ in 0..1_000 {
            let (_, id) = session_id(CookieJar::new());
            store.flash(id, FlashCategory::Error, "fill out the form");
            assert_eq!(store.take_flashes(id).len(), 1);
        }
        assert_eq!(store.len(), 0);

        let id = Uuid::new_v4();
        store.set_preferences(id, prefs());
        store.flash(id, FlashCategory::Warning, "no matches");
        store.take_flashes(id);
        assert_eq!(store.len(), 1);
        assert!(store.preferences(id).is_some());
    }

    #[test]
    fn idle_sessions_are_swept() {
        let store = SessionStore::new();
        let stale = Uuid::new_v4();
        let fresh = Uuid::new_v4();
        store.set_preferences(stale, prefs());
        store.set_preferences(fresh, prefs());
        let later = Instant::now() + Duration::from_secs(3600);
        store.inner.get_mut(&fresh).unwrap().last_seen = later;

        let removed = store.sweep_idle_at(later, Duration::from_secs(1800));
        assert_eq!(removed, 1);
        assert!(store.preferences(stale).is_none());
        assert!(store.preferences(fresh).is_some());
        assert_eq!(store.sweep_idle(Duration::ZERO), 1);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_task_evicts_on_interval() {
        let store = SessionStore::new();
        store.flash(Uuid::new_v4(), FlashCategory::Error, "never read");
        let handle = store.spawn_sweeper(Duration::ZERO, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(store.len(), 0);
        handle.abort();
    }

    #[test]
    fn mints_cookie_only_when_missing() {
        let (jar, id) = session_id(CookieJar::new());
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().value(), id.to_string());

        let (_, same) = session_id(jar);
        assert_eq!(same, id);

        let bad = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "not-a-uuid"));
        let (jar, fresh) = session_id(bad);
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().value(), fresh.to_string());
    }
}
