//! Observable reader preferences (theme, scroll direction)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }

    /// Concrete theme; `System` follows the platform's dark-mode flag
    pub fn resolve(&self, system_dark: bool) -> Theme {
        match self {
            Theme::System if system_dark => Theme::Dark,
            Theme::System => Theme::Light,
            other => *other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    #[default]
    Vertical,
    Horizontal,
}

impl ScrollDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vertical" => Some(ScrollDirection::Vertical),
            "horizontal" => Some(ScrollDirection::Horizontal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub scroll: ScrollDirection,
}

impl Preferences {
    /// Defaults from `HINGHWA_THEME` / `HINGHWA_SCROLL`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            theme: get("HINGHWA_THEME").and_then(|v| Theme::parse(&v)).unwrap_or_default(),
            scroll: get("HINGHWA_SCROLL")
                .and_then(|v| ScrollDirection::parse(&v))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&Preferences) + Send + Sync>;

struct Inner {
    current: Preferences,
    next_id: u64,
    listeners: BTreeMap<SubscriptionId, Listener>,
}

/// Process-wide preference store; listeners hear every change until unsubscribed
pub struct PreferenceStore {
    inner: Mutex<Inner>,
}

impl PreferenceStore {
    pub fn new(initial: Preferences) -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: initial,
                next_id: 0,
                listeners: BTreeMap::new(),
            }),
        }
    }

    /// Recovers the guard from a poisoned lock
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> Preferences {
        self.lock().current
    }

    pub fn subscribe(&self, listener: impl Fn(&Preferences) + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.insert(id, Arc::new(listener));
        id
    }

    /// Returns false when `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().listeners.remove(&id).is_some()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.update(|p| p.theme = theme);
    }

    pub fn set_scroll(&self, scroll: ScrollDirection) {
        self.update(|p| p.scroll = scroll);
    }

    /// Apply `change`; listeners run outside the lock, only if something changed.
    pub fn update(&self, change: impl FnOnce(&mut Preferences)) {
        let (snapshot, listeners) = {
            let mut inner = self.lock();
            let before = inner.current;
            change(&mut inner.current);
            if inner.current == before {
                return;
            }
            let listeners: Vec<Listener> = inner.listeners.values().cloned().collect();
            (inner.current, listeners)
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}
