//! Logical texture slots resolved to loaded resources.
//!
//! Reads are synchronous: a slot always has something to show (its default,
//! or a placeholder until the default arrives). Swaps are asynchronous: a
//! request hands out a [`LoadTicket`], the caller performs the fetch and
//! passes the result back to [`TextureCache::complete`]. A completion only
//! lands if its target is still the slot's desired target and nothing newer
//! has already landed, so out-of-order completions can never revert a newer
//! selection.

use std::collections::HashMap;
use std::fmt;

use crate::uniforms::TextureId;

/// Number of custom URLs kept resolved for instant re-selection.
const URL_MEMO_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Day,
    /// Water mask.
    Specular,
    Normal,
    Cloud,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Day,
        TextureSlot::Specular,
        TextureSlot::Normal,
        TextureSlot::Cloud,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextureSlot::Day => "day",
            TextureSlot::Specular => "specular",
            TextureSlot::Normal => "normal",
            TextureSlot::Cloud => "cloud",
        }
    }
}

/// One value per texture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotMap<T> {
    pub day: T,
    pub specular: T,
    pub normal: T,
    pub cloud: T,
}

impl<T> SlotMap<T> {
    pub fn get(&self, slot: TextureSlot) -> &T {
        match slot {
            TextureSlot::Day => &self.day,
            TextureSlot::Specular => &self.specular,
            TextureSlot::Normal => &self.normal,
            TextureSlot::Cloud => &self.cloud,
        }
    }

    pub fn get_mut(&mut self, slot: TextureSlot) -> &mut T {
        match slot {
            TextureSlot::Day => &mut self.day,
            TextureSlot::Specular => &mut self.specular,
            TextureSlot::Normal => &mut self.normal,
            TextureSlot::Cloud => &mut self.cloud,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> SlotMap<U> {
        SlotMap {
            day: f(self.day),
            specular: f(self.specular),
            normal: f(self.normal),
            cloud: f(self.cloud),
        }
    }
}

/// What a slot should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    Default,
    Custom(String),
}

/// Handle for one in-flight load. Hand it back to `complete` with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub slot: TextureSlot,
    pub token: u64,
    pub target: LoadTarget,
    /// URL to fetch.
    pub url: String,
}

/// Result of a swap request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Already showing (or waiting for) this target.
    Unchanged,
    /// Back on the default resource.
    Reverted,
    /// Target was already resolved; applied immediately.
    Cached,
    /// A fetch is needed.
    Pending(LoadTicket),
}

/// Result of handing back a finished load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Slot now shows the new resource.
    Applied(TextureId),
    /// Resource kept (as the default or in the memo) but not shown.
    Stored(TextureId),
    /// Superseded by a newer request; the slot was not touched.
    Stale,
    /// Load failed; the slot keeps its previous resource.
    Failed,
}

#[derive(Debug)]
struct SlotState {
    default_url: String,
    desired: LoadTarget,
    current: TextureId,
    placeholder: TextureId,
    default: Option<TextureId>,
    default_in_flight: bool,
    /// Token of the last completion that landed on this slot.
    applied_token: u64,
    /// Token of the newest request for the desired target still outstanding.
    awaiting: Option<u64>,
}

/// Slot cache over any resource type `R` (GPU textures in the app, plain
/// values in tests).
pub struct TextureCache<R> {
    resources: HashMap<TextureId, R>,
    next_id: u32,
    next_token: u64,
    slots: SlotMap<SlotState>,
    /// Most recent last.
    memo: Vec<(String, TextureId)>,
}

impl<R> fmt::Debug for TextureCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureCache")
            .field("resources", &self.resources.len())
            .field("slots", &self.slots)
            .field("memo", &self.memo)
            .finish()
    }
}

impl<R> TextureCache<R> {
    /// `placeholders` are shown until each slot's default finishes loading.
    pub fn new(default_urls: SlotMap<String>, placeholders: SlotMap<R>) -> Self {
        let mut cache = Self {
            resources: HashMap::new(),
            next_id: 1,
            next_token: 1,
            slots: SlotMap {
                day: SlotState::empty(),
                specular: SlotState::empty(),
                normal: SlotState::empty(),
                cloud: SlotState::empty(),
            },
            memo: Vec::new(),
        };
        let SlotMap {
            day,
            specular,
            normal,
            cloud,
        } = placeholders;
        let placeholder_ids = SlotMap {
            day: cache.register(day),
            specular: cache.register(specular),
            normal: cache.register(normal),
            cloud: cache.register(cloud),
        };
        for slot in TextureSlot::ALL {
            let state = cache.slots.get_mut(slot);
            state.default_url = default_urls.get(slot).clone();
            state.placeholder = *placeholder_ids.get(slot);
            state.current = state.placeholder;
        }
        cache
    }

    /// Store a resource outside any slot (e.g. the procedural noise) and return its identity.
    pub fn register(&mut self, resource: R) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.resources.insert(id, resource);
        id
    }

    pub fn resource(&self, id: TextureId) -> Option<&R> {
        self.resources.get(&id)
    }

    pub fn current_id(&self, slot: TextureSlot) -> TextureId {
        self.slots.get(slot).current
    }

    pub fn current_ids(&self) -> SlotMap<TextureId> {
        SlotMap {
            day: self.slots.day.current,
            specular: self.slots.specular.current,
            normal: self.slots.normal.current,
            cloud: self.slots.cloud.current,
        }
    }

    /// Resource currently shown in `slot`.
    pub fn current(&self, slot: TextureSlot) -> Option<&R> {
        self.resources.get(&self.slots.get(slot).current)
    }

    /// Whether the slot is waiting on a fetch for its desired target.
    pub fn is_pending(&self, slot: TextureSlot) -> bool {
        self.slots.get(slot).awaiting.is_some()
    }

    pub fn default_url(&self, slot: TextureSlot) -> &str {
        &self.slots.get(slot).default_url
    }

    /// Ticket for loading a slot's default resource, unless it is loaded or already in flight.
    pub fn request_default(&mut self, slot: TextureSlot) -> Option<LoadTicket> {
        let state = self.slots.get(slot);
        if state.default.is_some() || state.default_in_flight {
            return None;
        }
        let token = self.issue_token();
        let state = self.slots.get_mut(slot);
        state.default_in_flight = true;
        if state.desired == LoadTarget::Default {
            state.awaiting = Some(token);
        }
        Some(LoadTicket {
            slot,
            token,
            target: LoadTarget::Default,
            url: state.default_url.clone(),
        })
    }

    /// Select a custom URL for `slot`, or `None` to go back to the default.
    pub fn request(&mut self, slot: TextureSlot, url: Option<&str>) -> SwapOutcome {
        let target = match url {
            Some(u) => LoadTarget::Custom(u.to_string()),
            None => LoadTarget::Default,
        };
        if self.slots.get(slot).desired == target {
            return SwapOutcome::Unchanged;
        }

        let token = self.issue_token();
        match target {
            LoadTarget::Default => {
                let state = self.slots.get_mut(slot);
                state.desired = LoadTarget::Default;
                state.applied_token = token;
                state.awaiting = None;
                let fallback = state.default.unwrap_or(state.placeholder);
                self.show(slot, fallback);
                log::debug!("texture slot {} reverted to default", slot.label());
                if let Some(ticket) = self.request_default(slot) {
                    return SwapOutcome::Pending(ticket);
                }
                if self.slots.get(slot).default_in_flight {
                    // The default is still on its way; its completion will land.
                    self.slots.get_mut(slot).awaiting = Some(token);
                }
                SwapOutcome::Reverted
            }
            LoadTarget::Custom(url) => {
                let memoized = self.memo_lookup(&url);
                let state = self.slots.get_mut(slot);
                state.desired = LoadTarget::Custom(url.clone());
                if let Some(id) = memoized {
                    state.applied_token = token;
                    state.awaiting = None;
                    self.show(slot, id);
                    log::debug!("texture slot {} swapped to cached {}", slot.label(), short_url(&url));
                    SwapOutcome::Cached
                } else {
                    state.awaiting = Some(token);
                    log::debug!("texture slot {} requested {}", slot.label(), short_url(&url));
                    SwapOutcome::Pending(LoadTicket {
                        slot,
                        token,
                        url: url.clone(),
                        target: LoadTarget::Custom(url),
                    })
                }
            }
        }
    }

    /// Hand back a finished load. Failures never disturb the slot.
    pub fn complete<E: fmt::Display>(&mut self, ticket: LoadTicket, result: Result<R, E>) -> Completion {
        let slot = ticket.slot;
        let resource = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!(
                    "texture load for {} failed ({}): {e}",
                    slot.label(),
                    short_url(&ticket.url)
                );
                let state = self.slots.get_mut(slot);
                if ticket.target == LoadTarget::Default {
                    state.default_in_flight = false;
                }
                if state.awaiting == Some(ticket.token)
                    || (ticket.target == LoadTarget::Default && state.desired == LoadTarget::Default)
                {
                    state.awaiting = None;
                }
                return Completion::Failed;
            }
        };

        let id = self.register(resource);
        match &ticket.target {
            LoadTarget::Default => {
                let state = self.slots.get_mut(slot);
                state.default = Some(id);
                state.default_in_flight = false;
                if state.desired == LoadTarget::Default {
                    state.awaiting = None;
                    self.show(slot, id);
                    log::debug!("texture slot {} default loaded", slot.label());
                    Completion::Applied(id)
                } else {
                    Completion::Stored(id)
                }
            }
            LoadTarget::Custom(url) => {
                self.memoize(url.clone(), id);
                let state = self.slots.get_mut(slot);
                let wanted = state.desired == ticket.target;
                if wanted && ticket.token > state.applied_token {
                    state.applied_token = ticket.token;
                    if state.awaiting.is_some_and(|t| t <= ticket.token) {
                        state.awaiting = None;
                    }
                    self.show(slot, id);
                    log::debug!("texture slot {} now shows {}", slot.label(), short_url(url));
                    Completion::Applied(id)
                } else {
                    log::debug!(
                        "discarding stale texture load {} for {}",
                        short_url(url),
                        slot.label()
                    );
                    Completion::Stale
                }
            }
        }
    }

    /// Point `slot` at `id`, releasing whatever it showed before.
    fn show(&mut self, slot: TextureSlot, id: TextureId) {
        let old = std::mem::replace(&mut self.slots.get_mut(slot).current, id);
        if old != id {
            self.release(old);
        }
    }

    fn issue_token(&mut self) -> u64 {
        let t = self.next_token;
        self.next_token += 1;
        t
    }

    fn memo_lookup(&mut self, url: &str) -> Option<TextureId> {
        let pos = self.memo.iter().position(|(u, _)| u == url)?;
        let entry = self.memo.remove(pos);
        let id = entry.1;
        self.memo.push(entry);
        Some(id)
    }

    fn memoize(&mut self, url: String, id: TextureId) {
        if let Some(pos) = self.memo.iter().position(|(u, _)| *u == url) {
            let (_, old) = self.memo.remove(pos);
            self.release(old);
        }
        self.memo.push((url, id));
        while self.memo.len() > URL_MEMO_CAPACITY {
            let (_, evicted) = self.memo.remove(0);
            self.release(evicted);
        }
    }

    /// Drop a resource unless a slot still shows it or holds it as default.
    fn release(&mut self, id: TextureId) {
        let in_use = TextureSlot::ALL.iter().any(|&s| {
            let st = self.slots.get(s);
            st.current == id || st.default == Some(id) || st.placeholder == id
        }) || self.memo.iter().any(|(_, m)| *m == id);
        if !in_use {
            self.resources.remove(&id);
        }
    }
}

/// Inline `data:` URLs are reduced to their header for logging.
fn short_url(url: &str) -> &str {
    if url.starts_with("data:") {
        url.split(',').next().unwrap_or(url)
    } else {
        url
    }
}

impl SlotState {
    fn empty() -> Self {
        Self {
            default_url: String::new(),
            desired: LoadTarget::Default,
            current: TextureId::NONE,
            placeholder: TextureId::NONE,
            default: None,
            default_in_flight: false,
            applied_token: 0,
            awaiting: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url_hides_inline_payload() {
        assert_eq!(short_url("data:image/png;base64,AAAA"), "data:image/png;base64");
        assert_eq!(short_url("https://x/y.jpg"), "https://x/y.jpg");
    }

    type Cache = TextureCache<&'static str>;

    fn cache() -> Cache {
        let urls = SlotMap {
            day: "day.jpg".to_string(),
            specular: "spec.jpg".to_string(),
            normal: "norm.jpg".to_string(),
            cloud: "cloud.png".to_string(),
        };
        let placeholders = SlotMap {
            day: "ph-day",
            specular: "ph-spec",
            normal: "ph-norm",
            cloud: "ph-cloud",
        };
        TextureCache::new(urls, placeholders)
    }

    fn loaded_cache() -> Cache {
        let mut c = cache();
        let defaults = [
            (TextureSlot::Day, "default-day"),
            (TextureSlot::Specular, "default-spec"),
            (TextureSlot::Normal, "default-norm"),
            (TextureSlot::Cloud, "default-cloud"),
        ];
        for (slot, res) in defaults {
            let ticket = c.request_default(slot).unwrap();
            assert!(matches!(c.complete::<String>(ticket, Ok(res)), Completion::Applied(_)));
        }
        c
    }

    fn pending(outcome: SwapOutcome) -> LoadTicket {
        match outcome {
            SwapOutcome::Pending(t) => t,
            other => panic!("expected pending, got {other:?}"),
        }
    }

    #[test]
    fn test_placeholder_until_default_loads() {
        let mut c = cache();
        assert_eq!(c.current(TextureSlot::Day), Some(&"ph-day"));
        let ticket = c.request_default(TextureSlot::Day).unwrap();
        assert_eq!(ticket.url, "day.jpg");
        assert!(c.request_default(TextureSlot::Day).is_none());
        c.complete::<String>(ticket, Ok("default-day"));
        assert_eq!(c.current(TextureSlot::Day), Some(&"default-day"));
    }

    #[test]
    fn test_stale_completion_rejected_in_any_order() {
        // Earlier request finishes last.
        let mut c = loaded_cache();
        let r1 = pending(c.request(TextureSlot::Day, Some("a.png")));
        let r2 = pending(c.request(TextureSlot::Day, Some("b.png")));
        assert!(matches!(c.complete::<String>(r2, Ok("B")), Completion::Applied(_)));
        assert_eq!(c.complete::<String>(r1, Ok("A")), Completion::Stale);
        assert_eq!(c.current(TextureSlot::Day), Some(&"B"));

        // Requests finish in order.
        let mut c = loaded_cache();
        let r1 = pending(c.request(TextureSlot::Day, Some("a.png")));
        let r2 = pending(c.request(TextureSlot::Day, Some("b.png")));
        assert_eq!(c.complete::<String>(r1, Ok("A")), Completion::Stale);
        assert!(matches!(c.complete::<String>(r2, Ok("B")), Completion::Applied(_)));
        assert_eq!(c.current(TextureSlot::Day), Some(&"B"));
    }

    #[test]
    fn test_default_revert_restores_default() {
        let mut c = loaded_cache();
        let t = pending(c.request(TextureSlot::Day, Some("custom.png")));
        c.complete::<String>(t, Ok("custom"));
        assert_eq!(c.current(TextureSlot::Day), Some(&"custom"));
        assert_eq!(c.request(TextureSlot::Day, None), SwapOutcome::Reverted);
        assert_eq!(c.current(TextureSlot::Day), Some(&"default-day"));
    }

    #[test]
    fn test_revert_while_custom_in_flight() {
        let mut c = loaded_cache();
        let t = pending(c.request(TextureSlot::Cloud, Some("storm.png")));
        c.request(TextureSlot::Cloud, None);
        assert_eq!(c.complete::<String>(t, Ok("storm")), Completion::Stale);
        assert_eq!(c.current(TextureSlot::Cloud), Some(&"default-cloud"));
        assert!(!c.is_pending(TextureSlot::Cloud));
    }

    #[test]
    fn test_failure_keeps_previous() {
        let mut c = loaded_cache();
        let t = pending(c.request(TextureSlot::Day, Some("broken.png")));
        assert!(c.is_pending(TextureSlot::Day));
        assert_eq!(c.complete(t, Err("404")), Completion::Failed);
        assert_eq!(c.current(TextureSlot::Day), Some(&"default-day"));
        assert!(!c.is_pending(TextureSlot::Day));
    }

    #[test]
    fn test_failed_default_keeps_placeholder() {
        let mut c = cache();
        let t = c.request_default(TextureSlot::Normal).unwrap();
        assert_eq!(c.complete(t, Err("offline")), Completion::Failed);
        assert_eq!(c.current(TextureSlot::Normal), Some(&"ph-norm"));
        // A later attempt is allowed.
        assert!(c.request_default(TextureSlot::Normal).is_some());
    }

    #[test]
    fn test_reselect_uses_memo() {
        let mut c = loaded_cache();
        let t = pending(c.request(TextureSlot::Day, Some("a.png")));
        c.complete::<String>(t, Ok("A"));
        c.request(TextureSlot::Day, None);
        assert_eq!(c.request(TextureSlot::Day, Some("a.png")), SwapOutcome::Cached);
        assert_eq!(c.current(TextureSlot::Day), Some(&"A"));
        assert_eq!(c.request(TextureSlot::Day, Some("a.png")), SwapOutcome::Unchanged);
    }

    #[test]
    fn test_memo_bounded() {
        let mut c = loaded_cache();
        let names: Vec<String> = (0..12).map(|i| format!("t{i}.png")).collect();
        for name in &names {
            let t = pending(c.request(TextureSlot::Day, Some(name)));
            c.complete::<String>(t, Ok("img"));
        }
        // 4 placeholders + 4 defaults + memo.
        assert_eq!(c.resources.len(), 8 + URL_MEMO_CAPACITY);
        assert!(matches!(
            c.request(TextureSlot::Day, Some("t0.png")),
            SwapOutcome::Pending(_)
        ));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut c = loaded_cache();
        let day = pending(c.request(TextureSlot::Day, Some("x.png")));
        let cloud = pending(c.request(TextureSlot::Cloud, Some("x.png")));
        c.complete::<String>(cloud, Ok("X-cloud"));
        c.complete::<String>(day, Ok("X-day"));
        assert_eq!(c.current(TextureSlot::Day), Some(&"X-day"));
        assert_eq!(c.current(TextureSlot::Cloud), Some(&"X-cloud"));
    }
}
