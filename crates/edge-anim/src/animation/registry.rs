//! Content-addressed registry of compiled `@keyframes` bodies.
//!
//! Identical keyframe text always maps to the same name, so any number of
//! animations built from the same keyframes share one stylesheet rule. Entries
//! are append-only. Inserts mark the registry dirty and arm one coalescing
//! timer; when it fires, the single shared stylesheet (created on first use) is
//! rewritten with every registered rule.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::host::{Host, StyleSheetHost, StyleSheetTarget, TimerHost, TimerId};

/// Default prefix for generated keyframes names.
pub const DEFAULT_NAMESPACE: &str = "ea_";

/// 32-bit multiplicative string hash seeded at 5381, rendered in base 36.
///
/// Walks UTF-16 code units from last to first; each step multiplies by 33
/// (wrapping) and XORs the code unit in.
pub fn string_hash(text: &str) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut value: i32 = 5381;
    for unit in units.iter().rev() {
        value = value.wrapping_mul(33) ^ i32::from(*unit);
    }
    to_base36(value as u32)
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

struct RegistryState {
    host: Host,
    namespace: String,
    flush_delay_ms: f64,
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    dirty: bool,
    pending: Option<TimerId>,
    sheet: Option<Rc<dyn StyleSheetTarget>>,
    rebuilds: usize,
}

impl RegistryState {
    fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(name, body)| format!("@keyframes {name}{{{body}}}"))
            .collect()
    }
}

/// Shared handle to the keyframes registry.
///
/// Cloning is cheap; every clone sees the same entries and stylesheet.
#[derive(Clone)]
pub struct StylesheetRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl StylesheetRegistry {
    /// Registry with the default namespace and a zero-delay flush.
    pub fn new(host: Host) -> Self {
        Self::with_options(host, DEFAULT_NAMESPACE, 0.0)
    }

    pub fn with_options(host: Host, namespace: impl Into<String>, flush_delay_ms: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(RegistryState {
                host,
                namespace: namespace.into(),
                flush_delay_ms,
                entries: Vec::new(),
                index: HashMap::new(),
                dirty: false,
                pending: None,
                sheet: None,
                rebuilds: 0,
            })),
        }
    }

    /// Name a compiled keyframes body would be registered under.
    pub fn name_for(&self, compiled: &str) -> String {
        format!("{}{}", self.state.borrow().namespace, string_hash(compiled))
    }

    /// Register a compiled keyframes body and return its name.
    ///
    /// Idempotent: re-inserting the same text returns the same name without
    /// scheduling another rebuild.
    pub fn insert(&self, compiled: &str) -> String {
        let name = self.name_for(compiled);
        let mut state = self.state.borrow_mut();
        if state.index.contains_key(&name) {
            return name;
        }

        let position = state.entries.len();
        state.entries.push((name.clone(), compiled.to_string()));
        state.index.insert(name.clone(), position);
        state.dirty = true;
        trace!(keyframes = %name, entries = state.entries.len(), "registered keyframes");

        if state.pending.is_none() {
            let weak: Weak<RefCell<RegistryState>> = Rc::downgrade(&self.state);
            let delay = state.flush_delay_ms;
            let timers = state.host.timers.clone();
            let id = timers.set_timeout(
                delay,
                Box::new(move || {
                    if let Some(state) = weak.upgrade() {
                        let registry = StylesheetRegistry { state };
                        registry.state.borrow_mut().pending = None;
                        registry.flush();
                    }
                }),
            );
            state.pending = Some(id);
        }
        name
    }

    /// Rebuild the stylesheet now if anything changed since the last rebuild.
    pub fn flush(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = state.pending.take() {
            state.host.timers.clear_timeout(id);
        }
        if !state.dirty {
            return;
        }
        let sheet = match state.sheet.clone() {
            Some(sheet) => sheet,
            None => {
                let sheet = state.host.document.create_style_sheet();
                state.sheet = Some(sheet.clone());
                sheet
            }
        };
        let css = state.render();
        state.dirty = false;
        state.rebuilds += 1;
        trace!(entries = state.entries.len(), bytes = css.len(), "rebuilt keyframes stylesheet");
        drop(state);
        sheet.replace_contents(&css);
    }

    /// Compiled body registered under `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        let state = self.state.borrow();
        state
            .index
            .get(name)
            .map(|&position| state.entries[position].1.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.borrow().index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    /// Whether inserts are waiting for a rebuild.
    pub fn is_dirty(&self) -> bool {
        self.state.borrow().dirty
    }

    /// Number of stylesheet rebuilds so far.
    pub fn rebuilds(&self) -> usize {
        self.state.borrow().rebuilds
    }

    /// Full stylesheet text for the current entries, in insertion order.
    pub fn stylesheet_text(&self) -> String {
        self.state.borrow().render()
    }

    pub fn namespace(&self) -> String {
        self.state.borrow().namespace.clone()
    }
}

impl std::fmt::Debug for StylesheetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("StylesheetRegistry")
            .field("namespace", &state.namespace)
            .field("entries", &state.entries.len())
            .field("dirty", &state.dirty)
            .finish()
    }
}
