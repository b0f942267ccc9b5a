//! `ConfigHub`: single owner of the active [`ParkingConfig`].
//!
//! Components never read settings from ambient state.  They either receive a
//! `&ParkingConfig` at tick time, or register a listener here and re-derive
//! whatever thresholds they cache when it fires.
//!
//! ```rust,ignore
//! let mut hub = ConfigHub::new(ParkingConfig::default())?;
//! let id = hub.subscribe(|cfg| println!("limit is now {}", cfg.reroute_limit));
//! hub.apply(new_config)?;   // validated, then every listener runs once
//! hub.unsubscribe(id);
//! ```

use tracing::{debug, warn};

use crate::{ParkingConfig, PkResult};

/// Handle returned by [`ConfigHub::subscribe`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&ParkingConfig) + Send>;

/// Owns the validated configuration and broadcasts replacements.
pub struct ConfigHub {
    current:   ParkingConfig,
    listeners: Vec<(ListenerId, Listener)>,
    next_id:   u32,
}

impl ConfigHub {
    /// Validate `initial` and take ownership of it.
    pub fn new(initial: ParkingConfig) -> PkResult<Self> {
        initial.validate()?;
        Ok(Self {
            current:   initial,
            listeners: Vec::new(),
            next_id:   0,
        })
    }

    #[inline]
    pub fn current(&self) -> &ParkingConfig {
        &self.current
    }

    /// Register a callback invoked after every successful [`apply`][Self::apply].
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ParkingConfig) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener.  Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Replace the active configuration.
    ///
    /// An invalid `next` is rejected and the previous configuration stays in
    /// force; listeners are not called.  Returns the replaced configuration.
    pub fn apply(&mut self, next: ParkingConfig) -> PkResult<ParkingConfig> {
        if let Err(e) = next.validate() {
            warn!(error = %e, "rejected parking configuration");
            return Err(e);
        }
        let previous = std::mem::replace(&mut self.current, next);
        debug!(
            listeners = self.listeners.len(),
            demand    = self.current.enable_demand_system,
            reroute   = self.current.enable_reroute_limit,
            "parking configuration applied"
        );
        for (_, listener) in &mut self.listeners {
            listener(&self.current);
        }
        Ok(previous)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
