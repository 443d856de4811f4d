use smol_str::SmolStr;
use std::collections::HashMap;

use crate::engine::Engine;
use stratkit_execution::BrokerAdapter;

/// Keeps one running [`Engine`] per symbol. Owning engines through a
/// registry rather than a bare `Vec` lets a host process look one up by
/// symbol when a bar arrives instead of scanning.
pub struct EngineRegistry<A: BrokerAdapter> {
    engines: HashMap<SmolStr, Engine<A>>,
}

impl<A: BrokerAdapter> Default for EngineRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: BrokerAdapter> EngineRegistry<A> {
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
        }
    }

    pub fn register(&mut self, symbol: impl Into<SmolStr>, engine: Engine<A>) {
        self.engines.insert(symbol.into(), engine);
    }

    pub fn get(&self, symbol: &str) -> Option<&Engine<A>> {
        self.engines.get(symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut Engine<A>> {
        self.engines.get_mut(symbol)
    }

    pub fn remove(&mut self, symbol: &str) -> Option<Engine<A>> {
        self.engines.remove(symbol)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl<A: BrokerAdapter> IntoIterator for EngineRegistry<A> {
    type Item = (SmolStr, Engine<A>);
    type IntoIter = std::collections::hash_map::IntoIter<SmolStr, Engine<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.engines.into_iter()
    }
}
