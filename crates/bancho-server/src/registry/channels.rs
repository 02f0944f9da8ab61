// registry/channels.rs — named-chat-room registry (spec §4.3)

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::channel::Channel;

#[derive(Default)]
pub struct ChannelRegistry {
    by_name: RwLock<HashMap<String, Arc<Channel>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, channel: Arc<Channel>) {
        self.by_name.write().insert(channel.name.clone(), channel);
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Channel>> {
        self.by_name.write().remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Channel>> {
        self.by_name.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.read().contains_key(name)
    }

    /// Iteration over public channels only (spec §4.3).
    pub fn public_channels(&self) -> Vec<Arc<Channel>> {
        self.by_name
            .read()
            .values()
            .filter(|c| c.public)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_channels_excludes_private_ones() {
        let reg = ChannelRegistry::new();
        reg.insert(Arc::new(Channel::new("#osu", "", true)));
        reg.insert(Arc::new(Channel::new("#multi_1", "", false)));

        let public = reg.public_channels();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].name, "#osu");
    }
}
