//! Topic subscription bookkeeping inside the runtime config.

use crate::domain::runtime_config::RuntimeConfig;

/// Subscribe `agent` to each of `topics`, creating missing topic sections.
/// Existing subscriptions are left alone; calling twice changes nothing.
pub fn subscribe_at_install(config: &mut RuntimeConfig, agent: &str, topics: &[String]) {
    for topic in topics {
        config.ensure_topic(topic);
        let mut agents = config.subscribers(topic);
        if !agents.iter().any(|a| a == agent) {
            agents.push(agent.to_string());
            config.set_subscribers(topic, &agents);
        }
    }
}

/// Make `agent`'s subscriptions converge to exactly `desired`.
///
/// Ensures a section exists for every desired topic, then walks every topic
/// section adding or dropping `agent` as needed. Sections emptied here are
/// kept; only removal prunes them.
pub fn resync_at_update(config: &mut RuntimeConfig, agent: &str, desired: &[String]) {
    for topic in desired {
        config.ensure_topic(topic);
    }

    for topic in config.topics() {
        let mut agents = config.subscribers(&topic);
        let subscribed = agents.iter().any(|a| a == agent);
        let wanted = desired.iter().any(|t| *t == topic);

        if subscribed && !wanted {
            agents.retain(|a| a != agent);
            config.set_subscribers(&topic, &agents);
        } else if !subscribed && wanted {
            agents.push(agent.to_string());
            config.set_subscribers(&topic, &agents);
        }
    }
}

/// Drop `agent` from every topic and delete topic sections left empty.
pub fn unsubscribe_all(config: &mut RuntimeConfig, agent: &str) {
    for topic in config.topics() {
        let mut agents = config.subscribers(&topic);
        if !agents.iter().any(|a| a == agent) {
            continue;
        }
        agents.retain(|a| a != agent);
        if agents.is_empty() {
            config.remove_topic(&topic);
        } else {
            config.set_subscribers(&topic, &agents);
        }
    }
}

/// Topics `agent` currently subscribes to.
#[must_use]
pub fn subscriptions(config: &RuntimeConfig, agent: &str) -> Vec<String> {
    config
        .topics()
        .into_iter()
        .filter(|t| config.subscribers(t).iter().any(|a| a == agent))
        .collect()
}
