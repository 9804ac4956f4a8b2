use std::fmt;

/// Sent to every collaborator before a scene transition touches the active
/// slot, so they can drop anything tied to the outgoing scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetSignal {
    /// Name of the scene about to be replaced, if one is active.
    pub outgoing: Option<String>,
}

/// Fire-and-forget notification channel.
pub trait MessageBus {
    fn broadcast(&mut self, signal: &ResetSignal);
}

type Subscriber = Box<dyn FnMut(&ResetSignal)>;

/// Delivers each signal to every subscriber, in subscription order.
#[derive(Default)]
pub struct Broadcaster {
    subscribers: Vec<Subscriber>,
    sent: u64,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&ResetSignal) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Number of signals broadcast so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl MessageBus for Broadcaster {
    fn broadcast(&mut self, signal: &ResetSignal) {
        self.sent += 1;
        for subscriber in &mut self.subscribers {
            subscriber(signal);
        }
    }
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.subscribers.len())
            .field("sent", &self.sent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn every_subscriber_sees_every_signal() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = Broadcaster::new();
        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |s: &ResetSignal| {
                seen.borrow_mut().push((tag, s.outgoing.clone()));
            });
        }

        bus.broadcast(&ResetSignal {
            outgoing: Some("Menu".into()),
        });
        assert_eq!(bus.sent(), 1);
        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(
            *seen.borrow(),
            vec![("a", Some("Menu".to_string())), ("b", Some("Menu".to_string()))]
        );
    }

    #[test]
    fn broadcast_without_subscribers_is_counted() {
        let mut bus = Broadcaster::new();
        bus.broadcast(&ResetSignal { outgoing: None });
        assert_eq!(bus.sent(), 1);
    }
}
