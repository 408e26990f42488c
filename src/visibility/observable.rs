//! Observable values with an explicit subscription lifecycle.
//!
//! Each `Observable` is an owned value, never a global: two pages (or two
//! tests) get two independent instances. Listeners are registered with
//! [`Observable::subscribe`] and must be released with
//! [`Observable::unsubscribe`] when their owner goes away.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

pub struct Observable<T> {
    value: T,
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_id: u64,
}

impl<T: PartialEq> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value, notifying listeners in subscription order if it
    /// changed. Returns whether it changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        for (_, listener) in &mut self.listeners {
            listener(&self.value);
        }
        true
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notifies_only_on_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut value = Observable::new(1);
        let sink = Rc::clone(&seen);
        value.subscribe(move |v| sink.borrow_mut().push(*v));

        assert!(value.set(2));
        assert!(!value.set(2));
        assert!(value.set(3));
        assert_eq!(*seen.borrow(), vec![2, 3]);
        assert_eq!(*value.get(), 3);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let count = Rc::new(RefCell::new(0));
        let mut value = Observable::new("home");
        let sink = Rc::clone(&count);
        let id = value.subscribe(move |_| *sink.borrow_mut() += 1);

        value.set("about");
        assert!(value.unsubscribe(id));
        assert!(!value.unsubscribe(id));
        value.set("contact");
        assert_eq!(*count.borrow(), 1);
        assert_eq!(value.listener_count(), 0);
    }

    #[test]
    fn instances_do_not_share_listeners() {
        let mut a = Observable::new(0);
        let b = Observable::new(0);
        a.subscribe(|_| {});
        assert_eq!(a.listener_count(), 1);
        assert_eq!(b.listener_count(), 0);
    }
}
