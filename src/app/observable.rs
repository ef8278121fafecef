// src/app/observable.rs: single-threaded behavior-subject style state cells
//
// A `Subject` owns a value and notifies listeners on every emission. Readers get
// an `Observable` handle: new subscribers receive the current value immediately,
// and dropping the returned `Subscription` detaches the listener.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    version: u64,
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
    // keeps derived cells attached to their sources
    upstream: Vec<Subscription>,
}

/// Read side of a state cell.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Write side of a state cell.
pub struct Subject<T> {
    obs: Observable<T>,
}

/// Listener registration guard. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl<T: Clone + 'static> Observable<T> {
    fn with_value(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                next_id: 0,
                listeners: Vec::new(),
                upstream: Vec::new(),
            })),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Register `f`; it is called right away with the current value, then on
    /// every later emission until the returned guard is dropped.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        let listener: Listener<T> = Rc::new(f);
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Rc::clone(&listener)));
            id
        };

        let current = self.get();
        listener(&current);

        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Derived cell holding `f(current)`, recomputed on every emission of `self`.
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Observable<U> {
        let derived = Observable::with_value(self.with(|v| f(v)));
        let target = Rc::downgrade(&derived.inner);
        let sub = self.subscribe(move |v| {
            if let Some(inner) = target.upgrade() {
                Observable { inner }.emit(f(v));
            }
        });
        derived.attach(sub);
        derived
    }

    fn attach(&self, sub: Subscription) {
        self.inner.borrow_mut().upstream.push(sub);
    }

    fn emit(&self, value: T) {
        let (version, listeners) = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value;
            inner.version += 1;
            let listeners: Vec<(u64, Listener<T>)> = inner
                .listeners
                .iter()
                .map(|(id, l)| (*id, Rc::clone(l)))
                .collect();
            (inner.version, listeners)
        };

        for (id, listener) in listeners {
            let current = {
                let inner = self.inner.borrow();
                // a listener re-emitted; the nested pass already delivered the newer value
                if inner.version != version {
                    return;
                }
                // skip listeners detached earlier in this pass
                if !inner.listeners.iter().any(|(lid, _)| *lid == id) {
                    continue;
                }
                inner.value.clone()
            };
            listener(&current);
        }
    }
}

impl<T: Clone + 'static> Subject<T> {
    pub fn new(value: T) -> Self {
        Self {
            obs: Observable::with_value(value),
        }
    }

    pub fn observable(&self) -> Observable<T> {
        self.obs.clone()
    }

    pub fn get(&self) -> T {
        self.obs.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.obs.with(f)
    }

    /// Replace the value and notify every listener.
    pub fn set(&self, value: T) {
        self.obs.emit(value);
    }
}

impl<T: Clone + PartialEq + 'static> Subject<T> {
    /// Like `set`, but stays silent when the value is unchanged.
    pub fn set_if_changed(&self, value: T) -> bool {
        if self.obs.with(|cur| *cur == value) {
            return false;
        }
        self.obs.emit(value);
        true
    }
}

/// Derived cell holding `f(a, b)` for the latest values of both sources.
pub fn combine_latest<A, B, C>(
    a: &Observable<A>,
    b: &Observable<B>,
    f: impl Fn(&A, &B) -> C + 'static,
) -> Observable<C>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
{
    let f = Rc::new(f);
    let derived = Observable::with_value(a.with(|av| b.with(|bv| f(av, bv))));

    let sub_a = {
        let target = Rc::downgrade(&derived.inner);
        let other = b.clone();
        let f = Rc::clone(&f);
        a.subscribe(move |av| {
            if let Some(inner) = target.upgrade() {
                let next = other.with(|bv| f(av, bv));
                Observable { inner }.emit(next);
            }
        })
    };
    let sub_b = {
        let target = Rc::downgrade(&derived.inner);
        let other = a.clone();
        b.subscribe(move |bv| {
            if let Some(inner) = target.upgrade() {
                let next = other.with(|av| f(av, bv));
                Observable { inner }.emit(next);
            }
        })
    };

    derived.attach(sub_a);
    derived.attach(sub_b);
    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder<T: Clone + 'static>(obs: &Observable<T>) -> (Rc<RefCell<Vec<T>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = obs.subscribe(move |v| sink.borrow_mut().push(v.clone()));
        (seen, sub)
    }

    #[test]
    fn late_subscriber_gets_current_value() {
        let subject = Subject::new(1);
        subject.set(2);
        let (seen, _sub) = recorder(&subject.observable());
        assert_eq!(*seen.borrow(), [2]);
        subject.set(3);
        assert_eq!(*seen.borrow(), [2, 3]);
    }

    #[test]
    fn dropping_subscription_stops_delivery() {
        let subject = Subject::new(0);
        let obs = subject.observable();
        let (seen, sub) = recorder(&obs);
        assert_eq!(obs.listener_count(), 1);
        drop(sub);
        assert_eq!(obs.listener_count(), 0);
        subject.set(5);
        assert_eq!(*seen.borrow(), [0]);
    }

    #[test]
    fn set_if_changed_suppresses_equal_values() {
        let subject = Subject::new("a".to_string());
        let (seen, _sub) = recorder(&subject.observable());
        assert!(!subject.set_if_changed("a".into()));
        assert!(subject.set_if_changed("b".into()));
        assert_eq!(*seen.borrow(), ["a", "b"]);
    }

    #[test]
    fn map_follows_source() {
        let subject = Subject::new(vec![1, 2]);
        let len = subject.observable().map(|v| v.len());
        assert_eq!(len.get(), 2);
        subject.set(vec![1, 2, 3]);
        assert_eq!(len.get(), 3);
    }

    #[test]
    fn dropping_derived_releases_upstream() {
        let subject = Subject::new(1);
        let source = subject.observable();
        let doubled = source.map(|v| v * 2);
        assert_eq!(source.listener_count(), 1);
        drop(doubled);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn combine_latest_recomputes_on_either_side() {
        let a = Subject::new(2);
        let b = Subject::new(10);
        let sum = combine_latest(&a.observable(), &b.observable(), |x, y| x + y);
        let (seen, _sub) = recorder(&sum);
        a.set(3);
        b.set(20);
        assert_eq!(*seen.borrow(), [12, 13, 23]);
    }

    #[test]
    fn listener_may_emit_on_the_same_subject() {
        let subject = Rc::new(Subject::new(0));
        let obs = subject.observable();
        let echo = Rc::clone(&subject);
        let _clamp = obs.subscribe(move |v| {
            if *v > 10 {
                echo.set(10);
            }
        });
        let (seen, _sub) = recorder(&obs);
        subject.set(42);
        assert_eq!(subject.get(), 10);
        // the second listener never observes the overwritten 42
        assert_eq!(*seen.borrow(), [0, 10]);
    }

    #[test]
    fn listener_detached_mid_pass_is_skipped() {
        let subject = Subject::new(0);
        let obs = subject.observable();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(Cell::new(0));

        let slot = Rc::clone(&victim);
        let _killer = obs.subscribe(move |v| {
            if *v == 1 {
                slot.borrow_mut().take();
            }
        });
        let counter = Rc::clone(&hits);
        *victim.borrow_mut() = Some(obs.subscribe(move |_| counter.set(counter.get() + 1)));

        subject.set(1);
        // only the replay on subscribe
        assert_eq!(hits.get(), 1);
    }
}
