use crate::entity_key::EntityId;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

pub type EntityCallback = dyn Fn(EntityId);
pub type SetCallback = dyn Fn(EntityId, &dyn Any);
pub type GetCallback = dyn Fn(EntityId) -> Option<Box<dyn Any>>;

/// Publish/subscribe channel. Subscribers are invoked in subscription order
/// from a snapshot, so a callback may unsubscribe itself or others.
///
/// The entry list is copy-on-write: notifying shares it, and only a
/// (un)subscribe during a running notification copies it.
pub(crate) struct Observable<T: ?Sized> {
    observers: Rc<RefCell<Observers<T>>>,
}

struct Observers<T: ?Sized> {
    next_key: u64,
    entries: Rc<Vec<(u64, Rc<T>)>>,
}

impl<T: ?Sized> Default for Observable<T> {
    fn default() -> Self {
        Observable {
            observers: Rc::new(RefCell::new(Observers {
                next_key: 0,
                entries: Rc::new(Vec::new()),
            })),
        }
    }
}

impl<T: ?Sized + 'static> Observable<T> {
    pub(crate) fn subscribe(&self, observer: Rc<T>) -> Unsubscribe {
        let key = {
            let mut observers = self.observers.borrow_mut();
            let key = observers.next_key;
            observers.next_key += 1;
            Rc::make_mut(&mut observers.entries).push((key, observer));
            key
        };
        let observers = Rc::downgrade(&self.observers);
        Unsubscribe::new(move || {
            if let Some(observers) = observers.upgrade() {
                let mut observers = observers.borrow_mut();
                Rc::make_mut(&mut observers.entries).retain(|(it, _)| *it != key);
            }
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.observers.borrow().entries.is_empty()
    }

    fn snapshot(&self) -> Rc<Vec<(u64, Rc<T>)>> {
        self.observers.borrow().entries.clone()
    }
}

impl Observable<EntityCallback> {
    pub(crate) fn notify(&self, entity: EntityId) {
        if self.is_empty() {
            return;
        }
        for (_, observer) in self.snapshot().iter() {
            (**observer)(entity);
        }
    }
}

impl Observable<SetCallback> {
    pub(crate) fn notify(&self, entity: EntityId, data: &dyn Any) {
        if self.is_empty() {
            return;
        }
        for (_, observer) in self.snapshot().iter() {
            (**observer)(entity, data);
        }
    }
}

impl Observable<GetCallback> {
    /// Last value produced by any observer wins.
    pub(crate) fn notify(&self, entity: EntityId) -> Option<Box<dyn Any>> {
        if self.is_empty() {
            return None;
        }
        let mut result = None;
        for (_, observer) in self.snapshot().iter() {
            if let Some(value) = (**observer)(entity) {
                result = Some(value);
            }
        }
        result
    }
}

/// Handle returned by every `observe*` call. Dropping it keeps the
/// subscription alive; call [`Unsubscribe::unsubscribe`] to detach.
pub struct Unsubscribe {
    callback: Option<Box<dyn FnOnce()>>,
}

impl Unsubscribe {
    pub(crate) fn new(callback: impl FnOnce() + 'static) -> Unsubscribe {
        Unsubscribe {
            callback: Some(Box::new(callback)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::observable::EntityCallback;
    use crate::utils::observable::Observable;
    use crate::EntityId;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unsubscribed_observer_not_notified() {
        let observable = Observable::<EntityCallback>::default();
        let received = Rc::new(RefCell::new(vec![]));
        let first = {
            let received = received.clone();
            observable.subscribe(Rc::new(move |e: EntityId| received.borrow_mut().push((1, e))))
        };
        let _second = {
            let received = received.clone();
            observable.subscribe(Rc::new(move |e: EntityId| received.borrow_mut().push((2, e))))
        };
        observable.notify(EntityId::from_raw(7));
        first.unsubscribe();
        observable.notify(EntityId::from_raw(8));
        assert_eq!(
            *received.borrow(),
            vec![
                (1, EntityId::from_raw(7)),
                (2, EntityId::from_raw(7)),
                (2, EntityId::from_raw(8))
            ]
        );
        assert!(!observable.is_empty());
    }

    #[test]
    fn observer_may_unsubscribe_itself() {
        let observable = Observable::<EntityCallback>::default();
        let handle: Rc<RefCell<Option<crate::Unsubscribe>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(RefCell::new(0));
        let unsubscribe = {
            let handle = handle.clone();
            let calls = calls.clone();
            observable.subscribe(Rc::new(move |_: EntityId| {
                *calls.borrow_mut() += 1;
                if let Some(it) = handle.borrow_mut().take() {
                    it.unsubscribe();
                }
            }))
        };
        *handle.borrow_mut() = Some(unsubscribe);
        observable.notify(EntityId::from_raw(1));
        observable.notify(EntityId::from_raw(2));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn notify_shares_entries_until_subscription_changes() {
        let observable = Observable::<EntityCallback>::default();
        let calls = Rc::new(RefCell::new(0));
        for _ in 0..3 {
            let calls = calls.clone();
            observable.subscribe(Rc::new(move |_: EntityId| *calls.borrow_mut() += 1));
        }
        let before = observable.snapshot();
        observable.notify(EntityId::from_raw(1));
        assert!(Rc::ptr_eq(&before, &observable.snapshot()));
        assert_eq!(*calls.borrow(), 3);

        observable.subscribe(Rc::new(|_: EntityId| {}));
        assert_eq!(before.len(), 3);
        assert_eq!(observable.snapshot().len(), 4);
    }
}
