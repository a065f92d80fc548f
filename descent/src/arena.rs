use std::{
    any::Any,
    cell::{Cell, OnceCell, RefCell},
    marker::PhantomData,
    rc::{Rc, Weak},
};

use crate::{
    error::{DefinitionFault, GrammarError},
    parser::NodeId,
};

type Thunk = Box<dyn FnOnce() -> Rc<dyn Any>>;

#[derive(Default)]
struct Entry {
    value: OnceCell<Rc<dyn Any>>,
    thunk: Cell<Option<Thunk>>,
    forcing: Cell<bool>,
}

/// Storage for the recursive rules of a grammar.
///
/// Rules refer to their slots weakly, so a grammar whose rules refer to each other
/// is freed with its arena.
#[derive(Default)]
pub struct Arena {
    slots: RefCell<Vec<Entry>>,
}

impl Arena {
    pub fn new() -> Rc<Self> {
        Rc::new(Arena::default())
    }

    /// Reserve an empty slot, to be filled with [`Slot::store`].
    pub(crate) fn alloc<P>(self: &Rc<Self>) -> Slot<P> {
        let index = {
            let mut slots = self.slots.borrow_mut();
            slots.push(Entry::default());
            slots.len() - 1
        };

        Slot {
            id: NodeId::fresh(),
            arena: Rc::downgrade(self),
            index,
            _phantom: PhantomData,
        }
    }

    /// Reserve a slot that builds its value on first use.
    pub(crate) fn alloc_with<P: 'static>(
        self: &Rc<Self>,
        build: impl FnOnce() -> P + 'static,
    ) -> Slot<P> {
        let slot = self.alloc();
        self.slots.borrow()[slot.index]
            .thunk
            .set(Some(Box::new(move || Rc::new(build()) as Rc<dyn Any>)));
        slot
    }

    /// Number of slots, defined or not.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) struct Slot<P> {
    id: NodeId,
    arena: Weak<Arena>,
    index: usize,
    _phantom: PhantomData<P>,
}

impl<P> Clone for Slot<P> {
    fn clone(&self) -> Self {
        Slot {
            id: self.id,
            arena: self.arena.clone(),
            index: self.index,
            _phantom: PhantomData,
        }
    }
}

impl<P> Slot<P> {
    pub(crate) fn id(&self) -> NodeId {
        self.id
    }
}

impl<P: 'static> Slot<P> {
    fn arena(&self) -> Option<Rc<Arena>> {
        self.arena.upgrade()
    }

    /// Fill the slot. A slot holding a value or a pending build is already defined.
    pub(crate) fn store(&self, value: P) -> Result<(), GrammarError> {
        let arena = self.arena().ok_or(GrammarError::Detached)?;
        let slots = arena.slots.borrow();
        let entry = &slots[self.index];
        let pending = entry.thunk.take();
        if pending.is_some() || entry.forcing.get() {
            entry.thunk.set(pending);
            return Err(GrammarError::AlreadyDefined(self.id));
        }
        entry
            .value
            .set(Rc::new(value) as Rc<dyn Any>)
            .map_err(|_| GrammarError::AlreadyDefined(self.id))
    }

    pub(crate) fn is_defined(&self) -> bool {
        self.arena().is_some_and(|arena| {
            let slots = arena.slots.borrow();
            let entry = &slots[self.index];
            let pending = entry.thunk.take();
            let defined = pending.is_some() || entry.forcing.get() || entry.value.get().is_some();
            entry.thunk.set(pending);
            defined
        })
    }

    /// Get the stored value, building it first if needed.
    ///
    /// The build runs without holding a borrow of the arena, so it may allocate
    /// further slots.
    pub(crate) fn get(&self) -> Result<Rc<P>, DefinitionFault> {
        let arena = self.arena().ok_or(DefinitionFault::Detached)?;
        let thunk = {
            let slots = arena.slots.borrow();
            let entry = &slots[self.index];
            if let Some(value) = entry.value.get() {
                return downcast(value.clone());
            }
            if entry.forcing.get() {
                return Err(DefinitionFault::Reentrant);
            }
            let thunk = entry.thunk.take().ok_or(DefinitionFault::Undefined)?;
            entry.forcing.set(true);
            thunk
        };

        log::trace!("building lazy rule {}", self.id);
        let value = thunk();

        let slots = arena.slots.borrow();
        let entry = &slots[self.index];
        entry.forcing.set(false);
        let value = entry.value.get_or_init(|| value).clone();
        downcast(value)
    }
}

fn downcast<P: 'static>(value: Rc<dyn Any>) -> Result<Rc<P>, DefinitionFault> {
    // Slots are typed by the handle that allocated them.
    value.downcast::<P>().map_err(|_| DefinitionFault::Undefined)
}
