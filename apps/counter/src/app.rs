use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tally_core::{Locals, Scheduler, View};
use tally_counter::{Bounds, Clock, CounterStore, Operation, SystemClock};
use tally_ui::LazyColumnState;

use crate::screen::{ScreenHandles, counter_screen};

/// Owns the store and the history list's scroll state and turns them into
/// views. Button callbacks reach the store through a shared handle.
pub struct CounterApp {
    store: Rc<RefCell<CounterStore>>,
    list: Rc<LazyColumnState>,
    clock: Box<dyn Clock>,
}

impl Default for CounterApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterApp {
    pub fn new() -> Self {
        Self::with_store(CounterStore::with_bounds(Bounds::DEFAULT), SystemClock)
    }

    /// `clock` is only used to render relative times; the store keeps its own.
    pub fn with_store(mut store: CounterStore, clock: impl Clock) -> Self {
        let list = Rc::new(LazyColumnState::new());
        let l = list.clone();
        // Newest rows are at the top; bring them into view.
        store.subscribe(move |_| l.scroll_to_top());
        Self {
            store: Rc::new(RefCell::new(store)),
            list,
            clock: Box::new(clock),
        }
    }

    pub fn store(&self) -> Ref<'_, CounterStore> {
        self.store.borrow()
    }

    pub fn list_state(&self) -> &Rc<LazyColumnState> {
        &self.list
    }

    /// Applies `op`; refused transitions leave everything unchanged.
    pub fn dispatch(&self, op: Operation) {
        self.store.borrow_mut().apply(op);
    }

    pub fn handles(&self) -> ScreenHandles {
        let store = self.store.clone();
        ScreenHandles {
            dispatch: Rc::new(move |op| {
                store.borrow_mut().apply(op);
            }),
            list: self.list.clone(),
        }
    }

    pub fn view(&self, locals: &Locals) -> View {
        counter_screen(
            &self.store.borrow(),
            &self.handles(),
            locals,
            self.clock.now_millis(),
        )
    }

    /// Root function for the platform runners.
    pub fn into_root(self) -> impl FnMut(&Scheduler) -> View {
        move |sched| self.view(&sched.locals)
    }
}
