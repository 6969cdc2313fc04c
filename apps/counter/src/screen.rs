//! View functions for the counter screen. They read the store and never
//! mutate it; intents go through the `dispatch` closure.

use std::rc::Rc;

use tally_core::*;
use tally_counter::{CounterStore, HistoryEntry, Operation};
use tally_ui::*;

use crate::format::relative_time;

/// Height of one history row, dp. Every row uses it so the list can be
/// virtualized.
pub const HISTORY_ROW_DP: f32 = 56.0;

pub const INCREMENT_LABEL: &str = "Increment";
pub const DECREMENT_LABEL: &str = "Decrement";
pub const EMPTY_HISTORY: &str = "No operations yet";

pub type Dispatch = Rc<dyn Fn(Operation)>;

/// What the screen needs besides the store itself.
#[derive(Clone)]
pub struct ScreenHandles {
    pub dispatch: Dispatch,
    pub list: Rc<LazyColumnState>,
}

pub fn counter_screen(
    store: &CounterStore,
    handles: &ScreenHandles,
    locals: &Locals,
    now_ms: u64,
) -> View {
    let theme = &locals.theme;
    Surface(
        Modifier::new().fill_max_size().background(theme.background),
        Column(Modifier::new().fill_max_size().padding(24.0).gap(16.0)).child((
            ValueDisplay(store.value(), theme),
            Controls(store, &handles.dispatch),
            Text("History").size(18.0).color(theme.on_surface),
            HistoryList(store, &handles.list, theme, now_ms),
        )),
    )
}

pub fn ValueDisplay(value: i32, theme: &Theme) -> View {
    Column(Modifier::new().fill_max_width().gap(4.0)).child((
        Text("Count").size(14.0).color(theme.on_surface_variant),
        Text(value.to_string()).size(56.0).color(theme.primary),
    ))
}

pub fn Controls(store: &CounterStore, dispatch: &Dispatch) -> View {
    let button = |label: &str, op: Operation, enabled: bool| {
        let d = dispatch.clone();
        Button(label, enabled, move || d(op))
    };
    Row(Modifier::new().gap(12.0)).child((
        button(DECREMENT_LABEL, Operation::Decrement, store.can_decrement()),
        button(INCREMENT_LABEL, Operation::Increment, store.can_increment()),
    ))
}

pub fn HistoryList(
    store: &CounterStore,
    state: &Rc<LazyColumnState>,
    theme: &Theme,
    now_ms: u64,
) -> View {
    if store.is_empty() {
        return Text(EMPTY_HISTORY).color(theme.on_surface_variant);
    }
    // Entries stamped ahead of the clock (same-millisecond taps, clock set
    // back) still read as past.
    let now_ms = store.latest().map_or(now_ms, |e| now_ms.max(e.timestamp()));
    let theme = *theme;
    let entries: Vec<&HistoryEntry> = store.history().collect();
    LazyColumn(
        entries,
        HISTORY_ROW_DP,
        state.clone(),
        Modifier::new()
            .fill_max_width()
            .flex_grow(1.0)
            .background(theme.surface)
            .border(1.0, theme.outline, 8.0)
            .clip_rounded(8.0),
        move |entry, _| HistoryRow(entry, &theme, now_ms),
    )
}

pub fn HistoryRow(entry: &HistoryEntry, theme: &Theme, now_ms: u64) -> View {
    Column(
        Modifier::new()
            .key(entry.key())
            .fill_max_width()
            .height(HISTORY_ROW_DP)
            .padding_values(PaddingValues::symmetric(12.0, 8.0))
            .gap(2.0),
    )
    .child((
        Text(entry.to_string()).color(theme.on_surface),
        Text(relative_time(entry.timestamp(), now_ms))
            .size(13.0)
            .color(theme.on_surface_variant),
    ))
}
