use crate::{
    core::{
        cmd::Cmd,
        msg::Msg,
        state::{HistoryState, SyncMode, SyncPhase},
    },
    domain::{map_records, validate, RawPage, RecordParser},
};

/// Collaborators the update function needs besides the state
pub struct UpdateContext<'a, P> {
    pub parser: &'a P,
    pub page_size: u64,
}

/// Elm-like update function
/// Returns new state and list of commands from current state and message
pub fn update<P: RecordParser>(
    msg: Msg,
    mut state: HistoryState<P::Item>,
    ctx: &UpdateContext<'_, P>,
) -> (HistoryState<P::Item>, Vec<Cmd>) {
    let commands = match msg {
        Msg::LoadHistory(mode) => load_history(&mut state, mode, ctx.page_size),
        Msg::LoadMore => load_more(&mut state, ctx.page_size),
        Msg::Delete(id) => on_delete(&mut state, id),
        Msg::ConnectivityChanged(connected) => {
            if state.connectivity.transition(connected) {
                log::info!("Connected, reloading history");
                load_history(&mut state, SyncMode::Reset, ctx.page_size)
            } else {
                vec![]
            }
        }
        Msg::PageLoaded { generation, result } => page_loaded(&mut state, generation, result, ctx),
        Msg::DeleteCompleted { id, result } => {
            delete_completed(&mut state, id, result, ctx.page_size)
        }
    };
    (state, commands)
}

/// Start a reset or continue sync.
///
/// Only one request may be in flight. A continue requested while busy is
/// dropped; a reset requested while busy is queued and issued as soon as the
/// outstanding request completes.
fn load_history<T>(state: &mut HistoryState<T>, mode: SyncMode, limit: u64) -> Vec<Cmd> {
    if state.phase.is_outstanding() {
        match mode {
            SyncMode::Reset => {
                log::debug!("Reset requested while {:?}; queued", state.phase);
                state.reset_queued = true;
            }
            SyncMode::Continue => {
                log::debug!("Continue requested while {:?}; ignored", state.phase);
            }
        }
        return vec![];
    }

    let offset = match mode {
        SyncMode::Reset => 0,
        SyncMode::Continue => {
            if !state.has_more {
                log::debug!("Continue requested with no more records; ignored");
                return vec![];
            }
            validate::ensure_valid_offset(state.cursor, limit)
        }
    };

    state.generation += 1;
    let generation = state.generation;
    match mode {
        SyncMode::Reset => {
            state.reset_queued = false;
            // Never show stale records next to a fresh load
            state.items.clear();
            state.cursor = 0;
            state.phase = SyncPhase::FetchingInitial { generation, offset };
        }
        SyncMode::Continue => {
            state.phase = SyncPhase::FetchingMore { generation, offset };
        }
    }

    vec![Cmd::FetchPage {
        generation,
        offset,
        limit,
    }]
}

/// Load-more gate: a silent no-op unless the next page may be fetched
fn load_more<T>(state: &mut HistoryState<T>, limit: u64) -> Vec<Cmd> {
    if state.loading_incremental() || !state.has_more || state.cursor % limit.max(1) != 0 {
        return vec![];
    }
    load_history(state, SyncMode::Continue, limit)
}

fn on_delete<T>(state: &mut HistoryState<T>, id: String) -> Vec<Cmd> {
    if state.phase.is_outstanding() {
        log::warn!("Delete of {id} refused while {:?}", state.phase);
        return vec![Cmd::ReportError {
            message: format!("Cannot delete {id}: another request is in progress"),
        }];
    }

    state.phase = SyncPhase::Deleting { id: id.clone() };
    vec![Cmd::DeleteRecord { id }]
}

fn page_loaded<P: RecordParser>(
    state: &mut HistoryState<P::Item>,
    generation: u64,
    result: Result<RawPage, String>,
    ctx: &UpdateContext<'_, P>,
) -> Vec<Cmd> {
    let (mode, offset) = match state.phase.fetch() {
        Some((mode, current, offset)) if current == generation => (mode, offset),
        _ => {
            log::debug!("Discarding page of superseded fetch {generation}");
            return vec![];
        }
    };

    state.phase = SyncPhase::Idle;

    if state.reset_queued {
        log::debug!("Fetch {generation} superseded by a queued reset");
        let mut commands = match result {
            Err(error) => vec![Cmd::ReportError {
                message: format!("Failed to load history: {error}"),
            }],
            Ok(_) => vec![],
        };
        commands.extend(load_history(state, SyncMode::Reset, ctx.page_size));
        return commands;
    }

    match result {
        Ok(page) => {
            let items = map_records(ctx.parser, validate::records(&page.history));
            let count = items.len();
            match mode {
                SyncMode::Reset => state.items = items,
                SyncMode::Continue => state.items.extend(items),
            }

            state.total = validate::ensure_valid_count(&page.total);
            state.has_more = validate::coerce_bool(&page.has_more);
            state.cursor = offset + ctx.page_size;
            state.last_error = None;

            log::info!(
                "History loaded: mode={mode} offset={offset} limit={} total={} has_more={} count={count}",
                ctx.page_size,
                state.total,
                state.has_more
            );
            vec![]
        }
        Err(error) => {
            // Stop paginating rather than guess at a consistent state
            state.total = 0;
            state.has_more = false;
            if mode == SyncMode::Reset {
                state.items.clear();
                state.cursor = 0;
            }

            let message = format!("Failed to load history: {error}");
            state.last_error = Some(message.clone());
            vec![Cmd::ReportError { message }]
        }
    }
}

fn delete_completed<T>(
    state: &mut HistoryState<T>,
    id: String,
    result: Result<(), String>,
    limit: u64,
) -> Vec<Cmd> {
    match &state.phase {
        SyncPhase::Deleting { id: pending } if *pending == id => {}
        _ => {
            log::debug!("Ignoring completion of delete {id} that is not pending");
            return vec![];
        }
    }

    state.phase = SyncPhase::Idle;

    match result {
        Ok(()) => {
            log::info!("Deleted {id}, reloading history");
            load_history(state, SyncMode::Reset, limit)
        }
        Err(error) => {
            let message = format!("Failed to delete shot {id}: {error}");
            state.last_error = Some(message.clone());
            let mut commands = vec![Cmd::ReportError { message }];
            if state.reset_queued {
                commands.extend(load_history(state, SyncMode::Reset, limit));
            }
            commands
        }
    }
}
