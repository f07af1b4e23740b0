// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use reelshelf_app::{
    AppCommand, AppEvent, AppState, BrowseBody, BrowseView, FetchError, HomeHighlights,
    IncrementalSearch, Movie, MovieFormInput, MovieId, NewMovie, Notice, NoticeLevel,
    RangeBound, ResponseOutcome, Route, SearchRequest, SearchSettings, UserEmail, genre_label,
    watchlist_for,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

const EVENT_POLL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const SUGGESTION_ROWS: usize = 8;
const EDIT_FIELDS: [&str; 5] = ["title", "genre", "rating", "release year", "poster url"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Home,
    AllMovies,
    MyCollection,
    Watchlist,
}

impl Tab {
    pub const ALL: [Self; 4] = [
        Self::Home,
        Self::AllMovies,
        Self::MyCollection,
        Self::Watchlist,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::AllMovies => "all movies",
            Self::MyCollection => "my collection",
            Self::Watchlist => "watchlist",
        }
    }

    pub fn route(self) -> Route {
        match self {
            Self::Home => Route::Home,
            Self::AllMovies => Route::AllMovies,
            Self::MyCollection => Route::MyCollection,
            Self::Watchlist => Route::Watchlist,
        }
    }

    fn for_route(route: &Route) -> Option<Self> {
        match route {
            Route::Home => Some(Self::Home),
            Route::AllMovies => Some(Self::AllMovies),
            Route::MyCollection => Some(Self::MyCollection),
            Route::Watchlist => Some(Self::Watchlist),
            _ => None,
        }
    }

    fn offset(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let index = Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0) as isize;
        Self::ALL[(index + delta).rem_euclid(len) as usize]
    }
}

/// Data access behind the terminal front end.
pub trait CatalogRuntime {
    fn load_catalog(&mut self) -> Result<Vec<Movie>, FetchError>;
    fn load_owned(&mut self, owner: &UserEmail) -> Result<Vec<Movie>, FetchError>;
    fn search(&mut self, query: &str) -> Result<Vec<Movie>, FetchError>;
    fn get_movie(&mut self, id: &MovieId) -> Result<Movie, FetchError>;
    fn add_to_collection(&mut self, movie: &NewMovie) -> Result<Option<MovieId>, FetchError>;
    fn set_watchlist(
        &mut self,
        id: &MovieId,
        in_watchlist: bool,
        owner: &UserEmail,
    ) -> Result<(), FetchError>;
    /// Replaces the stored record with `movie`, every field but the id.
    fn update_movie(&mut self, id: &MovieId, movie: &Movie) -> Result<(), FetchError>;
    fn delete_movie(&mut self, id: &MovieId) -> Result<(), FetchError>;

    /// Runs a suggestion lookup and reports it through `tx`. The default
    /// blocks; runtimes that can should answer from a background thread.
    fn spawn_search(&mut self, request: SearchRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.search(&request.query);
        tx.send(InternalEvent::SearchCompleted {
            request_id: request.request_id,
            result,
        })
        .map_err(|_| anyhow!("search event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    SearchCompleted {
        request_id: u64,
        result: Result<Vec<Movie>, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Prompt {
    #[default]
    Closed,
    Search,
    ConfirmDelete(MovieId),
}

/// Owner edit of one record, prefilled from a fresh fetch.
#[derive(Debug, Clone, PartialEq)]
struct EditForm {
    original: Movie,
    input: MovieFormInput,
    field: usize,
}

impl EditForm {
    fn new(original: Movie) -> Self {
        Self {
            input: MovieFormInput::from_movie(&original),
            original,
            field: 0,
        }
    }

    fn value(&self, field: usize) -> &str {
        match field {
            0 => &self.input.title,
            1 => &self.input.genre,
            2 => &self.input.rating,
            3 => &self.input.release_year,
            _ => &self.input.poster_url,
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.input.title,
            1 => &mut self.input.genre,
            2 => &mut self.input.rating,
            3 => &mut self.input.release_year,
            _ => &mut self.input.poster_url,
        }
    }

    fn step(&mut self, delta: isize) {
        let len = EDIT_FIELDS.len() as isize;
        self.field = (self.field as isize + delta).rem_euclid(len) as usize;
    }
}

#[derive(Debug, Default)]
struct ViewData {
    tab: Tab,
    browse: BrowseView,
    results: BrowseView,
    highlights: HomeHighlights,
    collection: Vec<Movie>,
    watchlist: Vec<Movie>,
    detail: Option<Movie>,
    editor: Option<EditForm>,
    selected_row: usize,
    search: IncrementalSearch,
    suggestion_cursor: Option<usize>,
    prompt: Prompt,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    fn new(settings: SearchSettings) -> Self {
        Self {
            search: IncrementalSearch::new(settings),
            ..Self::default()
        }
    }
}

pub fn run_app<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    settings: SearchSettings,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(settings);
    let (internal_tx, internal_rx) = mpsc::channel();

    let start = state.route.clone();
    navigate(state, runtime, &mut view_data, &internal_tx, start);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);
        tick_search(runtime, &mut view_data, &internal_tx, Instant::now());

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let timeout = poll_timeout(&view_data, Instant::now());
        let has_event = event::poll(timeout).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(
                        state,
                        runtime,
                        &mut view_data,
                        &internal_tx,
                        key,
                        Instant::now(),
                    ) {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Wakes early when the search debounce is about to fire.
fn poll_timeout(view_data: &ViewData, now: Instant) -> Duration {
    match view_data.search.next_deadline() {
        Some(deadline) => deadline.saturating_duration_since(now).min(EVENT_POLL),
        None => EVENT_POLL,
    }
}

fn tick_search<R: CatalogRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    now: Instant,
) {
    let Some(request) = view_data.search.poll(now) else {
        if view_data.search.suggestions().is_empty() {
            view_data.suggestion_cursor = None;
        }
        return;
    };
    debug!(
        request_id = request.request_id,
        query = %request.query,
        "search dispatched"
    );
    if let Err(error) = runtime.spawn_search(request, tx.clone()) {
        warn!(%error, "search dispatch failed");
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearNotice);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::SearchCompleted { request_id, result } => {
                if let Err(error) = &result {
                    debug!(request_id, %error, "search suggestions unavailable");
                }
                match view_data.search.on_response(request_id, result) {
                    ResponseOutcome::Applied => view_data.suggestion_cursor = None,
                    ResponseOutcome::Stale => {
                        debug!(request_id, "stale search response discarded");
                    }
                }
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_notice(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    notice: Notice,
) {
    state.dispatch(AppCommand::Notify(notice));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn navigate<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    route: Route,
) {
    for event in state.dispatch(AppCommand::Navigate(route)) {
        match event {
            AppEvent::Redirected { requested, .. } => {
                view_data.detail = None;
                emit_notice(
                    state,
                    view_data,
                    tx,
                    Notice::error(format!("Please login first to open {}", requested.path())),
                );
                enter_route(state, runtime, view_data, tx);
            }
            AppEvent::RouteChanged(_) => enter_route(state, runtime, view_data, tx),
            _ => {}
        }
    }
}

/// Loads whatever the current route shows. Tabs refetch on every visit and
/// start with fresh filters.
fn enter_route<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    view_data.selected_row = 0;
    let route = state.route.clone();
    if let Some(tab) = Tab::for_route(&route) {
        view_data.tab = tab;
        view_data.detail = None;
        view_data.browse = BrowseView::new();
        load_catalog(state, runtime, view_data, tx);
        if tab == Tab::MyCollection {
            load_collection(state, runtime, view_data, tx);
        }
        return;
    }

    match route {
        Route::SearchResults(query) => {
            view_data.results = BrowseView::new();
            let result = runtime.search(&query);
            if let Err(error) = &result {
                warn!(%query, %error, "search results unavailable");
            }
            view_data.results.finish_load(result);
        }
        Route::UpdateMovie(id) => {
            view_data.editor = None;
            match runtime.get_movie(&id) {
                Ok(movie) => view_data.editor = Some(EditForm::new(movie)),
                Err(error) => {
                    warn!(%id, %error, "movie fetch for edit failed");
                    emit_notice(
                        state,
                        view_data,
                        tx,
                        Notice::error("Failed to fetch movie details!"),
                    );
                    let back = view_data.tab.route();
                    navigate(state, runtime, view_data, tx, back);
                }
            }
        }
        _ => {}
    }
}

fn load_catalog<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    view_data.browse.begin_load();
    let result = runtime.load_catalog();
    if let Err(error) = &result {
        warn!(%error, "catalog load failed");
        emit_notice(state, view_data, tx, Notice::error("Failed to fetch movies"));
    }
    view_data.browse.finish_load(result);
    rederive_catalog_views(state, view_data);
}

fn load_collection<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let Some(identity) = state.identity.clone() else {
        view_data.collection.clear();
        return;
    };
    match runtime.load_owned(&identity.email) {
        Ok(movies) => view_data.collection = movies,
        Err(error) => {
            warn!(%error, "collection load failed");
            view_data.collection.clear();
            emit_notice(
                state,
                view_data,
                tx,
                Notice::error("Failed to fetch your collection!"),
            );
        }
    }
}

fn rederive_catalog_views(state: &AppState, view_data: &mut ViewData) {
    let catalog = view_data.browse.catalog();
    view_data.highlights = HomeHighlights::from_catalog(catalog);
    view_data.watchlist = match &state.identity {
        Some(identity) => watchlist_for(catalog, identity),
        None => Vec::new(),
    };
    clamp_selection(state, view_data);
}

fn rows<'a>(state: &AppState, view_data: &'a ViewData) -> &'a [Movie] {
    match &state.route {
        Route::Home => &view_data.highlights.featured,
        Route::AllMovies => view_data.browse.visible(),
        Route::MyCollection => &view_data.collection,
        Route::Watchlist => &view_data.watchlist,
        Route::SearchResults(_) => view_data.results.visible(),
        _ => &[],
    }
}

fn selected_movie(state: &AppState, view_data: &ViewData) -> Option<Movie> {
    if matches!(state.route, Route::MovieDetails(_)) {
        return view_data.detail.clone();
    }
    rows(state, view_data).get(view_data.selected_row).cloned()
}

fn move_row(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let len = rows(state, view_data).len();
    if len == 0 {
        view_data.selected_row = 0;
        return;
    }
    let next = (view_data.selected_row as isize + delta).clamp(0, len as isize - 1);
    view_data.selected_row = next as usize;
}

fn clamp_selection(state: &AppState, view_data: &mut ViewData) {
    move_row(state, view_data, 0);
}

fn active_browse<'a>(state: &AppState, view_data: &'a mut ViewData) -> Option<&'a mut BrowseView> {
    match state.route {
        Route::AllMovies => Some(&mut view_data.browse),
        Route::SearchResults(_) => Some(&mut view_data.results),
        _ => None,
    }
}

fn handle_key_event<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    match view_data.prompt.clone() {
        Prompt::Search => {
            handle_search_key(state, runtime, view_data, internal_tx, key, now);
            return false;
        }
        Prompt::ConfirmDelete(id) => {
            view_data.prompt = Prompt::Closed;
            if key.code == KeyCode::Char('y') {
                delete_movie(state, runtime, view_data, internal_tx, &id);
            } else {
                emit_notice(state, view_data, internal_tx, Notice::info("delete canceled"));
            }
            return false;
        }
        Prompt::Closed => {}
    }

    if matches!(state.route, Route::UpdateMovie(_)) {
        handle_edit_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if handle_filter_key(state, view_data, key) {
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('?'), _) => view_data.help_visible = true,
        (KeyCode::Tab, _) => {
            let next = view_data.tab.offset(1).route();
            navigate(state, runtime, view_data, internal_tx, next);
        }
        (KeyCode::BackTab, _) => {
            let prev = view_data.tab.offset(-1).route();
            navigate(state, runtime, view_data, internal_tx, prev);
        }
        (KeyCode::Char(digit @ '1'..='4'), KeyModifiers::NONE) => {
            let index = digit as usize - '1' as usize;
            navigate(state, runtime, view_data, internal_tx, Tab::ALL[index].route());
        }
        (KeyCode::Char('j') | KeyCode::Down, _) => move_row(state, view_data, 1),
        (KeyCode::Char('k') | KeyCode::Up, _) => move_row(state, view_data, -1),
        (KeyCode::Enter, _) => {
            if !matches!(state.route, Route::MovieDetails(_)) {
                if let Some(movie) = selected_movie(state, view_data) {
                    open_detail(state, runtime, view_data, internal_tx, movie);
                }
            }
        }
        (KeyCode::Esc, _) => {
            if Tab::for_route(&state.route).is_none() {
                let back = view_data.tab.route();
                navigate(state, runtime, view_data, internal_tx, back);
            }
        }
        (KeyCode::Char('/'), _) => {
            view_data.search.reset();
            view_data.suggestion_cursor = None;
            view_data.prompt = Prompt::Search;
        }
        (KeyCode::Char('R'), _) => {
            let current = state.route.clone();
            navigate(state, runtime, view_data, internal_tx, current);
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            add_selected_to_collection(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('w'), KeyModifiers::NONE) => {
            add_selected_to_watchlist(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('x'), KeyModifiers::NONE) => {
            remove_selected_from_watchlist(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            request_delete(state, view_data, internal_tx);
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            request_edit(state, runtime, view_data, internal_tx);
        }
        _ => {}
    }
    false
}

/// Genre and rating controls for the browse and search-results views.
fn handle_filter_key(state: &AppState, view_data: &mut ViewData, key: KeyEvent) -> bool {
    let Some(browse) = active_browse(state, view_data) else {
        return false;
    };
    match key.code {
        KeyCode::Char('g') => browse.cycle_genre(1),
        KeyCode::Char('G') => browse.cycle_genre(-1),
        KeyCode::Char('[') => browse.nudge(RangeBound::Min, -1),
        KeyCode::Char(']') => browse.nudge(RangeBound::Min, 1),
        KeyCode::Char('{') => browse.nudge(RangeBound::Max, -1),
        KeyCode::Char('}') => browse.nudge(RangeBound::Max, 1),
        KeyCode::Char('r') => browse.reset_filters(),
        _ => return false,
    }
    clamp_selection(state, view_data);
    true
}

fn handle_search_key<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.search.reset();
            view_data.suggestion_cursor = None;
            view_data.prompt = Prompt::Closed;
        }
        KeyCode::Down => {
            let len = view_data.search.suggestions().len().min(SUGGESTION_ROWS);
            if len > 0 {
                view_data.suggestion_cursor = Some(match view_data.suggestion_cursor {
                    Some(cursor) => (cursor + 1).min(len - 1),
                    None => 0,
                });
            }
        }
        KeyCode::Up => {
            view_data.suggestion_cursor = match view_data.suggestion_cursor {
                Some(0) | None => None,
                Some(cursor) => Some(cursor - 1),
            };
        }
        KeyCode::Enter => {
            view_data.prompt = Prompt::Closed;
            let picked = view_data
                .suggestion_cursor
                .take()
                .and_then(|cursor| view_data.search.suggestions().get(cursor).cloned());
            match picked {
                Some(movie) => {
                    if let Some(index) = view_data
                        .search
                        .suggestions()
                        .iter()
                        .position(|candidate| candidate.id == movie.id)
                    {
                        view_data.search.select(index);
                    }
                    open_detail(state, runtime, view_data, internal_tx, movie);
                }
                None => {
                    let route = view_data.search.submit();
                    navigate(state, runtime, view_data, internal_tx, route);
                }
            }
        }
        KeyCode::Backspace => view_data.search.pop_char(now),
        KeyCode::Char(ch) => view_data.search.push_char(ch, now),
        _ => {}
    }
}

fn open_detail<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    movie: Movie,
) {
    let route = Route::MovieDetails(movie.id.clone());
    view_data.detail = Some(movie);
    navigate(state, runtime, view_data, tx, route);
}

fn add_selected_to_collection<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    if !matches!(state.route, Route::MovieDetails(_)) {
        return;
    }
    let (Some(identity), Some(movie)) = (state.identity.clone(), view_data.detail.clone()) else {
        emit_notice(state, view_data, tx, Notice::error("Please login first!"));
        return;
    };
    let notice = match runtime.add_to_collection(&movie.copy_for(&identity)) {
        Ok(_) => Notice::success("Added to My Collection!"),
        Err(error) => {
            warn!(id = %movie.id, %error, "add to collection failed");
            Notice::error("Failed to add movie!")
        }
    };
    emit_notice(state, view_data, tx, notice);
}

fn add_selected_to_watchlist<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    if !matches!(state.route, Route::MovieDetails(_)) {
        return;
    }
    let (Some(identity), Some(movie)) = (state.identity.clone(), view_data.detail.clone()) else {
        emit_notice(state, view_data, tx, Notice::error("Please login first!"));
        return;
    };
    if movie.is_in_watchlist() {
        emit_notice(state, view_data, tx, Notice::info("Already in your Watchlist!"));
        return;
    }

    let owner = movie.watchlist_owner(&identity);
    match runtime.set_watchlist(&movie.id, true, &owner) {
        Ok(()) => {
            let mut updated = movie;
            updated.in_watchlist = Some(true);
            updated.added_by = Some(owner);
            view_data.browse.replace_movie(updated.clone());
            view_data.detail = Some(updated);
            rederive_catalog_views(state, view_data);
            emit_notice(state, view_data, tx, Notice::success("Added to Watchlist!"));
        }
        Err(error) => {
            warn!(id = %movie.id, %error, "watchlist update failed");
            emit_notice(
                state,
                view_data,
                tx,
                Notice::error("Failed to add to Watchlist!"),
            );
        }
    }
}

fn remove_selected_from_watchlist<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    if state.route != Route::Watchlist {
        return;
    }
    let (Some(identity), Some(movie)) = (state.identity.clone(), selected_movie(state, view_data))
    else {
        return;
    };

    let owner = movie.watchlist_owner(&identity);
    match runtime.set_watchlist(&movie.id, false, &owner) {
        Ok(()) => {
            let mut updated = movie;
            updated.in_watchlist = Some(false);
            view_data.browse.replace_movie(updated);
            rederive_catalog_views(state, view_data);
            emit_notice(state, view_data, tx, Notice::success("Removed from watchlist!"));
        }
        Err(error) => {
            warn!(id = %movie.id, %error, "watchlist removal failed");
            emit_notice(state, view_data, tx, Notice::error("Failed to remove movie!"));
        }
    }
}

/// Routes where the selected row can be edited or deleted by its owner.
fn offers_owner_actions(route: &Route) -> bool {
    matches!(
        route,
        Route::AllMovies | Route::MovieDetails(_) | Route::MyCollection | Route::SearchResults(_)
    )
}

fn request_edit<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    if !offers_owner_actions(&state.route) {
        return;
    }
    let Some(movie) = selected_movie(state, view_data) else {
        return;
    };
    if !movie.is_owned_by(state.identity.as_ref()) {
        emit_notice(
            state,
            view_data,
            tx,
            Notice::error("Only the owner can edit this movie"),
        );
        return;
    }
    navigate(state, runtime, view_data, tx, Route::UpdateMovie(movie.id));
}

fn handle_edit_key<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.editor = None;
            emit_notice(state, view_data, tx, Notice::info("edit canceled"));
            let back = view_data.tab.route();
            navigate(state, runtime, view_data, tx, back);
        }
        KeyCode::Enter => {
            save_edit(state, runtime, view_data, tx, OffsetDateTime::now_utc().date());
        }
        code => {
            let Some(editor) = view_data.editor.as_mut() else {
                return;
            };
            match code {
                KeyCode::Tab | KeyCode::Down => editor.step(1),
                KeyCode::BackTab | KeyCode::Up => editor.step(-1),
                KeyCode::Backspace => {
                    editor.value_mut().pop();
                }
                KeyCode::Char(ch) => editor.value_mut().push(ch),
                _ => {}
            }
        }
    }
}

/// Validates and sends the edit; on success every in-memory copy is replaced
/// and the owner lands on My Collection.
fn save_edit<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    today: Date,
) {
    let Some(editor) = view_data.editor.clone() else {
        return;
    };
    if let Err(error) = editor.input.validate(today) {
        emit_notice(state, view_data, tx, Notice::error(error.to_string()));
        return;
    }

    let updated = editor.input.apply_to(&editor.original);
    if let Err(error) = runtime.update_movie(&updated.id, &updated) {
        warn!(id = %updated.id, %error, "update failed");
        emit_notice(state, view_data, tx, Notice::error("Failed to update movie!"));
        return;
    }

    view_data.editor = None;
    view_data.browse.replace_movie(updated.clone());
    view_data.results.replace_movie(updated.clone());
    for movie in view_data
        .collection
        .iter_mut()
        .filter(|movie| movie.id == updated.id)
    {
        *movie = updated.clone();
    }
    if view_data
        .detail
        .as_ref()
        .is_some_and(|movie| movie.id == updated.id)
    {
        view_data.detail = Some(updated);
    }
    rederive_catalog_views(state, view_data);
    emit_notice(
        state,
        view_data,
        tx,
        Notice::success("Movie updated successfully!"),
    );
    navigate(state, runtime, view_data, tx, Route::MyCollection);
}

/// Delete is offered only on the owner's records. Outside the detail view
/// the list stays where it is, filters included.
fn request_delete(state: &mut AppState, view_data: &mut ViewData, tx: &Sender<InternalEvent>) {
    if !offers_owner_actions(&state.route) {
        return;
    }
    let Some(movie) = selected_movie(state, view_data) else {
        return;
    };
    if !movie.is_owned_by(state.identity.as_ref()) {
        emit_notice(
            state,
            view_data,
            tx,
            Notice::error("Only the owner can delete this movie"),
        );
        return;
    }
    view_data.prompt = Prompt::ConfirmDelete(movie.id);
}

fn delete_movie<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    id: &MovieId,
) {
    if let Err(error) = runtime.delete_movie(id) {
        warn!(%id, %error, "delete failed");
        emit_notice(state, view_data, tx, Notice::error("Failed to delete movie!"));
        return;
    }

    view_data.browse.remove_movie(id);
    view_data.results.remove_movie(id);
    view_data.collection.retain(|movie| &movie.id != id);
    rederive_catalog_views(state, view_data);
    emit_notice(
        state,
        view_data,
        tx,
        Notice::success("Movie deleted successfully!"),
    );

    if matches!(state.route, Route::MovieDetails(_)) {
        view_data.detail = None;
        navigate(state, runtime, view_data, tx, Route::MyCollection);
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = Tab::ALL
        .iter()
        .position(|tab| *tab == view_data.tab)
        .unwrap_or(0);
    let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.label()).collect::<Vec<_>>())
        .block(
            Block::default()
                .title(header_title(state))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match &state.route {
        Route::Home => {
            let body = Paragraph::new(render_home_text(
                &view_data.highlights,
                &view_data.browse,
                view_data.selected_row,
            ))
            .block(Block::default().borders(Borders::ALL).title("home"));
            frame.render_widget(body, layout[1]);
        }
        Route::AllMovies => {
            render_browse(frame, layout[1], "all movies", view_data, &view_data.browse);
        }
        Route::SearchResults(query) => {
            let title = format!("results for {query:?}");
            render_browse(frame, layout[1], &title, view_data, &view_data.results);
        }
        Route::MyCollection => render_movie_list(
            frame,
            layout[1],
            "my collection",
            &view_data.collection,
            view_data.selected_row,
            "your collection is empty",
        ),
        Route::Watchlist => render_movie_list(
            frame,
            layout[1],
            "watchlist",
            &view_data.watchlist,
            view_data.selected_row,
            "your watchlist is empty",
        ),
        Route::UpdateMovie(_) => {
            let body = Paragraph::new(render_edit_text(view_data.editor.as_ref()))
                .block(Block::default().borders(Borders::ALL).title("update movie"));
            frame.render_widget(body, layout[1]);
        }
        Route::MovieDetails(_) => {
            let body = Paragraph::new(render_detail_text(
                view_data.detail.as_ref(),
                state.identity.as_ref().map(|identity| &identity.email),
            ))
            .block(Block::default().borders(Borders::ALL).title("details"));
            frame.render_widget(body, layout[1]);
        }
        other => {
            let body = Paragraph::new(format!("{} is not available here", other.path()))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(body, layout[1]);
        }
    }

    let status_style = match state.notice.as_ref().map(|notice| notice.level) {
        Some(NoticeLevel::Error) => Style::default().fg(Color::Red),
        Some(NoticeLevel::Success) => Style::default().fg(Color::Green),
        _ => Style::default().fg(Color::Yellow),
    };
    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    match &view_data.prompt {
        Prompt::Search => {
            let area = centered_rect(60, 45, frame.area());
            frame.render_widget(Clear, area);
            let popup = Paragraph::new(render_search_overlay_text(
                &view_data.search,
                view_data.suggestion_cursor,
            ))
            .block(Block::default().title("search").borders(Borders::ALL));
            frame.render_widget(popup, area);
        }
        Prompt::ConfirmDelete(id) => {
            let area = centered_rect(50, 20, frame.area());
            frame.render_widget(Clear, area);
            let title = view_data
                .detail
                .as_ref()
                .filter(|movie| &movie.id == id)
                .or_else(|| view_data.collection.iter().find(|movie| &movie.id == id))
                .or_else(|| {
                    view_data
                        .browse
                        .catalog()
                        .iter()
                        .chain(view_data.results.catalog())
                        .find(|movie| &movie.id == id)
                })
                .map(|movie| movie.title.as_str())
                .unwrap_or("this movie");
            let confirm = Paragraph::new(format!(
                "Delete {title:?} permanently?\n\ny confirm | any other key cancel"
            ))
            .block(
                Block::default()
                    .title("are you sure?")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
            frame.render_widget(confirm, area);
        }
        Prompt::Closed => {}
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn header_title(state: &AppState) -> String {
    match &state.identity {
        Some(identity) => format!("reelshelf | {}", identity.label()),
        None => "reelshelf | signed out".to_owned(),
    }
}

fn render_browse(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    view_data: &ViewData,
    browse: &BrowseView,
) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let filters = Paragraph::new(render_filter_bar_text(browse))
        .block(Block::default().borders(Borders::ALL).title("filters"));
    frame.render_widget(filters, parts[0]);

    match browse.body() {
        BrowseBody::Rows(movies) => {
            render_table(frame, parts[1], title, movies, view_data.selected_row);
        }
        body => {
            let message = Paragraph::new(browse_message(&body))
                .block(Block::default().borders(Borders::ALL).title(title.to_owned()));
            frame.render_widget(message, parts[1]);
        }
    }
}

fn render_movie_list(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    movies: &[Movie],
    selected_row: usize,
    empty: &str,
) {
    if movies.is_empty() {
        let message = Paragraph::new(empty.to_owned())
            .block(Block::default().borders(Borders::ALL).title(title.to_owned()));
        frame.render_widget(message, area);
        return;
    }
    render_table(frame, area, title, movies, selected_row);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    movies: &[Movie],
    selected_row: usize,
) {
    let header = Row::new(
        ["title", "genre", "rating", "year", "added by"].map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        }),
    );

    let rows = movies.iter().enumerate().map(|(index, movie)| {
        let style = if index == selected_row {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(movie_cells(movie).map(Cell::from)).style(style)
    });

    let widths = [
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Min(12),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!("{title} ({})", movies.len()))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn movie_cells(movie: &Movie) -> [String; 5] {
    [
        movie.title.clone(),
        genre_label(&movie.genre),
        display_or_dash(movie.rating_label()),
        display_or_dash(movie.release_year_label()),
        movie
            .added_by
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
    ]
}

fn display_or_dash(value: String) -> String {
    if value.trim().is_empty() {
        "-".to_owned()
    } else {
        value
    }
}

fn movie_line(movie: &Movie) -> String {
    format!(
        "{}  [{}]  {}",
        movie.title,
        genre_label(&movie.genre),
        display_or_dash(movie.rating_label())
    )
}

fn browse_message(body: &BrowseBody<'_>) -> String {
    match body {
        BrowseBody::Loading => "loading movies...".to_owned(),
        BrowseBody::Failed(message) => format!("failed to load movies: {message}\npress R to retry"),
        BrowseBody::NoMatches => "no movies match your filters".to_owned(),
        BrowseBody::Rows(movies) => format!("{} movies", movies.len()),
    }
}

fn render_filter_bar_text(browse: &BrowseView) -> String {
    let range = browse.rating_range();
    format!(
        "genre: {} (g/G) | rating: {:.1} - {:.1} ([/] min, {{/}} max) | r reset | {} of {}",
        browse.selected_genre().label(),
        range.min(),
        range.max(),
        browse.visible().len(),
        browse.catalog().len(),
    )
}

fn render_home_text(highlights: &HomeHighlights, browse: &BrowseView, selected: usize) -> String {
    if let BrowseBody::Failed(_) | BrowseBody::Loading = browse.body() {
        return browse_message(&browse.body());
    }

    let mut lines = vec![
        format!("{} movies in the catalog", highlights.total),
        String::new(),
        "featured".to_owned(),
    ];
    for (index, movie) in highlights.featured.iter().enumerate() {
        let marker = if index == selected { ">" } else { " " };
        lines.push(format!("{marker} {}", movie_line(movie)));
    }
    lines.push(String::new());
    lines.push("top rated".to_owned());
    lines.extend(
        highlights
            .top_rated
            .iter()
            .map(|movie| format!("  {}", movie_line(movie))),
    );
    lines.push(String::new());
    lines.push("recently added".to_owned());
    lines.extend(
        highlights
            .recently_added
            .iter()
            .map(|movie| format!("  {}", movie_line(movie))),
    );
    lines.join("\n")
}

fn render_detail_text(movie: Option<&Movie>, viewer: Option<&UserEmail>) -> String {
    let Some(movie) = movie else {
        return "movie not found".to_owned();
    };
    let mut lines = vec![
        movie.title.clone(),
        String::new(),
        format!("genre: {}", genre_label(&movie.genre)),
        format!("rating: {}", display_or_dash(movie.rating_label())),
        format!("year: {}", display_or_dash(movie.release_year_label())),
        format!(
            "poster: {}",
            display_or_dash(movie.poster_url.clone().unwrap_or_default())
        ),
        format!(
            "added by: {}",
            display_or_dash(
                movie
                    .added_by
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default()
            )
        ),
        format!(
            "watchlist: {}",
            if movie.is_in_watchlist() { "yes" } else { "no" }
        ),
    ];
    if let Some(created) = movie.created_at() {
        lines.push(format!("added on: {}", created.date()));
    }
    lines.push(String::new());

    let owned = match (viewer, &movie.added_by) {
        (Some(viewer), Some(owner)) => !owner.is_blank() && owner == viewer,
        _ => false,
    };
    if owned {
        lines.push("a add to collection | w watchlist | e edit | d delete | esc back".to_owned());
    } else {
        lines.push("a add to collection | w watchlist | esc back".to_owned());
    }
    lines.join("\n")
}

fn render_edit_text(editor: Option<&EditForm>) -> String {
    let Some(editor) = editor else {
        return "loading movie...".to_owned();
    };
    let mut lines = vec![format!("editing {:?}", editor.original.title), String::new()];
    for (index, label) in EDIT_FIELDS.iter().enumerate() {
        let (marker, cursor) = if index == editor.field {
            (">", "_")
        } else {
            (" ", "")
        };
        lines.push(format!("{marker} {label}: {}{cursor}", editor.value(index)));
    }
    lines.push(String::new());
    lines.push("tab/up/down field | enter save | esc cancel".to_owned());
    lines.join("\n")
}

fn render_search_overlay_text(search: &IncrementalSearch, cursor: Option<usize>) -> String {
    let mut lines = vec![format!("> {}_", search.query()), String::new()];
    let suggestions = search.suggestions();
    if suggestions.is_empty() {
        let hint = if search.query().trim().chars().count() < search.settings().min_query_chars {
            format!(
                "type at least {} characters",
                search.settings().min_query_chars
            )
        } else if search.next_deadline().is_some() {
            "waiting for typing to settle...".to_owned()
        } else {
            "no suggestions".to_owned()
        };
        lines.push(hint);
    } else {
        for (index, movie) in suggestions.iter().take(SUGGESTION_ROWS).enumerate() {
            let marker = if cursor == Some(index) { ">" } else { " " };
            lines.push(format!("{marker} {}", movie_line(movie)));
        }
        if suggestions.len() > SUGGESTION_ROWS {
            lines.push(format!("  ... {} more", suggestions.len() - SUGGESTION_ROWS));
        }
    }
    lines.push(String::new());
    lines.push("enter search | up/down pick | esc close".to_owned());
    lines.join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }
    let hints = match &state.route {
        Route::AllMovies | Route::SearchResults(_) => {
            "j/k move | enter open | g/G genre | [/] {/} rating | e/d edit/delete | / search | ? help"
        }
        Route::MovieDetails(_) => {
            "a collect | w watchlist | e edit | d delete | esc back | ? help"
        }
        Route::UpdateMovie(_) => "tab next field | enter save | esc cancel",
        Route::Watchlist => "j/k move | enter open | x remove | / search | ? help",
        Route::MyCollection => "j/k move | enter open | e edit | d delete | / search | ? help",
        _ => "tab switch | j/k move | enter open | / search | ? help",
    };
    match &state.notice {
        Some(notice) => format!("{}: {} | {hints}", notice.level.as_str(), notice.message),
        None => hints.to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | q quit (outside prompts) | ? help\n\
tabs: tab/shift+tab cycle | 1-4 jump | R reload\n\
lists: j/k or up/down move | enter details | esc back | e edit, d delete (owner)\n\
filters: g/G genre | [/] min rating | {/} max rating | r reset\n\
search: / open | type to search | up/down pick | enter go | esc close\n\
details: a add to collection | w add to watchlist | e edit, d delete (owner)\n\
edit: tab/up/down field | enter save | esc cancel\n\
watchlist: x remove"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
