// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Identity, MovieId};
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    AllMovies,
    MovieDetails(MovieId),
    UpdateMovie(MovieId),
    AddMovie,
    MyCollection,
    Watchlist,
    Profile,
    SearchResults(String),
    Login,
    Register,
    NotFound,
}

impl Route {
    /// Routes that require a signed-in user.
    pub const fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::MovieDetails(_)
                | Self::UpdateMovie(_)
                | Self::AddMovie
                | Self::MyCollection
                | Self::Watchlist
                | Self::Profile
        )
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::AllMovies => "/allmovies".to_owned(),
            Self::MovieDetails(id) => format!("/movieDetails/{id}"),
            Self::UpdateMovie(id) => format!("/movies/update/{id}"),
            Self::AddMovie => "/addmovie".to_owned(),
            Self::MyCollection => "/mycollection".to_owned(),
            Self::Watchlist => "/watchlist".to_owned(),
            Self::Profile => "/profile".to_owned(),
            Self::SearchResults(query) => {
                let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
                format!("/movies?search={encoded}")
            }
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::NotFound => "/404".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub route: Route,
    pub identity: Option<Identity>,
    pub notice: Option<Notice>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            route: Route::Home,
            identity: None,
            notice: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Navigate(Route),
    SignIn(Identity),
    SignOut,
    Notify(Notice),
    ClearNotice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    RouteChanged(Route),
    Redirected { requested: Route, to: Route },
    IdentityChanged(Option<Identity>),
    NoticeShown(Notice),
    NoticeCleared,
}

impl AppState {
    pub fn with_identity(identity: Option<Identity>) -> Self {
        Self {
            identity,
            ..Self::default()
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Navigate(route) => self.navigate(route),
            AppCommand::SignIn(identity) => {
                self.identity = Some(identity);
                vec![
                    AppEvent::IdentityChanged(self.identity.clone()),
                    self.notify(Notice::success("Login successful")),
                ]
            }
            AppCommand::SignOut => {
                self.identity = None;
                let mut events = vec![
                    AppEvent::IdentityChanged(None),
                    self.notify(Notice::success("Logout successful")),
                ];
                events.extend(self.navigate(Route::Home));
                events
            }
            AppCommand::Notify(notice) => vec![self.notify(notice)],
            AppCommand::ClearNotice => {
                self.notice = None;
                vec![AppEvent::NoticeCleared]
            }
        }
    }

    fn navigate(&mut self, route: Route) -> Vec<AppEvent> {
        if route.is_protected() && !self.is_signed_in() {
            self.route = Route::Home;
            return vec![AppEvent::Redirected {
                requested: route,
                to: Route::Home,
            }];
        }
        self.route = route;
        vec![AppEvent::RouteChanged(self.route.clone())]
    }

    fn notify(&mut self, notice: Notice) -> AppEvent {
        self.notice = Some(notice.clone());
        AppEvent::NoticeShown(notice)
    }
}
