// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use reelshelf_api::Client;
use reelshelf_app::{
    AppState, BrowseBody, BrowseView, GenreSelector, Movie, MovieFormInput, genre_label,
};
use reelshelf_tui::CatalogRuntime;
use runtime::{ApiRuntime, DemoRuntime};
use std::env;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_SEED: u64 = 42;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `reelshelf --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    let settings = config.search_settings()?;
    let identity = config.identity();

    let client = Client::new(config.api_base_url(), config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        let count = client.ping()?;
        info!(count, base_url = client.base_url(), "movie server reachable");
        println!("ok: {count} movies at {}", client.base_url());
        return Ok(());
    }

    if let Some(form) = options.add.clone() {
        let Some(identity) = identity else {
            bail!("adding a movie requires a signed-in user; set [session].email in the config");
        };
        form.validate(OffsetDateTime::now_utc().date())?;
        let movie = form.into_new_movie(&identity);
        let created = client
            .create_movie(&movie)
            .with_context(|| format!("add {:?}", movie.title))?;
        match created {
            Some(id) => println!("added {:?} as {id}", movie.title),
            None => println!("added {:?}", movie.title),
        }
        return Ok(());
    }

    if let Some(query) = &options.search {
        let movies = client
            .search_movies(query)
            .with_context(|| format!("search for {query:?}"))?;
        print_movies(&movies);
        return Ok(());
    }

    if options.list {
        let lines = if options.demo {
            list_lines(&mut DemoRuntime::new(DEMO_SEED), &options.filters)?
        } else {
            list_lines(&mut ApiRuntime::new(client), &options.filters)?
        };
        for line in lines {
            println!("{line}");
        }
        return Ok(());
    }

    let mut state = AppState::with_identity(identity);
    if options.demo {
        if state.identity.is_none() {
            state.identity = Some(reelshelf_testkit::sample_identity());
        }
        let mut runtime = DemoRuntime::new(DEMO_SEED);
        return reelshelf_tui::run_app(&mut state, &mut runtime, settings);
    }

    let mut runtime = ApiRuntime::new(client);
    reelshelf_tui::run_app(&mut state, &mut runtime, settings)
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ListFilters {
    genre: Option<String>,
    min_rating: Option<f64>,
    max_rating: Option<f64>,
}

/// Loads the catalog and renders the filtered rows, one per line.
fn list_lines<R: CatalogRuntime>(runtime: &mut R, filters: &ListFilters) -> Result<Vec<String>> {
    let mut view = BrowseView::new();
    let catalog = runtime.load_catalog().context("load movies")?;
    view.finish_load(Ok(catalog));

    if let Some(genre) = &filters.genre {
        view.select_genre(GenreSelector::parse(genre));
    }
    if let Some(max) = filters.max_rating {
        view.set_max_rating(max);
    }
    if let Some(min) = filters.min_rating {
        view.set_min_rating(min);
    }

    match view.body() {
        BrowseBody::Rows(movies) => Ok(movies.iter().map(movie_row).collect()),
        BrowseBody::NoMatches => Ok(vec!["no movies match your filters".to_owned()]),
        BrowseBody::Loading | BrowseBody::Failed(_) => Err(anyhow!("catalog did not load")),
    }
}

fn movie_row(movie: &Movie) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        movie.title,
        genre_label(&movie.genre),
        movie.rating_label(),
        movie.release_year_label()
    )
}

fn print_movies(movies: &[Movie]) {
    if movies.is_empty() {
        println!("no movies found");
        return;
    }
    for movie in movies {
        println!("{}", movie_row(movie));
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    demo: bool,
    list: bool,
    filters: ListFilters,
    search: Option<String>,
    add: Option<MovieFormInput>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        demo: false,
        list: false,
        filters: ListFilters::default(),
        search: None,
        add: None,
        show_help: false,
    };
    let mut rating = None;
    let mut year = None;
    let mut poster = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--list" => {
                options.list = true;
            }
            "--genre" => {
                options.filters.genre = Some(next_value("--genre", &mut iter)?);
            }
            "--min-rating" => {
                options.filters.min_rating =
                    Some(parse_rating("--min-rating", &next_value("--min-rating", &mut iter)?)?);
            }
            "--max-rating" => {
                options.filters.max_rating =
                    Some(parse_rating("--max-rating", &next_value("--max-rating", &mut iter)?)?);
            }
            "--search" => {
                options.search = Some(next_value("--search", &mut iter)?);
            }
            "--add" => {
                let title = next_value("--add", &mut iter)?;
                options.add = Some(MovieFormInput {
                    title,
                    ..MovieFormInput::default()
                });
            }
            "--rating" => rating = Some(next_value("--rating", &mut iter)?),
            "--year" => year = Some(next_value("--year", &mut iter)?),
            "--poster" => poster = Some(next_value("--poster", &mut iter)?),
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    match options.add.as_mut() {
        Some(form) => {
            form.genre = options.filters.genre.clone().unwrap_or_default();
            form.rating = rating.unwrap_or_default();
            form.release_year = year.unwrap_or_default();
            form.poster_url = poster.unwrap_or_default();
        }
        None if rating.is_some() || year.is_some() || poster.is_some() => {
            bail!("--rating, --year and --poster only apply with --add <title>");
        }
        None => {}
    }

    Ok(options)
}

fn next_value<I, S>(flag: &str, iter: &mut I) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    iter.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{flag} requires a value"))
}

fn parse_rating(flag: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{flag} expects a number, got {raw:?}"))?;
    if !value.is_finite() {
        bail!("{flag} expects a finite number, got {raw:?}");
    }
    Ok(value)
}

fn print_help() {
    println!("reelshelf");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and reach the movie server once");
    println!("  --demo                   Use a seeded in-memory catalog");
    println!("  --list                   Print the catalog and exit");
    println!("  --genre <name>           Only list one genre (All for every genre)");
    println!("  --min-rating <n>         Lowest rating to list (0-10)");
    println!("  --max-rating <n>         Highest rating to list (0-10)");
    println!("  --search <text>          Print server search results and exit");
    println!("  --add <title>            Add a movie (with --genre, --rating, --year, --poster)");
    println!("  --help                   Show this help");
}
