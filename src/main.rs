use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use movieshelf::catalog::{CatalogApi, CatalogClient};
use movieshelf::config::Config;
use movieshelf::favorites::FavoritesStore;
use movieshelf::models::{Genre, Listing, Movie};
use movieshelf::storage::FileStore;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
  movieshelf list <now_playing|popular|top_rated|upcoming|PATH>
  movieshelf search <keyword...>
  movieshelf genres
  movieshelf genre <genre_id>
  movieshelf detail <movie_id>
  movieshelf recommend <movie_id>
  movieshelf favorites
  movieshelf favorite <movie_id>
  movieshelf unfavorite <movie_id>";

#[derive(Debug, PartialEq)]
enum Command {
    List(String),
    Search(String),
    Genres,
    Genre(i32),
    Detail(i32),
    Recommend(i32),
    Favorites,
    Favorite(i32),
    Unfavorite(i32),
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        let (name, rest) = args.split_first().ok_or_else(|| anyhow!("missing command"))?;
        let id = |what: &str| -> Result<i32> {
            rest.first()
                .ok_or_else(|| anyhow!("missing {}", what))?
                .parse()
                .with_context(|| format!("{} must be an integer", what))
        };
        let command = match name.as_str() {
            "list" => Command::List(
                rest.first()
                    .cloned()
                    .ok_or_else(|| anyhow!("missing listing or path"))?,
            ),
            "search" => Command::Search(rest.join(" ")),
            "genres" => Command::Genres,
            "genre" => Command::Genre(id("genre_id")?),
            "detail" => Command::Detail(id("movie_id")?),
            "recommend" => Command::Recommend(id("movie_id")?),
            "favorites" => Command::Favorites,
            "favorite" => Command::Favorite(id("movie_id")?),
            "unfavorite" => Command::Unfavorite(id("movie_id")?),
            other => return Err(anyhow!("unknown command '{}'", other)),
        };
        Ok(command)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_result = dotenv();
    init_tracing();
    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let config = Config::from_env()?;
    let catalog = CatalogClient::from_config(&config)?;
    let favorites = FavoritesStore::new(Arc::new(FileStore::new(&config.data_dir)));
    run(command, &catalog, &favorites).await
}

async fn run(command: Command, catalog: &dyn CatalogApi, favorites: &FavoritesStore) -> Result<()> {
    match command {
        Command::List(target) => {
            let result = match target.parse::<Listing>() {
                Ok(listing) => catalog.list_category(listing).await,
                Err(_) => catalog.list_by_path(&target).await,
            };
            print_movies(&or_empty(&target, result));
        }
        Command::Search(keyword) => {
            print_movies(&or_empty("search", catalog.search_by_keyword(&keyword).await));
        }
        Command::Genres => print_genres(&or_empty("genres", catalog.list_genres().await)),
        Command::Genre(id) => {
            print_movies(&or_empty("genre listing", catalog.list_by_genre(id).await));
        }
        Command::Detail(id) => {
            let movie = catalog
                .get_detail(id)
                .await
                .with_context(|| format!("failed to load movie {}", id))?;
            let favorite = match favorites.is_favorite(id).await {
                Ok(f) => f,
                Err(e) => {
                    warn!("Could not read favorites: {}", e);
                    false
                }
            };
            print_detail(&movie, favorite);
        }
        Command::Recommend(id) => {
            print_movies(&or_empty(
                "recommendations",
                catalog.get_recommendations(id).await,
            ));
        }
        Command::Favorites => {
            let list = favorites.load().await.context("failed to read favorites")?;
            if list.is_empty() {
                println!("No favorite movies found.");
            } else {
                print_movies(&list.into_vec());
            }
        }
        Command::Favorite(id) => {
            let movie = catalog
                .get_detail(id)
                .await
                .with_context(|| format!("failed to load movie {}", id))?;
            let title = movie.title.clone();
            favorites.add(movie).await?;
            println!("'{}' is a favorite", title);
        }
        Command::Unfavorite(id) => {
            favorites.remove(id).await?;
            println!("Movie {} is not a favorite", id);
        }
    }
    Ok(())
}

/// Listing failures degrade to an empty result with a logged diagnostic.
fn or_empty<T>(what: &str, result: movieshelf::Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Could not load {}: {}", what, e);
        Vec::new()
    })
}

fn print_movies(movies: &[Movie]) {
    if movies.is_empty() {
        println!("No movies found.");
        return;
    }
    for m in movies {
        let year = m
            .release_year()
            .map(|y| format!(" ({y})"))
            .unwrap_or_default();
        println!("{:>8}  {}{}  ★ {:.1}", m.id, m.title, year, m.vote_average);
    }
}

fn print_genres(genres: &[Genre]) {
    if genres.is_empty() {
        println!("No genres found.");
    }
    for g in genres {
        println!("{:>8}  {}", g.id, g.name);
    }
}

fn print_detail(movie: &Movie, favorite: bool) {
    println!("{} [{}]{}", movie.title, movie.id, if favorite { " ♥" } else { "" });
    if !movie.release_date.is_empty() {
        println!("Released:   {}", movie.release_date);
    }
    println!(
        "Rating:     {:.1} ({} votes)",
        movie.vote_average, movie.vote_count
    );
    println!("Popularity: {:.1}", movie.popularity);
    if let Some(url) = movie.poster_url("w500") {
        println!("Poster:     {}", url);
    }
    if let Some(url) = movie.backdrop_url("original") {
        println!("Backdrop:   {}", url);
    }
    if !movie.overview.is_empty() {
        println!("\n{}", movie.overview);
    }
}
